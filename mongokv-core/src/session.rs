//! Connection lifecycle and the key-value protocol.
//!
//! A [`Session`] owns at most one live connection to the document store. The
//! connection and its [`CollectionCache`] are created together by
//! [`Session::connect`] and released together by [`Session::disconnect`], so the cache
//! never outlives the client it was populated from.
//!
//! All entry points take the session's internal lock for their whole duration, which
//! serializes `connect`, `disconnect`, `put` and `get` when a session is shared between
//! tasks.
//!
//! # Example
//!
//! ```ignore
//! use mongokv_core::session::Session;
//!
//! let session = Session::new(connector);
//! session.connect("mongodb://localhost:27017/testdb").await?;
//!
//! session.put("names", "alice", "Alice Smith".to_string()).await?;
//! let name: String = session.get("names", "alice").await?;
//! ```

use std::fmt;

use mea::mutex::Mutex;
use tracing::{debug, info, warn};

use crate::{
    backend::{BackendConnector, CollectionHandle, KvBackend},
    cache::CollectionCache,
    codec::{KvValue, VALUE_FIELD},
    error::{KvError, KvResult},
    name::CollectionName,
};

/// The live link to the store together with the handles opened through it.
#[derive(Debug)]
struct Connection<B: KvBackend> {
    backend: B,
    cache: CollectionCache<B::Handle>,
}

impl<B: KvBackend> Connection<B> {
    async fn collection(&mut self, name: &CollectionName) -> KvResult<B::Handle> {
        self.cache.fetch(&self.backend, name).await
    }
}

/// A key-value session over a document store.
///
/// # Type Parameters
///
/// * `C` - The connector used to open backends on [`connect`](Session::connect)
pub struct Session<C: BackendConnector> {
    connector: C,
    connection: Mutex<Option<Connection<C::Backend>>>,
}

impl<C: BackendConnector> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connector", &self.connector)
            .finish_non_exhaustive()
    }
}

impl<C: BackendConnector> Session<C> {
    /// Creates a disconnected session.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connection: Mutex::new(None),
        }
    }

    /// Connects to the store described by `uri`.
    ///
    /// The store is pinged before the connection is kept. If anything fails, the
    /// partially constructed client is shut down before the error is returned.
    ///
    /// # Errors
    ///
    /// - [`KvError::AlreadyConnected`] if the session is already connected.
    /// - [`KvError::Configuration`] if the URI is malformed or names no database.
    /// - [`KvError::Connectivity`] if the client cannot be built or the ping fails.
    pub async fn connect(&self, uri: &str) -> KvResult<()> {
        let mut connection = self.connection.lock().await;

        if connection.is_some() {
            return Err(KvError::AlreadyConnected);
        }

        let backend = self.connector.open(uri).await?;

        if let Err(err) = backend.ping().await {
            if let Err(shutdown_err) = backend.shutdown().await {
                warn!(error = %shutdown_err, "failed to shut down unreachable client");
            }
            return Err(err);
        }

        info!(database = backend.database(), "client has been created");

        *connection = Some(Connection {
            backend,
            cache: CollectionCache::new(),
        });

        Ok(())
    }

    /// Releases every cached collection and the client.
    ///
    /// A later [`connect`](Session::connect) starts from an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::NotConnected`] if the session is not connected, or the
    /// backend's error if shutting the client down fails. The session is disconnected
    /// in both of the latter cases.
    pub async fn disconnect(&self) -> KvResult<()> {
        let mut connection = self.connection.lock().await;
        let Connection { backend, mut cache } =
            connection.take().ok_or(KvError::NotConnected)?;

        cache.clear();
        backend.shutdown().await?;

        info!("client was destroyed");

        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Returns the target database of the live connection.
    pub async fn database(&self) -> KvResult<String> {
        self.connection
            .lock()
            .await
            .as_ref()
            .map(|connection| connection.backend.database().to_string())
            .ok_or(KvError::NotConnected)
    }

    /// Returns the names of the collections provisioned on the live connection, sorted.
    pub async fn cached_collections(&self) -> KvResult<Vec<String>> {
        self.connection
            .lock()
            .await
            .as_ref()
            .map(|connection| connection.cache.names())
            .ok_or(KvError::NotConnected)
    }

    /// Stores `value` under `key` in `collection`, replacing any previous value.
    ///
    /// The write is a single upsert on the store, so concurrent writers to the same
    /// key converge without a read-modify-write race.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::NotConnected`], [`KvError::Validation`] or [`KvError::Store`].
    pub async fn put<V: KvValue>(&self, collection: &str, key: &str, value: V) -> KvResult<()> {
        let mut connection = self.connection.lock().await;
        let connection = connection.as_mut().ok_or(KvError::NotConnected)?;

        let handle = connection
            .collection(&CollectionName::new(collection)?)
            .await?;
        handle.upsert(key, value.encode()).await?;

        debug!(collection, key, kind = %V::KIND, "value stored");

        Ok(())
    }

    /// Reads the value stored under `key` in `collection`.
    ///
    /// Only the first document the store returns for `key` is considered.
    ///
    /// # Errors
    ///
    /// - [`KvError::NotConnected`] or [`KvError::Validation`], as for `put`.
    /// - [`KvError::NotFound`] if no document holds `key`.
    /// - [`KvError::TypeMismatch`] if the stored value is not a `V`.
    /// - [`KvError::Store`] if the lookup fails or the document has no `value` field.
    pub async fn get<V: KvValue>(&self, collection: &str, key: &str) -> KvResult<V> {
        let mut connection = self.connection.lock().await;
        let connection = connection.as_mut().ok_or(KvError::NotConnected)?;

        let handle = connection
            .collection(&CollectionName::new(collection)?)
            .await?;
        let document = handle
            .find_first(key)
            .await?
            .ok_or_else(|| KvError::NotFound {
                collection: handle.name().to_string(),
                key: key.to_string(),
            })?;

        let value = document
            .get(VALUE_FIELD)
            .ok_or_else(|| KvError::Store("value field is missing in pair".into()))
            .and_then(V::decode_field)?;

        debug!(collection, key, kind = %V::KIND, "value returned");

        Ok(value)
    }
}
