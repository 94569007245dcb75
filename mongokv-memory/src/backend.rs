//! Connector, client and collection handle over an [`InMemoryStore`].

use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, Document};
use tracing::debug;

use mongokv_core::{
    backend::{BackendConnector, CollectionHandle, KvBackend},
    error::{KvError, KvResult},
    name::CollectionName,
};

use crate::store::InMemoryStore;

const SCHEME: &str = "memory://";

/// Opens [`InMemoryBackend`]s from `memory://host/database` URIs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConnector {
    store: InMemoryStore,
}

impl InMemoryConnector {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

/// Extracts the database name from a `memory://host/database[?options]` URI.
fn parse_database(uri: &str) -> KvResult<String> {
    let rest = uri.strip_prefix(SCHEME).ok_or_else(|| {
        KvError::Configuration(format!(
            "failed to parse connection uri: scheme must be \"{SCHEME}\""
        ))
    })?;

    let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
    if host.is_empty() {
        return Err(KvError::Configuration(
            "failed to parse connection uri: missing host".into(),
        ));
    }

    let database = path.split_once('?').map_or(path, |(database, _)| database);
    if database.is_empty() {
        return Err(KvError::Configuration("uri doesn't have database".into()));
    }

    Ok(database.to_string())
}

#[async_trait]
impl BackendConnector for InMemoryConnector {
    type Backend = InMemoryBackend;

    async fn open(&self, uri: &str) -> KvResult<Self::Backend> {
        let database = parse_database(uri)?;

        if self.store.refuses_clients() {
            return Err(KvError::Connectivity(
                "failed to create client: client construction refused".into(),
            ));
        }

        Ok(InMemoryBackend {
            database,
            client: Arc::new(ClientGuard::new(self.store.clone())),
        })
    }
}

/// Tracks a live client; released when the last clone of the backend is dropped.
#[derive(Debug)]
struct ClientGuard {
    store: InMemoryStore,
}

impl ClientGuard {
    fn new(store: InMemoryStore) -> Self {
        store.client_opened();
        Self { store }
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        self.store.client_released();
    }
}

/// A client bound to one database of an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    database: String,
    client: Arc<ClientGuard>,
}

impl InMemoryBackend {
    fn store(&self) -> &InMemoryStore {
        &self.client.store
    }
}

#[async_trait]
impl KvBackend for InMemoryBackend {
    type Handle = InMemoryCollection;

    fn database(&self) -> &str {
        &self.database
    }

    async fn ping(&self) -> KvResult<()> {
        self.store().record_ping();

        if !self.store().is_reachable() {
            return Err(KvError::Connectivity(
                "failed to check connection with database: server selection timeout".into(),
            ));
        }

        Ok(())
    }

    fn open_collection(&self, name: &CollectionName) -> Self::Handle {
        InMemoryCollection {
            database: self.database.clone(),
            name: name.to_string(),
            guard: Arc::new(HandleGuard::new(self.store().clone())),
        }
    }

    async fn shutdown(self) -> KvResult<()> {
        if self.store().record_shutdown() {
            return Err(KvError::Connectivity(
                "failed to shut down client: connection reset".into(),
            ));
        }

        debug!(database = %self.database, "in-memory client shut down");

        Ok(())
    }
}

/// Tracks a live handle; released when the last clone of the handle is dropped.
#[derive(Debug)]
struct HandleGuard {
    id: u64,
    store: InMemoryStore,
}

impl HandleGuard {
    fn new(store: InMemoryStore) -> Self {
        Self {
            id: store.handle_opened(),
            store,
        }
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.store.handle_released();
    }
}

/// A collection handle opened by an [`InMemoryBackend`].
#[derive(Debug, Clone)]
pub struct InMemoryCollection {
    database: String,
    name: String,
    guard: Arc<HandleGuard>,
}

impl InMemoryCollection {
    /// Identifies the open call that produced this handle; clones share it.
    pub fn handle_id(&self) -> u64 {
        self.guard.id
    }

    fn store(&self) -> &InMemoryStore {
        &self.guard.store
    }

    fn ensure_reachable(&self, action: &str) -> KvResult<()> {
        if self.store().is_reachable() {
            Ok(())
        } else {
            Err(KvError::Store(format!("{action}: connection refused")))
        }
    }
}

#[async_trait]
impl CollectionHandle for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_key_index(&self) -> KvResult<()> {
        self.ensure_reachable("failed to create index for collection")?;

        self.store()
            .create_key_index(&self.database, &self.name)
            .await
            .map_err(|e| KvError::Store(format!("failed to create index for collection: {e}")))
    }

    async fn upsert(&self, key: &str, value: Bson) -> KvResult<()> {
        self.ensure_reachable("failed to put value")?;

        self.store()
            .upsert(&self.database, &self.name, key, value)
            .await;

        Ok(())
    }

    async fn find_first(&self, key: &str) -> KvResult<Option<Document>> {
        self.ensure_reachable("failed to find key")?;

        Ok(self.store().find_first(&self.database, &self.name, key).await)
    }
}
