//! Storage backend abstraction for the key-value store.
//!
//! This module defines the traits a concrete document store implements so that the
//! session logic in [`crate::session`] never depends on a particular driver.
//!
//! # Traits
//!
//! - [`BackendConnector`]: Turns a connection URI into a connected backend
//! - [`KvBackend`]: A client bound to one target database
//! - [`CollectionHandle`]: An opened collection inside that database
//!
//! # Error Handling
//!
//! Implementations are expected to map driver failures onto the
//! [`KvError`](crate::error::KvError) taxonomy themselves, keeping the driver's
//! message verbatim inside the error text.

use async_trait::async_trait;
use bson::{Bson, Document};
use std::fmt::Debug;

use crate::{error::KvResult, name::CollectionName};

/// Factory for backends, configured once and used on every `connect`.
///
/// # Thread Safety
///
/// Connectors are shared by the session across calls and must be `Send + Sync`.
#[async_trait]
pub trait BackendConnector: Send + Sync + Debug {
    /// The backend produced by this connector.
    type Backend: KvBackend;

    /// Parses `uri` and constructs a client for the database it names.
    ///
    /// This does not have to contact the store; reachability is checked separately
    /// with [`KvBackend::ping`].
    ///
    /// # Errors
    ///
    /// - [`KvError::Configuration`](crate::error::KvError::Configuration) if the URI is
    ///   malformed or does not name a database.
    /// - [`KvError::Connectivity`](crate::error::KvError::Connectivity) if the client
    ///   handle cannot be constructed.
    async fn open(&self, uri: &str) -> KvResult<Self::Backend>;
}

/// A client connected to one target database.
#[async_trait]
pub trait KvBackend: Send + Sync + Debug {
    /// The collection handle type opened by this backend.
    type Handle: CollectionHandle;

    /// Returns the name of the target database.
    fn database(&self) -> &str;

    /// Issues a no-op command against the target database.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Connectivity`](crate::error::KvError::Connectivity) if the
    /// store does not respond successfully.
    async fn ping(&self) -> KvResult<()>;

    /// Opens a handle to the named collection.
    ///
    /// Opening is local and never fails, even when the collection does not exist yet;
    /// stores create collections implicitly on first write.
    fn open_collection(&self, name: &CollectionName) -> Self::Handle;

    /// Releases the client and everything it holds.
    async fn shutdown(self) -> KvResult<()>
    where
        Self: Sized;
}

/// An opened collection.
///
/// Handles are cheap to clone; clones refer to the same underlying collection.
#[async_trait]
pub trait CollectionHandle: Clone + Send + Sync + Debug {
    /// Returns the name of the collection.
    fn name(&self) -> &str;

    /// Creates an ascending, non-unique index on the `key` field.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Store`](crate::error::KvError::Store) if the store rejects the
    /// index (for example a conflicting index already exists) or cannot be reached.
    async fn create_key_index(&self) -> KvResult<()>;

    /// Sets `key` and `value` on the document whose `key` field equals `key`, inserting
    /// a new document if none matches.
    ///
    /// Implementations must do this as a single store-side operation.
    async fn upsert(&self, key: &str, value: Bson) -> KvResult<()>;

    /// Returns the first document whose `key` field equals `key`, if any.
    async fn find_first(&self, key: &str) -> KvResult<Option<Document>>;
}
