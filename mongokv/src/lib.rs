//! Main mongokv crate: a minimal key-value store on top of a document store.
//!
//! This crate is the entry point for users of mongokv. It re-exports the core types
//! and gives access to the available backends.
//!
//! Values live in documents shaped `{ key: <string>, value: <T> }` inside a collection
//! named by the caller. Each collection gets an ascending index on `key` the first time
//! a session touches it.
//!
//! # Quick Start
//!
//! ```ignore
//! use mongokv::{prelude::*, memory::{InMemoryConnector, InMemoryStore}};
//!
//! #[tokio::main]
//! async fn main() -> KvResult<()> {
//!     let session = Session::new(InMemoryConnector::new(InMemoryStore::new()));
//!     session.connect("memory://localhost/testdb").await?;
//!
//!     session.put("counters", "visits", 42_i64).await?;
//!     assert_eq!(session.get::<i64>("counters", "visits").await?, 42);
//!
//!     match session.get::<i64>("counters", "missing").await {
//!         Err(err) if err.kind() == ErrorKind::NotFound => {}
//!         other => panic!("unexpected {other:?}"),
//!     }
//!
//!     session.disconnect().await
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-process store for development and testing
//! - [`mongodb`] - MongoDB backend (requires the `mongodb` feature)

pub mod prelude;

pub use mongokv_core::{backend, cache, codec, error, name, session};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use mongokv_memory::{InMemoryBackend, InMemoryCollection, InMemoryConnector, InMemoryStore};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use mongokv_mongodb::{
        ConnectorOptions, MongoDbBackend, MongoDbCollection, MongoDbConnector, MongoDbConnectorBuilder,
    };
}
