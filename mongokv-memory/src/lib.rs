//! In-memory key-value backend for mongokv.
//!
//! This crate provides an in-process implementation of the mongokv backend traits. It
//! behaves like a document store reached through a `memory://host/database` URI and is
//! instrumented so the session's lifecycle and caching behavior can be observed:
//!
//! - **Reachability toggle** - Make pings and operations fail as if the store were down
//! - **Fault injection** - Reject index creation for chosen collections
//! - **Counters** - Index creations, pings, live client and collection handles
//! - **Raw access** - Inspect stored documents or inject arbitrary ones
//!
//! Several connectors built from clones of one [`InMemoryStore`] share its data, which
//! models independent processes talking to the same server.
//!
//! # Quick Start
//!
//! ```ignore
//! use mongokv_core::session::Session;
//! use mongokv_memory::{InMemoryConnector, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! let session = Session::new(InMemoryConnector::new(store.clone()));
//!
//! session.connect("memory://localhost/testdb").await?;
//! session.put("counters", "visits", 42_i64).await?;
//!
//! assert_eq!(store.index_creations(), 1);
//! ```

pub mod backend;
pub mod store;

pub use backend::{InMemoryBackend, InMemoryCollection, InMemoryConnector};
pub use store::InMemoryStore;
