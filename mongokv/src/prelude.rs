//! Convenient re-exports of commonly used types from mongokv.
//!
//! ```ignore
//! use mongokv::prelude::*;
//! ```

pub use mongokv_core::{
    backend::{BackendConnector, CollectionHandle, KvBackend},
    cache::CollectionCache,
    codec::{KvValue, ValueKind},
    error::{ErrorKind, KvError, KvResult},
    name::{CollectionName, MAX_COLLECTION_NAME_LEN},
    session::Session,
};
