//! Error types and result types for key-value operations.
//!
//! Every fallible operation returns [`KvResult<T>`]. Callers that need to branch on the
//! broad failure category rather than the exact variant can use [`KvError::kind`].

use std::fmt;

use thiserror::Error;

use crate::codec::ValueKind;

/// Represents all possible errors that can occur when talking to the key-value store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    /// The connection descriptor is malformed or incomplete.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The store could not be reached, or a client could not be constructed.
    #[error("Connectivity error: {0}")]
    Connectivity(String),
    /// `connect` was called while a connection is already established.
    #[error("Connectivity error: client is already created")]
    AlreadyConnected,
    /// An operation that requires a connection was called without one.
    #[error("Connectivity error: client isn't initialized")]
    NotConnected,
    /// A collection name was rejected.
    #[error("Validation error: {0}")]
    Validation(String),
    /// No document exists for the key in the collection.
    #[error("Key {key} doesn't exist in collection {collection}")]
    NotFound {
        collection: String,
        key: String,
    },
    /// The stored value has a different type than the one requested.
    #[error("Type mismatch: key doesn't hold value of expected type {expected} (found {found})")]
    TypeMismatch {
        expected: ValueKind,
        found: String,
    },
    /// Any other failure reported by the underlying store. The driver's message is kept verbatim.
    #[error("Store error: {0}")]
    Store(String),
}

/// The broad category of a [`KvError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Connectivity,
    Validation,
    NotFound,
    TypeMismatch,
    Store,
}

impl KvError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KvError::Configuration(_) => ErrorKind::Configuration,
            KvError::Connectivity(_) | KvError::AlreadyConnected | KvError::NotConnected => {
                ErrorKind::Connectivity
            }
            KvError::Validation(_) => ErrorKind::Validation,
            KvError::NotFound { .. } => ErrorKind::NotFound,
            KvError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            KvError::Store(_) => ErrorKind::Store,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not found",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::Store => "store",
        })
    }
}

/// A specialized `Result` type for key-value operations.
pub type KvResult<T> = Result<T, KvError>;
