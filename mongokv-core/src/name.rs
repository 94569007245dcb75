//! Collection name validation.
//!
//! Every operation that takes a collection name validates it before touching the
//! collection cache or the network. A name is accepted when it is non-empty and at
//! most [`MAX_COLLECTION_NAME_LEN`] bytes long; there are no character restrictions.

use std::{borrow::Borrow, fmt, ops::Deref};

use crate::error::{KvError, KvResult};

/// The longest accepted collection name, in bytes (inclusive).
pub const MAX_COLLECTION_NAME_LEN: usize = 15;

/// A collection name that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionName(String);

impl CollectionName {
    /// Validates `name` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Validation`] if the name is empty or longer than
    /// [`MAX_COLLECTION_NAME_LEN`] bytes.
    pub fn new(name: &str) -> KvResult<Self> {
        if name.is_empty() || name.len() > MAX_COLLECTION_NAME_LEN {
            return Err(KvError::Validation(format!(
                "collection name must be non empty and with {MAX_COLLECTION_NAME_LEN} bytes max",
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for CollectionName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CollectionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for CollectionName {
    type Error = KvError;

    fn try_from(name: &str) -> KvResult<Self> {
        Self::new(name)
    }
}
