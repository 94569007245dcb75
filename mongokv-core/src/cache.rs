//! Per-connection cache of provisioned collection handles.
//!
//! A handle enters the cache only after its `key` index has been created, so a cached
//! handle is always ready for point lookups. Entries are never evicted one at a time;
//! the whole cache is released when the owning connection is torn down.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    backend::{CollectionHandle, KvBackend},
    error::KvResult,
    name::CollectionName,
};

/// Maps collection names to opened, index-provisioned handles.
#[derive(Debug)]
pub struct CollectionCache<H: CollectionHandle> {
    handles: HashMap<CollectionName, H>,
}

impl<H: CollectionHandle> CollectionCache<H> {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }

    /// Returns the handle for `name`, opening and provisioning it on a miss.
    ///
    /// A hit performs no store round trip. On a miss the handle is opened through
    /// `backend` and its `key` index is created before the handle is cached.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Store`](crate::error::KvError::Store) if index creation fails.
    /// The freshly opened handle is dropped and nothing is cached for `name`, so a later
    /// call starts over.
    pub async fn fetch<B>(&mut self, backend: &B, name: &CollectionName) -> KvResult<H>
    where
        B: KvBackend<Handle = H>,
    {
        if let Some(handle) = self.handles.get(name) {
            debug!(collection = %name, "collection cache hit");
            return Ok(handle.clone());
        }

        debug!(collection = %name, "collection cache miss, provisioning");

        let handle = backend.open_collection(name);
        handle.create_key_index().await?;

        self.handles.insert(name.clone(), handle.clone());

        Ok(handle)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the cached collection names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self
            .handles
            .keys()
            .map(|name| name.to_string())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    /// Releases every cached handle.
    pub fn clear(&mut self) {
        debug!(handles = self.handles.len(), "releasing cached collections");
        self.handles.clear();
    }
}

impl<H: CollectionHandle> Default for CollectionCache<H> {
    fn default() -> Self {
        Self::new()
    }
}
