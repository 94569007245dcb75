//! Shared in-memory state behind every in-memory connector, client and handle.
//!
//! Documents are kept per `(database, collection)` namespace in insertion order, so
//! "the first matching document" is well defined.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

use bson::{Bson, Document, doc, oid::ObjectId};
use mea::rwlock::RwLock;

use mongokv_core::codec::{KEY_FIELD, VALUE_FIELD};

type Namespace = (String, String);
type NamespaceMap = HashMap<Namespace, Vec<Document>>;

#[derive(Debug, Default)]
struct Counters {
    index_creations: AtomicUsize,
    pings: AtomicUsize,
    live_clients: AtomicUsize,
    live_handles: AtomicUsize,
    shutdowns: AtomicUsize,
    next_handle_id: AtomicU64,
}

#[derive(Debug, Default)]
struct Faults {
    unreachable: AtomicBool,
    refuse_clients: AtomicBool,
    fail_shutdown: AtomicBool,
}

/// Thread-safe in-memory document storage.
///
/// `InMemoryStore` is cloneable; clones share the same documents, counters and
/// injected faults.
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// (database, collection) -> documents
    documents: Arc<RwLock<NamespaceMap>>,
    /// Namespaces with a `key` index
    indexed: Arc<RwLock<HashSet<Namespace>>>,
    /// collection name -> error message reported by index creation
    index_failures: Arc<RwLock<HashMap<String, String>>>,
    counters: Arc<Counters>,
    faults: Arc<Faults>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the store unreachable (or reachable again). While unreachable, pings fail
    /// with a connectivity error and collection operations fail with a store error.
    pub fn set_reachable(&self, reachable: bool) {
        self.faults.unreachable.store(!reachable, Ordering::SeqCst);
    }

    /// Makes client construction fail.
    pub fn refuse_clients(&self, refuse: bool) {
        self.faults.refuse_clients.store(refuse, Ordering::SeqCst);
    }

    /// Makes client shutdown report an error. The client is still released.
    pub fn fail_shutdown(&self, fail: bool) {
        self.faults.fail_shutdown.store(fail, Ordering::SeqCst);
    }

    /// Makes index creation fail for every collection called `collection`.
    pub async fn fail_index_creation(&self, collection: &str, message: &str) {
        self.index_failures
            .write()
            .await
            .insert(collection.to_string(), message.to_string());
    }

    pub async fn clear_index_failure(&self, collection: &str) {
        self.index_failures.write().await.remove(collection);
    }

    /// Number of successful index creations across all clients.
    pub fn index_creations(&self) -> usize {
        self.counters.index_creations.load(Ordering::SeqCst)
    }

    /// Number of explicit client shutdowns, failed ones included.
    pub fn shutdowns(&self) -> usize {
        self.counters.shutdowns.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> usize {
        self.counters.pings.load(Ordering::SeqCst)
    }

    /// Number of clients that have been opened and not yet released.
    pub fn live_clients(&self) -> usize {
        self.counters.live_clients.load(Ordering::SeqCst)
    }

    /// Number of collection handles that have been opened and not yet released.
    pub fn live_handles(&self) -> usize {
        self.counters.live_handles.load(Ordering::SeqCst)
    }

    pub async fn has_key_index(&self, database: &str, collection: &str) -> bool {
        self.indexed
            .read()
            .await
            .contains(&namespace(database, collection))
    }

    /// Returns a copy of every document in the collection, in insertion order.
    pub async fn documents(&self, database: &str, collection: &str) -> Vec<Document> {
        self.documents
            .read()
            .await
            .get(&namespace(database, collection))
            .cloned()
            .unwrap_or_default()
    }

    /// Appends a document as-is, bypassing the upsert protocol.
    pub async fn insert_raw(&self, database: &str, collection: &str, document: Document) {
        self.documents
            .write()
            .await
            .entry(namespace(database, collection))
            .or_default()
            .push(document);
    }

    pub(crate) fn is_reachable(&self) -> bool {
        !self.faults.unreachable.load(Ordering::SeqCst)
    }

    pub(crate) fn refuses_clients(&self) -> bool {
        self.faults.refuse_clients.load(Ordering::SeqCst)
    }

    pub(crate) fn record_ping(&self) {
        self.counters.pings.fetch_add(1, Ordering::SeqCst);
    }

    /// Counts a shutdown and reports whether it should fail.
    pub(crate) fn record_shutdown(&self) -> bool {
        self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.faults.fail_shutdown.load(Ordering::SeqCst)
    }

    pub(crate) fn client_opened(&self) {
        self.counters.live_clients.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn client_released(&self) {
        self.counters.live_clients.fetch_sub(1, Ordering::SeqCst);
    }

    /// Registers a new handle and returns its identifier.
    pub(crate) fn handle_opened(&self) -> u64 {
        self.counters.live_handles.fetch_add(1, Ordering::SeqCst);
        self.counters.next_handle_id.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn handle_released(&self) {
        self.counters.live_handles.fetch_sub(1, Ordering::SeqCst);
    }

    /// Creates the `key` index, or returns the injected failure message.
    pub(crate) async fn create_key_index(&self, database: &str, collection: &str) -> Result<(), String> {
        if let Some(message) = self.index_failures.read().await.get(collection) {
            return Err(message.clone());
        }

        self.indexed
            .write()
            .await
            .insert(namespace(database, collection));
        self.counters.index_creations.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    /// Sets `key` and `value` on the first document holding `key`, or appends a new one.
    /// Runs under a single write lock.
    pub(crate) async fn upsert(&self, database: &str, collection: &str, key: &str, value: Bson) {
        let mut documents = self.documents.write().await;
        let collection_docs = documents
            .entry(namespace(database, collection))
            .or_default();

        match collection_docs.iter_mut().find(|doc| holds_key(doc, key)) {
            Some(existing) => {
                existing.insert(KEY_FIELD, key);
                existing.insert(VALUE_FIELD, value);
            }
            None => collection_docs.push(doc! {
                "_id": ObjectId::new(),
                KEY_FIELD: key,
                VALUE_FIELD: value,
            }),
        }
    }

    pub(crate) async fn find_first(&self, database: &str, collection: &str, key: &str) -> Option<Document> {
        self.documents
            .read()
            .await
            .get(&namespace(database, collection))
            .and_then(|docs| docs.iter().find(|doc| holds_key(doc, key)))
            .cloned()
    }
}

fn namespace(database: &str, collection: &str) -> Namespace {
    (database.to_string(), collection.to_string())
}

fn holds_key(document: &Document, key: &str) -> bool {
    matches!(document.get(KEY_FIELD), Some(Bson::String(k)) if k == key)
}
