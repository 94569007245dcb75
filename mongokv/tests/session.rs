use std::sync::Arc;

use chrono::{DateTime, Utc};
use mongokv::{
    bson::doc,
    codec::{KEY_FIELD, VALUE_FIELD},
    memory::{InMemoryConnector, InMemoryStore},
    prelude::*,
};

const URI: &str = "memory://localhost:27017/testdb";

async fn connected() -> (Session<InMemoryConnector>, InMemoryStore) {
    let store = InMemoryStore::new();
    let session = Session::new(InMemoryConnector::new(store.clone()));
    session.connect(URI).await.unwrap();
    (session, store)
}

#[tokio::test]
async fn basic_scenario() {
    let (session, store) = connected().await;

    session.put("counters", "visits", 42_i64).await.unwrap();
    assert_eq!(session.get::<i64>("counters", "visits").await.unwrap(), 42);

    session
        .put("names", "alice", "Alice Smith".to_string())
        .await
        .unwrap();
    assert_eq!(
        session.get::<String>("names", "alice").await.unwrap(),
        "Alice Smith"
    );

    let err = session.get::<i64>("counters", "missing").await.unwrap_err();
    assert_eq!(
        err,
        KvError::NotFound {
            collection: "counters".into(),
            key: "missing".into(),
        }
    );

    let creations = store.index_creations();
    let err = session
        .put("a_collection_name_too_long", "k", 1_i64)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.index_creations(), creations);
    assert!(store.documents("testdb", "a_collection_name_too_long").await.is_empty());

    session.disconnect().await.unwrap();
}

#[tokio::test]
async fn connect_twice_fails_already_connected() {
    let (session, store) = connected().await;

    assert_eq!(session.connect(URI).await.unwrap_err(), KvError::AlreadyConnected);
    assert_eq!(store.live_clients(), 1);
    assert!(session.is_connected().await);
}

#[tokio::test]
async fn disconnect_without_connect_fails_not_connected() {
    let session = Session::new(InMemoryConnector::default());

    let err = session.disconnect().await.unwrap_err();

    assert_eq!(err, KvError::NotConnected);
    assert_eq!(err.kind(), ErrorKind::Connectivity);
}

#[tokio::test]
async fn operations_require_a_connection() {
    let session = Session::new(InMemoryConnector::default());

    assert_eq!(
        session.put("counters", "visits", 1_i64).await.unwrap_err(),
        KvError::NotConnected
    );
    assert_eq!(
        session.get::<i64>("counters", "visits").await.unwrap_err(),
        KvError::NotConnected
    );
    // connection is checked before the name
    assert_eq!(
        session.get::<i64>("", "visits").await.unwrap_err(),
        KvError::NotConnected
    );
    assert_eq!(session.database().await.unwrap_err(), KvError::NotConnected);
    assert_eq!(
        session.cached_collections().await.unwrap_err(),
        KvError::NotConnected
    );
}

#[tokio::test]
async fn disconnect_releases_client_and_handles() {
    let (session, store) = connected().await;
    session.put("a", "k", 1_i64).await.unwrap();
    session.put("b", "k", 1_i64).await.unwrap();
    assert_eq!(store.live_handles(), 2);

    session.disconnect().await.unwrap();

    assert!(!session.is_connected().await);
    assert_eq!(store.live_handles(), 0);
    assert_eq!(store.live_clients(), 0);
    assert_eq!(store.shutdowns(), 1);
}

#[tokio::test]
async fn failed_shutdown_still_disconnects() {
    let (session, store) = connected().await;
    session.put("counters", "visits", 1_i64).await.unwrap();
    store.fail_shutdown(true);

    let err = session.disconnect().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(!session.is_connected().await);
    assert_eq!(store.shutdowns(), 1);
    assert_eq!(store.live_clients(), 0);
    assert_eq!(store.live_handles(), 0);
    assert_eq!(session.disconnect().await.unwrap_err(), KvError::NotConnected);

    store.fail_shutdown(false);
    session.connect(URI).await.unwrap();
    assert_eq!(session.get::<i64>("counters", "visits").await.unwrap(), 1);
}

#[tokio::test]
async fn reconnect_starts_from_an_empty_cache() {
    let (session, store) = connected().await;
    session.put("counters", "visits", 1_i64).await.unwrap();
    session.put("counters", "visits", 2_i64).await.unwrap();
    assert_eq!(store.index_creations(), 1);

    session.disconnect().await.unwrap();
    session.connect(URI).await.unwrap();

    assert!(session.cached_collections().await.unwrap().is_empty());
    assert_eq!(session.get::<i64>("counters", "visits").await.unwrap(), 2);
    assert_eq!(store.index_creations(), 2);
    assert_eq!(
        session.cached_collections().await.unwrap(),
        vec!["counters".to_string()]
    );
}

#[tokio::test]
async fn configuration_errors_leave_the_session_disconnected() {
    let store = InMemoryStore::new();
    let session = Session::new(InMemoryConnector::new(store.clone()));

    for uri in ["localhost/testdb", "memory://localhost", "memory://localhost/"] {
        let err = session.connect(uri).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration, "{uri}");
    }

    assert!(!session.is_connected().await);
    assert_eq!(store.live_clients(), 0);
    assert_eq!(store.pings(), 0);
}

#[tokio::test]
async fn unreachable_store_fails_connect_without_leaking_the_client() {
    let store = InMemoryStore::new();
    let session = Session::new(InMemoryConnector::new(store.clone()));
    store.set_reachable(false);

    let err = session.connect(URI).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(err.to_string().contains("failed to check connection with database"));
    assert!(!session.is_connected().await);
    assert_eq!(store.live_clients(), 0);
    assert_eq!(store.shutdowns(), 1);

    store.set_reachable(true);
    session.connect(URI).await.unwrap();
    assert_eq!(session.database().await.unwrap(), "testdb");
}

#[tokio::test]
async fn failed_ping_reports_the_ping_error_even_if_shutdown_fails() {
    let store = InMemoryStore::new();
    let session = Session::new(InMemoryConnector::new(store.clone()));
    store.set_reachable(false);
    store.fail_shutdown(true);

    let err = session.connect(URI).await.unwrap_err();

    assert!(err.to_string().contains("failed to check connection with database"));
    assert!(!session.is_connected().await);
    assert_eq!(store.shutdowns(), 1);
    assert_eq!(store.live_clients(), 0);

    store.set_reachable(true);
    store.fail_shutdown(false);
    session.connect(URI).await.unwrap();
    assert!(session.is_connected().await);
}

#[tokio::test]
async fn refused_client_is_a_connectivity_error() {
    let store = InMemoryStore::new();
    let session = Session::new(InMemoryConnector::new(store.clone()));
    store.refuse_clients(true);

    let err = session.connect(URI).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert_eq!(store.pings(), 0);
    assert_eq!(store.shutdowns(), 0);
    assert!(!session.is_connected().await);
}

#[tokio::test]
async fn put_overwrites_the_existing_document() {
    let (session, store) = connected().await;

    session.put("counters", "visits", 1_i64).await.unwrap();
    session.put("counters", "visits", 2_i64).await.unwrap();
    session
        .put("counters", "visits", "many".to_string())
        .await
        .unwrap();

    let docs = store.documents("testdb", "counters").await;
    assert_eq!(docs.len(), 1);
    assert_eq!(session.get::<String>("counters", "visits").await.unwrap(), "many");
}

#[tokio::test]
async fn integer_requested_as_text_is_a_type_mismatch() {
    let (session, _store) = connected().await;
    session.put("counters", "visits", 42_i64).await.unwrap();

    let err = session.get::<String>("counters", "visits").await.unwrap_err();

    assert_eq!(
        err,
        KvError::TypeMismatch {
            expected: ValueKind::Text,
            found: "Int64".into(),
        }
    );
}

#[tokio::test]
async fn document_without_value_is_a_store_error() {
    let (session, store) = connected().await;
    store
        .insert_raw("testdb", "broken", doc! { KEY_FIELD: "k" })
        .await;

    let err = session.get::<i64>("broken", "k").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(err.to_string().contains("value field is missing"));
}

#[tokio::test]
async fn first_matching_document_wins() {
    let (session, store) = connected().await;
    store
        .insert_raw("testdb", "dups", doc! { KEY_FIELD: "k", VALUE_FIELD: 1_i64 })
        .await;
    store
        .insert_raw("testdb", "dups", doc! { KEY_FIELD: "k", VALUE_FIELD: 2_i64 })
        .await;

    assert_eq!(session.get::<i64>("dups", "k").await.unwrap(), 1);
}

#[tokio::test]
async fn every_supported_type_round_trips() {
    let (session, _store) = connected().await;
    let at = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();

    session.put("values", "int", i64::MIN).await.unwrap();
    session.put("values", "text", "héllo wörld".to_string()).await.unwrap();
    session.put("values", "empty", String::new()).await.unwrap();
    session.put("values", "double", -0.25_f64).await.unwrap();
    session.put("values", "bool", true).await.unwrap();
    session.put("values", "at", at).await.unwrap();

    assert_eq!(session.get::<i64>("values", "int").await.unwrap(), i64::MIN);
    assert_eq!(session.get::<String>("values", "text").await.unwrap(), "héllo wörld");
    assert_eq!(session.get::<String>("values", "empty").await.unwrap(), "");
    assert_eq!(session.get::<f64>("values", "double").await.unwrap(), -0.25);
    assert!(session.get::<bool>("values", "bool").await.unwrap());
    assert_eq!(session.get::<DateTime<Utc>>("values", "at").await.unwrap(), at);
}

#[tokio::test]
async fn keys_are_scoped_by_collection() {
    let (session, _store) = connected().await;
    session.put("a", "k", 1_i64).await.unwrap();
    session.put("b", "k", 2_i64).await.unwrap();

    assert_eq!(session.get::<i64>("a", "k").await.unwrap(), 1);
    assert_eq!(session.get::<i64>("b", "k").await.unwrap(), 2);
}

#[tokio::test]
async fn failed_index_creation_is_retried_on_the_next_call() {
    let (session, store) = connected().await;
    store.fail_index_creation("counters", "connection reset").await;

    let err = session.put("counters", "visits", 1_i64).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(err.to_string().contains("connection reset"));
    assert!(session.cached_collections().await.unwrap().is_empty());
    assert!(store.documents("testdb", "counters").await.is_empty());

    store.clear_index_failure("counters").await;

    session.put("counters", "visits", 1_i64).await.unwrap();
    assert_eq!(session.get::<i64>("counters", "visits").await.unwrap(), 1);
    assert_eq!(store.index_creations(), 1);
}

#[tokio::test]
async fn store_failures_surface_as_store_errors() {
    let (session, store) = connected().await;
    session.put("counters", "visits", 1_i64).await.unwrap();

    store.set_reachable(false);

    let err = session.put("counters", "visits", 2_i64).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(err.to_string().contains("failed to put value"));

    let err = session.get::<i64>("counters", "visits").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}

#[tokio::test]
async fn sessions_sharing_a_store_see_each_others_writes() {
    let store = InMemoryStore::new();
    let first = Session::new(InMemoryConnector::new(store.clone()));
    let second = Session::new(InMemoryConnector::new(store.clone()));
    first.connect(URI).await.unwrap();
    second.connect(URI).await.unwrap();

    first.put("counters", "visits", 1_i64).await.unwrap();
    second.put("counters", "visits", 2_i64).await.unwrap();

    assert_eq!(first.get::<i64>("counters", "visits").await.unwrap(), 2);
    assert_eq!(store.documents("testdb", "counters").await.len(), 1);
    // each session provisions its own handle
    assert_eq!(store.index_creations(), 2);
}

#[tokio::test]
async fn concurrent_callers_are_serialized() {
    let (session, store) = connected().await;
    let session = Arc::new(session);

    let tasks = (0..16_i64)
        .map(|i| {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session.put("counters", &format!("k{}", i % 4), i).await
            })
        })
        .collect::<Vec<_>>();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.index_creations(), 1);
    assert_eq!(store.documents("testdb", "counters").await.len(), 4);
}
