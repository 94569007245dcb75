use async_trait::async_trait;
use bson::{Bson, Document, doc};
use mongodb::{Client, Collection as MongoCollection, IndexModel};
use tracing::debug;

use mongokv_core::{
    backend::{CollectionHandle, KvBackend},
    codec::{KEY_FIELD, VALUE_FIELD},
    error::{KvError, KvResult},
    name::CollectionName,
};

#[derive(Debug, Clone)]
pub struct MongoDbBackend {
    client: Client,
    database: String,
}

impl MongoDbBackend {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }
}

#[async_trait]
impl KvBackend for MongoDbBackend {
    type Handle = MongoDbCollection;

    fn database(&self) -> &str {
        &self.database
    }

    async fn ping(&self) -> KvResult<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                KvError::Connectivity(format!("failed to check connection with database: {e}"))
            })?;

        Ok(())
    }

    fn open_collection(&self, name: &CollectionName) -> Self::Handle {
        MongoDbCollection {
            inner: self
                .client
                .database(&self.database)
                .collection(name.as_str()),
        }
    }

    async fn shutdown(self) -> KvResult<()> {
        self.client.shutdown().await;

        debug!(database = %self.database, "mongodb client shut down");

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MongoDbCollection {
    inner: MongoCollection<Document>,
}

#[async_trait]
impl CollectionHandle for MongoDbCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn create_key_index(&self) -> KvResult<()> {
        self.inner
            .create_index(IndexModel::builder().keys(doc! { KEY_FIELD: 1_i64 }).build())
            .await
            .map_err(|e| KvError::Store(format!("failed to create index for collection: {e}")))?;

        Ok(())
    }

    async fn upsert(&self, key: &str, value: Bson) -> KvResult<()> {
        self.inner
            .update_one(
                doc! { KEY_FIELD: key },
                doc! { "$set": { KEY_FIELD: key, VALUE_FIELD: value } },
            )
            .upsert(true)
            .await
            .map_err(|e| KvError::Store(format!("failed to put value: {e}")))?;

        Ok(())
    }

    async fn find_first(&self, key: &str) -> KvResult<Option<Document>> {
        self.inner
            .find_one(doc! { KEY_FIELD: key })
            .await
            .map_err(|e| KvError::Store(format!("failed to find key: {e}")))
    }
}
