//! Connection configuration and client construction.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::{Client, options::ClientOptions};
use serde::Deserialize;
use tracing::debug;

use mongokv_core::{
    backend::BackendConnector,
    error::{KvError, KvResult},
};

use crate::store::MongoDbBackend;

/// Driver settings applied on top of the connection URI.
///
/// Every field is optional; a set field overrides the corresponding URI option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectorOptions {
    /// Application name reported to the server.
    pub app_name: Option<String>,
    /// How long to wait for a suitable server before an operation fails.
    pub server_selection_timeout_ms: Option<u64>,
    /// How long to wait for a TCP connection to be established.
    pub connect_timeout_ms: Option<u64>,
}

impl ConnectorOptions {
    fn apply(&self, options: &mut ClientOptions) {
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(ms) = self.server_selection_timeout_ms {
            options.server_selection_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(ms) = self.connect_timeout_ms {
            options.connect_timeout = Some(Duration::from_millis(ms));
        }
    }
}

/// Opens [`MongoDbBackend`]s from MongoDB connection strings.
#[derive(Debug, Clone, Default)]
pub struct MongoDbConnector {
    options: ConnectorOptions,
}

impl MongoDbConnector {
    pub fn new(options: ConnectorOptions) -> Self {
        Self { options }
    }

    pub fn builder() -> MongoDbConnectorBuilder {
        MongoDbConnectorBuilder::default()
    }

    pub fn options(&self) -> &ConnectorOptions {
        &self.options
    }
}

#[async_trait]
impl BackendConnector for MongoDbConnector {
    type Backend = MongoDbBackend;

    async fn open(&self, uri: &str) -> KvResult<Self::Backend> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| KvError::Configuration(format!("failed to parse connection uri: {e}")))?;

        let database = options
            .default_database
            .clone()
            .ok_or_else(|| KvError::Configuration("uri doesn't have database".into()))?;

        self.options.apply(&mut options);

        let client = Client::with_options(options)
            .map_err(|e| KvError::Connectivity(format!("failed to create client: {e}")))?;

        debug!(database = %database, "mongodb client constructed");

        Ok(MongoDbBackend::new(client, database))
    }
}

#[derive(Debug, Default)]
pub struct MongoDbConnectorBuilder {
    options: ConnectorOptions,
}

impl MongoDbConnectorBuilder {
    pub fn app_name(mut self, app_name: &str) -> Self {
        self.options.app_name = Some(app_name.to_string());
        self
    }

    pub fn server_selection_timeout_ms(mut self, ms: u64) -> Self {
        self.options.server_selection_timeout_ms = Some(ms);
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.options.connect_timeout_ms = Some(ms);
        self
    }

    pub fn build(self) -> MongoDbConnector {
        MongoDbConnector::new(self.options)
    }
}
