//! MongoDB backend implementation for mongokv.
//!
//! This crate implements the mongokv backend traits on top of the official async
//! MongoDB driver. To use it through the facade crate, enable the `mongodb` feature:
//!
//! ```toml
//! [dependencies]
//! mongokv = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! Connections are described by a standard MongoDB connection string, which must name
//! the target database in its path (`mongodb://host:27017/testdb`). Driver settings not
//! covered by the URI can be supplied through [`ConnectorOptions`].
//!
//! # Example
//!
//! ```ignore
//! use mongokv_core::session::Session;
//! use mongokv_mongodb::MongoDbConnector;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::new(
//!         MongoDbConnector::builder()
//!             .app_name("mongokv")
//!             .server_selection_timeout_ms(2_000)
//!             .build(),
//!     );
//!
//!     session.connect("mongodb://localhost:27017/testdb").await?;
//!     session.put("counters", "visits", 42_i64).await?;
//!     session.disconnect().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod connector;
pub mod store;

pub use connector::{ConnectorOptions, MongoDbConnector, MongoDbConnectorBuilder};
pub use store::{MongoDbBackend, MongoDbCollection};
