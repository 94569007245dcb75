//! A minimal key-value layer over a networked document store.
//!
//! This crate is the core of the mongokv project and provides:
//!
//! - **Collection names** ([`name`]) - Validation of caller-supplied collection names
//! - **Value codecs** ([`codec`]) - Typed encoding and decoding of stored values
//! - **Backend abstraction** ([`backend`]) - Traits implemented by concrete document stores
//! - **Collection cache** ([`cache`]) - Lazily provisioned, per-connection collection handles
//! - **Session** ([`session`]) - Connection lifecycle plus the `put`/`get` protocol
//! - **Error handling** ([`error`]) - The error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use mongokv_core::session::Session;
//!
//! let session = Session::new(connector);
//! session.connect("mongodb://localhost:27017/testdb").await?;
//!
//! session.put("counters", "visits", 42_i64).await?;
//! let visits: i64 = session.get("counters", "visits").await?;
//!
//! session.disconnect().await?;
//! ```

pub mod backend;
pub mod cache;
pub mod codec;
pub mod error;
pub mod name;
pub mod session;
