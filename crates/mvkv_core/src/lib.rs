//! # mvkv Core
//!
//! Multi-version concurrency control engine for mvkv.
//!
//! This crate provides:
//! - Append-only version chains per key
//! - Transaction lifecycle with a permanent transaction table
//! - Visibility rules dispatched on isolation level
//! - A connection-level command protocol (`begin`, `abort`, `commit`,
//!   `get`, `set`, `delete`)
//!
//! ## Example
//!
//! ```rust
//! use mvkv_core::{Config, Database, IsolationLevel};
//!
//! let db = Database::new(Config::new().default_isolation(IsolationLevel::ReadUncommitted));
//!
//! let mut writer = db.new_connection();
//! let mut reader = db.new_connection();
//! writer.execute("begin", &[]).unwrap();
//! reader.execute("begin", &[]).unwrap();
//!
//! writer.execute("set", &["x", "hey"]).unwrap();
//! // Read uncommitted: the write is visible before commit.
//! assert_eq!(reader.execute("get", &["x"]).unwrap(), "hey");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod connection;
mod database;
mod error;
mod stats;
mod store;
mod transaction;
mod types;
pub mod visibility;

pub use config::Config;
pub use connection::{Command, Connection};
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use stats::DatabaseStats;
pub use store::{VersionChain, VersionedValue};
pub use transaction::{Transaction, TransactionState};
pub use types::{IsolationLevel, TransactionId};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
