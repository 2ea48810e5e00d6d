//! # mvkv Testkit
//!
//! Test utilities for mvkv.
//!
//! This crate provides:
//! - Test fixtures and connection helpers
//! - Property-based test generators using proptest
//! - Stress testing utilities for concurrent connections
//!
//! ## Usage
//!
//! ```rust
//! use mvkv_testkit::prelude::*;
//!
//! with_temp_db(|db| {
//!     let mut conn = db.new_connection();
//!     conn.must_execute("begin", &[]);
//!     assert_eq!(conn.must_execute("set", &["x", "1"]), "1");
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
