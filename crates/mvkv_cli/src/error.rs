//! Error types for the CLI.

use mvkv_core::CoreError;
use std::io;
use thiserror::Error;

/// Errors that stop a shell session.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Report serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A script line broke the command protocol.
    #[error("line {line}: {connection}: {source}")]
    Fatal {
        /// 1-based script line.
        line: usize,
        /// Connection the command ran on.
        connection: String,
        /// The protocol violation.
        #[source]
        source: CoreError,
    },
}
