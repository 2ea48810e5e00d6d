//! Command parsing.

use crate::error::{CoreError, CoreResult};

/// A parsed protocol command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Start a transaction on the connection.
    Begin,
    /// Abort the active transaction.
    Abort,
    /// Commit the active transaction.
    Commit,
    /// Read the newest visible value of a key.
    Get {
        /// Key to read.
        key: &'a str,
    },
    /// Write a new version of a key.
    Set {
        /// Key to write.
        key: &'a str,
        /// New value.
        value: &'a str,
    },
    /// End the visible versions of a key.
    Delete {
        /// Key to delete.
        key: &'a str,
    },
}

impl<'a> Command<'a> {
    /// Parses a command name and its arguments.
    ///
    /// Unknown names fail with [`CoreError::Unimplemented`]; a wrong
    /// argument count fails with [`CoreError::InvalidArguments`].
    pub fn parse(name: &str, args: &[&'a str]) -> CoreResult<Self> {
        let command = match name {
            "begin" => {
                arity("begin", args, 0)?;
                Self::Begin
            }
            "abort" => {
                arity("abort", args, 0)?;
                Self::Abort
            }
            "commit" => {
                arity("commit", args, 0)?;
                Self::Commit
            }
            "get" => {
                arity("get", args, 1)?;
                Self::Get { key: args[0] }
            }
            "set" => {
                arity("set", args, 2)?;
                Self::Set {
                    key: args[0],
                    value: args[1],
                }
            }
            "delete" => {
                arity("delete", args, 1)?;
                Self::Delete { key: args[0] }
            }
            other => return Err(CoreError::unimplemented(other)),
        };
        Ok(command)
    }

    /// Returns the protocol name of the command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Abort => "abort",
            Self::Commit => "commit",
            Self::Get { .. } => "get",
            Self::Set { .. } => "set",
            Self::Delete { .. } => "delete",
        }
    }
}

fn arity(command: &'static str, args: &[&str], expected: usize) -> CoreResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CoreError::InvalidArguments {
            command,
            expected,
            actual: args.len(),
        })
    }
}
