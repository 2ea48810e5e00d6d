//! Property-based test generators using proptest.
//!
//! Keys are drawn from a small pool so generated scripts keep hitting
//! the same version chains.

use proptest::prelude::*;

/// One step of a generated command script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOp {
    /// `begin`
    Begin,
    /// `abort`
    Abort,
    /// `commit`
    Commit,
    /// `get key`
    Get(String),
    /// `set key value`
    Set(String, String),
    /// `delete key`
    Delete(String),
}

impl ScriptOp {
    /// Returns the protocol command name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Abort => "abort",
            Self::Commit => "commit",
            Self::Get(_) => "get",
            Self::Set(_, _) => "set",
            Self::Delete(_) => "delete",
        }
    }

    /// Returns the command arguments.
    pub fn args(&self) -> Vec<&str> {
        match self {
            Self::Begin | Self::Abort | Self::Commit => Vec::new(),
            Self::Get(key) | Self::Delete(key) => vec![key.as_str()],
            Self::Set(key, value) => vec![key.as_str(), value.as_str()],
        }
    }

    /// Returns true for commands that run inside a transaction.
    pub fn needs_transaction(&self) -> bool {
        !matches!(self, Self::Begin)
    }
}

/// Strategy for keys from a pool of four.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(str::to_string)
}

/// Strategy for short printable values.
pub fn value_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,8}").expect("Invalid regex")
}

/// Strategy for a single script step, weighted towards data commands.
pub fn script_op_strategy() -> impl Strategy<Value = ScriptOp> {
    prop_oneof![
        1 => Just(ScriptOp::Begin),
        1 => Just(ScriptOp::Abort),
        1 => Just(ScriptOp::Commit),
        4 => key_strategy().prop_map(ScriptOp::Get),
        4 => (key_strategy(), value_strategy()).prop_map(|(k, v)| ScriptOp::Set(k, v)),
        2 => key_strategy().prop_map(ScriptOp::Delete),
    ]
}

/// Strategy for a script of steps, each tagged with one of
/// `connections` connection indexes.
pub fn script_strategy(
    connections: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<(usize, ScriptOp)>> {
    prop::collection::vec((0..connections, script_op_strategy()), 1..max_len)
}
