//! Versioned key-value storage.
//!
//! The store maps each key to its [`VersionChain`]. It has no notion of
//! transactions or visibility; callers decide which versions to read
//! or close.

mod version;

pub use version::{VersionChain, VersionedValue};

use std::collections::HashMap;

/// Key to version chain mapping, owned by the database.
#[derive(Debug, Default)]
pub(crate) struct Store {
    chains: HashMap<String, VersionChain>,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the chain for `key`, if anything was ever written to it.
    pub(crate) fn chain(&self, key: &str) -> Option<&VersionChain> {
        self.chains.get(key)
    }

    /// Returns the chain for `key` for closing versions in place.
    pub(crate) fn chain_mut(&mut self, key: &str) -> Option<&mut VersionChain> {
        self.chains.get_mut(key)
    }

    /// Returns the chain for `key`, creating an empty one if needed.
    pub(crate) fn chain_entry(&mut self, key: &str) -> &mut VersionChain {
        self.chains.entry(key.to_string()).or_default()
    }

    /// Iterates all keys with their chains, in no particular order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &VersionChain)> {
        self.chains.iter()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.chains.len()
    }

    pub(crate) fn version_count(&self) -> usize {
        self.chains.values().map(VersionChain::len).sum()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.chains.values().map(VersionChain::live_count).sum()
    }
}
