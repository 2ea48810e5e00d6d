//! Database configuration.

use crate::types::IsolationLevel;

/// Configuration for creating a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Isolation level assigned to every new transaction.
    pub default_isolation: IsolationLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // The only level with a defined visibility rule.
            default_isolation: IsolationLevel::ReadUncommitted,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the isolation level for new transactions.
    #[must_use]
    pub const fn default_isolation(mut self, level: IsolationLevel) -> Self {
        self.default_isolation = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.default_isolation, IsolationLevel::ReadUncommitted);
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new().default_isolation(IsolationLevel::Serializable);
        assert_eq!(config.default_isolation, IsolationLevel::Serializable);
    }
}
