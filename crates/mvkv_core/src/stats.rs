//! Database statistics.

/// Point-in-time counters describing a database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Keys that have ever been written.
    pub keys: usize,
    /// Versions across all chains.
    pub versions: usize,
    /// Versions nobody has ended yet.
    pub live_versions: usize,
    /// Transactions still in progress.
    pub in_progress: usize,
    /// Committed transactions.
    pub committed: usize,
    /// Aborted transactions.
    pub aborted: usize,
    /// Id the next transaction will receive.
    pub next_transaction_id: u64,
}

impl DatabaseStats {
    /// Total number of transactions ever started.
    #[must_use]
    pub fn transactions(&self) -> usize {
        self.in_progress + self.committed + self.aborted
    }

    /// Versions that have been superseded or deleted.
    #[must_use]
    pub fn ended_versions(&self) -> usize {
        self.versions - self.live_versions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_counters() {
        let stats = DatabaseStats {
            keys: 2,
            versions: 5,
            live_versions: 2,
            in_progress: 1,
            committed: 3,
            aborted: 1,
            next_transaction_id: 6,
        };
        assert_eq!(stats.transactions(), 5);
        assert_eq!(stats.ended_versions(), 3);
    }
}
