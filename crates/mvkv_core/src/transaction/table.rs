//! Transaction table.

use crate::transaction::state::{Transaction, TransactionState};
use crate::types::TransactionId;
use std::collections::{BTreeMap, BTreeSet};

/// Every transaction the database has started, keyed by id.
///
/// Records are replaced on completion and never removed.
#[derive(Debug, Default)]
pub(crate) struct TransactionTable {
    transactions: BTreeMap<TransactionId, Transaction>,
}

impl TransactionTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `txn`.
    pub(crate) fn store(&mut self, txn: Transaction) {
        self.transactions.insert(txn.id(), txn);
    }

    pub(crate) fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.get(&id)
    }

    /// Collects the ids of all transactions still in progress.
    pub(crate) fn in_progress(&self) -> BTreeSet<TransactionId> {
        self.transactions
            .iter()
            .filter(|(_, txn)| txn.is_in_progress())
            .map(|(&id, _)| id)
            .collect()
    }

    pub(crate) fn count(&self, state: TransactionState) -> usize {
        self.transactions
            .values()
            .filter(|txn| txn.state() == state)
            .count()
    }

    pub(crate) fn len(&self) -> usize {
        self.transactions.len()
    }
}
