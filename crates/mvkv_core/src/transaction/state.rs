//! Transaction state.

use crate::error::{CoreError, CoreResult};
use crate::types::{IsolationLevel, TransactionId};
use std::collections::BTreeSet;

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    /// Transaction is running and can execute commands.
    InProgress,
    /// Transaction has been aborted.
    Aborted,
    /// Transaction has been committed.
    Committed,
}

impl TransactionState {
    /// Returns true for `Aborted` and `Committed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// A unit of work against the database.
///
/// The database keeps one record per transaction forever; connections
/// hold their own copy while the transaction runs and hand it back on
/// completion.
///
/// The in-progress snapshot, read set and write set are collected for
/// the stricter isolation levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction ID.
    id: TransactionId,
    /// Isolation level the transaction runs at.
    isolation: IsolationLevel,
    /// Current state.
    state: TransactionState,
    /// Transactions that were in progress when this one started.
    in_progress: BTreeSet<TransactionId>,
    /// Keys read.
    read_set: BTreeSet<String>,
    /// Keys written or deleted.
    write_set: BTreeSet<String>,
}

impl Transaction {
    /// Creates a new in-progress transaction.
    pub(crate) fn new(
        id: TransactionId,
        isolation: IsolationLevel,
        in_progress: BTreeSet<TransactionId>,
    ) -> Self {
        Self {
            id,
            isolation,
            state: TransactionState::InProgress,
            in_progress,
            read_set: BTreeSet::new(),
            write_set: BTreeSet::new(),
        }
    }

    /// Returns the transaction ID.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the isolation level.
    #[must_use]
    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction is still in progress.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.state == TransactionState::InProgress
    }

    /// Returns the ids that were in progress when this transaction began.
    #[must_use]
    pub fn in_progress(&self) -> &BTreeSet<TransactionId> {
        &self.in_progress
    }

    /// Returns the keys this transaction has read.
    #[must_use]
    pub fn read_set(&self) -> &BTreeSet<String> {
        &self.read_set
    }

    /// Returns the keys this transaction has written or deleted.
    #[must_use]
    pub fn write_set(&self) -> &BTreeSet<String> {
        &self.write_set
    }

    pub(crate) fn record_read(&mut self, key: &str) {
        if !self.read_set.contains(key) {
            self.read_set.insert(key.to_string());
        }
    }

    pub(crate) fn record_write(&mut self, key: &str) {
        if !self.write_set.contains(key) {
            self.write_set.insert(key.to_string());
        }
    }

    /// Moves the transaction into a terminal state.
    pub(crate) fn finish(&mut self, state: TransactionState) -> CoreResult<()> {
        if !state.is_terminal() {
            return Err(CoreError::protocol_violation(
                "transaction can only complete as aborted or committed",
            ));
        }
        match self.state {
            TransactionState::InProgress => {
                self.state = state;
                Ok(())
            }
            TransactionState::Committed => Err(CoreError::protocol_violation(
                "transaction already committed",
            )),
            TransactionState::Aborted => Err(CoreError::protocol_violation(
                "transaction already aborted",
            )),
        }
    }
}
