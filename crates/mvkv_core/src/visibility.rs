//! Visibility rules.
//!
//! Whether a transaction may observe a stored version depends only on the
//! transaction and the version. The rule is picked from the transaction's
//! isolation level:
//!
//! | level | rule |
//! |---|---|
//! | read-uncommitted | any version nobody has ended, including dirty writes |
//! | read-committed | not supported |
//! | repeatable-read | not supported |
//! | snapshot | not supported |
//! | serializable | not supported |
//!
//! Levels without a rule fail with [`CoreError::UnsupportedIsolation`]
//! rather than borrowing the read-uncommitted rule.

use crate::error::{CoreError, CoreResult};
use crate::store::VersionedValue;
use crate::transaction::Transaction;
use crate::types::IsolationLevel;

type Predicate = fn(&Transaction, &VersionedValue) -> bool;

/// A visibility rule bound to one transaction.
#[derive(Clone, Copy)]
pub struct VisibilityRule<'a> {
    txn: &'a Transaction,
    predicate: Predicate,
}

impl<'a> VisibilityRule<'a> {
    /// Resolves the rule for `txn`'s isolation level.
    pub fn for_transaction(txn: &'a Transaction) -> CoreResult<Self> {
        Ok(Self {
            txn,
            predicate: predicate(txn.isolation())?,
        })
    }

    /// Returns true if the bound transaction may observe `value`.
    #[must_use]
    pub fn is_visible(&self, value: &VersionedValue) -> bool {
        (self.predicate)(self.txn, value)
    }
}

impl std::fmt::Debug for VisibilityRule<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityRule")
            .field("txn", &self.txn.id())
            .field("isolation", &self.txn.isolation())
            .finish()
    }
}

/// Returns true if `txn` may observe `value`.
pub fn is_visible(txn: &Transaction, value: &VersionedValue) -> CoreResult<bool> {
    Ok(VisibilityRule::for_transaction(txn)?.is_visible(value))
}

/// Returns true if `level` has a visibility rule.
#[must_use]
pub fn is_supported(level: IsolationLevel) -> bool {
    predicate(level).is_ok()
}

fn predicate(level: IsolationLevel) -> CoreResult<Predicate> {
    match level {
        IsolationLevel::ReadUncommitted => Ok(read_uncommitted),
        IsolationLevel::ReadCommitted
        | IsolationLevel::RepeatableRead
        | IsolationLevel::Snapshot
        | IsolationLevel::Serializable => Err(CoreError::unsupported_isolation(level)),
    }
}

fn read_uncommitted(_txn: &Transaction, value: &VersionedValue) -> bool {
    value.is_live()
}
