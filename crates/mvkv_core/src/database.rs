//! Database facade.

use crate::config::Config;
use crate::connection::Connection;
use crate::error::{CoreError, CoreResult};
use crate::stats::DatabaseStats;
use crate::store::{Store, VersionedValue};
use crate::transaction::{Transaction, TransactionState, TransactionTable};
use crate::types::TransactionId;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// The main database handle.
///
/// `Database` owns the versioned store, the transaction table and the id
/// allocator. Callers interact with it through [`Connection`]s:
///
/// ```rust
/// use mvkv_core::Database;
///
/// let db = Database::default();
/// let mut conn = db.new_connection();
/// conn.execute("begin", &[]).unwrap();
/// conn.execute("set", &["a", "1"]).unwrap();
/// conn.execute("commit", &[]).unwrap();
/// ```
///
/// ## Concurrency
///
/// `Database` is `Send + Sync`. Connections on different threads may
/// share one database:
/// - the store sits behind a single lock, held for the whole
///   scan-close-append sequence of a write
/// - starting a transaction holds the table lock across id allocation,
///   the in-progress snapshot and registration
/// - the table lock is never requested while the store lock is held
pub struct Database {
    /// Configuration.
    config: Config,
    /// Version chains by key.
    store: RwLock<Store>,
    /// Every transaction ever started.
    transactions: RwLock<TransactionTable>,
    /// Next transaction ID. Only advanced under the table write lock.
    next_txid: AtomicU64,
}

impl Database {
    /// Creates an empty database.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: RwLock::new(Store::new()),
            transactions: RwLock::new(TransactionTable::new()),
            // 0 means "no transaction"; real ids start at 1.
            next_txid: AtomicU64::new(1),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens a new idle connection.
    pub fn new_connection(&self) -> Connection<'_> {
        Connection::new(self)
    }

    /// Starts a transaction at the default isolation level.
    ///
    /// The returned transaction is already registered in the transaction
    /// table and remembers which transactions were in progress when it
    /// started. Fails with [`CoreError::TransactionIdsExhausted`] once the
    /// counter cannot advance; id 0 is never handed out.
    pub fn new_transaction(&self) -> CoreResult<Transaction> {
        let mut table = self.transactions.write();

        let raw = self.next_txid.load(Ordering::SeqCst);
        let next = raw
            .checked_add(1)
            .ok_or(CoreError::TransactionIdsExhausted)?;
        self.next_txid.store(next, Ordering::SeqCst);

        let id = TransactionId::new(raw);
        let txn = Transaction::new(id, self.config.default_isolation, table.in_progress());
        table.store(txn.clone());

        debug!(txid = %id, isolation = %txn.isolation(), "starting transaction");
        Ok(txn)
    }

    /// Ends `txn` as aborted or committed and records the outcome.
    ///
    /// The recorded state is checked under the table lock, so a stale
    /// copy of a transaction cannot complete it a second time.
    pub fn complete_transaction(
        &self,
        txn: &mut Transaction,
        state: TransactionState,
    ) -> CoreResult<()> {
        debug!(txid = %txn.id(), ?state, "completing transaction");

        let mut table = self.transactions.write();
        let recorded = table
            .get(txn.id())
            .map(Transaction::state)
            .ok_or(CoreError::UnknownTransaction { id: txn.id() })?;
        if recorded.is_terminal() {
            warn!(txid = %txn.id(), ?recorded, "completing a finished transaction");
            return Err(CoreError::protocol_violation(format!(
                "{} already completed as {recorded:?}",
                txn.id()
            )));
        }

        txn.finish(state)?;
        table.store(txn.clone());
        Ok(())
    }

    /// Returns the recorded state of transaction `id`.
    ///
    /// Fails with [`CoreError::UnknownTransaction`] if `id` was never
    /// allocated.
    pub fn transaction_state(&self, id: TransactionId) -> CoreResult<TransactionState> {
        self.transactions
            .read()
            .get(id)
            .map(Transaction::state)
            .ok_or(CoreError::UnknownTransaction { id })
    }

    /// Checks that `txn` is a real transaction that is still in progress.
    pub fn assert_valid_transaction(&self, txn: &Transaction) -> CoreResult<()> {
        if !txn.id().is_assigned() {
            warn!("transaction without an id");
            return Err(CoreError::protocol_violation("invalid transaction id"));
        }
        match self.transaction_state(txn.id())? {
            TransactionState::InProgress => Ok(()),
            state => {
                warn!(txid = %txn.id(), ?state, "transaction is not in progress");
                Err(CoreError::protocol_violation(format!(
                    "{} is not in progress",
                    txn.id()
                )))
            }
        }
    }

    /// Returns a copy of the recorded transaction `id`.
    #[must_use]
    pub fn transaction(&self, id: TransactionId) -> Option<Transaction> {
        self.transactions.read().get(id).cloned()
    }

    /// Returns the ids of all transactions currently in progress.
    #[must_use]
    pub fn in_progress(&self) -> BTreeSet<TransactionId> {
        self.transactions.read().in_progress()
    }

    /// Returns a copy of every version ever written for `key`, oldest first.
    #[must_use]
    pub fn version_chain(&self, key: &str) -> Vec<VersionedValue> {
        self.store
            .read()
            .chain(key)
            .map(|chain| chain.versions().to_vec())
            .unwrap_or_default()
    }

    /// Returns every key that has been written, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.store.read().iter().map(|(k, _)| k.clone()).collect();
        keys.sort();
        keys
    }

    /// Returns current statistics.
    #[must_use]
    pub fn stats(&self) -> DatabaseStats {
        let (keys, versions, live_versions) = {
            let store = self.store.read();
            (store.key_count(), store.version_count(), store.live_count())
        };
        let table = self.transactions.read();
        DatabaseStats {
            keys,
            versions,
            live_versions,
            in_progress: table.count(TransactionState::InProgress),
            committed: table.count(TransactionState::Committed),
            aborted: table.count(TransactionState::Aborted),
            next_transaction_id: self.next_txid.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn store(&self) -> &RwLock<Store> {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn with_next_transaction_id(config: Config, next: u64) -> Self {
        let db = Self::new(config);
        db.next_txid.store(next, Ordering::SeqCst);
        db
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("transactions", &self.transactions.read().len())
            .field("next_txid", &self.next_txid.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
