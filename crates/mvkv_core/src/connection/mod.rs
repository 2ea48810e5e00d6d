//! Connections and the command protocol.
//!
//! A [`Connection`] is a session on a [`Database`] that carries at most one
//! transaction at a time. All reads and writes go through
//! [`Connection::execute`]:
//!
//! | command | args | result |
//! |---|---|---|
//! | `begin` | | new transaction id |
//! | `abort` | | `""` |
//! | `commit` | | `""` |
//! | `get` | key | newest visible value |
//! | `set` | key, value | the value |
//! | `delete` | key | `""` |

mod command;

pub use command::Command;

use crate::database::Database;
use crate::error::{CoreError, CoreResult};
use crate::store::VersionedValue;
use crate::transaction::{Transaction, TransactionState};
use crate::visibility::VisibilityRule;
use tracing::{debug, trace, warn};

/// A session bound to a database.
///
/// The connection is idle until `begin` attaches a transaction, and idle
/// again after `abort` or `commit`. Dropping a connection with an active
/// transaction leaves that transaction in progress.
pub struct Connection<'db> {
    db: &'db Database,
    txn: Option<Transaction>,
}

impl<'db> Connection<'db> {
    pub(crate) fn new(db: &'db Database) -> Self {
        Self { db, txn: None }
    }

    /// Returns the database this connection is bound to.
    #[must_use]
    pub fn database(&self) -> &'db Database {
        self.db
    }

    /// Returns the attached transaction, if any.
    #[must_use]
    pub fn transaction(&self) -> Option<&Transaction> {
        self.txn.as_ref()
    }

    /// Returns true if a transaction is attached.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.txn.is_some()
    }

    /// Parses and runs one command.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Unimplemented`] for an unknown command name
    /// - [`CoreError::InvalidArguments`] for a wrong argument count
    /// - [`CoreError::NotFound`] when `get` or `delete` finds no visible version
    /// - a fatal error (see [`CoreError::is_fatal`]) when the connection
    ///   state does not allow the command or the isolation level has no
    ///   visibility rule
    ///
    /// No error leaves a partial change behind.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mvkv_core::{CoreError, Database};
    ///
    /// let db = Database::default();
    /// let mut conn = db.new_connection();
    /// assert_eq!(conn.execute("begin", &[]).unwrap(), "1");
    /// assert_eq!(conn.execute("set", &["a", "1"]).unwrap(), "1");
    /// conn.execute("delete", &["a"]).unwrap();
    ///
    /// let err = conn.execute("get", &["a"]).unwrap_err();
    /// assert!(matches!(err, CoreError::NotFound { .. }));
    /// ```
    pub fn execute(&mut self, command: &str, args: &[&str]) -> CoreResult<String> {
        debug!(command, ?args, "executing command");
        let command = Command::parse(command, args)?;
        self.run(command)
    }

    /// Runs an already parsed command.
    pub fn run(&mut self, command: Command<'_>) -> CoreResult<String> {
        match command {
            Command::Begin => self.begin(),
            Command::Abort => self.complete(TransactionState::Aborted),
            Command::Commit => self.complete(TransactionState::Committed),
            Command::Get { key } => self.get(key),
            Command::Set { key, value } => self.set(key, value),
            Command::Delete { key } => self.delete(key),
        }
    }

    fn begin(&mut self) -> CoreResult<String> {
        if let Some(txn) = &self.txn {
            warn!(txid = %txn.id(), "begin with a running transaction");
            return Err(CoreError::protocol_violation(
                "connection already has a running transaction",
            ));
        }

        let txn = self.db.new_transaction()?;
        self.db.assert_valid_transaction(&txn)?;
        let id = txn.id().as_u64().to_string();
        self.txn = Some(txn);
        Ok(id)
    }

    fn complete(&mut self, state: TransactionState) -> CoreResult<String> {
        let db = self.db;
        let txn = self.active()?;
        db.complete_transaction(txn, state)?;
        self.txn = None;
        Ok(String::new())
    }

    fn get(&mut self, key: &str) -> CoreResult<String> {
        let db = self.db;
        let txn = self.active()?;
        let rule = VisibilityRule::for_transaction(txn)?;

        let found = db
            .store()
            .read()
            .chain(key)
            .and_then(|chain| chain.find_visible(|v| rule.is_visible(v)))
            .map(|v| v.payload().to_string());

        txn.record_read(key);
        found.ok_or_else(|| CoreError::not_found("cannot get key that does not exist"))
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<String> {
        let db = self.db;
        let txn = self.active()?;
        let rule = VisibilityRule::for_transaction(txn)?;
        let txid = txn.id();

        {
            let mut store = db.store().write();
            let chain = store.chain_entry(key);
            let closed = chain.close_visible(txid, |v| rule.is_visible(v));
            chain.push(VersionedValue::new(txid, value));
            trace!(%txid, key, closed, versions = chain.len(), "appended version");
        }

        txn.record_write(key);
        Ok(value.to_string())
    }

    fn delete(&mut self, key: &str) -> CoreResult<String> {
        let db = self.db;
        let txn = self.active()?;
        let rule = VisibilityRule::for_transaction(txn)?;
        let txid = txn.id();

        let closed = db
            .store()
            .write()
            .chain_mut(key)
            .map_or(0, |chain| chain.close_visible(txid, |v| rule.is_visible(v)));
        trace!(%txid, key, closed, "closed versions");

        if closed == 0 {
            return Err(CoreError::not_found("cannot delete key that does not exist"));
        }
        txn.record_write(key);
        Ok(String::new())
    }

    /// Returns the attached transaction after checking it is still in
    /// progress.
    fn active(&mut self) -> CoreResult<&mut Transaction> {
        let db = self.db;
        let txn = self.txn.as_mut().ok_or_else(|| {
            warn!("command without a running transaction");
            CoreError::protocol_violation("no running transaction")
        })?;
        db.assert_valid_transaction(txn)?;
        Ok(txn)
    }
}

impl std::fmt::Debug for Connection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("txn", &self.txn.as_ref().map(Transaction::id))
            .finish_non_exhaustive()
    }
}
