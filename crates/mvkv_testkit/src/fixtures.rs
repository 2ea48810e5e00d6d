//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and driving connections without error plumbing.

use mvkv_core::{Config, Connection, CoreError, Database, IsolationLevel, VersionedValue};

/// A test database.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
}

impl TestDatabase {
    /// Creates a read-uncommitted test database.
    pub fn read_uncommitted() -> Self {
        Self::with_isolation(IsolationLevel::ReadUncommitted)
    }

    /// Creates a test database whose transactions run at `level`.
    pub fn with_isolation(level: IsolationLevel) -> Self {
        Self {
            db: Database::new(Config::new().default_isolation(level)),
        }
    }

    /// Returns the number of live versions for `key`.
    pub fn live_versions(&self, key: &str) -> usize {
        self.db
            .version_chain(key)
            .iter()
            .filter(|v| v.is_live())
            .count()
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary read-uncommitted database.
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::read_uncommitted();
    f(&test_db.db)
}

/// Assertion helpers for connections.
pub trait ConnectionExt {
    /// Executes a command that must succeed and returns its result.
    ///
    /// # Panics
    ///
    /// Panics with the command and error if execution fails.
    fn must_execute(&mut self, command: &str, args: &[&str]) -> String;

    /// Executes a command that must fail and returns the error.
    ///
    /// # Panics
    ///
    /// Panics with the result if execution succeeds.
    fn must_fail(&mut self, command: &str, args: &[&str]) -> CoreError;
}

impl ConnectionExt for Connection<'_> {
    fn must_execute(&mut self, command: &str, args: &[&str]) -> String {
        match self.execute(command, args) {
            Ok(result) => result,
            Err(e) => panic!("unexpected error for {command} {args:?}: {e}"),
        }
    }

    fn must_fail(&mut self, command: &str, args: &[&str]) -> CoreError {
        match self.execute(command, args) {
            Ok(result) => panic!("{command} {args:?} unexpectedly returned '{result}'"),
            Err(e) => e,
        }
    }
}

/// Returns `(created_by, ended_by, payload)` triples for a chain.
pub fn describe_chain(chain: &[VersionedValue]) -> Vec<(u64, Option<u64>, String)> {
    chain
        .iter()
        .map(|v| {
            (
                v.created_by().as_u64(),
                v.ended_by().map(|id| id.as_u64()),
                v.payload().to_string(),
            )
        })
        .collect()
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a database where one committed transaction wrote
    /// `key{i} = value{i}` for `i` in `0..count`.
    pub fn populated_database(count: usize) -> TestDatabase {
        let test_db = TestDatabase::read_uncommitted();
        {
            let mut conn = test_db.db.new_connection();
            conn.must_execute("begin", &[]);
            for i in 0..count {
                let key = format!("key{i}");
                let value = format!("value{i}");
                conn.must_execute("set", &[key.as_str(), value.as_str()]);
            }
            conn.must_execute("commit", &[]);
        }
        test_db
    }
}
