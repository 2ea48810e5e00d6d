//! Stress tests for mvkv.
//!
//! These helpers drive many connections from many threads against one
//! shared database.

use crate::fixtures::ConnectionExt;
use mvkv_core::{CoreError, Database};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Transaction ids handed out by `begin`, in no particular order.
    pub transaction_ids: Vec<u64>,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(
        successful: usize,
        failed: usize,
        transaction_ids: Vec<u64>,
        duration: Duration,
    ) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            transaction_ids,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Transactions: {}", self.transaction_ids.len());
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Transactions per thread.
    pub transactions: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct keys shared by all threads.
    pub key_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            transactions: 200,
            threads: 4,
            key_count: 8,
        }
    }
}

/// Runs `begin; set; get; delete?; commit|abort` transactions from many
/// threads over a shared set of keys.
///
/// A `get` or `delete` that races with another thread's `delete` may
/// legitimately report not found; those count as failed operations. Any
/// other error panics the worker.
pub fn stress_concurrent_writers(db: Arc<Database>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let key_count = config.key_count.max(1);

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let db = Arc::clone(&db);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let transactions = config.transactions;

            thread::spawn(move || {
                let mut conn = db.new_connection();
                let mut ids = Vec::with_capacity(transactions);

                for i in 0..transactions {
                    let id = conn.must_execute("begin", &[]);
                    ids.push(id.parse::<u64>().expect("begin returns a decimal id"));

                    let key = format!("key{}", (t + i) % key_count);
                    let value = format!("t{t}-{i}");
                    conn.must_execute("set", &[key.as_str(), value.as_str()]);
                    successful.fetch_add(1, Ordering::Relaxed);

                    let record = |result: Result<String, CoreError>| match result {
                        Ok(_) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(CoreError::NotFound { .. }) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => panic!("unexpected error: {e}"),
                    };

                    record(conn.execute("get", &[key.as_str()]));
                    if i % 3 == 0 {
                        record(conn.execute("delete", &[key.as_str()]));
                    }

                    let finish = if i % 5 == 0 { "abort" } else { "commit" };
                    conn.must_execute(finish, &[]);
                }

                ids
            })
        })
        .collect();

    let mut transaction_ids = Vec::new();
    for handle in handles {
        transaction_ids.extend(handle.join().expect("stress worker panicked"));
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        transaction_ids,
        start.elapsed(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_writers_small() {
        let db = Arc::new(Database::default());
        let config = StressConfig {
            transactions: 10,
            threads: 2,
            key_count: 2,
        };

        let result = stress_concurrent_writers(Arc::clone(&db), &config);
        assert_eq!(result.transaction_ids.len(), 20);
        assert_eq!(db.stats().in_progress, 0);
    }
}
