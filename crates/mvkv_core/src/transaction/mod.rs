//! Transaction lifecycle.
//!
//! A transaction is created in progress, collects the keys it touches
//! while commands run against it, and ends exactly once as aborted or
//! committed. The transaction table keeps every record as history for
//! later in-progress snapshots.

mod state;
mod table;

pub use state::{Transaction, TransactionState};
pub(crate) use table::TransactionTable;
