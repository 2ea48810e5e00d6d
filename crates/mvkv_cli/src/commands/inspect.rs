//! Inspection reports for `.inspect` and `.stats`.

use crate::error::CliError;
use mvkv_core::{Database, VersionedValue};
use serde::Serialize;
use std::io::Write;

/// Version chain of one key.
#[derive(Debug, Serialize)]
pub struct ChainReport {
    /// The key.
    pub key: String,
    /// Versions, oldest first.
    pub versions: Vec<VersionReport>,
}

/// One stored version.
#[derive(Debug, Serialize)]
pub struct VersionReport {
    /// Transaction that wrote the version.
    pub created_by: u64,
    /// Transaction that ended the version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_by: Option<u64>,
    /// Stored value.
    pub value: String,
}

impl From<&VersionedValue> for VersionReport {
    fn from(v: &VersionedValue) -> Self {
        Self {
            created_by: v.created_by().as_u64(),
            ended_by: v.ended_by().map(|id| id.as_u64()),
            value: v.payload().to_string(),
        }
    }
}

/// Database statistics.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    /// Default isolation level.
    pub isolation: String,
    /// Keys ever written.
    pub keys: usize,
    /// Versions across all chains.
    pub versions: usize,
    /// Versions not yet ended.
    pub live_versions: usize,
    /// Versions superseded or deleted.
    pub ended_versions: usize,
    /// Transactions in progress.
    pub in_progress: usize,
    /// Committed transactions.
    pub committed: usize,
    /// Aborted transactions.
    pub aborted: usize,
    /// Next transaction id.
    pub next_transaction_id: u64,
}

/// Collects chain reports for `key`, or for every key.
pub fn chains(db: &Database, key: Option<&str>) -> Vec<ChainReport> {
    let keys = match key {
        Some(key) => vec![key.to_string()],
        None => db.keys(),
    };
    keys.into_iter()
        .map(|key| ChainReport {
            versions: db.version_chain(&key).iter().map(VersionReport::from).collect(),
            key,
        })
        .collect()
}

/// Writes the version chains as text or JSON.
pub fn write_chains<W: Write>(
    db: &Database,
    key: Option<&str>,
    json: bool,
    out: &mut W,
) -> Result<(), CliError> {
    let reports = chains(db, key);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
        return Ok(());
    }

    for report in &reports {
        writeln!(out, "{} ({} versions)", report.key, report.versions.len())?;
        for (idx, version) in report.versions.iter().enumerate() {
            let ended = version
                .ended_by
                .map_or_else(|| "-".to_string(), |id| id.to_string());
            writeln!(
                out,
                "  [{idx}] created_by={} ended_by={} value={:?}",
                version.created_by, ended, version.value
            )?;
        }
    }
    Ok(())
}

/// Writes database statistics as text or JSON.
pub fn write_stats<W: Write>(db: &Database, json: bool, out: &mut W) -> Result<(), CliError> {
    let stats = db.stats();
    let report = StatsReport {
        isolation: db.config().default_isolation.to_string(),
        keys: stats.keys,
        versions: stats.versions,
        live_versions: stats.live_versions,
        ended_versions: stats.ended_versions(),
        in_progress: stats.in_progress,
        committed: stats.committed,
        aborted: stats.aborted,
        next_transaction_id: stats.next_transaction_id,
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(out, "Isolation:       {}", report.isolation)?;
    writeln!(out, "Keys:            {}", report.keys)?;
    writeln!(
        out,
        "Versions:        {} ({} live, {} ended)",
        report.versions, report.live_versions, report.ended_versions
    )?;
    writeln!(
        out,
        "Transactions:    {} in progress, {} committed, {} aborted",
        report.in_progress, report.committed, report.aborted
    )?;
    writeln!(out, "Next id:         {}", report.next_transaction_id)?;
    Ok(())
}
