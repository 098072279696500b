//! Snapshot files: a saved transaction history for offline reconciliation.
//!
//! A snapshot is either a raw explorer `txlist` response or a JSON array of
//! explorer records (the format written by [`save_snapshot`]).

use anyhow::{Context, Result};
use noderewards_core::Transaction;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use super::explorer::parse_txlist_response;

/// Load transactions from a snapshot file.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    let transactions = if body.trim_start().starts_with('[') {
        let records: Vec<Value> = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?;
        records
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Transaction>(record) {
                Ok(tx) => Some(tx),
                Err(e) => {
                    warn!("Skipping malformed snapshot record: {}", e);
                    None
                }
            })
            .collect()
    } else {
        parse_txlist_response(&body)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))?
            .transactions
    };

    info!(
        "Loaded {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(transactions)
}

/// Write transactions as a JSON array of explorer records.
pub fn save_snapshot<P: AsRef<Path>>(path: P, transactions: &[Transaction]) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(transactions).context("Failed to serialize snapshot")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;

    info!(
        "Saved {} transactions to {}",
        transactions.len(),
        path.display()
    );
    Ok(())
}
