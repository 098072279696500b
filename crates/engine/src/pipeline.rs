//! Batch pipeline: classify, decode, index and reconcile.

use noderewards_core::{classify, decode, NodeRecord, Selectors, Transaction, TxKind, B256};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::claims::ClaimIndex;
use crate::error::{EngineError, Result};
use crate::reconciler::reconcile_all;
use crate::registry::NodeRegistry;

/// A transaction excluded because its call data could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeFailure {
    /// Offending transaction.
    pub tx_hash: B256,
    /// Kind the transaction was classified as.
    pub kind: TxKind,
    /// Stable reason code.
    pub reason: &'static str,
    /// Human-readable error.
    pub message: String,
}

/// Counters over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Transactions supplied.
    pub transactions: usize,
    /// Transactions classified as ignored (failed or unrelated).
    pub ignored: usize,
    /// Nodes created.
    pub nodes_created: usize,
    /// Nodes with an applicable claim.
    pub nodes_with_claim: usize,
    /// Successful single-node claim transactions, decodable or not.
    pub single_claims: usize,
    /// Successful claim-all transactions.
    pub claim_alls: usize,
    /// Transactions dropped on decode errors.
    pub decode_failures: usize,
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Reconciled nodes in creation-input order.
    pub nodes: Vec<NodeRecord>,
    /// Counters.
    pub summary: Summary,
    /// Transactions dropped on decode errors.
    pub failures: Vec<DecodeFailure>,
}

/// Reconcile the last claim time of every node in a transaction history.
///
/// Input order does not matter. Malformed transactions are dropped and
/// reported in [`Report::failures`]; only an empty history is an error.
pub fn run(transactions: &[Transaction], selectors: &Selectors) -> Result<Report> {
    if transactions.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let mut summary = Summary {
        transactions: transactions.len(),
        ..Summary::default()
    };
    let mut events = Vec::with_capacity(transactions.len());
    let mut failures = Vec::new();

    for tx in transactions {
        let kind = classify(tx, selectors);
        // Counted on classification so undecodable claims still show up.
        match kind {
            TxKind::ClaimSingle => summary.single_claims += 1,
            TxKind::ClaimAll => summary.claim_alls += 1,
            TxKind::NodeCreate | TxKind::Ignored => {}
        }

        match decode(tx, kind) {
            None => summary.ignored += 1,
            Some(Ok(event)) => events.push(event),
            Some(Err(e)) => {
                warn!(
                    tx_hash = %tx.hash,
                    kind = %kind,
                    reason = e.reason(),
                    "Dropping undecodable transaction: {}",
                    e
                );
                failures.push(DecodeFailure {
                    tx_hash: tx.hash,
                    kind,
                    reason: e.reason(),
                    message: e.to_string(),
                });
            }
        }
    }
    summary.decode_failures = failures.len();

    let registry = NodeRegistry::from_events(&events);
    let claims = ClaimIndex::build(&events);
    debug!(
        nodes = registry.len(),
        single_keys = claims.single_len(),
        claim_all_owners = claims.all_len(),
        "Indexes ready"
    );

    let nodes = reconcile_all(registry.into_nodes(), &claims);
    summary.nodes_created = nodes.len();
    summary.nodes_with_claim = nodes.iter().filter(|node| node.had_claim).count();

    info!(
        "Reconciled {} nodes ({} with claims) from {} transactions, {} ignored, {} undecodable",
        summary.nodes_created,
        summary.nodes_with_claim,
        summary.transactions,
        summary.ignored,
        summary.decode_failures
    );

    Ok(Report {
        nodes,
        summary,
        failures,
    })
}
