//! Last-claim reconciliation.
//!
//! For each node the latest single-node claim and the owner's latest
//! claim-all are compared:
//! - claim-all strictly later than the single claim: applies only if it was
//!   sent after the node was created (`created_at < claimed_at`)
//! - otherwise a single claim, if any, applies unconditionally
//! - with neither, `last_claim` stays at `created_at`
//!
//! The creation gate is asymmetric: a single claim names its node and so
//! implies the node existed, a claim-all does not.

use noderewards_core::NodeRecord;

use crate::claims::ClaimIndex;

/// Apply the applicable claim to one node.
///
/// Only `last_claim` and `had_claim` change.
pub fn reconcile(mut node: NodeRecord, claims: &ClaimIndex) -> NodeRecord {
    let single = claims.single_claim(&node.owner, node.created_at);
    let all = claims.claim_all(&node.owner);

    // Zero stands for "no claim".
    let single_time = single.map_or(0, |claim| claim.claimed_at);
    let all_time = all.map_or(0, |claim| claim.claimed_at);

    if all_time > single_time {
        if node.created_at < all_time {
            node.last_claim = all_time;
            node.had_claim = true;
        }
    } else if single.is_some() {
        node.last_claim = single_time;
        node.had_claim = true;
    }

    node
}

/// Reconcile every node, preserving order.
pub fn reconcile_all(nodes: Vec<NodeRecord>, claims: &ClaimIndex) -> Vec<NodeRecord> {
    nodes
        .into_iter()
        .map(|node| reconcile(node, claims))
        .collect()
}
