//! Claim indexes with latest-wins semantics.

use std::collections::HashMap;

use noderewards_core::{Address, ChainEvent, ClaimAllEvent, ClaimSingleEvent, NodeKey};
use tracing::debug;

/// Latest single-node claim per `(owner, target creation time)` and latest
/// claim-all per owner.
///
/// Built once per run, then read-only.
#[derive(Debug, Clone, Default)]
pub struct ClaimIndex {
    single: HashMap<NodeKey, ClaimSingleEvent>,
    all: HashMap<Address, ClaimAllEvent>,
}

impl ClaimIndex {
    /// Build both indexes from decoded events.
    ///
    /// Claims are ordered by `claimed_at` before insertion so the result does
    /// not depend on the order the data source delivered them in. The sort is
    /// stable: claims from the same second keep their input order, and the
    /// later one wins.
    pub fn build<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a ChainEvent>,
    {
        let mut singles = Vec::new();
        let mut alls = Vec::new();
        for event in events {
            match event {
                ChainEvent::ClaimSingle(claim) => singles.push(*claim),
                ChainEvent::ClaimAll(claim) => alls.push(*claim),
                ChainEvent::NodeCreated(_) => {}
            }
        }

        singles.sort_by_key(|claim| claim.claimed_at);
        alls.sort_by_key(|claim| claim.claimed_at);

        let mut index = Self::default();
        for claim in singles {
            index.upsert_single(claim);
        }
        for claim in alls {
            index.upsert_all(claim);
        }

        debug!(
            single_keys = index.single.len(),
            owners_with_claim_all = index.all.len(),
            "Claim index built"
        );

        index
    }

    /// Insert a single-node claim unless a later one is already indexed.
    ///
    /// Returns `true` if inserted/updated, `false` if stale.
    pub fn upsert_single(&mut self, claim: ClaimSingleEvent) -> bool {
        match self.single.get(&claim.key()) {
            Some(existing) if existing.claimed_at > claim.claimed_at => false,
            _ => {
                self.single.insert(claim.key(), claim);
                true
            }
        }
    }

    /// Insert a claim-all unless a later one is already indexed.
    ///
    /// Returns `true` if inserted/updated, `false` if stale.
    pub fn upsert_all(&mut self, claim: ClaimAllEvent) -> bool {
        match self.all.get(&claim.owner) {
            Some(existing) if existing.claimed_at > claim.claimed_at => false,
            _ => {
                self.all.insert(claim.owner, claim);
                true
            }
        }
    }

    /// Latest claim targeting the node `(owner, created_at)`.
    pub fn single_claim(&self, owner: &Address, created_at: u64) -> Option<&ClaimSingleEvent> {
        self.single.get(&(*owner, created_at))
    }

    /// Latest claim-all sent by `owner`.
    pub fn claim_all(&self, owner: &Address) -> Option<&ClaimAllEvent> {
        self.all.get(owner)
    }

    /// Number of distinct single-claim keys.
    pub fn single_len(&self) -> usize {
        self.single.len()
    }

    /// Number of owners with a claim-all.
    pub fn all_len(&self) -> usize {
        self.all.len()
    }
}
