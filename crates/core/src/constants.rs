//! Method selectors of the node contract.
//!
//! These values are the first four bytes of the keccak256 hash of each
//! function signature in the deployed contract's ABI. They are fixed by the
//! contract and MUST NOT be derived at runtime; deployments using a
//! different contract override them through configuration.

use alloy_primitives::{fixed_bytes, Selector};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::TxKind;

/// Length of a method selector in bytes.
pub const SELECTOR_LEN: usize = 4;

/// Length of one ABI word in bytes.
pub const WORD_LEN: usize = 32;

/// `createNodeWithTokens(string)`
pub const NODE_CREATE_SELECTOR: Selector = fixed_bytes!("8f0ba4ca");

/// `cashoutReward(uint256)`: claim for one node identified by its creation time.
pub const CLAIM_SINGLE_SELECTOR: Selector = fixed_bytes!("65bfe430");

/// `cashoutAll()`: claim for every node of the sender.
pub const CLAIM_ALL_SELECTOR: Selector = fixed_bytes!("54557973");

/// The three selectors the classifier recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    /// Selector of the node creation call.
    #[serde(default = "default_node_create")]
    pub node_create: Selector,

    /// Selector of the single-node claim call.
    #[serde(default = "default_claim_single")]
    pub claim_single: Selector,

    /// Selector of the claim-all call.
    #[serde(default = "default_claim_all")]
    pub claim_all: Selector,
}

fn default_node_create() -> Selector {
    NODE_CREATE_SELECTOR
}

fn default_claim_single() -> Selector {
    CLAIM_SINGLE_SELECTOR
}

fn default_claim_all() -> Selector {
    CLAIM_ALL_SELECTOR
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            node_create: NODE_CREATE_SELECTOR,
            claim_single: CLAIM_SINGLE_SELECTOR,
            claim_all: CLAIM_ALL_SELECTOR,
        }
    }
}

impl Selectors {
    /// Map a selector to the event kind it identifies.
    pub fn kind_of(&self, selector: &Selector) -> TxKind {
        if *selector == self.node_create {
            TxKind::NodeCreate
        } else if *selector == self.claim_single {
            TxKind::ClaimSingle
        } else if *selector == self.claim_all {
            TxKind::ClaimAll
        } else {
            TxKind::Ignored
        }
    }

    /// Ensure no selector is shared between two event kinds.
    pub fn validate(&self) -> Result<()> {
        if self.node_create == self.claim_single || self.node_create == self.claim_all {
            return Err(CoreError::DuplicateSelector(self.node_create));
        }
        if self.claim_single == self.claim_all {
            return Err(CoreError::DuplicateSelector(self.claim_single));
        }
        Ok(())
    }
}
