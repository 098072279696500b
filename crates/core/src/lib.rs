//! # Node Rewards Core
//!
//! Core types, selector constants, transaction classification and call-data
//! decoding for the node reward reconciliation pipeline.
//!
//! ## Features
//!
//! - **Ethereum Types**: Uses Alloy primitives for Address, B256 and Selector
//! - **Domain Types**: Transaction, NodeRecord, ClaimSingleEvent, ClaimAllEvent
//! - **Constants**: Method selectors of the deployed node contract
//! - **Classification**: Selector + receipt status to [`TxKind`]
//! - **Decoding**: Node names and claim targets from opaque call data

#![warn(missing_docs)]

pub mod classifier;
pub mod constants;
pub mod decoder;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use classifier::classify;
pub use constants::*;
pub use decoder::{decode, decode_claim_target, decode_node_name};
pub use error::{CoreError, DecodeError, Result};
pub use types::*;

// Re-export Alloy primitives for convenience
pub use alloy_primitives::{Address, Selector, B256};
