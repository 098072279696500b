//! Core types for node reward reconciliation.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Composite join key between nodes and single-node claims:
/// `(owner, node creation timestamp)`.
pub type NodeKey = (Address, u64);

/// Receipt status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// Executed successfully.
    Success,
    /// Reverted or otherwise failed.
    Failed,
}

/// A transaction sent to the node contract.
///
/// Serializes to and from the block explorer `txlist` record format, where
/// every numeric field is a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExplorerRecord", into = "ExplorerRecord")]
pub struct Transaction {
    /// Transaction hash.
    pub hash: B256,

    /// Block the transaction was mined in.
    pub block_number: u64,

    /// Sender address.
    pub from: Address,

    /// Hex-encoded call data, `0x`-prefixed.
    pub input: String,

    /// Block timestamp (unix seconds).
    pub timestamp: u64,

    /// Receipt status.
    pub status: TxStatus,
}

/// Raw explorer record, kept as strings until validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExplorerRecord {
    hash: String,
    #[serde(rename = "blockNumber")]
    block_number: String,
    from: String,
    input: String,
    #[serde(rename = "timeStamp")]
    time_stamp: String,
    #[serde(rename = "txreceipt_status", default)]
    receipt_status: String,
    #[serde(rename = "isError", default)]
    is_error: String,
}

fn parse_u64(field: &'static str, value: &str) -> Result<u64, CoreError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| CoreError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

impl TryFrom<ExplorerRecord> for Transaction {
    type Error = CoreError;

    fn try_from(record: ExplorerRecord) -> Result<Self, Self::Error> {
        let hash = B256::from_str(&record.hash)
            .map_err(|_| CoreError::InvalidHash(record.hash.clone()))?;
        let from = Address::from_str(&record.from)
            .map_err(|_| CoreError::InvalidAddress(record.from.clone()))?;

        // Pre-Byzantium receipts carry no status; fall back to the error flag.
        let status = match record.receipt_status.trim() {
            "1" => TxStatus::Success,
            "" if record.is_error.trim() == "0" => TxStatus::Success,
            _ => TxStatus::Failed,
        };

        Ok(Self {
            hash,
            block_number: parse_u64("blockNumber", &record.block_number)?,
            from,
            input: record.input,
            timestamp: parse_u64("timeStamp", &record.time_stamp)?,
            status,
        })
    }
}

impl From<Transaction> for ExplorerRecord {
    fn from(tx: Transaction) -> Self {
        let success = tx.status == TxStatus::Success;
        Self {
            hash: format!("{:#x}", tx.hash),
            block_number: tx.block_number.to_string(),
            from: format!("{:#x}", tx.from),
            input: tx.input,
            time_stamp: tx.timestamp.to_string(),
            receipt_status: if success { "1" } else { "0" }.to_string(),
            is_error: if success { "0" } else { "1" }.to_string(),
        }
    }
}

/// Classification of a transaction by method selector and status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    /// Creates one node for the sender.
    NodeCreate,
    /// Claims rewards for one node of the sender.
    ClaimSingle,
    /// Claims rewards for every node of the sender.
    ClaimAll,
    /// Failed, or calls a method outside the reward flow.
    Ignored,
}

impl TxKind {
    /// Canonical lowercase string form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TxKind::NodeCreate => "node_create",
            TxKind::ClaimSingle => "claim_single",
            TxKind::ClaimAll => "claim_all",
            TxKind::Ignored => "ignored",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node as reconstructed from its creation transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Owning address (creation transaction sender).
    pub owner: Address,

    /// Sanitized node name.
    pub name: String,

    /// Creation timestamp; identifies the node within its owner.
    pub created_at: u64,

    /// Effective last claim time; starts at `created_at`.
    pub last_claim: u64,

    /// Whether any applicable claim was found.
    pub had_claim: bool,
}

impl NodeRecord {
    /// A freshly created node with no claim applied yet.
    pub fn new(owner: Address, name: String, created_at: u64) -> Self {
        Self {
            owner,
            name,
            created_at,
            last_claim: created_at,
            had_claim: false,
        }
    }

    /// Join key against single-node claims.
    pub fn key(&self) -> NodeKey {
        (self.owner, self.created_at)
    }
}

/// Decoded node creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCreatedEvent {
    /// Node owner.
    pub owner: Address,
    /// Sanitized node name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: u64,
    /// Source transaction.
    pub tx_hash: B256,
}

/// Decoded claim for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSingleEvent {
    /// Claiming owner.
    pub owner: Address,
    /// Creation timestamp of the claimed node.
    pub target_created_at: u64,
    /// Time of the claim transaction.
    pub claimed_at: u64,
    /// Source transaction.
    pub tx_hash: B256,
}

impl ClaimSingleEvent {
    /// Key of the node this claim targets.
    pub fn key(&self) -> NodeKey {
        (self.owner, self.target_created_at)
    }
}

/// Decoded claim for every node of an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAllEvent {
    /// Claiming owner.
    pub owner: Address,
    /// Time of the claim transaction.
    pub claimed_at: u64,
    /// Source transaction.
    pub tx_hash: B256,
}

/// A classified and decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    /// Node creation.
    NodeCreated(NodeCreatedEvent),
    /// Single-node claim.
    ClaimSingle(ClaimSingleEvent),
    /// Claim-all.
    ClaimAll(ClaimAllEvent),
}

impl ChainEvent {
    /// Kind of the originating transaction.
    pub const fn kind(&self) -> TxKind {
        match self {
            ChainEvent::NodeCreated(_) => TxKind::NodeCreate,
            ChainEvent::ClaimSingle(_) => TxKind::ClaimSingle,
            ChainEvent::ClaimAll(_) => TxKind::ClaimAll,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json(receipt_status: &str, is_error: &str) -> String {
        format!(
            r#"{{
                "blockNumber": "26731400",
                "timeStamp": "1646150400",
                "hash": "0x{}",
                "from": "0x00000000000000000000000000000000000000aa",
                "to": "0x8258fddf7e0477b8dff86970813ce5d333c88b57",
                "input": "0x54557973",
                "txreceipt_status": "{}",
                "isError": "{}"
            }}"#,
            "ab".repeat(32),
            receipt_status,
            is_error
        )
    }

    #[test]
    fn test_transaction_from_explorer_record() {
        let tx: Transaction = serde_json::from_str(&record_json("1", "0")).unwrap();

        assert_eq!(tx.hash, B256::repeat_byte(0xab));
        assert_eq!(tx.block_number, 26_731_400);
        assert_eq!(tx.from, Address::with_last_byte(0xaa));
        assert_eq!(tx.input, "0x54557973");
        assert_eq!(tx.timestamp, 1_646_150_400);
        assert_eq!(tx.status, TxStatus::Success);
    }

    #[test]
    fn test_status_mapping() {
        let failed: Transaction = serde_json::from_str(&record_json("0", "1")).unwrap();
        assert_eq!(failed.status, TxStatus::Failed);

        // Empty receipt status falls back to isError.
        let legacy_ok: Transaction = serde_json::from_str(&record_json("", "0")).unwrap();
        assert_eq!(legacy_ok.status, TxStatus::Success);

        let legacy_err: Transaction = serde_json::from_str(&record_json("", "1")).unwrap();
        assert_eq!(legacy_err.status, TxStatus::Failed);
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let json = record_json("1", "0").replace("1646150400", "soon");
        let err = serde_json::from_str::<Transaction>(&json).unwrap_err();
        assert!(err.to_string().contains("timeStamp"));
    }

    #[test]
    fn test_serializes_back_to_explorer_format() {
        let tx: Transaction = serde_json::from_str(&record_json("1", "0")).unwrap();
        let value = serde_json::to_value(&tx).unwrap();

        assert_eq!(value["timeStamp"], "1646150400");
        assert_eq!(value["txreceipt_status"], "1");
        assert_eq!(
            value["from"],
            "0x00000000000000000000000000000000000000aa"
        );
    }

    #[test]
    fn test_new_node_record() {
        let node = NodeRecord::new(Address::with_last_byte(1), "alpha".into(), 100);
        assert_eq!(node.last_claim, 100);
        assert!(!node.had_claim);
        assert_eq!(node.key(), (Address::with_last_byte(1), 100));
    }
}
