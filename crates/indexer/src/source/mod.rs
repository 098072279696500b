//! Transaction history sources.
//!
//! This module provides:
//! - A block explorer client (`txlist` API, paged, ascending order)
//! - Snapshot files holding a previously fetched history

pub mod explorer;
pub mod snapshot;

pub use explorer::{parse_txlist_response, ExplorerClient, TxListPage};
pub use snapshot::{load_snapshot, save_snapshot};
