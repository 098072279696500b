//! Node reward claim indexing from block explorer data.
//!
//! This crate provides:
//! - Configuration loading (TOML + environment placeholders)
//! - A block explorer source for the node contract's transaction history
//! - Snapshot files for offline runs
//! - The reporting layer over the reconciliation engine
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │  noderewards (this crate)        │
//! │                                  │
//! │  ┌──────────────────┐            │
//! │  │ Explorer Client  │ ← txlist API (paged, ascending)
//! │  └────────┬─────────┘            │
//! │           │  or snapshot file    │
//! │      ┌────▼───────────────┐      │
//! │      │ noderewards-engine │      │
//! │      │ classify, decode,  │      │
//! │      │ index, reconcile   │      │
//! │      └────┬───────────────┘      │
//! │           │                      │
//! │      ┌────▼──────┐               │
//! │      │  Report   │ → pretty / JSON
//! │      └───────────┘               │
//! └──────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod report;
pub mod source;

// Re-export common types
pub use noderewards_core::*;
pub use noderewards_engine::{run, Report, Summary};
