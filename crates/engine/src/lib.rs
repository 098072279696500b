//! Last-claim reconciliation for node reward contracts.
//!
//! This crate turns a contract's transaction history into a per-node report:
//! - [`registry`]: one [`NodeRecord`] per node creation
//! - [`claims`]: latest single-node claim and latest claim-all per owner
//! - [`reconciler`]: the precedence rule between the two claim kinds
//! - [`pipeline`]: classification, decoding and the above in one batch pass
//!
//! ```text
//! transactions ─► classify ─► decode ─┬─► NodeRegistry ──┐
//!                                     │                  ├─► reconcile ─► Report
//!                                     └─► ClaimIndex ────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claims;
pub mod error;
pub mod pipeline;
pub mod reconciler;
pub mod registry;

pub use claims::ClaimIndex;
pub use error::{EngineError, Result};
pub use pipeline::{run, DecodeFailure, Report, Summary};
pub use reconciler::{reconcile, reconcile_all};
pub use registry::NodeRegistry;

pub use noderewards_core::NodeRecord;
