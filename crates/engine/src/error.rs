//! Error types for the reconciliation engine.

use thiserror::Error;

/// Engine error type.
///
/// Malformed transactions never surface here; they are recorded as
/// decode failures in the report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The data source produced no transactions at all.
    #[error("no transactions supplied; the data source returned an empty history")]
    EmptyInput,
}

/// Result type alias for EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;
