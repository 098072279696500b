//! Error types for the core crate.

use alloy_primitives::Selector;
use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid address format.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid transaction hash format.
    #[error("Invalid transaction hash: {0}")]
    InvalidHash(String),

    /// A numeric explorer field could not be parsed.
    #[error("Invalid {field}: '{value}' is not an unsigned integer")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value as received.
        value: String,
    },

    /// Two event kinds were configured with the same method selector.
    #[error("Selector {0} is assigned to more than one event kind")]
    DuplicateSelector(Selector),
}

/// Result type alias for CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Failure to decode the call data of a classified transaction.
///
/// A decode error only ever excludes the offending transaction; it never
/// aborts the batch it belongs to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Call data is not valid hex.
    #[error("call data is not valid hex")]
    InvalidHex,

    /// Call data ends before the announced content.
    #[error("call data truncated: need {needed} bytes, have {available}")]
    TruncatedPayload {
        /// Bytes required by the encoding.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// No argument follows the method selector.
    #[error("call data carries no argument after the selector")]
    MissingArgument,

    /// The dynamic string offset points outside the payload.
    #[error("string offset {0} points outside the payload")]
    InvalidStringOffset(u64),

    /// Node name bytes are not valid UTF-8.
    #[error("node name is not valid UTF-8")]
    InvalidUtf8,

    /// Node name is empty once non-word characters are stripped.
    #[error("node name is empty after sanitizing")]
    EmptyName,

    /// Claim target does not fit a Unix timestamp.
    #[error("claim target exceeds the u64 timestamp range")]
    TimestampOverflow,
}

impl DecodeError {
    /// Stable machine-readable code for diagnostics and counters.
    pub const fn reason(&self) -> &'static str {
        match self {
            DecodeError::InvalidHex => "invalid_hex",
            DecodeError::TruncatedPayload { .. } => "truncated_payload",
            DecodeError::MissingArgument => "missing_argument",
            DecodeError::InvalidStringOffset(_) => "invalid_string_offset",
            DecodeError::InvalidUtf8 => "invalid_utf8",
            DecodeError::EmptyName => "empty_name",
            DecodeError::TimestampOverflow => "timestamp_overflow",
        }
    }
}
