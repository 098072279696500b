//! Call-data decoding for classified transactions.
//!
//! The node contract takes a single ABI-encoded argument per call:
//! - `createNodeWithTokens(string name)`: offset word, length word, UTF-8 bytes
//! - `cashoutReward(uint256 createdAt)`: one big-endian word
//! - `cashoutAll()`: no argument

use crate::constants::{SELECTOR_LEN, WORD_LEN};
use crate::error::DecodeError;
use crate::types::{
    ChainEvent, ClaimAllEvent, ClaimSingleEvent, NodeCreatedEvent, Transaction, TxKind,
};

/// Hex-decode call data and return the argument bytes after the selector.
fn arguments(input: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    let mut bytes = hex::decode(digits).map_err(|_| DecodeError::InvalidHex)?;

    if bytes.len() < SELECTOR_LEN {
        return Err(DecodeError::TruncatedPayload {
            needed: SELECTOR_LEN,
            available: bytes.len(),
        });
    }

    bytes.drain(..SELECTOR_LEN);
    Ok(bytes)
}

/// Read the word at `offset` as a length or offset.
///
/// Values that do not fit in `u64` are reported through `on_overflow`.
fn read_word(
    args: &[u8],
    offset: usize,
    on_overflow: impl FnOnce(u64) -> DecodeError,
) -> Result<usize, DecodeError> {
    let end = offset.checked_add(WORD_LEN).unwrap_or(usize::MAX);
    let word = args.get(offset..end).ok_or(DecodeError::TruncatedPayload {
        needed: end,
        available: args.len(),
    })?;

    let (high, low) = word.split_at(WORD_LEN - 8);
    let mut low_bytes = [0u8; 8];
    low_bytes.copy_from_slice(low);
    let value = u64::from_be_bytes(low_bytes);

    if high.iter().any(|b| *b != 0) {
        return Err(on_overflow(u64::MAX));
    }
    usize::try_from(value).map_err(|_| on_overflow(value))
}

/// Replace every run of non-word characters with one space and trim.
///
/// Word characters are ASCII letters, digits and `_`.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_gap = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
            in_gap = false;
        } else if !in_gap {
            out.push(' ');
            in_gap = true;
        }
    }

    out.trim().to_string()
}

/// Decode the node name from `createNodeWithTokens(string)` call data.
pub fn decode_node_name(input: &str) -> Result<String, DecodeError> {
    let args = arguments(input)?;
    if args.is_empty() {
        return Err(DecodeError::MissingArgument);
    }

    let offset = read_word(&args, 0, DecodeError::InvalidStringOffset)?;
    if offset >= args.len() {
        return Err(DecodeError::InvalidStringOffset(offset as u64));
    }

    let length = read_word(&args, offset, |len| DecodeError::TruncatedPayload {
        needed: usize::try_from(len).unwrap_or(usize::MAX),
        available: args.len(),
    })?;

    let start = offset + WORD_LEN;
    let end = start.saturating_add(length);
    let raw = args.get(start..end).ok_or(DecodeError::TruncatedPayload {
        needed: end,
        available: args.len(),
    })?;

    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8)?;
    let name = sanitize_name(text);
    if name.is_empty() {
        return Err(DecodeError::EmptyName);
    }

    Ok(name)
}

/// Decode the target node creation timestamp from `cashoutReward(uint256)`
/// call data.
///
/// The arguments are read as one big-endian integer; leading zero bytes are
/// ignored.
pub fn decode_claim_target(input: &str) -> Result<u64, DecodeError> {
    let args = arguments(input)?;
    if args.is_empty() {
        return Err(DecodeError::MissingArgument);
    }

    let significant: Vec<u8> = args.into_iter().skip_while(|b| *b == 0).collect();
    if significant.len() > 8 {
        return Err(DecodeError::TimestampOverflow);
    }

    Ok(significant
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}

/// Decode a classified transaction into a chain event.
///
/// Returns `None` for [`TxKind::Ignored`].
pub fn decode(tx: &Transaction, kind: TxKind) -> Option<Result<ChainEvent, DecodeError>> {
    let event = match kind {
        TxKind::Ignored => return None,
        TxKind::NodeCreate => decode_node_name(&tx.input).map(|name| {
            ChainEvent::NodeCreated(NodeCreatedEvent {
                owner: tx.from,
                name,
                created_at: tx.timestamp,
                tx_hash: tx.hash,
            })
        }),
        TxKind::ClaimSingle => decode_claim_target(&tx.input).map(|target| {
            ChainEvent::ClaimSingle(ClaimSingleEvent {
                owner: tx.from,
                target_created_at: target,
                claimed_at: tx.timestamp,
                tx_hash: tx.hash,
            })
        }),
        TxKind::ClaimAll => Ok(ChainEvent::ClaimAll(ClaimAllEvent {
            owner: tx.from,
            claimed_at: tx.timestamp,
            tx_hash: tx.hash,
        })),
    };

    Some(event)
}
