//! Transaction classification by method selector.

use alloy_primitives::Selector;

use crate::constants::{Selectors, SELECTOR_LEN};
use crate::types::{Transaction, TxKind, TxStatus};

/// Read the method selector from hex call data.
///
/// Only the first eight hex digits after the optional `0x` prefix are
/// inspected. Returns `None` if they are missing or not hex.
pub fn selector_of(input: &str) -> Option<Selector> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    let head = digits.get(..SELECTOR_LEN * 2)?;

    let mut bytes = [0u8; SELECTOR_LEN];
    hex::decode_to_slice(head, &mut bytes).ok()?;
    Some(Selector::from(bytes))
}

/// Classify a transaction.
///
/// Failed transactions are always [`TxKind::Ignored`], whatever method they
/// called.
pub fn classify(tx: &Transaction, selectors: &Selectors) -> TxKind {
    if tx.status != TxStatus::Success {
        return TxKind::Ignored;
    }

    match selector_of(&tx.input) {
        Some(selector) => selectors.kind_of(&selector),
        None => TxKind::Ignored,
    }
}
