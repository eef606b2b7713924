//! Memo-list transport encoding.
//!
//! An optional external format: one memo per payload field, keys prefixed
//! `registrum:`, both key and value hex-encoded uppercase, entries sorted
//! alphabetically by `MemoType`. Key sorting and hex sorting coincide
//! because hex encoding is monotonic over bytes.

use serde::{Deserialize, Serialize};

use crate::payload::AttestationPayload;

/// Wire wrapper: `{"Memo": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoEntry {
    /// The memo body.
    #[serde(rename = "Memo")]
    pub memo: Memo,
}

/// One hex-encoded key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// Uppercase hex of the field key.
    #[serde(rename = "MemoType")]
    pub memo_type: String,

    /// Uppercase hex of the field value.
    #[serde(rename = "MemoData")]
    pub memo_data: String,
}

/// Encodes a payload as its memo list.
pub fn payload_memos(payload: &AttestationPayload) -> Vec<MemoEntry> {
    let range = format!(
        "{}-{}",
        payload.transition_range.from.as_deref().unwrap_or("null"),
        payload.transition_range.to
    );

    let fields: [(&str, String); 9] = [
        ("registrum:version", payload.registrum_version.clone()),
        ("registrum:snapshot_version", payload.snapshot_version.to_string()),
        ("registrum:snapshot_hash", payload.snapshot_hash.clone()),
        ("registrum:registry_hash", payload.registry_hash.clone()),
        ("registrum:mode", payload.mode.clone()),
        ("registrum:parity", payload.parity_status.clone()),
        ("registrum:range", range),
        ("registrum:state_count", payload.state_count.to_string()),
        ("registrum:ordering_max", payload.ordering_max.to_string()),
    ];

    let mut memos: Vec<MemoEntry> = fields
        .into_iter()
        .map(|(key, value)| MemoEntry {
            memo: Memo {
                memo_type: hex_upper(key),
                memo_data: hex_upper(&value),
            },
        })
        .collect();
    memos.sort_by(|a, b| a.memo.memo_type.cmp(&b.memo.memo_type));
    memos
}

fn hex_upper(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for byte in s.as_bytes() {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}
