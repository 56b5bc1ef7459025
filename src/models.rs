//! Core data model shared across the chain, store, and sync layers.

use serde::Deserialize;
use serde::Serialize;

/// One independent synchronization stream.
///
/// A partition is identified by `(poller_id, collection)` in the checkpoint
/// store; the account address selects which slice of chain state it mirrors.
/// Exactly one poller runs per partition at any time, so partitions never
/// contend for checkpoint rows or document keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub poller_id: String,
    pub collection: String,
    pub account_address: String,
    /// Upper bound on how many blocks one iteration may request. High-churn
    /// collections run with 1 (strictly sequential), low-churn ones larger.
    pub max_window: i64,
}

impl Partition {
    #[must_use]
    pub fn new(
        poller_id: impl Into<String>,
        collection: impl Into<String>,
        account_address: impl Into<String>,
        max_window: i64,
    ) -> Self {
        Self {
            poller_id: poller_id.into(),
            collection: collection.into(),
            account_address: account_address.into(),
            max_window,
        }
    }
}

/// Durable record of how far a partition has progressed.
///
/// `latest_block_index` is monotonically non-decreasing for a given
/// partition; it only moves after the corresponding window's documents
/// were persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub poller_id: String,
    pub collection: String,
    pub latest_block_index: i64,
}

/// Store-ready representation of one state slot at one observed block index.
///
/// `key` is derived from the state path and is stable across re-application,
/// so upserting the same document twice yields the same stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub key: String,
    pub address: String,
    pub block_index: i64,
    pub body: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_document_serializes_round_trip() {
        let document = StateDocument {
            key: "9c003f376e9ea1a0e5a3e28d12fa23f776cc39b2".to_string(),
            address: "0x9c003f376e9ea1a0e5a3e28d12fa23f776cc39b2".to_string(),
            block_index: 42,
            body: serde_json::json!({ "raw": "6475353a68656c6c6f" }),
        };

        let json = serde_json::to_string(&document).unwrap();
        let back: StateDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(document, back);
    }
}
