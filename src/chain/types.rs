//! Wire types for the headless node's GraphQL surface.

use serde::Deserialize;
use serde::Serialize;

/// One changed-or-removed state slot between two block indices.
///
/// `changed_state` is the hex-encoded serialized state, or `None` when the
/// slot was removed; removals are filtered out before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub path: String,
    #[serde(rename = "changedState")]
    pub changed_state: Option<String>,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountDiffsData {
    #[serde(rename = "accountDiffs")]
    pub account_diffs: Vec<DiffEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TipIndexData {
    #[serde(rename = "nodeStatus")]
    pub node_status: NodeStatus,
}

#[derive(Debug, Deserialize)]
pub struct NodeStatus {
    pub tip: Tip,
}

#[derive(Debug, Deserialize)]
pub struct Tip {
    pub index: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_account_diffs_response() {
        let body = r#"{
            "data": {
                "accountDiffs": [
                    { "path": "4b1a67c12f", "changedState": "6475313a61" },
                    { "path": "ffee00aa11", "changedState": null }
                ]
            }
        }"#;

        let response: GraphQlResponse<AccountDiffsData> = serde_json::from_str(body).unwrap();
        let diffs = response.data.unwrap().account_diffs;
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].changed_state.as_deref(), Some("6475313a61"));
        assert!(diffs[1].changed_state.is_none());
    }

    #[test]
    fn deserializes_tip_response() {
        let body = r#"{ "data": { "nodeStatus": { "tip": { "index": 123456 } } } }"#;
        let response: GraphQlResponse<TipIndexData> = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.unwrap().node_status.tip.index, 123_456);
    }

    #[test]
    fn surfaces_graphql_errors() {
        let body = r#"{ "data": null, "errors": [ { "message": "account not found" } ] }"#;
        let response: GraphQlResponse<AccountDiffsData> = serde_json::from_str(body).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors.unwrap()[0].message, "account not found");
    }
}
