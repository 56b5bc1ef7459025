//! GraphQL client for the headless ledger node.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use serde_json::Value;

use super::types::AccountDiffsData;
use super::types::DiffEntry;
use super::types::GraphQlResponse;
use super::types::TipIndexData;
use super::ChainSource;
use crate::MirrorError;
use crate::Result;

const ACCOUNT_DIFFS_QUERY: &str = r"
query GetAccountDiffs($baseIndex: Long!, $changedIndex: Long!, $accountAddress: Address!) {
  accountDiffs(baseIndex: $baseIndex, changedIndex: $changedIndex, accountAddress: $accountAddress) {
    path
    changedState
  }
}";

const TIP_INDEX_QUERY: &str = r"
query GetTipIndex {
  nodeStatus {
    tip {
      index
    }
  }
}";

/// HTTP client for the headless node's GraphQL endpoint.
///
/// Cloning is cheap; the underlying connection pool is shared, and the
/// client tolerates concurrent calls from many partition pollers.
#[derive(Debug, Clone)]
pub struct HeadlessClient {
    client: Client,
    endpoint: String,
}

impl HeadlessClient {
    /// Create a new client for the given GraphQL endpoint.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(endpoint: &str, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;

        tracing::debug!("Creating headless client for {}", endpoint);

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Create a new client from `AppConfig`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &crate::AppConfig) -> Result<Self> {
        Self::new(
            config.headless_endpoint(),
            Duration::from_secs(config.chain.request_timeout_secs),
        )
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let body: GraphQlResponse<T> = response.json().await?;

        if let Some(errors) = body.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(MirrorError::ChainQuery(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| MirrorError::ChainQuery("empty response data".to_string()))
    }
}

#[async_trait]
impl ChainSource for HeadlessClient {
    async fn get_account_diffs(
        &self,
        account_address: &str,
        base_index: i64,
        target_index: i64,
    ) -> Result<Vec<DiffEntry>> {
        let data: AccountDiffsData = self
            .query(
                ACCOUNT_DIFFS_QUERY,
                json!({
                    "baseIndex": base_index,
                    "changedIndex": target_index,
                    "accountAddress": account_address,
                }),
            )
            .await?;

        Ok(data.account_diffs)
    }

    async fn get_tip_index(&self, _account_address: &str) -> Result<i64> {
        let data: TipIndexData = self.query(TIP_INDEX_QUERY, json!({})).await?;
        Ok(data.node_status.tip.index)
    }
}
