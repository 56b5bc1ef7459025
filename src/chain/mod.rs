//! Chain diff source: what changed between two block indices.
//!
//! The remote node is treated as a possibly-slow, possibly-failing
//! dependency; both queries are idempotent reads, safe to repeat with the
//! same arguments after a failed iteration.

use async_trait::async_trait;

use crate::Result;

pub mod client;
pub mod types;

pub use client::HeadlessClient;
pub use types::DiffEntry;

/// Read-only view of the remote chain for one account partition.
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Changed state entries for `(base_index, target_index]` of an account.
    async fn get_account_diffs(
        &self,
        account_address: &str,
        base_index: i64,
        target_index: i64,
    ) -> Result<Vec<DiffEntry>>;

    /// Current tip index of the chain.
    async fn get_tip_index(&self, account_address: &str) -> Result<i64>;
}
