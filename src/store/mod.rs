//! Document store layer for `PostgreSQL` operations.
//!
//! Two concerns live here, each behind its own capability trait:
//!
//! - the **checkpoint store**: durable `(poller_id, collection)` →
//!   `latest_block_index` records, the single source of truth for how far
//!   a partition has progressed;
//! - the **document sink**: JSONB state documents upserted by entity key,
//!   the single source of truth for mirrored entity state.
//!
//! No locking is layered on top: partitions own disjoint checkpoint keys
//! and disjoint document key spaces, and upserts are idempotent.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::StateDocument;
use crate::Result;

mod checkpoints;
mod documents;
mod schema;

/// Durable record of per-partition sync progress.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Last synchronized block index for a partition.
    ///
    /// Fails with [`crate::MirrorError::CheckpointNotFound`] when the
    /// partition has never synced.
    async fn get_synced_block_index(&self, poller_id: &str, collection: &str) -> Result<i64>;

    /// Atomic upsert of a partition's checkpoint.
    async fn update_checkpoint(
        &self,
        poller_id: &str,
        collection: &str,
        block_index: i64,
    ) -> Result<()>;
}

/// Batch-upsert sink for converted state documents.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Upsert a batch of documents into a collection, all-or-nothing.
    ///
    /// Re-applying the same batch is safe: upserts are keyed by entity key.
    async fn upsert_many(&self, collection: &str, documents: &[StateDocument]) -> Result<()>;

    /// Store-side notion of the latest known height, used by the startup
    /// bootstrap check. Fails with `CheckpointNotFound` when no partition
    /// has ever recorded progress.
    async fn tip_index(&self) -> Result<i64>;
}

/// Database connection pool wrapper.
///
/// This type is `Clone` and thread-safe; cloning creates a new reference to
/// the same connection pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Create a new store with an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new store from configuration.
    ///
    /// # Errors
    /// Returns an error if the connection pool cannot be established.
    pub async fn from_config(config: &crate::AppConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Underlying connection pool, for ad-hoc queries.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}
