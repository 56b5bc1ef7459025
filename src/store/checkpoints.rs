//! Checkpoint store access.
//!
//! Keys are partition-exclusive, so no cross-partition locking exists here;
//! the only writer for a given `(poller_id, collection)` row is that
//! partition's poller.

use async_trait::async_trait;
use sqlx::Row;

use super::CheckpointStore;
use super::Store;
use crate::models::Checkpoint;
use crate::MirrorError;
use crate::Result;

impl Store {
    /// All checkpoints currently recorded, for diagnostics.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_checkpoints(&self) -> Result<Vec<Checkpoint>> {
        let rows = sqlx::query(
            "SELECT poller_id, collection, latest_block_index FROM checkpoints \
             ORDER BY collection",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Checkpoint {
                poller_id: row.get("poller_id"),
                collection: row.get("collection"),
                latest_block_index: row.get("latest_block_index"),
            })
            .collect())
    }

    /// Minimum checkpoint across all partitions, the most conservative
    /// store-wide baseline. `None` when nothing has ever synced.
    async fn min_checkpoint(&self) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT MIN(latest_block_index) AS baseline FROM checkpoints")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("baseline"))
    }

    pub(super) async fn baseline_block_index(&self) -> Result<i64> {
        self.min_checkpoint().await?.ok_or_else(|| {
            MirrorError::CheckpointNotFound {
                poller_id: "*".to_string(),
                collection: "*".to_string(),
            }
        })
    }
}

#[async_trait]
impl CheckpointStore for Store {
    async fn get_synced_block_index(&self, poller_id: &str, collection: &str) -> Result<i64> {
        let row = sqlx::query(
            "SELECT latest_block_index FROM checkpoints \
             WHERE poller_id = $1 AND collection = $2",
        )
        .bind(poller_id)
        .bind(collection)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.get("latest_block_index")).ok_or_else(|| {
            MirrorError::CheckpointNotFound {
                poller_id: poller_id.to_string(),
                collection: collection.to_string(),
            }
        })
    }

    async fn update_checkpoint(
        &self,
        poller_id: &str,
        collection: &str,
        block_index: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO checkpoints (poller_id, collection, latest_block_index) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (poller_id, collection) \
             DO UPDATE SET latest_block_index = EXCLUDED.latest_block_index, \
                           updated_at = now()",
        )
        .bind(poller_id)
        .bind(collection)
        .bind(block_index)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
