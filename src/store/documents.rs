//! State document persistence.

use async_trait::async_trait;
use sqlx::Row;

use super::DocumentSink;
use super::Store;
use crate::models::StateDocument;
use crate::Result;

impl Store {
    /// Fetch one document by collection and entity key.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<StateDocument>> {
        let row = sqlx::query(
            "SELECT key, address, block_index, body FROM state_documents \
             WHERE collection = $1 AND key = $2",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| StateDocument {
            key: r.get("key"),
            address: r.get("address"),
            block_index: r.get("block_index"),
            body: r.get("body"),
        }))
    }

    /// Number of documents in a collection.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count_documents(&self, collection: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM state_documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("count"))
    }
}

#[async_trait]
impl DocumentSink for Store {
    async fn upsert_many(&self, collection: &str, documents: &[StateDocument]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        // One transaction per batch: the whole window's documents land or
        // none do.
        let mut tx = self.pool.begin().await?;

        for document in documents {
            sqlx::query(
                "INSERT INTO state_documents (collection, key, address, block_index, body) \
                 VALUES ($1, $2, $3, $4, $5) \
                 ON CONFLICT (collection, key) \
                 DO UPDATE SET address = EXCLUDED.address, \
                               block_index = EXCLUDED.block_index, \
                               body = EXCLUDED.body, \
                               updated_at = now()",
            )
            .bind(collection)
            .bind(&document.key)
            .bind(&document.address)
            .bind(document.block_index)
            .bind(&document.body)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn tip_index(&self) -> Result<i64> {
        self.baseline_block_index().await
    }
}
