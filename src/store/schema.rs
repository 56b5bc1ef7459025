//! Schema initialization.

use super::Store;
use crate::Result;

const CREATE_CHECKPOINTS: &str = r"
CREATE TABLE IF NOT EXISTS checkpoints (
    poller_id           TEXT        NOT NULL,
    collection          TEXT        NOT NULL,
    latest_block_index  BIGINT      NOT NULL,
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (poller_id, collection)
)";

const CREATE_STATE_DOCUMENTS: &str = r"
CREATE TABLE IF NOT EXISTS state_documents (
    collection   TEXT        NOT NULL,
    key          TEXT        NOT NULL,
    address      TEXT        NOT NULL,
    block_index  BIGINT      NOT NULL,
    body         JSONB       NOT NULL,
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, key)
)";

const CREATE_STATE_DOCUMENTS_ADDRESS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_state_documents_address
    ON state_documents (collection, address)";

impl Store {
    /// Create tables and indexes if they do not exist.
    ///
    /// Safe to run on every startup.
    ///
    /// # Errors
    /// Returns an error if any DDL statement fails.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_CHECKPOINTS).execute(&self.pool).await?;
        sqlx::query(CREATE_STATE_DOCUMENTS)
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_STATE_DOCUMENTS_ADDRESS_INDEX)
            .execute(&self.pool)
            .await?;

        tracing::info!("Store schema initialized");
        Ok(())
    }
}
