//! Startup catch-up-vs-replay decision and snapshot reseeding.
//!
//! Replaying tens of thousands of blocks diff by diff is not a viable
//! catch-up strategy. When the store-wide baseline is missing or too far
//! behind the chain tip, the mirror loads a full snapshot instead and
//! initializes every partition's checkpoint to the snapshot's block index.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use tracing::warn;

use crate::chain::ChainSource;
use crate::models::Partition;
use crate::models::StateDocument;
use crate::store::CheckpointStore;
use crate::store::DocumentSink;
use crate::MirrorError;
use crate::Result;

/// Documents are upserted in chunks to bound transaction size.
const UPSERT_CHUNK_SIZE: usize = 500;

/// Decide whether the mirror must reseed from a snapshot.
///
/// Evaluated once per process lifetime, before any poller starts: reads the
/// store-side baseline and the chain tip, and compares the gap against the
/// configured threshold. A missing baseline (nothing ever synced) always
/// requires reseeding.
///
/// # Errors
/// Returns an error if the store or the chain cannot be queried; bootstrap
/// failures are fatal to the process.
pub async fn needs_reseed(
    sink: &dyn DocumentSink,
    chain: &dyn ChainSource,
    reference_address: &str,
    gap_threshold: i64,
) -> Result<bool> {
    let synced_index = match sink.tip_index().await {
        Ok(index) => index,
        Err(e) if e.is_checkpoint_not_found() => {
            info!("No checkpoint baseline found, snapshot reseed required");
            return Ok(true);
        }
        Err(e) => return Err(e),
    };

    let tip_index = chain.get_tip_index(reference_address).await?;
    let gap = tip_index - synced_index;

    info!(
        tip = tip_index,
        synced = synced_index,
        gap,
        threshold = gap_threshold,
        "Evaluated bootstrap staleness"
    );

    Ok(gap > gap_threshold)
}

/// On-disk snapshot of one collection.
#[derive(Debug, Deserialize)]
struct CollectionSnapshot {
    block_index: i64,
    documents: Vec<SnapshotDocument>,
}

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    key: String,
    address: String,
    body: serde_json::Value,
}

/// Loads per-collection snapshot files into the sink and initializes the
/// partition checkpoints to the snapshot's block index.
pub struct SnapshotInitializer {
    sink: Arc<dyn DocumentSink>,
    checkpoints: Arc<dyn CheckpointStore>,
    snapshot_path: PathBuf,
}

impl SnapshotInitializer {
    #[must_use]
    pub fn new(
        sink: Arc<dyn DocumentSink>,
        checkpoints: Arc<dyn CheckpointStore>,
        snapshot_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sink,
            checkpoints,
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Reseed every partition that has a snapshot file.
    ///
    /// A partition without a snapshot file is skipped with a warning; its
    /// poller will seed its own checkpoint at `tip - 1` on first run.
    ///
    /// # Errors
    /// Returns an error if a present snapshot file cannot be read or
    /// applied.
    pub async fn run(&self, partitions: &[Partition]) -> Result<()> {
        info!(path = %self.snapshot_path.display(), "Starting snapshot reseed");

        for partition in partitions {
            let file = self
                .snapshot_path
                .join(format!("{}.json", partition.collection));

            if !file.exists() {
                warn!(
                    collection = %partition.collection,
                    file = %file.display(),
                    "No snapshot file for collection, partition will seed from chain tip"
                );
                continue;
            }

            self.reseed_partition(partition, &file).await?;
        }

        info!("Snapshot reseed finished");
        Ok(())
    }

    async fn reseed_partition(&self, partition: &Partition, file: &Path) -> Result<()> {
        let content = std::fs::read_to_string(file)?;
        let snapshot: CollectionSnapshot = serde_json::from_str(&content).map_err(|e| {
            MirrorError::Snapshot(format!(
                "invalid snapshot file {}: {e}",
                file.display()
            ))
        })?;

        let documents: Vec<StateDocument> = snapshot
            .documents
            .into_iter()
            .map(|d| StateDocument {
                key: d.key,
                address: d.address,
                block_index: snapshot.block_index,
                body: d.body,
            })
            .collect();

        info!(
            collection = %partition.collection,
            block_index = snapshot.block_index,
            documents = documents.len(),
            "Loading collection snapshot"
        );

        for chunk in documents.chunks(UPSERT_CHUNK_SIZE) {
            self.sink.upsert_many(&partition.collection, chunk).await?;
        }

        // Checkpoint written after the documents, same ordering as the
        // pollers.
        self.checkpoints
            .update_checkpoint(
                &partition.poller_id,
                &partition.collection,
                snapshot.block_index,
            )
            .await?;

        Ok(())
    }
}
