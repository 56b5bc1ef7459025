//! Per-partition polling loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;

use super::processor::DiffProcessor;
use super::window::compute_window;
use super::window::SyncWindow;
use crate::chain::ChainSource;
use crate::models::Partition;
use crate::store::CheckpointStore;
use crate::Result;

/// What one iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Caught up with the tip (or within window policy); slept instead.
    Idle,
    /// A window was processed and the checkpoint advanced to its target.
    Synced {
        window: SyncWindow,
        documents: usize,
    },
}

/// The sync coordinator for one partition.
///
/// Runs forever until the shutdown signal flips: read checkpoint, compute
/// window, fetch diffs, convert, persist, advance checkpoint. The loop body
/// is stateless between iterations except for what it re-reads from the
/// checkpoint store, so crashing or cancelling at any point simply re-does
/// the current window on the next run.
pub struct DiffPoller {
    partition: Partition,
    chain: Arc<dyn ChainSource>,
    checkpoints: Arc<dyn CheckpointStore>,
    processor: DiffProcessor,
    idle_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl DiffPoller {
    #[must_use]
    pub fn new(
        partition: Partition,
        chain: Arc<dyn ChainSource>,
        checkpoints: Arc<dyn CheckpointStore>,
        processor: DiffProcessor,
        idle_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            partition,
            chain,
            checkpoints,
            processor,
            idle_interval,
            shutdown,
        }
    }

    /// Run the polling loop until shutdown.
    ///
    /// Iteration errors are contained here: logged with partition context,
    /// never propagated, never fatal to sibling partitions. The checkpoint
    /// only advances after the corresponding batch persisted, so an error
    /// leaves the partition ready to retry the same window.
    pub async fn run(mut self) {
        info!(
            collection = %self.partition.collection,
            account = %self.partition.account_address,
            max_window = self.partition.max_window,
            "Starting diff poller"
        );

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            if let Err(e) = self.poll_once().await {
                error!(
                    collection = %self.partition.collection,
                    error = %e,
                    "Sync iteration failed"
                );
            }
        }

        info!(collection = %self.partition.collection, "Diff poller stopped");
    }

    /// Execute one iteration of the state machine.
    ///
    /// # Errors
    /// Any remote, persistence, or conversion failure aborts the iteration
    /// without advancing the checkpoint; the same window is retried on the
    /// next call.
    pub async fn poll_once(&mut self) -> Result<PollOutcome> {
        let synced_index = self.synced_block_index().await?;
        let tip_index = self
            .chain
            .get_tip_index(&self.partition.account_address)
            .await?;

        let window = compute_window(synced_index, tip_index, self.partition.max_window);

        if window.is_empty() {
            self.idle().await;
            return Ok(PollOutcome::Idle);
        }

        info!(
            collection = %self.partition.collection,
            tip = window.chain_tip_index,
            gap = window.gap(),
            base = window.base_index,
            target = window.target_index,
            "Requesting diff data"
        );

        let diffs = self
            .chain
            .get_account_diffs(
                &self.partition.account_address,
                window.base_index,
                window.target_index,
            )
            .await?;

        if diffs.is_empty() {
            debug!(collection = %self.partition.collection, "No diffs in window");
            self.advance_checkpoint(window.target_index).await?;
            return Ok(PollOutcome::Synced {
                window,
                documents: 0,
            });
        }

        let documents = self.processor.convert(&diffs, window.target_index)?;

        if !documents.is_empty() {
            self.processor.persist(&documents).await?;
        }

        // The checkpoint moves only after the batch is in the store.
        self.advance_checkpoint(window.target_index).await?;

        info!(
            collection = %self.partition.collection,
            base = window.base_index,
            target = window.target_index,
            diffs = diffs.len(),
            documents = documents.len(),
            "Window synchronized"
        );

        Ok(PollOutcome::Synced {
            window,
            documents: documents.len(),
        })
    }

    /// Read the partition's checkpoint, seeding it on first run.
    ///
    /// A missing checkpoint is not an error: the checkpoint is set to
    /// `tip - 1` and persisted, so the very next window treats the current
    /// tip as the first block to diff. Re-running this after a crash lands
    /// on the same state.
    async fn synced_block_index(&self) -> Result<i64> {
        match self
            .checkpoints
            .get_synced_block_index(&self.partition.poller_id, &self.partition.collection)
            .await
        {
            Ok(index) => Ok(index),
            Err(e) if e.is_checkpoint_not_found() => {
                let tip_index = self
                    .chain
                    .get_tip_index(&self.partition.account_address)
                    .await?;

                info!(
                    collection = %self.partition.collection,
                    block_index = tip_index - 1,
                    "No checkpoint found, seeding at tip - 1"
                );

                self.checkpoints
                    .update_checkpoint(
                        &self.partition.poller_id,
                        &self.partition.collection,
                        tip_index - 1,
                    )
                    .await?;

                Ok(tip_index - 1)
            }
            Err(e) => Err(e),
        }
    }

    async fn advance_checkpoint(&self, block_index: i64) -> Result<()> {
        self.checkpoints
            .update_checkpoint(
                &self.partition.poller_id,
                &self.partition.collection,
                block_index,
            )
            .await
    }

    /// Backpressure state: nothing to do, wait a tick or a shutdown signal.
    async fn idle(&mut self) {
        tokio::select! {
            () = tokio::time::sleep(self.idle_interval) => {}
            _ = self.shutdown.changed() => {}
        }
    }
}
