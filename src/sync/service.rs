//! Supervisor for the per-partition pollers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::error;
use tracing::info;

use super::bootstrap::needs_reseed;
use super::bootstrap::SnapshotInitializer;
use super::poller::DiffPoller;
use super::processor::DiffProcessor;
use crate::chain::ChainSource;
use crate::config::AppConfig;
use crate::convert::ConverterRegistry;
use crate::models::Partition;
use crate::store::CheckpointStore;
use crate::store::DocumentSink;
use crate::MirrorError;
use crate::Result;

/// Runs the bootstrap decision, then one poller task per partition, and
/// holds the shutdown signal they all observe.
pub struct MirrorService {
    partitions: Vec<Partition>,
    chain: Arc<dyn ChainSource>,
    checkpoints: Arc<dyn CheckpointStore>,
    sink: Arc<dyn DocumentSink>,
    converters: ConverterRegistry,
    idle_interval: Duration,
    gap_threshold: i64,
    snapshot_path: String,
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl MirrorService {
    /// Assemble the service from its capabilities.
    pub fn new(
        config: &AppConfig,
        chain: Arc<dyn ChainSource>,
        checkpoints: Arc<dyn CheckpointStore>,
        sink: Arc<dyn DocumentSink>,
        converters: ConverterRegistry,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);

        Self {
            partitions: config.partitions(),
            chain,
            checkpoints,
            sink,
            converters,
            idle_interval: Duration::from_millis(config.sync.idle_interval_ms),
            gap_threshold: config.sync.gap_threshold,
            snapshot_path: config.sync.snapshot_path.clone(),
            shutdown,
            handles: Vec::new(),
        }
    }

    /// Evaluate the global catch-up-vs-replay policy and reseed if needed.
    ///
    /// Returns whether a reseed was performed.
    ///
    /// # Errors
    /// Bootstrap failures (store or chain unreachable, broken snapshot) are
    /// fatal; nothing has been started yet.
    pub async fn bootstrap(&self) -> Result<bool> {
        let reference = self.partitions.first().ok_or_else(|| {
            MirrorError::Config("cannot bootstrap without partitions".to_string())
        })?;

        let reseed = needs_reseed(
            self.sink.as_ref(),
            self.chain.as_ref(),
            &reference.account_address,
            self.gap_threshold,
        )
        .await?;

        if reseed {
            let initializer = SnapshotInitializer::new(
                self.sink.clone(),
                self.checkpoints.clone(),
                self.snapshot_path.clone(),
            );
            initializer.run(&self.partitions).await?;
        } else {
            info!("Checkpoints within threshold, catching up incrementally");
        }

        Ok(reseed)
    }

    /// Run the bootstrap decision, then spawn one poller per partition.
    ///
    /// # Errors
    /// Fails if called twice without an intervening [`stop`](Self::stop) or
    /// if bootstrap fails.
    pub async fn start(&mut self) -> Result<()> {
        if !self.handles.is_empty() {
            return Err(MirrorError::Config(
                "mirror service is already running".to_string(),
            ));
        }

        self.bootstrap().await?;

        info!(partitions = self.partitions.len(), "Spawning diff pollers");

        for partition in &self.partitions {
            let processor = DiffProcessor::new(
                partition.collection.clone(),
                self.converters.resolve(&partition.collection),
                self.sink.clone(),
            );

            let poller = DiffPoller::new(
                partition.clone(),
                self.chain.clone(),
                self.checkpoints.clone(),
                processor,
                self.idle_interval,
                self.shutdown.subscribe(),
            );

            self.handles.push(tokio::spawn(poller.run()));
        }

        Ok(())
    }

    /// Signal all pollers to stop and wait for them to drain.
    ///
    /// Mid-flight iterations finish their current step; checkpoint safety
    /// under cancellation comes from "persist before advance", so the next
    /// run at worst re-does one window per partition.
    pub async fn stop(&mut self) {
        info!("Stopping mirror service");
        let _ = self.shutdown.send(true);

        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!(error = %e, "Poller task panicked");
            }
        }

        info!("Mirror service stopped");
    }

    /// Partitions this service supervises.
    #[must_use]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }
}
