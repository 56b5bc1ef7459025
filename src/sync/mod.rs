//! Incremental synchronization engine.
//!
//! One independent polling loop per partition turns the chain's diff
//! stream into document upserts, with durable per-partition checkpoints
//! gating progress. The bootstrap decision runs once at startup and
//! chooses between full-snapshot reseeding and incremental catch-up.

pub mod bootstrap;
pub mod poller;
pub mod processor;
pub mod service;
pub mod window;

pub use bootstrap::needs_reseed;
pub use bootstrap::SnapshotInitializer;
pub use poller::DiffPoller;
pub use poller::PollOutcome;
pub use processor::DiffProcessor;
pub use service::MirrorService;
pub use window::compute_window;
pub use window::SyncWindow;
