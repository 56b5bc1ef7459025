//! Range calculation for one poll iteration.

/// The block range requested in one iteration, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub base_index: i64,
    pub target_index: i64,
    pub chain_tip_index: i64,
}

impl SyncWindow {
    /// No new blocks within policy, or already at tip.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base_index >= self.target_index
    }

    /// How far the partition is behind the chain tip.
    #[must_use]
    pub const fn gap(&self) -> i64 {
        self.chain_tip_index - self.base_index
    }
}

/// Compute the next window to request, bounded by the partition's window
/// size.
///
/// `base = synced`, `target = base + min(tip - base, max_window)`. The step
/// is clamped at zero so a remote tip that momentarily reads behind the
/// checkpoint yields an empty window instead of a regression.
#[must_use]
pub fn compute_window(synced_index: i64, chain_tip_index: i64, max_window: i64) -> SyncWindow {
    let step = (chain_tip_index - synced_index).clamp(0, max_window);

    SyncWindow {
        base_index: synced_index,
        target_index: synced_index + step,
        chain_tip_index,
    }
}
