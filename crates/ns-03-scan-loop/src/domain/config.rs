use shared_types::BlockHeight;

/// Default commit queue bound, in messages.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Default number of heights between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Scan loop configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Commit queue bound. Producer waits when it is reached.
    pub queue_capacity: usize,
    /// Log progress every this many sealed heights.
    pub progress_interval: u64,
    /// Stop after this height even if the tip is higher.
    pub stop_height: Option<BlockHeight>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            stop_height: None,
        }
    }
}

impl ScanConfig {
    /// Last height to process given the chain tip.
    pub fn target_height(&self, tip: BlockHeight) -> BlockHeight {
        match self.stop_height {
            Some(stop) => stop.min(tip),
            None => tip,
        }
    }
}
