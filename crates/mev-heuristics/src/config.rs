//! Engine configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_MAX_CACHE_SIZE;

/// Default correlation window for the timing analyzer.
pub const DEFAULT_TIMING_WINDOW_SECS: u64 = 60;

/// Tunables for a [`DetectionEngine`](crate::DetectionEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of recent analyses retained for timing correlation and stats.
    pub max_cache_size: usize,
    /// How far back the timing analyzer looks for the same sender.
    pub timing_window_secs: u64,
}

impl EngineConfig {
    pub fn timing_window(&self) -> Duration {
        let secs = i64::try_from(self.timing_window_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1_000);
        Duration::seconds(secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            timing_window_secs: DEFAULT_TIMING_WINDOW_SECS,
        }
    }
}
