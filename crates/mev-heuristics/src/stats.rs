//! Summary statistics over the recent transaction history.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CachedEntry;

const HIGH_RISK_ABOVE: u32 = 75;
const LOW_RISK_UP_TO: u32 = 25;

/// Risk distribution of the cached analyses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub total_analyzed: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
    pub avg_risk_score: f64,
    pub cache_size: usize,
    pub timestamp: DateTime<Utc>,
}

impl CacheStats {
    pub fn from_entries(entries: &[CachedEntry], timestamp: DateTime<Utc>) -> Self {
        let high = entries.iter().filter(|e| e.risk_score > HIGH_RISK_ABOVE).count();
        let low = entries.iter().filter(|e| e.risk_score <= LOW_RISK_UP_TO).count();
        let avg = if entries.is_empty() {
            0.0
        } else {
            let total: u64 = entries.iter().map(|e| u64::from(e.risk_score)).sum();
            total as f64 / entries.len() as f64
        };

        Self {
            total_analyzed: entries.len(),
            high_risk_count: high,
            medium_risk_count: entries.len() - high - low,
            low_risk_count: low,
            avg_risk_score: avg,
            cache_size: entries.len(),
            timestamp,
        }
    }
}
