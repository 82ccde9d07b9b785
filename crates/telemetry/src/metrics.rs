//! Prometheus metrics for the MEV Radar service.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Metrics collector for the MEV Radar service.
///
/// Metrics live in a dedicated registry so several collectors can coexist
/// in one process.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    transactions_analyzed: IntCounter,
    verdicts: IntCounterVec,
    analysis_errors: IntCounter,
    rejected_requests: IntCounter,
    analysis_latency: Histogram,
    known_bots: IntGauge,
    cache_size: IntGauge,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let transactions_analyzed = IntCounter::new(
            "mev_radar_transactions_analyzed_total",
            "Total number of transactions analyzed",
        )?;
        registry.register(Box::new(transactions_analyzed.clone()))?;

        let verdicts = IntCounterVec::new(
            Opts::new("mev_radar_verdicts_total", "Verdicts issued by category"),
            &["category"],
        )?;
        registry.register(Box::new(verdicts.clone()))?;

        let analysis_errors = IntCounter::new(
            "mev_radar_analysis_errors_total",
            "Total number of analyses that returned a degraded verdict",
        )?;
        registry.register(Box::new(analysis_errors.clone()))?;

        let rejected_requests = IntCounter::new(
            "mev_radar_rejected_requests_total",
            "Total number of detection requests rejected by validation",
        )?;
        registry.register(Box::new(rejected_requests.clone()))?;

        let analysis_latency = Histogram::with_opts(
            HistogramOpts::new(
                "mev_radar_analysis_latency_seconds",
                "Time spent analyzing one transaction in seconds",
            )
            .buckets(vec![0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05]),
        )?;
        registry.register(Box::new(analysis_latency.clone()))?;

        let known_bots = IntGauge::new("mev_radar_known_bots", "Number of known MEV bot addresses")?;
        registry.register(Box::new(known_bots.clone()))?;

        let cache_size = IntGauge::new(
            "mev_radar_cache_size",
            "Number of recent transactions retained for correlation",
        )?;
        registry.register(Box::new(cache_size.clone()))?;

        Ok(Self {
            registry,
            transactions_analyzed,
            verdicts,
            analysis_errors,
            rejected_requests,
            analysis_latency,
            known_bots,
            cache_size,
        })
    }

    /// Record one completed analysis.
    ///
    /// # Arguments
    /// * `category` - Verdict category label
    /// * `duration_secs` - Wall time spent in the engine
    pub fn record_verdict(&self, category: &str, duration_secs: f64) {
        self.transactions_analyzed.inc();
        self.verdicts.with_label_values(&[category]).inc();
        self.analysis_latency.observe(duration_secs);
        if category == "error" {
            self.analysis_errors.inc();
        }
    }

    /// Increment the rejected requests counter.
    pub fn inc_rejected_requests(&self) {
        self.rejected_requests.inc();
    }

    pub fn set_known_bots(&self, count: usize) {
        self.known_bots.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn set_cache_size(&self, count: usize) {
        self.cache_size.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Get Prometheus metrics as a string.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_registries() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.record_verdict("mev_bot", 0.0002);
        first.record_verdict("error", 0.0001);
        first.set_known_bots(5);

        let text = first.gather().unwrap();
        assert!(text.contains("mev_radar_transactions_analyzed_total 2"));
        assert!(text.contains("mev_radar_verdicts_total{category=\"mev_bot\"} 1"));
        assert!(text.contains("mev_radar_analysis_errors_total 1"));
        assert!(text.contains("mev_radar_known_bots 5"));

        assert!(second.gather().unwrap().contains("mev_radar_transactions_analyzed_total 0"));
    }
}
