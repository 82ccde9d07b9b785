//! Detection engine: runs the analyzers, aggregates and caches the result.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::{CachedEntry, TransactionCache};
use crate::classifier::classify;
use crate::config::EngineConfig;
use crate::detectors::{address, gas, payload, timing, value};
use crate::error::{EngineResult, FieldError};
use crate::factors::{AnalyzerKind, RiskFinding};
use crate::reference::ReferenceData;
use crate::reputation::{AddressReputation, HashSampleReputation};
use crate::stats::CacheStats;
use crate::types::TransactionRecord;
use crate::verdict::{round2, AnalysisDetails, Verdict, MAX_RISK_SCORE};

/// Scores transactions for MEV likelihood.
///
/// Owns the reference address sets and the recent-transaction history. All
/// methods take `&self`; share one engine across tasks behind an `Arc`.
pub struct DetectionEngine {
    config: EngineConfig,
    reference: ReferenceData,
    cache: TransactionCache,
    reputation: Box<dyn AddressReputation>,
}

impl DetectionEngine {
    /// Create an engine with the default reference data and placeholder reputation.
    pub fn new(config: EngineConfig) -> Self {
        let cache = TransactionCache::new(config.max_cache_size);
        Self {
            config,
            reference: ReferenceData::default(),
            cache,
            reputation: Box::new(HashSampleReputation::default()),
        }
    }

    /// Replace the reference address sets.
    pub fn with_reference_data(mut self, reference: ReferenceData) -> Self {
        self.reference = reference;
        self
    }

    /// Replace the sender reputation lookup.
    pub fn with_reputation<R: AddressReputation + 'static>(mut self, reputation: R) -> Self {
        self.reputation = Box::new(reputation);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a transaction.
    ///
    /// Never fails: a problem that prevents the analysis from completing
    /// yields a degraded verdict with category `error`.
    pub fn analyze(&self, tx: &TransactionRecord) -> Verdict {
        match self.try_analyze(tx) {
            Ok(verdict) => verdict,
            Err(e) => {
                error!("Error analyzing transaction {}: {}", tx.tx_hash, e);
                Verdict::degraded(e.to_string(), tx.received_at)
            }
        }
    }

    /// Parse a raw JSON transaction and analyze it.
    pub fn analyze_json(&self, raw: &Value) -> Verdict {
        let received_at = Utc::now();
        match TransactionRecord::from_json(raw, received_at) {
            Ok(tx) => self.analyze(&tx),
            Err(e) => {
                error!("Unusable transaction record: {}", e);
                Verdict::degraded(e.to_string(), received_at)
            }
        }
    }

    fn try_analyze(&self, tx: &TransactionRecord) -> EngineResult<Verdict> {
        let gas_analysis = isolate(AnalyzerKind::Gas, tx, gas::analyze(tx));

        let address_analysis = {
            let reference = self.reference.view()?;
            address::analyze(tx, &reference, self.reputation.as_ref())
        };

        let value_analysis = isolate(AnalyzerKind::Value, tx, value::analyze(tx));

        let data_analysis = payload::analyze(tx);
        let window = self.config.timing_window();

        // Count the sender's history and append under the same lock.
        let (details, risk_factors, category, risk_score) = self.cache.record_with(|history| {
            let details = AnalysisDetails {
                gas_analysis,
                address_analysis,
                value_analysis,
                timing_analysis: timing::analyze(tx, history, window),
                data_analysis,
            };

            let total = details.total_score();
            let risk_factors = details.factors();
            let category = classify(&risk_factors, total);
            let risk_score = total.min(MAX_RISK_SCORE);
            let entry = CachedEntry {
                tx_hash: tx.tx_hash.clone(),
                sender: tx.from.to_lowercase(),
                risk_score,
                processed_at: tx.received_at,
            };
            ((details, risk_factors, category, risk_score), entry)
        })?;

        debug!(
            "Transaction {} scored {} ({}), factors: {:?}",
            tx.tx_hash,
            risk_score,
            category.as_str(),
            risk_factors.iter().map(|f| f.tag()).collect::<Vec<_>>()
        );

        Ok(Verdict {
            risk_score: round2(f64::from(risk_score)),
            category,
            risk_factors,
            timestamp: tx.received_at,
            analysis_details: Some(details),
            error: None,
        })
    }

    /// Merge addresses into the known-bot set.
    ///
    /// # Returns
    /// The total number of known bots after the merge
    pub fn update_known_bots<I>(&self, addresses: I) -> EngineResult<usize>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.reference.update_known_bots(addresses)
    }

    pub fn known_bot_count(&self) -> EngineResult<usize> {
        self.reference.known_bot_count()
    }

    pub fn dex_router_count(&self) -> EngineResult<usize> {
        self.reference.dex_router_count()
    }

    /// Recent analyses, oldest first.
    pub fn cache_snapshot(&self) -> EngineResult<Vec<CachedEntry>> {
        self.cache.snapshot()
    }

    pub fn cache_len(&self) -> EngineResult<usize> {
        self.cache.len()
    }

    /// Risk distribution over the recent analyses.
    pub fn stats(&self) -> EngineResult<CacheStats> {
        Ok(CacheStats::from_entries(&self.cache_snapshot()?, Utc::now()))
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Contain a parse failure to the analyzer that hit it.
fn isolate(
    kind: AnalyzerKind,
    tx: &TransactionRecord,
    result: Result<RiskFinding, FieldError>,
) -> RiskFinding {
    result.unwrap_or_else(|e| {
        warn!("{} analysis skipped for transaction {}: {}", kind.as_str(), tx.tx_hash, e);
        RiskFinding::invalid(kind)
    })
}
