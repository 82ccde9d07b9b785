//! MEV heuristic detection for individual transactions.
//!
//! [`DetectionEngine`] runs five independent analyzers (gas, address, value,
//! timing, payload) over a [`TransactionRecord`], sums their partial scores,
//! classifies the result and returns a [`Verdict`].

pub mod cache;
pub mod classifier;
pub mod config;
pub mod detectors;
pub mod engine;
pub mod error;
pub mod factors;
pub mod reference;
pub mod reputation;
pub mod stats;
pub mod types;
pub mod verdict;

pub use cache::CachedEntry;
pub use classifier::Category;
pub use config::EngineConfig;
pub use engine::DetectionEngine;
pub use error::{EngineError, EngineResult, FieldError};
pub use factors::{AnalyzerKind, RiskFactor, RiskFinding, Selector};
pub use reference::ReferenceData;
pub use reputation::{AddressReputation, HashSampleReputation};
pub use stats::CacheStats;
pub use types::{Field, TransactionRecord};
pub use verdict::{AnalysisDetails, Verdict};
