//! Engine output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classifier::Category;
use crate::factors::{RiskFactor, RiskFinding};

/// Upper bound on a verdict's score.
pub const MAX_RISK_SCORE: u32 = 100;

/// Per-analyzer findings, kept for auditability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisDetails {
    pub gas_analysis: RiskFinding,
    pub address_analysis: RiskFinding,
    pub value_analysis: RiskFinding,
    pub timing_analysis: RiskFinding,
    pub data_analysis: RiskFinding,
}

impl AnalysisDetails {
    /// Findings in reporting order: gas, address, value, timing, payload.
    pub fn findings(&self) -> [&RiskFinding; 5] {
        [
            &self.gas_analysis,
            &self.address_analysis,
            &self.value_analysis,
            &self.timing_analysis,
            &self.data_analysis,
        ]
    }

    /// Sum of all analyzer scores, before capping.
    pub fn total_score(&self) -> u32 {
        self.findings().iter().map(|f| f.score).sum()
    }

    /// All factors concatenated in reporting order.
    pub fn factors(&self) -> Vec<RiskFactor> {
        self.findings()
            .iter()
            .flat_map(|f| f.factors.iter().copied())
            .collect()
    }
}

/// Risk assessment for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    #[serde(rename = "riskScore")]
    pub risk_score: f64,
    pub category: Category,
    #[serde(rename = "riskFactors")]
    pub risk_factors: Vec<RiskFactor>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_details: Option<AnalysisDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Verdict {
    /// Verdict returned when the analysis could not be carried out.
    pub fn degraded(error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            risk_score: 0.0,
            category: Category::Error,
            risk_factors: vec![RiskFactor::AnalysisError],
            timestamp,
            analysis_details: None,
            error: Some(error.into()),
        }
    }

    /// Wire tags of the triggered factors.
    pub fn factor_tags(&self) -> Vec<String> {
        self.risk_factors.iter().map(RiskFactor::tag).collect()
    }

    pub fn has_factor(&self, factor: RiskFactor) -> bool {
        self.risk_factors.contains(&factor)
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_degraded_serialization() {
        let timestamp = Utc::now();
        let verdict = Verdict::degraded("boom", timestamp);
        let json = serde_json::to_value(&verdict).unwrap();

        assert_eq!(json["riskScore"], json!(0.0));
        assert_eq!(json["category"], json!("error"));
        assert_eq!(json["riskFactors"], json!(["analysis_error"]));
        assert_eq!(json["error"], json!("boom"));
        assert!(json.get("analysis_details").is_none());
    }

    #[test]
    fn test_details_aggregate_in_order() {
        let details = AnalysisDetails {
            gas_analysis: RiskFinding {
                score: 25,
                factors: vec![RiskFactor::HighGasPrice],
            },
            data_analysis: RiskFinding {
                score: 5,
                factors: vec![RiskFactor::ComplexTransactionData],
            },
            timing_analysis: RiskFinding {
                score: 10,
                factors: vec![RiskFactor::FrequentTransactions],
            },
            ..Default::default()
        };

        assert_eq!(details.total_score(), 40);
        assert_eq!(
            details.factors(),
            vec![
                RiskFactor::HighGasPrice,
                RiskFactor::FrequentTransactions,
                RiskFactor::ComplexTransactionData,
            ]
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(100.0), 100.0);
    }
}
