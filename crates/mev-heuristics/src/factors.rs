//! Risk factor tags and per-analyzer findings.

use std::fmt;

use serde::{Serialize, Serializer};

/// The five analyzers, in the order their factors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzerKind {
    Gas,
    Address,
    Value,
    Timing,
    Payload,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::Gas => "gas",
            AnalyzerKind::Address => "address",
            AnalyzerKind::Value => "value",
            AnalyzerKind::Timing => "timing",
            AnalyzerKind::Payload => "payload",
        }
    }
}

/// Leading 4 bytes of call data identifying the invoked function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub [u8; 4]);

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A named signal contributing to a transaction's risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskFactor {
    HighGasPrice,
    ExtremelyHighGas,
    HighPriorityFee,
    HighGasLimit,
    KnownMevBotSender,
    KnownMevBotRecipient,
    DexInteraction,
    ContractInteraction,
    SuspiciousSender,
    HighValueTransaction,
    MediumValueTransaction,
    RoundNumberValue,
    RapidFireTransactions,
    FrequentTransactions,
    ComplexTransactionData,
    MevFunctionSignature(Selector),
    /// An analyzer could not parse its inputs.
    InvalidData(AnalyzerKind),
    /// The whole analysis failed.
    AnalysisError,
}

impl RiskFactor {
    /// The wire tag for this factor, e.g. `high_gas_price`.
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            RiskFactor::HighGasPrice => "high_gas_price",
            RiskFactor::ExtremelyHighGas => "extremely_high_gas",
            RiskFactor::HighPriorityFee => "high_priority_fee",
            RiskFactor::HighGasLimit => "high_gas_limit",
            RiskFactor::KnownMevBotSender => "known_mev_bot_sender",
            RiskFactor::KnownMevBotRecipient => "known_mev_bot_recipient",
            RiskFactor::DexInteraction => "dex_interaction",
            RiskFactor::ContractInteraction => "contract_interaction",
            RiskFactor::SuspiciousSender => "suspicious_sender",
            RiskFactor::HighValueTransaction => "high_value_transaction",
            RiskFactor::MediumValueTransaction => "medium_value_transaction",
            RiskFactor::RoundNumberValue => "round_number_value",
            RiskFactor::RapidFireTransactions => "rapid_fire_transactions",
            RiskFactor::FrequentTransactions => "frequent_transactions",
            RiskFactor::ComplexTransactionData => "complex_transaction_data",
            RiskFactor::AnalysisError => "analysis_error",
            RiskFactor::MevFunctionSignature(selector) => {
                return write!(f, "mev_function_signature_{}", selector);
            }
            RiskFactor::InvalidData(kind) => {
                return write!(f, "invalid_{}_data", kind.as_str());
            }
        };
        f.write_str(tag)
    }
}

impl Serialize for RiskFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Partial score and triggered factors from one analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiskFinding {
    pub score: u32,
    pub factors: Vec<RiskFactor>,
}

impl RiskFinding {
    /// Record a triggered factor and its weight.
    pub fn add(&mut self, factor: RiskFactor, weight: u32) {
        self.score += weight;
        self.factors.push(factor);
    }

    /// The zero-score finding reported when an analyzer's input is malformed.
    pub fn invalid(kind: AnalyzerKind) -> Self {
        Self {
            score: 0,
            factors: vec![RiskFactor::InvalidData(kind)],
        }
    }

    pub fn contains(&self, factor: RiskFactor) -> bool {
        self.factors.contains(&factor)
    }
}
