//! Verdict categories.

use serde::Serialize;

use crate::factors::RiskFactor;

/// The single label attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MevBot,
    Frontrunning,
    SandwichAttack,
    HighRisk,
    MediumRisk,
    Normal,
    /// The analysis itself failed.
    Error,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MevBot => "mev_bot",
            Category::Frontrunning => "frontrunning",
            Category::SandwichAttack => "sandwich_attack",
            Category::HighRisk => "high_risk",
            Category::MediumRisk => "medium_risk",
            Category::Normal => "normal",
            Category::Error => "error",
        }
    }
}

/// Pick a category from the triggered factors and the uncapped score.
///
/// Rules are checked in priority order and the first match wins.
pub fn classify(factors: &[RiskFactor], score: u32) -> Category {
    let has = |factor: RiskFactor| factors.contains(&factor);

    if has(RiskFactor::KnownMevBotSender) {
        Category::MevBot
    } else if has(RiskFactor::HighGasPrice) && has(RiskFactor::DexInteraction) {
        Category::Frontrunning
    } else if has(RiskFactor::RapidFireTransactions) {
        Category::SandwichAttack
    } else if score > 50 {
        Category::HighRisk
    } else if score > 25 {
        Category::MediumRisk
    } else {
        Category::Normal
    }
}
