//! Transferred value heuristics.

use rust_decimal::Decimal;

use crate::error::FieldError;
use crate::factors::{RiskFactor, RiskFinding};
use crate::types::TransactionRecord;

const HIGH_VALUE: u64 = 100;
const MEDIUM_VALUE: u64 = 10;

/// Score the native-currency value of a transaction.
pub fn analyze(tx: &TransactionRecord) -> Result<RiskFinding, FieldError> {
    let value = tx.value.resolve("value", Decimal::ZERO)?;
    let mut finding = RiskFinding::default();

    if value > Decimal::from(HIGH_VALUE) {
        finding.add(RiskFactor::HighValueTransaction, 15);
    } else if value > Decimal::from(MEDIUM_VALUE) {
        finding.add(RiskFactor::MediumValueTransaction, 5);
    }

    // Bots tend to move whole units
    if value > Decimal::ZERO && value.fract().is_zero() {
        finding.add(RiskFactor::RoundNumberValue, 5);
    }

    Ok(finding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decimal_field;
    use chrono::Utc;
    use serde_json::json;

    fn value_tx(raw: serde_json::Value) -> TransactionRecord {
        let mut tx = TransactionRecord::new("0xa", "0xb", Utc::now());
        tx.value = decimal_field(Some(&raw));
        tx
    }

    #[test]
    fn test_medium_value() {
        let finding = analyze(&value_tx(json!("50.5"))).unwrap();
        assert_eq!(finding.factors, vec![RiskFactor::MediumValueTransaction]);
        assert_eq!(finding.score, 5);
    }

    #[test]
    fn test_medium_round_value() {
        let finding = analyze(&value_tx(json!("50"))).unwrap();
        assert_eq!(
            finding.factors,
            vec![RiskFactor::MediumValueTransaction, RiskFactor::RoundNumberValue]
        );
        assert_eq!(finding.score, 10);
    }

    #[test]
    fn test_trailing_zero_fraction_counts_as_integral() {
        let finding = analyze(&value_tx(json!("50.0"))).unwrap();
        assert!(finding.contains(RiskFactor::MediumValueTransaction));
        assert!(finding.contains(RiskFactor::RoundNumberValue));
    }

    #[test]
    fn test_high_value_excludes_medium() {
        let finding = analyze(&value_tx(json!(250.25))).unwrap();
        assert_eq!(finding.factors, vec![RiskFactor::HighValueTransaction]);
        assert_eq!(finding.score, 15);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(
            analyze(&value_tx(json!("10"))).unwrap().factors,
            vec![RiskFactor::RoundNumberValue]
        );
        assert_eq!(
            analyze(&value_tx(json!("100"))).unwrap().factors,
            vec![RiskFactor::MediumValueTransaction, RiskFactor::RoundNumberValue]
        );
    }

    #[test]
    fn test_zero_value_is_normal() {
        assert_eq!(analyze(&value_tx(json!(0))).unwrap(), RiskFinding::default());
        assert_eq!(
            analyze(&TransactionRecord::new("0xa", "0xb", Utc::now())).unwrap(),
            RiskFinding::default()
        );
    }

    #[test]
    fn test_value_beyond_decimal_range_is_high() {
        for raw in [json!("1e30"), json!(1e30)] {
            let finding = analyze(&value_tx(raw)).unwrap();
            assert_eq!(
                finding.factors,
                vec![RiskFactor::HighValueTransaction, RiskFactor::RoundNumberValue]
            );
            assert_eq!(finding.score, 20);
        }
    }

    #[test]
    fn test_unparseable_value() {
        let err = analyze(&value_tx(json!("lots"))).unwrap_err();
        assert_eq!(err.field, "value");
    }
}
