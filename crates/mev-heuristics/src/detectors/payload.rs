//! Call data heuristics.

use crate::factors::{RiskFactor, RiskFinding, Selector};
use crate::types::TransactionRecord;

/// `0x` followed by one 4-byte selector.
const BARE_SELECTOR_LEN: usize = 10;

/// Function selectors commonly seen in MEV bundles.
pub const MEV_SELECTORS: [(Selector, &str); 4] = [
    (Selector([0xa9, 0x05, 0x9c, 0xbb]), "transfer"),
    (Selector([0x09, 0x5e, 0xa7, 0xb3]), "approve"),
    (Selector([0x38, 0xed, 0x17, 0x39]), "swapExactTokensForTokens"),
    (Selector([0x7f, 0xf3, 0x6a, 0xb5]), "swapExactETHForTokens"),
];

/// Score the call data of a transaction.
pub fn analyze(tx: &TransactionRecord) -> RiskFinding {
    let mut finding = RiskFinding::default();

    if tx.data.len() > BARE_SELECTOR_LEN {
        finding.add(RiskFactor::ComplexTransactionData, 5);
    }

    if let Some(selector) = leading_selector(&tx.data) {
        if let Some((known, _)) = MEV_SELECTORS.iter().find(|(s, _)| *s == selector) {
            finding.add(RiskFactor::MevFunctionSignature(*known), 10);
        }
    }

    finding
}

/// Decode the first four bytes of `0x`-prefixed call data.
pub fn leading_selector(data: &str) -> Option<Selector> {
    let hex_part = data.strip_prefix("0x").or_else(|| data.strip_prefix("0X"))?;
    let head = hex_part.get(..8)?;
    let mut selector = [0u8; 4];
    hex::decode_to_slice(head, &mut selector).ok()?;
    Some(Selector(selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn payload_tx(data: &str) -> TransactionRecord {
        TransactionRecord {
            data: data.to_string(),
            ..TransactionRecord::new("0xa", "0xb", Utc::now())
        }
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(analyze(&payload_tx("0x")), RiskFinding::default());
    }

    #[test]
    fn test_bare_selector_is_not_complex() {
        let finding = analyze(&payload_tx("0x095ea7b3"));
        assert_eq!(
            finding.factors,
            vec![RiskFactor::MevFunctionSignature(Selector([0x09, 0x5e, 0xa7, 0xb3]))]
        );
        assert_eq!(finding.score, 10);
    }

    #[test]
    fn test_swap_call() {
        let data = format!("0x7ff36ab5{}", "00".repeat(128));
        let finding = analyze(&payload_tx(&data));

        let tags: Vec<String> = finding.factors.iter().map(RiskFactor::tag).collect();
        assert_eq!(
            tags,
            vec!["complex_transaction_data", "mev_function_signature_0x7ff36ab5"]
        );
        assert_eq!(finding.score, 15);
    }

    #[test]
    fn test_selector_match_ignores_case() {
        let finding = analyze(&payload_tx("0xA9059CBB0000"));
        assert!(finding.contains(RiskFactor::MevFunctionSignature(Selector([0xa9, 0x05, 0x9c, 0xbb]))));
    }

    #[test]
    fn test_unknown_selector_is_only_complex() {
        let finding = analyze(&payload_tx("0xdeadbeef00000000"));
        assert_eq!(finding.factors, vec![RiskFactor::ComplexTransactionData]);
    }

    #[test]
    fn test_non_hex_payload() {
        assert_eq!(leading_selector("0xzzzzzzzz"), None);
        assert_eq!(leading_selector("a9059cbb"), None);
        assert_eq!(leading_selector("0xa905"), None);
    }
}
