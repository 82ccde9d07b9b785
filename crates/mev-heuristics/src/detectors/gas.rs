//! Gas pricing heuristics.
//!
//! Frontrunners and MEV bots outbid the market on gas; all thresholds are in gwei.

use rust_decimal::Decimal;

use crate::error::FieldError;
use crate::factors::{RiskFactor, RiskFinding};
use crate::types::TransactionRecord;

const HIGH_GAS_PRICE_GWEI: u64 = 100;
const EXTREME_MAX_FEE_GWEI: u64 = 200;
const HIGH_PRIORITY_FEE_GWEI: u64 = 50;
const HIGH_GAS_LIMIT: u64 = 500_000;

/// Score the gas fields of a transaction.
///
/// Every field is resolved before any check runs, so a single malformed
/// field fails the whole analyzer with no partial credit.
pub fn analyze(tx: &TransactionRecord) -> Result<RiskFinding, FieldError> {
    let gas_price = tx.gas_price.resolve("gasPrice", Decimal::ZERO)?;
    let max_fee = tx.max_fee_per_gas.resolve("maxFeePerGas", gas_price)?;
    let priority_fee = tx
        .max_priority_fee_per_gas
        .resolve("maxPriorityFeePerGas", Decimal::ZERO)?;
    let gas_limit = tx.gas_limit.resolve("gasLimit", 0)?;

    let mut finding = RiskFinding::default();

    if gas_price > Decimal::from(HIGH_GAS_PRICE_GWEI) {
        finding.add(RiskFactor::HighGasPrice, 25);
    }

    if max_fee > Decimal::from(EXTREME_MAX_FEE_GWEI) {
        finding.add(RiskFactor::ExtremelyHighGas, 30);
    }

    if priority_fee > Decimal::from(HIGH_PRIORITY_FEE_GWEI) {
        finding.add(RiskFactor::HighPriorityFee, 20);
    }

    if gas_limit > HIGH_GAS_LIMIT {
        finding.add(RiskFactor::HighGasLimit, 10);
    }

    Ok(finding)
}
