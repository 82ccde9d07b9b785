//! Sender and recipient address heuristics.

use std::str::FromStr;

use alloy::primitives::Address;

use crate::factors::{RiskFactor, RiskFinding};
use crate::reference::ReferenceView;
use crate::reputation::AddressReputation;
use crate::types::TransactionRecord;

/// Score the addresses involved in a transaction.
pub fn analyze(
    tx: &TransactionRecord,
    reference: &ReferenceView<'_>,
    reputation: &dyn AddressReputation,
) -> RiskFinding {
    let from = tx.from.to_lowercase();
    let to = tx.to.to_lowercase();
    let mut finding = RiskFinding::default();

    if reference.known_bots.contains(&from) {
        finding.add(RiskFactor::KnownMevBotSender, 40);
    }

    if reference.known_bots.contains(&to) {
        finding.add(RiskFactor::KnownMevBotRecipient, 30);
    }

    if reference.dex_routers.contains(&to) {
        finding.add(RiskFactor::DexInteraction, 5);
    }

    // Shape only; telling contracts from EOAs needs eth_getCode.
    if is_contract_shaped(&to) {
        finding.add(RiskFactor::ContractInteraction, 5);
    }

    if reputation.is_suspicious(&from) {
        finding.add(RiskFactor::SuspiciousSender, 15);
    }

    finding
}

/// Check whether a string is a `0x`-prefixed 20-byte hex address.
pub fn is_contract_shaped(address: &str) -> bool {
    address.len() == 42 && address.starts_with("0x") && Address::from_str(address).is_ok()
}
