//! Rapid-fire sender detection over the recent transaction history.

use chrono::Duration;

use crate::cache::CachedEntry;
use crate::factors::{RiskFactor, RiskFinding};
use crate::types::TransactionRecord;

const RAPID_FIRE_COUNT: usize = 5;
const FREQUENT_COUNT: usize = 2;

/// Score how often the sender has appeared inside the window.
///
/// `history` must not yet contain `tx` itself.
pub fn analyze<'a, I>(tx: &TransactionRecord, history: I, window: Duration) -> RiskFinding
where
    I: IntoIterator<Item = &'a CachedEntry>,
{
    let sender = tx.from.to_lowercase();
    let recent = history
        .into_iter()
        .filter(|entry| entry.sender == sender)
        .filter(|entry| tx.received_at.signed_duration_since(entry.processed_at) < window)
        .count();

    let mut finding = RiskFinding::default();
    if recent > RAPID_FIRE_COUNT {
        finding.add(RiskFactor::RapidFireTransactions, 20);
    } else if recent > FREQUENT_COUNT {
        finding.add(RiskFactor::FrequentTransactions, 10);
    }
    finding
}
