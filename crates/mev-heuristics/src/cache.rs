//! Bounded history of recently analyzed transactions.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// Default number of entries retained.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1000;

/// What the engine remembers about an analyzed transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedEntry {
    pub tx_hash: String,
    /// Lowercased sender address.
    pub sender: String,
    /// Capped risk score.
    pub risk_score: u32,
    pub processed_at: DateTime<Utc>,
}

/// FIFO ring of the most recent analyses, oldest first.
#[derive(Debug)]
pub struct TransactionCache {
    entries: Mutex<VecDeque<CachedEntry>>,
    max_size: usize,
}

impl TransactionCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_size.min(DEFAULT_MAX_CACHE_SIZE))),
            max_size,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Append an entry, dropping the oldest ones beyond the size bound.
    pub fn push(&self, entry: CachedEntry) -> EngineResult<()> {
        self.record_with(|_| ((), entry))
    }

    /// Derive an entry from the current history and append it under one lock.
    ///
    /// `f` sees the entries as they were before the append, so concurrent
    /// callers observe each other's entries in append order.
    pub fn record_with<R>(
        &self,
        f: impl FnOnce(&VecDeque<CachedEntry>) -> (R, CachedEntry),
    ) -> EngineResult<R> {
        let mut entries = self.lock()?;
        let (result, entry) = f(&entries);
        entries.push_back(entry);
        while entries.len() > self.max_size {
            entries.pop_front();
        }
        Ok(result)
    }

    /// Run `f` against the current entries while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&VecDeque<CachedEntry>) -> R) -> EngineResult<R> {
        let entries = self.lock()?;
        Ok(f(&entries))
    }

    /// Copy of the retained entries, oldest first.
    pub fn snapshot(&self) -> EngineResult<Vec<CachedEntry>> {
        self.read(|entries| entries.iter().cloned().collect())
    }

    pub fn len(&self) -> EngineResult<usize> {
        self.read(|entries| entries.len())
    }

    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> EngineResult<std::sync::MutexGuard<'_, VecDeque<CachedEntry>>> {
        self.entries
            .lock()
            .map_err(|_| EngineError::StatePoisoned("transaction cache"))
    }
}

impl Default for TransactionCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> CachedEntry {
        CachedEntry {
            tx_hash: format!("0x{:064x}", n),
            sender: "0xsender".to_string(),
            risk_score: 0,
            processed_at: Utc::now(),
        }
    }

    #[test]
    fn test_bounded_fifo_eviction() {
        let cache = TransactionCache::default();
        for n in 0..1001 {
            cache.push(entry(n)).unwrap();
        }

        let snapshot = cache.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1000);
        assert_eq!(snapshot[0].tx_hash, entry(1).tx_hash);
        assert_eq!(snapshot[999].tx_hash, entry(1000).tx_hash);
    }

    #[test]
    fn test_small_bound() {
        let cache = TransactionCache::new(2);
        for n in 0..5 {
            cache.push(entry(n)).unwrap();
        }
        let hashes: Vec<String> = cache.snapshot().unwrap().into_iter().map(|e| e.tx_hash).collect();
        assert_eq!(hashes, vec![entry(3).tx_hash, entry(4).tx_hash]);
    }

    #[test]
    fn test_record_with_sees_history_before_append() {
        let cache = TransactionCache::new(3);
        for n in 0..3 {
            cache.push(entry(n)).unwrap();
        }

        let seen = cache
            .record_with(|history| (history.iter().map(|e| e.tx_hash.clone()).collect::<Vec<_>>(), entry(3)))
            .unwrap();

        assert_eq!(seen, vec![entry(0).tx_hash, entry(1).tx_hash, entry(2).tx_hash]);
        let hashes: Vec<String> = cache.snapshot().unwrap().into_iter().map(|e| e.tx_hash).collect();
        assert_eq!(hashes, vec![entry(1).tx_hash, entry(2).tx_hash, entry(3).tx_hash]);
    }

    #[test]
    fn test_empty() {
        let cache = TransactionCache::default();
        assert!(cache.is_empty().unwrap());
        assert_eq!(cache.max_size(), DEFAULT_MAX_CACHE_SIZE);
    }
}
