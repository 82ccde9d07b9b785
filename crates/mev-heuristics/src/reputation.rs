//! Address reputation lookups.
//!
//! The engine consults an [`AddressReputation`] to decide whether a sender
//! looks suspicious. The bundled [`HashSampleReputation`] is a placeholder
//! with no on-chain grounding; implement the trait for a type backed by a
//! real reputation source to replace it.

use alloy::primitives::keccak256;

/// Capability for judging whether an address is suspicious.
pub trait AddressReputation: Send + Sync {
    /// Must return the same answer for the same address across calls.
    fn is_suspicious(&self, address: &str) -> bool;
}

/// Deterministic placeholder reputation.
///
/// Flags addresses made mostly of zeros, plus a fixed pseudo-random sample of
/// the address space selected by hashing the address.
#[derive(Debug, Clone)]
pub struct HashSampleReputation {
    /// Flag addresses with more `'0'` characters than this.
    pub max_zero_chars: usize,
    /// Percentage of the hash space that is flagged.
    pub sample_percent: u64,
}

impl Default for HashSampleReputation {
    fn default() -> Self {
        Self {
            max_zero_chars: 30,
            sample_percent: 10,
        }
    }
}

impl AddressReputation for HashSampleReputation {
    fn is_suspicious(&self, address: &str) -> bool {
        if address.chars().filter(|c| *c == '0').count() > self.max_zero_chars {
            return true;
        }

        let digest = keccak256(address.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(prefix) % 100 < self.sample_percent
    }
}
