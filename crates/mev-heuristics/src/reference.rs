//! Reference address sets consulted by the address analyzer.

use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard};

use tracing::info;

use crate::error::{EngineError, EngineResult};

/// Addresses seeded as known MEV bots.
pub const DEFAULT_KNOWN_BOTS: [&str; 2] = [
    "0x0000000000000000000000000000000000000000",
    "0x1111111111111111111111111111111111111111",
];

/// Well-known DEX router contracts.
pub const DEFAULT_DEX_ROUTERS: [&str; 4] = [
    "0x7a250d5630b4cf539739df2c5dacb4c659f2488d", // Uniswap V2 Router
    "0xe592427a0aece92de3edee1f18e0157c05861564", // Uniswap V3 Router
    "0xd9e1ce17f2641f24ae83637ab66a2cca9c378b9f", // Sushiswap Router
    "0x1111111254fb6c44bac0bed2854e76f90643097d", // 1inch V4 Router
];

/// Known MEV bots and exchange routers, stored lowercased.
///
/// Updates insert a whole batch under one write lock, so a concurrent
/// analysis sees either the old set or the new one.
#[derive(Debug)]
pub struct ReferenceData {
    known_bots: RwLock<HashSet<String>>,
    dex_routers: RwLock<HashSet<String>>,
}

/// Read access to both sets for the duration of one analysis.
pub struct ReferenceView<'a> {
    pub known_bots: RwLockReadGuard<'a, HashSet<String>>,
    pub dex_routers: RwLockReadGuard<'a, HashSet<String>>,
}

impl ReferenceData {
    pub fn new<B, D>(known_bots: B, dex_routers: D) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            known_bots: RwLock::new(normalize(known_bots)),
            dex_routers: RwLock::new(normalize(dex_routers)),
        }
    }

    /// Take read locks on both sets.
    pub fn view(&self) -> EngineResult<ReferenceView<'_>> {
        Ok(ReferenceView {
            known_bots: self
                .known_bots
                .read()
                .map_err(|_| EngineError::StatePoisoned("known bots"))?,
            dex_routers: self
                .dex_routers
                .read()
                .map_err(|_| EngineError::StatePoisoned("dex routers"))?,
        })
    }

    /// Merge addresses into the known-bot set.
    ///
    /// # Returns
    /// The total number of known bots after the merge
    pub fn update_known_bots<I>(&self, addresses: I) -> EngineResult<usize>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let incoming = normalize(addresses);
        let mut bots = self
            .known_bots
            .write()
            .map_err(|_| EngineError::StatePoisoned("known bots"))?;
        let before = bots.len();
        bots.extend(incoming);

        info!("Known MEV bots updated: {} new, {} total", bots.len() - before, bots.len());
        Ok(bots.len())
    }

    pub fn known_bot_count(&self) -> EngineResult<usize> {
        Ok(self.view()?.known_bots.len())
    }

    pub fn dex_router_count(&self) -> EngineResult<usize> {
        Ok(self.view()?.dex_routers.len())
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self::new(DEFAULT_KNOWN_BOTS, DEFAULT_DEX_ROUTERS)
    }
}

fn normalize<I>(addresses: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    addresses
        .into_iter()
        .map(|a| a.as_ref().trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect()
}
