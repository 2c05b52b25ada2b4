//! In-memory test doubles for the collaborator capabilities.
//!
//! Every double carries a refusal toggle so collaborator-failure atomicity
//! can be exercised: a refused transfer or mint must leave the engine's
//! ledger and event log exactly as they were before the call.

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use synthusd_common::errors::{EngineError, EngineResult};
use synthusd_common::types::{Address, AssetId, FeedId, PriceData};

use crate::oracle::PriceFeed;
use crate::tokens::{AssetTransfer, StablecoinIssuer};

/// Price feed double: per-feed latest observations, settable at any time
#[derive(Debug, Clone, Default)]
pub struct MockPriceFeed {
    prices: BTreeMap<FeedId, PriceData>,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or move) the latest observation for `feed`
    pub fn set_price(&mut self, feed: FeedId, price: i128, updated_at: u64) {
        self.prices.insert(feed, PriceData::new(price, updated_at));
    }

    /// Drop `feed`'s observation, making it unreachable
    pub fn take_down(&mut self, feed: &FeedId) {
        self.prices.remove(feed);
    }
}

impl PriceFeed for MockPriceFeed {
    fn latest_price(&self, feed: &FeedId) -> EngineResult<PriceData> {
        self.prices
            .get(feed)
            .copied()
            .ok_or(EngineError::FeedUnavailable { feed: *feed })
    }
}

/// Collateral-asset bank double: balances keyed by (asset, holder)
#[derive(Debug, Clone, Default)]
pub struct MockAssetBank {
    balances: BTreeMap<(AssetId, Address), u128>,
    /// Custody identity the `transfer` surface spends from
    custody: Address,
    /// When set, every transfer returns false
    refuse_transfers: bool,
}

impl MockAssetBank {
    pub fn new(custody: Address) -> Self {
        Self {
            custody,
            ..Self::default()
        }
    }

    pub fn set_balance(&mut self, asset: AssetId, holder: Address, amount: u128) {
        self.balances.insert((asset, holder), amount);
    }

    pub fn balance_of(&self, asset: &AssetId, holder: &Address) -> u128 {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    pub fn refuse_transfers(&mut self, refuse: bool) {
        self.refuse_transfers = refuse;
    }

    fn do_move(&mut self, asset: &AssetId, from: &Address, to: &Address, amount: u128) -> bool {
        if self.refuse_transfers {
            return false;
        }
        let from_balance = self.balance_of(asset, from);
        if from_balance < amount {
            return false;
        }
        self.balances.insert((*asset, *from), from_balance - amount);
        let to_balance = self.balance_of(asset, to);
        self.balances.insert((*asset, *to), to_balance + amount);
        true
    }
}

impl AssetTransfer for MockAssetBank {
    fn transfer_from(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> bool {
        self.do_move(asset, from, to, amount)
    }

    fn transfer(&mut self, asset: &AssetId, to: &Address, amount: u128) -> bool {
        let custody = self.custody;
        self.do_move(asset, &custody, to, amount)
    }
}

/// Stablecoin issuer double: balances, total supply, and refusal toggles
#[derive(Debug, Clone, Default)]
pub struct MockStablecoin {
    balances: BTreeMap<Address, u128>,
    total_supply: u128,
    /// Custody identity whose balance `burn` retires
    custody: Address,
    refuse_mint: bool,
    refuse_transfers: bool,
}

impl MockStablecoin {
    pub fn new(custody: Address) -> Self {
        Self {
            custody,
            ..Self::default()
        }
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn refuse_mint(&mut self, refuse: bool) {
        self.refuse_mint = refuse;
    }

    pub fn refuse_transfers(&mut self, refuse: bool) {
        self.refuse_transfers = refuse;
    }
}

impl StablecoinIssuer for MockStablecoin {
    fn mint(&mut self, to: &Address, amount: u128) -> bool {
        if self.refuse_mint {
            return false;
        }
        let balance = self.balance_of(to);
        self.balances.insert(*to, balance + amount);
        self.total_supply += amount;
        true
    }

    fn burn(&mut self, amount: u128) {
        let custody = self.custody;
        let balance = self.balance_of(&custody);
        let retired = balance.min(amount);
        self.balances.insert(custody, balance - retired);
        self.total_supply -= retired;
    }

    fn transfer_from(&mut self, from: &Address, to: &Address, amount: u128) -> bool {
        if self.refuse_transfers {
            return false;
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return false;
        }
        self.balances.insert(*from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.insert(*to, to_balance + amount);
        true
    }
}
