//! Price Oracle Adapter
//!
//! Converts between collateral-asset quantities and their USD value using
//! the external price feed registered for each asset. The adapter is a pure
//! read-through: it owns no mutable state, and any price the feed reports is
//! trusted as current. Staleness and deviation protection are explicitly out
//! of the core path; [`ensure_fresh`] ships as an opt-in guard that callers
//! may layer on top.

use synthusd_common::errors::{EngineError, EngineResult};
use synthusd_common::math;
use synthusd_common::types::{AssetId, AssetRegistry, PriceData};

/// External price feed capability.
///
/// `latest_price` returns the most recent observation for a feed, however
/// old. Unknown or unreachable feeds fail with `FeedUnavailable`.
pub trait PriceFeed {
    /// Latest observation for `feed`
    fn latest_price(&self, feed: &synthusd_common::types::FeedId) -> EngineResult<PriceData>;
}

/// Read-through valuation adapter over a registry and a feed
pub struct OracleAdapter<'a, F: PriceFeed> {
    registry: &'a AssetRegistry,
    feed: &'a F,
}

impl<'a, F: PriceFeed> OracleAdapter<'a, F> {
    /// Creates an adapter over the engine's registry and feed capability
    pub fn new(registry: &'a AssetRegistry, feed: &'a F) -> Self {
        Self { registry, feed }
    }

    /// USD value (1e18 scale) of `amount` asset-native units of `asset`.
    ///
    /// Fails if `asset` is unregistered or its feed is unreachable.
    pub fn value_of(&self, asset: &AssetId, amount: u128) -> EngineResult<u128> {
        let data = self.latest_price(asset)?;
        math::usd_value(data.price, amount)
    }

    /// Asset-native amount of `asset` worth `value` USD (1e18 scale).
    ///
    /// Exact numeric inverse of [`Self::value_of`] up to integer-division
    /// truncation.
    pub fn amount_of(&self, asset: &AssetId, value: u128) -> EngineResult<u128> {
        let data = self.latest_price(asset)?;
        math::token_amount(data.price, value)
    }

    fn latest_price(&self, asset: &AssetId) -> EngineResult<PriceData> {
        let feed_id = self.registry.feed_of(asset)?;
        self.feed.latest_price(&feed_id)
    }
}

/// Opt-in staleness guard.
///
/// Rejects observations older than `max_age` seconds at `now`. Nothing in
/// the core operation paths calls this; it exists for deployments that want
/// to wrap the feed capability with an age bound.
pub fn ensure_fresh(data: &PriceData, now: u64, max_age: u64) -> EngineResult<()> {
    if now.saturating_sub(data.updated_at) > max_age {
        return Err(EngineError::StalePrice {
            updated_at: data.updated_at,
            now,
            max_age,
        });
    }
    Ok(())
}
