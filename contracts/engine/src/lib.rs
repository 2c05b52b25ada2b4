//! synthUSD Engine
//!
//! The accounting-and-risk core of the synthUSD over-collateralized
//! synthetic dollar. Users lock volatile collateral assets and mint
//! synthUSD against them; minted supply may never exceed a safety-adjusted
//! fraction of collateral value, and any third party can restore solvency
//! of an under-collateralized account through the liquidation path in
//! exchange for a discount on seized collateral.
//!
//! ## Core Operations
//!
//! - **deposit**: lock collateral into engine custody
//! - **mint**: issue synthUSD against locked collateral
//! - **redeem**: withdraw collateral (account must stay healthy)
//! - **burn**: retire synthUSD debt
//! - **deposit_and_mint** / **redeem_and_burn**: atomic compositions
//! - **liquidate**: third-party repay-and-seize for unhealthy accounts
//!
//! ## Execution Model
//!
//! Every mutating entry point runs as a single atomic transaction in two
//! phases. The plan phase mutates only the ledger and event buffer and runs
//! every invariant check; external collaborator calls are recorded as
//! pending settlements, not performed. The settle phase flushes those
//! settlements only once the plan has fully succeeded, inbound transfers
//! before outbound, so a refused collaborator call aborts before custody
//! pays anything out. Any failure in either phase restores the ledger
//! snapshot and event watermark taken on entry. A per-instance re-entrancy
//! flag rejects nested calls into guarded entry points, because
//! intermediate states (debt credited but not yet checked) are observable
//! mid-call.
//!
//! The pegged token itself, the asset transfer surface, and the price feed
//! are external capabilities ([`StablecoinIssuer`], [`AssetTransfer`],
//! [`PriceFeed`]); the engine consumes them and treats a `false` return as
//! fatal for the enclosing operation.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod ledger;
pub mod oracle;
pub mod testing;
pub mod tokens;

#[cfg(test)]
mod integration_tests;

pub use ledger::Ledger;
pub use oracle::{ensure_fresh, OracleAdapter, PriceFeed};
pub use tokens::{AssetTransfer, StablecoinIssuer};

use synthusd_common::constants::ratios;
use synthusd_common::errors::{EngineError, EngineResult};
use synthusd_common::events::{EngineEvent, EventLog};
use synthusd_common::math;
use synthusd_common::types::{AccountSummary, Address, AssetId, AssetRegistry, FeedId, ZERO_ADDRESS};
use synthusd_common::Vec;

/// One deferred collaborator call, recorded during the plan phase and
/// performed at settlement
#[derive(Debug, Clone, Copy)]
enum Settlement {
    /// Pull collateral from a depositor into engine custody
    CollateralIn {
        asset: AssetId,
        from: Address,
        amount: u128,
    },
    /// Pay collateral out of engine custody
    CollateralOut {
        asset: AssetId,
        to: Address,
        amount: u128,
    },
    /// Issue synthUSD to an account
    Issue { to: Address, amount: u128 },
    /// Pull synthUSD from a payer into custody and destroy it
    Retire { payer: Address, amount: u128 },
}

impl Settlement {
    /// Inbound settlements move value toward custody and settle first
    fn is_inbound(&self) -> bool {
        matches!(self, Self::CollateralIn { .. } | Self::Retire { .. })
    }
}

/// The synthUSD accounting-and-risk engine.
///
/// Generic over its three collaborator capabilities. The asset registry is
/// fixed at construction and immutable for the lifetime of the instance.
#[derive(Debug)]
pub struct Engine<F, A, S> {
    /// Immutable asset-to-feed mapping
    registry: AssetRegistry,
    /// Collateral and debt books
    ledger: Ledger,
    /// External price source
    feed: F,
    /// Collateral transfer surface
    assets: A,
    /// synthUSD issuer (owner-gated mint/burn)
    stablecoin: S,
    /// The issuer's identity, validated non-zero at construction
    stablecoin_id: Address,
    /// The engine's own custody identity
    address: Address,
    /// Buffered events; survive only if the operation commits
    events: EventLog,
    /// Collaborator calls recorded during the plan phase, flushed at
    /// settlement
    pending: Vec<Settlement>,
    /// Re-entrancy flag: set on entry, cleared on exit of guarded ops
    entered: bool,
}

impl<F, A, S> Engine<F, A, S>
where
    F: PriceFeed,
    A: AssetTransfer,
    S: StablecoinIssuer,
{
    /// Builds an engine over parallel asset/feed id lists and the three
    /// collaborator capabilities.
    ///
    /// # Errors
    /// Fails before any state is created on malformed configuration:
    /// mismatched list lengths, zero entries, duplicate asset ids, or a
    /// zero issuer or custody identity.
    pub fn new(
        asset_ids: &[AssetId],
        feed_ids: &[FeedId],
        stablecoin_id: Address,
        address: Address,
        feed: F,
        assets: A,
        stablecoin: S,
    ) -> EngineResult<Self> {
        if stablecoin_id == ZERO_ADDRESS {
            return Err(EngineError::InvalidAddress {
                reason: "stablecoin issuer cannot be zero address",
            });
        }
        if address == ZERO_ADDRESS {
            return Err(EngineError::InvalidAddress {
                reason: "engine custody cannot be zero address",
            });
        }
        let registry = AssetRegistry::new(asset_ids, feed_ids)?;

        Ok(Self {
            registry,
            ledger: Ledger::new(),
            feed,
            assets,
            stablecoin,
            stablecoin_id,
            address,
            events: EventLog::new(),
            pending: Vec::new(),
            entered: false,
        })
    }

    // ============ Position Operations ============

    /// Locks `amount` of `asset` from `caller` into engine custody.
    ///
    /// Depositing cannot reduce solvency, so no health check runs.
    pub fn deposit(&mut self, caller: &Address, asset: &AssetId, amount: u128) -> EngineResult<()> {
        self.transact(|e| e.deposit_collateral(caller, asset, amount))
    }

    /// Issues `amount` of synthUSD to `caller` against their collateral.
    ///
    /// The debt is credited first and the account must still be healthy
    /// afterward; a refused mint aborts the whole operation.
    pub fn mint(&mut self, caller: &Address, amount: u128) -> EngineResult<()> {
        self.transact(|e| e.mint_debt(caller, amount))
    }

    /// Withdraws `amount` of `asset` from `caller`'s collateral to `to`.
    ///
    /// Redeeming must not leave the account unhealthy.
    pub fn redeem(
        &mut self,
        caller: &Address,
        to: &Address,
        asset: &AssetId,
        amount: u128,
    ) -> EngineResult<()> {
        self.transact(|e| {
            e.redeem_collateral(caller, to, asset, amount)?;
            e.assert_healthy(caller)
        })
    }

    /// Retires `amount` of `caller`'s debt, pulling the synthUSD from
    /// `caller` and destroying it.
    pub fn burn(&mut self, caller: &Address, amount: u128) -> EngineResult<()> {
        self.transact(|e| {
            e.burn_debt(caller, caller, amount)?;
            // Burning down debt cannot hurt health; kept symmetric with redeem
            e.assert_healthy(caller)
        })
    }

    /// Deposits collateral and mints synthUSD in one atomic call
    pub fn deposit_and_mint(
        &mut self,
        caller: &Address,
        asset: &AssetId,
        collateral_amount: u128,
        mint_amount: u128,
    ) -> EngineResult<()> {
        self.transact(|e| {
            e.deposit_collateral(caller, asset, collateral_amount)?;
            e.mint_debt(caller, mint_amount)
        })
    }

    /// Burns synthUSD debt and withdraws collateral in one atomic call.
    /// The health check runs once, after both legs.
    pub fn redeem_and_burn(
        &mut self,
        caller: &Address,
        asset: &AssetId,
        collateral_amount: u128,
        burn_amount: u128,
    ) -> EngineResult<()> {
        self.transact(|e| {
            e.burn_debt(caller, caller, burn_amount)?;
            e.redeem_collateral(caller, caller, asset, collateral_amount)?;
            e.assert_healthy(caller)
        })
    }

    // ============ Liquidation Engine ============

    /// Third-party repay-and-seize: `caller` covers `debt_to_cover` of
    /// `target`'s debt and receives the debt-equivalent collateral in
    /// `asset` plus a 10% bonus.
    ///
    /// Rejected if the target is healthy, if the seizure exceeds the
    /// target's collateral, if the target's health does not strictly
    /// improve, or if the caller's own account ends up unhealthy.
    pub fn liquidate(
        &mut self,
        caller: &Address,
        target: &Address,
        asset: &AssetId,
        debt_to_cover: u128,
    ) -> EngineResult<()> {
        self.transact(|e| {
            // 1. Positive amount
            if debt_to_cover == 0 {
                return Err(EngineError::ZeroAmount);
            }

            // 2. Liquidation of solvent accounts is forbidden
            let starting = e.health_factor(target)?;
            if starting >= ratios::MIN_HEALTH_FACTOR {
                return Err(EngineError::TargetHealthy {
                    health_factor: starting,
                });
            }

            // 3. Debt-equivalent collateral at current price, plus bonus
            let base =
                OracleAdapter::new(&e.registry, &e.feed).amount_of(asset, debt_to_cover)?;
            let total_seized = math::seizure_with_bonus(base)?;

            // 4. Seize to the liquidator; the ledger's underflow guard is
            //    the implicit cap on available collateral
            e.redeem_collateral(target, caller, asset, total_seized)?;

            // 5. Retire the covered debt, paid by the liquidator
            e.burn_debt(target, caller, debt_to_cover)?;

            // 6. The whole transaction must strictly improve the target
            let ending = e.health_factor(target)?;
            if ending <= starting {
                return Err(EngineError::HealthFactorNotImproved { starting, ending });
            }

            // 7. The liquidator's own account must remain healthy
            e.assert_healthy(caller)
        })
    }

    // ============ Read-only Views ============

    /// USD value (1e18 scale) of `amount` asset-native units of `asset`
    pub fn usd_value_of(&self, asset: &AssetId, amount: u128) -> EngineResult<u128> {
        OracleAdapter::new(&self.registry, &self.feed).value_of(asset, amount)
    }

    /// Asset-native amount of `asset` worth `value` USD (1e18 scale)
    pub fn token_amount_for_value(&self, asset: &AssetId, value: u128) -> EngineResult<u128> {
        OracleAdapter::new(&self.registry, &self.feed).amount_of(asset, value)
    }

    /// Current valuation of `account`: total collateral value and minted
    /// debt. Always recomputed from the ledger and oracle, never cached.
    pub fn account_summary(&self, account: &Address) -> EngineResult<AccountSummary> {
        let collateral_value =
            self.ledger
                .total_collateral_value(&self.registry, &self.feed, account)?;
        Ok(AccountSummary {
            collateral_value,
            debt_minted: self.ledger.debt_of(account),
        })
    }

    /// `account`'s solvency score at the 1e18 scale; debt-free accounts get
    /// the sentinel maximum
    pub fn health_factor(&self, account: &Address) -> EngineResult<u128> {
        let summary = self.account_summary(account)?;
        math::health_factor(summary.collateral_value, summary.debt_minted)
    }

    /// `account`'s collateral balance for `asset`
    pub fn collateral_of(&self, account: &Address, asset: &AssetId) -> u128 {
        self.ledger.collateral_of(account, asset)
    }

    /// `account`'s outstanding minted debt
    pub fn debt_of(&self, account: &Address) -> u128 {
        self.ledger.debt_of(account)
    }

    /// The fixed asset registry
    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    /// Committed events, in emission order
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The issuer identity this engine was constructed with
    pub fn stablecoin_id(&self) -> Address {
        self.stablecoin_id
    }

    // ============ Internal Primitives ============

    /// Runs `f` as an atomic transaction under the re-entrancy guard.
    ///
    /// `f` is the plan phase: it mutates only the ledger and event buffer,
    /// runs every invariant check, and records collaborator calls as
    /// pending settlements. The settlements are flushed only after the plan
    /// succeeds, so no collateral or synthUSD moves on an operation that
    /// fails its checks. Any error in either phase restores the ledger
    /// snapshot and event watermark taken here.
    fn transact<T>(&mut self, f: impl FnOnce(&mut Self) -> EngineResult<T>) -> EngineResult<T> {
        if self.entered {
            return Err(EngineError::ReentrantCall);
        }
        self.entered = true;

        let checkpoint = self.ledger.clone();
        let watermark = self.events.len();

        let result = f(self).and_then(|value| self.settle().map(|_| value));
        if result.is_err() {
            self.ledger = checkpoint;
            self.events.truncate(watermark);
        }

        self.pending.clear();
        self.entered = false;
        result
    }

    /// Flushes the pending settlements recorded by the plan phase.
    ///
    /// Inbound settlements (pulls toward custody) run first: a refusal
    /// there aborts the operation before anything has left custody.
    fn settle(&mut self) -> EngineResult<()> {
        let pending = core::mem::take(&mut self.pending);

        for settlement in pending.iter().filter(|s| s.is_inbound()) {
            self.apply(*settlement)?;
        }
        for settlement in pending.iter().filter(|s| !s.is_inbound()) {
            self.apply(*settlement)?;
        }
        Ok(())
    }

    /// Performs one collaborator call; a `false` return is fatal
    fn apply(&mut self, settlement: Settlement) -> EngineResult<()> {
        match settlement {
            Settlement::CollateralIn { asset, from, amount } => {
                if !self.assets.transfer_from(&asset, &from, &self.address, amount) {
                    return Err(EngineError::TransferFailed {
                        asset,
                        from,
                        to: self.address,
                        amount,
                    });
                }
            }
            Settlement::CollateralOut { asset, to, amount } => {
                if !self.assets.transfer(&asset, &to, amount) {
                    return Err(EngineError::TransferFailed {
                        asset,
                        from: self.address,
                        to,
                        amount,
                    });
                }
            }
            Settlement::Issue { to, amount } => {
                if !self.stablecoin.mint(&to, amount) {
                    return Err(EngineError::MintFailed { to, amount });
                }
            }
            Settlement::Retire { payer, amount } => {
                if !self.stablecoin.transfer_from(&payer, &self.address, amount) {
                    return Err(EngineError::TransferFailed {
                        asset: self.stablecoin_id,
                        from: payer,
                        to: self.address,
                        amount,
                    });
                }
                self.stablecoin.burn(amount);
            }
        }
        Ok(())
    }

    /// Credit collateral, emit the deposit event, and record the custody
    /// pull for settlement
    fn deposit_collateral(
        &mut self,
        account: &Address,
        asset: &AssetId,
        amount: u128,
    ) -> EngineResult<()> {
        self.ledger
            .credit_collateral(&self.registry, account, asset, amount)?;
        self.events.emit(EngineEvent::CollateralDeposited {
            account: *account,
            asset: *asset,
            amount,
        });
        self.pending.push(Settlement::CollateralIn {
            asset: *asset,
            from: *account,
            amount,
        });
        Ok(())
    }

    /// Credit debt, check solvency, and record the issuance for settlement
    fn mint_debt(&mut self, account: &Address, amount: u128) -> EngineResult<()> {
        self.ledger.credit_debt(account, amount)?;
        self.assert_healthy(account)?;
        self.pending.push(Settlement::Issue {
            to: *account,
            amount,
        });
        Ok(())
    }

    /// Debit collateral from `from`, emit the redeem event, and record the
    /// payout to `to` for settlement. Callers are responsible for their own
    /// post-condition health check.
    fn redeem_collateral(
        &mut self,
        from: &Address,
        to: &Address,
        asset: &AssetId,
        amount: u128,
    ) -> EngineResult<()> {
        self.ledger
            .debit_collateral(&self.registry, from, asset, amount)?;
        self.events.emit(EngineEvent::CollateralRedeemed {
            from: *from,
            to: *to,
            asset: *asset,
            amount,
        });
        self.pending.push(Settlement::CollateralOut {
            asset: *asset,
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Debit `account`'s debt and record the pull-and-destroy of `payer`'s
    /// synthUSD for settlement. Callers are responsible for their own
    /// post-condition health check.
    fn burn_debt(&mut self, account: &Address, payer: &Address, amount: u128) -> EngineResult<()> {
        self.ledger.debit_debt(account, amount)?;
        self.pending.push(Settlement::Retire {
            payer: *payer,
            amount,
        });
        Ok(())
    }

    /// Fails with `HealthFactorBroken` if `account` is below the minimum
    fn assert_healthy(&self, account: &Address) -> EngineResult<()> {
        let health_factor = self.health_factor(account)?;
        if health_factor < ratios::MIN_HEALTH_FACTOR {
            return Err(EngineError::HealthFactorBroken { health_factor });
        }
        Ok(())
    }
}
