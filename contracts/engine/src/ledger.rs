//! Collateral & Debt Ledger
//!
//! Per-account, per-asset collateral balances and per-account minted-debt
//! balances; the single source of truth for solvency computation. The
//! ledger exclusively owns these records — no other component mutates them
//! directly. Credits and debits require positive amounts, collateral
//! operations require a registered asset, and debits fail rather than
//! drive a balance negative.

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use synthusd_common::errors::{EngineError, EngineResult};
use synthusd_common::math::{safe_add, safe_sub};
use synthusd_common::types::{
    Address, AssetId, AssetRegistry, CollateralPosition, DebtPosition,
};

use crate::oracle::{OracleAdapter, PriceFeed};

/// The engine's account book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Ledger {
    /// Collateral positions keyed by (account, asset); zero-initialized on
    /// first deposit, never explicitly destroyed
    collateral: BTreeMap<(Address, AssetId), CollateralPosition>,
    /// Minted-debt positions keyed by account
    debt: BTreeMap<Address, DebtPosition>,
}

impl Ledger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` of `asset` to `account`'s collateral balance
    pub fn credit_collateral(
        &mut self,
        registry: &AssetRegistry,
        account: &Address,
        asset: &AssetId,
        amount: u128,
    ) -> EngineResult<()> {
        Self::require_positive(amount)?;
        Self::require_registered(registry, asset)?;

        let position = self.collateral.entry((*account, *asset)).or_default();
        position.amount = safe_add(position.amount, amount)?;
        Ok(())
    }

    /// Removes `amount` of `asset` from `account`'s collateral balance.
    /// Fails with `InsufficientBalance` rather than underflow.
    pub fn debit_collateral(
        &mut self,
        registry: &AssetRegistry,
        account: &Address,
        asset: &AssetId,
        amount: u128,
    ) -> EngineResult<()> {
        Self::require_positive(amount)?;
        Self::require_registered(registry, asset)?;

        let position = self.collateral.entry((*account, *asset)).or_default();
        if position.amount < amount {
            return Err(EngineError::InsufficientBalance {
                available: position.amount,
                requested: amount,
            });
        }
        position.amount = safe_sub(position.amount, amount)?;
        Ok(())
    }

    /// Adds `amount` to `account`'s minted debt
    pub fn credit_debt(&mut self, account: &Address, amount: u128) -> EngineResult<()> {
        Self::require_positive(amount)?;

        let position = self.debt.entry(*account).or_default();
        position.minted_amount = safe_add(position.minted_amount, amount)?;
        Ok(())
    }

    /// Removes `amount` from `account`'s minted debt.
    /// Fails with `InsufficientBalance` rather than underflow.
    pub fn debit_debt(&mut self, account: &Address, amount: u128) -> EngineResult<()> {
        Self::require_positive(amount)?;

        let position = self.debt.entry(*account).or_default();
        if position.minted_amount < amount {
            return Err(EngineError::InsufficientBalance {
                available: position.minted_amount,
                requested: amount,
            });
        }
        position.minted_amount = safe_sub(position.minted_amount, amount)?;
        Ok(())
    }

    /// `account`'s collateral balance for `asset` (zero if never deposited)
    pub fn collateral_of(&self, account: &Address, asset: &AssetId) -> u128 {
        self.collateral
            .get(&(*account, *asset))
            .map(|p| p.amount)
            .unwrap_or(0)
    }

    /// `account`'s outstanding minted debt
    pub fn debt_of(&self, account: &Address) -> u128 {
        self.debt
            .get(account)
            .map(|p| p.minted_amount)
            .unwrap_or(0)
    }

    /// Total USD value (1e18 scale) of `account`'s collateral.
    ///
    /// Iterates every registered asset — zero balances contribute zero but
    /// are still priced, so cost is proportional to registry size, not to
    /// the account's actual holdings, and a dead feed surfaces regardless
    /// of holdings.
    pub fn total_collateral_value<F: PriceFeed>(
        &self,
        registry: &AssetRegistry,
        feed: &F,
        account: &Address,
    ) -> EngineResult<u128> {
        let adapter = OracleAdapter::new(registry, feed);
        let mut total = 0u128;
        for registration in registry.registrations() {
            let balance = self.collateral_of(account, &registration.asset_id);
            let value = adapter.value_of(&registration.asset_id, balance)?;
            total = safe_add(total, value)?;
        }
        Ok(total)
    }

    fn require_positive(amount: u128) -> EngineResult<()> {
        if amount == 0 {
            return Err(EngineError::ZeroAmount);
        }
        Ok(())
    }

    fn require_registered(registry: &AssetRegistry, asset: &AssetId) -> EngineResult<()> {
        if !registry.is_registered(asset) {
            return Err(EngineError::AssetNotAllowed { asset: *asset });
        }
        Ok(())
    }
}
