//! End-to-end engine scenarios.
//!
//! Each test drives the public operation surface against the in-memory
//! collaborator doubles and asserts both the ledger outcome and the
//! observable side effects (custody balances, token supply, events).

use crate::testing::{MockAssetBank, MockPriceFeed, MockStablecoin};
use crate::tokens::StablecoinIssuer;
use crate::Engine;

use synthusd_common::constants::precision::SCALE;
use synthusd_common::errors::EngineError;
use synthusd_common::events::{EngineEvent, EventType};
use synthusd_common::types::{derive_id, Address, AssetId, FeedId, ZERO_ADDRESS};

const ETH_PRICE: i128 = 3_000_00000000; // $3,000 with 8 decimals
const NOW: u64 = 1_700_000_000;

fn weth() -> AssetId {
    derive_id("asset", b"WETH")
}

fn eth_feed() -> FeedId {
    derive_id("feed", b"ETH/USD")
}

fn susd() -> Address {
    derive_id("token", b"sUSD")
}

fn custody() -> Address {
    derive_id("contract", b"engine")
}

fn alice() -> Address {
    derive_id("account", b"alice")
}

fn bob() -> Address {
    derive_id("account", b"bob")
}

type TestEngine = Engine<MockPriceFeed, MockAssetBank, MockStablecoin>;

/// One WETH asset priced at $3,000; alice and bob each hold 100 WETH.
fn setup() -> TestEngine {
    let mut feed = MockPriceFeed::new();
    feed.set_price(eth_feed(), ETH_PRICE, NOW);

    let mut bank = MockAssetBank::new(custody());
    bank.set_balance(weth(), alice(), 100 * SCALE);
    bank.set_balance(weth(), bob(), 100 * SCALE);

    let stablecoin = MockStablecoin::new(custody());

    Engine::new(
        &[weth()],
        &[eth_feed()],
        susd(),
        custody(),
        feed,
        bank,
        stablecoin,
    )
    .unwrap()
}

// ============ Construction ============

#[test]
fn test_construction_rejects_mismatched_lists() {
    let err = Engine::new(
        &[weth(), derive_id("asset", b"WBTC")],
        &[eth_feed()],
        susd(),
        custody(),
        MockPriceFeed::new(),
        MockAssetBank::new(custody()),
        MockStablecoin::new(custody()),
    )
    .unwrap_err();

    assert_eq!(err, EngineError::LengthMismatch { assets: 2, feeds: 1 });
}

#[test]
fn test_construction_rejects_duplicate_asset() {
    let err = Engine::new(
        &[weth(), weth()],
        &[eth_feed(), derive_id("feed", b"ETH/USD-2")],
        susd(),
        custody(),
        MockPriceFeed::new(),
        MockAssetBank::new(custody()),
        MockStablecoin::new(custody()),
    )
    .unwrap_err();

    assert_eq!(err, EngineError::DuplicateAsset { asset: weth() });
}

#[test]
fn test_construction_rejects_zero_issuer() {
    let err = Engine::new(
        &[weth()],
        &[eth_feed()],
        ZERO_ADDRESS,
        custody(),
        MockPriceFeed::new(),
        MockAssetBank::new(custody()),
        MockStablecoin::new(custody()),
    )
    .unwrap_err();

    assert!(matches!(err, EngineError::InvalidAddress { .. }));
}

// ============ Deposit / Redeem ============

#[test]
fn test_deposit_then_redeem_round_trip() {
    let mut engine = setup();

    engine.deposit(&alice(), &weth(), 10 * SCALE).unwrap();
    assert_eq!(engine.collateral_of(&alice(), &weth()), 10 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &alice()), 90 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &custody()), 10 * SCALE);

    engine.redeem(&alice(), &alice(), &weth(), 10 * SCALE).unwrap();
    assert_eq!(engine.collateral_of(&alice(), &weth()), 0);
    assert_eq!(engine.assets.balance_of(&weth(), &alice()), 100 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &custody()), 0);

    let events = engine.events().events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        EngineEvent::CollateralDeposited {
            account: alice(),
            asset: weth(),
            amount: 10 * SCALE,
        }
    );
    assert_eq!(
        events[1],
        EngineEvent::CollateralRedeemed {
            from: alice(),
            to: alice(),
            asset: weth(),
            amount: 10 * SCALE,
        }
    );
}

#[test]
fn test_deposit_rejects_zero_amount_and_unknown_asset() {
    let mut engine = setup();

    assert_eq!(
        engine.deposit(&alice(), &weth(), 0),
        Err(EngineError::ZeroAmount)
    );

    let doge = derive_id("asset", b"DOGE");
    assert_eq!(
        engine.deposit(&alice(), &doge, SCALE),
        Err(EngineError::AssetNotAllowed { asset: doge })
    );
}

#[test]
fn test_deposit_rolls_back_on_refused_transfer() {
    let mut engine = setup();
    engine.assets.refuse_transfers(true);

    let err = engine.deposit(&alice(), &weth(), 10 * SCALE).unwrap_err();
    assert!(matches!(err, EngineError::TransferFailed { .. }));

    // The credit and the buffered event were discarded together
    assert_eq!(engine.collateral_of(&alice(), &weth()), 0);
    assert!(engine.events().is_empty());
    assert_eq!(engine.assets.balance_of(&weth(), &alice()), 100 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &custody()), 0);
}

#[test]
fn test_redeem_must_not_leave_account_unhealthy() {
    let mut engine = setup();
    // 10 WETH at $3,000 backs exactly 15,000 sUSD
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 15_000 * SCALE).unwrap();

    let err = engine.redeem(&alice(), &alice(), &weth(), SCALE).unwrap_err();
    assert!(matches!(err, EngineError::HealthFactorBroken { .. }));

    // Rolled back: collateral intact, no redeem event buffered, and the
    // payout never reached the bank
    assert_eq!(engine.collateral_of(&alice(), &weth()), 10 * SCALE);
    assert_eq!(
        engine.events().filter_by_type(EventType::CollateralRedeemed).len(),
        0
    );
    assert_eq!(engine.assets.balance_of(&weth(), &custody()), 10 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &alice()), 90 * SCALE);
}

#[test]
fn test_failed_redeem_pays_out_nothing() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 15_000 * SCALE).unwrap();

    // Even a dust-sized redeem that fails the health check must not move
    // assets; a leak here would let the account keep its full position and
    // repeat the failing call to drain custody.
    for _ in 0..3 {
        let err = engine
            .redeem(&alice(), &alice(), &weth(), SCALE / 1_000)
            .unwrap_err();
        assert!(matches!(err, EngineError::HealthFactorBroken { .. }));
    }

    assert_eq!(engine.assets.balance_of(&weth(), &custody()), 10 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &alice()), 90 * SCALE);
    assert_eq!(engine.collateral_of(&alice(), &weth()), 10 * SCALE);
}

// ============ Mint / Burn ============

#[test]
fn test_mint_at_ceiling_succeeds_above_fails() {
    let mut engine = setup();
    engine.deposit(&alice(), &weth(), 10 * SCALE).unwrap();

    // $30,000 collateral, 50% threshold: the ceiling is exactly 15,000
    engine.mint(&alice(), 15_000 * SCALE).unwrap();
    assert_eq!(engine.debt_of(&alice()), 15_000 * SCALE);
    assert_eq!(engine.stablecoin.balance_of(&alice()), 15_000 * SCALE);

    let err = engine.mint(&alice(), 1).unwrap_err();
    assert!(matches!(err, EngineError::HealthFactorBroken { .. }));
    assert_eq!(engine.debt_of(&alice()), 15_000 * SCALE);
}

#[test]
fn test_mint_rolls_back_when_issuer_refuses() {
    let mut engine = setup();
    engine.deposit(&alice(), &weth(), 10 * SCALE).unwrap();
    engine.stablecoin.refuse_mint(true);

    let err = engine.mint(&alice(), 1_000 * SCALE).unwrap_err();
    assert_eq!(
        err,
        EngineError::MintFailed {
            to: alice(),
            amount: 1_000 * SCALE,
        }
    );
    assert_eq!(engine.debt_of(&alice()), 0);
    assert_eq!(engine.stablecoin.balance_of(&alice()), 0);
    assert_eq!(engine.stablecoin.total_supply(), 0);
}

#[test]
fn test_burn_retires_debt_and_supply() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 10_000 * SCALE).unwrap();
    assert_eq!(engine.stablecoin.total_supply(), 10_000 * SCALE);

    engine.burn(&alice(), 4_000 * SCALE).unwrap();

    assert_eq!(engine.debt_of(&alice()), 6_000 * SCALE);
    assert_eq!(engine.stablecoin.balance_of(&alice()), 6_000 * SCALE);
    assert_eq!(engine.stablecoin.total_supply(), 6_000 * SCALE);
}

#[test]
fn test_burn_more_than_minted_fails() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 1_000 * SCALE).unwrap();

    assert_eq!(
        engine.burn(&alice(), 1_001 * SCALE),
        Err(EngineError::InsufficientBalance {
            available: 1_000 * SCALE,
            requested: 1_001 * SCALE,
        })
    );
}

#[test]
fn test_redeem_and_burn_composition() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 10_000 * SCALE).unwrap();

    engine.redeem_and_burn(&alice(), &weth(), 4 * SCALE, 10_000 * SCALE).unwrap();

    assert_eq!(engine.debt_of(&alice()), 0);
    assert_eq!(engine.collateral_of(&alice(), &weth()), 6 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &alice()), 94 * SCALE);
    assert_eq!(engine.stablecoin.total_supply(), 0);
}

// ============ Health Factor ============

#[test]
fn test_debt_free_account_has_sentinel_health() {
    let mut engine = setup();
    assert_eq!(engine.health_factor(&alice()).unwrap(), u128::MAX);

    engine.deposit(&alice(), &weth(), 10 * SCALE).unwrap();
    assert_eq!(engine.health_factor(&alice()).unwrap(), u128::MAX);
}

#[test]
fn test_account_summary_tracks_price() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 5_000 * SCALE).unwrap();

    let summary = engine.account_summary(&alice()).unwrap();
    assert_eq!(summary.collateral_value, 30_000 * SCALE);
    assert_eq!(summary.debt_minted, 5_000 * SCALE);

    engine.feed.set_price(eth_feed(), 2_000_00000000, NOW + 60);
    let summary = engine.account_summary(&alice()).unwrap();
    assert_eq!(summary.collateral_value, 20_000 * SCALE);
    assert_eq!(summary.debt_minted, 5_000 * SCALE);
}

#[test]
fn test_view_conversions_invert() {
    let engine = setup();

    let value = engine.usd_value_of(&weth(), 10 * SCALE).unwrap();
    assert_eq!(value, 30_000 * SCALE);
    assert_eq!(engine.token_amount_for_value(&weth(), value).unwrap(), 10 * SCALE);
}

// ============ Liquidation ============

/// The canonical price-drop scenario: 10 WETH deposited at $3,000, 15,000
/// sUSD minted, price falls to $2,000. A liquidator covering 5,000 receives
/// 2.5 WETH plus a 10% bonus of 0.25 WETH.
#[test]
fn test_liquidation_price_drop_scenario() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 15_000 * SCALE).unwrap();

    engine.feed.set_price(eth_feed(), 2_000_00000000, NOW + 60);
    assert!(engine.health_factor(&alice()).unwrap() < SCALE);

    // Fund the liquidator with sUSD out of band
    engine.stablecoin.mint(&bob(), 5_000 * SCALE);

    engine.liquidate(&bob(), &alice(), &weth(), 5_000 * SCALE).unwrap();

    // Target: debt down to 10,000 and collateral down by 2.75 WETH
    assert_eq!(engine.debt_of(&alice()), 10_000 * SCALE);
    assert_eq!(engine.collateral_of(&alice(), &weth()), 7_250 * SCALE / 1_000);

    // Liquidator: received 2.75 WETH, spent 5,000 sUSD
    assert_eq!(
        engine.assets.balance_of(&weth(), &bob()),
        102_750 * SCALE / 1_000
    );
    assert_eq!(engine.stablecoin.balance_of(&bob()), 0);

    // The covered debt was destroyed, not redistributed
    assert_eq!(engine.stablecoin.total_supply(), 15_000 * SCALE);

    // Seizure event names the target as source and liquidator as recipient
    let redeems = engine.events().filter_by_type(EventType::CollateralRedeemed);
    assert_eq!(
        *redeems[0],
        EngineEvent::CollateralRedeemed {
            from: alice(),
            to: bob(),
            asset: weth(),
            amount: 2_750 * SCALE / 1_000,
        }
    );
}

#[test]
fn test_liquidating_healthy_target_always_fails() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 5_000 * SCALE).unwrap();
    engine.stablecoin.mint(&bob(), 5_000 * SCALE);

    for cover in [1u128, 1_000 * SCALE, 5_000 * SCALE] {
        let err = engine.liquidate(&bob(), &alice(), &weth(), cover).unwrap_err();
        assert!(matches!(err, EngineError::TargetHealthy { .. }), "cover={cover}");
    }
}

#[test]
fn test_liquidation_rejects_zero_cover() {
    let mut engine = setup();
    assert_eq!(
        engine.liquidate(&bob(), &alice(), &weth(), 0),
        Err(EngineError::ZeroAmount)
    );
}

#[test]
fn test_liquidation_capped_by_available_collateral() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 15_000 * SCALE).unwrap();

    // Crash to $1,000: covering 10,000 would seize 11 WETH, more than the
    // 10 the target holds
    engine.feed.set_price(eth_feed(), 1_000_00000000, NOW + 60);
    engine.stablecoin.mint(&bob(), 10_000 * SCALE);

    let err = engine.liquidate(&bob(), &alice(), &weth(), 10_000 * SCALE).unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientBalance {
            available: 10 * SCALE,
            requested: 11 * SCALE,
        }
    );

    // Nothing committed, in the ledger or at the collaborators
    assert_eq!(engine.debt_of(&alice()), 15_000 * SCALE);
    assert_eq!(engine.collateral_of(&alice(), &weth()), 10 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &custody()), 10 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &bob()), 100 * SCALE);
    assert_eq!(engine.stablecoin.balance_of(&bob()), 10_000 * SCALE);
}

#[test]
fn test_liquidation_must_improve_target_health() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 15_000 * SCALE).unwrap();

    // At $1,500 the collateral is worth less than 110% of the debt, so the
    // 10% bonus makes any partial liquidation a net loss for the target
    engine.feed.set_price(eth_feed(), 1_500_00000000, NOW + 60);
    engine.stablecoin.mint(&bob(), 1_000 * SCALE);

    let err = engine.liquidate(&bob(), &alice(), &weth(), 1_000 * SCALE).unwrap_err();
    assert!(matches!(err, EngineError::HealthFactorNotImproved { .. }));

    // Rolled back end to end: ledger, custody, and the liquidator's funds
    assert_eq!(engine.debt_of(&alice()), 15_000 * SCALE);
    assert_eq!(engine.collateral_of(&alice(), &weth()), 10 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &custody()), 10 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &bob()), 100 * SCALE);
    assert_eq!(engine.stablecoin.balance_of(&bob()), 1_000 * SCALE);
}

#[test]
fn test_liquidator_must_end_healthy() {
    let mut engine = setup();
    engine.deposit_and_mint(&alice(), &weth(), 10 * SCALE, 15_000 * SCALE).unwrap();
    engine.deposit_and_mint(&bob(), &weth(), 10 * SCALE, 15_000 * SCALE).unwrap();

    // Both accounts go under water together
    engine.feed.set_price(eth_feed(), 2_000_00000000, NOW + 60);

    let err = engine.liquidate(&bob(), &alice(), &weth(), 5_000 * SCALE).unwrap_err();
    assert!(matches!(err, EngineError::HealthFactorBroken { .. }));

    // The target's improvement was discarded along with everything else
    assert_eq!(engine.debt_of(&alice()), 15_000 * SCALE);
    assert_eq!(engine.collateral_of(&alice(), &weth()), 10 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &custody()), 20 * SCALE);
    assert_eq!(engine.assets.balance_of(&weth(), &bob()), 90 * SCALE);
    assert_eq!(engine.stablecoin.balance_of(&bob()), 15_000 * SCALE);
}

// ============ Re-entrancy ============

#[test]
fn test_guarded_entry_points_reject_nested_calls() {
    let mut engine = setup();
    engine.entered = true;

    assert_eq!(
        engine.deposit(&alice(), &weth(), SCALE),
        Err(EngineError::ReentrantCall)
    );
    assert_eq!(engine.mint(&alice(), SCALE), Err(EngineError::ReentrantCall));
    assert_eq!(
        engine.liquidate(&bob(), &alice(), &weth(), SCALE),
        Err(EngineError::ReentrantCall)
    );

    // Once the outer call exits, entry is permitted again
    engine.entered = false;
    engine.deposit(&alice(), &weth(), SCALE).unwrap();
}
