extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    Address,
};

use crate::early_bird::PRECISION;
use crate::test::{lp_balance, setup, stake_token, Farm};
use crate::FarmError;

fn at(f: &Farm, height: u32) {
    f.env.ledger().set_sequence_number(height);
}

// ── The multiplier view ───────────────────────────────────────────────────────
// Exhaustive value tables live in the pure `early_bird` tests; these spot
// checks pin the view to the stored pool config.

#[test]
fn test_multiplier_view_reflects_pool_config() {
    let f = setup(50, 300, 10_000, 10_000, i128::MAX / 4);

    let lp = stake_token(&f, &[], 0);
    let lp2 = stake_token(&f, &[], 0);
    f.farm
        .add_pool(&f.admin, &lp, &100i128, &0i128, &33i128, &100_000u32, &10u32, &true);
    f.farm
        .add_pool(&f.admin, &lp2, &100i128, &0i128, &17i128, &200_000u32, &4u32, &true);

    // Full bonus through the grace height.
    assert_eq!(f.farm.get_early_bird_multiplier(&0, &0), 33_000_000_000_000);
    assert_eq!(
        f.farm.get_early_bird_multiplier(&0, &100_000),
        33_000_000_000_000
    );
    assert_eq!(
        f.farm.get_early_bird_multiplier(&1, &200_000),
        17_000_000_000_000
    );

    // One and two halvings out.
    assert_eq!(
        f.farm.get_early_bird_multiplier(&0, &100_010),
        17_000_000_000_000
    );
    assert_eq!(
        f.farm.get_early_bird_multiplier(&0, &100_020),
        9_000_000_000_000
    );
    assert_eq!(
        f.farm.get_early_bird_multiplier(&1, &200_004),
        9_000_000_000_000
    );

    // Interpolated between halvings.
    assert_eq!(
        f.farm.get_early_bird_multiplier(&0, &100_001),
        30_090_909_090_909
    );
    assert_eq!(
        f.farm.get_early_bird_multiplier(&1, &200_003),
        10_142_857_142_857
    );

    // Flatlined far out.
    assert_eq!(f.farm.get_early_bird_multiplier(&0, &200_000), PRECISION);
    assert_eq!(f.farm.get_early_bird_multiplier(&1, &300_000), PRECISION);

    let result = f.farm.try_get_early_bird_multiplier(&9, &0);
    match result {
        Err(Ok(e)) => assert_eq!(e, FarmError::UnknownPool),
        _ => unreachable!("Expected UnknownPool error"),
    }
}

// ── Qualification scoring ─────────────────────────────────────────────────────

#[test]
fn test_qualifying_deposits_score_with_bonus() {
    let f = setup(50, 300, 10_000, 10_000, i128::MAX / 4);

    let alice = Address::generate(&f.env);
    let bob = Address::generate(&f.env);
    let carol = Address::generate(&f.env);
    let lp = stake_token(&f, &[&alice, &bob, &carol], 1_000);
    // 2× for cumulative stakes of 20 or more; grace far in the future.
    f.farm
        .add_pool(&f.admin, &lp, &100i128, &20i128, &2i128, &100_000u32, &1u32, &true);

    // Below the minimum: scores at face value.
    at(&f, 1_510);
    f.farm.deposit(&alice, &0, &10);
    let position = f.farm.get_position(&0, &alice);
    assert_eq!(position.score, 10);
    assert!(!position.qualified_early);
    assert_eq!(position.recorded_multiplier, PRECISION);

    // At or above the minimum: the whole deposit scores twice.
    at(&f, 1_514);
    f.farm.deposit(&bob, &0, &20);
    let position = f.farm.get_position(&0, &bob);
    assert_eq!(position.score, 40);
    assert!(position.qualified_early);
    assert_eq!(position.recorded_multiplier, 2 * PRECISION);

    at(&f, 1_518);
    f.farm.deposit(&carol, &0, &30);
    assert_eq!(f.farm.get_position(&0, &carol).score, 60);

    // Alice's second deposit lifts her cumulative stake to the minimum: the
    // whole position is rescored at the at-qualification multiplier.
    at(&f, 1_520);
    f.farm.deposit(&alice, &0, &10);
    let position = f.farm.get_position(&0, &alice);
    assert_eq!(position.amount, 20);
    assert_eq!(position.score, 40);
    assert!(position.qualified_early);
    assert_eq!(f.farm.get_pool(&0).total_score, 140);

    // Reward accounting up to the rescore, with the bonus-weighted shares:
    // 4 blocks alone + 4 at 1/5 + 2 at 1/11, of 1_000 per block.
    assert_eq!(f.reward.total_supply(), 11_000);
    assert_eq!(f.reward.balance(&alice), 4_981);
    assert_eq!(f.reward.balance(&bob), 0);
    assert_eq!(f.reward.balance(&carol), 0);
    assert_eq!(f.reward.balance(&f.farm_id), 5_019);
    assert_eq!(f.reward.balance(&f.dev), 1_000);

    // Bob pulls 5: score drops proportionally (40 × 5/20), not to face value.
    at(&f, 1_530);
    f.farm.withdraw(&bob, &0, &5);
    assert_eq!(f.reward.balance(&bob), 6_784);
    assert_eq!(f.reward.balance(&f.farm_id), 8_235);
    assert_eq!(f.reward.balance(&f.dev), 2_000);
    let position = f.farm.get_position(&0, &bob);
    assert_eq!(position.amount, 15);
    assert_eq!(position.score, 30);
    assert!(position.qualified_early);
    assert_eq!(f.farm.get_pool(&0).total_score, 130);

    at(&f, 1_540);
    f.farm.withdraw(&alice, &0, &20);
    at(&f, 1_550);
    f.farm.withdraw(&bob, &0, &15);
    at(&f, 1_560);
    f.farm.withdraw(&carol, &0, &30);

    assert_eq!(f.reward.total_supply(), 55_000);
    assert_eq!(f.reward.balance(&f.dev), 5_000);
    assert_eq!(f.reward.balance(&alice), 10_915);
    assert_eq!(f.reward.balance(&bob), 12_425);
    assert_eq!(f.reward.balance(&carol), 26_658);
    assert_eq!(f.reward.balance(&f.farm_id), 2);

    assert_eq!(lp_balance(&f, &lp, &alice), 1_000);
    assert_eq!(lp_balance(&f, &lp, &bob), 1_000);
    assert_eq!(lp_balance(&f, &lp, &carol), 1_000);
}

#[test]
fn test_qualification_window_uses_deposit_height() {
    let f = setup(50, 300, 100_000, 100_000, i128::MAX / 4);

    let alice = Address::generate(&f.env);
    let bob = Address::generate(&f.env);
    let carol = Address::generate(&f.env);
    let lp = stake_token(&f, &[&alice, &bob, &carol], 1_000);
    // 5× for stakes of 20+, but only through height 1_618; per-block halving.
    f.farm
        .add_pool(&f.admin, &lp, &100i128, &20i128, &5i128, &1_618u32, &1u32, &true);

    at(&f, 1_610);
    f.farm.deposit(&alice, &0, &10);

    // Inside the window: full 5×.
    at(&f, 1_614);
    f.farm.deposit(&bob, &0, &20);
    assert_eq!(f.farm.get_position(&0, &bob).score, 100);
    assert_eq!(f.farm.get_position(&0, &bob).recorded_multiplier, 5 * PRECISION);

    // The grace boundary itself still carries the full bonus.
    at(&f, 1_618);
    f.farm.deposit(&carol, &0, &30);
    assert_eq!(f.farm.get_position(&0, &carol).score, 150);

    // Two halvings past the boundary the multiplier has decayed to 2×; Alice
    // qualifies late and her whole 20 rescores at 2×.
    at(&f, 1_620);
    f.farm.deposit(&alice, &0, &10);
    let position = f.farm.get_position(&0, &alice);
    assert_eq!(position.score, 40);
    assert_eq!(position.recorded_multiplier, 2 * PRECISION);
    assert_eq!(f.farm.get_pool(&0).total_score, 290);

    // 4 blocks alone + 4 at 1/11 + 2 at 1/26, of 1_000 per block.
    assert_eq!(f.reward.total_supply(), 11_000);
    assert_eq!(f.reward.balance(&alice), 4_440);
    assert_eq!(f.reward.balance(&f.farm_id), 5_560);
    assert_eq!(f.reward.balance(&f.dev), 1_000);

    at(&f, 1_630);
    f.farm.withdraw(&bob, &0, &5);
    assert_eq!(f.reward.balance(&bob), 7_853);
    assert_eq!(f.reward.balance(&f.farm_id), 7_707);
    let position = f.farm.get_position(&0, &bob);
    assert_eq!(position.amount, 15);
    assert_eq!(position.score, 75);
    // Dropping under the qualifying minimum does not strip earlier scoring.
    assert!(position.qualified_early);

    at(&f, 1_640);
    f.farm.withdraw(&alice, &0, &20);
    at(&f, 1_650);
    f.farm.withdraw(&bob, &0, &15);
    at(&f, 1_660);
    f.farm.withdraw(&carol, &0, &30);

    assert_eq!(f.reward.total_supply(), 55_000);
    assert_eq!(f.reward.balance(&f.dev), 5_000);
    assert_eq!(f.reward.balance(&alice), 7_328);
    assert_eq!(f.reward.balance(&bob), 14_016);
    assert_eq!(f.reward.balance(&carol), 28_653);

    assert_eq!(lp_balance(&f, &lp, &alice), 1_000);
    assert_eq!(lp_balance(&f, &lp, &bob), 1_000);
    assert_eq!(lp_balance(&f, &lp, &carol), 1_000);
}

#[test]
fn test_later_increments_score_at_current_multiplier() {
    let f = setup(50, 300, 10_000, 10_000, i128::MAX / 4);

    let alice = Address::generate(&f.env);
    let lp = stake_token(&f, &[&alice], 1_000);
    // 2× through height 2_000, halving every 10 blocks after.
    f.farm
        .add_pool(&f.admin, &lp, &100i128, &20i128, &2i128, &2_000u32, &10u32, &true);

    at(&f, 1_990);
    f.farm.deposit(&alice, &0, &20);
    assert_eq!(f.farm.get_position(&0, &alice).score, 40);

    // One halving out the multiplier is 1.5×; only the new 10 scores at it.
    at(&f, 2_010);
    f.farm.deposit(&alice, &0, &10);
    let position = f.farm.get_position(&0, &alice);
    assert_eq!(position.amount, 30);
    assert_eq!(position.score, 55);
    assert_eq!(position.recorded_multiplier, 1_500_000_000_000);
    assert!(position.qualified_early);
    assert_eq!(f.farm.get_pool(&0).total_score, 55);
}

#[test]
fn test_full_exit_clears_qualification() {
    let f = setup(50, 300, 10_000, 10_000, i128::MAX / 4);

    let alice = Address::generate(&f.env);
    let lp = stake_token(&f, &[&alice], 1_000);
    f.farm
        .add_pool(&f.admin, &lp, &100i128, &10i128, &3i128, &1_000_000u32, &1u32, &true);

    at(&f, 310);
    f.farm.deposit(&alice, &0, &20);
    assert_eq!(f.farm.get_position(&0, &alice).score, 60);

    // Partial withdrawal: truncated proportional reduction, 60 × 5/20.
    at(&f, 320);
    f.farm.withdraw(&alice, &0, &5);
    let position = f.farm.get_position(&0, &alice);
    assert_eq!(position.amount, 15);
    assert_eq!(position.score, 45);
    assert!(position.qualified_early);

    // Full exit zeroes the score exactly and clears the flag.
    at(&f, 330);
    f.farm.withdraw(&alice, &0, &15);
    let position = f.farm.get_position(&0, &alice);
    assert_eq!(position.amount, 0);
    assert_eq!(position.score, 0);
    assert!(!position.qualified_early);
    assert_eq!(position.recorded_multiplier, PRECISION);

    // A small re-entry scores at face value again.
    at(&f, 340);
    f.farm.deposit(&alice, &0, &5);
    assert_eq!(f.farm.get_position(&0, &alice).score, 5);
}

// ── Migration ─────────────────────────────────────────────────────────────────

#[test]
fn test_migrate_deposit_sets_position_without_transfer() {
    let f = setup(100, 100, 1_000, 1_000, i128::MAX / 4);

    let bob = Address::generate(&f.env);
    let lp = stake_token(&f, &[], 0);
    add_pool_for_migration(&f, &lp);

    // The migrator is expected to have pre-funded the farm's custody.
    StellarAssetClient::new(&f.env, &lp).mint(&f.farm_id, &100);

    f.farm.migrate_deposit(&f.admin, &0, &100, &false, &PRECISION, &bob);

    let pool = f.farm.get_pool(&0);
    let position = f.farm.get_position(&0, &bob);
    assert_eq!(pool.total_score, 100);
    assert_eq!(position.amount, 100);
    assert_eq!(position.score, 100);
    assert!(!position.qualified_early);
    assert_eq!(position.recorded_multiplier, PRECISION);
    // No tokens moved on migration itself.
    assert_eq!(lp_balance(&f, &lp, &f.farm_id), 100);

    f.farm.emergency_withdraw(&bob, &0);
    assert_eq!(lp_balance(&f, &lp, &bob), 100);
    assert_eq!(lp_balance(&f, &lp, &f.farm_id), 0);
}

#[test]
fn test_migrate_deposit_with_early_bird_score() {
    let f = setup(100, 100, 1_000, 1_000, i128::MAX / 4);

    let bob = Address::generate(&f.env);
    let lp = stake_token(&f, &[], 0);
    add_pool_for_migration(&f, &lp);
    StellarAssetClient::new(&f.env, &lp).mint(&f.farm_id, &100);

    f.farm
        .migrate_deposit(&f.admin, &0, &100, &true, &(2 * PRECISION), &bob);

    let pool = f.farm.get_pool(&0);
    let position = f.farm.get_position(&0, &bob);
    assert_eq!(pool.total_score, 200);
    assert_eq!(position.amount, 100);
    assert_eq!(position.score, 200);
    assert!(position.qualified_early);
    assert_eq!(position.recorded_multiplier, 2 * PRECISION);

    f.farm.emergency_withdraw(&bob, &0);
    assert_eq!(lp_balance(&f, &lp, &bob), 100);
    assert_eq!(f.farm.get_pool(&0).total_score, 0);
}

#[test]
fn test_migrate_deposit_requires_executive_or_migrator() {
    let f = setup(100, 100, 1_000, 1_000, i128::MAX / 4);

    let bob = Address::generate(&f.env);
    let porter = Address::generate(&f.env);
    let lp = stake_token(&f, &[], 0);
    add_pool_for_migration(&f, &lp);

    let result = f
        .farm
        .try_migrate_deposit(&porter, &0, &100, &false, &PRECISION, &bob);
    match result {
        Err(Ok(e)) => assert_eq!(e, FarmError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }

    // Once wired in as the migrator, the same caller is allowed.
    f.farm.set_migrator(&f.admin, &porter);
    f.farm.migrate_deposit(&porter, &0, &100, &false, &PRECISION, &bob);
    assert_eq!(f.farm.get_position(&0, &bob).amount, 100);
}

#[test]
fn test_migrate_deposit_rejects_sub_unit_multiplier() {
    let f = setup(100, 100, 1_000, 1_000, i128::MAX / 4);

    let bob = Address::generate(&f.env);
    let lp = stake_token(&f, &[], 0);
    add_pool_for_migration(&f, &lp);

    let result = f
        .farm
        .try_migrate_deposit(&f.admin, &0, &100, &true, &(PRECISION / 2), &bob);
    match result {
        Err(Ok(e)) => assert_eq!(e, FarmError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }
}

fn add_pool_for_migration(f: &Farm, lp: &soroban_sdk::Address) {
    f.farm
        .add_pool(&f.admin, lp, &100i128, &0i128, &1i128, &100_000u32, &1u32, &true);
}
