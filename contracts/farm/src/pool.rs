//! Pool and position records plus their storage plumbing.
//!
//! Pools live in an append-only registry indexed by `u32` id; positions are
//! keyed by `(pool id, holder)`. A reverse index from staked-asset address to
//! pool id backs the duplicate-registration check.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage key constants ────────────────────────────────────────────────────

const POOL_COUNT: Symbol = symbol_short!("POOL_CNT");

// Tuple-keyed persistent entries: (prefix, pool id [, holder]).
const POOL: Symbol = symbol_short!("POOL");
const POSITION: Symbol = symbol_short!("POS");
const ASSET: Symbol = symbol_short!("ASSET");

// ── Types ────────────────────────────────────────────────────────────────────

/// Early-bird bonus parameters, fixed per pool at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EarlyBirdConfig {
    /// Cumulative staked amount at which a holder starts scoring with the
    /// bonus multiplier.
    pub min_qualifying_amount: i128,
    /// Raw (unscaled) multiplier granted within the grace window, `>= 1`.
    pub max_multiplier: i128,
    /// Last height at which the full multiplier applies.
    pub grace_height: u32,
    /// Blocks per halving of the decaying bonus, `>= 1`.
    pub halving_period: u32,
}

/// One staking pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub id: u32,
    /// Token contract holding the staked asset; unique across pools.
    pub staked_asset: Address,
    /// Relative share of the global emission.
    pub weight: i128,
    /// Accumulated reward per unit of score, scaled by
    /// [`PRECISION`](crate::early_bird::PRECISION). Never decreases.
    pub acc_reward_per_score: i128,
    pub last_settled_height: u32,
    /// Sum of every position's score in this pool.
    pub total_score: i128,
    pub early_bird: EarlyBirdConfig,
}

/// A holder's stake in one pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    /// Raw staked quantity in ledger units.
    pub amount: i128,
    /// Bonus-weighted staking power; the reward-sharing numerator.
    pub score: i128,
    /// `score × acc_reward_per_score / PRECISION` as of the last settlement
    /// that touched this position.
    pub reward_debt: i128,
    pub qualified_early: bool,
    /// The early-bird multiplier last applied, scaled; kept for audit.
    pub recorded_multiplier: i128,
}

impl Position {
    pub fn empty() -> Self {
        Position {
            amount: 0,
            score: 0,
            reward_debt: 0,
            qualified_early: false,
            recorded_multiplier: crate::early_bird::PRECISION,
        }
    }
}

// ── Registry access ──────────────────────────────────────────────────────────

pub fn pool_count(env: &Env) -> u32 {
    env.storage().instance().get(&POOL_COUNT).unwrap_or(0)
}

pub fn load_pool(env: &Env, pool_id: u32) -> Option<Pool> {
    env.storage().persistent().get(&(POOL, pool_id))
}

pub fn save_pool(env: &Env, pool: &Pool) {
    env.storage().persistent().set(&(POOL, pool.id), pool);
}

/// Appends `pool` to the registry and records its staked asset in the
/// reverse index. The caller assigns `pool.id == pool_count()`.
pub fn append_pool(env: &Env, pool: &Pool) {
    save_pool(env, pool);
    env.storage()
        .persistent()
        .set(&(ASSET, pool.staked_asset.clone()), &pool.id);
    env.storage()
        .instance()
        .set(&POOL_COUNT, &(pool.id.saturating_add(1)));
}

pub fn asset_registered(env: &Env, asset: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&(ASSET, asset.clone()))
}

// ── Position access ──────────────────────────────────────────────────────────

/// Loads the holder's position, or an all-zero record if none exists.
pub fn load_position(env: &Env, pool_id: u32, holder: &Address) -> Position {
    env.storage()
        .persistent()
        .get(&(POSITION, pool_id, holder.clone()))
        .unwrap_or_else(Position::empty)
}

pub fn save_position(env: &Env, pool_id: u32, holder: &Address, position: &Position) {
    env.storage()
        .persistent()
        .set(&(POSITION, pool_id, holder.clone()), position);
}
