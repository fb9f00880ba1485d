#![no_std]

pub mod access;
pub mod early_bird;
pub mod events;
pub mod pool;
pub mod schedule;

use common::roles::{self, Role};
use soroban_sdk::{
    contract, contractclient, contractimpl, contracttype, symbol_short, token, Address, Env,
    Symbol,
};

use access::FarmOp;
use early_bird::PRECISION;
use pool::{EarlyBirdConfig, Pool, Position};

// ── Storage key constants ────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const INITIALIZED: Symbol = symbol_short!("INIT");
const DEV_ADDRESS: Symbol = symbol_short!("DEV");
const MIGRATOR: Symbol = symbol_short!("MIGRATOR");
const TOTAL_WEIGHT: Symbol = symbol_short!("TOT_WT");

/// Upper bound on a pool's raw early-bird multiplier. Keeps every fixed-point
/// product comfortably inside i128.
const MAX_EARLY_BIRD_MULTIPLIER: i128 = 1_000_000;

// ── Collaborator interface ───────────────────────────────────────────────────

/// The reward ledger the farm settles against.
///
/// `mint_up_to` returns the amount actually minted, clamped to the ledger's
/// remaining cap — cap exhaustion is a value, never an error. `cap` and
/// `total_supply` let the read-only projection apply the identical clamp.
#[contractclient(name = "RewardLedgerClient")]
pub trait RewardLedger {
    fn mint_up_to(env: Env, caller: Address, to: Address, amount: i128) -> i128;
    fn transfer(env: Env, from: Address, to: Address, amount: i128);
    fn balance(env: Env, id: Address) -> i128;
    fn cap(env: Env) -> i128;
    fn total_supply(env: Env) -> i128;
}

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FarmError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    UnknownPool = 5,
    DuplicateStakedAsset = 6,
    InsufficientStake = 7,
    NotDevAddress = 8,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Immutable emission parameters fixed at initialization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FarmConfig {
    /// The cap-bounded ledger rewards are minted from.
    pub reward_token: Address,
    /// Reward units emitted per height before multipliers.
    pub base_rate: i128,
    pub start_height: u32,
    pub bonus_end_height: u32,
    pub dev_bonus_end_height: u32,
}

/// Derived stage-transition heights, exposed for auditability.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StageHeights {
    pub start_height: u32,
    pub bonus_stage2: u32,
    pub bonus_stage3: u32,
    pub bonus_stage4: u32,
    pub bonus_end_height: u32,
    pub dev_stage2: u32,
    pub dev_stage3: u32,
    pub dev_stage4: u32,
    pub dev_bonus_end_height: u32,
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Multi-pool block-reward farm.
///
/// Rewards accrue lazily: every mutating operation first settles the touched
/// pool up to the current ledger height, minting that range's emission from
/// the reward ledger and folding it into the pool's per-score accumulator.
/// Positions track a `reward_debt` baseline so settlement never iterates
/// holders.
#[contract]
pub struct FarmContract;

#[contractimpl]
impl FarmContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the farm.
    ///
    /// * `admin`  – granted `Executive` and `PoolAdmin`.
    /// * `dev`    – receives the declining dev share of every settlement.
    /// * `base_rate` – reward units per height before the bonus multiplier.
    /// * Emission is zero below `start_height`; the bonus multiplier declines
    ///   across the quarters of `[start_height, bonus_end_height)` and the
    ///   dev fee across the quarters of `[start_height, dev_bonus_end_height)`.
    pub fn initialize(
        env: Env,
        admin: Address,
        reward_token: Address,
        dev: Address,
        base_rate: i128,
        start_height: u32,
        bonus_end_height: u32,
        dev_bonus_end_height: u32,
    ) -> Result<(), FarmError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(FarmError::AlreadyInitialized);
        }
        if base_rate < 0 || bonus_end_height < start_height || dev_bonus_end_height < start_height
        {
            return Err(FarmError::InvalidInput);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(
            &CONFIG,
            &FarmConfig {
                reward_token: reward_token.clone(),
                base_rate,
                start_height,
                bonus_end_height,
                dev_bonus_end_height,
            },
        );
        env.storage().instance().set(&DEV_ADDRESS, &dev);
        // TOTAL_WEIGHT and POOL_CNT start at zero; unwrap_or(0) handles
        // absent keys, so no explicit init needed.

        // The initializer runs the farm until it hands the roles on.
        roles::grant_role(&env, &Role::Executive, &admin);
        roles::grant_role(&env, &Role::PoolAdmin, &admin);

        events::publish_initialized(
            &env,
            admin,
            reward_token,
            dev,
            base_rate,
            start_height,
            bonus_end_height,
            dev_bonus_end_height,
        );

        Ok(())
    }

    // ── Pool administration ─────────────────────────────────────────────────

    /// Register a new pool for `staked_asset`. `PoolAdmin` only.
    ///
    /// Fails with `DuplicateStakedAsset` if the asset already backs a pool.
    /// With `settle_all`, every existing pool is settled first so the weight
    /// change cannot retroactively dilute accrued ranges.
    pub fn add_pool(
        env: Env,
        caller: Address,
        staked_asset: Address,
        weight: i128,
        min_qualifying_amount: i128,
        max_multiplier: i128,
        grace_height: u32,
        halving_period: u32,
        settle_all: bool,
    ) -> Result<u32, FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !access::is_permitted(&env, &caller, &FarmOp::AddPool) {
            return Err(FarmError::Unauthorized);
        }
        if weight < 0
            || min_qualifying_amount < 0
            || max_multiplier < 1
            || max_multiplier > MAX_EARLY_BIRD_MULTIPLIER
            || halving_period < 1
        {
            return Err(FarmError::InvalidInput);
        }
        if pool::asset_registered(&env, &staked_asset) {
            return Err(FarmError::DuplicateStakedAsset);
        }

        if settle_all {
            Self::settle_all_pools(&env)?;
        }

        let config = Self::load_config(&env)?;
        let total_weight = Self::stored_total_weight(&env).saturating_add(weight);
        env.storage().instance().set(&TOTAL_WEIGHT, &total_weight);

        let pool = Pool {
            id: pool::pool_count(&env),
            staked_asset: staked_asset.clone(),
            weight,
            acc_reward_per_score: 0,
            last_settled_height: env.ledger().sequence().max(config.start_height),
            total_score: 0,
            early_bird: EarlyBirdConfig {
                min_qualifying_amount,
                max_multiplier,
                grace_height,
                halving_period,
            },
        };
        pool::append_pool(&env, &pool);

        events::publish_pool_added(&env, pool.id, staked_asset, weight, total_weight);

        Ok(pool.id)
    }

    /// Adjust a pool's emission weight. `PoolAdmin` or `WeightAdmin`.
    pub fn set_pool_weight(
        env: Env,
        caller: Address,
        pool_id: u32,
        weight: i128,
        settle_all: bool,
    ) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !access::is_permitted(&env, &caller, &FarmOp::SetPoolWeight) {
            return Err(FarmError::Unauthorized);
        }
        if weight < 0 {
            return Err(FarmError::InvalidInput);
        }
        // Ensure the pool exists before settling anything.
        let _ = Self::load_pool(&env, pool_id)?;

        if settle_all {
            Self::settle_all_pools(&env)?;
        }

        let mut pool = Self::load_pool(&env, pool_id)?;
        let old_weight = pool.weight;
        let total_weight = Self::stored_total_weight(&env)
            .saturating_sub(old_weight)
            .saturating_add(weight);
        env.storage().instance().set(&TOTAL_WEIGHT, &total_weight);
        pool.weight = weight;
        pool::save_pool(&env, &pool);

        events::publish_pool_weight_set(&env, pool_id, old_weight, weight, total_weight);

        Ok(())
    }

    // ── Settlement ──────────────────────────────────────────────────────────

    /// Settle one pool up to the current height. Callable by anyone.
    pub fn settle(env: Env, pool_id: u32) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        let mut pool = Self::load_pool(&env, pool_id)?;
        let config = Self::load_config(&env)?;
        Self::settle_pool(&env, &config, &mut pool);
        pool::save_pool(&env, &pool);
        Ok(())
    }

    /// Settle every pool, in ascending pool-id order. The order is the fixed
    /// tiebreaker for which pool exhausts the reward cap first.
    pub fn settle_all(env: Env) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        Self::settle_all_pools(&env)
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` of the pool's staked asset for the caller.
    ///
    /// A zero amount is a settlement touch: it pays out pending rewards
    /// without moving stake.
    pub fn deposit(env: Env, staker: Address, pool_id: u32, amount: i128) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::deposit_for(&env, &staker, &staker, pool_id, amount)
    }

    /// Deposit the *caller's* tokens into a position owned by `beneficiary`.
    /// `Custodian` only; used by vault/router integrations.
    pub fn deposit_to(
        env: Env,
        caller: Address,
        pool_id: u32,
        amount: i128,
        beneficiary: Address,
    ) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !access::is_permitted(&env, &caller, &FarmOp::CustodialDeposit) {
            return Err(FarmError::Unauthorized);
        }
        Self::deposit_for(&env, &caller, &beneficiary, pool_id, amount)
    }

    /// Withdraw `amount` staked tokens and any pending reward.
    pub fn withdraw(env: Env, staker: Address, pool_id: u32, amount: i128) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        staker.require_auth();
        Self::withdraw_for(&env, &staker, &staker, pool_id, amount)
    }

    /// Withdraw from `beneficiary`'s position: the staked tokens return to
    /// the *caller*, the pending reward goes to the beneficiary.
    /// `Custodian` only.
    pub fn withdraw_from(
        env: Env,
        caller: Address,
        pool_id: u32,
        amount: i128,
        beneficiary: Address,
    ) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !access::is_permitted(&env, &caller, &FarmOp::CustodialWithdraw) {
            return Err(FarmError::Unauthorized);
        }
        Self::withdraw_for(&env, &caller, &beneficiary, pool_id, amount)
    }

    /// Exit a pool unconditionally, forfeiting any unclaimed reward.
    ///
    /// No settlement and no reward-ledger interaction happens on this path,
    /// so it stays usable even if reward minting misbehaves.
    pub fn emergency_withdraw(env: Env, staker: Address, pool_id: u32) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let mut pool = Self::load_pool(&env, pool_id)?;
        let position = pool::load_position(&env, pool_id, &staker);
        let amount = position.amount;

        pool.total_score = pool.total_score.saturating_sub(position.score);
        pool::save_pool(&env, &pool);
        pool::save_position(&env, pool_id, &staker, &Position::empty());

        if amount > 0 {
            token::Client::new(&env, &pool.staked_asset).transfer(
                &env.current_contract_address(),
                &staker,
                &amount,
            );
        }

        events::publish_emergency_withdrawn(&env, pool_id, staker, amount);

        Ok(())
    }

    /// Port a position in from a predecessor farm, bypassing deposit
    /// accounting. `Executive` or the configured migrator contract.
    ///
    /// Sets the position's amount and score directly; the staked tokens are
    /// expected to already sit in this farm's custody, so no transfer runs.
    pub fn migrate_deposit(
        env: Env,
        caller: Address,
        pool_id: u32,
        amount: i128,
        early_bird: bool,
        multiplier: i128,
        beneficiary: Address,
    ) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        let is_migrator = Self::get_migrator(env.clone()) == Some(caller.clone());
        if !is_migrator && !access::is_permitted(&env, &caller, &FarmOp::MigratePosition) {
            return Err(FarmError::Unauthorized);
        }
        if amount < 0 || (early_bird && multiplier < PRECISION) {
            return Err(FarmError::InvalidInput);
        }

        let config = Self::load_config(&env)?;
        let mut pool = Self::load_pool(&env, pool_id)?;
        Self::settle_pool(&env, &config, &mut pool);

        let mut position = pool::load_position(&env, pool_id, &beneficiary);
        pool.total_score = pool.total_score.saturating_sub(position.score);

        position.amount = amount;
        if early_bird {
            position.score = amount.saturating_mul(multiplier) / PRECISION;
            position.recorded_multiplier = multiplier;
        } else {
            position.score = amount;
            position.recorded_multiplier = PRECISION;
        }
        position.qualified_early = early_bird;
        position.reward_debt = Self::debt_of(position.score, pool.acc_reward_per_score);

        pool.total_score = pool.total_score.saturating_add(position.score);
        pool::save_pool(&env, &pool);
        pool::save_position(&env, pool_id, &beneficiary, &position);

        events::publish_position_migrated(&env, pool_id, beneficiary, amount, position.score);

        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Rewards the holder could claim right now, without mutating state.
    ///
    /// Projects the pool accumulator through the same arithmetic `settle`
    /// uses, including the clamp to the reward ledger's remaining cap, so a
    /// settlement touch immediately afterwards pays exactly this amount.
    pub fn pending_reward(env: Env, pool_id: u32, holder: Address) -> Result<i128, FarmError> {
        Self::require_initialized(&env)?;
        let pool = Self::load_pool(&env, pool_id)?;
        let position = pool::load_position(&env, pool_id, &holder);

        let h = env.ledger().sequence();
        let mut acc = pool.acc_reward_per_score;
        if h > pool.last_settled_height && pool.total_score > 0 {
            let config = Self::load_config(&env)?;
            let request = Self::reward_request(&env, &config, &pool, h);
            if request > 0 {
                let ledger = RewardLedgerClient::new(&env, &config.reward_token);
                let remaining = ledger.cap().saturating_sub(ledger.total_supply()).max(0);
                acc = Self::acc_after_mint(acc, request.min(remaining), pool.total_score);
            }
        }

        Ok(Self::debt_of(position.score, acc) - position.reward_debt)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn pool_length(env: Env) -> u32 {
        pool::pool_count(&env)
    }

    pub fn get_pool(env: Env, pool_id: u32) -> Result<Pool, FarmError> {
        Self::load_pool(&env, pool_id)
    }

    /// The holder's position; an all-zero record if they never deposited.
    pub fn get_position(env: Env, pool_id: u32, holder: Address) -> Position {
        pool::load_position(&env, pool_id, &holder)
    }

    pub fn get_config(env: Env) -> Result<FarmConfig, FarmError> {
        Self::load_config(&env)
    }

    pub fn total_weight(env: Env) -> i128 {
        Self::stored_total_weight(&env)
    }

    /// Stage-transition heights derived from the emission config.
    pub fn get_stage_heights(env: Env) -> Result<StageHeights, FarmError> {
        let config = Self::load_config(&env)?;
        let [b2, b3, b4] =
            schedule::stage_boundaries(config.start_height, config.bonus_end_height);
        let [d2, d3, d4] =
            schedule::stage_boundaries(config.start_height, config.dev_bonus_end_height);
        Ok(StageHeights {
            start_height: config.start_height,
            bonus_stage2: b2,
            bonus_stage3: b3,
            bonus_stage4: b4,
            bonus_end_height: config.bonus_end_height,
            dev_stage2: d2,
            dev_stage3: d3,
            dev_stage4: d4,
            dev_bonus_end_height: config.dev_bonus_end_height,
        })
    }

    /// The early-bird multiplier a qualifying deposit into `pool_id` would
    /// record at `height`, scaled by 1e12.
    pub fn get_early_bird_multiplier(
        env: Env,
        pool_id: u32,
        height: u32,
    ) -> Result<i128, FarmError> {
        let pool = Self::load_pool(&env, pool_id)?;
        Ok(early_bird::multiplier_at(
            pool.early_bird.max_multiplier,
            pool.early_bird.grace_height,
            pool.early_bird.halving_period,
            height,
        ))
    }

    pub fn get_dev_address(env: Env) -> Result<Address, FarmError> {
        Self::stored_dev_address(&env)
    }

    pub fn get_migrator(env: Env) -> Option<Address> {
        env.storage().instance().get(&MIGRATOR)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Administration ──────────────────────────────────────────────────────

    /// Hand the dev share to a new address. Only the incumbent dev may call.
    pub fn set_dev_address(env: Env, caller: Address, new_dev: Address) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let current = Self::stored_dev_address(&env)?;
        if caller != current {
            return Err(FarmError::NotDevAddress);
        }
        env.storage().instance().set(&DEV_ADDRESS, &new_dev);

        events::publish_dev_address_set(&env, current, new_dev);

        Ok(())
    }

    /// Set the migrator contract allowed to port positions. `Executive` only.
    pub fn set_migrator(env: Env, caller: Address, migrator: Address) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !access::is_permitted(&env, &caller, &FarmOp::SetMigrator) {
            return Err(FarmError::Unauthorized);
        }
        env.storage().instance().set(&MIGRATOR, &migrator);

        events::publish_migrator_set(&env, migrator);

        Ok(())
    }

    // ── Role management ─────────────────────────────────────────────────────

    /// Grant `role` to `holder`. `Executive` only; idempotent.
    pub fn grant_role(
        env: Env,
        caller: Address,
        role: Role,
        holder: Address,
    ) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !access::is_permitted(&env, &caller, &FarmOp::ManageRoles) {
            return Err(FarmError::Unauthorized);
        }
        roles::grant_role(&env, &role, &holder);

        events::publish_role_granted(&env, role, holder, caller);

        Ok(())
    }

    /// Revoke `role` from `holder`. `Executive` only; idempotent.
    pub fn revoke_role(
        env: Env,
        caller: Address,
        role: Role,
        holder: Address,
    ) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        if !access::is_permitted(&env, &caller, &FarmOp::ManageRoles) {
            return Err(FarmError::Unauthorized);
        }
        roles::revoke_role(&env, &role, &holder);

        events::publish_role_revoked(&env, role, holder, caller);

        Ok(())
    }

    /// Give up one of the caller's own roles. Idempotent.
    pub fn renounce_role(env: Env, caller: Address, role: Role) -> Result<(), FarmError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        roles::revoke_role(&env, &role, &caller);

        events::publish_role_revoked(&env, role, caller.clone(), caller);

        Ok(())
    }

    pub fn has_role(env: Env, role: Role, holder: Address) -> bool {
        roles::has_role(&env, &role, &holder)
    }

    // ── Internal: settlement ────────────────────────────────────────────────

    /// Settle `pool` up to the current height in place.
    ///
    /// With stakers present, the range's emission is minted from the reward
    /// ledger (clamped to its remaining cap) and folded into the per-score
    /// accumulator; the dev share is minted on top, pool before dev. With no
    /// stakers the range's reward is forfeited and only the settlement height
    /// advances. The caller persists the pool.
    fn settle_pool(env: &Env, config: &FarmConfig, pool: &mut Pool) {
        let h = env.ledger().sequence();
        if h <= pool.last_settled_height {
            return;
        }
        if pool.total_score <= 0 {
            pool.last_settled_height = h;
            return;
        }

        let request = Self::reward_request(env, config, pool, h);
        if request > 0 {
            let ledger = RewardLedgerClient::new(env, &config.reward_token);
            let farm = env.current_contract_address();
            let minted = ledger.mint_up_to(&farm, &farm, &request);
            if minted > 0 {
                pool.acc_reward_per_score =
                    Self::acc_after_mint(pool.acc_reward_per_score, minted, pool.total_score);

                let dev_share = minted
                    / schedule::dev_fee_divisor(
                        config.start_height,
                        config.dev_bonus_end_height,
                        h,
                    );
                if dev_share > 0 {
                    // Best effort against the remaining cap; returns short or
                    // zero once the cap is exhausted.
                    if let Ok(dev) = Self::stored_dev_address(env) {
                        ledger.mint_up_to(&farm, &dev, &dev_share);
                    }
                }
            }
        }

        pool.last_settled_height = h;
    }

    fn settle_all_pools(env: &Env) -> Result<(), FarmError> {
        let config = Self::load_config(env)?;
        for pool_id in 0..pool::pool_count(env) {
            let mut pool = Self::load_pool(env, pool_id)?;
            Self::settle_pool(env, &config, &mut pool);
            pool::save_pool(env, &pool);
        }
        Ok(())
    }

    /// The farmer-side emission owed to `pool` for `(last_settled, h]`,
    /// before the cap clamp. Shared by `settle_pool` and `pending_reward`.
    fn reward_request(env: &Env, config: &FarmConfig, pool: &Pool, h: u32) -> i128 {
        let total_weight = Self::stored_total_weight(env);
        if pool.weight <= 0 || total_weight <= 0 {
            return 0;
        }
        let multiplier = schedule::emission_between(
            config.start_height,
            config.bonus_end_height,
            pool.last_settled_height,
            h,
        );
        multiplier
            .saturating_mul(config.base_rate)
            .saturating_mul(pool.weight)
            / total_weight
    }

    fn acc_after_mint(acc: i128, minted: i128, total_score: i128) -> i128 {
        acc.saturating_add(minted.saturating_mul(PRECISION) / total_score)
    }

    fn debt_of(score: i128, acc: i128) -> i128 {
        score.saturating_mul(acc) / PRECISION
    }

    // ── Internal: deposit / withdraw ────────────────────────────────────────

    /// Shared deposit path. `funder` provides the staked tokens;
    /// `beneficiary` owns the position and receives the pending payout.
    fn deposit_for(
        env: &Env,
        funder: &Address,
        beneficiary: &Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<(), FarmError> {
        if amount < 0 {
            return Err(FarmError::InvalidInput);
        }

        let config = Self::load_config(env)?;
        let mut pool = Self::load_pool(env, pool_id)?;
        Self::settle_pool(env, &config, &mut pool);

        let mut position = pool::load_position(env, pool_id, beneficiary);
        let pending = Self::debt_of(position.score, pool.acc_reward_per_score)
            - position.reward_debt;

        if amount > 0 {
            let h = env.ledger().sequence();
            let eb = &pool.early_bird;
            let new_amount = position.amount.saturating_add(amount);

            let score_delta = if position.qualified_early {
                // Each further increment scores at the multiplier in effect
                // when it arrives; earlier increments keep their scoring.
                let mult =
                    early_bird::multiplier_at(eb.max_multiplier, eb.grace_height, eb.halving_period, h);
                position.recorded_multiplier = mult;
                amount.saturating_mul(mult) / PRECISION
            } else if new_amount >= eb.min_qualifying_amount {
                // Crossing the threshold rescores the whole position at the
                // at-qualification multiplier.
                let mult =
                    early_bird::multiplier_at(eb.max_multiplier, eb.grace_height, eb.halving_period, h);
                position.qualified_early = true;
                position.recorded_multiplier = mult;
                new_amount.saturating_mul(mult) / PRECISION - position.score
            } else {
                amount
            };

            position.amount = new_amount;
            position.score = position.score.saturating_add(score_delta);
            pool.total_score = pool.total_score.saturating_add(score_delta);
        }

        position.reward_debt = Self::debt_of(position.score, pool.acc_reward_per_score);

        // Bookkeeping is final before any token leaves or enters the farm.
        pool::save_pool(env, &pool);
        pool::save_position(env, pool_id, beneficiary, &position);

        if pending > 0 {
            Self::pay_reward(env, &config, pool_id, beneficiary, pending);
        }
        if amount > 0 {
            token::Client::new(env, &pool.staked_asset).transfer(
                funder,
                &env.current_contract_address(),
                &amount,
            );
        }

        events::publish_deposited(env, pool_id, beneficiary.clone(), amount, position.score);

        Ok(())
    }

    /// Shared withdraw path. The staked tokens go to `stake_recipient`; the
    /// pending reward goes to `beneficiary`, whose position shrinks.
    fn withdraw_for(
        env: &Env,
        stake_recipient: &Address,
        beneficiary: &Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<(), FarmError> {
        if amount < 0 {
            return Err(FarmError::InvalidInput);
        }

        let config = Self::load_config(env)?;
        let mut pool = Self::load_pool(env, pool_id)?;
        let mut position = pool::load_position(env, pool_id, beneficiary);
        if amount > position.amount {
            return Err(FarmError::InsufficientStake);
        }

        Self::settle_pool(env, &config, &mut pool);

        let pending = Self::debt_of(position.score, pool.acc_reward_per_score)
            - position.reward_debt;

        if amount > 0 {
            // Proportional reduction, truncated in exactly this order; a full
            // withdrawal therefore zeroes the score with no dust.
            let removed = position.score.saturating_mul(amount) / position.amount;
            position.score -= removed;
            position.amount -= amount;
            pool.total_score = pool.total_score.saturating_sub(removed);
            if position.amount == 0 {
                position.qualified_early = false;
                position.recorded_multiplier = PRECISION;
            }
        }

        position.reward_debt = Self::debt_of(position.score, pool.acc_reward_per_score);

        pool::save_pool(env, &pool);
        pool::save_position(env, pool_id, beneficiary, &position);

        if pending > 0 {
            Self::pay_reward(env, &config, pool_id, beneficiary, pending);
        }
        if amount > 0 {
            token::Client::new(env, &pool.staked_asset).transfer(
                &env.current_contract_address(),
                stake_recipient,
                &amount,
            );
        }

        events::publish_withdrawn(env, pool_id, beneficiary.clone(), amount, position.score);

        Ok(())
    }

    /// Transfer up to `amount` reward tokens from farm custody, clamped to
    /// the held balance so accumulator dust can never block a payout.
    fn pay_reward(env: &Env, config: &FarmConfig, pool_id: u32, to: &Address, amount: i128) {
        let ledger = RewardLedgerClient::new(env, &config.reward_token);
        let farm = env.current_contract_address();
        let payout = amount.min(ledger.balance(&farm));
        if payout > 0 {
            ledger.transfer(&farm, to, &payout);
            events::publish_reward_paid(env, pool_id, to.clone(), payout);
        }
    }

    // ── Internal: guards & loads ────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), FarmError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(FarmError::NotInitialized);
        }
        Ok(())
    }

    fn load_config(env: &Env) -> Result<FarmConfig, FarmError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(FarmError::NotInitialized)
    }

    fn stored_total_weight(env: &Env) -> i128 {
        env.storage().instance().get(&TOTAL_WEIGHT).unwrap_or(0)
    }

    fn stored_dev_address(env: &Env) -> Result<Address, FarmError> {
        env.storage()
            .instance()
            .get(&DEV_ADDRESS)
            .ok_or(FarmError::NotInitialized)
    }

    fn load_pool(env: &Env, pool_id: u32) -> Result<Pool, FarmError> {
        pool::load_pool(env, pool_id).ok_or(FarmError::UnknownPool)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_early_bird;
