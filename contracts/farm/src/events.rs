#![allow(deprecated)] // events().publish in use pending the contractevent migration

use common::roles::Role;
use soroban_sdk::{symbol_short, Address, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the farm is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub reward_token: Address,
    pub dev: Address,
    pub base_rate: i128,
    pub start_height: u32,
    pub bonus_end_height: u32,
    pub dev_bonus_end_height: u32,
}

/// Fired when a new pool is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAddedEvent {
    pub pool_id: u32,
    pub staked_asset: Address,
    pub weight: i128,
    pub total_weight: i128,
    pub height: u32,
}

/// Fired when a pool's emission weight changes.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolWeightSetEvent {
    pub pool_id: u32,
    pub old_weight: i128,
    pub new_weight: i128,
    pub total_weight: i128,
    pub height: u32,
}

/// Fired when a holder's position grows (including custodial deposits).
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub pool_id: u32,
    pub holder: Address,
    pub amount: i128,
    /// Position score after the deposit.
    pub score: i128,
    pub height: u32,
}

/// Fired when a holder's position shrinks (including custodial withdrawals).
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub pool_id: u32,
    pub holder: Address,
    pub amount: i128,
    pub score: i128,
    pub height: u32,
}

/// Fired when a holder exits unconditionally, forfeiting pending rewards.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawnEvent {
    pub pool_id: u32,
    pub holder: Address,
    pub amount: i128,
    pub height: u32,
}

/// Fired when accrued rewards are paid out to a holder.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardPaidEvent {
    pub pool_id: u32,
    pub holder: Address,
    pub amount: i128,
    pub height: u32,
}

/// Fired when a position is ported in from a predecessor farm.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionMigratedEvent {
    pub pool_id: u32,
    pub holder: Address,
    pub amount: i128,
    pub score: i128,
    pub height: u32,
}

/// Fired when the dev fee recipient changes.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DevAddressSetEvent {
    pub old_dev: Address,
    pub new_dev: Address,
    pub height: u32,
}

/// Fired when the migrator contract address is set.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MigratorSetEvent {
    pub migrator: Address,
    pub height: u32,
}

/// Fired on role grants.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleGrantedEvent {
    pub role: Role,
    pub holder: Address,
    pub granted_by: Address,
    pub height: u32,
}

/// Fired on role revocations, including self-renunciations.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleRevokedEvent {
    pub role: Role,
    pub holder: Address,
    pub revoked_by: Address,
    pub height: u32,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    reward_token: Address,
    dev: Address,
    base_rate: i128,
    start_height: u32,
    bonus_end_height: u32,
    dev_bonus_end_height: u32,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            reward_token,
            dev,
            base_rate,
            start_height,
            bonus_end_height,
            dev_bonus_end_height,
        },
    );
}

pub fn publish_pool_added(
    env: &Env,
    pool_id: u32,
    staked_asset: Address,
    weight: i128,
    total_weight: i128,
) {
    env.events().publish(
        (symbol_short!("POOL_ADD"), pool_id),
        PoolAddedEvent {
            pool_id,
            staked_asset,
            weight,
            total_weight,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_pool_weight_set(
    env: &Env,
    pool_id: u32,
    old_weight: i128,
    new_weight: i128,
    total_weight: i128,
) {
    env.events().publish(
        (symbol_short!("WT_SET"), pool_id),
        PoolWeightSetEvent {
            pool_id,
            old_weight,
            new_weight,
            total_weight,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_deposited(env: &Env, pool_id: u32, holder: Address, amount: i128, score: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), pool_id, holder.clone()),
        DepositedEvent {
            pool_id,
            holder,
            amount,
            score,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_withdrawn(env: &Env, pool_id: u32, holder: Address, amount: i128, score: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), pool_id, holder.clone()),
        WithdrawnEvent {
            pool_id,
            holder,
            amount,
            score,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_emergency_withdrawn(env: &Env, pool_id: u32, holder: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("EMERG_WD"), pool_id, holder.clone()),
        EmergencyWithdrawnEvent {
            pool_id,
            holder,
            amount,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_reward_paid(env: &Env, pool_id: u32, holder: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RWD_PAID"), pool_id, holder.clone()),
        RewardPaidEvent {
            pool_id,
            holder,
            amount,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_position_migrated(
    env: &Env,
    pool_id: u32,
    holder: Address,
    amount: i128,
    score: i128,
) {
    env.events().publish(
        (symbol_short!("MIGRATED"), pool_id, holder.clone()),
        PositionMigratedEvent {
            pool_id,
            holder,
            amount,
            score,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_dev_address_set(env: &Env, old_dev: Address, new_dev: Address) {
    env.events().publish(
        (symbol_short!("DEV_SET"),),
        DevAddressSetEvent {
            old_dev,
            new_dev,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_migrator_set(env: &Env, migrator: Address) {
    env.events().publish(
        (symbol_short!("MIG_SET"),),
        MigratorSetEvent {
            migrator,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_role_granted(env: &Env, role: Role, holder: Address, granted_by: Address) {
    env.events().publish(
        (symbol_short!("ROLE_GRT"), holder.clone()),
        RoleGrantedEvent {
            role,
            holder,
            granted_by,
            height: env.ledger().sequence(),
        },
    );
}

pub fn publish_role_revoked(env: &Env, role: Role, holder: Address, revoked_by: Address) {
    env.events().publish(
        (symbol_short!("ROLE_RVK"), holder.clone()),
        RoleRevokedEvent {
            role,
            holder,
            revoked_by,
            height: env.ledger().sequence(),
        },
    );
}
