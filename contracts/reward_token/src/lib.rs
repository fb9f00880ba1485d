#![no_std]
#![allow(deprecated)] // events().publish in use pending the contractevent migration

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, Env, String, Symbol,
};

// ── Storage key constants ────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const METADATA: Symbol = symbol_short!("METADATA");
const CAP: Symbol = symbol_short!("CAP");
const SUPPLY: Symbol = symbol_short!("SUPPLY");

// Per-account persistent storage uses tuple keys: (prefix, address)
const BALANCE: Symbol = symbol_short!("BAL");
const MINTER: Symbol = symbol_short!("MINTER");
// Allowances are keyed (prefix, owner, spender).
const ALLOWANCE: Symbol = symbol_short!("ALLOW");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TokenError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    CapExceeded = 5,
    InsufficientBalance = 6,
    InsufficientAllowance = 7,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Immutable token metadata fixed at initialization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// A fungible reward ledger with a hard supply cap.
///
/// Two mint paths exist: [`mint`](RewardTokenContract::mint) reverts when the
/// cap would be exceeded, while [`mint_up_to`](RewardTokenContract::mint_up_to)
/// silently clamps to the remaining capacity and reports the actually minted
/// amount. The clamping path is the one the farm settles against — cap
/// exhaustion there is an expected terminal state, not a failure.
#[contract]
pub struct RewardTokenContract;

#[contractimpl]
impl RewardTokenContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger.
    ///
    /// * `admin`    – may manage the minter set; bootstrapped as a minter.
    /// * `cap`      – hard ceiling on cumulative minted supply, immutable.
    pub fn initialize(
        env: Env,
        admin: Address,
        name: String,
        symbol: String,
        decimals: u32,
        cap: i128,
    ) -> Result<(), TokenError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(TokenError::AlreadyInitialized);
        }
        if cap <= 0 {
            return Err(TokenError::InvalidInput);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(
            &METADATA,
            &TokenMetadata {
                name,
                symbol,
                decimals,
            },
        );
        env.storage().instance().set(&CAP, &cap);
        // SUPPLY starts at zero; unwrap_or(0) handles the absent key.

        // The deploying admin can mint directly, matching the ledger's
        // bootstrap phase before the farm is wired in as a minter.
        env.storage().persistent().set(&(MINTER, admin), &true);

        Ok(())
    }

    // ── Minter management ───────────────────────────────────────────────────

    /// Authorize `minter` to mint. Admin only; idempotent.
    pub fn add_minter(env: Env, caller: Address, minter: Address) -> Result<(), TokenError> {
        Self::require_admin(&env, &caller)?;
        env.storage().persistent().set(&(MINTER, minter), &true);
        Ok(())
    }

    /// Remove `minter` from the minter set. Admin only; idempotent.
    pub fn remove_minter(env: Env, caller: Address, minter: Address) -> Result<(), TokenError> {
        Self::require_admin(&env, &caller)?;
        env.storage().persistent().remove(&(MINTER, minter));
        Ok(())
    }

    pub fn is_minter(env: Env, id: Address) -> bool {
        env.storage().persistent().get(&(MINTER, id)).unwrap_or(false)
    }

    // ── Minting ─────────────────────────────────────────────────────────────

    /// Mint exactly `amount` to `to`, or fail.
    ///
    /// Reverts with `CapExceeded` when the remaining capacity is smaller
    /// than `amount`. Minting zero is always permitted.
    pub fn mint(env: Env, caller: Address, to: Address, amount: i128) -> Result<(), TokenError> {
        Self::require_minter(&env, &caller)?;
        if amount < 0 {
            return Err(TokenError::InvalidInput);
        }

        let supply = Self::total_supply(env.clone());
        let cap: i128 = env.storage().instance().get(&CAP).unwrap_or(0);
        if amount > cap.saturating_sub(supply) {
            return Err(TokenError::CapExceeded);
        }

        Self::credit(&env, &to, amount, supply);

        env.events()
            .publish((symbol_short!("mint"), caller, to), amount);

        Ok(())
    }

    /// Mint as much of `amount` as the cap allows and return the amount
    /// actually minted.
    ///
    /// Never fails on cap exhaustion — once the cap is reached this returns
    /// zero forever, which the farm treats as the emission halting.
    pub fn mint_up_to(
        env: Env,
        caller: Address,
        to: Address,
        amount: i128,
    ) -> Result<i128, TokenError> {
        Self::require_minter(&env, &caller)?;
        if amount < 0 {
            return Err(TokenError::InvalidInput);
        }

        let supply = Self::total_supply(env.clone());
        let cap: i128 = env.storage().instance().get(&CAP).unwrap_or(0);
        let minted = amount.min(cap.saturating_sub(supply).max(0));

        if minted > 0 {
            Self::credit(&env, &to, minted, supply);
            env.events()
                .publish((symbol_short!("mint"), caller, to), minted);
        }

        Ok(minted)
    }

    // ── Transfers ───────────────────────────────────────────────────────────

    /// Move `amount` from `from` to `to`. Fails rather than clamping.
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), TokenError> {
        Self::require_initialized(&env)?;
        from.require_auth();

        Self::move_balance(&env, &from, &to, amount)?;

        env.events()
            .publish((symbol_short!("transfer"), from, to), amount);

        Ok(())
    }

    /// Approve `spender` to move up to `amount` of `owner`'s balance.
    pub fn approve(
        env: Env,
        owner: Address,
        spender: Address,
        amount: i128,
    ) -> Result<(), TokenError> {
        Self::require_initialized(&env)?;
        owner.require_auth();

        if amount < 0 {
            return Err(TokenError::InvalidInput);
        }

        env.storage()
            .persistent()
            .set(&(ALLOWANCE, owner.clone(), spender.clone()), &amount);

        env.events()
            .publish((symbol_short!("approve"), owner, spender), amount);

        Ok(())
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&(ALLOWANCE, owner, spender))
            .unwrap_or(0)
    }

    /// Move `amount` from `owner` to `to`, drawing down `spender`'s allowance.
    pub fn transfer_from(
        env: Env,
        spender: Address,
        owner: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), TokenError> {
        Self::require_initialized(&env)?;
        spender.require_auth();

        if amount < 0 {
            return Err(TokenError::InvalidInput);
        }

        let allowance_key = (ALLOWANCE, owner.clone(), spender);
        let allowed: i128 = env.storage().persistent().get(&allowance_key).unwrap_or(0);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance);
        }

        Self::move_balance(&env, &owner, &to, amount)?;
        env.storage()
            .persistent()
            .set(&allowance_key, &(allowed - amount));

        env.events()
            .publish((symbol_short!("transfer"), owner, to), amount);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn balance(env: Env, id: Address) -> i128 {
        env.storage().persistent().get(&(BALANCE, id)).unwrap_or(0)
    }

    pub fn total_supply(env: Env) -> i128 {
        env.storage().instance().get(&SUPPLY).unwrap_or(0)
    }

    /// The fixed maximum total supply this ledger will ever mint.
    pub fn cap(env: Env) -> i128 {
        env.storage().instance().get(&CAP).unwrap_or(0)
    }

    pub fn name(env: Env) -> Result<String, TokenError> {
        Ok(Self::metadata(&env)?.name)
    }

    pub fn symbol(env: Env) -> Result<String, TokenError> {
        Ok(Self::metadata(&env)?.symbol)
    }

    pub fn decimals(env: Env) -> Result<u32, TokenError> {
        Ok(Self::metadata(&env)?.decimals)
    }

    pub fn get_admin(env: Env) -> Result<Address, TokenError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(TokenError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn metadata(env: &Env) -> Result<TokenMetadata, TokenError> {
        env.storage()
            .instance()
            .get(&METADATA)
            .ok_or(TokenError::NotInitialized)
    }

    fn require_initialized(env: &Env) -> Result<(), TokenError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(TokenError::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), TokenError> {
        Self::require_initialized(env)?;
        caller.require_auth();
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(TokenError::NotInitialized)?;
        if *caller != admin {
            return Err(TokenError::Unauthorized);
        }
        Ok(())
    }

    fn require_minter(env: &Env, caller: &Address) -> Result<(), TokenError> {
        Self::require_initialized(env)?;
        caller.require_auth();
        let minter: bool = env
            .storage()
            .persistent()
            .get(&(MINTER, caller.clone()))
            .unwrap_or(false);
        if !minter {
            return Err(TokenError::Unauthorized);
        }
        Ok(())
    }

    /// Add freshly minted units to `to` and bump the supply counter.
    /// Cap room must have been checked by the caller.
    fn credit(env: &Env, to: &Address, amount: i128, supply: i128) {
        let balance_key = (BALANCE, to.clone());
        let balance: i128 = env.storage().persistent().get(&balance_key).unwrap_or(0);
        env.storage()
            .persistent()
            .set(&balance_key, &balance.saturating_add(amount));
        env.storage()
            .instance()
            .set(&SUPPLY, &supply.saturating_add(amount));
    }

    fn move_balance(
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), TokenError> {
        if amount < 0 {
            return Err(TokenError::InvalidInput);
        }

        let from_key = (BALANCE, from.clone());
        let from_balance: i128 = env.storage().persistent().get(&from_key).unwrap_or(0);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance);
        }

        let to_key = (BALANCE, to.clone());
        let to_balance: i128 = env.storage().persistent().get(&to_key).unwrap_or(0);

        env.storage()
            .persistent()
            .set(&from_key, &(from_balance - amount));
        env.storage()
            .persistent()
            .set(&to_key, &to_balance.saturating_add(amount));

        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
