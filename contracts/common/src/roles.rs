use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

// ── Storage keys ─────────────────────────────────────────────────────────────

const ROLE_PREFIX: Symbol = symbol_short!("ROLE");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

// ── Role enum ────────────────────────────────────────────────────────────────

/// Operational roles, least to most privileged.
///
/// - `Custodian`   – may deposit and withdraw on behalf of third parties
///                   (vault/router integration).
/// - `WeightAdmin` – may adjust the emission weight of existing pools.
/// - `PoolAdmin`   – may register new pools (and also adjust weights).
/// - `Executive`   – may grant and revoke every other role and wire up the
///                   migrator contract.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Custodian = 1,
    WeightAdmin = 2,
    PoolAdmin = 3,
    Executive = 4,
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn role_key(role: &Role, holder: &Address) -> (Symbol, Role, Address) {
    (ROLE_PREFIX, role.clone(), holder.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Role, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Core functions ───────────────────────────────────────────────────────────

/// Grants `role` to `holder`. Idempotent — re-granting is a no-op.
/// Only callable internally — callers must verify authorization beforehand.
pub fn grant_role(env: &Env, role: &Role, holder: &Address) {
    let key = role_key(role, holder);
    env.storage().persistent().set(&key, &true);
    extend_ttl(env, &key);
}

/// Removes `role` from `holder`. Idempotent — revoking an absent grant is
/// a no-op. Also used for self-renunciation.
pub fn revoke_role(env: &Env, role: &Role, holder: &Address) {
    let key = role_key(role, holder);
    env.storage().persistent().remove(&key);
}

/// Returns whether `holder` currently holds `role`.
pub fn has_role(env: &Env, role: &Role, holder: &Address) -> bool {
    let key = role_key(role, holder);
    let held: bool = env.storage().persistent().get(&key).unwrap_or(false);
    if held {
        extend_ttl(env, &key);
    }
    held
}

/// Guard: returns `true` only when `holder` has at least one of `roles`.
/// The caller must have already been authenticated via `require_auth()`.
pub fn has_any_role(env: &Env, roles: &[Role], holder: &Address) -> bool {
    roles.iter().any(|role| has_role(env, role, holder))
}

// ── Unit tests ───────────────────────────────────────────────────────────────
