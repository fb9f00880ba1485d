//! Operation → role permission table.
//!
//! The table is plain data: each gated operation lists the roles that may
//! perform it, and the guard walks the list. Storage and idempotence of the
//! grants themselves live in `common::roles`.

use common::roles::{self, Role};
use soroban_sdk::{Address, Env};

/// Role-gated farm operations.
pub enum FarmOp {
    AddPool,
    SetPoolWeight,
    CustodialDeposit,
    CustodialWithdraw,
    SetMigrator,
    ManageRoles,
    MigratePosition,
}

/// Roles permitted to perform `op`. Holding any listed role suffices.
pub fn allowed_roles(op: &FarmOp) -> &'static [Role] {
    match op {
        FarmOp::AddPool => &[Role::PoolAdmin],
        FarmOp::SetPoolWeight => &[Role::PoolAdmin, Role::WeightAdmin],
        FarmOp::CustodialDeposit => &[Role::Custodian],
        FarmOp::CustodialWithdraw => &[Role::Custodian],
        FarmOp::SetMigrator => &[Role::Executive],
        FarmOp::ManageRoles => &[Role::Executive],
        // The configured migrator contract is additionally allowed; the
        // contract checks that address separately.
        FarmOp::MigratePosition => &[Role::Executive],
    }
}

/// Returns whether `caller` may perform `op`. The caller must have already
/// been authenticated via `require_auth()`.
pub fn is_permitted(env: &Env, caller: &Address, op: &FarmOp) -> bool {
    roles::has_any_role(env, allowed_roles(op), caller)
}
