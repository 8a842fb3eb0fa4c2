//! Role registry.
//!
//! ```text
//! SuperAdmin       grants every role, transfers itself
//!   Admin          grants operational roles, config, pause, any project
//!   ProjectManager creates projects and their milestones
//!   Validator      approves milestones, may raise disputes
//!   Resolver       arbitrates milestone disputes
//!   Oracle         deposits dividend rounds
//! ```
//!
//! Every address holds at most one role; granting replaces the previous one.
//! Investors hold no role. Their capability is a nonzero stake, which the
//! ledger checks.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::events::{self, RoleChanged};
use crate::storage;
use crate::Error;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    SuperAdmin,
    Admin,
    ProjectManager,
    /// Counts towards milestone approvals.
    Validator,
    /// Reviews and settles disputed milestones.
    Resolver,
    /// Funds dividend payouts.
    Oracle,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }

    /// Whether a holder of `self` may hand out `granted`.
    fn may_grant(&self, granted: Role) -> bool {
        match granted {
            Role::SuperAdmin => *self == Role::SuperAdmin,
            _ => self.is_admin(),
        }
    }

    fn may_register_projects(&self) -> bool {
        self.is_admin() || *self == Role::ProjectManager
    }
}

fn role_or_unauthorized(env: &Env, address: &Address) -> Role {
    match storage::get_role(env, address) {
        Some(role) => role,
        None => panic_with_error!(env, Error::NotAuthorized),
    }
}

// ─────────────────────────────────────────────────────────
// Assignment
// ─────────────────────────────────────────────────────────

/// Record the first super admin. A second call fails with `AlreadyInitialized`.
pub fn init_super_admin(env: &Env, super_admin: &Address) {
    if storage::get_super_admin(env).is_some() {
        panic_with_error!(env, Error::AlreadyInitialized);
    }
    storage::set_super_admin(env, super_admin);
    storage::set_role(env, super_admin, &Role::SuperAdmin);
    events::emit_role_granted(
        env,
        RoleChanged {
            target: super_admin.clone(),
            role: Role::SuperAdmin,
            by: None,
        },
    );
}

/// Assign `role` to `target`, replacing any role it held.
/// The super admin can only change hands through `transfer_super_admin`.
pub fn grant_role(env: &Env, caller: &Address, target: &Address, role: Role) {
    caller.require_auth();
    if !role_or_unauthorized(env, caller).may_grant(role) {
        panic_with_error!(env, Error::NotAuthorized);
    }
    if storage::get_super_admin(env).as_ref() == Some(target) && role != Role::SuperAdmin {
        panic_with_error!(env, Error::NotAuthorized);
    }

    storage::set_role(env, target, &role);
    events::emit_role_granted(
        env,
        RoleChanged {
            target: target.clone(),
            role,
            by: Some(caller.clone()),
        },
    );
}

/// Remove whatever role `target` holds. Revoking an address without a role
/// is a no-op.
pub fn revoke_role(env: &Env, caller: &Address, target: &Address) {
    caller.require_auth();
    require_admin_or_above(env, caller);
    if storage::get_super_admin(env).as_ref() == Some(target) {
        panic_with_error!(env, Error::NotAuthorized);
    }

    if let Some(role) = storage::get_role(env, target) {
        storage::clear_role(env, target);
        events::emit_role_revoked(
            env,
            RoleChanged {
                target: target.clone(),
                role,
                by: Some(caller.clone()),
            },
        );
    }
}

pub fn transfer_super_admin(env: &Env, current: &Address, new: &Address) {
    current.require_auth();
    require_role(env, current, Role::SuperAdmin);

    storage::clear_role(env, current);
    storage::set_super_admin(env, new);
    storage::set_role(env, new, &Role::SuperAdmin);

    events::emit_role_revoked(
        env,
        RoleChanged {
            target: current.clone(),
            role: Role::SuperAdmin,
            by: Some(current.clone()),
        },
    );
    events::emit_role_granted(
        env,
        RoleChanged {
            target: new.clone(),
            role: Role::SuperAdmin,
            by: Some(current.clone()),
        },
    );
}

// ─────────────────────────────────────────────────────────
// Guards
// ─────────────────────────────────────────────────────────

pub fn require_role(env: &Env, address: &Address, required: Role) {
    if role_or_unauthorized(env, address) != required {
        panic_with_error!(env, Error::NotAuthorized);
    }
}

pub fn is_admin_or_above(env: &Env, address: &Address) -> bool {
    storage::get_role(env, address).map_or(false, |role| role.is_admin())
}

pub fn require_admin_or_above(env: &Env, address: &Address) {
    if !role_or_unauthorized(env, address).is_admin() {
        panic_with_error!(env, Error::NotAuthorized);
    }
}

pub fn require_can_register(env: &Env, address: &Address) {
    if !role_or_unauthorized(env, address).may_register_projects() {
        panic_with_error!(env, Error::NotAuthorized);
    }
}

#[inline]
pub fn require_resolver(env: &Env, address: &Address) {
    require_role(env, address, Role::Resolver);
}

#[inline]
pub fn require_oracle(env: &Env, address: &Address) {
    require_role(env, address, Role::Oracle);
}

pub fn is_validator(env: &Env, address: &Address) -> bool {
    storage::get_role(env, address) == Some(Role::Validator)
}

// ─────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────

pub fn role_of(env: &Env, address: Address) -> Option<Role> {
    storage::get_role(env, &address)
}

pub fn has_role(env: &Env, address: Address, role: Role) -> bool {
    storage::get_role(env, &address) == Some(role)
}
