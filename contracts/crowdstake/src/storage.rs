//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by Crowdstake:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key             | Type             | Description                          |
//! |-----------------|------------------|--------------------------------------|
//! | `Config`        | `PlatformConfig` | Fees, native asset, time limits      |
//! | `Paused`        | `bool`           | Emergency stop flag                  |
//! | `ProjectCount`  | `u64`            | Auto-increment project ID counter    |
//! | `PayoutCount`   | `u64`            | Auto-increment payout ID counter     |
//! | `ListingCount`  | `u64`            | Auto-increment listing ID counter    |
//! | `Lock(class)`   | `bool`           | Reentrancy flag per operation class  |
//! | `SuperAdmin`    | `Address`        | Current super admin                  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                          | Type            | Description                       |
//! |------------------------------|-----------------|-----------------------------------|
//! | `Role(addr)`                 | `Role`          | The single role held by `addr`    |
//! | `ProjConfig(id)`             | `ProjectConfig` | Immutable project configuration   |
//! | `ProjState(id)`              | `ProjectState`  | Mutable project state             |
//! | `Milestone(id, idx)`         | `Milestone`     | One milestone of a project        |
//! | `Approval(id, idx, addr)`    | `bool`          | Approver already counted          |
//! | `Investment(id, addr)`       | `Investment`    | Contribution record               |
//! | `Stake(id, addr)`            | `i128`          | Stake balance                     |
//! | `Supply(id)` / `Escrowed(id)`| `i128`          | Minted / marketplace-held stake   |
//! | `Investors(id)`              | `Vec<Address>`  | Append-only holder roster         |
//! | `Payout(pid)`                | `Payout`        | Dividend round                    |
//! | `ProjectPayouts(id)`         | `Vec<u64>`      | Payout ids of a project           |
//! | `Entitlement(pid, addr)`     | `Entitlement`   | Owed snapshot and claim flag      |
//! | `Listing(lid)`               | `Listing`       | Marketplace listing               |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, panic_with_error, Address, Env, Vec};

use crate::guard::OpClass;
use crate::rbac::Role;
use crate::types::{
    Entitlement, Investment, Listing, Milestone, Payout, PlatformConfig, Project, ProjectConfig,
    ProjectState,
};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Config,
    Paused,
    ProjectCount,
    PayoutCount,
    ListingCount,
    Lock(OpClass),
    SuperAdmin,
    Role(Address),
    ProjConfig(u64),
    ProjState(u64),
    Milestone(u64, u32),
    Approval(u64, u32, Address),
    Investment(u64, Address),
    Stake(u64, Address),
    Supply(u64),
    Escrowed(u64),
    Investors(u64),
    Payout(u64),
    ProjectPayouts(u64),
    Entitlement(u64, Address),
    Listing(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Read and increment the counter stored under `key`.
/// Returns the ID that should be used for the next entity.
fn next_id(env: &Env, key: &DataKey) -> u64 {
    bump_instance(env);
    let current: u64 = env.storage().instance().get(key).unwrap_or(0);
    env.storage().instance().set(key, &(current + 1));
    current
}

pub fn get_and_increment_project_id(env: &Env) -> u64 {
    next_id(env, &DataKey::ProjectCount)
}

pub fn get_and_increment_payout_id(env: &Env) -> u64 {
    next_id(env, &DataKey::PayoutCount)
}

pub fn get_and_increment_listing_id(env: &Env) -> u64 {
    next_id(env, &DataKey::ListingCount)
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn set_config(env: &Env, config: &PlatformConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Panics with `Error::NotInitialized` before `init`.
pub fn get_config(env: &Env) -> PlatformConfig {
    bump_instance(env);
    match env.storage().instance().get(&DataKey::Config) {
        Some(config) => config,
        None => panic_with_error!(env, Error::NotInitialized),
    }
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
    bump_instance(env);
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

pub fn is_locked(env: &Env, class: OpClass) -> bool {
    env.storage().instance().has(&DataKey::Lock(class))
}

pub fn set_lock(env: &Env, class: OpClass) {
    env.storage().instance().set(&DataKey::Lock(class), &true);
}

pub fn clear_lock(env: &Env, class: OpClass) {
    env.storage().instance().remove(&DataKey::Lock(class));
}

pub fn get_super_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::SuperAdmin)
}

pub fn set_super_admin(env: &Env, super_admin: &Address) {
    env.storage().instance().set(&DataKey::SuperAdmin, super_admin);
    bump_instance(env);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn read<V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>>(env: &Env, key: &DataKey) -> Option<V> {
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

fn write<V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>>(env: &Env, key: &DataKey, value: &V) {
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

// ─────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────

pub fn get_role(env: &Env, address: &Address) -> Option<Role> {
    read(env, &DataKey::Role(address.clone()))
}

pub fn set_role(env: &Env, address: &Address, role: &Role) {
    write(env, &DataKey::Role(address.clone()), role);
}

pub fn clear_role(env: &Env, address: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Role(address.clone()));
}

// ─────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────

/// Save both the immutable config and initial mutable state for a new project.
pub fn save_project(env: &Env, config: &ProjectConfig, state: &ProjectState) {
    write(env, &DataKey::ProjConfig(config.id), config);
    write(env, &DataKey::ProjState(config.id), state);
}

/// Load only the immutable project configuration.
pub fn load_project_config(env: &Env, id: u64) -> ProjectConfig {
    match read(env, &DataKey::ProjConfig(id)) {
        Some(config) => config,
        None => panic_with_error!(env, Error::ProjectNotFound),
    }
}

/// Load only the mutable project state.
pub fn load_project_state(env: &Env, id: u64) -> ProjectState {
    match read(env, &DataKey::ProjState(id)) {
        Some(state) => state,
        None => panic_with_error!(env, Error::ProjectNotFound),
    }
}

/// Read config and state together; most entry points need both.
pub fn load_project_pair(env: &Env, id: u64) -> (ProjectConfig, ProjectState) {
    (load_project_config(env, id), load_project_state(env, id))
}

pub fn load_project(env: &Env, id: u64) -> Project {
    let (config, state) = load_project_pair(env, id);
    Project::from_parts(config, state)
}

pub fn save_project_state(env: &Env, id: u64, state: &ProjectState) {
    write(env, &DataKey::ProjState(id), state);
}

// ─────────────────────────────────────────────────────────
// Milestones
// ─────────────────────────────────────────────────────────

pub fn load_milestone(env: &Env, project_id: u64, index: u32) -> Milestone {
    match read(env, &DataKey::Milestone(project_id, index)) {
        Some(milestone) => milestone,
        None => panic_with_error!(env, Error::MilestoneNotFound),
    }
}

pub fn save_milestone(env: &Env, milestone: &Milestone) {
    write(
        env,
        &DataKey::Milestone(milestone.project_id, milestone.index),
        milestone,
    );
}

pub fn has_approved(env: &Env, project_id: u64, index: u32, approver: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Approval(project_id, index, approver.clone()))
}

pub fn record_approval(env: &Env, project_id: u64, index: u32, approver: &Address) {
    write(
        env,
        &DataKey::Approval(project_id, index, approver.clone()),
        &true,
    );
}

// ─────────────────────────────────────────────────────────
// Investments and stake
// ─────────────────────────────────────────────────────────

pub fn get_investment(env: &Env, project_id: u64, investor: &Address) -> Option<Investment> {
    read(env, &DataKey::Investment(project_id, investor.clone()))
}

pub fn set_investment(env: &Env, project_id: u64, investor: &Address, investment: &Investment) {
    write(
        env,
        &DataKey::Investment(project_id, investor.clone()),
        investment,
    );
}

pub fn get_stake(env: &Env, project_id: u64, holder: &Address) -> i128 {
    read(env, &DataKey::Stake(project_id, holder.clone())).unwrap_or(0)
}

pub fn set_stake(env: &Env, project_id: u64, holder: &Address, amount: i128) {
    write(env, &DataKey::Stake(project_id, holder.clone()), &amount);
}

pub fn get_supply(env: &Env, project_id: u64) -> i128 {
    read(env, &DataKey::Supply(project_id)).unwrap_or(0)
}

pub fn set_supply(env: &Env, project_id: u64, supply: i128) {
    write(env, &DataKey::Supply(project_id), &supply);
}

pub fn get_escrowed(env: &Env, project_id: u64) -> i128 {
    read(env, &DataKey::Escrowed(project_id)).unwrap_or(0)
}

pub fn set_escrowed(env: &Env, project_id: u64, amount: i128) {
    write(env, &DataKey::Escrowed(project_id), &amount);
}

pub fn get_investors(env: &Env, project_id: u64) -> Vec<Address> {
    read(env, &DataKey::Investors(project_id)).unwrap_or(Vec::new(env))
}

pub fn set_investors(env: &Env, project_id: u64, investors: &Vec<Address>) {
    write(env, &DataKey::Investors(project_id), investors);
}

// ─────────────────────────────────────────────────────────
// Dividends
// ─────────────────────────────────────────────────────────

pub fn load_payout(env: &Env, payout_id: u64) -> Payout {
    match read(env, &DataKey::Payout(payout_id)) {
        Some(payout) => payout,
        None => panic_with_error!(env, Error::PayoutNotFound),
    }
}

pub fn save_payout(env: &Env, payout: &Payout) {
    write(env, &DataKey::Payout(payout.id), payout);
}

pub fn get_project_payouts(env: &Env, project_id: u64) -> Vec<u64> {
    read(env, &DataKey::ProjectPayouts(project_id)).unwrap_or(Vec::new(env))
}

pub fn set_project_payouts(env: &Env, project_id: u64, payouts: &Vec<u64>) {
    write(env, &DataKey::ProjectPayouts(project_id), payouts);
}

pub fn get_entitlement(env: &Env, payout_id: u64, investor: &Address) -> Option<Entitlement> {
    read(env, &DataKey::Entitlement(payout_id, investor.clone()))
}

pub fn set_entitlement(env: &Env, payout_id: u64, investor: &Address, entitlement: &Entitlement) {
    write(
        env,
        &DataKey::Entitlement(payout_id, investor.clone()),
        entitlement,
    );
}

// ─────────────────────────────────────────────────────────
// Listings
// ─────────────────────────────────────────────────────────

pub fn load_listing(env: &Env, listing_id: u64) -> Listing {
    match read(env, &DataKey::Listing(listing_id)) {
        Some(listing) => listing,
        None => panic_with_error!(env, Error::ListingNotFound),
    }
}

pub fn save_listing(env: &Env, listing: &Listing) {
    write(env, &DataKey::Listing(listing.id), listing);
}
