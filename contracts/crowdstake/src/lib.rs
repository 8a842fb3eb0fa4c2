//! # Crowdstake Protocol Contract
//!
//! Crowdfunding with fractional investment stakes, milestone-gated escrow,
//! pro-rata dividends and a secondary market for stakes. The single Soroban
//! contract `CrowdstakeProtocol` exposes:
//!
//! | Phase        | Entry Point(s)                                                   |
//! |--------------|------------------------------------------------------------------|
//! | Bootstrap    | [`CrowdstakeProtocol::init`], `update_config`                    |
//! | Role admin   | `grant_role`, `revoke_role`, `transfer_super_admin`              |
//! | Emergency    | `pause`, `unpause`                                               |
//! | Funding      | `create_project`, `invest`, `cancel_project`, `claim_refund`     |
//! | Milestones   | `create_milestone`, `submit_milestone`, `approve_milestone`      |
//! | Disputes     | `raise_dispute`, `review_dispute`, `resolve_dispute`             |
//! | Dividends    | `distribute`, `claim_dividend`, `unclaimed_dividends`            |
//! | Marketplace  | `create_listing`, `purchase`, `cancel_listing`, `transfer_stake` |
//!
//! ## Architecture
//!
//! Authorization lives in [`rbac`], persistence in `storage`, asset movement
//! in `custody`, and each component's rules in its own module (`project`,
//! `milestone`, `dividend`, `marketplace`, `ledger`). This file contains only
//! the public entry points and the pause gate.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, Address, BytesN, Env, Vec,
};

mod custody;
mod dividend;
pub mod events;
mod guard;
mod ledger;
mod marketplace;
mod math;
mod milestone;
mod project;
pub mod rbac;
mod storage;
mod types;

#[cfg(test)]
mod test_dividend;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_marketplace;

pub use rbac::Role;
pub use types::{
    DisputeStatus, Entitlement, Investment, Listing, Milestone, MilestoneStatus, Payout,
    PlatformConfig, Project, ProjectStatus, MAX_BPS,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // Authorization
    NotAuthorized = 1,
    SelfTrade = 2,
    // Lifecycle
    AlreadyInitialized = 3,
    NotInitialized = 4,
    ProtocolPaused = 5,
    ProjectNotFound = 6,
    ProjectNotActive = 7,
    ProjectNotCancelled = 8,
    ProjectExpired = 9,
    MilestoneNotFound = 10,
    InvalidMilestoneState = 11,
    AlreadyApproved = 12,
    DisputeAlreadyOpen = 13,
    NoOpenDispute = 14,
    PayoutNotFound = 15,
    AlreadyClaimed = 16,
    NothingOwed = 17,
    AlreadyRefunded = 18,
    NothingToRefund = 19,
    ListingNotFound = 20,
    ListingInactive = 21,
    ListingExpired = 22,
    // Bounds
    InvalidAmount = 23,
    InvalidPrice = 24,
    InvalidDeadline = 25,
    InvalidDueDate = 26,
    InvalidApprovals = 27,
    InvalidConfig = 28,
    SupplyCapExceeded = 29,
    AllocationExceeded = 30,
    InsufficientFunds = 31,
    InsufficientStake = 32,
    NoSupply = 33,
    LockupActive = 34,
    PurchaseOutOfRange = 35,
    PartialFillDisabled = 36,
    Overflow = 37,
    // External calls
    TransferFailed = 38,
    Reentrant = 39,
    // Arithmetic
    DivisionByZero = 40,
}

#[contract]
pub struct CrowdstakeProtocol;

#[contractimpl]
impl CrowdstakeProtocol {
    // ─────────────────────────────────────────────────────────
    // Initialisation and configuration
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract, set the first SuperAdmin and the platform
    /// configuration.
    ///
    /// Must be called exactly once immediately after deployment.
    /// Subsequent calls panic with `Error::AlreadyInitialized`.
    pub fn init(env: Env, super_admin: Address, config: PlatformConfig) {
        super_admin.require_auth();
        if storage::has_config(&env) {
            panic_with_error!(&env, Error::AlreadyInitialized);
        }
        if !config.is_valid() {
            panic_with_error!(&env, Error::InvalidConfig);
        }
        storage::set_config(&env, &config);
        rbac::init_super_admin(&env, &super_admin);
    }

    /// Replace the platform configuration.
    ///
    /// - `caller` must hold `SuperAdmin` or `Admin`.
    pub fn update_config(env: Env, caller: Address, config: PlatformConfig) {
        Self::require_not_paused(&env);
        caller.require_auth();
        rbac::require_admin_or_above(&env, &caller);
        if !config.is_valid() {
            panic_with_error!(&env, Error::InvalidConfig);
        }
        storage::set_config(&env, &config);
        events::emit_config_updated(&env, caller, config);
    }

    pub fn get_config(env: Env) -> PlatformConfig {
        storage::get_config(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Role management
    // ─────────────────────────────────────────────────────────

    /// Grant `role` to `target`.
    ///
    /// - `caller` must hold `SuperAdmin` or `Admin`.
    /// - Only `SuperAdmin` can grant `SuperAdmin`.
    pub fn grant_role(env: Env, caller: Address, target: Address, role: Role) {
        Self::require_not_paused(&env);
        rbac::grant_role(&env, &caller, &target, role);
    }

    /// Revoke any role from `target`.
    ///
    /// - `caller` must hold `SuperAdmin` or `Admin`.
    /// - Cannot be used to remove the SuperAdmin; use `transfer_super_admin`.
    pub fn revoke_role(env: Env, caller: Address, target: Address) {
        Self::require_not_paused(&env);
        rbac::revoke_role(&env, &caller, &target);
    }

    /// Transfer SuperAdmin to `new_super_admin`. The previous SuperAdmin
    /// loses the role immediately.
    pub fn transfer_super_admin(env: Env, current_super_admin: Address, new_super_admin: Address) {
        Self::require_not_paused(&env);
        rbac::transfer_super_admin(&env, &current_super_admin, &new_super_admin);
    }

    pub fn role_of(env: Env, address: Address) -> Option<Role> {
        rbac::role_of(&env, address)
    }

    pub fn has_role(env: Env, address: Address, role: Role) -> bool {
        rbac::has_role(&env, address, role)
    }

    // ─────────────────────────────────────────────────────────
    // Emergency Control
    // ─────────────────────────────────────────────────────────

    /// Pause the protocol, halting every state-changing entry point except
    /// `unpause`. Queries keep working.
    pub fn pause(env: Env, caller: Address) {
        caller.require_auth();
        rbac::require_admin_or_above(&env, &caller);
        storage::set_paused(&env, true);
        events::emit_protocol_paused(&env, caller);
    }

    pub fn unpause(env: Env, caller: Address) {
        caller.require_auth();
        rbac::require_admin_or_above(&env, &caller);
        storage::set_paused(&env, false);
        events::emit_protocol_unpaused(&env, caller);
    }

    pub fn is_paused(env: Env) -> bool {
        storage::is_paused(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Projects and investments
    // ─────────────────────────────────────────────────────────

    /// Register a new project.
    ///
    /// `creator` must hold the `ProjectManager`, `Admin`, or `SuperAdmin` role.
    /// `payment_token = None` selects the platform's native asset.
    /// `target_amount` must be a whole multiple of `token_price`.
    pub fn create_project(
        env: Env,
        creator: Address,
        payment_token: Option<Address>,
        target_amount: i128,
        token_price: i128,
        deadline: u64,
    ) -> Project {
        Self::require_not_paused(&env);
        project::create(&env, creator, payment_token, target_amount, token_price, deadline)
    }

    pub fn get_project(env: Env, id: u64) -> Project {
        storage::load_project(&env, id)
    }

    /// Invest in an active project. Returns the stake units minted.
    ///
    /// The project completes in this call when the target is reached.
    pub fn invest(env: Env, project_id: u64, investor: Address, amount: i128) -> i128 {
        Self::require_not_paused(&env);
        project::invest(&env, project_id, investor, amount)
    }

    /// Cancel a project that is `Active` or `Disputed`.
    ///
    /// - `caller` must be the creator or hold `Admin`/`SuperAdmin`.
    /// - The project's stake can no longer be bought or transferred.
    pub fn cancel_project(env: Env, caller: Address, project_id: u64) {
        Self::require_not_paused(&env);
        project::cancel(&env, caller, project_id)
    }

    /// Claim the pro-rata refund of a cancelled project. Returns the amount paid.
    pub fn claim_refund(env: Env, project_id: u64, investor: Address) -> i128 {
        Self::require_not_paused(&env);
        project::claim_refund(&env, project_id, investor)
    }

    pub fn get_investment(env: Env, project_id: u64, investor: Address) -> Option<Investment> {
        storage::get_investment(&env, project_id, &investor)
    }

    pub fn balance_of(env: Env, project_id: u64, holder: Address) -> i128 {
        ledger::balance_of(&env, project_id, &holder)
    }

    pub fn total_supply(env: Env, project_id: u64) -> i128 {
        ledger::total_supply(&env, project_id)
    }

    /// Stake currently held in marketplace escrow.
    pub fn escrowed_stake(env: Env, project_id: u64) -> i128 {
        ledger::escrowed(&env, project_id)
    }

    pub fn investors(env: Env, project_id: u64) -> Vec<Address> {
        ledger::investors(&env, project_id)
    }

    // ─────────────────────────────────────────────────────────
    // Milestones
    // ─────────────────────────────────────────────────────────

    /// Allocate part of a project's funds to a new milestone.
    ///
    /// - `caller` must be the creator or hold `Admin`/`SuperAdmin`.
    /// - `due_date` must respect the configured minimum lead time.
    pub fn create_milestone(
        env: Env,
        caller: Address,
        project_id: u64,
        amount: i128,
        due_date: u64,
        required_approvals: u32,
    ) -> Milestone {
        Self::require_not_paused(&env);
        milestone::create(&env, caller, project_id, amount, due_date, required_approvals)
    }

    /// Submit delivery evidence for a pending milestone. Creator only.
    pub fn submit_milestone(
        env: Env,
        creator: Address,
        project_id: u64,
        index: u32,
        evidence: BytesN<32>,
    ) {
        Self::require_not_paused(&env);
        milestone::submit(&env, creator, project_id, index, evidence)
    }

    /// Approve a submitted milestone as a validator or staked investor.
    /// Returns the resulting status (`Released` once enough approvals exist).
    pub fn approve_milestone(
        env: Env,
        approver: Address,
        project_id: u64,
        index: u32,
    ) -> MilestoneStatus {
        Self::require_not_paused(&env);
        milestone::approve(&env, approver, project_id, index)
    }

    pub fn raise_dispute(env: Env, caller: Address, project_id: u64, index: u32) {
        Self::require_not_paused(&env);
        milestone::raise_dispute(&env, caller, project_id, index)
    }

    pub fn review_dispute(env: Env, resolver: Address, project_id: u64, index: u32) {
        Self::require_not_paused(&env);
        milestone::review_dispute(&env, resolver, project_id, index)
    }

    /// Settle a disputed milestone. `release_to_creator = false` refunds the
    /// allocation pro rata to investors.
    pub fn resolve_dispute(
        env: Env,
        resolver: Address,
        project_id: u64,
        index: u32,
        release_to_creator: bool,
    ) -> MilestoneStatus {
        Self::require_not_paused(&env);
        milestone::resolve_dispute(&env, resolver, project_id, index, release_to_creator)
    }

    pub fn get_milestone(env: Env, project_id: u64, index: u32) -> Milestone {
        storage::load_milestone(&env, project_id, index)
    }

    pub fn has_approved(env: Env, project_id: u64, index: u32, approver: Address) -> bool {
        storage::has_approved(&env, project_id, index, &approver)
    }

    // ─────────────────────────────────────────────────────────
    // Dividends
    // ─────────────────────────────────────────────────────────

    /// Deposit `amount` of `token` (None = native asset) as a dividend round
    /// over the project's current holders. Oracle only. Returns the payout id.
    pub fn distribute(
        env: Env,
        oracle: Address,
        project_id: u64,
        amount: i128,
        token: Option<Address>,
    ) -> u64 {
        Self::require_not_paused(&env);
        dividend::distribute(&env, oracle, project_id, amount, token)
    }

    pub fn claim_dividend(env: Env, investor: Address, payout_id: u64) -> i128 {
        Self::require_not_paused(&env);
        dividend::claim(&env, investor, payout_id)
    }

    pub fn unclaimed_dividends(env: Env, project_id: u64, investor: Address) -> Vec<u64> {
        dividend::unclaimed(&env, project_id, &investor)
    }

    pub fn get_payout(env: Env, payout_id: u64) -> Payout {
        storage::load_payout(&env, payout_id)
    }

    pub fn get_entitlement(env: Env, payout_id: u64, investor: Address) -> Option<Entitlement> {
        storage::get_entitlement(&env, payout_id, &investor)
    }

    // ─────────────────────────────────────────────────────────
    // Marketplace
    // ─────────────────────────────────────────────────────────

    /// List `amount` stake units of `project_id` at `price_per_token`.
    /// The stake is escrowed until bought or cancelled. Returns the listing id.
    pub fn create_listing(
        env: Env,
        seller: Address,
        project_id: u64,
        amount: i128,
        price_per_token: i128,
        expiry: u64,
        partial_fill: bool,
    ) -> u64 {
        Self::require_not_paused(&env);
        marketplace::create_listing(
            &env,
            seller,
            project_id,
            amount,
            price_per_token,
            expiry,
            partial_fill,
        )
    }

    pub fn purchase(env: Env, buyer: Address, listing_id: u64, amount: i128) -> Listing {
        Self::require_not_paused(&env);
        marketplace::purchase(&env, buyer, listing_id, amount)
    }

    pub fn cancel_listing(env: Env, seller: Address, listing_id: u64) {
        Self::require_not_paused(&env);
        marketplace::cancel_listing(&env, seller, listing_id)
    }

    pub fn get_listing(env: Env, listing_id: u64) -> Listing {
        storage::load_listing(&env, listing_id)
    }

    pub fn transfer_stake(env: Env, from: Address, to: Address, project_id: u64, amount: i128) {
        Self::require_not_paused(&env);
        marketplace::transfer_stake(&env, from, to, project_id, amount)
    }

    // ─────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────

    fn require_not_paused(env: &Env) {
        if storage::is_paused(env) {
            panic_with_error!(env, Error::ProtocolPaused);
        }
    }
}
