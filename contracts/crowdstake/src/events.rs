//! Structured event records.
//!
//! Project-scoped events are published under the topic pair
//! `(symbol, project_id)` so indexers can filter by project.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

use crate::rbac::Role;
use crate::types::{MilestoneStatus, PlatformConfig};

/// Role assignment change. `by` is `None` for the initial super admin.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleChanged {
    pub target: Address,
    pub role: Role,
    pub by: Option<Address>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub creator: Address,
    pub payment_token: Option<Address>,
    pub target_amount: i128,
    pub token_price: i128,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invested {
    pub project_id: u64,
    pub investor: Address,
    pub amount: i128,
    pub stake_minted: i128,
    pub raised_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCompleted {
    pub project_id: u64,
    pub raised_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCancelled {
    pub project_id: u64,
    pub by: Address,
    pub refund_pool: i128,
}

/// Emitted for project-cancellation refunds (`milestone_index = None`) and
/// for dispute refunds of a milestone.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvestorRefunded {
    pub project_id: u64,
    pub milestone_index: Option<u32>,
    pub investor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneCreated {
    pub project_id: u64,
    pub milestone_index: u32,
    pub amount: i128,
    pub due_date: u64,
    pub required_approvals: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneSubmitted {
    pub project_id: u64,
    pub milestone_index: u32,
    pub evidence: BytesN<32>,
    pub from: MilestoneStatus,
    pub to: MilestoneStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneApproved {
    pub project_id: u64,
    pub milestone_index: u32,
    pub approver: Address,
    pub approvals_count: u32,
    pub required_approvals: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneReleased {
    pub project_id: u64,
    pub milestone_index: u32,
    pub creator: Address,
    pub creator_amount: i128,
    pub fee: i128,
    pub from: MilestoneStatus,
    pub to: MilestoneStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeRaised {
    pub project_id: u64,
    pub milestone_index: u32,
    pub raised_by: Address,
    pub from: MilestoneStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeReviewed {
    pub project_id: u64,
    pub milestone_index: u32,
    pub resolver: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisputeResolved {
    pub project_id: u64,
    pub milestone_index: u32,
    pub resolver: Address,
    pub release_to_creator: bool,
    pub to: MilestoneStatus,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DividendDistributed {
    pub project_id: u64,
    pub payout_id: u64,
    pub total_amount: i128,
    pub price_per_token: i128,
    pub payment_token: Address,
    pub holders: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DividendClaimed {
    pub project_id: u64,
    pub payout_id: u64,
    pub investor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingCreated {
    pub project_id: u64,
    pub listing_id: u64,
    pub seller: Address,
    pub amount: i128,
    pub price_per_token: i128,
    pub expiry: u64,
    pub partial_fill: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingPurchased {
    pub project_id: u64,
    pub listing_id: u64,
    pub buyer: Address,
    pub seller: Address,
    pub amount: i128,
    pub total_price: i128,
    pub fee: i128,
    pub remaining: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingCancelled {
    pub project_id: u64,
    pub listing_id: u64,
    pub seller: Address,
    pub returned: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeTransferred {
    pub project_id: u64,
    pub from: Address,
    pub to: Address,
    pub amount: i128,
}

pub fn emit_project_created(env: &Env, data: ProjectCreated) {
    env.events()
        .publish((symbol_short!("created"), data.project_id), data);
}

pub fn emit_invested(env: &Env, data: Invested) {
    env.events()
        .publish((symbol_short!("invested"), data.project_id), data);
}

pub fn emit_project_completed(env: &Env, project_id: u64, raised_amount: i128) {
    env.events().publish(
        (symbol_short!("completed"), project_id),
        ProjectCompleted {
            project_id,
            raised_amount,
        },
    );
}

pub fn emit_project_cancelled(env: &Env, project_id: u64, by: Address, refund_pool: i128) {
    env.events().publish(
        (symbol_short!("cancelled"), project_id),
        ProjectCancelled {
            project_id,
            by,
            refund_pool,
        },
    );
}

pub fn emit_investor_refunded(
    env: &Env,
    project_id: u64,
    milestone_index: Option<u32>,
    investor: Address,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("refunded"), project_id),
        InvestorRefunded {
            project_id,
            milestone_index,
            investor,
            amount,
        },
    );
}

pub fn emit_milestone_created(env: &Env, data: MilestoneCreated) {
    env.events()
        .publish((symbol_short!("ms_new"), data.project_id), data);
}

pub fn emit_milestone_submitted(env: &Env, data: MilestoneSubmitted) {
    env.events()
        .publish((symbol_short!("ms_submit"), data.project_id), data);
}

pub fn emit_milestone_approved(env: &Env, data: MilestoneApproved) {
    env.events()
        .publish((symbol_short!("ms_apprv"), data.project_id), data);
}

pub fn emit_milestone_released(env: &Env, data: MilestoneReleased) {
    env.events()
        .publish((symbol_short!("ms_releas"), data.project_id), data);
}

pub fn emit_dispute_raised(env: &Env, data: DisputeRaised) {
    env.events()
        .publish((symbol_short!("disp_new"), data.project_id), data);
}

pub fn emit_dispute_reviewed(env: &Env, data: DisputeReviewed) {
    env.events()
        .publish((symbol_short!("disp_rev"), data.project_id), data);
}

pub fn emit_dispute_resolved(env: &Env, data: DisputeResolved) {
    env.events()
        .publish((symbol_short!("disp_done"), data.project_id), data);
}

pub fn emit_dividend_distributed(env: &Env, data: DividendDistributed) {
    env.events()
        .publish((symbol_short!("dividend"), data.project_id), data);
}

pub fn emit_dividend_claimed(env: &Env, data: DividendClaimed) {
    env.events()
        .publish((symbol_short!("div_claim"), data.project_id), data);
}

pub fn emit_listing_created(env: &Env, data: ListingCreated) {
    env.events()
        .publish((symbol_short!("list_new"), data.project_id), data);
}

pub fn emit_listing_purchased(env: &Env, data: ListingPurchased) {
    env.events()
        .publish((symbol_short!("list_buy"), data.project_id), data);
}

pub fn emit_listing_cancelled(env: &Env, data: ListingCancelled) {
    env.events()
        .publish((symbol_short!("list_end"), data.project_id), data);
}

pub fn emit_stake_transferred(env: &Env, data: StakeTransferred) {
    env.events()
        .publish((symbol_short!("stake_mv"), data.project_id), data);
}

pub fn emit_role_granted(env: &Env, data: RoleChanged) {
    env.events()
        .publish((symbol_short!("role_set"), data.target.clone()), data);
}

pub fn emit_role_revoked(env: &Env, data: RoleChanged) {
    env.events()
        .publish((symbol_short!("role_del"), data.target.clone()), data);
}

pub fn emit_protocol_paused(env: &Env, by: Address) {
    env.events().publish((symbol_short!("paused"),), by);
}

pub fn emit_protocol_unpaused(env: &Env, by: Address) {
    env.events().publish((symbol_short!("unpaused"),), by);
}

pub fn emit_config_updated(env: &Env, by: Address, config: PlatformConfig) {
    env.events().publish((symbol_short!("config"), by), config);
}
