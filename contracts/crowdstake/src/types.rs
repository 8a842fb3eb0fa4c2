//! # Types
//!
//! Shared data structures used across all modules of the Crowdstake protocol.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A `Project` is internally stored as two separate ledger entries:
//!
//! - [`ProjectConfig`]: written once at registration; never mutated.
//! - [`ProjectState`]: written on every investment, release and refund.
//!
//! The public API exposes the reconstructed [`Project`] struct for convenience.
//!
//! ### Milestone lifecycle
//!
//! ```text
//! Pending ──► Submitted ──► Approved ──► Released
//!    │            │
//!    └────────────┴──► Disputed ──► Approved ──► Released
//!                          └──────► Refunded
//! ```
//!
//! `Released` and `Refunded` are terminal.

use soroban_sdk::{contracttype, Address, BytesN};

/// Fee denominator: 10 000 basis points = 100%.
pub const MAX_BPS: u32 = 10_000;

/// Current lifecycle state of a crowdfunding project.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProjectStatus {
    /// Accepting investments, target not yet reached.
    Active,
    /// Target reached; milestones are being delivered.
    Completed,
    /// Cancelled by its creator or an admin; investors may claim refunds.
    Cancelled,
    /// At least one milestone dispute is open.
    Disputed,
}

/// Immutable project configuration, written once at registration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub creator: Address,
    pub payment_token: Option<Address>,
    pub target_amount: i128,
    pub token_price: i128,
    pub deadline: u64,
    pub created_at: u64,
}

/// Mutable project state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectState {
    pub status: ProjectStatus,
    pub raised_amount: i128,
    /// Value held in custody for this project and not yet released or refunded.
    pub locked_funds: i128,
    /// Sum of all milestone allocations.
    pub allocated: i128,
    pub milestone_count: u32,
    pub open_disputes: u32,
    /// `locked_funds` captured at cancellation; the refund denominator.
    pub refund_pool: i128,
}

/// Full on-chain representation of a project.
///
/// Used as the public API return type; reconstructed internally from
/// the split `ProjectConfig` + `ProjectState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Auto-incremented unique ID; doubles as the stake token id.
    pub id: u64,
    /// Owning principal; receives released milestone funds.
    pub creator: Address,
    /// Asset investments are made in. `None` means the platform's native asset.
    pub payment_token: Option<Address>,
    pub target_amount: i128,
    /// Price of one stake unit in the payment asset.
    pub token_price: i128,
    /// Ledger timestamp after which investments are rejected.
    pub deadline: u64,
    pub created_at: u64,
    pub status: ProjectStatus,
    pub raised_amount: i128,
    pub locked_funds: i128,
    pub allocated: i128,
    pub milestone_count: u32,
    pub open_disputes: u32,
    pub refund_pool: i128,
}

impl Project {
    pub(crate) fn from_parts(config: ProjectConfig, state: ProjectState) -> Self {
        Project {
            id: config.id,
            creator: config.creator,
            payment_token: config.payment_token,
            target_amount: config.target_amount,
            token_price: config.token_price,
            deadline: config.deadline,
            created_at: config.created_at,
            status: state.status,
            raised_amount: state.raised_amount,
            locked_funds: state.locked_funds,
            allocated: state.allocated,
            milestone_count: state.milestone_count,
            open_disputes: state.open_disputes,
            refund_pool: state.refund_pool,
        }
    }

    /// Maximum stake units the project can ever mint.
    pub fn max_supply(&self) -> i128 {
        self.target_amount / self.token_price
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MilestoneStatus {
    Pending,
    Submitted,
    Approved,
    Disputed,
    Released,
    Refunded,
}

impl MilestoneStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MilestoneStatus::Released | MilestoneStatus::Refunded)
    }
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DisputeStatus {
    None,
    Raised,
    UnderReview,
    Resolved,
}

/// A funded sub-deliverable of a project, indexed `0..milestone_count`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Milestone {
    pub project_id: u64,
    pub index: u32,
    /// Allocation released to the creator (minus fee) on approval.
    pub amount: i128,
    pub due_date: u64,
    pub status: MilestoneStatus,
    pub dispute_status: DisputeStatus,
    pub required_approvals: u32,
    pub approvals_count: u32,
    /// Content hash of the delivery evidence, set on submission.
    pub evidence: Option<BytesN<32>>,
    pub submitted_at: u64,
    pub disputed_by: Option<Address>,
}

/// Per (project, investor) contribution record.
///
/// `amount` is the par value of the stake the investor is accountable for:
/// it grows on investment and on stake received, and shrinks when stake is
/// sold or transferred away.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Investment {
    pub amount: i128,
    pub timestamp: u64,
    /// Set when a cancellation refund is claimed; `amount` is zeroed with it.
    pub refunded: bool,
    /// Volume-weighted average entry price per stake unit.
    pub avg_price: i128,
}

/// One dividend distribution round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payout {
    pub id: u64,
    pub project_id: u64,
    pub total_amount: i128,
    pub price_per_token: i128,
    /// Concrete asset the payout is denominated in.
    pub payment_token: Address,
    pub created_at: u64,
    pub claimed_amount: i128,
}

/// Snapshot of what one investor is owed from one payout.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entitlement {
    pub owed: i128,
    pub claimed: bool,
}

/// Secondary-market sell offer for a project's stake.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Listing {
    pub id: u64,
    pub seller: Address,
    /// Stake token id, i.e. the project id.
    pub project_id: u64,
    /// Units still escrowed and available.
    pub amount: i128,
    pub price_per_token: i128,
    pub expiry: u64,
    pub partial_fill: bool,
    pub active: bool,
    pub created_at: u64,
}

/// Platform-wide parameters set at `init` and replaceable by an admin.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlatformConfig {
    /// Fee skimmed from every milestone release, in basis points.
    pub fee_bps: u32,
    /// Fee skimmed from every marketplace purchase, in basis points.
    pub market_fee_bps: u32,
    pub fee_recipient: Address,
    /// Token contract used wherever a project or payout names no asset.
    pub native_asset: Address,
    /// Minimum seconds between now and a new milestone's due date.
    pub min_milestone_lead: u64,
    /// Seconds after project creation before stake may change hands.
    pub lockup_period: u64,
    /// Minimum stake units per marketplace purchase.
    pub min_purchase: i128,
}

impl PlatformConfig {
    pub fn is_valid(&self) -> bool {
        self.fee_bps <= MAX_BPS && self.market_fee_bps <= MAX_BPS && self.min_purchase >= 1
    }
}
