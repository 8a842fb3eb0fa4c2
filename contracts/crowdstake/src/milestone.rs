//! Milestone state machine.
//!
//! ```text
//! Pending ──submit──► Submitted ──approvals reached──► Approved ──► Released
//!    │                    │
//!    └──raise_dispute─────┴──► Disputed ──resolve(true)──► Approved ──► Released
//!                                  └──────resolve(false)─► Refunded
//! ```
//!
//! Release and refund write the terminal status and the reduced
//! `locked_funds` before any token leaves custody, and both run under the
//! `Escrow` reentrancy guard.

use soroban_sdk::{log, panic_with_error, Address, BytesN, Env, Vec};

use crate::custody;
use crate::events::{
    self, DisputeRaised, DisputeResolved, DisputeReviewed, MilestoneApproved, MilestoneCreated,
    MilestoneReleased, MilestoneSubmitted,
};
use crate::guard::{self, OpClass};
use crate::ledger;
use crate::math;
use crate::rbac;
use crate::storage;
use crate::types::{
    DisputeStatus, Milestone, MilestoneStatus, ProjectConfig, ProjectState, ProjectStatus,
};
use crate::Error;

pub fn create(
    env: &Env,
    caller: Address,
    project_id: u64,
    amount: i128,
    due_date: u64,
    required_approvals: u32,
) -> Milestone {
    caller.require_auth();

    let (config, mut state) = storage::load_project_pair(env, project_id);
    if caller != config.creator && !rbac::is_admin_or_above(env, &caller) {
        panic_with_error!(env, Error::NotAuthorized);
    }
    match state.status {
        ProjectStatus::Active | ProjectStatus::Completed => {}
        _ => panic_with_error!(env, Error::ProjectNotActive),
    }
    if amount <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }
    if required_approvals == 0 {
        panic_with_error!(env, Error::InvalidApprovals);
    }
    let min_lead = storage::get_config(env).min_milestone_lead;
    if due_date < env.ledger().timestamp().saturating_add(min_lead) {
        panic_with_error!(env, Error::InvalidDueDate);
    }
    let allocated = math::checked(env, math::add(state.allocated, amount));
    if allocated > config.target_amount {
        panic_with_error!(env, Error::AllocationExceeded);
    }

    let milestone = Milestone {
        project_id,
        index: state.milestone_count,
        amount,
        due_date,
        status: MilestoneStatus::Pending,
        dispute_status: DisputeStatus::None,
        required_approvals,
        approvals_count: 0,
        evidence: None,
        submitted_at: 0,
        disputed_by: None,
    };
    state.allocated = allocated;
    state.milestone_count += 1;
    storage::save_milestone(env, &milestone);
    storage::save_project_state(env, project_id, &state);

    events::emit_milestone_created(
        env,
        MilestoneCreated {
            project_id,
            milestone_index: milestone.index,
            amount,
            due_date,
            required_approvals,
        },
    );
    milestone
}

pub fn submit(env: &Env, creator: Address, project_id: u64, index: u32, evidence: BytesN<32>) {
    creator.require_auth();

    let (config, state) = storage::load_project_pair(env, project_id);
    if creator != config.creator {
        panic_with_error!(env, Error::NotAuthorized);
    }
    require_not_cancelled(env, &state);

    let mut milestone = storage::load_milestone(env, project_id, index);
    if milestone.status != MilestoneStatus::Pending {
        panic_with_error!(env, Error::InvalidMilestoneState);
    }
    milestone.status = MilestoneStatus::Submitted;
    milestone.evidence = Some(evidence.clone());
    milestone.submitted_at = env.ledger().timestamp();
    storage::save_milestone(env, &milestone);

    events::emit_milestone_submitted(
        env,
        MilestoneSubmitted {
            project_id,
            milestone_index: index,
            evidence,
            from: MilestoneStatus::Pending,
            to: MilestoneStatus::Submitted,
        },
    );
}

/// Count one approval; the approval that reaches `required_approvals`
/// releases the milestone in the same invocation.
pub fn approve(env: &Env, approver: Address, project_id: u64, index: u32) -> MilestoneStatus {
    approver.require_auth();
    let _guard = guard::enter(env, OpClass::Escrow);

    let (config, mut state) = storage::load_project_pair(env, project_id);
    require_not_cancelled(env, &state);
    require_validator_or_staked(env, project_id, &approver);

    let mut milestone = storage::load_milestone(env, project_id, index);
    if milestone.status != MilestoneStatus::Submitted {
        panic_with_error!(env, Error::InvalidMilestoneState);
    }
    if storage::has_approved(env, project_id, index, &approver) {
        panic_with_error!(env, Error::AlreadyApproved);
    }

    storage::record_approval(env, project_id, index, &approver);
    milestone.approvals_count += 1;
    events::emit_milestone_approved(
        env,
        MilestoneApproved {
            project_id,
            milestone_index: index,
            approver,
            approvals_count: milestone.approvals_count,
            required_approvals: milestone.required_approvals,
        },
    );

    if milestone.approvals_count >= milestone.required_approvals {
        milestone.status = MilestoneStatus::Approved;
        release(env, &config, &mut state, &mut milestone);
    } else {
        storage::save_milestone(env, &milestone);
    }
    milestone.status
}

pub fn raise_dispute(env: &Env, caller: Address, project_id: u64, index: u32) {
    caller.require_auth();

    let mut state = storage::load_project_state(env, project_id);
    require_not_cancelled(env, &state);
    require_validator_or_staked(env, project_id, &caller);

    let mut milestone = storage::load_milestone(env, project_id, index);
    if matches!(
        milestone.dispute_status,
        DisputeStatus::Raised | DisputeStatus::UnderReview
    ) {
        panic_with_error!(env, Error::DisputeAlreadyOpen);
    }
    let from = milestone.status;
    match from {
        MilestoneStatus::Pending | MilestoneStatus::Submitted => {}
        _ => panic_with_error!(env, Error::InvalidMilestoneState),
    }

    milestone.status = MilestoneStatus::Disputed;
    milestone.dispute_status = DisputeStatus::Raised;
    milestone.disputed_by = Some(caller.clone());
    storage::save_milestone(env, &milestone);

    state.open_disputes += 1;
    state.status = ProjectStatus::Disputed;
    storage::save_project_state(env, project_id, &state);

    events::emit_dispute_raised(
        env,
        DisputeRaised {
            project_id,
            milestone_index: index,
            raised_by: caller,
            from,
        },
    );
}

/// Mark a raised dispute as being looked at by `resolver`.
pub fn review_dispute(env: &Env, resolver: Address, project_id: u64, index: u32) {
    resolver.require_auth();
    rbac::require_resolver(env, &resolver);

    let mut milestone = storage::load_milestone(env, project_id, index);
    if milestone.dispute_status != DisputeStatus::Raised {
        panic_with_error!(env, Error::NoOpenDispute);
    }
    milestone.dispute_status = DisputeStatus::UnderReview;
    storage::save_milestone(env, &milestone);

    events::emit_dispute_reviewed(
        env,
        DisputeReviewed {
            project_id,
            milestone_index: index,
            resolver,
        },
    );
}

/// Settle a disputed milestone: release it to the creator, or refund its
/// allocation pro rata to every investor not yet refunded.
/// Disputes left open on a cancelled project are settled by `claim_refund`.
pub fn resolve_dispute(
    env: &Env,
    resolver: Address,
    project_id: u64,
    index: u32,
    release_to_creator: bool,
) -> MilestoneStatus {
    resolver.require_auth();
    rbac::require_resolver(env, &resolver);
    let _guard = guard::enter(env, OpClass::Escrow);

    let (config, mut state) = storage::load_project_pair(env, project_id);
    require_not_cancelled(env, &state);
    let mut milestone = storage::load_milestone(env, project_id, index);
    if milestone.status != MilestoneStatus::Disputed {
        panic_with_error!(env, Error::InvalidMilestoneState);
    }

    milestone.dispute_status = DisputeStatus::Resolved;
    state.open_disputes = state.open_disputes.saturating_sub(1);
    if state.open_disputes == 0 {
        state.status = if state.raised_amount >= config.target_amount {
            ProjectStatus::Completed
        } else {
            ProjectStatus::Active
        };
    }

    let to = if release_to_creator {
        MilestoneStatus::Released
    } else {
        MilestoneStatus::Refunded
    };
    events::emit_dispute_resolved(
        env,
        DisputeResolved {
            project_id,
            milestone_index: index,
            resolver,
            release_to_creator,
            to,
        },
    );

    if release_to_creator {
        milestone.status = MilestoneStatus::Approved;
        release(env, &config, &mut state, &mut milestone);
    } else {
        refund(env, &config, &mut state, &mut milestone);
    }
    milestone.status
}

/// Pay an approved milestone out of custody: the platform fee to the fee
/// recipient and the remainder to the creator.
fn release(env: &Env, config: &ProjectConfig, state: &mut ProjectState, milestone: &mut Milestone) {
    if milestone.status != MilestoneStatus::Approved {
        panic_with_error!(env, Error::InvalidMilestoneState);
    }
    custody::unlock(env, state, milestone.amount);
    milestone.status = MilestoneStatus::Released;
    storage::save_milestone(env, milestone);
    storage::save_project_state(env, config.id, state);

    let platform = storage::get_config(env);
    let (fee, creator_amount) = math::checked_pair(env, math::split_fee(milestone.amount, platform.fee_bps));
    let asset = custody::resolve_asset(env, &config.payment_token);
    custody::pay_out(env, &asset, &config.creator, creator_amount);
    custody::pay_out(env, &asset, &platform.fee_recipient, fee);

    log!(env, "milestone {} of project {} released", milestone.index, config.id);
    events::emit_milestone_released(
        env,
        MilestoneReleased {
            project_id: config.id,
            milestone_index: milestone.index,
            creator: config.creator.clone(),
            creator_amount,
            fee,
            from: MilestoneStatus::Approved,
            to: MilestoneStatus::Released,
        },
    );
}

/// Refund a disputed milestone's allocation:
/// `amount * investment / raised_amount` per non-refunded investor, where
/// `amount` is capped at `locked_funds` for a milestone the raise never covered.
/// Division dust stays in `locked_funds`.
///
/// Investors keep their stake and records. A later cancellation shares out
/// whatever custody remains, so no investor is marked refunded here.
fn refund(env: &Env, config: &ProjectConfig, state: &mut ProjectState, milestone: &mut Milestone) {
    let refundable = milestone.amount.min(state.locked_funds);
    let mut payments: Vec<(Address, i128)> = Vec::new(env);
    let mut total: i128 = 0;
    for investor in ledger::investors(env, config.id).iter() {
        let investment = match storage::get_investment(env, config.id, &investor) {
            Some(investment) if !investment.refunded && investment.amount > 0 => investment,
            _ => continue,
        };
        let share = math::checked(
            env,
            math::mul_div(refundable, investment.amount, state.raised_amount),
        );
        total = math::checked(env, math::add(total, share));
        payments.push_back((investor, share));
    }

    custody::unlock(env, state, total);
    milestone.status = MilestoneStatus::Refunded;
    storage::save_milestone(env, milestone);
    storage::save_project_state(env, config.id, state);

    let asset = custody::resolve_asset(env, &config.payment_token);
    for (investor, share) in payments.iter() {
        custody::pay_out(env, &asset, &investor, share);
        events::emit_investor_refunded(env, config.id, Some(milestone.index), investor, share);
    }
}

fn require_not_cancelled(env: &Env, state: &ProjectState) {
    if state.status == ProjectStatus::Cancelled {
        panic_with_error!(env, Error::ProjectNotActive);
    }
}

fn require_validator_or_staked(env: &Env, project_id: u64, caller: &Address) {
    if !rbac::is_validator(env, caller) && !ledger::has_stake(env, project_id, caller) {
        panic_with_error!(env, Error::NotAuthorized);
    }
}
