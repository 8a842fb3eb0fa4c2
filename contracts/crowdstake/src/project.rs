//! Project registration, primary investment, cancellation and refunds.
//!
//! ```text
//! Active ──► Completed          (raised_amount reaches target_amount)
//!   │            │
//!   │            └──► Disputed ──► Completed
//!   ├──► Disputed ──► Active
//!   │       └──► Cancelled
//!   └──► Cancelled
//! ```
//!
//! Stake is frozen once a project is cancelled. Each claimed refund burns
//! the claimant's stake and clears the par value on their record.

use soroban_sdk::{log, panic_with_error, Address, Env};

use crate::custody;
use crate::events::{self, Invested, ProjectCreated};
use crate::guard::{self, OpClass};
use crate::ledger;
use crate::math;
use crate::rbac;
use crate::storage;
use crate::types::{Investment, Project, ProjectConfig, ProjectState, ProjectStatus};
use crate::Error;

/// Upper bound on funding targets (10^30 base units).
const MAX_TARGET: i128 = 1_000_000_000_000_000_000_000_000_000_000;

/// Projects must close within five years of registration.
const MAX_FUNDING_WINDOW: u64 = 5 * 365 * 24 * 60 * 60;

pub fn create(
    env: &Env,
    creator: Address,
    payment_token: Option<Address>,
    target_amount: i128,
    token_price: i128,
    deadline: u64,
) -> Project {
    creator.require_auth();
    rbac::require_can_register(env, &creator);

    if target_amount <= 0 || target_amount > MAX_TARGET {
        panic_with_error!(env, Error::InvalidAmount);
    }
    if token_price <= 0 || target_amount % token_price != 0 {
        panic_with_error!(env, Error::InvalidPrice);
    }

    let now = env.ledger().timestamp();
    if deadline <= now || deadline > now + MAX_FUNDING_WINDOW {
        panic_with_error!(env, Error::InvalidDeadline);
    }

    let id = storage::get_and_increment_project_id(env);
    let config = ProjectConfig {
        id,
        creator: creator.clone(),
        payment_token: payment_token.clone(),
        target_amount,
        token_price,
        deadline,
        created_at: now,
    };
    let state = ProjectState {
        status: ProjectStatus::Active,
        raised_amount: 0,
        locked_funds: 0,
        allocated: 0,
        milestone_count: 0,
        open_disputes: 0,
        refund_pool: 0,
    };
    storage::save_project(env, &config, &state);

    events::emit_project_created(
        env,
        ProjectCreated {
            project_id: id,
            creator,
            payment_token,
            target_amount,
            token_price,
            deadline,
        },
    );

    Project::from_parts(config, state)
}

/// Invest `amount` of the project's payment asset and receive
/// `amount / token_price` stake units.
pub fn invest(env: &Env, project_id: u64, investor: Address, amount: i128) -> i128 {
    investor.require_auth();
    let _guard = guard::enter(env, OpClass::Escrow);

    let (config, mut state) = storage::load_project_pair(env, project_id);
    if state.status != ProjectStatus::Active {
        panic_with_error!(env, Error::ProjectNotActive);
    }
    let now = env.ledger().timestamp();
    if now >= config.deadline {
        panic_with_error!(env, Error::ProjectExpired);
    }
    if amount <= 0 || amount % config.token_price != 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }

    let units = amount / config.token_price;
    let cap = config.target_amount / config.token_price;
    ledger::mint(env, project_id, &investor, units, cap);

    state.raised_amount = math::checked(env, math::add(state.raised_amount, amount));
    custody::lock(env, &mut state, amount);
    let completed = state.raised_amount >= config.target_amount;
    if completed {
        state.status = ProjectStatus::Completed;
    }
    storage::save_project_state(env, project_id, &state);

    credit_investment(env, project_id, &investor, units, config.token_price, config.token_price);

    let asset = custody::resolve_asset(env, &config.payment_token);
    custody::pull_in(env, &asset, &investor, amount);

    events::emit_invested(
        env,
        Invested {
            project_id,
            investor,
            amount,
            stake_minted: units,
            raised_amount: state.raised_amount,
        },
    );
    if completed {
        log!(env, "project {} reached its target", project_id);
        events::emit_project_completed(env, project_id, state.raised_amount);
    }
    units
}

/// Cancel a project that is still raising or stuck in a dispute. Investors
/// then claim refunds against the custody balance snapshotted here.
pub fn cancel(env: &Env, caller: Address, project_id: u64) {
    caller.require_auth();

    let (config, mut state) = storage::load_project_pair(env, project_id);
    if caller != config.creator && !rbac::is_admin_or_above(env, &caller) {
        panic_with_error!(env, Error::NotAuthorized);
    }
    match state.status {
        ProjectStatus::Active | ProjectStatus::Disputed => {}
        _ => panic_with_error!(env, Error::ProjectNotActive),
    }

    state.status = ProjectStatus::Cancelled;
    state.refund_pool = state.locked_funds;
    storage::save_project_state(env, project_id, &state);

    events::emit_project_cancelled(env, project_id, caller, state.refund_pool);
}

/// Refund a cancelled project's investor:
/// `refund_pool * investment / raised_amount`, truncating.
/// `raised_amount` is left untouched so every claim shares the same denominator.
pub fn claim_refund(env: &Env, project_id: u64, investor: Address) -> i128 {
    investor.require_auth();
    let _guard = guard::enter(env, OpClass::Escrow);

    let (config, mut state) = storage::load_project_pair(env, project_id);
    if state.status != ProjectStatus::Cancelled {
        panic_with_error!(env, Error::ProjectNotCancelled);
    }
    let mut investment = match storage::get_investment(env, project_id, &investor) {
        Some(investment) => investment,
        None => panic_with_error!(env, Error::NothingToRefund),
    };
    if investment.refunded {
        panic_with_error!(env, Error::AlreadyRefunded);
    }
    if investment.amount <= 0 {
        panic_with_error!(env, Error::NothingToRefund);
    }

    let refund = math::checked(
        env,
        math::mul_div(state.refund_pool, investment.amount, state.raised_amount),
    );
    ledger::burn(env, project_id, &investor, ledger::balance_of(env, project_id, &investor));
    investment.amount = 0;
    investment.refunded = true;
    storage::set_investment(env, project_id, &investor, &investment);
    custody::unlock(env, &mut state, refund);
    storage::save_project_state(env, project_id, &state);

    let asset = custody::resolve_asset(env, &config.payment_token);
    custody::pay_out(env, &asset, &investor, refund);

    events::emit_investor_refunded(env, project_id, None, investor, refund);
    refund
}

// ─────────────────────────────────────────────────────────
// Investment records
// ─────────────────────────────────────────────────────────

/// Record `units` of stake arriving at `investor`, bought at `price` per unit.
///
/// The record's `amount` grows by the par value of the stake and the average
/// entry price is re-weighted by volume.
pub fn credit_investment(
    env: &Env,
    project_id: u64,
    investor: &Address,
    units: i128,
    price: i128,
    token_price: i128,
) {
    let now = env.ledger().timestamp();
    let mut investment = storage::get_investment(env, project_id, investor).unwrap_or(Investment {
        amount: 0,
        timestamp: now,
        refunded: false,
        avg_price: 0,
    });
    let held_units = investment.amount / token_price;
    investment.avg_price = math::checked(
        env,
        math::weighted_average(investment.avg_price, held_units, price, units),
    );
    let par = math::checked(env, math::mul(units, token_price));
    investment.amount = math::checked(env, math::add(investment.amount, par));
    investment.timestamp = now;
    storage::set_investment(env, project_id, investor, &investment);
}

/// Record `units` of stake leaving `investor`.
pub fn debit_investment(env: &Env, project_id: u64, investor: &Address, units: i128, token_price: i128) {
    let mut investment = match storage::get_investment(env, project_id, investor) {
        Some(investment) => investment,
        None => panic_with_error!(env, Error::InsufficientStake),
    };
    let par = math::checked(env, math::mul(units, token_price));
    if investment.amount < par {
        panic_with_error!(env, Error::InsufficientStake);
    }
    investment.amount -= par;
    storage::set_investment(env, project_id, investor, &investment);
}

/// Reject stake movements until the project's lock-up period has elapsed.
pub fn require_lockup_elapsed(env: &Env, config: &ProjectConfig) {
    let lockup = storage::get_config(env).lockup_period;
    if env.ledger().timestamp() < config.created_at.saturating_add(lockup) {
        panic_with_error!(env, Error::LockupActive);
    }
}
