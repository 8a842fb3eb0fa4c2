//! Dividend distributor.
//!
//! A payout round takes a deposit from an oracle, fixes
//! `price_per_token = amount / total_supply` (truncating) and snapshots
//! `owed = balance * price_per_token` for every current holder. Snapshots are
//! never recomputed, so later stake movements do not change what a holder
//! is owed. Undistributable dust stays in the contract.

use soroban_sdk::{panic_with_error, Address, Env, Vec};

use crate::custody;
use crate::events::{self, DividendClaimed, DividendDistributed};
use crate::guard::{self, OpClass};
use crate::ledger;
use crate::math;
use crate::rbac;
use crate::storage;
use crate::types::{Entitlement, Payout, ProjectStatus};
use crate::Error;

pub fn distribute(
    env: &Env,
    oracle: Address,
    project_id: u64,
    amount: i128,
    token: Option<Address>,
) -> u64 {
    oracle.require_auth();
    rbac::require_oracle(env, &oracle);
    let _guard = guard::enter(env, OpClass::Dividend);

    let state = storage::load_project_state(env, project_id);
    if state.status == ProjectStatus::Cancelled {
        panic_with_error!(env, Error::ProjectNotActive);
    }
    if amount <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }
    let supply = ledger::total_supply(env, project_id);
    if supply == 0 {
        panic_with_error!(env, Error::NoSupply);
    }
    let price_per_token = amount / supply;
    if price_per_token == 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }

    let payout_id = storage::get_and_increment_payout_id(env);
    let mut holders: u32 = 0;
    for investor in ledger::investors(env, project_id).iter() {
        let balance = ledger::balance_of(env, project_id, &investor);
        if balance == 0 {
            continue;
        }
        let owed = math::checked(env, math::mul(balance, price_per_token));
        storage::set_entitlement(
            env,
            payout_id,
            &investor,
            &Entitlement {
                owed,
                claimed: false,
            },
        );
        holders += 1;
    }

    let asset = custody::resolve_asset(env, &token);
    let payout = Payout {
        id: payout_id,
        project_id,
        total_amount: amount,
        price_per_token,
        payment_token: asset.clone(),
        created_at: env.ledger().timestamp(),
        claimed_amount: 0,
    };
    storage::save_payout(env, &payout);
    let mut payouts = storage::get_project_payouts(env, project_id);
    payouts.push_back(payout_id);
    storage::set_project_payouts(env, project_id, &payouts);

    custody::pull_in(env, &asset, &oracle, amount);

    events::emit_dividend_distributed(
        env,
        DividendDistributed {
            project_id,
            payout_id,
            total_amount: amount,
            price_per_token,
            payment_token: asset,
            holders,
        },
    );
    payout_id
}

/// Pay `investor` their snapshot for `payout_id`. The claimed flag is
/// persisted before the transfer.
pub fn claim(env: &Env, investor: Address, payout_id: u64) -> i128 {
    investor.require_auth();
    let _guard = guard::enter(env, OpClass::Dividend);

    let mut payout = storage::load_payout(env, payout_id);
    let mut entitlement = match storage::get_entitlement(env, payout_id, &investor) {
        Some(entitlement) => entitlement,
        None => panic_with_error!(env, Error::NothingOwed),
    };
    if entitlement.claimed {
        panic_with_error!(env, Error::AlreadyClaimed);
    }
    if entitlement.owed == 0 {
        panic_with_error!(env, Error::NothingOwed);
    }

    entitlement.claimed = true;
    storage::set_entitlement(env, payout_id, &investor, &entitlement);
    payout.claimed_amount = math::checked(env, math::add(payout.claimed_amount, entitlement.owed));
    storage::save_payout(env, &payout);

    custody::pay_out(env, &payout.payment_token, &investor, entitlement.owed);

    events::emit_dividend_claimed(
        env,
        DividendClaimed {
            project_id: payout.project_id,
            payout_id,
            investor,
            amount: entitlement.owed,
        },
    );
    entitlement.owed
}

/// Payout ids of `project_id` with a nonzero, unclaimed snapshot for
/// `investor`. Scans every round the project ever had.
pub fn unclaimed(env: &Env, project_id: u64, investor: &Address) -> Vec<u64> {
    let mut pending = Vec::new(env);
    for payout_id in storage::get_project_payouts(env, project_id).iter() {
        if let Some(entitlement) = storage::get_entitlement(env, payout_id, investor) {
            if !entitlement.claimed && entitlement.owed > 0 {
                pending.push_back(payout_id);
            }
        }
    }
    pending
}
