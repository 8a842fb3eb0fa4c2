//! Stake ledger: per-project, per-holder balances of the project's stake
//! token, the minted supply and its cap, and the holder roster.
//!
//! Stake placed on the marketplace leaves the seller's balance and is held in
//! a per-project escrow counter until it is bought or the listing is
//! cancelled. Escrowed stake still counts towards `total_supply`.

use soroban_sdk::{panic_with_error, Address, Env, Vec};

use crate::math;
use crate::storage;
use crate::Error;

pub fn balance_of(env: &Env, project_id: u64, holder: &Address) -> i128 {
    storage::get_stake(env, project_id, holder)
}

pub fn total_supply(env: &Env, project_id: u64) -> i128 {
    storage::get_supply(env, project_id)
}

pub fn escrowed(env: &Env, project_id: u64) -> i128 {
    storage::get_escrowed(env, project_id)
}

/// Every address that ever held stake in the project, in arrival order.
pub fn investors(env: &Env, project_id: u64) -> Vec<Address> {
    storage::get_investors(env, project_id)
}

pub fn has_stake(env: &Env, project_id: u64, holder: &Address) -> bool {
    balance_of(env, project_id, holder) > 0
}

fn enroll(env: &Env, project_id: u64, holder: &Address) {
    let mut roster = storage::get_investors(env, project_id);
    if !roster.contains(holder) {
        roster.push_back(holder.clone());
        storage::set_investors(env, project_id, &roster);
    }
}

fn credit(env: &Env, project_id: u64, holder: &Address, amount: i128) {
    let balance = balance_of(env, project_id, holder);
    let updated = math::checked(env, math::add(balance, amount));
    storage::set_stake(env, project_id, holder, updated);
    enroll(env, project_id, holder);
}

fn debit(env: &Env, project_id: u64, holder: &Address, amount: i128) {
    let balance = balance_of(env, project_id, holder);
    if balance < amount {
        panic_with_error!(env, Error::InsufficientStake);
    }
    storage::set_stake(env, project_id, holder, balance - amount);
}

/// Mint `amount` new stake to `to`, never exceeding `cap` in total.
pub fn mint(env: &Env, project_id: u64, to: &Address, amount: i128, cap: i128) {
    if amount <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }
    let supply = math::checked(env, math::add(total_supply(env, project_id), amount));
    if supply > cap {
        panic_with_error!(env, Error::SupplyCapExceeded);
    }
    storage::set_supply(env, project_id, supply);
    credit(env, project_id, to, amount);
}

/// Destroy `amount` of `holder`'s stake. Burning nothing is a no-op.
pub fn burn(env: &Env, project_id: u64, holder: &Address, amount: i128) {
    if amount <= 0 {
        return;
    }
    debit(env, project_id, holder, amount);
    let supply = math::checked(env, math::sub(total_supply(env, project_id), amount));
    storage::set_supply(env, project_id, supply);
}

pub fn transfer(env: &Env, project_id: u64, from: &Address, to: &Address, amount: i128) {
    if amount <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }
    debit(env, project_id, from, amount);
    credit(env, project_id, to, amount);
}

/// Move `amount` of `from`'s stake into marketplace escrow.
pub fn escrow_in(env: &Env, project_id: u64, from: &Address, amount: i128) {
    debit(env, project_id, from, amount);
    let held = math::checked(env, math::add(escrowed(env, project_id), amount));
    storage::set_escrowed(env, project_id, held);
}

/// Release `amount` of escrowed stake to `to`.
pub fn escrow_out(env: &Env, project_id: u64, to: &Address, amount: i128) {
    let held = escrowed(env, project_id);
    if held < amount {
        panic_with_error!(env, Error::InsufficientStake);
    }
    storage::set_escrowed(env, project_id, held - amount);
    credit(env, project_id, to, amount);
}
