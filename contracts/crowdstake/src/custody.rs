//! Fund custody.
//!
//! Value invested in a project sits in the contract's own token balance and
//! is tracked per project by `ProjectState::locked_funds`. Nothing leaves
//! custody except through the milestone state machine, dispute refunds and
//! cancellation refunds, and every outgoing transfer is checked: a token
//! contract that reports failure aborts the whole invocation.

use soroban_sdk::{log, panic_with_error, token, Address, Env};

use crate::math;
use crate::storage;
use crate::types::ProjectState;
use crate::Error;

/// Resolve an optional asset to a token contract; `None` is the native asset.
pub fn resolve_asset(env: &Env, asset: &Option<Address>) -> Address {
    match asset {
        Some(token) => token.clone(),
        None => storage::get_config(env).native_asset,
    }
}

/// Transfer `amount` of `asset` between two parties.
/// Zero amounts are skipped.
pub fn transfer(env: &Env, asset: &Address, from: &Address, to: &Address, amount: i128) {
    if amount == 0 {
        return;
    }
    let client = token::Client::new(env, asset);
    match client.try_transfer(from, to, &amount) {
        Ok(Ok(())) => {}
        _ => {
            log!(env, "transfer of {} failed", amount);
            panic_with_error!(env, Error::TransferFailed);
        }
    }
}

/// Take `amount` of `asset` from `from` into custody.
pub fn pull_in(env: &Env, asset: &Address, from: &Address, amount: i128) {
    transfer(env, asset, from, &env.current_contract_address(), amount);
}

/// Pay `amount` of `asset` out of custody to `to`.
pub fn pay_out(env: &Env, asset: &Address, to: &Address, amount: i128) {
    transfer(env, asset, &env.current_contract_address(), to, amount);
}

/// Add newly invested value to the project's locked funds.
pub fn lock(env: &Env, state: &mut ProjectState, amount: i128) {
    state.locked_funds = math::checked(env, math::add(state.locked_funds, amount));
}

/// Deduct `amount` from the project's locked funds, failing when short.
pub fn unlock(env: &Env, state: &mut ProjectState, amount: i128) {
    if state.locked_funds < amount {
        panic_with_error!(env, Error::InsufficientFunds);
    }
    state.locked_funds -= amount;
}
