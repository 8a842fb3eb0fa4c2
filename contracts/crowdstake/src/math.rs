//! Checked integer arithmetic for monetary amounts.
//!
//! All division truncates toward zero. Remainders ("dust") are never
//! redistributed by callers.

use soroban_sdk::{panic_with_error, Env};

use crate::types::MAX_BPS;
use crate::Error;

/// Unwrap an arithmetic result, aborting the invocation on failure.
pub fn checked(env: &Env, result: Result<i128, Error>) -> i128 {
    match result {
        Ok(value) => value,
        Err(err) => panic_with_error!(env, err),
    }
}

pub fn checked_pair(env: &Env, result: Result<(i128, i128), Error>) -> (i128, i128) {
    match result {
        Ok(pair) => pair,
        Err(err) => panic_with_error!(env, err),
    }
}

pub fn add(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_add(b).ok_or(Error::Overflow)
}

pub fn sub(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_sub(b).ok_or(Error::Overflow)
}

pub fn mul(a: i128, b: i128) -> Result<i128, Error> {
    a.checked_mul(b).ok_or(Error::Overflow)
}

/// `a * b / denominator`, truncating.
pub fn mul_div(a: i128, b: i128, denominator: i128) -> Result<i128, Error> {
    if denominator == 0 {
        return Err(Error::DivisionByZero);
    }
    Ok(mul(a, b)? / denominator)
}

/// Split `amount` into `(fee, remainder)` with `fee = amount * bps / 10000`.
pub fn split_fee(amount: i128, bps: u32) -> Result<(i128, i128), Error> {
    let fee = mul_div(amount, bps as i128, MAX_BPS as i128)?;
    Ok((fee, sub(amount, fee)?))
}

/// Volume-weighted average price after adding `qty` units bought at `price`.
pub fn weighted_average(old_avg: i128, old_qty: i128, price: i128, qty: i128) -> Result<i128, Error> {
    let total_qty = add(old_qty, qty)?;
    if total_qty == 0 {
        return Ok(0);
    }
    let total_cost = add(mul(old_avg, old_qty)?, mul(price, qty)?)?;
    Ok(total_cost / total_qty)
}
