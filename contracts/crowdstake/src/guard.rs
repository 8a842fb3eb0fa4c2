//! Per-operation-class reentrancy guard.
//!
//! An operation that moves assets acquires the guard for its class before
//! touching state. The flag lives in instance storage and is cleared when the
//! guard is dropped, so every return path releases it. A failed invocation is
//! rolled back by the host, which clears the flag as well.

use soroban_sdk::{contracttype, panic_with_error, Env};

use crate::storage;
use crate::Error;

/// Groups of entry points that must not be re-entered while one is running.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OpClass {
    /// Project refunds, milestone release and dispute resolution.
    Escrow,
    /// Dividend distribution and claims.
    Dividend,
    /// Marketplace listings, purchases and stake transfers.
    Market,
}

pub struct ReentrancyGuard {
    env: Env,
    class: OpClass,
}

impl ReentrancyGuard {
    pub fn acquire(env: &Env, class: OpClass) -> Result<Self, Error> {
        if storage::is_locked(env, class) {
            return Err(Error::Reentrant);
        }
        storage::set_lock(env, class);
        Ok(ReentrancyGuard {
            env: env.clone(),
            class,
        })
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        storage::clear_lock(&self.env, self.class);
    }
}

/// Acquire the guard for `class`, aborting the invocation on reentry.
pub fn enter(env: &Env, class: OpClass) -> ReentrancyGuard {
    match ReentrancyGuard::acquire(env, class) {
        Ok(guard) => guard,
        Err(err) => panic_with_error!(env, err),
    }
}
