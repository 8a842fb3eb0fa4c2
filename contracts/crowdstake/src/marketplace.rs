//! Secondary market for project stake.
//!
//! Listed stake is escrowed by the contract until it is bought or the
//! listing is cancelled. A purchase pays the seller and the fee recipient
//! directly from the buyer in the project's payment asset; both transfers
//! must succeed or the purchase is rolled back.
//!
//! Stake of a cancelled project cannot change hands. Escrowed stake can still
//! be returned to its seller with `cancel_listing`.

use soroban_sdk::{panic_with_error, Address, Env};

use crate::custody;
use crate::events::{self, ListingCancelled, ListingCreated, ListingPurchased, StakeTransferred};
use crate::guard::{self, OpClass};
use crate::ledger;
use crate::math;
use crate::project;
use crate::storage;
use crate::types::{Listing, ProjectState, ProjectStatus};
use crate::Error;

pub fn create_listing(
    env: &Env,
    seller: Address,
    project_id: u64,
    amount: i128,
    price_per_token: i128,
    expiry: u64,
    partial_fill: bool,
) -> u64 {
    seller.require_auth();
    let _guard = guard::enter(env, OpClass::Market);

    let (config, state) = storage::load_project_pair(env, project_id);
    require_not_cancelled(env, &state);
    if amount <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }
    if price_per_token <= 0 {
        panic_with_error!(env, Error::InvalidPrice);
    }
    let now = env.ledger().timestamp();
    if expiry <= now {
        panic_with_error!(env, Error::InvalidDeadline);
    }
    project::require_lockup_elapsed(env, &config);

    ledger::escrow_in(env, project_id, &seller, amount);

    let listing = Listing {
        id: storage::get_and_increment_listing_id(env),
        seller: seller.clone(),
        project_id,
        amount,
        price_per_token,
        expiry,
        partial_fill,
        active: true,
        created_at: now,
    };
    storage::save_listing(env, &listing);

    events::emit_listing_created(
        env,
        ListingCreated {
            project_id,
            listing_id: listing.id,
            seller,
            amount,
            price_per_token,
            expiry,
            partial_fill,
        },
    );
    listing.id
}

pub fn purchase(env: &Env, buyer: Address, listing_id: u64, amount: i128) -> Listing {
    buyer.require_auth();
    let _guard = guard::enter(env, OpClass::Market);

    let mut listing = storage::load_listing(env, listing_id);
    if !listing.active {
        panic_with_error!(env, Error::ListingInactive);
    }
    if buyer == listing.seller {
        panic_with_error!(env, Error::SelfTrade);
    }
    if env.ledger().timestamp() >= listing.expiry {
        panic_with_error!(env, Error::ListingExpired);
    }

    let platform = storage::get_config(env);
    let fills_listing = amount == listing.amount;
    if amount <= 0 || amount > listing.amount || (amount < platform.min_purchase && !fills_listing) {
        panic_with_error!(env, Error::PurchaseOutOfRange);
    }
    if !listing.partial_fill && !fills_listing {
        panic_with_error!(env, Error::PartialFillDisabled);
    }

    let (config, state) = storage::load_project_pair(env, listing.project_id);
    require_not_cancelled(env, &state);
    let total_price = math::checked(env, math::mul(amount, listing.price_per_token));
    let (fee, seller_proceeds) =
        math::checked_pair(env, math::split_fee(total_price, platform.market_fee_bps));

    listing.amount -= amount;
    if listing.amount == 0 || !listing.partial_fill {
        listing.active = false;
    }
    storage::save_listing(env, &listing);

    ledger::escrow_out(env, listing.project_id, &buyer, amount);
    project::debit_investment(env, listing.project_id, &listing.seller, amount, config.token_price);
    project::credit_investment(
        env,
        listing.project_id,
        &buyer,
        amount,
        listing.price_per_token,
        config.token_price,
    );

    let asset = custody::resolve_asset(env, &config.payment_token);
    custody::transfer(env, &asset, &buyer, &listing.seller, seller_proceeds);
    custody::transfer(env, &asset, &buyer, &platform.fee_recipient, fee);

    events::emit_listing_purchased(
        env,
        ListingPurchased {
            project_id: listing.project_id,
            listing_id,
            buyer,
            seller: listing.seller.clone(),
            amount,
            total_price,
            fee,
            remaining: listing.amount,
        },
    );
    listing
}

pub fn cancel_listing(env: &Env, seller: Address, listing_id: u64) {
    seller.require_auth();
    let _guard = guard::enter(env, OpClass::Market);

    let mut listing = storage::load_listing(env, listing_id);
    if seller != listing.seller {
        panic_with_error!(env, Error::NotAuthorized);
    }
    if !listing.active {
        panic_with_error!(env, Error::ListingInactive);
    }

    let returned = listing.amount;
    listing.amount = 0;
    listing.active = false;
    storage::save_listing(env, &listing);
    if returned > 0 {
        ledger::escrow_out(env, listing.project_id, &seller, returned);
    }

    events::emit_listing_cancelled(
        env,
        ListingCancelled {
            project_id: listing.project_id,
            listing_id,
            seller,
            returned,
        },
    );
}

/// Move stake directly between holders. Par value follows the stake.
pub fn transfer_stake(env: &Env, from: Address, to: Address, project_id: u64, amount: i128) {
    from.require_auth();
    let _guard = guard::enter(env, OpClass::Market);

    if from == to {
        panic_with_error!(env, Error::SelfTrade);
    }
    let (config, state) = storage::load_project_pair(env, project_id);
    require_not_cancelled(env, &state);
    project::require_lockup_elapsed(env, &config);

    ledger::transfer(env, project_id, &from, &to, amount);
    project::debit_investment(env, project_id, &from, amount, config.token_price);
    project::credit_investment(env, project_id, &to, amount, config.token_price, config.token_price);

    events::emit_stake_transferred(
        env,
        StakeTransferred {
            project_id,
            from,
            to,
            amount,
        },
    );
}

fn require_not_cancelled(env: &Env, state: &ProjectState) {
    if state.status == ProjectStatus::Cancelled {
        panic_with_error!(env, Error::ProjectNotActive);
    }
}
