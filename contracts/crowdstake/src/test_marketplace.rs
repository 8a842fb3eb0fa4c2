use soroban_sdk::{testutils::Address as _, Address};

use crate::invariants::*;
use crate::test_support::*;
use crate::{Error, Project};

const PRICE: i128 = 1_000;

/// A funded project where `seller` holds 30 units and has listed 10 of them.
fn listed(h: &Harness, partial_fill: bool) -> (Project, Address, u64) {
    let (_, project) = h.native_project(1000);
    let seller = h.investor(project.id, 300);
    h.investor(project.id, 700);
    let listing_id = h.client.create_listing(
        &seller,
        &project.id,
        &10,
        &PRICE,
        &(h.now() + DAY),
        &partial_fill,
    );
    (project, seller, listing_id)
}

fn funded_buyer(h: &Harness, amount: i128) -> Address {
    let buyer = Address::generate(&h.env);
    mint(&h.env, &h.native, &buyer, amount);
    buyer
}

#[test]
fn test_create_listing_escrows_stake() {
    let h = setup();
    let (project, seller, listing_id) = listed(&h, true);

    let listing = h.client.get_listing(&listing_id);
    assert_eq!(listing.seller, seller);
    assert_eq!(listing.project_id, project.id);
    assert_eq!(listing.amount, 10);
    assert_eq!(listing.price_per_token, PRICE);
    assert!(listing.partial_fill);
    assert!(listing.active);

    assert_eq!(h.client.balance_of(&project.id, &seller), 20);
    assert_eq!(h.client.escrowed_stake(&project.id), 10);
    assert_eq!(h.client.total_supply(&project.id), 100);
    assert_raised_matches_investments(&h.client, project.id);
}

#[test]
fn test_create_listing_validates_inputs() {
    let h = setup();
    let (_, project) = h.native_project(1000);
    let seller = h.investor(project.id, 300);
    let expiry = h.now() + DAY;

    assert_eq!(
        h.client
            .try_create_listing(&seller, &project.id, &0, &PRICE, &expiry, &true),
        Err(Ok(contract_error(Error::InvalidAmount)))
    );
    assert_eq!(
        h.client
            .try_create_listing(&seller, &project.id, &10, &0, &expiry, &true),
        Err(Ok(contract_error(Error::InvalidPrice)))
    );
    assert_eq!(
        h.client
            .try_create_listing(&seller, &project.id, &10, &PRICE, &h.now(), &true),
        Err(Ok(contract_error(Error::InvalidDeadline)))
    );
    assert_eq!(
        h.client
            .try_create_listing(&seller, &project.id, &31, &PRICE, &expiry, &true),
        Err(Ok(contract_error(Error::InsufficientStake)))
    );
}

#[test]
fn test_partial_purchase() {
    let h = setup();
    let (project, seller, listing_id) = listed(&h, true);
    let buyer = funded_buyer(&h, 10_000);
    let seller_before = h.native.balance(&seller);

    let listing = h.client.purchase(&buyer, &listing_id, &4);
    assert_eq!(listing.amount, 6);
    assert!(listing.active);

    // total 4000, fee 1% = 40
    let seller_gain = h.native.balance(&seller) - seller_before;
    let fee = h.native.balance(&h.fee_recipient);
    assert_eq!(seller_gain, 3960);
    assert_eq!(fee, 40);
    assert_eq!(seller_gain + fee, 4 * PRICE);
    assert_eq!(h.native.balance(&buyer), 6000);

    assert_eq!(h.client.balance_of(&project.id, &buyer), 4);
    assert_eq!(h.client.escrowed_stake(&project.id), 6);

    let bought = h.client.get_investment(&project.id, &buyer).unwrap();
    assert_eq!(bought.amount, 40);
    assert_eq!(bought.avg_price, PRICE);
    assert_eq!(h.client.get_investment(&project.id, &seller).unwrap().amount, 260);
    assert_raised_matches_investments(&h.client, project.id);
}

#[test]
fn test_filling_listing_deactivates_it() {
    let h = setup();
    let (_, _, listing_id) = listed(&h, true);
    let buyer = funded_buyer(&h, 20_000);

    h.client.purchase(&buyer, &listing_id, &4);
    let listing = h.client.purchase(&buyer, &listing_id, &6);
    assert_eq!(listing.amount, 0);
    assert!(!listing.active);

    assert_eq!(
        h.client.try_purchase(&buyer, &listing_id, &1),
        Err(Ok(contract_error(Error::ListingInactive)))
    );
}

#[test]
fn test_all_or_nothing_listing() {
    let h = setup();
    let (project, _, listing_id) = listed(&h, false);
    let buyer = funded_buyer(&h, 20_000);

    assert_eq!(
        h.client.try_purchase(&buyer, &listing_id, &5),
        Err(Ok(contract_error(Error::PartialFillDisabled)))
    );
    let listing = h.client.purchase(&buyer, &listing_id, &10);
    assert!(!listing.active);
    assert_eq!(h.client.balance_of(&project.id, &buyer), 10);
}

#[test]
fn test_purchase_bounds() {
    let h = setup();
    h.update_config(|c| c.min_purchase = 5);
    let (_, _, listing_id) = listed(&h, true);
    let buyer = funded_buyer(&h, 20_000);

    assert_eq!(
        h.client.try_purchase(&buyer, &listing_id, &0),
        Err(Ok(contract_error(Error::PurchaseOutOfRange)))
    );
    assert_eq!(
        h.client.try_purchase(&buyer, &listing_id, &11),
        Err(Ok(contract_error(Error::PurchaseOutOfRange)))
    );
    assert_eq!(
        h.client.try_purchase(&buyer, &listing_id, &3),
        Err(Ok(contract_error(Error::PurchaseOutOfRange)))
    );

    h.client.purchase(&buyer, &listing_id, &7);
    // the last 3 may be bought even though they are below the minimum
    let listing = h.client.purchase(&buyer, &listing_id, &3);
    assert_eq!(listing.amount, 0);
}

#[test]
fn test_self_trade_rejected() {
    let h = setup();
    let (_, seller, listing_id) = listed(&h, true);
    mint(&h.env, &h.native, &seller, 10_000);
    assert_eq!(
        h.client.try_purchase(&seller, &listing_id, &1),
        Err(Ok(contract_error(Error::SelfTrade)))
    );
}

#[test]
fn test_expired_listing() {
    let h = setup();
    let (_, _, listing_id) = listed(&h, true);
    let buyer = funded_buyer(&h, 10_000);
    h.advance(DAY);
    assert_eq!(
        h.client.try_purchase(&buyer, &listing_id, &1),
        Err(Ok(contract_error(Error::ListingExpired)))
    );
}

#[test]
fn test_unfunded_buyer_rolls_back() {
    let h = setup();
    let (project, seller, listing_id) = listed(&h, true);
    let buyer = funded_buyer(&h, 3_000);

    assert_eq!(
        h.client.try_purchase(&buyer, &listing_id, &4),
        Err(Ok(contract_error(Error::TransferFailed)))
    );
    assert_eq!(h.client.get_listing(&listing_id).amount, 10);
    assert_eq!(h.client.balance_of(&project.id, &buyer), 0);
    assert_eq!(h.client.get_investment(&project.id, &seller).unwrap().amount, 300);
    assert_eq!(h.native.balance(&buyer), 3_000);
}

#[test]
fn test_cancel_listing_returns_stake() {
    let h = setup();
    let (project, seller, listing_id) = listed(&h, true);
    let buyer = funded_buyer(&h, 10_000);
    h.client.purchase(&buyer, &listing_id, &4);

    let stranger = Address::generate(&h.env);
    assert_eq!(
        h.client.try_cancel_listing(&stranger, &listing_id),
        Err(Ok(contract_error(Error::NotAuthorized)))
    );

    h.client.cancel_listing(&seller, &listing_id);
    let listing = h.client.get_listing(&listing_id);
    assert!(!listing.active);
    assert_eq!(listing.amount, 0);
    assert_eq!(h.client.balance_of(&project.id, &seller), 26);
    assert_eq!(h.client.escrowed_stake(&project.id), 0);

    assert_eq!(
        h.client.try_cancel_listing(&seller, &listing_id),
        Err(Ok(contract_error(Error::ListingInactive)))
    );
}

#[test]
fn test_unknown_listing() {
    let h = setup();
    assert_eq!(
        h.client.try_get_listing(&42),
        Err(Ok(contract_error(Error::ListingNotFound)))
    );
}

#[test]
fn test_lockup_blocks_stake_movement() {
    let h = setup();
    h.update_config(|c| c.lockup_period = 7 * DAY);
    let (_, project) = h.native_project(1000);
    let seller = h.investor(project.id, 300);
    let other = Address::generate(&h.env);

    assert_eq!(
        h.client
            .try_create_listing(&seller, &project.id, &10, &PRICE, &(h.now() + 30 * DAY), &true),
        Err(Ok(contract_error(Error::LockupActive)))
    );
    assert_eq!(
        h.client.try_transfer_stake(&seller, &other, &project.id, &5),
        Err(Ok(contract_error(Error::LockupActive)))
    );

    h.advance(7 * DAY);
    h.client
        .create_listing(&seller, &project.id, &10, &PRICE, &(h.now() + DAY), &true);
    h.client.transfer_stake(&seller, &other, &project.id, &5);
    assert_eq!(h.client.balance_of(&project.id, &other), 5);
}

#[test]
fn test_transfer_stake() {
    let h = setup();
    let (project, _, _) = listed(&h, true);
    let holder = h.client.investors(&project.id).get(1).unwrap();
    let receiver = Address::generate(&h.env);

    h.client.transfer_stake(&holder, &receiver, &project.id, &20);
    assert_eq!(h.client.balance_of(&project.id, &holder), 50);
    assert_eq!(h.client.balance_of(&project.id, &receiver), 20);
    let received = h.client.get_investment(&project.id, &receiver).unwrap();
    assert_eq!(received.amount, 200);
    assert_eq!(received.avg_price, 10);
    assert_raised_matches_investments(&h.client, project.id);

    assert_eq!(
        h.client.try_transfer_stake(&holder, &holder, &project.id, &1),
        Err(Ok(contract_error(Error::SelfTrade)))
    );
    assert_eq!(
        h.client.try_transfer_stake(&receiver, &holder, &project.id, &21),
        Err(Ok(contract_error(Error::InsufficientStake)))
    );
    assert_eq!(
        h.client.try_transfer_stake(&receiver, &holder, &project.id, &0),
        Err(Ok(contract_error(Error::InvalidAmount)))
    );
}

#[test]
fn test_listing_on_cancelled_project_fails() {
    let h = setup();
    let (creator, project) = h.native_project(1000);
    let seller = h.investor(project.id, 300);
    h.client.cancel_project(&creator, &project.id);
    assert_eq!(
        h.client
            .try_create_listing(&seller, &project.id, &10, &PRICE, &(h.now() + DAY), &true),
        Err(Ok(contract_error(Error::ProjectNotActive)))
    );
}

#[test]
fn test_listed_stake_is_frozen_after_cancellation() {
    let h = setup();
    let (creator, project) = h.native_project(1000);
    let seller = h.investor(project.id, 300);
    let other = h.investor(project.id, 200);
    let listing_id =
        h.client
            .create_listing(&seller, &project.id, &10, &PRICE, &(h.now() + DAY), &true);
    h.client.cancel_project(&creator, &project.id);

    let buyer = funded_buyer(&h, 10 * PRICE);
    assert_eq!(
        h.client.try_purchase(&buyer, &listing_id, &10),
        Err(Ok(contract_error(Error::ProjectNotActive)))
    );

    h.client.cancel_listing(&seller, &listing_id);
    assert_eq!(h.client.balance_of(&project.id, &seller), 30);
    assert_eq!(h.client.claim_refund(&project.id, &seller), 300);
    assert_eq!(h.client.claim_refund(&project.id, &other), 200);
    assert_eq!(h.client.total_supply(&project.id), 0);
    assert_eq!(h.native.balance(&h.client.address), 0);
    assert_raised_matches_investments(&h.client, project.id);
}
