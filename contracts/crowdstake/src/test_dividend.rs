use soroban_sdk::{testutils::Address as _, vec, Address};

use crate::test_support::*;
use crate::{Entitlement, Error, Project, Role};

/// A funded project with holders of 30 and 70 units and a funded oracle.
fn funded(h: &Harness) -> (Project, Address, Address, Address) {
    let (_, project) = h.native_project(1000);
    let alice = h.investor(project.id, 300);
    let bob = h.investor(project.id, 700);
    let oracle = h.with_role(Role::Oracle);
    mint(&h.env, &h.native, &oracle, 10_000);
    (project, alice, bob, oracle)
}

#[test]
fn test_distribute_and_claim() {
    let h = setup();
    let (project, alice, bob, oracle) = funded(&h);
    let custody_before = h.native.balance(&h.client.address);

    let payout_id = h.client.distribute(&oracle, &project.id, &1000, &None);
    let payout = h.client.get_payout(&payout_id);
    assert_eq!(payout.project_id, project.id);
    assert_eq!(payout.total_amount, 1000);
    assert_eq!(payout.price_per_token, 10);
    assert_eq!(payout.payment_token, h.native.address);
    assert_eq!(payout.claimed_amount, 0);
    assert_eq!(h.native.balance(&h.client.address), custody_before + 1000);

    assert_eq!(
        h.client.get_entitlement(&payout_id, &alice),
        Some(Entitlement {
            owed: 300,
            claimed: false
        })
    );

    assert_eq!(h.client.claim_dividend(&alice, &payout_id), 300);
    assert_eq!(h.native.balance(&alice), 300);
    assert_eq!(
        h.client.try_claim_dividend(&alice, &payout_id),
        Err(Ok(contract_error(Error::AlreadyClaimed)))
    );

    assert_eq!(h.client.claim_dividend(&bob, &payout_id), 700);
    assert_eq!(h.client.get_payout(&payout_id).claimed_amount, 1000);
    assert_eq!(h.native.balance(&h.client.address), custody_before);
}

#[test]
fn test_snapshot_survives_stake_transfer() {
    let h = setup();
    let (project, alice, _, oracle) = funded(&h);
    let carol = Address::generate(&h.env);

    let payout_id = h.client.distribute(&oracle, &project.id, &1000, &None);
    h.client.transfer_stake(&alice, &carol, &project.id, &10);
    assert_eq!(h.client.balance_of(&project.id, &alice), 20);

    assert_eq!(h.client.claim_dividend(&alice, &payout_id), 300);
    assert_eq!(
        h.client.try_claim_dividend(&carol, &payout_id),
        Err(Ok(contract_error(Error::NothingOwed)))
    );

    // the next round uses the new balances
    let next = h.client.distribute(&oracle, &project.id, &1000, &None);
    assert_eq!(h.client.claim_dividend(&alice, &next), 200);
    assert_eq!(h.client.claim_dividend(&carol, &next), 100);
}

#[test]
fn test_truncation_dust_stays_in_custody() {
    let h = setup();
    let (project, alice, bob, oracle) = funded(&h);

    let payout_id = h.client.distribute(&oracle, &project.id, &1099, &None);
    assert_eq!(h.client.get_payout(&payout_id).price_per_token, 10);

    let paid = h.client.claim_dividend(&alice, &payout_id) + h.client.claim_dividend(&bob, &payout_id);
    assert_eq!(paid, 1000);
    // 1000 still locked for milestones plus 99 of dust
    assert_eq!(h.native.balance(&h.client.address), 1099);
}

#[test]
fn test_distribute_requires_oracle() {
    let h = setup();
    let (project, alice, _, _) = funded(&h);
    mint(&h.env, &h.native, &alice, 1000);
    assert_eq!(
        h.client.try_distribute(&alice, &project.id, &1000, &None),
        Err(Ok(contract_error(Error::NotAuthorized)))
    );
}

#[test]
fn test_distribute_rejects_bad_amounts() {
    let h = setup();
    let (project, _, _, oracle) = funded(&h);
    assert_eq!(
        h.client.try_distribute(&oracle, &project.id, &0, &None),
        Err(Ok(contract_error(Error::InvalidAmount)))
    );
    // less than one unit per token
    assert_eq!(
        h.client.try_distribute(&oracle, &project.id, &99, &None),
        Err(Ok(contract_error(Error::InvalidAmount)))
    );
}

#[test]
fn test_distribute_without_holders_fails() {
    let h = setup();
    let (_, project) = h.native_project(1000);
    let oracle = h.with_role(Role::Oracle);
    mint(&h.env, &h.native, &oracle, 1000);
    assert_eq!(
        h.client.try_distribute(&oracle, &project.id, &1000, &None),
        Err(Ok(contract_error(Error::NoSupply)))
    );
}

#[test]
fn test_distribute_on_cancelled_project_fails() {
    let h = setup();
    let (creator, project) = h.native_project(1000);
    h.investor(project.id, 500);
    h.client.cancel_project(&creator, &project.id);

    let oracle = h.with_role(Role::Oracle);
    mint(&h.env, &h.native, &oracle, 1000);
    assert_eq!(
        h.client.try_distribute(&oracle, &project.id, &1000, &None),
        Err(Ok(contract_error(Error::ProjectNotActive)))
    );
}

#[test]
fn test_unfunded_oracle_rolls_back() {
    let h = setup();
    let (_, project) = h.native_project(1000);
    h.investor(project.id, 1000);
    let oracle = h.with_role(Role::Oracle);

    assert_eq!(
        h.client.try_distribute(&oracle, &project.id, &1000, &None),
        Err(Ok(contract_error(Error::TransferFailed)))
    );
    assert_eq!(
        h.client.try_get_payout(&0),
        Err(Ok(contract_error(Error::PayoutNotFound)))
    );
}

#[test]
fn test_dividends_in_another_token() {
    let h = setup();
    let (project, alice, _, oracle) = funded(&h);
    let usdc = create_token(&h.env, &Address::generate(&h.env));
    mint(&h.env, &usdc, &oracle, 500);

    let payout_id = h
        .client
        .distribute(&oracle, &project.id, &500, &Some(usdc.address.clone()));
    assert_eq!(h.client.get_payout(&payout_id).payment_token, usdc.address);
    assert_eq!(h.client.claim_dividend(&alice, &payout_id), 150);
    assert_eq!(usdc.balance(&alice), 150);
    assert_eq!(h.native.balance(&alice), 0);
}

#[test]
fn test_unclaimed_dividends() {
    let h = setup();
    let (project, alice, _, oracle) = funded(&h);
    let first = h.client.distribute(&oracle, &project.id, &1000, &None);
    let second = h.client.distribute(&oracle, &project.id, &2000, &None);

    assert_eq!(
        h.client.unclaimed_dividends(&project.id, &alice),
        vec![&h.env, first, second]
    );
    h.client.claim_dividend(&alice, &first);
    assert_eq!(
        h.client.unclaimed_dividends(&project.id, &alice),
        vec![&h.env, second]
    );

    let stranger = Address::generate(&h.env);
    assert_eq!(h.client.unclaimed_dividends(&project.id, &stranger).len(), 0);
}

#[test]
fn test_listed_stake_is_not_snapshotted() {
    let h = setup();
    let (project, alice, _, oracle) = funded(&h);
    h.client
        .create_listing(&alice, &project.id, &10, &12, &(h.now() + DAY), &true);

    let payout_id = h.client.distribute(&oracle, &project.id, &1000, &None);
    assert_eq!(h.client.claim_dividend(&alice, &payout_id), 200);
    assert_eq!(h.client.get_payout(&payout_id).claimed_amount, 200);
}
