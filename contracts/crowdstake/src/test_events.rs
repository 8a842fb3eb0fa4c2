extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    vec, Address, BytesN, IntoVal, Symbol, TryIntoVal, Val,
};

use crate::events::{
    DisputeResolved, DividendDistributed, Invested, InvestorRefunded, ListingPurchased,
    MilestoneReleased, ProjectCompleted, ProjectCreated,
};
use crate::test_support::*;
use crate::{MilestoneStatus, Role};

/// Data of the most recent contract event published under `(topic, project_id)`.
fn project_event(h: &Harness, topic: Symbol, project_id: u64) -> Val {
    let expected = vec![&h.env, topic.into_val(&h.env), project_id.into_val(&h.env)];
    let mut found = None;
    for (contract, topics, data) in h.env.events().all().iter() {
        if contract == h.client.address && topics == expected {
            found = Some(data);
        }
    }
    found.expect("event not published")
}

#[test]
fn test_project_created_event() {
    let h = setup();
    let (creator, project) = h.native_project(1000);

    let data: ProjectCreated = project_event(&h, symbol_short!("created"), project.id)
        .try_into_val(&h.env)
        .unwrap();
    assert_eq!(
        data,
        ProjectCreated {
            project_id: project.id,
            creator,
            payment_token: None,
            target_amount: 1000,
            token_price: 10,
            deadline: project.deadline,
        }
    );
}

#[test]
fn test_invested_event() {
    let h = setup();
    let (_, project) = h.native_project(1000);
    let investor = h.investor(project.id, 400);

    let data: Invested = project_event(&h, symbol_short!("invested"), project.id)
        .try_into_val(&h.env)
        .unwrap();
    assert_eq!(
        data,
        Invested {
            project_id: project.id,
            investor,
            amount: 400,
            stake_minted: 40,
            raised_amount: 400,
        }
    );
}

#[test]
fn test_completed_event_on_reaching_target() {
    let h = setup();
    let (_, project) = h.native_project(1000);
    h.investor(project.id, 1000);

    let data: ProjectCompleted = project_event(&h, symbol_short!("completed"), project.id)
        .try_into_val(&h.env)
        .unwrap();
    assert_eq!(
        data,
        ProjectCompleted {
            project_id: project.id,
            raised_amount: 1000,
        }
    );
}

#[test]
fn test_milestone_released_event() {
    let h = setup();
    let (creator, project) = h.native_project(1000);
    h.investor(project.id, 1000);
    let milestone = h
        .client
        .create_milestone(&creator, &project.id, &500, &(h.now() + DAY), &1);
    h.client.submit_milestone(
        &creator,
        &project.id,
        &milestone.index,
        &BytesN::from_array(&h.env, &[0xab; 32]),
    );
    let validator = h.with_role(Role::Validator);
    h.client
        .approve_milestone(&validator, &project.id, &milestone.index);

    let data: MilestoneReleased = project_event(&h, symbol_short!("ms_releas"), project.id)
        .try_into_val(&h.env)
        .unwrap();
    assert_eq!(
        data,
        MilestoneReleased {
            project_id: project.id,
            milestone_index: milestone.index,
            creator,
            creator_amount: 488,
            fee: 12,
            from: MilestoneStatus::Approved,
            to: MilestoneStatus::Released,
        }
    );
}

#[test]
fn test_dispute_events() {
    let h = setup();
    let (creator, project) = h.native_project(1000);
    let investor = h.investor(project.id, 1000);
    let milestone = h
        .client
        .create_milestone(&creator, &project.id, &300, &(h.now() + DAY), &1);
    h.client
        .raise_dispute(&investor, &project.id, &milestone.index);

    let resolver = h.with_role(Role::Resolver);
    h.client
        .resolve_dispute(&resolver, &project.id, &milestone.index, &false);

    let resolved: DisputeResolved = project_event(&h, symbol_short!("disp_done"), project.id)
        .try_into_val(&h.env)
        .unwrap();
    assert_eq!(
        resolved,
        DisputeResolved {
            project_id: project.id,
            milestone_index: milestone.index,
            resolver,
            release_to_creator: false,
            to: MilestoneStatus::Refunded,
        }
    );

    let refunded: InvestorRefunded = project_event(&h, symbol_short!("refunded"), project.id)
        .try_into_val(&h.env)
        .unwrap();
    assert_eq!(
        refunded,
        InvestorRefunded {
            project_id: project.id,
            milestone_index: Some(milestone.index),
            investor,
            amount: 300,
        }
    );
}

#[test]
fn test_dividend_distributed_event() {
    let h = setup();
    let (_, project) = h.native_project(1000);
    h.investor(project.id, 300);
    h.investor(project.id, 700);
    let oracle = h.with_role(Role::Oracle);
    mint(&h.env, &h.native, &oracle, 1000);
    let payout_id = h.client.distribute(&oracle, &project.id, &1000, &None);

    let data: DividendDistributed = project_event(&h, symbol_short!("dividend"), project.id)
        .try_into_val(&h.env)
        .unwrap();
    assert_eq!(
        data,
        DividendDistributed {
            project_id: project.id,
            payout_id,
            total_amount: 1000,
            price_per_token: 10,
            payment_token: h.native.address.clone(),
            holders: 2,
        }
    );
}

#[test]
fn test_listing_purchased_event() {
    let h = setup();
    let (_, project) = h.native_project(1000);
    let seller = h.investor(project.id, 1000);
    let listing_id = h
        .client
        .create_listing(&seller, &project.id, &10, &1_000, &(h.now() + DAY), &true);

    let buyer = Address::generate(&h.env);
    mint(&h.env, &h.native, &buyer, 4_000);
    h.client.purchase(&buyer, &listing_id, &4);

    let data: ListingPurchased = project_event(&h, symbol_short!("list_buy"), project.id)
        .try_into_val(&h.env)
        .unwrap();
    assert_eq!(
        data,
        ListingPurchased {
            project_id: project.id,
            listing_id,
            buyer,
            seller,
            amount: 4,
            total_price: 4_000,
            fee: 40,
            remaining: 6,
        }
    );
}

#[test]
fn test_pause_event() {
    let h = setup();
    h.client.pause(&h.super_admin);

    let expected = vec![&h.env, symbol_short!("paused").into_val(&h.env)];
    let published = h
        .env
        .events()
        .all()
        .iter()
        .any(|(contract, topics, _)| contract == h.client.address && topics == expected);
    assert!(published);
}
