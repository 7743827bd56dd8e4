extern crate std;

use soroban_sdk::{
    contract, contractimpl,
    testutils::{Address as _, Ledger},
    token, Address, Env, String,
};

use crate::invariants::{
    assert_project_immutable_fields, assert_release_permanent, assert_total_matches_contributions,
    assert_valid_status_transition,
};
use crate::test::{create_default_project, create_token, fund_backer, setup, DAY, GOAL};
use crate::{CrowdfundEscrowClient, Error, ProjectStatus};

struct Campaign<'a> {
    env: Env,
    client: CrowdfundEscrowClient<'a>,
    token: token::Client<'a>,
    creator: Address,
    id: u64,
}

/// A project with goal 1000 and deadline now + 1 day.
fn campaign() -> Campaign<'static> {
    let (env, client) = setup();
    let creator = Address::generate(&env);
    let token = create_token(&env, &Address::generate(&env));
    let id = create_default_project(&env, &client, &creator, &token);
    Campaign {
        env,
        client,
        token,
        creator,
        id,
    }
}

impl Campaign<'_> {
    fn backer_contributes(&self, amount: i128) -> Address {
        let backer = Address::generate(&self.env);
        fund_backer(
            &self.env,
            &self.token,
            &self.client.address,
            &backer,
            amount,
            amount,
        );
        self.client.contribute(&self.id, &backer, &amount);
        backer
    }

    fn pass_deadline(&self) {
        let deadline = self.client.get_project(&self.id).deadline;
        self.env.ledger().set_timestamp(deadline + 1);
    }
}

// ── Release ──────────────────────────────────────────────────────────

#[test]
fn test_release_by_non_creator_fails() {
    let c = campaign();
    let backer = c.backer_contributes(1_000);
    c.pass_deadline();

    assert_eq!(
        c.client.try_release_funds(&c.id, &backer),
        Err(Ok(Error::NotProjectCreator))
    );
    assert!(!c.client.get_project(&c.id).funds_released);
}

#[test]
fn test_release_before_deadline_fails() {
    let c = campaign();
    c.backer_contributes(500);

    assert_eq!(c.client.get_project(&c.id).total_funded, 500);
    assert_eq!(
        c.client.try_release_funds(&c.id, &c.creator),
        Err(Ok(Error::DeadlineNotReached))
    );
}

#[test]
fn test_release_before_deadline_fails_even_when_goal_met() {
    let c = campaign();
    c.backer_contributes(1_000);

    assert_eq!(
        c.client.try_release_funds(&c.id, &c.creator),
        Err(Ok(Error::DeadlineNotReached))
    );
}

#[test]
fn test_release_without_goal_fails() {
    let c = campaign();
    c.backer_contributes(999);
    c.pass_deadline();

    assert_eq!(
        c.client.try_release_funds(&c.id, &c.creator),
        Err(Ok(Error::GoalNotMet))
    );
    assert_eq!(c.token.balance(&c.client.address), 999);
}

#[test]
fn test_release_pays_creator_when_goal_met() {
    let c = campaign();
    let original = c.client.get_project(&c.id);
    c.backer_contributes(1_000);
    c.pass_deadline();
    assert_eq!(c.client.project_status(&c.id), ProjectStatus::GoalMet);

    c.client.release_funds(&c.id, &c.creator);

    let project = c.client.get_project(&c.id);
    assert!(project.funds_released);
    assert_eq!(c.client.project_status(&c.id), ProjectStatus::Released);
    assert_eq!(c.token.balance(&c.creator), 1_000);
    assert_eq!(c.token.balance(&c.client.address), 0);
    assert_project_immutable_fields(&original, &project);
}

#[test]
fn test_release_at_exact_deadline_succeeds() {
    let c = campaign();
    c.backer_contributes(1_000);
    let deadline = c.client.get_project(&c.id).deadline;
    c.env.ledger().set_timestamp(deadline);

    c.client.release_funds(&c.id, &c.creator);

    assert!(c.client.get_project(&c.id).funds_released);
}

#[test]
fn test_release_pays_out_over_funding() {
    let c = campaign();
    c.backer_contributes(800);
    c.backer_contributes(700);
    c.pass_deadline();

    c.client.release_funds(&c.id, &c.creator);

    assert_eq!(c.token.balance(&c.creator), 1_500);
}

#[test]
fn test_second_release_fails_and_changes_nothing() {
    let c = campaign();
    c.backer_contributes(1_000);
    c.pass_deadline();
    c.client.release_funds(&c.id, &c.creator);
    let before = c.client.get_project(&c.id);

    assert_eq!(
        c.client.try_release_funds(&c.id, &c.creator),
        Err(Ok(Error::AlreadyReleased))
    );

    let after = c.client.get_project(&c.id);
    assert_eq!(before, after);
    assert_release_permanent(&before, &after);
    assert_eq!(c.token.balance(&c.creator), 1_000);
}

#[test]
fn test_released_project_rejects_contributions_and_refunds() {
    let c = campaign();
    let backer = c.backer_contributes(1_000);
    c.pass_deadline();
    c.client.release_funds(&c.id, &c.creator);

    let late = Address::generate(&c.env);
    fund_backer(&c.env, &c.token, &c.client.address, &late, 100, 100);
    assert_eq!(
        c.client.try_contribute(&c.id, &late, &100),
        Err(Ok(Error::AlreadyReleased))
    );
    assert_eq!(
        c.client.try_refund(&c.id, &backer),
        Err(Ok(Error::AlreadyReleased))
    );
    assert_eq!(c.token.balance(&late), 100);
}

// ── Refund ───────────────────────────────────────────────────────────

#[test]
fn test_refund_before_deadline_fails() {
    let c = campaign();
    let backer = Address::generate(&c.env);

    assert_eq!(
        c.client.try_refund(&c.id, &backer),
        Err(Ok(Error::DeadlineNotReached))
    );
}

#[test]
fn test_refund_returns_contribution_when_goal_not_met() {
    let c = campaign();
    let backer = c.backer_contributes(500);
    c.pass_deadline();
    assert_eq!(c.client.project_status(&c.id), ProjectStatus::GoalNotMet);

    let refunded = c.client.refund(&c.id, &backer);

    assert_eq!(refunded, 500);
    assert_eq!(c.client.get_contribution(&c.id, &backer), 0);
    assert_eq!(c.client.get_project(&c.id).total_funded, 0);
    assert_eq!(c.token.balance(&backer), 500);
    assert_eq!(c.token.balance(&c.client.address), 0);
}

#[test]
fn test_second_refund_fails_with_nothing_to_refund() {
    let c = campaign();
    let backer = c.backer_contributes(500);
    c.pass_deadline();
    c.client.refund(&c.id, &backer);

    assert_eq!(
        c.client.try_refund(&c.id, &backer),
        Err(Ok(Error::NothingToRefund))
    );
    assert_eq!(c.token.balance(&backer), 500);
}

#[test]
fn test_refund_without_contribution_fails() {
    let c = campaign();
    c.backer_contributes(300);
    c.pass_deadline();
    let stranger = Address::generate(&c.env);

    assert_eq!(
        c.client.try_refund(&c.id, &stranger),
        Err(Ok(Error::NothingToRefund))
    );
    assert_eq!(c.client.get_project(&c.id).total_funded, 300);
}

#[test]
fn test_refund_when_goal_met_fails() {
    let c = campaign();
    let backer1 = c.backer_contributes(500);
    c.backer_contributes(500);
    c.pass_deadline();

    assert_eq!(
        c.client.try_refund(&c.id, &backer1),
        Err(Ok(Error::GoalMet))
    );
    c.client.release_funds(&c.id, &c.creator);
    assert_eq!(c.token.balance(&c.creator), 1_000);
}

#[test]
fn test_refunds_are_individual() {
    let c = campaign();
    let backer1 = c.backer_contributes(300);
    let backer2 = c.backer_contributes(200);
    c.pass_deadline();

    c.client.refund(&c.id, &backer1);

    let project = c.client.get_project(&c.id);
    assert_eq!(project.total_funded, 200);
    assert_eq!(c.client.get_contribution(&c.id, &backer2), 200);
    assert_total_matches_contributions(
        &project,
        &[(backer1.clone(), 0), (backer2.clone(), 200)],
    );

    c.client.refund(&c.id, &backer2);

    let project = c.client.get_project(&c.id);
    assert_total_matches_contributions(&project, &[(backer1, 0), (backer2, 0)]);
    assert_eq!(c.token.balance(&c.client.address), 0);
}

#[test]
fn test_refunded_project_ids_are_not_reused() {
    let c = campaign();
    let backer = c.backer_contributes(100);
    c.pass_deadline();
    c.client.refund(&c.id, &backer);

    let next = create_default_project(&c.env, &c.client, &c.creator, &c.token);

    assert_eq!(next, c.id + 1);
    assert_eq!(c.client.project_count(), 2);
}

// ── Lifecycle ────────────────────────────────────────────────────────

#[test]
fn test_late_contribution_flips_outcome_to_release() {
    let c = campaign();
    let early = c.backer_contributes(600);
    c.pass_deadline();

    let mut status = c.client.project_status(&c.id);
    assert_eq!(status, ProjectStatus::GoalNotMet);

    // The goal is judged at settlement time only.
    c.backer_contributes(400);
    let next = c.client.project_status(&c.id);
    assert_valid_status_transition(&status, &next);
    status = next;
    assert_eq!(status, ProjectStatus::GoalMet);

    assert_eq!(c.client.try_refund(&c.id, &early), Err(Ok(Error::GoalMet)));
    c.client.release_funds(&c.id, &c.creator);

    let next = c.client.project_status(&c.id);
    assert_valid_status_transition(&status, &next);
    assert_eq!(next, ProjectStatus::Released);
}

#[test]
fn test_settlement_on_unknown_project_fails() {
    let (env, client) = setup();
    let caller = Address::generate(&env);
    env.ledger().set_timestamp(10 * DAY);

    assert_eq!(
        client.try_release_funds(&3, &caller),
        Err(Ok(Error::ProjectNotFound))
    );
    assert_eq!(client.try_refund(&3, &caller), Err(Ok(Error::ProjectNotFound)));
}

// ── Payout rejected by the token ─────────────────────────────────────

/// Token that accepts deposits without moving anything and rejects every
/// payout.
#[contract]
pub struct PayoutRejectingToken;

#[contractimpl]
impl PayoutRejectingToken {
    pub fn decimals(_env: Env) -> u32 {
        7
    }

    pub fn transfer_from(
        _env: Env,
        _spender: Address,
        _from: Address,
        _to: Address,
        _amount: i128,
    ) {
    }

    pub fn transfer(_env: Env, _from: Address, _to: Address, _amount: i128) {
        panic!("payouts are frozen");
    }
}

/// Project on a [`PayoutRejectingToken`] with one backer holding `amount`.
fn frozen_campaign(
    amount: i128,
) -> (Env, CrowdfundEscrowClient<'static>, Address, Address, u64) {
    let (env, client) = setup();
    let token = env.register(PayoutRejectingToken, ());
    let creator = Address::generate(&env);
    let id = client.create_project(
        &creator,
        &creator,
        &String::from_str(&env, "Frozen"),
        &GOAL,
        &(env.ledger().timestamp() + DAY),
        &token,
    );
    let backer = Address::generate(&env);
    client.contribute(&id, &backer, &amount);
    env.ledger().set_timestamp(env.ledger().timestamp() + DAY + 1);
    (env, client, creator, backer, id)
}

#[test]
fn test_rejected_release_payout_leaves_project_unreleased() {
    let (_env, client, creator, _backer, id) = frozen_campaign(GOAL);

    assert_eq!(
        client.try_release_funds(&id, &creator),
        Err(Ok(Error::TransferFailed))
    );

    let project = client.get_project(&id);
    assert!(!project.funds_released);
    assert_eq!(project.total_funded, GOAL);
    assert_eq!(client.project_status(&id), ProjectStatus::GoalMet);
}

#[test]
fn test_rejected_refund_payout_keeps_contribution() {
    let (_env, client, _creator, backer, id) = frozen_campaign(500);
    assert_eq!(client.project_status(&id), ProjectStatus::GoalNotMet);

    assert_eq!(client.try_refund(&id, &backer), Err(Ok(Error::TransferFailed)));

    assert_eq!(client.get_contribution(&id, &backer), 500);
    assert_eq!(client.get_project(&id).total_funded, 500);
}
