// contracts/crowdfund_escrow/src/lib.rs

//! # Crowdfund Escrow Contract
//!
//! All-or-nothing crowdfunding: creators register campaigns with a goal and a
//! deadline, backers contribute a single fungible token, and once the
//! deadline passes exactly one outcome opens up. Either the creator releases
//! everything (goal met) or each backer reclaims their own contribution
//! (goal not met).
//!
//! | Phase        | Entry Point(s)                                   |
//! |--------------|--------------------------------------------------|
//! | Registration | [`CrowdfundEscrow::create_project`]              |
//! | Funding      | [`CrowdfundEscrow::contribute`]                  |
//! | Settlement   | [`CrowdfundEscrow::release_funds`], [`CrowdfundEscrow::refund`] |
//! | Queries      | `get_project`, `project_count`, `get_contribution`, `project_status` |
//!
//! ## Architecture
//!
//! Registration lives in [`registry`], contribution and settlement rules in
//! [`funding`], token movements in [`ledger`] and storage layout in
//! [`storage`]. This file only authenticates callers and delegates.
//!
//! Every entry point returns `Result<_, Error>`. A returned error aborts the
//! invocation, so no partial state is ever visible.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String};

pub mod events;
mod funding;
mod ledger;
mod registry;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_settlement;

pub use types::{Project, ProjectStatus};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contribution amount is zero or negative.
    InvalidAmount = 1,
    ProjectNotFound = 2,
    /// The token contract rejected a debit or credit.
    TransferFailed = 3,
    NotProjectCreator = 4,
    DeadlineNotReached = 5,
    /// Release attempted with `total_funded < goal`.
    GoalNotMet = 6,
    /// Refund attempted with `total_funded >= goal`.
    GoalMet = 7,
    AlreadyReleased = 8,
    /// Caller has no unrefunded contribution to this project.
    NothingToRefund = 9,
    InvalidGoal = 10,
    InvalidDeadline = 11,
    /// Address does not answer the token interface.
    InvalidToken = 12,
    Overflow = 13,
}

#[contract]
pub struct CrowdfundEscrow;

#[contractimpl]
impl CrowdfundEscrow {
    // ─────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────

    /// Register a new campaign and return its ID.
    ///
    /// - `registrar` must sign; `creator` is recorded as the payout address
    ///   and may differ from `registrar`.
    /// - `goal` must be positive, `deadline` strictly after the current
    ///   ledger timestamp, and `token` a token contract.
    pub fn create_project(
        env: Env,
        registrar: Address,
        creator: Address,
        name: String,
        goal: i128,
        deadline: u64,
        token: Address,
    ) -> Result<u64, Error> {
        registrar.require_auth();
        registry::create_project(&env, creator, name, goal, deadline, token)
    }

    /// Retrieve a project by its ID.
    pub fn get_project(env: Env, id: u64) -> Result<Project, Error> {
        registry::get_project(&env, id)
    }

    /// Number of projects ever registered. IDs run from 0 to `count - 1`.
    pub fn project_count(env: Env) -> u64 {
        registry::project_count(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` of the project's token.
    ///
    /// `backer` must sign and must have approved this contract for at least
    /// `amount` on the token beforehand.
    pub fn contribute(env: Env, project_id: u64, backer: Address, amount: i128) -> Result<(), Error> {
        backer.require_auth();
        funding::contribute(&env, project_id, &backer, amount)
    }

    /// Unrefunded amount `backer` holds in `project_id`.
    pub fn get_contribution(env: Env, project_id: u64, backer: Address) -> Result<i128, Error> {
        funding::contribution_of(&env, project_id, &backer)
    }

    /// Settlement phase of the project at the current ledger time.
    pub fn project_status(env: Env, project_id: u64) -> Result<ProjectStatus, Error> {
        funding::status(&env, project_id)
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Pay all funds to the creator once the deadline has passed with the
    /// goal met. Only the creator may call this, and only once.
    pub fn release_funds(env: Env, project_id: u64, caller: Address) -> Result<(), Error> {
        caller.require_auth();
        funding::release_funds(&env, project_id, &caller)
    }

    /// Reclaim the caller's own contribution once the deadline has passed
    /// without the goal being met. Returns the amount refunded.
    pub fn refund(env: Env, project_id: u64, backer: Address) -> Result<i128, Error> {
        backer.require_auth();
        funding::refund(&env, project_id, &backer)
    }
}
