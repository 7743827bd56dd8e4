//! # Funding state machine
//!
//! Contribution acceptance and settlement for one project at a time.
//!
//! Every entry point follows the same shape: load, check every precondition,
//! write bookkeeping, and only then call the token contract. The token call is
//! the one place control leaves this contract, so the released flag and the
//! zeroed contribution are already persisted when it happens. A re-entrant
//! `release_funds` or `refund` therefore sees the settled state and fails.
//!
//! `contribute` is the exception to that ordering: the pull has to succeed
//! before there is anything to record. If it fails nothing has been written.

use soroban_sdk::{Address, Env};

use crate::events;
use crate::ledger;
use crate::storage::{
    clear_contribution, get_contribution, load_project_pair, save_project_state, set_contribution,
};
use crate::types::ProjectStatus;
use crate::Error;

/// Pull `amount` from `backer` and credit it to the project and the backer.
///
/// Accepted at any time until the project is released; there is no cap at
/// the goal and none per backer.
pub fn contribute(env: &Env, project_id: u64, backer: &Address, amount: i128) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }

    let (config, mut state) = load_project_pair(env, project_id)?;
    if state.funds_released {
        return Err(Error::AlreadyReleased);
    }

    let held = get_contribution(env, project_id, backer);
    let new_held = held.checked_add(amount).ok_or(Error::Overflow)?;
    let new_total = state
        .total_funded
        .checked_add(amount)
        .ok_or(Error::Overflow)?;

    ledger::debit(env, &config.token, backer, amount)?;

    state.total_funded = new_total;
    save_project_state(env, project_id, &state);
    set_contribution(env, project_id, backer, new_held);

    events::emit_contribution_received(env, project_id, backer.clone(), amount);
    Ok(())
}

/// Pay the full `total_funded` out to the creator.
pub fn release_funds(env: &Env, project_id: u64, caller: &Address) -> Result<(), Error> {
    let (config, mut state) = load_project_pair(env, project_id)?;

    if *caller != config.creator {
        return Err(Error::NotProjectCreator);
    }
    if env.ledger().timestamp() < config.deadline {
        return Err(Error::DeadlineNotReached);
    }
    if state.total_funded < config.goal {
        return Err(Error::GoalNotMet);
    }
    if state.funds_released {
        return Err(Error::AlreadyReleased);
    }

    // Flag first: the payout below must find this project already closed.
    state.funds_released = true;
    save_project_state(env, project_id, &state);

    let amount = state.total_funded;
    ledger::credit(env, &config.token, &config.creator, amount)?;

    events::emit_funds_released(env, project_id, config.creator, amount);
    Ok(())
}

/// Return the caller's whole contribution after a failed campaign.
///
/// Returns the amount refunded.
pub fn refund(env: &Env, project_id: u64, backer: &Address) -> Result<i128, Error> {
    let (config, mut state) = load_project_pair(env, project_id)?;

    if state.funds_released {
        return Err(Error::AlreadyReleased);
    }
    if env.ledger().timestamp() < config.deadline {
        return Err(Error::DeadlineNotReached);
    }
    if state.total_funded >= config.goal {
        return Err(Error::GoalMet);
    }

    let amount = get_contribution(env, project_id, backer);
    if amount <= 0 {
        return Err(Error::NothingToRefund);
    }

    // Zero the claim before paying it so a second call finds nothing.
    clear_contribution(env, project_id, backer);
    state.total_funded = state
        .total_funded
        .checked_sub(amount)
        .ok_or(Error::Overflow)?;
    save_project_state(env, project_id, &state);

    ledger::credit(env, &config.token, backer, amount)?;

    events::emit_refund_issued(env, project_id, backer.clone(), amount);
    Ok(amount)
}

pub fn status(env: &Env, project_id: u64) -> Result<ProjectStatus, Error> {
    let (config, state) = load_project_pair(env, project_id)?;
    Ok(state.status(&config, env.ledger().timestamp()))
}

pub fn contribution_of(env: &Env, project_id: u64, backer: &Address) -> Result<i128, Error> {
    // Surface unknown projects instead of reading them as "never contributed".
    load_project_pair(env, project_id)?;
    Ok(get_contribution(env, project_id, backer))
}
