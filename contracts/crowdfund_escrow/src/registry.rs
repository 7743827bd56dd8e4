//! # Project registry
//!
//! Append-only list of campaigns. IDs are handed out sequentially from the
//! instance counter and never reused; a project is never updated or deleted
//! apart from its funding state.

use soroban_sdk::{Address, Env, String};

use crate::events;
use crate::ledger;
use crate::storage::{self, get_and_increment_project_id, save_project};
use crate::types::{Project, ProjectConfig};
use crate::Error;

/// Validate and store a new project, returning its ID.
///
/// Nothing is written unless every check passes.
pub fn create_project(
    env: &Env,
    creator: Address,
    name: String,
    goal: i128,
    deadline: u64,
    token: Address,
) -> Result<u64, Error> {
    if goal <= 0 {
        return Err(Error::InvalidGoal);
    }
    if deadline <= env.ledger().timestamp() {
        return Err(Error::InvalidDeadline);
    }
    if !ledger::is_usable(env, &token) {
        return Err(Error::InvalidToken);
    }

    let id = get_and_increment_project_id(env)?;

    let config = ProjectConfig {
        id,
        creator: creator.clone(),
        name,
        token: token.clone(),
        goal,
        deadline,
    };
    save_project(env, &config);

    events::emit_project_created(env, id, creator, token, goal, deadline);
    Ok(id)
}

pub fn get_project(env: &Env, id: u64) -> Result<Project, Error> {
    storage::load_project(env, id)
}

pub fn project_count(env: &Env) -> u64 {
    storage::project_count(env)
}
