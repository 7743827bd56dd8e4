//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the escrow:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key              | Type      | Description                        |
//! |------------------|-----------|------------------------------------|
//! | `ProjectCount`   | `u64`     | Next project ID, starts at 0       |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                        | Type            | Description                     |
//! |----------------------------|-----------------|---------------------------------|
//! | `ProjConfig(id)`           | `ProjectConfig` | Immutable project configuration |
//! | `ProjState(id)`            | `ProjectState`  | Mutable funding state           |
//! | `Contribution(id, backer)` | `i128`          | Unrefunded amount per backer    |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! Contributions live in a flat map keyed by `(project, backer)` rather than a
//! per-project vector, so a contribution or refund touches one small entry.
//! A refunded contribution is removed; a missing entry reads as zero.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{Project, ProjectConfig, ProjectState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Global auto-increment counter for project IDs (Instance).
    ProjectCount,
    /// Immutable project configuration keyed by ID (Persistent).
    ProjConfig(u64),
    /// Mutable project state keyed by ID (Persistent).
    ProjState(u64),
    /// Unrefunded contribution of one backer to one project (Persistent).
    Contribution(u64, Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Reads, increments, and stores the project counter.
/// Returns the ID to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> Result<u64, Error> {
    bump_instance(env);
    let current = project_count(env);
    let next = current.checked_add(1).ok_or(Error::Overflow)?;
    env.storage().instance().set(&DataKey::ProjectCount, &next);
    Ok(current)
}

/// Number of project IDs issued so far.
pub fn project_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Save the immutable config and the initial (empty) state of a new project.
pub fn save_project(env: &Env, config: &ProjectConfig) {
    let config_key = DataKey::ProjConfig(config.id);
    let state_key = DataKey::ProjState(config.id);

    env.storage().persistent().set(&config_key, config);
    env.storage()
        .persistent()
        .set(&state_key, &ProjectState::default());
    bump_persistent(env, &config_key);
    bump_persistent(env, &state_key);
}

/// Load the full `Project` by combining config and state.
pub fn load_project(env: &Env, id: u64) -> Result<Project, Error> {
    let (config, state) = load_project_pair(env, id)?;
    Ok(Project::from_parts(config, state))
}

/// Load config and state together; every mutating entry point needs both.
pub fn load_project_pair(env: &Env, id: u64) -> Result<(ProjectConfig, ProjectState), Error> {
    Ok((load_project_config(env, id)?, load_project_state(env, id)?))
}

pub fn load_project_config(env: &Env, id: u64) -> Result<ProjectConfig, Error> {
    let key = DataKey::ProjConfig(id);
    let config: ProjectConfig = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::ProjectNotFound)?;
    bump_persistent(env, &key);
    Ok(config)
}

pub fn load_project_state(env: &Env, id: u64) -> Result<ProjectState, Error> {
    let key = DataKey::ProjState(id);
    let state: ProjectState = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::ProjectNotFound)?;
    bump_persistent(env, &key);
    Ok(state)
}

/// Save only the mutable project state.
pub fn save_project_state(env: &Env, id: u64, state: &ProjectState) {
    let key = DataKey::ProjState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

// ── Contributions ────────────────────────────────────────────────────

/// Unrefunded amount `backer` has put into `project_id`; zero when absent.
pub fn get_contribution(env: &Env, project_id: u64, backer: &Address) -> i128 {
    let key = DataKey::Contribution(project_id, backer.clone());
    let amount: Option<i128> = env.storage().persistent().get(&key);
    match amount {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

pub fn set_contribution(env: &Env, project_id: u64, backer: &Address, amount: i128) {
    let key = DataKey::Contribution(project_id, backer.clone());
    env.storage().persistent().set(&key, &amount);
    bump_persistent(env, &key);
}

/// Drop the entry entirely; later reads return zero.
pub fn clear_contribution(env: &Env, project_id: u64, backer: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Contribution(project_id, backer.clone()));
}
