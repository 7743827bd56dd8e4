//! # Types
//!
//! Shared data structures used across all modules of the escrow contract.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A `Project` is internally stored as two separate ledger entries:
//!
//! - [`ProjectConfig`] — written once at registration; never mutated.
//! - [`ProjectState`] — written on every contribution, release and refund.
//!
//! The public API exposes the reconstructed [`Project`] struct for convenience.
//!
//! ### Status is derived, not stored
//!
//! [`ProjectStatus`] is computed on demand from the stored state and the
//! current ledger timestamp:
//!
//! ```text
//! Open ──(deadline)──► GoalMet ──(release)──► Released
//!   └───(deadline)──► GoalNotMet
//! ```
//!
//! `GoalNotMet` has no project-wide terminal state: each backer moves their
//! own contribution from held to refunded.

use soroban_sdk::{contracttype, Address, String};

/// Settlement phase of a project at a given ledger time.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProjectStatus {
    /// Deadline not reached; accepting contributions.
    Open,
    /// Deadline reached with `total_funded >= goal`; the creator may release.
    GoalMet,
    /// Deadline reached with `total_funded < goal`; backers may refund.
    GoalNotMet,
    /// Funds paid out to the creator. Terminal.
    Released,
}

/// Immutable project configuration, written once at registration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub creator: Address,
    pub name: String,
    pub token: Address,
    pub goal: i128,
    pub deadline: u64,
}

/// Mutable project state, updated by contributions and settlement.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProjectState {
    pub total_funded: i128,
    pub funds_released: bool,
}

impl ProjectState {
    /// Derive the settlement phase against the goal and deadline in `config`.
    pub fn status(&self, config: &ProjectConfig, now: u64) -> ProjectStatus {
        if self.funds_released {
            ProjectStatus::Released
        } else if now < config.deadline {
            ProjectStatus::Open
        } else if self.total_funded >= config.goal {
            ProjectStatus::GoalMet
        } else {
            ProjectStatus::GoalNotMet
        }
    }
}

/// Full on-chain representation of a funding campaign.
///
/// Used as the public API return type; reconstructed internally from
/// the split `ProjectConfig` + `ProjectState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Sequential identifier, starting at 0.
    pub id: u64,
    /// Address entitled to receive released funds.
    pub creator: Address,
    /// Descriptive label.
    pub name: String,
    /// Token contract holding the funding asset.
    pub token: Address,
    /// Target amount in token units.
    pub goal: i128,
    /// Ledger timestamp from which settlement is possible.
    pub deadline: u64,
    /// Sum of all contributions not yet refunded.
    pub total_funded: i128,
    /// Set once the creator has been paid out.
    pub funds_released: bool,
}

impl Project {
    pub(crate) fn from_parts(config: ProjectConfig, state: ProjectState) -> Self {
        Project {
            id: config.id,
            creator: config.creator,
            name: config.name,
            token: config.token,
            goal: config.goal,
            deadline: config.deadline,
            total_funded: state.total_funded,
            funds_released: state.funds_released,
        }
    }
}
