//! # Events
//!
//! Every observable outcome is published with the project id as the second
//! topic so watchers can filter per campaign:
//!
//! | Topic                    | Data                   |
//! |--------------------------|------------------------|
//! | `("created", id)`        | [`ProjectCreated`]     |
//! | `("funded", id)`         | [`ContributionReceived`] |
//! | `("released", id)`       | [`FundsReleased`]      |
//! | `("refunded", id)`       | [`RefundIssued`]       |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub creator: Address,
    pub token: Address,
    pub goal: i128,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionReceived {
    pub project_id: u64,
    pub backer: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsReleased {
    pub project_id: u64,
    pub creator: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundIssued {
    pub project_id: u64,
    pub backer: Address,
    pub amount: i128,
}

pub fn emit_project_created(
    env: &Env,
    project_id: u64,
    creator: Address,
    token: Address,
    goal: i128,
    deadline: u64,
) {
    env.events().publish(
        (symbol_short!("created"), project_id),
        ProjectCreated {
            project_id,
            creator,
            token,
            goal,
            deadline,
        },
    );
}

pub fn emit_contribution_received(env: &Env, project_id: u64, backer: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("funded"), project_id),
        ContributionReceived {
            project_id,
            backer,
            amount,
        },
    );
}

pub fn emit_funds_released(env: &Env, project_id: u64, creator: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("released"), project_id),
        FundsReleased {
            project_id,
            creator,
            amount,
        },
    );
}

pub fn emit_refund_issued(env: &Env, project_id: u64, backer: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"), project_id),
        RefundIssued {
            project_id,
            backer,
            amount,
        },
    );
}
