//! Canonical event types emitted by the crowdfund escrow contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/crowdfund_escrow/src/events.rs`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the escrow contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new project was registered (`created` topic).
    ProjectCreated,
    /// A backer contributed to a project (`funded` topic).
    ContributionReceived,
    /// The creator was paid out (`released` topic).
    FundsReleased,
    /// A backer reclaimed their contribution (`refunded` topic).
    RefundIssued,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::ProjectCreated,
            "funded" => Self::ContributionReceived,
            "released" => Self::FundsReleased,
            "refunded" => Self::RefundIssued,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::ContributionReceived => "contribution_received",
            Self::FundsReleased => "funds_released",
            Self::RefundIssued => "refund_issued",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        match s {
            "project_created" => Self::ProjectCreated,
            "contribution_received" => Self::ContributionReceived,
            "funds_released" => Self::FundsReleased,
            "refund_issued" => Self::RefundIssued,
            _ => Self::Unknown,
        }
    }
}

/// A fully decoded escrow event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowEvent {
    /// RPC event id (`<toid>-<index>`), unique per emitted event.
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    /// Creator for `created`/`released`, backer for `funded`/`refunded`.
    pub actor: Option<String>,
    /// Goal for `created`, otherwise the amount moved.
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Off-chain view of one project's accounting, rebuilt from its events.
///
/// `net_funded` tracks the contract's `total_funded` as long as every event
/// for the project has been indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub creator: Option<String>,
    pub goal: Option<i128>,
    pub total_contributed: i128,
    pub total_refunded: i128,
    pub net_funded: i128,
    pub released: bool,
    /// Backers whose contribution has not been refunded.
    pub active_backers: usize,
    pub event_count: usize,
}

impl ProjectSummary {
    /// Fold a project's events, in ledger order, into a summary.
    pub fn from_events(project_id: &str, events: &[EventRecord]) -> Self {
        let mut summary = ProjectSummary {
            project_id: project_id.to_string(),
            ..Default::default()
        };
        let mut held: BTreeMap<&str, i128> = BTreeMap::new();

        for ev in events {
            let amount = ev
                .amount
                .as_deref()
                .and_then(|a| a.parse::<i128>().ok())
                .unwrap_or(0);

            match EventKind::from_stored(&ev.event_type) {
                EventKind::ProjectCreated => {
                    summary.creator = ev.actor.clone();
                    summary.goal = Some(amount);
                }
                EventKind::ContributionReceived => {
                    summary.total_contributed += amount;
                    if let Some(backer) = ev.actor.as_deref() {
                        *held.entry(backer).or_insert(0) += amount;
                    }
                }
                EventKind::RefundIssued => {
                    summary.total_refunded += amount;
                    if let Some(backer) = ev.actor.as_deref() {
                        held.remove(backer);
                    }
                }
                EventKind::FundsReleased => summary.released = true,
                EventKind::Unknown => {}
            }
            summary.event_count += 1;
        }

        summary.net_funded = summary.total_contributed - summary.total_refunded;
        summary.active_backers = held.values().filter(|v| **v > 0).count();
        summary
    }
}
