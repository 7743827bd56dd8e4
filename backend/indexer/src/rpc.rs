//! Soroban RPC client — polls `getEvents` and decodes escrow events.
//!
//! ## Resilience
//!
//! * Transport errors, HTTP 429 and soft JSON-RPC errors are retried with
//!   exponential back-off, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Malformed-request errors (`-32600`..`-32602`) are returned to the caller.
//!
//! ## Decoding
//!
//! Topics and values arrive as base64 XDR `ScVal`s (see [`crate::xdr`]).
//! The escrow publishes four events, each with `(symbol, project_id)` topics.
//! Anything else from the contract decodes as [`EventKind::Unknown`] and is
//! still stored so nothing is silently lost. Events whose topics are not
//! valid XDR are logged and skipped.

use std::time::Duration;

use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use stellar_xdr::curr::ScVal;
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EscrowEvent, EventKind};
use crate::xdr;

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Base64 XDR `ScVal` per topic
    pub topic: Vec<String>,
    /// Base64 XDR `ScVal`, bare or wrapped as `{"xdr": …}`
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

/// One page of `getEvents` output.
#[derive(Debug)]
pub struct EventsPage {
    pub events: Vec<RawEvent>,
    /// Opaque cursor to continue from, if the RPC returned one.
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// Doubling retry delay, capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Backoff {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    fn secs(&self) -> u64 {
        self.secs
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

/// JSON-RPC codes that will not succeed on retry.
fn is_hard_error(code: i64) -> bool {
    matches!(code, -32600 | -32601 | -32602)
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of escrow events from the RPC, retrying transient failures.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive); ignored
///   when `cursor` is set.
/// * `cursor`       — optional opaque pagination cursor from a previous page.
/// * `limit`        — maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventsPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs());
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.secs());
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs(),
                err.code,
                err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            events = result.events.len(),
            latest_ledger = ?result.latest_ledger,
            "fetched getEvents page"
        );

        return Ok(EventsPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`EscrowEvent`] structs.
///
/// Events from failed contract calls are dropped; their effects were rolled back.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<EscrowEvent> {
    raw.iter()
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<EscrowEvent> {
    if raw.in_successful_contract_call == Some(false) {
        return None;
    }

    let Some(event_id) = raw.id.clone().or_else(|| raw.paging_token.clone()) else {
        warn!(tx = ?raw.tx_hash, "event without id skipped");
        return None;
    };

    let topics = match raw
        .topic
        .iter()
        .map(|t| xdr::decode_base64(t))
        .collect::<Result<Vec<ScVal>>>()
    {
        Ok(topics) => topics,
        Err(e) => {
            warn!(id = %event_id, "undecodable event topic skipped: {e}");
            return None;
        }
    };

    let kind = topics
        .first()
        .and_then(xdr::as_symbol)
        .map(|sym| EventKind::from_topic(&sym))
        .unwrap_or(EventKind::Unknown);
    let project_id = topics.get(1).and_then(xdr::as_u64).map(|id| id.to_string());

    let (actor, amount) = match value_xdr(&raw.value).map(xdr::decode_base64) {
        Some(Ok(data)) => decode_data(&data, &kind),
        Some(Err(e)) => {
            warn!(id = %event_id, "undecodable event value: {e}");
            (None, None)
        }
        None => (None, None),
    };

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    Some(EscrowEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        project_id,
        actor,
        amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// The value is a bare base64 string; older RPC versions wrap it as `{"xdr": …}`.
fn value_xdr(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("xdr").and_then(Value::as_str),
        _ => None,
    }
}

/// Actor and amount from the event's struct payload.
fn decode_data(data: &ScVal, kind: &EventKind) -> (Option<String>, Option<String>) {
    let (actor_field, amount_field) = match kind {
        EventKind::ProjectCreated => ("creator", "goal"),
        EventKind::ContributionReceived | EventKind::RefundIssued => ("backer", "amount"),
        EventKind::FundsReleased => ("creator", "amount"),
        EventKind::Unknown => return (None, None),
    };
    let actor = xdr::field(data, actor_field).and_then(xdr::as_address);
    let amount = xdr::field(data, amount_field)
        .and_then(xdr::as_i128)
        .map(|n| n.to_string());
    (actor, amount)
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
