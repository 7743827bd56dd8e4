//! Long-running background task that polls the Soroban RPC and writes
//! decoded escrow events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next poll starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ledger: u32,
    pub cursor: Option<String>,
}

/// Run the poll loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!(contract = %state.config.contract_id, "indexer starting");

    let mut position = resume_position(&state).await;
    info!(ledger = position.ledger, "resuming");

    loop {
        match poll_once(&state.pool, &state.client, &state.config, &position).await {
            Ok(next) => position = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!(ledger = position.ledger, "indexer stopped");
                return;
            }
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }
}

/// Load the cursor from the DB; fall back to the configured start ledger.
async fn resume_position(state: &IndexerState) -> Position {
    let last_ledger = db::get_last_ledger(&state.pool).await.unwrap_or_else(|e| {
        warn!("could not read saved ledger, starting fresh: {e}");
        0
    });
    let cursor = db::get_cursor_string(&state.pool).await.unwrap_or(None);

    let ledger = u32::try_from(last_ledger)
        .ok()
        .filter(|l| *l > 0)
        .unwrap_or(state.config.start_ledger);
    Position { ledger, cursor }
}

/// Perform a single poll iteration and persist where the next one starts.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    position: &Position,
) -> crate::errors::Result<Position> {
    let page = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            raw = page.events.len(),
            stored = inserted,
            "polled escrow events"
        );
    }

    let next = advance(position, page.cursor, page.latest_ledger);

    // Persist so restarts are deterministic.
    db::save_cursor(pool, i64::from(next.ledger), next.cursor.as_deref()).await?;

    Ok(next)
}

/// Compute the next position from a page's cursor and latest ledger.
///
/// The ledger never moves backwards; the cursor, when present, takes over
/// pagination on the next request.
fn advance(position: &Position, cursor: Option<String>, latest_ledger: Option<u64>) -> Position {
    let ledger = latest_ledger
        .and_then(|l| u32::try_from(l).ok())
        .map(|l| l.max(position.ledger))
        .unwrap_or(position.ledger);
    Position { ledger, cursor }
}
