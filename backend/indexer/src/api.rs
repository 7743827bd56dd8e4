//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::IndexerError;
use crate::events::{EventRecord, ProjectSummary};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

/// All routes, without middleware layers.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/projects/:id/events", get(get_project_events))
        .route("/projects/:id/summary", get(get_project_summary))
        .route(
            "/projects/:id/backers/:backer/events",
            get(get_backer_events),
        )
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EventsResponse {
    pub project_id: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct BackerEventsResponse {
    pub project_id: String,
    pub backer: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for IndexerError {
    fn into_response(self) -> Response {
        let status = match self {
            IndexerError::InvalidProjectId(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Project ids are `u64` on chain; reject anything else before querying.
fn parse_project_id(raw: &str) -> Result<String, IndexerError> {
    raw.parse::<u64>()
        .map(|id| id.to_string())
        .map_err(|_| IndexerError::InvalidProjectId(raw.to_string()))
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /projects/:id/events`
///
/// Returns all indexed events for the given project identifier.
pub async fn get_project_events(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Result<Json<EventsResponse>, IndexerError> {
    let project_id = parse_project_id(&project_id)?;
    let events = db::get_events_for_project(&state.pool, &project_id).await?;
    Ok(Json(EventsResponse {
        project_id,
        count: events.len(),
        events,
    }))
}

/// `GET /projects/:id/summary`
///
/// Funding totals rebuilt from the project's indexed events.
pub async fn get_project_summary(
    State(state): State<Arc<ApiState>>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectSummary>, IndexerError> {
    let project_id = parse_project_id(&project_id)?;
    let events = db::get_events_for_project(&state.pool, &project_id).await?;
    Ok(Json(ProjectSummary::from_events(&project_id, &events)))
}

/// `GET /projects/:id/backers/:backer/events`
///
/// Contributions and refunds of one backer on one project.
pub async fn get_backer_events(
    State(state): State<Arc<ApiState>>,
    Path((project_id, backer)): Path<(String, String)>,
) -> Result<Json<BackerEventsResponse>, IndexerError> {
    let project_id = parse_project_id(&project_id)?;
    let events = db::get_events_for_backer(&state.pool, &project_id, &backer).await?;
    Ok(Json(BackerEventsResponse {
        project_id,
        backer,
        count: events.len(),
        events,
    }))
}

/// `GET /events`
///
/// Returns all indexed events across all projects.
pub async fn get_all_events(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<AllEventsResponse>, IndexerError> {
    let events = db::get_all_events(&state.pool).await?;
    Ok(Json(AllEventsResponse {
        count: events.len(),
        events,
    }))
}
