//! Session management endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use prio_common::db;
use prio_common::events::SessionEvent;
use prio_common::models::{Session, SessionStatus};
use prio_common::validation::{validate_session_name, validate_status_transition};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::require_host;
use super::load_session;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    /// Defaults to the configured budget
    #[serde(default)]
    pub points_budget: Option<u32>,
}

/// The only response that reveals the host token
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    #[serde(flatten)]
    pub session: Session,
    pub host_token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: SessionStatus,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<CreateSessionResponse>)> {
    let name = validate_session_name(&payload.name)?;
    let points_budget = payload.points_budget.unwrap_or(state.voting.points_budget);
    if points_budget == 0 {
        return Err(ApiError::BadRequest("points_budget must be positive".to_string()));
    }

    let session = db::create_session(&state.db, &name, points_budget).await?;
    info!("Created session {} ({}) with budget {}", session.id, session.name, points_budget);

    let host_token = session.host_token.clone();
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse { session, host_token }),
    ))
}

/// GET /api/sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<Vec<Session>>> {
    Ok(Json(db::list_sessions(&state.db).await?))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Session>> {
    Ok(Json(load_session(&state, &session_id).await?))
}

/// PATCH /api/sessions/:id/status (host only)
///
/// Moves draft → active → completed; other transitions are 409.
pub async fn update_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Session>> {
    let mut session = load_session(&state, &session_id).await?;
    require_host(&headers, &session)?;
    validate_status_transition(session.status, payload.status)?;

    db::update_session_status(&state.db, &session_id, payload.status).await?;
    info!("Session {} moved {} → {}", session_id, session.status, payload.status);

    state.event_bus.emit_lossy(SessionEvent::SessionStatusChanged {
        session_id: session_id.clone(),
        old_status: session.status,
        new_status: payload.status,
        timestamp: Utc::now(),
    });

    session.status = payload.status;
    Ok(Json(session))
}

/// DELETE /api/sessions/:id (host only)
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let session = load_session(&state, &session_id).await?;
    require_host(&headers, &session)?;

    db::delete_session(&state.db, &session_id).await?;
    info!("Deleted session {}", session_id);

    Ok(StatusCode::NO_CONTENT)
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route("/api/sessions/:id/status", patch(update_status))
}
