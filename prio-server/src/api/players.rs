//! Participant endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use prio_common::db;
use prio_common::events::SessionEvent;
use prio_common::models::{Player, SessionStatus};
use prio_common::validation::validate_player_name;
use prio_common::ValidationError;
use serde::Deserialize;
use tracing::info;

use super::load_session;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// POST /api/sessions/:id/players
///
/// Anyone may join until the session is completed.
pub async fn join_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(payload): Json<JoinRequest>,
) -> ApiResult<(StatusCode, Json<Player>)> {
    let session = load_session(&state, &session_id).await?;
    if session.status == SessionStatus::Completed {
        return Err(ValidationError::SessionNotAcceptingVotes {
            status: session.status.to_string(),
        }
        .into());
    }

    let name = validate_player_name(&payload.name)?;
    let role = payload
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let player = db::join_session(&state.db, &session_id, &name, role).await?;
    info!("Player {} joined session {}", player.id, session_id);

    state.event_bus.emit_lossy(SessionEvent::PlayerJoined {
        session_id,
        player_id: player.id.clone(),
        name: player.name.clone(),
        role: player.role.clone(),
        timestamp: Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(player)))
}

/// GET /api/sessions/:id/players
pub async fn list_players(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<Player>>> {
    load_session(&state, &session_id).await?;
    Ok(Json(db::list_players(&state.db, &session_id).await?))
}

pub fn player_routes() -> Router<AppState> {
    Router::new().route(
        "/api/sessions/:id/players",
        get(list_players).post(join_session),
    )
}
