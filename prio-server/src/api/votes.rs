//! Vote submission endpoint

use axum::{
    extract::{Path, State},
    routing::put,
    Json, Router,
};
use chrono::Utc;
use prio_common::db;
use prio_common::events::SessionEvent;
use prio_common::validation::{validate_allocation, PointAllocation};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::load_session;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SubmitVotesRequest {
    pub allocations: Vec<PointAllocation>,
}

#[derive(Debug, Serialize)]
pub struct SubmitVotesResponse {
    pub player_id: String,
    pub points_allocated: u64,
    pub points_remaining: u64,
}

/// PUT /api/sessions/:id/players/:player_id/votes
///
/// Replaces the player's whole allocation. The session must be active and
/// the total must fit within its point budget.
pub async fn submit_votes(
    State(state): State<AppState>,
    Path((session_id, player_id)): Path<(String, String)>,
    Json(payload): Json<SubmitVotesRequest>,
) -> ApiResult<Json<SubmitVotesResponse>> {
    let session = load_session(&state, &session_id).await?;
    db::get_player(&state.db, &session_id, &player_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Player {}", player_id)))?;

    // Only players that exist get a limiter bucket
    if !state.vote_limiter.check(&player_id) {
        return Err(ApiError::TooManyRequests(
            "Vote submitted too often, try again shortly".to_string(),
        ));
    }

    let features = db::list_features(&state.db, &session_id).await?;
    let allocation = validate_allocation(&session, &features, &payload.allocations)?;

    db::replace_allocation(&state.db, &session_id, &player_id, &allocation).await?;

    let points_allocated: u64 = allocation.iter().map(|a| u64::from(a.points)).sum();
    info!(
        "Player {} allocated {} of {} points in session {}",
        player_id, points_allocated, session.points_budget, session_id
    );

    state.event_bus.emit_lossy(SessionEvent::VoteSubmitted {
        session_id,
        player_id: player_id.clone(),
        points_allocated,
        timestamp: Utc::now(),
    });

    Ok(Json(SubmitVotesResponse {
        player_id,
        points_allocated,
        points_remaining: u64::from(session.points_budget).saturating_sub(points_allocated),
    }))
}

pub fn vote_routes() -> Router<AppState> {
    Router::new().route(
        "/api/sessions/:id/players/:player_id/votes",
        put(submit_votes),
    )
}
