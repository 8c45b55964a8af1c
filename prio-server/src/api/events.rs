//! Server-Sent Events for live session updates

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use std::convert::Infallible;

use super::load_session;
use crate::{ApiResult, AppState};

/// GET /api/sessions/:id/events
///
/// Streams VoteSubmitted, SessionStatusChanged, PlayerJoined, FeatureAdded
/// and FeatureRemoved for this session.
pub async fn session_event_stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    load_session(&state, &session_id).await?;
    Ok(prio_common::sse::create_session_sse_stream(
        &state.event_bus,
        session_id,
    ))
}

pub fn event_routes() -> Router<AppState> {
    Router::new().route("/api/sessions/:id/events", get(session_event_stream))
}
