//! HTTP API handlers for prio-server

pub mod auth;
pub mod events;
pub mod features;
pub mod health;
pub mod players;
pub mod results;
pub mod sessions;
pub mod votes;

pub use events::event_routes;
pub use features::feature_routes;
pub use health::health_routes;
pub use players::player_routes;
pub use results::results_routes;
pub use sessions::session_routes;
pub use votes::vote_routes;

use prio_common::db;
use prio_common::models::Session;

use crate::{ApiError, ApiResult, AppState};

/// Load a session or fail with 404
pub(crate) async fn load_session(state: &AppState, session_id: &str) -> ApiResult<Session> {
    db::get_session(&state.db, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Session {}", session_id)))
}
