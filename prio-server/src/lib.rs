//! prio-server library - workshop prioritization HTTP service
//!
//! Hosts voting sessions: participants join, allocate points to features,
//! and read back rankings, consensus metrics and CSV reports.

use axum::Router;
use prio_common::config::VotingConfig;
use prio_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod rate_limit;

pub use crate::error::{ApiError, ApiResult};
use crate::rate_limit::VoteRateLimiter;

/// Buffered events per SSE subscriber before the oldest are dropped
const EVENT_BUS_CAPACITY: usize = 256;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Session events for SSE subscribers
    pub event_bus: EventBus,
    /// Budget for new sessions and submission quota
    pub voting: VotingConfig,
    pub vote_limiter: Arc<VoteRateLimiter>,
}

impl AppState {
    pub fn new(db: SqlitePool, voting: VotingConfig) -> Self {
        let vote_limiter = Arc::new(VoteRateLimiter::per_minute(voting.votes_per_minute));
        Self {
            db,
            event_bus: EventBus::new(EVENT_BUS_CAPACITY),
            voting,
            vote_limiter,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::session_routes())
        .merge(api::feature_routes())
        .merge(api::player_routes())
        .merge(api::vote_routes())
        .merge(api::results_routes())
        .merge(api::event_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
