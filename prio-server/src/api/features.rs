//! Feature management endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use prio_common::db::{self, NewFeature};
use prio_common::events::SessionEvent;
use prio_common::models::{Feature, ReferenceLink};
use prio_common::validation::{ensure_session_editable, validate_feature_title, validate_rating};
use serde::Deserialize;
use tracing::info;

use super::auth::require_host;
use super::load_session;
use crate::{ApiError, ApiResult, AppState};

/// Link as submitted; its type is detected from the URL
#[derive(Debug, Deserialize)]
pub struct LinkInput {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFeatureRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effort: Option<i64>,
    #[serde(default)]
    pub impact: Option<i64>,
    #[serde(default)]
    pub reference_links: Vec<LinkInput>,
}

/// POST /api/sessions/:id/features (host only, draft sessions)
pub async fn add_feature(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<AddFeatureRequest>,
) -> ApiResult<(StatusCode, Json<Feature>)> {
    let session = load_session(&state, &session_id).await?;
    require_host(&headers, &session)?;
    ensure_session_editable(&session)?;

    let title = validate_feature_title(&payload.title)?;
    validate_rating("effort", payload.effort)?;
    validate_rating("impact", payload.impact)?;

    let new = NewFeature {
        title,
        description: payload.description.filter(|d| !d.trim().is_empty()),
        effort: payload.effort,
        impact: payload.impact,
        reference_links: payload
            .reference_links
            .into_iter()
            .map(|link| ReferenceLink::new(link.url, link.title))
            .collect(),
    };

    let feature = db::add_feature(&state.db, &session_id, new).await?;
    info!("Added feature {} to session {}", feature.id, session_id);

    state.event_bus.emit_lossy(SessionEvent::FeatureAdded {
        session_id,
        feature_id: feature.id.clone(),
        title: feature.title.clone(),
        timestamp: Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(feature)))
}

/// GET /api/sessions/:id/features
pub async fn list_features(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<Feature>>> {
    load_session(&state, &session_id).await?;
    Ok(Json(db::list_features(&state.db, &session_id).await?))
}

/// DELETE /api/sessions/:id/features/:feature_id (host only, draft sessions)
pub async fn delete_feature(
    State(state): State<AppState>,
    Path((session_id, feature_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let session = load_session(&state, &session_id).await?;
    require_host(&headers, &session)?;
    ensure_session_editable(&session)?;

    if !db::delete_feature(&state.db, &session_id, &feature_id).await? {
        return Err(ApiError::NotFound(format!("Feature {}", feature_id)));
    }
    info!("Removed feature {} from session {}", feature_id, session_id);

    state.event_bus.emit_lossy(SessionEvent::FeatureRemoved {
        session_id,
        feature_id,
        timestamp: Utc::now(),
    });

    Ok(StatusCode::NO_CONTENT)
}

pub fn feature_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/sessions/:id/features",
            get(list_features).post(add_feature),
        )
        .route("/api/sessions/:id/features/:feature_id", delete(delete_feature))
}
