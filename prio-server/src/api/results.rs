//! Results, consensus and export endpoints
//!
//! Each request fetches the session's rows and recomputes from scratch.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prio_common::db;
use prio_common::export::{records_to_csv, results_to_csv};
use prio_common::scoring::{
    aggregate_votes, analyze_role_voting, calculate_consensus_metrics, AggregatedResults,
    ConsensusMetrics, VotingAnalysisResponse,
};
use tracing::debug;

use super::load_session;
use crate::{ApiResult, AppState};

async fn load_results(state: &AppState, session_id: &str) -> ApiResult<AggregatedResults> {
    load_session(state, session_id).await?;
    let features = db::list_features(&state.db, session_id).await?;
    let votes = db::list_votes(&state.db, session_id).await?;
    Ok(AggregatedResults::new(&features, &votes))
}

/// GET /api/sessions/:id/results
pub async fn get_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<AggregatedResults>> {
    let results = load_results(&state, &session_id).await?;
    debug!(
        "Session {}: {} features ranked from {} votes",
        session_id,
        results.results.len(),
        results.total_votes
    );
    Ok(Json(results))
}

/// GET /api/sessions/:id/consensus
pub async fn get_consensus(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ConsensusMetrics>> {
    let results = load_results(&state, &session_id).await?;
    let metrics = calculate_consensus_metrics(&results.results);
    debug!("Session {}: team alignment {}", session_id, metrics.team_alignment);
    Ok(Json(metrics))
}

/// GET /api/sessions/:id/voting-analysis
pub async fn get_voting_analysis(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<VotingAnalysisResponse>> {
    load_session(&state, &session_id).await?;
    let rows = db::list_votes_with_context(&state.db, &session_id).await?;
    let analysis = analyze_role_voting(&rows);
    debug!(
        "Session {}: {} roles, consensus score {:.1}",
        session_id,
        analysis.role_profiles.len(),
        analysis.consensus_score
    );
    Ok(Json(analysis))
}

/// GET /api/sessions/:id/export.csv
pub async fn export_results_csv(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Response> {
    let session = load_session(&state, &session_id).await?;
    let features = db::list_features(&state.db, &session_id).await?;
    let votes = db::list_votes(&state.db, &session_id).await?;
    let csv = results_to_csv(&aggregate_votes(&features, &votes));

    Ok(csv_attachment(csv, &format!("{}-results.csv", file_stem(&session.name))))
}

/// GET /api/sessions/:id/votes/export.csv
pub async fn export_votes_csv(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Response> {
    let session = load_session(&state, &session_id).await?;
    let rows = db::list_votes_with_context(&state.db, &session_id).await?;

    Ok(csv_attachment(records_to_csv(&rows), &format!("{}-votes.csv", file_stem(&session.name))))
}

fn csv_attachment(body: String, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Session name reduced to characters safe in a download filename
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.trim_matches('_').is_empty() {
        "session".to_string()
    } else {
        stem
    }
}

pub fn results_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions/:id/results", get(get_results))
        .route("/api/sessions/:id/consensus", get(get_consensus))
        .route("/api/sessions/:id/voting-analysis", get(get_voting_analysis))
        .route("/api/sessions/:id/export.csv", get(export_results_csv))
        .route("/api/sessions/:id/votes/export.csv", get(export_votes_csv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Q3 roadmap"), "Q3_roadmap");
        assert_eq!(file_stem("team-a_v2"), "team-a_v2");
        assert_eq!(file_stem("\"; rm"), "___rm");
        assert_eq!(file_stem("   "), "session");
    }
}
