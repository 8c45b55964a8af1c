//! Integration tests for database initialization and queries
//!
//! Tests cover:
//! - Schema creation on a new file and reopening an existing one
//! - Session, feature, player and vote round trips
//! - Allocation replacement and cascade deletes
//! - Aggregation over rows read back from storage

use prio_common::db::{
    add_feature, create_session, delete_feature, delete_session, get_player, get_session,
    init_database, init_memory_database, join_session, list_features, list_players,
    list_sessions, list_votes, list_votes_with_context, replace_allocation,
    update_session_status, NewFeature,
};
use prio_common::models::{ReferenceLink, Session, SessionStatus};
use prio_common::scoring::aggregate_votes;
use prio_common::validation::PointAllocation;
use prio_common::{Error, ValidationError};
use sqlx::SqlitePool;

fn alloc(feature_id: &str, points: u32) -> PointAllocation {
    PointAllocation {
        feature_id: feature_id.to_string(),
        points,
    }
}

/// Session already opened for voting
async fn active_session(pool: &SqlitePool, name: &str) -> Session {
    let session = create_session(pool, name, 100).await.unwrap();
    update_session_status(pool, &session.id, SessionStatus::Active)
        .await
        .unwrap();
    session
}

fn new_feature(title: &str) -> NewFeature {
    NewFeature {
        title: title.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_database_created_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("prio.db");

    let pool = init_database(&db_path).await.expect("init should create the file");
    assert!(db_path.exists());

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('sessions', 'features', 'players', 'votes')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 4);
}

#[tokio::test]
async fn test_database_reopens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("prio.db");

    let pool = init_database(&db_path).await.unwrap();
    let session = create_session(&pool, "Persisted", 100).await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.expect("reopen should succeed");
    let loaded = get_session(&pool, &session.id).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Persisted");
    assert_eq!(loaded.host_token, session.host_token);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let pool = init_memory_database().await.unwrap();

    let session = create_session(&pool, "Q3 roadmap", 100).await.unwrap();
    assert_eq!(session.status, SessionStatus::Draft);
    assert!(!session.host_token.is_empty());

    update_session_status(&pool, &session.id, SessionStatus::Active)
        .await
        .unwrap();
    let loaded = get_session(&pool, &session.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SessionStatus::Active);
    assert_eq!(loaded.points_budget, 100);

    assert_eq!(list_sessions(&pool).await.unwrap().len(), 1);

    assert!(matches!(
        update_session_status(&pool, "missing", SessionStatus::Active).await,
        Err(Error::NotFound(_))
    ));

    assert!(delete_session(&pool, &session.id).await.unwrap());
    assert!(get_session(&pool, &session.id).await.unwrap().is_none());
    assert!(!delete_session(&pool, &session.id).await.unwrap());
}

#[tokio::test]
async fn test_features_round_trip() {
    let pool = init_memory_database().await.unwrap();
    let session = create_session(&pool, "Features", 100).await.unwrap();

    let mut input = new_feature("Dark mode");
    input.effort = Some(3);
    input.impact = Some(9);
    input.reference_links = vec![ReferenceLink::new("https://github.com/org/repo/issues/1", None)];
    let dark = add_feature(&pool, &session.id, input).await.unwrap();
    let sso = add_feature(&pool, &session.id, new_feature("SSO")).await.unwrap();

    let features = list_features(&pool, &session.id).await.unwrap();
    assert_eq!(features, vec![dark.clone(), sso.clone()]);
    assert_eq!(features[0].reference_links.len(), 1);

    assert!(delete_feature(&pool, &session.id, &sso.id).await.unwrap());
    assert!(!delete_feature(&pool, "other-session", &dark.id).await.unwrap());
    assert_eq!(list_features(&pool, &session.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_out_of_range_rating_rejected_by_schema() {
    let pool = init_memory_database().await.unwrap();
    let session = create_session(&pool, "Ratings", 100).await.unwrap();

    let mut input = new_feature("Too big");
    input.effort = Some(11);
    assert!(matches!(
        add_feature(&pool, &session.id, input).await,
        Err(Error::Database(_))
    ));
}

#[tokio::test]
async fn test_players_join_and_list() {
    let pool = init_memory_database().await.unwrap();
    let session = create_session(&pool, "Players", 100).await.unwrap();

    let ana = join_session(&pool, &session.id, "Ana", Some("Designer")).await.unwrap();
    let bo = join_session(&pool, &session.id, "Bo", None).await.unwrap();

    let players = list_players(&pool, &session.id).await.unwrap();
    assert_eq!(players, vec![ana.clone(), bo]);

    let loaded = get_player(&pool, &session.id, &ana.id).await.unwrap().unwrap();
    assert_eq!(loaded.role.as_deref(), Some("Designer"));
    assert!(get_player(&pool, "other", &ana.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_allocation_replaced_not_appended() {
    let pool = init_memory_database().await.unwrap();
    let session = active_session(&pool, "Votes").await;
    let a = add_feature(&pool, &session.id, new_feature("A")).await.unwrap();
    let b = add_feature(&pool, &session.id, new_feature("B")).await.unwrap();
    let player = join_session(&pool, &session.id, "Ana", None).await.unwrap();

    replace_allocation(&pool, &session.id, &player.id, &[alloc(&a.id, 70), alloc(&b.id, 30)])
        .await
        .unwrap();
    replace_allocation(&pool, &session.id, &player.id, &[alloc(&b.id, 100)])
        .await
        .unwrap();

    let votes = list_votes(&pool, &session.id).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].feature_id, b.id);
    assert_eq!(votes[0].points_allocated, 100);
}

#[tokio::test]
async fn test_votes_with_context_and_aggregation() {
    let pool = init_memory_database().await.unwrap();
    let session = active_session(&pool, "Context").await;
    let a = add_feature(&pool, &session.id, new_feature("A")).await.unwrap();
    let b = add_feature(&pool, &session.id, new_feature("B")).await.unwrap();
    let ana = join_session(&pool, &session.id, "Ana", Some("Engineer")).await.unwrap();
    let bo = join_session(&pool, &session.id, "Bo", None).await.unwrap();

    replace_allocation(&pool, &session.id, &ana.id, &[alloc(&a.id, 70), alloc(&b.id, 30)])
        .await
        .unwrap();
    replace_allocation(&pool, &session.id, &bo.id, &[alloc(&a.id, 10)])
        .await
        .unwrap();

    let rows = list_votes_with_context(&pool, &session.id).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].player_name, "Ana");
    assert_eq!(rows[0].player_role.as_deref(), Some("Engineer"));
    assert_eq!(rows[0].feature_title, "A");
    assert_eq!(rows[2].player_role, None);

    let features = list_features(&pool, &session.id).await.unwrap();
    let votes = list_votes(&pool, &session.id).await.unwrap();
    let results = aggregate_votes(&features, &votes);
    assert_eq!(results[0].feature.title, "A");
    assert_eq!(results[0].total_points, 80);
    assert_eq!(results[0].vote_count, 2);
    assert_eq!(results[1].total_points, 30);
}

#[tokio::test]
async fn test_delete_session_cascades() {
    let pool = init_memory_database().await.unwrap();
    let session = active_session(&pool, "Cascade").await;
    let a = add_feature(&pool, &session.id, new_feature("A")).await.unwrap();
    let player = join_session(&pool, &session.id, "Ana", None).await.unwrap();
    replace_allocation(&pool, &session.id, &player.id, &[alloc(&a.id, 50)])
        .await
        .unwrap();

    delete_session(&pool, &session.id).await.unwrap();

    assert!(list_features(&pool, &session.id).await.unwrap().is_empty());
    assert!(list_players(&pool, &session.id).await.unwrap().is_empty());
    assert!(list_votes(&pool, &session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_feature_removes_its_votes() {
    let pool = init_memory_database().await.unwrap();
    let session = active_session(&pool, "Feature cascade").await;
    let a = add_feature(&pool, &session.id, new_feature("A")).await.unwrap();
    let b = add_feature(&pool, &session.id, new_feature("B")).await.unwrap();
    let player = join_session(&pool, &session.id, "Ana", None).await.unwrap();
    replace_allocation(&pool, &session.id, &player.id, &[alloc(&a.id, 50), alloc(&b.id, 50)])
        .await
        .unwrap();

    delete_feature(&pool, &session.id, &a.id).await.unwrap();

    let votes = list_votes(&pool, &session.id).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].feature_id, b.id);
}

#[tokio::test]
async fn test_allocation_rejected_unless_session_active() {
    let pool = init_memory_database().await.unwrap();
    let session = create_session(&pool, "Closing", 100).await.unwrap();
    let a = add_feature(&pool, &session.id, new_feature("A")).await.unwrap();
    let player = join_session(&pool, &session.id, "Ana", None).await.unwrap();

    let draft = replace_allocation(&pool, &session.id, &player.id, &[alloc(&a.id, 10)]).await;
    assert!(matches!(
        draft,
        Err(Error::Validation(ValidationError::SessionNotAcceptingVotes { ref status })) if status == "draft"
    ));

    update_session_status(&pool, &session.id, SessionStatus::Active)
        .await
        .unwrap();
    replace_allocation(&pool, &session.id, &player.id, &[alloc(&a.id, 40)])
        .await
        .unwrap();

    // Session closes between request validation and the write
    update_session_status(&pool, &session.id, SessionStatus::Completed)
        .await
        .unwrap();
    let late = replace_allocation(&pool, &session.id, &player.id, &[alloc(&a.id, 90)]).await;
    assert!(matches!(
        late,
        Err(Error::Validation(ValidationError::SessionNotAcceptingVotes { .. }))
    ));

    // Rolled back: the earlier allocation is untouched
    let votes = list_votes(&pool, &session.id).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].points_allocated, 40);

    assert!(matches!(
        replace_allocation(&pool, "missing", &player.id, &[]).await,
        Err(Error::NotFound(_))
    ));
}
