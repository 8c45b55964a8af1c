//! Vote persistence
//!
//! A player's allocation is stored as one row per feature. Submitting again
//! replaces the previous allocation atomically.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::{SessionStatus, Vote, VoteWithContext};
use crate::validation::PointAllocation;
use crate::{Error, Result, ValidationError};

fn vote_from_row(row: &SqliteRow) -> Result<Vote> {
    Ok(Vote {
        session_id: row.try_get("session_id")?,
        player_id: row.try_get("player_id")?,
        feature_id: row.try_get("feature_id")?,
        points_allocated: row.try_get("points_allocated")?,
    })
}

fn vote_with_context_from_row(row: &SqliteRow) -> Result<VoteWithContext> {
    Ok(VoteWithContext {
        feature_id: row.try_get("feature_id")?,
        feature_title: row.try_get("feature_title")?,
        player_id: row.try_get("player_id")?,
        player_name: row.try_get("player_name")?,
        player_role: row.try_get("player_role")?,
        points_allocated: row.try_get("points_allocated")?,
    })
}

/// Replace a player's allocation for a session in one transaction
///
/// Entries must already be validated. The session status is checked again
/// after the write lock is taken, so an allocation never lands in a session
/// that left `active` in the meantime.
pub async fn replace_allocation(
    pool: &SqlitePool,
    session_id: &str,
    player_id: &str,
    allocation: &[PointAllocation],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    // First write: holds the database write lock until commit
    sqlx::query("DELETE FROM votes WHERE session_id = ? AND player_id = ?")
        .bind(session_id)
        .bind(player_id)
        .execute(&mut *tx)
        .await?;

    let status: Option<String> = sqlx::query_scalar("SELECT status FROM sessions WHERE id = ?")
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?;
    let status = status.ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;
    if status != SessionStatus::Active.as_str() {
        tx.rollback().await?;
        return Err(ValidationError::SessionNotAcceptingVotes { status }.into());
    }

    let now = Utc::now();
    for entry in allocation {
        sqlx::query(
            r#"
            INSERT INTO votes (session_id, player_id, feature_id, points_allocated, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(player_id)
        .bind(&entry.feature_id)
        .bind(entry.points)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// All vote rows of a session in submission order
pub async fn list_votes(pool: &SqlitePool, session_id: &str) -> Result<Vec<Vote>> {
    let rows = sqlx::query(
        r#"
        SELECT session_id, player_id, feature_id, points_allocated
        FROM votes
        WHERE session_id = ?
        ORDER BY id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(vote_from_row).collect()
}

/// Vote rows joined with feature title and player name/role
pub async fn list_votes_with_context(pool: &SqlitePool, session_id: &str) -> Result<Vec<VoteWithContext>> {
    let rows = sqlx::query(
        r#"
        SELECT v.feature_id,
               f.title AS feature_title,
               v.player_id,
               p.name AS player_name,
               p.role AS player_role,
               v.points_allocated
        FROM votes v
        JOIN features f ON f.id = v.feature_id
        JOIN players p ON p.id = v.player_id
        WHERE v.session_id = ?
        ORDER BY v.id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(vote_with_context_from_row).collect()
}
