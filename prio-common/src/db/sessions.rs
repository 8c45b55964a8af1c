//! Session persistence

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Session, SessionStatus};
use crate::{Error, Result};

fn session_from_row(row: &SqliteRow) -> Result<Session> {
    let status: String = row.try_get("status")?;
    Ok(Session {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        status: status.parse::<SessionStatus>().map_err(Error::Internal)?,
        points_budget: row.try_get("points_budget")?,
        host_token: row.try_get("host_token")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Create a draft session with a fresh host token
pub async fn create_session(pool: &SqlitePool, name: &str, points_budget: u32) -> Result<Session> {
    let session = Session {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        status: SessionStatus::Draft,
        points_budget,
        host_token: Uuid::new_v4().simple().to_string(),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO sessions (id, name, status, host_token, points_budget, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&session.id)
    .bind(&session.name)
    .bind(session.status.as_str())
    .bind(&session.host_token)
    .bind(session.points_budget)
    .bind(session.created_at)
    .execute(pool)
    .await?;

    Ok(session)
}

pub async fn get_session(pool: &SqlitePool, session_id: &str) -> Result<Option<Session>> {
    let row = sqlx::query(
        "SELECT id, name, status, host_token, points_budget, created_at FROM sessions WHERE id = ?",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(session_from_row).transpose()
}

/// All sessions, newest first
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<Session>> {
    let rows = sqlx::query(
        "SELECT id, name, status, host_token, points_budget, created_at FROM sessions ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(session_from_row).collect()
}

pub async fn update_session_status(
    pool: &SqlitePool,
    session_id: &str,
    status: SessionStatus,
) -> Result<()> {
    let result = sqlx::query("UPDATE sessions SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(session_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("session {}", session_id)));
    }
    Ok(())
}

/// Delete a session and, by cascade, its features, players and votes
///
/// Returns false if no such session existed.
pub async fn delete_session(pool: &SqlitePool, session_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
