//! Player persistence

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::Player;
use crate::Result;

fn player_from_row(row: &SqliteRow) -> Result<Player> {
    Ok(Player {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        name: row.try_get("name")?,
        role: row.try_get("role")?,
    })
}

pub async fn join_session(
    pool: &SqlitePool,
    session_id: &str,
    name: &str,
    role: Option<&str>,
) -> Result<Player> {
    let player = Player {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        name: name.to_string(),
        role: role.map(str::to_string),
    };

    sqlx::query("INSERT INTO players (id, session_id, name, role, joined_at) VALUES (?, ?, ?, ?, ?)")
        .bind(&player.id)
        .bind(&player.session_id)
        .bind(&player.name)
        .bind(&player.role)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    Ok(player)
}

pub async fn get_player(pool: &SqlitePool, session_id: &str, player_id: &str) -> Result<Option<Player>> {
    let row = sqlx::query("SELECT id, session_id, name, role FROM players WHERE id = ? AND session_id = ?")
        .bind(player_id)
        .bind(session_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(player_from_row).transpose()
}

/// Players of a session in join order
pub async fn list_players(pool: &SqlitePool, session_id: &str) -> Result<Vec<Player>> {
    let rows = sqlx::query(
        "SELECT id, session_id, name, role FROM players WHERE session_id = ? ORDER BY joined_at, rowid",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(player_from_row).collect()
}
