//! Feature persistence

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Feature, ReferenceLink};
use crate::{Error, Result};

/// Input for a new feature; ids and timestamps are assigned on insert
#[derive(Debug, Clone, Default)]
pub struct NewFeature {
    pub title: String,
    pub description: Option<String>,
    pub effort: Option<i64>,
    pub impact: Option<i64>,
    pub reference_links: Vec<ReferenceLink>,
}

fn feature_from_row(row: &SqliteRow) -> Result<Feature> {
    let links_json: String = row.try_get("reference_links")?;
    let reference_links = serde_json::from_str(&links_json)
        .map_err(|e| Error::Internal(format!("Corrupt reference_links: {}", e)))?;

    Ok(Feature {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        effort: row.try_get("effort")?,
        impact: row.try_get("impact")?,
        reference_links,
    })
}

pub async fn add_feature(pool: &SqlitePool, session_id: &str, new: NewFeature) -> Result<Feature> {
    let feature = Feature {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        title: new.title,
        description: new.description,
        effort: new.effort,
        impact: new.impact,
        reference_links: new.reference_links,
    };

    let links_json = serde_json::to_string(&feature.reference_links)
        .map_err(|e| Error::Internal(format!("Failed to encode reference_links: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO features (id, session_id, title, description, effort, impact, reference_links, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&feature.id)
    .bind(&feature.session_id)
    .bind(&feature.title)
    .bind(&feature.description)
    .bind(feature.effort)
    .bind(feature.impact)
    .bind(links_json)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(feature)
}

/// Features of a session in creation order
pub async fn list_features(pool: &SqlitePool, session_id: &str) -> Result<Vec<Feature>> {
    let rows = sqlx::query(
        r#"
        SELECT id, session_id, title, description, effort, impact, reference_links
        FROM features
        WHERE session_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(feature_from_row).collect()
}

/// Remove a feature (and its votes). Returns false if it did not exist.
pub async fn delete_feature(pool: &SqlitePool, session_id: &str, feature_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM features WHERE id = ? AND session_id = ?")
        .bind(feature_id)
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
