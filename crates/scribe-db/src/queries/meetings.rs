//! Database query functions for the `meetings` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Meeting;

/// Insert a new meeting row. Returns the inserted meeting with
/// server-generated defaults (id, created_at).
pub async fn insert_meeting(
    pool: &PgPool,
    record: &str,
    title: &str,
    script: &str,
) -> Result<Meeting> {
    let meeting = sqlx::query_as::<_, Meeting>(
        "INSERT INTO meetings (record, title, script) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(record)
    .bind(title)
    .bind(script)
    .fetch_one(pool)
    .await
    .context("failed to insert meeting")?;

    Ok(meeting)
}

/// Fetch a meeting by its ID.
pub async fn get_meeting(pool: &PgPool, id: Uuid) -> Result<Option<Meeting>> {
    let meeting = sqlx::query_as::<_, Meeting>("SELECT * FROM meetings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch meeting")?;

    Ok(meeting)
}

/// List all meetings, ordered by creation time (newest first).
pub async fn list_meetings(pool: &PgPool) -> Result<Vec<Meeting>> {
    let meetings = sqlx::query_as::<_, Meeting>("SELECT * FROM meetings ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .context("failed to list meetings")?;

    Ok(meetings)
}
