//! Database query functions for the `works` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Work;

/// Insert a new work item row. Returns the inserted work with
/// server-generated defaults (id, created_at).
pub async fn insert_work(
    pool: &PgPool,
    field: &str,
    title: &str,
    level: i32,
    work_order: i32,
) -> Result<Work> {
    let work = sqlx::query_as::<_, Work>(
        "INSERT INTO works (field, title, level, work_order) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(field)
    .bind(title)
    .bind(level)
    .bind(work_order)
    .fetch_one(pool)
    .await
    .context("failed to insert work")?;

    Ok(work)
}

/// Fetch a work item by its ID.
pub async fn get_work(pool: &PgPool, id: Uuid) -> Result<Option<Work>> {
    let work = sqlx::query_as::<_, Work>("SELECT * FROM works WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch work")?;

    Ok(work)
}

/// Fetch the work items referenced by a meeting's tasks, in run order.
pub async fn list_works_for_meeting(pool: &PgPool, meeting_id: Uuid) -> Result<Vec<Work>> {
    let works = sqlx::query_as::<_, Work>(
        "SELECT DISTINCT w.* FROM works w \
         JOIN tasks t ON t.work_id = w.id \
         WHERE t.meeting_id = $1 \
         ORDER BY w.work_order ASC",
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await
    .context("failed to list works for meeting")?;

    Ok(works)
}
