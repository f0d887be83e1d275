//! Database query functions for the `tasks` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Task;

/// Insert a new task row. Returns the inserted task with server-generated
/// defaults (id, created_at).
///
/// `work_id` is `None` for general tasks not tied to any work stream.
pub async fn insert_task(
    pool: &PgPool,
    meeting_id: Uuid,
    work_id: Option<Uuid>,
    title: &str,
    task_order: i32,
) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (meeting_id, work_id, title, task_order) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(meeting_id)
    .bind(work_id)
    .bind(title)
    .bind(task_order)
    .fetch_one(pool)
    .await
    .context("failed to insert task")?;

    Ok(task)
}

/// Fetch a single task by ID.
pub async fn get_task(pool: &PgPool, id: Uuid) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch task")?;

    Ok(task)
}

/// List all tasks for a meeting: work-scoped tasks first in work order,
/// then general tasks, each group in its own task order.
pub async fn list_tasks_for_meeting(pool: &PgPool, meeting_id: Uuid) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT t.* FROM tasks t \
         LEFT JOIN works w ON w.id = t.work_id \
         WHERE t.meeting_id = $1 \
         ORDER BY w.work_order ASC NULLS LAST, t.task_order ASC",
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await
    .context("failed to list tasks for meeting")?;

    Ok(tasks)
}

/// List the tasks of one work item within a meeting, in task order.
pub async fn list_tasks_for_work(
    pool: &PgPool,
    meeting_id: Uuid,
    work_id: Uuid,
) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks \
         WHERE meeting_id = $1 AND work_id = $2 \
         ORDER BY task_order ASC",
    )
    .bind(meeting_id)
    .bind(work_id)
    .fetch_all(pool)
    .await
    .context("failed to list tasks for work")?;

    Ok(tasks)
}

/// List a meeting's general tasks (no work item), in task order.
pub async fn list_general_tasks(pool: &PgPool, meeting_id: Uuid) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks \
         WHERE meeting_id = $1 AND work_id IS NULL \
         ORDER BY task_order ASC",
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await
    .context("failed to list general tasks")?;

    Ok(tasks)
}
