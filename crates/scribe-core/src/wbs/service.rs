//! Pipeline service layer.
//!
//! Orchestrates one run: prompt → generator → extraction → assembly →
//! persistence. Persistence inserts the meeting, its work items, and all
//! tasks within a single database transaction, in dependency order, so a
//! storage failure at any step leaves no partial hierarchy behind.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use scribe_db::models::{Meeting, Work};

use super::assemble::{MeetingPlan, assemble};
use super::extract::extract;
use super::prompt::build_prompt;
use crate::generator::Generator;

/// Fixed instruction appended to every prompt.
pub const INTERNAL_INSTRUCTION: &str = "We are at the handoff from initial planning to \
    development. Comb the discussion for anything development will need that the plan \
    leaves out. Even if the answer runs long, never cut it off partway.";

/// Literal substituted when the generator fails or returns blank output.
///
/// Well-formed tagged text, so the extractor always receives input it can
/// handle even on upstream failure.
pub const FALLBACK_RESPONSE: &str = "<title>Error</title><summary>generation failed</summary>\
    <wbs>{\"works\": [], \"general_tasks\": []}</wbs>";

/// Run the full pipeline for one transcript and return the new meeting id.
///
/// The generator call is a single awaited call; its failure is recovered
/// locally by substituting [`FALLBACK_RESPONSE`]. Only storage errors
/// propagate to the caller.
pub async fn run_pipeline(
    pool: &PgPool,
    generator: &dyn Generator,
    record: &str,
) -> Result<Uuid> {
    let prompt = build_prompt(record, INTERNAL_INSTRUCTION);

    let raw = match generator.generate(&prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(
                generator = generator.name(),
                "generator returned blank output, substituting fallback"
            );
            FALLBACK_RESPONSE.to_string()
        }
        Err(e) => {
            warn!(
                generator = generator.name(),
                error = %e,
                "generator call failed, substituting fallback"
            );
            FALLBACK_RESPONSE.to_string()
        }
    };

    let extraction = extract(&raw);
    let plan = assemble(record, extraction);

    persist_plan(pool, &plan).await
}

/// Persist an assembled plan: meeting, then works, then all tasks, inside
/// one transaction. Returns the generated meeting id.
///
/// Insert order matters: task rows carry foreign keys to the meeting and
/// to works, so those parents are inserted (and their generated ids
/// collected) first. Tasks go in as one batch at the end, work-scoped
/// tasks followed by general tasks.
pub async fn persist_plan(pool: &PgPool, plan: &MeetingPlan) -> Result<Uuid> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    // 1. Insert the meeting row.
    let meeting = sqlx::query_as::<_, Meeting>(
        "INSERT INTO meetings (record, title, script) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(&plan.meeting.record)
    .bind(&plan.meeting.title)
    .bind(&plan.meeting.script)
    .fetch_one(&mut *tx)
    .await
    .context("failed to insert meeting")?;

    // 2. Insert work items in run order, collecting generated ids so task
    //    rows can reference them by index.
    let mut work_ids: Vec<Uuid> = Vec::with_capacity(plan.works.len());
    for work in &plan.works {
        let row = sqlx::query_as::<_, Work>(
            "INSERT INTO works (field, title, level, work_order) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(&work.field)
        .bind(&work.title)
        .bind(work.level)
        .bind(work.order)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to insert work {:?}", work.title))?;

        work_ids.push(row.id);
    }

    // 3. Insert all tasks, resolving each draft's work index to the id
    //    generated above.
    for task in &plan.tasks {
        let work_id = task.work_index.map(|i| work_ids[i]);
        sqlx::query(
            "INSERT INTO tasks (meeting_id, work_id, title, task_order) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(meeting.id)
        .bind(work_id)
        .bind(&task.title)
        .bind(task.order)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("failed to insert task {:?}", task.title))?;
    }

    tx.commit().await.context("failed to commit transaction")?;

    Ok(meeting.id)
}
