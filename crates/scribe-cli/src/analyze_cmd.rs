//! The `scribe analyze` command: run the pipeline once over a transcript
//! file and print what was stored.

use std::io::Read;

use anyhow::{Context, Result};
use sqlx::PgPool;

use scribe_core::generator::Generator;
use scribe_core::wbs;
use scribe_db::queries::{meetings, tasks, works};

/// Read the transcript (from a file, or stdin when `path` is `-`), run the
/// pipeline, and print a short summary of the stored plan.
pub async fn run_analyze(pool: &PgPool, generator: &dyn Generator, path: &str) -> Result<()> {
    let record = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read transcript from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read transcript file {path:?}"))?
    };

    let meeting_id = wbs::run_pipeline(pool, generator, &record).await?;

    let meeting = meetings::get_meeting(pool, meeting_id)
        .await?
        .context("stored meeting not found")?;
    let linked_works = works::list_works_for_meeting(pool, meeting_id).await?;
    let all_tasks = tasks::list_tasks_for_meeting(pool, meeting_id).await?;
    let general = all_tasks.iter().filter(|t| t.work_id.is_none()).count();

    println!("Meeting stored: {meeting_id}");
    if !meeting.title.is_empty() {
        println!("  title: {}", meeting.title);
    }
    println!(
        "  {} work item(s), {} task(s) ({} general)",
        linked_works.len(),
        all_tasks.len(),
        general
    );

    Ok(())
}
