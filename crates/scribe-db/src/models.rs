use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A meeting -- one row per analyzed transcript.
///
/// `record` is the raw transcript as submitted; `title` and `script` are
/// the model-extracted project title and narrative summary. Rows are
/// append-only: the pipeline never updates a meeting after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meeting {
    pub id: Uuid,
    pub record: String,
    pub title: String,
    pub script: String,
    pub created_at: DateTime<Utc>,
}

/// A work item -- one stream of the extracted work-breakdown structure.
///
/// `field` is an open tag set (BE, FE, CL, AI, ...) stored pass-through;
/// `level` is the difficulty rank the model assigned (1-3). Work items
/// are global rather than meeting-scoped, so there is no meeting foreign
/// key here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Work {
    pub id: Uuid,
    pub field: String,
    pub title: String,
    pub level: i32,
    /// 1-based position among the work items of one pipeline run.
    pub work_order: i32,
    pub created_at: DateTime<Utc>,
}

/// A task -- a leaf of the work-breakdown structure.
///
/// `work_id` is `None` for general tasks that belong to no work stream.
/// `task_order` is 1-based and scoped to the sibling group: tasks of one
/// work item, or the general-task bucket of the meeting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub meeting_id: Uuid,
    pub work_id: Option<Uuid>,
    pub title: String,
    pub task_order: i32,
    pub created_at: DateTime<Utc>,
}
