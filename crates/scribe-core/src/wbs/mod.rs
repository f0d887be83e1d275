//! Work-breakdown pipeline: prompt construction, response extraction,
//! hierarchy assembly, persistence.

pub mod assemble;
pub mod extract;
pub mod prompt;
pub mod service;

pub use assemble::{MeetingDraft, MeetingPlan, TaskDraft, WorkDraft, assemble};
pub use extract::{Extraction, WorkItemDraft, extract};
pub use prompt::build_prompt;
pub use service::{FALLBACK_RESPONSE, INTERNAL_INSTRUCTION, persist_plan, run_pipeline};
