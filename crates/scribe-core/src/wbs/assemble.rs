//! Hierarchy assembly: turn an [`Extraction`] into an ordered plan of
//! drafts ready for persistence.
//!
//! Ordering is assigned eagerly here, from list position, and is never
//! derived from storage iteration order. Pure logic, no failure modes:
//! missing fields get sentinel defaults, nothing is dropped.

use super::extract::Extraction;

/// Sentinel for a work item the generator left without a field tag.
pub const UNKNOWN_FIELD: &str = "Unknown";

/// Sentinel for a work item the generator left untitled.
pub const UNTITLED_WORK: &str = "Untitled Work";

/// Difficulty assigned when the generator omitted the level or put it
/// outside the 1-3 range.
const DEFAULT_LEVEL: i32 = 1;

/// The meeting row to create: raw transcript plus extracted title/summary.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDraft {
    pub record: String,
    pub title: String,
    pub script: String,
}

/// A work item pending insertion, with its run-wide 1-based order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkDraft {
    pub field: String,
    pub title: String,
    pub level: i32,
    pub order: i32,
}

/// A task pending insertion.
///
/// `work_index` points into the plan's `works` list; the persistence
/// writer resolves it to a real work id once that work has been inserted.
/// `None` marks a general task. `order` is 1-based within the sibling
/// group (one work item's tasks, or the general-task bucket).
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub work_index: Option<usize>,
    pub title: String,
    pub order: i32,
}

/// The fully ordered plan for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingPlan {
    pub meeting: MeetingDraft,
    pub works: Vec<WorkDraft>,
    pub tasks: Vec<TaskDraft>,
}

/// Assemble the ordered plan from the raw transcript and its extraction.
pub fn assemble(record: &str, extraction: Extraction) -> MeetingPlan {
    let meeting = MeetingDraft {
        record: record.to_string(),
        title: extraction.title,
        script: extraction.summary,
    };

    let mut works = Vec::with_capacity(extraction.work_items.len());
    let mut tasks = Vec::new();

    for (i, item) in extraction.work_items.into_iter().enumerate() {
        works.push(WorkDraft {
            field: item.field.unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            title: item.title.unwrap_or_else(|| UNTITLED_WORK.to_string()),
            level: clamp_level(item.level),
            order: i as i32 + 1,
        });

        for (j, title) in item.tasks.into_iter().enumerate() {
            tasks.push(TaskDraft {
                work_index: Some(i),
                title,
                order: j as i32 + 1,
            });
        }
    }

    // General tasks restart their own 1-based ordering; it does not
    // continue any per-work sequence.
    for (k, title) in extraction.general_tasks.into_iter().enumerate() {
        tasks.push(TaskDraft {
            work_index: None,
            title,
            order: k as i32 + 1,
        });
    }

    MeetingPlan {
        meeting,
        works,
        tasks,
    }
}

/// Default the level to 1 when missing or outside the 1-3 range.
fn clamp_level(level: Option<i64>) -> i32 {
    match level {
        Some(l) if (1..=3).contains(&l) => l as i32,
        _ => DEFAULT_LEVEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wbs::extract::{Extraction, WorkItemDraft};

    fn item(title: &str, tasks: &[&str]) -> WorkItemDraft {
        WorkItemDraft {
            field: Some("BE".to_string()),
            title: Some(title.to_string()),
            level: Some(2),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn task_count_is_sum_of_work_tasks_plus_general() {
        let extraction = Extraction {
            title: "T".to_string(),
            summary: "S".to_string(),
            work_items: vec![item("a", &["a1", "a2"]), item("b", &["b1", "b2", "b3"])],
            general_tasks: vec!["g1".to_string(), "g2".to_string()],
        };

        let plan = assemble("record", extraction);
        assert_eq!(plan.works.len(), 2);
        assert_eq!(plan.tasks.len(), 2 + 3 + 2);
    }

    #[test]
    fn work_orders_are_dense_from_one() {
        let extraction = Extraction {
            work_items: vec![item("a", &[]), item("b", &[]), item("c", &[])],
            ..Extraction::default()
        };
        let plan = assemble("", extraction);
        let orders: Vec<i32> = plan.works.iter().map(|w| w.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn task_orders_are_dense_per_sibling_group() {
        let extraction = Extraction {
            work_items: vec![item("a", &["a1", "a2"]), item("b", &["b1"])],
            general_tasks: vec!["g1".to_string(), "g2".to_string()],
            ..Extraction::default()
        };
        let plan = assemble("", extraction);

        let orders_for = |idx: Option<usize>| -> Vec<i32> {
            plan.tasks
                .iter()
                .filter(|t| t.work_index == idx)
                .map(|t| t.order)
                .collect()
        };

        assert_eq!(orders_for(Some(0)), vec![1, 2]);
        assert_eq!(orders_for(Some(1)), vec![1]);
        // General-task ordering is independent of per-work ordering.
        assert_eq!(orders_for(None), vec![1, 2]);
    }

    #[test]
    fn missing_fields_get_sentinels() {
        let extraction = Extraction {
            work_items: vec![WorkItemDraft::default()],
            ..Extraction::default()
        };
        let plan = assemble("", extraction);
        let work = &plan.works[0];
        assert_eq!(work.field, UNKNOWN_FIELD);
        assert_eq!(work.title, UNTITLED_WORK);
        assert_eq!(work.level, 1);
        assert_eq!(work.order, 1);
    }

    #[test]
    fn out_of_range_level_defaults_to_one() {
        for bad in [Some(0), Some(4), Some(-1), Some(99), None] {
            let extraction = Extraction {
                work_items: vec![WorkItemDraft {
                    level: bad,
                    ..WorkItemDraft::default()
                }],
                ..Extraction::default()
            };
            let plan = assemble("", extraction);
            assert_eq!(plan.works[0].level, 1, "level {bad:?} should default");
        }
    }

    #[test]
    fn in_range_levels_pass_through() {
        for good in [1i64, 2, 3] {
            let extraction = Extraction {
                work_items: vec![WorkItemDraft {
                    level: Some(good),
                    ..WorkItemDraft::default()
                }],
                ..Extraction::default()
            };
            let plan = assemble("", extraction);
            assert_eq!(plan.works[0].level, good as i32);
        }
    }

    #[test]
    fn meeting_draft_carries_record_and_extraction() {
        let extraction = Extraction {
            title: "Project".to_string(),
            summary: "Summary".to_string(),
            ..Extraction::default()
        };
        let plan = assemble("the raw transcript", extraction);
        assert_eq!(plan.meeting.record, "the raw transcript");
        assert_eq!(plan.meeting.title, "Project");
        assert_eq!(plan.meeting.script, "Summary");
    }

    #[test]
    fn empty_extraction_yields_meeting_only() {
        let plan = assemble("just a record", Extraction::default());
        assert!(plan.works.is_empty());
        assert!(plan.tasks.is_empty());
        assert_eq!(plan.meeting.record, "just a record");
        assert_eq!(plan.meeting.title, "");
    }
}
