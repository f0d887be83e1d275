//! Response extraction: pull `<title>`, `<summary>`, and `<wbs>` sections
//! out of raw generator output.
//!
//! Extraction is total -- it never errors. Absent or malformed sections
//! degrade to empty/default values so a partially usable response still
//! flows through the pipeline. The tag format is flat (no nesting, no
//! escaping), so a first-match scanner over the three known tag names is
//! all that is needed; this is deliberately not an XML parser.

use serde_json::Value;
use tracing::warn;

/// Typed result of extracting one generator response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub title: String,
    pub summary: String,
    pub work_items: Vec<WorkItemDraft>,
    pub general_tasks: Vec<String>,
}

/// One work item as the generator described it: every field optional,
/// defaults applied later during assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkItemDraft {
    pub field: Option<String>,
    pub title: Option<String>,
    pub level: Option<i64>,
    pub tasks: Vec<String>,
}

/// The two shapes a `<wbs>` payload may decode to. Normalized immediately
/// by [`normalize_payload`]; nothing downstream sees this variant.
#[derive(Debug)]
enum WbsPayload {
    /// Bare JSON array of work objects (legacy shape): all works, no
    /// general tasks.
    Legacy(Vec<Value>),
    /// Keyed object with "works" and "general_tasks", each defaulting to
    /// empty when absent.
    Keyed {
        works: Vec<Value>,
        general_tasks: Vec<Value>,
    },
}

/// Extract the three tagged sections from raw generator output.
pub fn extract(raw: &str) -> Extraction {
    let title = tag_span(raw, "title").unwrap_or_default().to_string();
    let summary = tag_span(raw, "summary").unwrap_or_default().to_string();

    let (work_items, general_tasks) = match tag_span(raw, "wbs") {
        Some(payload) => decode_wbs(payload),
        None => (Vec::new(), Vec::new()),
    };

    Extraction {
        title,
        summary,
        work_items,
        general_tasks,
    }
}

/// Return the trimmed content of the first `<tag>...</tag>` pair.
///
/// The span runs to the first closing tag after the first opening tag;
/// nested or repeated tags of the same name are not supported (first
/// match wins). Content may span lines, and any prose around the tags is
/// ignored.
fn tag_span<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");

    let start = text.find(&open)? + open.len();
    let end = start + text[start..].find(&close)?;
    Some(text[start..end].trim())
}

/// Decode a `<wbs>` payload string into canonical (works, general_tasks)
/// lists. Malformed JSON is a recoverable condition: logged, not raised.
fn decode_wbs(payload: &str) -> (Vec<WorkItemDraft>, Vec<String>) {
    let value: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "wbs payload is not valid JSON, dropping work breakdown");
            return (Vec::new(), Vec::new());
        }
    };

    normalize_payload(classify_payload(value))
}

/// Sort a decoded JSON value into one of the two accepted payload shapes.
fn classify_payload(value: Value) -> WbsPayload {
    match value {
        Value::Array(items) => WbsPayload::Legacy(items),
        Value::Object(mut map) => {
            let works = match map.remove("works") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let general_tasks = match map.remove("general_tasks") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            WbsPayload::Keyed {
                works,
                general_tasks,
            }
        }
        other => {
            warn!(
                "wbs payload decoded to {}, expected array or object",
                type_name(&other)
            );
            WbsPayload::Keyed {
                works: Vec::new(),
                general_tasks: Vec::new(),
            }
        }
    }
}

/// Collapse either payload shape into the canonical internal lists.
fn normalize_payload(payload: WbsPayload) -> (Vec<WorkItemDraft>, Vec<String>) {
    let (works, general) = match payload {
        WbsPayload::Legacy(items) => (items, Vec::new()),
        WbsPayload::Keyed {
            works,
            general_tasks,
        } => (works, general_tasks),
    };

    let work_items = works.into_iter().map(work_item_from_value).collect();
    let general_tasks = general
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();

    (work_items, general_tasks)
}

/// Read one work item out of a JSON value, tolerating missing fields and
/// wrong types. A structurally wrong element degrades locally (e.g. a
/// `tasks` value that is not an array yields an empty task list) and
/// never aborts the run.
fn work_item_from_value(value: Value) -> WorkItemDraft {
    let Some(obj) = value.as_object() else {
        return WorkItemDraft::default();
    };

    let tasks = match obj.get("tasks") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    WorkItemDraft {
        field: obj.get("field").and_then(Value::as_str).map(str::to_string),
        title: obj.get("title").and_then(Value::as_str).map(str::to_string),
        level: obj.get("level").and_then(Value::as_i64),
        tasks,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
