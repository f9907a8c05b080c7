//! Row coercion from the raw JSON document into validated records.
//!
//! Column names are resolved through fixed tables, never built at runtime.

use crate::error::LoadError;
use crate::models::{Dataset, JobRecord, Task, TaxonomyEntry, DEFAULT_IMPORTANCE, DEFAULT_REASONING};
use serde_json::{Map, Value};
use tracing::debug;

const TITLE_COLUMN: &str = "Job_Title";
const DESCRIPTION_COLUMN: &str = "Job_Description";
const AUTO_SCORE_COLUMN: &str = "auto_score";
const MANUAL_SCORE_COLUMN: &str = "manual_score";
const TASKS_COLUMN: &str = "Automatability_Analysis";
const SECTOR_COLUMN: &str = "Sector";

const LEVEL_NAME_COLUMNS: [&str; 4] = [
    "level_1_name",
    "level_2_name",
    "level_3_name",
    "level_4_name",
];

const LEVEL_CODE_COLUMNS: [&str; 4] = [
    "level_1_code",
    "level_2_code",
    "level_3_code",
    "level_4_code",
];

/// Build a dataset from a JSON array of row objects.
///
/// Rows without two numeric scores are dropped. A malformed task payload
/// never drops a row; it becomes an empty task list.
pub fn parse_dataset(document: Value) -> Result<Dataset, LoadError> {
    let rows = match document {
        Value::Array(rows) => rows,
        other => {
            return Err(LoadError::Layout(format!(
                "expected an array of rows, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut levels_present = [false; 4];
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        let Value::Object(row) = row else {
            dropped += 1;
            continue;
        };

        for (present, column) in levels_present.iter_mut().zip(LEVEL_NAME_COLUMNS) {
            *present |= row.contains_key(column);
        }

        match parse_record(&row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("Dropped {} rows without numeric scores", dropped);
    }

    Ok(Dataset::new(records, levels_present))
}

fn parse_record(row: &Map<String, Value>) -> Option<JobRecord> {
    let auto_score = row.get(AUTO_SCORE_COLUMN).and_then(coerce_number)?;
    let manual_score = row.get(MANUAL_SCORE_COLUMN).and_then(coerce_number)?;

    let taxonomy = std::array::from_fn(|i| TaxonomyEntry {
        name: row.get(LEVEL_NAME_COLUMNS[i]).and_then(coerce_text),
        code: row.get(LEVEL_CODE_COLUMNS[i]).and_then(coerce_text),
    });

    Some(JobRecord {
        title: row.get(TITLE_COLUMN).and_then(coerce_text).unwrap_or_default(),
        description: row
            .get(DESCRIPTION_COLUMN)
            .and_then(coerce_text)
            .unwrap_or_default(),
        taxonomy,
        auto_score,
        manual_score,
        sector: row.get(SECTOR_COLUMN).and_then(coerce_text),
        tasks: row.get(TASKS_COLUMN).map(parse_tasks).unwrap_or_default(),
    })
}

/// Numbers, or strings holding a finite number.
fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-empty strings, or numbers rendered as text.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an embedded task payload: either a JSON-array string or an array.
pub fn parse_tasks(payload: &Value) -> Vec<Task> {
    let items = match payload {
        Value::Array(items) => items.clone(),
        Value::String(s) if s.trim_start().starts_with('[') => {
            match serde_json::from_str::<Vec<Value>>(s.trim()) {
                Ok(items) => items,
                Err(e) => {
                    debug!("Unparseable task payload treated as empty: {}", e);
                    return Vec::new();
                }
            }
        }
        _ => return Vec::new(),
    };

    let mut tasks = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(fields) => tasks.push(parse_task(fields)),
            _ => {
                debug!("Task payload contains a non-object entry; treated as empty");
                return Vec::new();
            }
        }
    }
    tasks
}

fn parse_task(mut fields: Map<String, Value>) -> Task {
    let automatability_flag = fields
        .remove("automatability_flag")
        .as_ref()
        .and_then(coerce_text)
        .unwrap_or_default();
    let importance_classification = fields
        .remove("importance_classification")
        .as_ref()
        .and_then(coerce_text)
        .unwrap_or_else(|| DEFAULT_IMPORTANCE.to_string());
    let reasoning = fields
        .remove("reasoning")
        .as_ref()
        .and_then(coerce_text)
        .unwrap_or_else(|| DEFAULT_REASONING.to_string());
    let question = match fields.remove("question") {
        Some(Value::Array(codes)) => codes.iter().filter_map(coerce_text).collect(),
        Some(other) => coerce_text(&other).into_iter().collect(),
        None => Vec::new(),
    };

    Task {
        automatability_flag,
        importance_classification,
        reasoning,
        question,
        extra: fields,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
