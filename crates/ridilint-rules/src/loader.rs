//! JSON rule loader
//!
//! Reads the rule file into the in-memory rule list. Falsy array entries
//! (null, false, 0, empty string/array/object) are silently dropped, so a
//! rule can be disabled in place by nulling it out.

use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::schema::RawRule;

/// Errors that can occur when loading the rule file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read rule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rule file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load rules from a JSON string holding an array of rule objects.
pub fn load_rules_from_str(json: &str) -> Result<Vec<RawRule>, LoadError> {
    let entries: Vec<Value> = serde_json::from_str(json)?;
    let mut rules = Vec::with_capacity(entries.len());

    for entry in entries {
        if is_falsy(&entry) {
            continue;
        }
        rules.push(serde_json::from_value(entry)?);
    }

    Ok(rules)
}

/// Load rules from a JSON file.
pub fn load_rules_from_file(path: &Path) -> Result<Vec<RawRule>, LoadError> {
    let content = fs::read_to_string(path)?;
    load_rules_from_str(&content)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().map_or(false, |f| f == 0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
