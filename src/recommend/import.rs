//! Reading generator responses
//!
//! The generator does not always wrap its output the same way: a bare
//! array, `{"recommendations": [...]}`, `{"exercises": [...]}` or a lone
//! exercise object all show up.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ImportError;
use crate::exercises::Exercise;

/// Parsed generator response
#[derive(Debug, Clone)]
pub struct Import {
    pub exercises: Vec<Exercise>,
    /// Analysis text some responses carry next to the list
    pub summary: Option<String>,
}

pub fn parse_recommendations(json: &str) -> Result<Import, ImportError> {
    let value: Value = serde_json::from_str(json)?;

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string);

    let list = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => {
            if let Some(list @ Value::Array(_)) = map.remove("recommendations") {
                list
            } else if let Some(list @ Value::Array(_)) = map.remove("exercises") {
                list
            } else if map.contains_key("id") {
                warn!("single exercise object in response, wrapping it in a list");
                Value::Array(vec![Value::Object(map)])
            } else {
                return Err(ImportError::UnexpectedShape);
            }
        }
        _ => return Err(ImportError::UnexpectedShape),
    };

    let exercises: Vec<Exercise> = serde_json::from_value(list)?;
    debug!("parsed {} exercises from response", exercises.len());

    Ok(Import { exercises, summary })
}
