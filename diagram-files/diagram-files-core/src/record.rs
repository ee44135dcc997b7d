//! The persisted file record.
//!
//! A record is the source module's snapshot with the chart state added under
//! `chart`:
//!
//! ```text
//! { "source": "...", ...other source fields, "chart": { ... } }
//! ```
//!
//! There is no schema version. Readers only rely on `source` and `chart`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const SOURCE_KEY: &str = "source";
pub const CHART_KEY: &str = "chart";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub chart: Value,
    /// Other source-module fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileRecord {
    /// Merge a source snapshot and a chart snapshot into one record.
    pub fn compose(source_snapshot: Value, chart: Value) -> Self {
        let mut extra = match source_snapshot {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert(SOURCE_KEY.to_string(), other);
                map
            }
        };
        let source = match extra.remove(SOURCE_KEY) {
            Some(Value::String(text)) => text,
            _ => String::new(),
        };
        extra.remove(CHART_KEY);
        Self {
            source,
            chart,
            extra,
        }
    }

    /// Serialize to text and parse it back, so the stored value is a plain
    /// deep copy with nothing shared with the live modules.
    pub fn normalized(&self) -> Result<Value, serde_json::Error> {
        let text = serde_json::to_string(self)?;
        serde_json::from_str(&text)
    }
}

/// The `source` string of a stored or uploaded record, if it has one.
pub fn source_of(record: &Value) -> Option<&str> {
    record.get(SOURCE_KEY).and_then(Value::as_str)
}

/// The `chart` of a stored or uploaded record, `{}` when absent or null.
pub fn chart_of(record: &Value) -> Value {
    match record.get(CHART_KEY) {
        Some(Value::Null) | None => json!({}),
        Some(chart) => chart.clone(),
    }
}

/// The snapshot handed to the source module when a record is opened.
pub fn source_snapshot(source: &str) -> Value {
    let mut map = Map::new();
    map.insert(SOURCE_KEY.to_string(), Value::String(source.to_string()));
    Value::Object(map)
}
