//! In-memory state modules the file manager loads into and saves from.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::record::{CHART_KEY, SOURCE_KEY};

/// State that can be opened from, captured as, and cleared back to a JSON
/// snapshot.
pub trait Persistable: Send + Sync {
    fn load(&mut self, snapshot: Value);
    fn save(&self) -> Value;
    fn reset(&mut self);
}

/// Handle the file manager holds on each module.
pub type SharedModule = Arc<RwLock<dyn Persistable>>;

/// The text document being edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceModule {
    source: String,
    fields: Map<String, Value>,
}

impl SourceModule {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fields: Map::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// Extra field saved alongside the source text.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if key == SOURCE_KEY || key == CHART_KEY {
            return;
        }
        self.fields.insert(key, value);
    }
}

impl Persistable for SourceModule {
    /// Patches the module: `source` replaces the text, other fields are
    /// merged in.
    fn load(&mut self, snapshot: Value) {
        let Value::Object(map) = snapshot else {
            return;
        };
        for (key, value) in map {
            if key == SOURCE_KEY {
                self.source = value.as_str().unwrap_or_default().to_string();
            } else {
                self.set_field(key, value);
            }
        }
    }

    fn save(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert(SOURCE_KEY.to_string(), Value::String(self.source.clone()));
        Value::Object(map)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Diagram state: table positions, zoom, pan and whatever else the chart
/// view keeps, as an opaque JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartModule {
    state: Map<String, Value>,
}

impl ChartModule {
    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.state.insert(key.into(), value);
    }
}

impl Persistable for ChartModule {
    fn load(&mut self, snapshot: Value) {
        self.state = match snapshot {
            Value::Object(map) => map,
            _ => Map::new(),
        };
    }

    fn save(&self) -> Value {
        Value::Object(self.state.clone())
    }

    fn reset(&mut self) {
        self.state.clear();
    }
}

/// Wrap a module for injection into a [`crate::FileManager`] while keeping a
/// typed handle to it.
pub fn shared<P: Persistable>(module: P) -> Arc<RwLock<P>> {
    Arc::new(RwLock::new(module))
}
