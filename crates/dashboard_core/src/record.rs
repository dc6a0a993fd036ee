use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Group key used when a record has no usable grouping field.
pub const DEFAULT_GROUP_KEY: &str = "Unbekannt";

/// A single event, email, message, artist or log entry as an open field map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Builds a record from a JSON value; non-objects yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Textual form of a field for searching and grouping.
    ///
    /// Strings are returned as-is, numbers and booleans use their JSON text,
    /// everything else (absent, null, arrays, objects) is `None`.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Like [`Record::text`], but treats empty and whitespace-only text as absent.
    pub fn key(&self, field: &str) -> Option<String> {
        self.text(field).filter(|value| !value.trim().is_empty())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
