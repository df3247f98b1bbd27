//! Bookmark state
//!
//! Same layout the Singer SDK writes, so state files can move between the two:
//! plain streams keep a single bookmark, child streams keep one per partition
//! context.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamBookmark>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamBookmark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<PartitionBookmark>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionBookmark {
    pub context: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read state from a JSON file.
    ///
    /// The file may hold the state object itself or a Singer `STATE` message
    /// wrapping it under `value`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;
        let mut value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if value.get("type").and_then(Value::as_str) == Some("STATE") {
            value = value["value"].take();
        }
        if value.is_null() {
            return Ok(Self::default());
        }

        serde_json::from_value(value)
            .with_context(|| format!("Invalid state in {}", path.display()))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// The stored bookmark for a stream or one of its partitions.
    pub fn bookmark(&self, stream: &str, context: Option<&Map<String, Value>>) -> Option<&Value> {
        let bookmark = self.bookmarks.get(stream)?;
        match context {
            None => bookmark.replication_key_value.as_ref(),
            Some(context) => bookmark
                .partitions
                .iter()
                .find(|p| &p.context == context)?
                .replication_key_value
                .as_ref(),
        }
    }

    /// Bookmark as unix seconds, for streams keyed on a unix timestamp.
    pub fn bookmark_timestamp(
        &self,
        stream: &str,
        context: Option<&Map<String, Value>>,
    ) -> Option<i64> {
        self.bookmark(stream, context).and_then(Value::as_i64)
    }

    /// Move a bookmark forward to `value`.
    ///
    /// Returns `false` and leaves the state unchanged if `value` is not greater
    /// than the current bookmark.
    pub fn advance(
        &mut self,
        stream: &str,
        context: Option<&Map<String, Value>>,
        replication_key: &str,
        value: &Value,
    ) -> bool {
        let bookmark = self.bookmarks.entry(stream.to_string()).or_default();

        let (current_key, current_value) = match context {
            None => (
                &mut bookmark.replication_key,
                &mut bookmark.replication_key_value,
            ),
            Some(context) => {
                let index = match bookmark.partitions.iter().position(|p| &p.context == context) {
                    Some(index) => index,
                    None => {
                        bookmark.partitions.push(PartitionBookmark {
                            context: context.clone(),
                            replication_key: None,
                            replication_key_value: None,
                        });
                        bookmark.partitions.len() - 1
                    }
                };
                let partition = &mut bookmark.partitions[index];
                (
                    &mut partition.replication_key,
                    &mut partition.replication_key_value,
                )
            }
        };

        if let Some(current) = current_value.as_ref() {
            if !is_greater(value, current) {
                return false;
            }
        }

        *current_key = Some(replication_key.to_string());
        *current_value = Some(value.clone());
        true
    }
}

/// Compare bookmark values: numbers numerically, strings lexically.
fn is_greater(candidate: &Value, current: &Value) -> bool {
    match (candidate, current) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a > b,
            _ => a.as_f64().unwrap_or(f64::MIN) > b.as_f64().unwrap_or(f64::MIN),
        },
        (Value::String(a), Value::String(b)) => a > b,
        (_, Value::Null) => !candidate.is_null(),
        _ => false,
    }
}
