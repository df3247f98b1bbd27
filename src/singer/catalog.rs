//! Discovery catalog and stream selection

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    Incremental,
    FullTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub breadcrumb: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl MetadataEntry {
    fn flag(&self, key: &str) -> Option<bool> {
        self.metadata.get(key).and_then(Value::as_bool)
    }

    fn is_automatic(&self) -> bool {
        self.metadata.get("inclusion").and_then(Value::as_str) == Some("automatic")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tap_stream_id: String,
    pub stream: String,
    pub schema: Value,
    #[serde(default)]
    pub key_properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<ReplicationMethod>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

impl CatalogEntry {
    /// Build an entry with standard stream and property metadata.
    pub fn new(
        stream: &str,
        schema: Value,
        key_properties: &[&str],
        replication_key: Option<&str>,
        parent: Option<&str>,
        selected_by_default: bool,
    ) -> Self {
        let key_properties: Vec<String> = key_properties.iter().map(|k| k.to_string()).collect();

        let mut root = Map::new();
        root.insert("inclusion".to_string(), json!("available"));
        root.insert("selected-by-default".to_string(), json!(selected_by_default));
        root.insert("table-key-properties".to_string(), json!(key_properties));
        if let Some(key) = replication_key {
            root.insert("valid-replication-keys".to_string(), json!([key]));
            root.insert("forced-replication-method".to_string(), json!("INCREMENTAL"));
        }
        if let Some(parent) = parent {
            root.insert("parent-tap-stream-id".to_string(), json!(parent));
        }

        let mut metadata = vec![MetadataEntry {
            breadcrumb: Vec::new(),
            metadata: root,
        }];

        for property in crate::schema::property_names(&schema) {
            let automatic =
                key_properties.contains(&property) || replication_key == Some(property.as_str());
            let mut entry = Map::new();
            entry.insert(
                "inclusion".to_string(),
                json!(if automatic { "automatic" } else { "available" }),
            );
            entry.insert("selected-by-default".to_string(), json!(true));
            metadata.push(MetadataEntry {
                breadcrumb: vec!["properties".to_string(), property],
                metadata: entry,
            });
        }

        Self {
            tap_stream_id: stream.to_string(),
            stream: stream.to_string(),
            schema,
            key_properties,
            replication_key: replication_key.map(str::to_string),
            replication_method: Some(match replication_key {
                Some(_) => ReplicationMethod::Incremental,
                None => ReplicationMethod::FullTable,
            }),
            metadata,
        }
    }

    fn root_metadata(&self) -> Option<&MetadataEntry> {
        self.metadata.iter().find(|m| m.breadcrumb.is_empty())
    }

    /// Whether the stream is selected: explicit `selected`, else `selected-by-default`.
    pub fn is_selected(&self) -> bool {
        self.root_metadata()
            .and_then(|m| m.flag("selected").or_else(|| m.flag("selected-by-default")))
            .unwrap_or(false)
    }

    /// Set the explicit `selected` flag on the stream.
    ///
    /// Lets callers build a selection from [`Tap::discover`](crate::tap::Tap::discover)
    /// without writing a catalog file.
    pub fn set_selected(&mut self, selected: bool) {
        match self.metadata.iter_mut().find(|m| m.breadcrumb.is_empty()) {
            Some(root) => {
                root.metadata.insert("selected".to_string(), json!(selected));
            }
            None => {
                let mut root = Map::new();
                root.insert("selected".to_string(), json!(selected));
                self.metadata.insert(
                    0,
                    MetadataEntry {
                        breadcrumb: Vec::new(),
                        metadata: root,
                    },
                );
            }
        }
    }

    /// Top-level properties explicitly deselected; automatic properties are never deselected.
    pub fn deselected_properties(&self) -> HashSet<String> {
        self.metadata
            .iter()
            .filter(|m| m.breadcrumb.len() == 2 && m.breadcrumb[0] == "properties")
            .filter(|m| m.flag("selected") == Some(false) && !m.is_automatic())
            .map(|m| m.breadcrumb[1].clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Read a catalog from a JSON file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
    }

    pub fn get(&self, tap_stream_id: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|s| s.tap_stream_id == tap_stream_id)
    }

    /// Mutable entry, for selecting streams or properties in code before a sync.
    pub fn get_mut(&mut self, tap_stream_id: &str) -> Option<&mut CatalogEntry> {
        self.streams
            .iter_mut()
            .find(|s| s.tap_stream_id == tap_stream_id)
    }

    /// Whether a stream is selected; streams missing from the catalog are not.
    pub fn is_selected(&self, tap_stream_id: &str) -> bool {
        self.get(tap_stream_id).is_some_and(CatalogEntry::is_selected)
    }
}
