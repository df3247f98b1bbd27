//! Schema conformer transformer
//!
//! Removes properties the announced stream schema does not declare. Catalog
//! deselection reaches it by trimming that schema first.

use crate::etl::Transformer;
use eyre::Result;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;

/// Transformer that keeps only the top-level properties a schema declares
///
/// # Example
/// ```
/// use tap_pingdom::transform::SchemaConformer;
/// use tap_pingdom::etl::Transformer;
/// use serde_json::json;
///
/// let schema = json!({"type": "object", "properties": {"id": {"type": "integer"}}});
/// let conformer = SchemaConformer::new("checks", &schema);
///
/// let output = conformer.transform(json!({"id": 1, "extra": true})).unwrap();
/// assert_eq!(output, json!({"id": 1}));
/// ```
pub struct SchemaConformer {
    stream: String,
    allowed: HashSet<String>,
    warned: Mutex<HashSet<String>>,
}

impl SchemaConformer {
    pub fn new(stream: &str, schema: &Value) -> Self {
        Self {
            stream: stream.to_string(),
            allowed: crate::schema::property_names(schema).into_iter().collect(),
            warned: Mutex::new(HashSet::new()),
        }
    }

    fn warn_once(&self, property: &str) {
        // A poisoned set only costs a repeated warning
        if let Ok(mut warned) = self.warned.lock() {
            if warned.insert(property.to_string()) {
                log::warn!(
                    "Property '{}' is not in the {} schema and will be dropped",
                    property,
                    self.stream
                );
            }
        }
    }
}

impl Transformer for SchemaConformer {
    type Input = Value;
    type Output = Value;

    fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
        let Some(obj) = input.as_object_mut() else {
            eyre::bail!("{} record is not a JSON object: {}", self.stream, input);
        };

        let dropped: Vec<String> = obj
            .keys()
            .filter(|k| !self.allowed.contains(*k))
            .cloned()
            .collect();
        for key in dropped {
            obj.remove(&key);
            self.warn_once(&key);
        }

        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "integer"},
                "name": {"type": ["string", "null"]},
                "tags": {"type": ["array", "null"]}
            }
        })
    }

    #[test]
    fn test_keeps_declared_properties() {
        let conformer = SchemaConformer::new("checks", &schema());
        let input = json!({"id": 1, "name": "web", "tags": [{"name": "a"}]});
        assert_eq!(conformer.transform(input.clone()).unwrap(), input);
    }

    #[test]
    fn test_drops_undeclared_properties() {
        let conformer = SchemaConformer::new("checks", &schema());
        let output = conformer
            .transform_many(vec![
                json!({"id": 1, "unknown": 1}),
                json!({"id": 2, "unknown": 2, "other": null}),
            ])
            .unwrap();
        assert_eq!(output, vec![json!({"id": 1}), json!({"id": 2})]);
        assert_eq!(conformer.warned.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_non_objects() {
        let conformer = SchemaConformer::new("checks", &schema());
        assert!(conformer.transform(json!([1, 2])).is_err());
    }
}
