//! JSON Schema helpers
//!
//! Hand-declared stream schemas are built with [`ObjectSchema`]; schemas taken
//! from the upstream OpenAPI document are corrected with [`apply_schema_patch`].

use serde_json::{Map, Value, json};

/// Recursively apply patches to a base schema.
///
/// Objects on both sides are merged key by key. A `null` in `patches` removes
/// the key from the result; any other value replaces it.
///
/// # Example
/// ```
/// use serde_json::json;
/// use tap_pingdom::schema::apply_schema_patch;
///
/// let base = json!({"type": "object", "properties": {"name": {"type": "string"}}});
/// let patched = apply_schema_patch(&base, &json!({"properties": {"name": null}}));
/// assert!(patched["properties"].get("name").is_none());
/// ```
pub fn apply_schema_patch(base_schema: &Value, patches: &Value) -> Value {
    let mut result = base_schema.clone();
    if let (Some(target), Some(source)) = (result.as_object_mut(), patches.as_object()) {
        merge_object(target, source);
    }
    result
}

fn merge_object(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        if value.is_null() && target.contains_key(key) {
            target.remove(key);
            continue;
        }
        if let (Some(Value::Object(existing)), Value::Object(patch)) = (target.get_mut(key), value)
        {
            merge_object(existing, patch);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

pub fn integer() -> Value {
    json!({"type": "integer"})
}

pub fn string() -> Value {
    json!({"type": "string"})
}

pub fn boolean() -> Value {
    json!({"type": "boolean"})
}

pub fn array(items: Value) -> Value {
    json!({"type": "array", "items": items})
}

/// Make a property schema accept `null` as well.
pub fn nullable(mut schema: Value) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        let types = match obj.remove("type") {
            Some(Value::String(t)) => vec![Value::String(t)],
            Some(Value::Array(types)) => types,
            _ => Vec::new(),
        };
        let mut types: Vec<Value> = types.into_iter().filter(|t| t != "null").collect();
        types.push(Value::from("null"));
        obj.insert("type".to_string(), Value::Array(types));
    }
    schema
}

/// Builder for an object schema.
///
/// Required properties keep their plain type and are listed under `required`;
/// optional properties are made nullable.
#[derive(Debug, Default, Clone)]
pub struct ObjectSchema {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &str, schema: Value, description: &str) -> Self {
        self.properties
            .insert(name.to_string(), with_description(schema, description));
        self.required.push(name.to_string());
        self
    }

    pub fn optional(mut self, name: &str, schema: Value, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            with_description(nullable(schema), description),
        );
        self
    }

    /// Optional property without a description, for nested objects.
    pub fn field(mut self, name: &str, schema: Value) -> Self {
        self.properties.insert(name.to_string(), nullable(schema));
        self
    }

    pub fn build(self) -> Value {
        let mut schema = json!({
            "type": "object",
            "properties": self.properties,
        });
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        schema
    }
}

fn with_description(mut schema: Value, description: &str) -> Value {
    if !description.is_empty() {
        schema["description"] = Value::from(description);
    }
    schema
}

/// Names of the top-level properties of an object schema.
pub fn property_names(schema: &Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}
