//! Offset pagination
//!
//! Pingdom list endpoints take `offset` and `limit` and return no total count,
//! so the last page is recognised by coming back short.

use eyre::{Result, bail};
use serde_json::Value;

/// Tracks the offset of a single pagination run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetPaginator {
    offset: u64,
    page_size: u64,
    finished: bool,
}

impl OffsetPaginator {
    pub fn new(start_value: u64, page_size: u64) -> Self {
        Self {
            offset: start_value,
            page_size: page_size.max(1),
            finished: false,
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Query parameters for the current page.
    pub fn params(&self) -> [(String, String); 2] {
        [
            ("offset".to_string(), self.offset.to_string()),
            ("limit".to_string(), self.page_size.to_string()),
        ]
    }

    /// Record that a page with `record_count` records came back.
    ///
    /// A full page moves the offset forward; a short one ends the run.
    pub fn advance(&mut self, record_count: usize) {
        if record_count as u64 >= self.page_size {
            self.offset += self.page_size;
        } else {
            self.finished = true;
        }
    }
}

/// The JSONPath subset used to locate records in a response, e.g. `$.actions.alerts[*]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsPath {
    expression: String,
    keys: Vec<String>,
}

impl RecordsPath {
    /// Parse a `$.key.key[*]` expression.
    pub fn parse(expression: &str) -> Result<Self> {
        let Some(rest) = expression.strip_prefix("$.") else {
            bail!("Records path must start with '$.': {}", expression);
        };
        let Some(rest) = rest.strip_suffix("[*]") else {
            bail!("Records path must end with '[*]': {}", expression);
        };

        let keys: Vec<String> = rest.split('.').map(str::to_string).collect();
        if keys.iter().any(|k| k.is_empty()) {
            bail!("Records path has an empty segment: {}", expression);
        }

        Ok(Self {
            expression: expression.to_string(),
            keys,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// Return the records found at this path.
    ///
    /// A missing key, or a value that is not an array, yields no records.
    pub fn extract(&self, body: &Value) -> Vec<Value> {
        let mut current = body;
        for key in &self.keys {
            match current.get(key) {
                Some(next) => current = next,
                None => return Vec::new(),
            }
        }
        current.as_array().cloned().unwrap_or_default()
    }
}
