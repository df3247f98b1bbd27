//! Pingdom streams
//!
//! Each stream is one record type pulled from a Pingdom list endpoint. The
//! [`Stream`] trait describes the endpoint, its schema, and the few hooks a
//! stream can override; [`StreamExtractor`] walks its pages.

mod actions;
mod alerting;
mod checks;
mod extractor;
mod maintenance;
mod probes;
mod tms;

pub use actions::Actions;
pub use alerting::{Contacts, Teams};
pub use checks::{Checks, Results};
pub use extractor::StreamExtractor;
pub use maintenance::{Maintenance, MaintenanceOccurrences};
pub use probes::Probes;
pub use tms::TmsChecks;

use crate::singer::CatalogEntry;
use eyre::{Context as _, Result, bail, eyre};
use serde_json::{Map, Value};

/// Page size used when a stream does not set its own
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Values a parent stream hands to each run of a child stream.
pub type Context = Map<String, Value>;

pub trait Stream: Send + Sync {
    fn name(&self) -> &'static str;

    /// API path, relative to the base URL; may hold `{key}` placeholders
    /// filled from the context.
    fn path(&self) -> &'static str;

    fn primary_keys(&self) -> &'static [&'static str];

    /// JSONPath of the records array in a response page.
    fn records_path(&self) -> &'static str;

    /// The stream's JSON schema.
    fn schema(&self) -> Result<Value>;

    fn replication_key(&self) -> Option<&'static str> {
        None
    }

    fn page_size(&self) -> u64 {
        DEFAULT_PAGE_SIZE
    }

    /// Name of the parent stream, for streams run once per parent record.
    fn parent(&self) -> Option<&'static str> {
        None
    }

    fn selected_by_default(&self) -> bool {
        true
    }

    /// Query parameters besides `offset` and `limit`.
    ///
    /// `starting_timestamp` is the bookmark or configured start date in unix seconds.
    fn url_params(&self, _starting_timestamp: Option<i64>) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Context handed to child streams for one record of this stream.
    fn child_context(&self, _record: &Value) -> Option<Context> {
        None
    }

    /// Adjust a record before it is conformed to the schema.
    fn post_process(&self, record: Value, _context: Option<&Context>) -> Value {
        record
    }

    /// Catalog entry describing this stream.
    fn catalog_entry(&self) -> Result<CatalogEntry> {
        Ok(CatalogEntry::new(
            self.name(),
            self.schema()?,
            self.primary_keys(),
            self.replication_key(),
            self.parent(),
            self.selected_by_default(),
        ))
    }
}

/// All streams the tap knows, parents before their children.
pub fn all_streams() -> Vec<Box<dyn Stream>> {
    vec![
        Box::new(Checks),
        Box::new(Actions),
        Box::new(Contacts),
        Box::new(Results),
        Box::new(Probes),
        Box::new(Maintenance),
        Box::new(MaintenanceOccurrences),
        Box::new(Teams),
        Box::new(TmsChecks),
    ]
}

/// Fill `{key}` placeholders in a path from the context.
pub fn render_path(path: &str, context: Option<&Context>) -> Result<String> {
    let mut rendered = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            bail!("Unclosed placeholder in path: {}", path);
        };
        let key = &rest[start + 1..start + len];
        let value = context
            .and_then(|c| c.get(key))
            .ok_or_else(|| eyre!("No '{}' in context for path {}", key, path))?;

        rendered.push_str(&rest[..start]);
        match value {
            Value::String(s) => rendered.push_str(s),
            other => rendered.push_str(&other.to_string()),
        }
        rest = &rest[start + len + 1..];
    }
    rendered.push_str(rest);

    Ok(rendered)
}

/// Parse a schema document embedded in the binary.
fn embedded_schema(name: &str, source: &str) -> Result<Value> {
    serde_json::from_str(source).with_context(|| format!("Invalid embedded schema: {}", name))
}

/// `from` filter for time-bounded endpoints.
fn from_param(starting_timestamp: Option<i64>) -> Option<(String, String)> {
    starting_timestamp.map(|ts| ("from".to_string(), ts.to_string()))
}
