//! Uptime checks and their raw test results

use super::{Context, Stream, embedded_schema, from_param};
use crate::schema::{ObjectSchema, integer, string};
use eyre::Result;
use serde_json::Value;

/// Monitors configured in Pingdom.
pub struct Checks;

/// Largest page `/checks` accepts
const CHECKS_PAGE_SIZE: u64 = 25000;

impl Stream for Checks {
    fn name(&self) -> &'static str {
        "checks"
    }

    fn path(&self) -> &'static str {
        "/checks"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn records_path(&self) -> &'static str {
        "$.checks[*]"
    }

    fn schema(&self) -> Result<Value> {
        embedded_schema("checks", include_str!("schemas/checks.json"))
    }

    fn page_size(&self) -> u64 {
        CHECKS_PAGE_SIZE
    }

    fn url_params(&self, _starting_timestamp: Option<i64>) -> Vec<(String, String)> {
        vec![("include_tags".to_string(), "true".to_string())]
    }

    fn child_context(&self, record: &Value) -> Option<Context> {
        let id = record.get("id").filter(|id| !id.is_null())?;
        let mut context = Context::new();
        context.insert("checkid".to_string(), id.clone());
        Some(context)
    }
}

/// Raw test results for one check; runs once per check.
pub struct Results;

/// Largest page `/results/{checkid}` accepts
const RESULTS_PAGE_SIZE: u64 = 1000;

impl Stream for Results {
    fn name(&self) -> &'static str {
        "results"
    }

    fn path(&self) -> &'static str {
        "/results/{checkid}"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["checkid", "time"]
    }

    fn records_path(&self) -> &'static str {
        "$.results[*]"
    }

    // Declared by hand: the upstream item schema is inline in the response
    // wrapper, lacks `probedesc`, and has no `checkid` (copied from the parent).
    fn schema(&self) -> Result<Value> {
        Ok(ObjectSchema::new()
            .required("checkid", integer(), "Check identifier")
            .required("time", integer(), "Test timestamp (Unix time)")
            .optional("status", string(), "Test result status")
            .optional("responsetime", integer(), "Response time (ms)")
            .optional("statusdesc", string(), "Status description")
            .optional("statusdesclong", string(), "Long status description")
            .optional("probeid", integer(), "Probe identifier")
            .optional("probedesc", string(), "Probe description")
            .build())
    }

    fn replication_key(&self) -> Option<&'static str> {
        Some("time")
    }

    fn page_size(&self) -> u64 {
        RESULTS_PAGE_SIZE
    }

    fn parent(&self) -> Option<&'static str> {
        Some("checks")
    }

    fn url_params(&self, starting_timestamp: Option<i64>) -> Vec<(String, String)> {
        from_param(starting_timestamp).into_iter().collect()
    }

    fn post_process(&self, mut record: Value, context: Option<&Context>) -> Value {
        if let (Some(obj), Some(checkid)) = (
            record.as_object_mut(),
            context.and_then(|c| c.get("checkid")),
        ) {
            obj.insert("checkid".to_string(), checkid.clone());
        }
        record
    }
}
