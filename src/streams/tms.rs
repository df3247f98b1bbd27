//! Transaction monitoring (TMS) checks

use super::{Stream, embedded_schema};
use eyre::Result;
use serde_json::Value;

/// Needs extra account permissions.
pub struct TmsChecks;

impl Stream for TmsChecks {
    fn name(&self) -> &'static str {
        "tms_checks"
    }

    fn path(&self) -> &'static str {
        "/tms/check"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn records_path(&self) -> &'static str {
        "$.checks[*]"
    }

    fn schema(&self) -> Result<Value> {
        embedded_schema("tms_checks", include_str!("schemas/tms_checks.json"))
    }

    fn selected_by_default(&self) -> bool {
        false
    }
}
