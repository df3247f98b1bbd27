//! Pingdom probe servers

use super::{Stream, embedded_schema};
use eyre::Result;
use serde_json::Value;

/// Needs extra account permissions.
pub struct Probes;

impl Stream for Probes {
    fn name(&self) -> &'static str {
        "probes"
    }

    fn path(&self) -> &'static str {
        "/probes"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn records_path(&self) -> &'static str {
        "$.probes[*]"
    }

    fn schema(&self) -> Result<Value> {
        embedded_schema("probes", include_str!("schemas/probes.json"))
    }

    fn selected_by_default(&self) -> bool {
        false
    }
}
