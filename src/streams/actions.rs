//! Alert history

use super::{Stream, from_param};
use crate::schema::{ObjectSchema, boolean, integer, string};
use eyre::Result;
use serde_json::Value;

/// Alerts sent for checks.
pub struct Actions;

impl Stream for Actions {
    fn name(&self) -> &'static str {
        "actions"
    }

    fn path(&self) -> &'static str {
        "/actions"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["checkid", "time", "userid"]
    }

    fn records_path(&self) -> &'static str {
        "$.actions.alerts[*]"
    }

    // Declared by hand: upstream types `checkid`, `time` and `userid` as
    // strings and `charged` as a string, but the API returns integers and a boolean.
    fn schema(&self) -> Result<Value> {
        Ok(ObjectSchema::new()
            .required("checkid", integer(), "Check identifier")
            .required("time", integer(), "Alert time (Unix timestamp)")
            .required("userid", integer(), "User identifier")
            .optional("username", string(), "User name")
            .optional("via", string(), "Alert medium")
            .optional("status", string(), "Alert status")
            .optional("messageshort", string(), "Short message")
            .optional("messagefull", string(), "Full message")
            .optional("sentto", string(), "Recipient address")
            .optional("charged", boolean(), "Whether charged")
            .build())
    }

    fn replication_key(&self) -> Option<&'static str> {
        Some("time")
    }

    fn url_params(&self, starting_timestamp: Option<i64>) -> Vec<(String, String)> {
        from_param(starting_timestamp).into_iter().collect()
    }
}
