//! Maintenance windows. Both streams need extra account permissions.

use super::Stream;
use crate::schema::{ObjectSchema, array, integer, string};
use eyre::Result;
use serde_json::Value;

pub struct Maintenance;

impl Stream for Maintenance {
    fn name(&self) -> &'static str {
        "maintenance"
    }

    fn path(&self) -> &'static str {
        "/maintenance"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn records_path(&self) -> &'static str {
        "$.maintenance[*]"
    }

    // Upstream also lists `repeatevery` and `effectiveto`, which the API does
    // not return reliably.
    fn schema(&self) -> Result<Value> {
        let checks = ObjectSchema::new()
            .field("uptime", array(integer()))
            .field("tms", array(integer()))
            .build();

        Ok(ObjectSchema::new()
            .required("id", integer(), "Maintenance window identifier")
            .optional("description", string(), "Description")
            .optional("from", integer(), "Start timestamp")
            .optional("to", integer(), "End timestamp")
            .optional("recurrencetype", string(), "Recurrence type")
            .optional("checks", checks, "Affected checks")
            .build())
    }

    fn selected_by_default(&self) -> bool {
        false
    }
}

pub struct MaintenanceOccurrences;

impl Stream for MaintenanceOccurrences {
    fn name(&self) -> &'static str {
        "maintenance_occurrences"
    }

    fn path(&self) -> &'static str {
        "/maintenance.occurrences"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn records_path(&self) -> &'static str {
        "$.occurrences[*]"
    }

    fn schema(&self) -> Result<Value> {
        Ok(ObjectSchema::new()
            .required("id", integer(), "Occurrence identifier")
            .optional("maintenanceid", integer(), "Parent maintenance window ID")
            .optional("from", integer(), "Start timestamp")
            .optional("to", integer(), "End timestamp")
            .build())
    }

    fn selected_by_default(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_maintenance_checks_object() {
        let schema = Maintenance.schema().unwrap();
        let checks = &schema["properties"]["checks"];
        assert_eq!(checks["type"], json!(["object", "null"]));
        assert_eq!(
            checks["properties"]["uptime"],
            json!({"type": ["array", "null"], "items": {"type": "integer"}})
        );
    }

    #[test]
    fn test_occurrences_path() {
        assert_eq!(MaintenanceOccurrences.path(), "/maintenance.occurrences");
        assert!(!MaintenanceOccurrences.selected_by_default());
    }
}
