//! Alerting contacts and teams

use super::{Stream, embedded_schema};
use crate::schema::apply_schema_patch;
use eyre::Result;
use serde_json::{Value, json};

/// Alerting contacts.
pub struct Contacts;

impl Stream for Contacts {
    fn name(&self) -> &'static str {
        "contacts"
    }

    fn path(&self) -> &'static str {
        "/alerting/contacts"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn records_path(&self) -> &'static str {
        "$.contacts[*]"
    }

    /// `notification_targets` is an `anyOf` over SMS, email, APNS and AGCM
    /// targets upstream; it is flattened to a plain nullable object.
    fn schema(&self) -> Result<Value> {
        let base = embedded_schema("contacts", include_str!("schemas/contacts.json"))?;
        let patches = json!({
            "properties": {
                "notification_targets": {
                    "anyOf": null,
                    "type": ["object", "null"],
                    "description": "Notification targets configuration",
                },
            },
        });
        Ok(apply_schema_patch(&base, &patches))
    }
}

/// Alerting teams. Needs extra account permissions.
pub struct Teams;

impl Stream for Teams {
    fn name(&self) -> &'static str {
        "teams"
    }

    fn path(&self) -> &'static str {
        "/alerting/teams"
    }

    fn primary_keys(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn records_path(&self) -> &'static str {
        "$.teams[*]"
    }

    fn schema(&self) -> Result<Value> {
        embedded_schema("teams", include_str!("schemas/teams.json"))
    }

    fn selected_by_default(&self) -> bool {
        false
    }
}
