//! Canonical rendering
//!
//! Turns a record into the JSON string that is stored alongside it and
//! forwarded to the system logger:
//!
//! ```text
//! {"log_id":..,"created_at":..,"event_name":..,"log_level":..,"correlation_id":..,
//!  "user_info":{"id":..,"name":..,"email":..},
//!  "device_info":{"model":..,"os_version":..,"os":..,"app_version":..,
//!                 "latitude":..,"longitude":..,"time_zone":..,"device_id":..},
//!  "properties":{..}}
//! ```
//!
//! Rendering never fails from the caller's point of view: an encoding
//! fault is replaced by a diagnostic JSON object, because the output feeds
//! the logging path itself.

use thiserror::Error;
use tracing::warn;

use crate::record::EventRecord;

/// Internal encoding failure; recovered locally by [`render`]
#[derive(Debug, Error)]
#[error("Failed to render record {log_id}: {reason}")]
pub struct SerializationFault {
    pub log_id: String,
    pub reason: String,
}

impl SerializationFault {
    /// Best-effort replacement payload
    pub fn diagnostic(&self) -> String {
        serde_json::json!({
            "log_id": self.log_id,
            "serialization_fault": self.reason,
        })
        .to_string()
    }
}

/// Render a record, reporting encoding faults
pub fn try_render(record: &EventRecord) -> Result<String, SerializationFault> {
    serde_json::to_string(record).map_err(|e| SerializationFault {
        log_id: record.id().to_string(),
        reason: e.to_string(),
    })
}

/// Render a record to its canonical string
///
/// Deterministic: the same record always renders to identical bytes.
pub fn render(record: &EventRecord) -> String {
    match try_render(record) {
        Ok(rendered) => rendered,
        Err(fault) => {
            warn!(log_id = %fault.log_id, reason = %fault.reason, "Substituting diagnostic payload");
            fault.diagnostic()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::level::LogLevel;
    use crate::property::{Properties, coerce_properties};
    use crate::record::EventDraft;
    use crate::snapshot::FieldValues;
    use chrono::{TimeZone, Utc};

    fn record() -> EventRecord {
        let properties: Properties = coerce_properties([("b", 2), ("a", 1)]);
        let draft = EventDraft::new("purchase", LogLevel::Error, properties).unwrap();
        let values = FieldValues::from([(Field::UserEmail, "a@b.c"), (Field::OperatingSystem, "ios")]);
        let created_at = Utc.with_ymd_and_hms(2025, 8, 14, 12, 0, 0).unwrap();
        EventRecord::assemble(draft, &values, "log-7", created_at)
    }

    #[test]
    fn test_render_is_idempotent() {
        let record = record();
        assert_eq!(render(&record), render(&record));
        assert_eq!(render(&record), record.rendered_payload());
    }

    #[test]
    fn test_render_key_layout() {
        let rendered = render(&record());
        let expected = concat!(
            r#"{"log_id":"log-7","created_at":"2025-08-14T12:00:00Z","event_name":"purchase","#,
            r#""log_level":"error","correlation_id":"log-7","#,
            r#""user_info":{"id":"nil","name":"nil","email":"a@b.c"},"#,
            r#""device_info":{"model":"nil","os_version":"nil","os":"ios","app_version":"nil","#,
            r#""latitude":"nil","longitude":"nil","time_zone":"nil","device_id":"nil"},"#,
            r#""properties":{"a":"1","b":"2"}}"#
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_diagnostic_is_valid_json() {
        let fault = SerializationFault {
            log_id: "x\"y".into(),
            reason: "boom".into(),
        };
        let parsed: serde_json::Value = serde_json::from_str(&fault.diagnostic()).unwrap();
        assert_eq!(parsed["log_id"], "x\"y");
        assert_eq!(parsed["serialization_fault"], "boom");
    }
}
