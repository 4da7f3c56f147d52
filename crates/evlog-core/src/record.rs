//! Event record model
//!
//! An [`EventRecord`] is one committed log entry: the caller's event name,
//! level and properties plus a copy of the user and device context at the
//! time of submission. Records are assembled once, rendered once, and are
//! immutable afterwards; no setters are exposed.

use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::Field;
use crate::level::LogLevel;
use crate::property::Properties;
use crate::render::render;
use crate::snapshot::FieldValues;

/// Stored in place of any context value that was not set
pub const SENTINEL: &str = "nil";

fn sentinel() -> String {
    SENTINEL.to_string()
}

/// User attached to a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            user_id: sentinel(),
            name: sentinel(),
            email: sentinel(),
        }
    }
}

impl UserInfo {
    fn from_values(values: &FieldValues) -> Self {
        Self {
            user_id: values.value_or_sentinel(Field::UserId),
            name: values.value_or_sentinel(Field::UserName),
            email: values.value_or_sentinel(Field::UserEmail),
        }
    }
}

/// Device and location attached to a record
///
/// Field order is the rendered key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub model: String,
    pub os_version: String,
    #[serde(rename = "os")]
    pub operating_system: String,
    pub app_version: String,
    pub latitude: String,
    pub longitude: String,
    pub time_zone: String,
    pub device_id: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            model: sentinel(),
            os_version: sentinel(),
            operating_system: sentinel(),
            app_version: sentinel(),
            latitude: sentinel(),
            longitude: sentinel(),
            time_zone: sentinel(),
            device_id: sentinel(),
        }
    }
}

impl DeviceInfo {
    fn from_values(values: &FieldValues) -> Self {
        Self {
            model: values.value_or_sentinel(Field::Model),
            os_version: values.value_or_sentinel(Field::OsVersion),
            operating_system: values.value_or_sentinel(Field::OperatingSystem),
            app_version: values.value_or_sentinel(Field::AppVersion),
            latitude: values.value_or_sentinel(Field::Latitude),
            longitude: values.value_or_sentinel(Field::Longitude),
            time_zone: values.value_or_sentinel(Field::TimeZone),
            device_id: values.value_or_sentinel(Field::DeviceId),
        }
    }
}

/// Caller input for one submission, before id, timestamp and context are attached
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub event_name: String,
    pub level: LogLevel,
    pub properties: Properties,
}

impl EventDraft {
    /// Create a draft; the event name must not be empty
    pub fn new(
        event_name: impl Into<String>,
        level: LogLevel,
        properties: Properties,
    ) -> Result<Self, CoreError> {
        let event_name = event_name.into();
        if event_name.is_empty() {
            return Err(CoreError::EmptyEventName);
        }
        Ok(Self {
            event_name,
            level,
            properties,
        })
    }
}

/// One committed log entry
///
/// Serialized field order is the canonical rendered layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "log_id")]
    id: String,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
    event_name: String,
    #[serde(rename = "log_level")]
    level: LogLevel,
    correlation_id: String,
    user_info: UserInfo,
    device_info: DeviceInfo,
    properties: Properties,
    #[serde(skip)]
    rendered_payload: String,
}

impl EventRecord {
    /// Assemble a record from a draft and a captured field snapshot
    ///
    /// Pure: the id and timestamp are supplied by the caller. The
    /// canonical payload is rendered here, once.
    pub fn assemble(
        draft: EventDraft,
        values: &FieldValues,
        id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        let mut record = Self {
            correlation_id: id.clone(),
            id,
            created_at,
            event_name: draft.event_name,
            level: draft.level,
            user_info: UserInfo::from_values(values),
            device_info: DeviceInfo::from_values(values),
            properties: draft.properties,
            rendered_payload: String::new(),
        };
        record.rendered_payload = render(&record);
        record
    }

    /// Rebuild a record from its stored payload
    ///
    /// The payload is kept verbatim as the rendered form; nothing is
    /// re-rendered.
    pub fn from_payload(payload: impl Into<String>) -> Result<Self, serde_json::Error> {
        let payload = payload.into();
        let mut record: EventRecord = serde_json::from_str(&payload)?;
        record.rendered_payload = payload;
        Ok(record)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Equals [`id`](Self::id) at creation
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Canonical serialized form, computed at commit time
    pub fn rendered_payload(&self) -> &str {
        &self.rendered_payload
    }

    /// String value of a registry field, as compared by filters
    pub fn value_of(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::LogId => Cow::Borrowed(&self.id),
            Field::CreatedAt => Cow::Owned(timestamp::format(&self.created_at)),
            Field::EventName => Cow::Borrowed(&self.event_name),
            Field::LogLevel => Cow::Borrowed(self.level.as_str()),
            Field::CorrelationId => Cow::Borrowed(&self.correlation_id),
            Field::UserId => Cow::Borrowed(&self.user_info.user_id),
            Field::UserName => Cow::Borrowed(&self.user_info.name),
            Field::UserEmail => Cow::Borrowed(&self.user_info.email),
            Field::Model => Cow::Borrowed(&self.device_info.model),
            Field::OsVersion => Cow::Borrowed(&self.device_info.os_version),
            Field::OperatingSystem => Cow::Borrowed(&self.device_info.operating_system),
            Field::AppVersion => Cow::Borrowed(&self.device_info.app_version),
            Field::Latitude => Cow::Borrowed(&self.device_info.latitude),
            Field::Longitude => Cow::Borrowed(&self.device_info.longitude),
            Field::TimeZone => Cow::Borrowed(&self.device_info.time_zone),
            Field::DeviceId => Cow::Borrowed(&self.device_info.device_id),
        }
    }
}

/// RFC 3339 timestamps in UTC with `Z` suffix and only as many fractional
/// digits as needed
pub mod timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> EventRecord {
        let values = FieldValues::from([
            (Field::UserId, "u-1"),
            (Field::UserName, "Ada"),
            (Field::Model, "Pixel 8"),
            (Field::Latitude, "51.500000"),
        ]);
        let mut properties = Properties::new();
        properties.insert("screen".into(), "home".into());
        let draft = EventDraft::new("app_open", LogLevel::Info, properties).unwrap();
        let created_at = Utc.with_ymd_and_hms(2025, 8, 14, 10, 30, 0).unwrap();
        EventRecord::assemble(draft, &values, "id-1", created_at)
    }

    #[test]
    fn test_assemble_defaults_to_sentinel() {
        let record = sample_record();
        assert_eq!(record.user_info().user_id, "u-1");
        assert_eq!(record.user_info().email, SENTINEL);
        assert_eq!(record.device_info().model, "Pixel 8");
        assert_eq!(record.device_info().device_id, SENTINEL);
        assert_eq!(record.device_info().time_zone, SENTINEL);
    }

    #[test]
    fn test_correlation_id_equals_id() {
        let record = sample_record();
        assert_eq!(record.correlation_id(), record.id());
    }

    #[test]
    fn test_empty_event_name_rejected() {
        let err = EventDraft::new("", LogLevel::Info, Properties::new()).unwrap_err();
        assert_eq!(err, CoreError::EmptyEventName);
    }

    #[test]
    fn test_from_payload_keeps_payload() {
        let record = sample_record();
        let restored = EventRecord::from_payload(record.rendered_payload()).unwrap();
        assert_eq!(restored, record);
        assert_eq!(restored.rendered_payload(), record.rendered_payload());
    }

    #[test]
    fn test_value_of() {
        let record = sample_record();
        assert_eq!(record.value_of(Field::EventName), "app_open");
        assert_eq!(record.value_of(Field::LogLevel), "info");
        assert_eq!(record.value_of(Field::UserName), "Ada");
        assert_eq!(record.value_of(Field::CreatedAt), "2025-08-14T10:30:00Z");
    }
}
