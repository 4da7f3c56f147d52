//! Logs configuration document
//!
//! The JSON document that drives the default query and the (external)
//! sync schedule:
//!
//! ```json
//! {
//!   "sync_frequency": 3600,
//!   "logs_after": "2025-08-01T00:00:00.000Z",
//!   "logs_before": "2025-08-31 23:59:59",
//!   "events_count": 500,
//!   "page_size": 50,
//!   "filters": [{"log_level": ["error", "fault"]}, {"user_id": ["u-1"]}]
//! }
//! ```
//!
//! Timestamps accept RFC 3339 (with or without fractional seconds) or
//! `yyyy-MM-dd HH:mm:ss` in the local time zone. An empty, `null` or
//! missing timestamp leaves that side unbounded.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::filter::{FieldFilter, FilterConfig};

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decoded logs configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsConfig {
    /// Remote sync period; not interpreted by the store
    pub sync_frequency: i64,
    #[serde(default, with = "lenient_timestamp")]
    pub logs_after: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_timestamp")]
    pub logs_before: Option<DateTime<Utc>>,
    pub events_count: usize,
    pub page_size: i64,
    /// Single-key `{field: [values]}` maps
    #[serde(default)]
    pub filters: Vec<BTreeMap<String, Vec<String>>>,
}

impl Default for LogsConfig {
    fn default() -> Self {
        let query = FilterConfig::default();
        Self {
            sync_frequency: 0,
            logs_after: None,
            logs_before: None,
            events_count: query.events_count,
            page_size: query.page_size,
            filters: Vec::new(),
        }
    }
}

impl LogsConfig {
    /// Decode from a JSON document
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode as a JSON document
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The query this configuration describes
    ///
    /// A filter map with several keys contributes one constraint per key.
    pub fn filter_config(&self) -> FilterConfig {
        let filters = self
            .filters
            .iter()
            .flat_map(|map| {
                map.iter()
                    .map(|(field, values)| FieldFilter::new(field.clone(), values.iter().cloned()))
            })
            .collect();

        FilterConfig {
            logs_after: self.logs_after,
            logs_before: self.logs_before,
            filters,
            events_count: self.events_count,
            page_size: self.page_size,
        }
    }
}

/// Parse a configuration timestamp
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, LOCAL_FORMAT)
        .map_err(|_| CoreError::InvalidTimestamp(raw.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CoreError::InvalidTimestamp(raw.to_string()))
}

mod lenient_timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&crate::record::timestamp::format(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_document() {
        let json = r#"{
            "sync_frequency": 3600,
            "logs_after": "2025-08-01T00:00:00.000Z",
            "logs_before": "2025-08-31T23:59:59Z",
            "events_count": 500,
            "page_size": 50,
            "filters": [{"log_level": ["error", "fault"]}, {"user_id": ["u-1"]}]
        }"#;
        let config = LogsConfig::from_json(json).unwrap();
        assert_eq!(config.sync_frequency, 3600);
        assert_eq!(config.events_count, 500);

        let query = config.filter_config();
        assert_eq!(query.logs_after, Some(parse_timestamp("2025-08-01T00:00:00Z").unwrap()));
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[0].field, "log_level");
        assert_eq!(query.filters[1].values, vec!["u-1"]);
        assert_eq!(query.page_size, 50);
    }

    #[test]
    fn test_empty_and_missing_timestamps_are_unbounded() {
        let json = r#"{"sync_frequency": 1, "logs_after": "", "logs_before": null,
                       "events_count": 10, "page_size": 0}"#;
        let config = LogsConfig::from_json(json).unwrap();
        assert_eq!(config.logs_after, None);
        assert_eq!(config.logs_before, None);
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_multi_key_filter_map() {
        let json = r#"{"sync_frequency": 1, "events_count": 10, "page_size": 0,
                       "filters": [{"log_level": ["info"], "event_name": ["open"]}]}"#;
        let query = LogsConfig::from_json(json).unwrap().filter_config();
        assert_eq!(query.filters.len(), 2);
    }

    #[test]
    fn test_invalid_timestamp_is_rejected() {
        let json = r#"{"sync_frequency": 1, "logs_after": "yesterday",
                       "events_count": 10, "page_size": 0}"#;
        let err = LogsConfig::from_json(json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn test_local_timestamp_format() {
        let parsed = parse_timestamp("2025-08-14 10:00:00").unwrap();
        let expected = Local
            .with_ymd_and_hms(2025, 8, 14, 10, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_json_round_trip() {
        let config = LogsConfig {
            logs_after: Some(parse_timestamp("2025-08-01T00:00:00Z").unwrap()),
            ..Default::default()
        };
        let decoded = LogsConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(decoded, config);
    }
}
