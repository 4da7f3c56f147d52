//! Field registry
//!
//! A closed enumeration of every named field an event record carries,
//! together with the storage key used in the persisted layout and in
//! filter configurations. Both the write path and the query engine go
//! through this registry, so a field can never be written under one key
//! and queried under another.
//!
//! Adding or renaming a field changes the persisted layout; bump
//! [`FIELD_REGISTRY_VERSION`] when doing so.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Version of the field registry layout
pub const FIELD_REGISTRY_VERSION: u32 = 1;

/// A named field of an event record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    LogId,
    CreatedAt,
    EventName,
    LogLevel,
    CorrelationId,

    UserId,
    UserName,
    UserEmail,

    Model,
    OsVersion,
    OperatingSystem,
    AppVersion,
    Latitude,
    Longitude,
    TimeZone,
    DeviceId,
}

impl Field {
    /// Every field in the registry, in declaration order
    pub const ALL: [Field; 16] = [
        Field::LogId,
        Field::CreatedAt,
        Field::EventName,
        Field::LogLevel,
        Field::CorrelationId,
        Field::UserId,
        Field::UserName,
        Field::UserEmail,
        Field::Model,
        Field::OsVersion,
        Field::OperatingSystem,
        Field::AppVersion,
        Field::Latitude,
        Field::Longitude,
        Field::TimeZone,
        Field::DeviceId,
    ];

    /// Canonical (camelCase) name of the field
    pub fn name(self) -> &'static str {
        match self {
            Field::LogId => "logId",
            Field::CreatedAt => "createdAt",
            Field::EventName => "eventName",
            Field::LogLevel => "logLevel",
            Field::CorrelationId => "correlationId",
            Field::UserId => "userId",
            Field::UserName => "userName",
            Field::UserEmail => "userEmail",
            Field::Model => "model",
            Field::OsVersion => "osVersion",
            Field::OperatingSystem => "operatingSystem",
            Field::AppVersion => "appVersion",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::TimeZone => "timeZone",
            Field::DeviceId => "deviceId",
        }
    }

    /// Storage key of the field
    pub fn key(self) -> &'static str {
        match self {
            Field::LogId => "log_id",
            Field::CreatedAt => "created_at",
            Field::EventName => "event_name",
            Field::LogLevel => "log_level",
            Field::CorrelationId => "correlation_id",
            Field::UserId => "user_id",
            Field::UserName => "user_name",
            Field::UserEmail => "user_email",
            Field::Model => "model",
            Field::OsVersion => "os_version",
            Field::OperatingSystem => "os",
            Field::AppVersion => "app_version",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::TimeZone => "time_zone",
            Field::DeviceId => "device_id",
        }
    }

    /// Look a field up by its storage key
    pub fn from_key(key: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == key)
            .ok_or_else(|| CoreError::unknown_field(key))
    }

    /// Look a field up by its canonical name
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == name)
            .ok_or_else(|| CoreError::unknown_field(name))
    }

    /// Resolve either a storage key or a canonical name
    ///
    /// Storage keys win when a string is both (e.g. `model`).
    pub fn resolve(name: &str) -> Result<Self, CoreError> {
        Self::from_key(name).or_else(|_| Self::from_name(name))
    }

    /// Whether the field is held in the [`FieldSnapshot`](crate::FieldSnapshot)
    /// rather than assigned per record
    pub fn is_snapshot_field(self) -> bool {
        !matches!(
            self,
            Field::LogId
                | Field::CreatedAt
                | Field::EventName
                | Field::LogLevel
                | Field::CorrelationId
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()).unwrap(), field);
            assert_eq!(Field::from_name(field.name()).unwrap(), field);
        }
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = Field::ALL.iter().map(|f| f.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Field::ALL.len());
    }

    #[test]
    fn test_resolve_accepts_both_forms() {
        assert_eq!(Field::resolve("event_name").unwrap(), Field::EventName);
        assert_eq!(Field::resolve("eventName").unwrap(), Field::EventName);
        assert_eq!("os".parse::<Field>().unwrap(), Field::OperatingSystem);
    }

    #[test]
    fn test_unknown_field() {
        let err = Field::resolve("shoe_size").unwrap_err();
        assert_eq!(err, CoreError::UnknownField("shoe_size".into()));
    }

    #[test]
    fn test_snapshot_fields() {
        assert!(Field::UserId.is_snapshot_field());
        assert!(Field::TimeZone.is_snapshot_field());
        assert!(!Field::LogId.is_snapshot_field());
        assert!(!Field::CreatedAt.is_snapshot_field());
    }
}
