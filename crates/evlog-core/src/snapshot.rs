//! Field snapshot
//!
//! The user, device and location values attached to every new record.
//! The snapshot is owned by one logger instance and mutated by explicit
//! setters and by context refreshes.
//!
//! # Consistency
//!
//! Setters are not ordered against submissions. The write path captures
//! the snapshot when a submission reaches the write channel, so a setter
//! racing a submission may or may not be reflected in that record. This
//! is best-effort attribution, not a causal guarantee. A single capture is
//! always internally consistent: it never mixes two halves of one setter
//! call (e.g. a new user id with the previous user name).

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::field::Field;
use crate::record::SENTINEL;
use crate::traits::ContextProvider;

/// Immutable copy of the snapshot taken by the write path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: HashMap<Field, String>,
}

impl FieldValues {
    /// Value of a field, or `None` when unset
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Value of a field, or the `"nil"` sentinel when unset
    pub fn value_or_sentinel(&self, field: Field) -> String {
        self.get(field).unwrap_or(SENTINEL).to_string()
    }

    /// Number of fields currently set
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<const N: usize> From<[(Field, &str); N]> for FieldValues {
    fn from(entries: [(Field, &str); N]) -> Self {
        Self {
            values: entries
                .into_iter()
                .map(|(field, value)| (field, value.to_string()))
                .collect(),
        }
    }
}

/// Mutable, process-local field state owned by a logger
#[derive(Debug, Default)]
pub struct FieldSnapshot {
    values: RwLock<HashMap<Field, String>>,
}

impl FieldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear a single field
    pub fn set(&self, field: Field, value: Option<String>) {
        let mut values = self.values.write();
        match value {
            Some(v) => values.insert(field, v),
            None => values.remove(&field),
        };
    }

    /// Current value of a field
    pub fn get(&self, field: Field) -> Option<String> {
        self.values.read().get(&field).cloned()
    }

    /// Set the user fields; a missing email clears any previous one
    pub fn set_user(&self, id: impl Into<String>, name: impl Into<String>, email: Option<String>) {
        let mut values = self.values.write();
        values.insert(Field::UserId, id.into());
        values.insert(Field::UserName, name.into());
        match email {
            Some(email) => values.insert(Field::UserEmail, email),
            None => values.remove(&Field::UserEmail),
        };
    }

    pub fn set_device_id(&self, device_id: impl Into<String>) {
        self.set(Field::DeviceId, Some(device_id.into()));
    }

    /// Set the location; coordinates are stored with six decimal places
    pub fn set_location(&self, latitude: Option<f64>, longitude: Option<f64>) {
        let mut values = self.values.write();
        for (field, coordinate) in [(Field::Latitude, latitude), (Field::Longitude, longitude)] {
            match coordinate {
                Some(c) => values.insert(field, format!("{c:.6}")),
                None => values.remove(&field),
            };
        }
    }

    /// Pull the device fields from a context provider
    ///
    /// Fields the provider cannot supply are cleared, so they render as
    /// the sentinel rather than keeping a stale value.
    pub fn refresh_from(&self, provider: &dyn ContextProvider) {
        let updates = [
            (Field::Model, provider.current_model()),
            (Field::OsVersion, provider.current_os_version()),
            (Field::OperatingSystem, provider.current_os_name()),
            (Field::TimeZone, provider.current_time_zone_id()),
            (Field::AppVersion, provider.current_app_version()),
        ];

        let mut values = self.values.write();
        for (field, value) in updates {
            match value {
                Some(v) => values.insert(field, v),
                None => values.remove(&field),
            };
        }
    }

    /// Take an immutable copy of the current state
    pub fn capture(&self) -> FieldValues {
        FieldValues {
            values: self.values.read().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StaticContext;

    #[test]
    fn test_unset_fields_render_as_sentinel() {
        let snapshot = FieldSnapshot::new();
        let values = snapshot.capture();
        assert!(values.is_empty());
        assert_eq!(values.value_or_sentinel(Field::UserId), "nil");
    }

    #[test]
    fn test_set_user_clears_email() {
        let snapshot = FieldSnapshot::new();
        snapshot.set_user("u1", "Ada", Some("ada@example.com".into()));
        assert_eq!(snapshot.get(Field::UserEmail).as_deref(), Some("ada@example.com"));

        snapshot.set_user("u2", "Grace", None);
        assert_eq!(snapshot.get(Field::UserId).as_deref(), Some("u2"));
        assert_eq!(snapshot.get(Field::UserEmail), None);
    }

    #[test]
    fn test_location_formatting() {
        let snapshot = FieldSnapshot::new();
        snapshot.set_location(Some(37.7749), Some(-122.4194));
        assert_eq!(snapshot.get(Field::Latitude).as_deref(), Some("37.774900"));
        assert_eq!(snapshot.get(Field::Longitude).as_deref(), Some("-122.419400"));

        snapshot.set_location(None, Some(1.5));
        assert_eq!(snapshot.get(Field::Latitude), None);
        assert_eq!(snapshot.get(Field::Longitude).as_deref(), Some("1.500000"));
    }

    #[test]
    fn test_refresh_from_provider() {
        let snapshot = FieldSnapshot::new();
        let context = StaticContext::default()
            .with_model("Pixel")
            .with_os_name("android")
            .with_app_version("2.1", "45");
        snapshot.refresh_from(&context);

        let values = snapshot.capture();
        assert_eq!(values.get(Field::Model), Some("Pixel"));
        assert_eq!(values.get(Field::OperatingSystem), Some("android"));
        assert_eq!(values.get(Field::AppVersion), Some("2.1.45"));
        assert_eq!(values.get(Field::OsVersion), None);
    }

    #[test]
    fn test_capture_is_detached() {
        let snapshot = FieldSnapshot::new();
        snapshot.set_device_id("device-1");
        let captured = snapshot.capture();
        snapshot.set_device_id("device-2");
        assert_eq!(captured.get(Field::DeviceId), Some("device-1"));
    }
}
