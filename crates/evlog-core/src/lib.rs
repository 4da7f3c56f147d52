//! # Evlog Core
//!
//! Core types for the evlog embedded event-log store.
//!
//! This crate holds everything that is shared between the write path and
//! the query engine, so that field names and storage keys can never drift
//! apart between the two.
//!
//! ## Key Types
//!
//! - [`Field`]: closed registry of named fields and their storage keys
//! - [`EventRecord`]: the committed shape of one log event
//! - [`FieldSnapshot`]: mutable user/device/location state attached to new records
//! - [`FilterConfig`]: bounds, constraints and limits for one query
//! - [`LogsConfig`]: the JSON configuration document consumed by the logger
//!
//! ## Key Traits
//!
//! - [`Clock`]: time source used to stamp records
//! - [`ContextProvider`]: supplies device fields from the host platform
//! - [`LogSink`]: system-level logging facility that receives rendered records

pub mod config;
pub mod error;
pub mod field;
pub mod filter;
pub mod level;
pub mod property;
pub mod record;
pub mod render;
pub mod snapshot;
pub mod traits;

pub use config::{LogsConfig, parse_timestamp};
pub use error::CoreError;
pub use field::{FIELD_REGISTRY_VERSION, Field};
pub use filter::{FieldFilter, FilterConfig};
pub use level::LogLevel;
pub use property::{Properties, PropertyValue, coerce_properties};
pub use record::{DeviceInfo, EventDraft, EventRecord, SENTINEL, UserInfo};
pub use render::{SerializationFault, render, try_render};
pub use snapshot::{FieldSnapshot, FieldValues};
pub use traits::{
    Clock, ContextProvider, LogSink, ManualClock, RecordingSink, SinkError, StaticContext,
    SystemClock,
};
