//! Log levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Severity of an event record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Default,
    Info,
    Debug,
    Error,
    Fault,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Default,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Error,
        LogLevel::Fault,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Default => "default",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Error => "error",
            LogLevel::Fault => "fault",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| CoreError::UnknownLevel(s.to_string()))
    }
}
