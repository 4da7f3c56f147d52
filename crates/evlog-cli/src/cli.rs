use std::path::PathBuf;

use clap::{Parser, Subcommand};
use evlog_core::{LogLevel, PropertyValue};

#[derive(Parser)]
#[command(name = "evlog", about = "Inspect and append to an evlog database")]
pub struct Cli {
    /// Database file
    #[arg(long, default_value = "./data/evlog.redb")]
    pub db: PathBuf,

    /// Log level for diagnostics (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Append an event
    Submit {
        /// Event name
        event: String,
        /// Record level (default, info, debug, error, fault)
        #[arg(long, default_value = "default")]
        level: LogLevel,
        /// Property as key=value; repeatable
        #[arg(long = "prop", value_parser = parse_property)]
        props: Vec<(String, PropertyValue)>,
        /// Attribute the event to this user id
        #[arg(long)]
        user: Option<String>,
    },
    /// Run a query and print matching records as JSON lines
    Query {
        /// Logs configuration document (JSON); other query flags are ignored when set
        #[arg(long)]
        config: Option<PathBuf>,
        /// Lower bound on created_at (RFC 3339 or "yyyy-MM-dd HH:mm:ss")
        #[arg(long)]
        after: Option<String>,
        /// Upper bound on created_at
        #[arg(long)]
        before: Option<String>,
        /// Constraint as field=value[,value...]; repeatable
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, Vec<String>)>,
        /// Maximum number of records
        #[arg(long, default_value_t = 1000)]
        count: usize,
        /// Records per page; zero or less prints a single page
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        page_size: i64,
    },
    /// Print one record by id
    Get {
        id: String,
    },
    /// Print the number of committed records
    Count,
}

/// Parse `key=value`, typing the value as bool, integer or float before
/// falling back to a string
pub fn parse_property(raw: &str) -> Result<(String, PropertyValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty property key in `{raw}`"));
    }

    let typed = if let Ok(b) = value.parse::<bool>() {
        PropertyValue::Bool(b)
    } else if let Ok(i) = value.parse::<i64>() {
        PropertyValue::Int(i)
    } else if let Ok(u) = value.parse::<u64>() {
        PropertyValue::UInt(u)
    } else if let Ok(f) = value.parse::<f64>() {
        PropertyValue::Float(f)
    } else {
        PropertyValue::String(value.to_string())
    };

    Ok((key.to_string(), typed))
}

/// Parse `field=v1,v2`
pub fn parse_filter(raw: &str) -> Result<(String, Vec<String>), String> {
    let (field, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value[,value...], got `{raw}`"))?;
    Ok((
        field.to_string(),
        values.split(',').map(str::to_string).collect(),
    ))
}
