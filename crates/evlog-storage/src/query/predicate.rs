//! Filter predicates
//!
//! A small expression tree built from a [`FilterConfig`] and evaluated
//! directly against records.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use evlog_core::{EventRecord, Field, FilterConfig};

use crate::error::QueryError;

/// Conjunctive filter over event records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every record
    True,
    /// Inclusive bounds on `created_at`
    CreatedAt {
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    },
    /// Field value is one of the listed values
    In { field: Field, values: BTreeSet<String> },
    /// All sub-predicates hold
    And(Vec<Predicate>),
}

impl Predicate {
    /// Build the predicate a filter configuration describes
    ///
    /// Fails with [`QueryError::UnknownField`] on the first constraint whose
    /// field is not in the registry.
    pub fn from_config(config: &FilterConfig) -> Result<Self, QueryError> {
        let mut predicate = Predicate::True;

        if config.logs_after.is_some() || config.logs_before.is_some() {
            predicate = predicate.and(Predicate::CreatedAt {
                after: config.logs_after,
                before: config.logs_before,
            });
        }

        for filter in &config.filters {
            let field = Field::resolve(&filter.field)
                .map_err(|_| QueryError::UnknownField(filter.field.clone()))?;
            predicate = predicate.and(Predicate::In {
                field,
                values: filter.values.iter().cloned().collect(),
            });
        }

        Ok(predicate)
    }

    /// Conjunction of two predicates, flattening `True` and nested `And`
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::True, p) | (p, Predicate::True) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (p, Predicate::And(mut right)) => {
                right.insert(0, p);
                Predicate::And(right)
            }
            (left, right) => Predicate::And(vec![left, right]),
        }
    }

    /// Evaluate against a record
    pub fn matches(&self, record: &EventRecord) -> bool {
        match self {
            Predicate::True => true,
            Predicate::CreatedAt { after, before } => {
                let created_at = record.created_at();
                after.is_none_or(|a| created_at >= a) && before.is_none_or(|b| created_at <= b)
            }
            Predicate::In { field, values } => values.contains(&*record.value_of(*field)),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => f.write_str("TRUE"),
            Predicate::CreatedAt { after, before } => {
                let bounds: Vec<String> = after
                    .map(|a| format!("{} >= {}", Field::CreatedAt, a.to_rfc3339()))
                    .into_iter()
                    .chain(before.map(|b| format!("{} <= {}", Field::CreatedAt, b.to_rfc3339())))
                    .collect();
                if bounds.is_empty() {
                    f.write_str("TRUE")
                } else {
                    f.write_str(&bounds.join(" AND "))
                }
            }
            Predicate::In { field, values } => {
                let list: Vec<&str> = values.iter().map(String::as_str).collect();
                write!(f, "{field} IN {{{}}}", list.join(", "))
            }
            Predicate::And(parts) => {
                let rendered: Vec<String> = parts.iter().map(ToString::to_string).collect();
                f.write_str(&rendered.join(" AND "))
            }
        }
    }
}
