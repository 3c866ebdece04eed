//! Monitoring configuration types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A table selected for monitoring, unique per (database, table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMonitorConfig {
    pub db_name: String,
    pub table_name: String,
    /// Alert below this row count (if set)
    pub min_rows: Option<i64>,
    /// Alert above this row count (if set)
    pub max_rows: Option<i64>,
    /// Minimum rows that must satisfy all column conditions simultaneously.
    /// `0` means every row in the table must satisfy them (an empty table
    /// never qualifies).
    pub min_match_count: i64,
}

impl TableMonitorConfig {
    pub fn new(db_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            table_name: table_name.into(),
            min_rows: None,
            max_rows: None,
            min_match_count: 1,
        }
    }

    pub fn with_min_rows(mut self, min: i64) -> Self {
        self.min_rows = Some(min);
        self
    }

    pub fn with_max_rows(mut self, max: i64) -> Self {
        self.max_rows = Some(max);
        self
    }

    pub fn with_min_match_count(mut self, count: i64) -> Self {
        self.min_match_count = count;
        self
    }
}

/// A declarative predicate over one table column, unique per
/// (database, table, column). Sibling conditions on the same table are
/// combined with AND.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConditionConfig {
    pub db_name: String,
    pub table_name: String,
    pub column_name: String,
    pub condition_type: ConditionType,
    /// Comparison value; comma-separated list for [`ConditionType::In`],
    /// `YYYY-MM-DD` for the date comparisons, unused for
    /// [`ConditionType::DateEqualsToday`].
    pub condition_value: String,
}

impl ColumnConditionConfig {
    pub fn new(
        db_name: impl Into<String>,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        condition_type: ConditionType,
        condition_value: impl Into<String>,
    ) -> Self {
        Self {
            db_name: db_name.into(),
            table_name: table_name.into(),
            column_name: column_name.into(),
            condition_type,
            condition_value: condition_value.into(),
        }
    }
}

/// Supported column predicate types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    Equals,
    NotEquals,
    In,
    DateEqualsToday,
    DateGreaterThan,
    DateLessThan,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionType::Equals => "equals",
            ConditionType::NotEquals => "not_equals",
            ConditionType::In => "in",
            ConditionType::DateEqualsToday => "date_equals_today",
            ConditionType::DateGreaterThan => "date_greater_than",
            ConditionType::DateLessThan => "date_less_than",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ConditionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equals" => Ok(ConditionType::Equals),
            "not_equals" => Ok(ConditionType::NotEquals),
            "in" => Ok(ConditionType::In),
            "date_equals_today" => Ok(ConditionType::DateEqualsToday),
            "date_greater_than" => Ok(ConditionType::DateGreaterThan),
            "date_less_than" => Ok(ConditionType::DateLessThan),
            _ => Err(format!("unknown condition type: {}", s)),
        }
    }
}

/// A scheduled job selected for monitoring, unique per job name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMonitorConfig {
    pub job_name: String,
}

impl JobMonitorConfig {
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            job_name: job_name.into(),
        }
    }
}
