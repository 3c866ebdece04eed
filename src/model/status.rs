//! Structured table health status
//!
//! Row-count health is primary, column-condition health is secondary: the
//! overlay either confirms "OK" more specifically or adds a distinct warning
//! signal, but never overrides a row-count problem. The legacy display string
//! (`"Warn-LowCount;ColCondNotMet"` and friends) is rendered only at the
//! presentation boundary via `Display`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary verdict derived from the row count alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowCountStatus {
    /// Count within configured bounds
    Ok,
    /// Zero rows; takes precedence over configured thresholds
    Empty,
    /// Below the configured minimum (and not zero)
    LowCount,
    /// Above the configured maximum
    HighCount,
    /// The table could not be checked at all
    Error(String),
}

/// Composite table status: row-count verdict plus optional condition overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatus {
    pub row_count: RowCountStatus,
    /// `Some(met)` once column conditions were evaluated for the table
    pub condition: Option<bool>,
}

impl TableStatus {
    pub fn ok() -> Self {
        Self::from(RowCountStatus::Ok)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::from(RowCountStatus::Error(message.into()))
    }

    /// Attach the column-condition verdict
    pub fn with_condition(mut self, met: bool) -> Self {
        self.condition = Some(met);
        self
    }

    /// True only for the bare `OK` status. Anything else, including the more
    /// specific `OK-ColumnConditionMet`, produces an alert row.
    pub fn is_healthy(&self) -> bool {
        self.row_count == RowCountStatus::Ok && self.condition.is_none()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.row_count, RowCountStatus::Error(_))
    }
}

impl From<RowCountStatus> for TableStatus {
    fn from(row_count: RowCountStatus) -> Self {
        Self {
            row_count,
            condition: None,
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.row_count, self.condition) {
            (RowCountStatus::Error(msg), _) => write!(f, "Error: {}", msg),
            (RowCountStatus::Empty, _) => write!(f, "Empty"),
            (RowCountStatus::Ok, None) => write!(f, "OK"),
            (RowCountStatus::Ok, Some(true)) => write!(f, "OK-ColumnConditionMet"),
            (RowCountStatus::Ok, Some(false)) => write!(f, "Warn-ColumnConditionNotMet"),
            (RowCountStatus::LowCount, Some(false)) => write!(f, "Warn-LowCount;ColCondNotMet"),
            (RowCountStatus::LowCount, _) => write!(f, "Warn-LowCount"),
            (RowCountStatus::HighCount, Some(false)) => write!(f, "Warn-HighCount;ColCondNotMet"),
            (RowCountStatus::HighCount, _) => write!(f, "Warn-HighCount"),
        }
    }
}
