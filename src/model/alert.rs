//! Alert records
//!
//! The alert log is a time series of observations, not a state machine of
//! open/closed incidents: an ongoing problem re-alerts every cycle it is
//! evaluated, and rows are never edited once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the alert came from a table check or a job run check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertType {
    Table,
    Job,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertType::Table => write!(f, "Table"),
            AlertType::Job => write!(f, "Job"),
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Table" => Ok(AlertType::Table),
            "Job" => Ok(AlertType::Job),
            _ => Err(format!("unknown alert type: {}", s)),
        }
    }
}

/// One appended alert row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub created_at: DateTime<Utc>,
    pub alert_type: AlertType,
    /// Free-form reason, e.g. "Empty Table", "Failed Job", "Duration Anomaly"
    pub source_type: String,
    /// The table (`db.table`) or job name the alert refers to
    pub source_name: String,
    /// Rendered status at the time of observation
    pub status: String,
    pub message: String,
    /// Structured payload for the dashboard (per-column verdicts, durations)
    pub details: serde_json::Value,
}
