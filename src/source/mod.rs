//! Data-access seam between the engine and the monitored server
//!
//! The engine never opens connections itself; everything it needs from the
//! monitored SQL Server goes through [`SqlSource`]. Implementations are
//! expected to acquire a short-lived handle per call and release it on every
//! exit path, since the server's availability cannot be assumed stable across
//! the polling interval.

use crate::model::JobRunRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar value exchanged with the data-access layer (query parameters and
/// result cells)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
}

impl SqlValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            SqlValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::String(s) => write!(f, "{}", s),
            SqlValue::Date(d) => write!(f, "{}", d),
        }
    }
}

/// Column metadata for a live table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Data-access failures. Any of these is a hard stop for the one table or job
/// being evaluated, never for the whole cycle.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected result shape: {0}")]
    Malformed(String),
}

/// Read-only interface to the monitored server
#[async_trait]
pub trait SqlSource: Send + Sync {
    /// Total number of rows in a table
    async fn row_count(&self, db: &str, table: &str) -> Result<i64, SourceError>;

    /// Execute an arbitrary count/select statement with positional parameters
    async fn run_query(
        &self,
        db: &str,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Vec<SqlValue>>, SourceError>;

    /// Completed runs of a job within the window, ordered most-recent-first
    async fn recent_job_runs(
        &self,
        job_name: &str,
        within_hours: i64,
    ) -> Result<Vec<JobRunRecord>, SourceError>;

    /// Column metadata for a table
    async fn table_columns(&self, db: &str, table: &str) -> Result<Vec<ColumnInfo>, SourceError>;
}
