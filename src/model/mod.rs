//! Shared domain types for table and job monitoring

pub mod alert;
pub mod config;
pub mod job;
pub mod status;

pub use alert::{Alert, AlertType};
pub use config::{ColumnConditionConfig, ConditionType, JobMonitorConfig, TableMonitorConfig};
pub use job::{DurationStatus, JobRunEvaluation, JobRunRecord, JobTerminalStatus};
pub use status::{RowCountStatus, TableStatus};
