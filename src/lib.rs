//! Sqlmon: SQL Server Table & Job Monitoring Engine
//!
//! A decision engine that turns raw table row counts, column-level predicates,
//! and job run histories into a small set of health states, persists check
//! results and derived alerts, and leaves rendering to the caller.
//!
//! # Features
//!
//! - **Table Status Evaluation**: row-count thresholds (Empty / Warn-LowCount /
//!   Warn-HighCount / OK) with a column-condition overlay
//! - **Column Conditions**: declarative per-column predicates (equals,
//!   not-equals, IN, date comparisons) evaluated jointly per table, with
//!   named-table overrides for two known table shapes
//! - **Job Monitoring**: terminal status tracking plus statistical anomaly
//!   detection (Slow/Fast) over run durations via z-score
//! - **Alert Log**: append-only record of every unhealthy observation
//! - **Pluggable Data Access**: the engine talks to the monitored server
//!   through the [`source::SqlSource`] trait and is agnostic to transport
//! - **SQLite Persistence**: configs, check logs, and alerts survive restarts
//!
//! # Example
//!
//! ```no_run
//! use sqlmon::engine::{run_cycle, CycleOptions};
//! use sqlmon::model::TableMonitorConfig;
//! use sqlmon::store::MonitorStore;
//!
//! # async fn demo(source: &dyn sqlmon::source::SqlSource) -> Result<(), Box<dyn std::error::Error>> {
//! let store = MonitorStore::open("data/sqlmon.db").await?;
//! store
//!     .save_table_config(&TableMonitorConfig::new("Sales", "Orders").with_min_rows(1))
//!     .await?;
//!
//! let report = run_cycle(source, &store, &CycleOptions::default()).await?;
//! println!("{} tables checked, {} alerts", report.tables.len(), report.alerts);
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod engine;
pub mod model;
pub mod source;
pub mod store;

// Re-export commonly used types
pub use engine::{run_cycle, CycleError, CycleOptions, CycleReport, TableCheckResult};
pub use model::{
    Alert, AlertType, ColumnConditionConfig, ConditionType, DurationStatus, JobRunRecord,
    JobTerminalStatus, TableMonitorConfig, TableStatus,
};
pub use source::{SourceError, SqlSource, SqlValue};
pub use store::{MonitorStore, StoreError};
