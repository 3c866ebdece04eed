//! The status-evaluation engine
//!
//! Turns row counts, column-level predicates, and job run histories into
//! health states. All state lives in an explicit per-cycle context; the
//! evaluators are testable without a live data source.

pub mod anomaly;
pub mod conditions;
pub mod cycle;
pub mod job;
pub mod sqlgen;
pub mod stats;
pub mod table;

#[cfg(test)]
pub(crate) mod testutil;

pub use anomaly::{classify_duration, DEFAULT_Z_THRESHOLD};
pub use conditions::{evaluate_column_conditions, ConditionVerdict, TableKind};
pub use cycle::{run_cycle, CycleError, CycleOptions, CycleReport, JobCheckResult};
pub use job::{evaluate_job_run, CycleContext};
pub use sqlgen::{condition_fragment, SqlGenError, WhereFragment};
pub use stats::{compute_duration_stats, duration_to_secs, JobDurationStats, DEFAULT_SAMPLE_SIZE};
pub use table::{evaluate_table, TableCheckResult};
