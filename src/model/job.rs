//! Job run records and evaluation results

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final outcome code of a completed job run, as reported by the scheduler.
///
/// The numeric codes follow msdb's `sysjobhistory.run_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobTerminalStatus {
    Failed,
    Succeeded,
    Retry,
    Canceled,
    Running,
}

impl JobTerminalStatus {
    /// Map a raw `run_status` code; unknown codes are a data anomaly
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(JobTerminalStatus::Failed),
            1 => Some(JobTerminalStatus::Succeeded),
            2 => Some(JobTerminalStatus::Retry),
            3 => Some(JobTerminalStatus::Canceled),
            4 => Some(JobTerminalStatus::Running),
            _ => None,
        }
    }
}

impl fmt::Display for JobTerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobTerminalStatus::Failed => "Failed",
            JobTerminalStatus::Succeeded => "Succeeded",
            JobTerminalStatus::Retry => "Retry",
            JobTerminalStatus::Canceled => "Canceled",
            JobTerminalStatus::Running => "Running",
        };
        write!(f, "{}", s)
    }
}

/// Anomaly classification of a successful run's elapsed time relative to its
/// historical baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationStatus {
    Normal,
    Slow,
    Fast,
}

impl DurationStatus {
    pub fn is_anomalous(&self) -> bool {
        !matches!(self, DurationStatus::Normal)
    }
}

impl fmt::Display for DurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DurationStatus::Normal => "Normal",
            DurationStatus::Slow => "Slow",
            DurationStatus::Fast => "Fast",
        };
        write!(f, "{}", s)
    }
}

/// One historical job run, sourced from the scheduler's history table.
/// Read-only from the engine's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRunRecord {
    pub job_name: String,
    pub run_date: NaiveDate,
    pub run_time: NaiveTime,
    /// Elapsed time encoded as HHMMSS digits (e.g. `13542` = 1h 35m 42s)
    pub duration: i64,
    pub status: JobTerminalStatus,
    pub message: String,
}

/// Verdict pair produced by the job status evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRunEvaluation {
    pub terminal: JobTerminalStatus,
    pub duration: DurationStatus,
}
