//! Scripted data source shared by the integration tests

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlmon::model::{JobRunRecord, JobTerminalStatus};
use sqlmon::source::{ColumnInfo, SourceError, SqlSource, SqlValue};
use std::collections::HashMap;

/// In-memory source with canned responses keyed by table and exact SQL text.
/// Anything not scripted fails with a transport error, which is how the
/// unreachable-server paths get exercised.
#[derive(Default)]
pub struct ScriptedSource {
    row_counts: HashMap<String, i64>,
    counts: HashMap<String, i64>,
    columns: HashMap<String, Vec<ColumnInfo>>,
    job_runs: HashMap<String, Vec<JobRunRecord>>,
}

fn key(db: &str, table: &str) -> String {
    format!("{}.{}", db, table)
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_count(mut self, db: &str, table: &str, count: i64) -> Self {
        self.row_counts.insert(key(db, table), count);
        self
    }

    pub fn with_count(mut self, sql: &str, count: i64) -> Self {
        self.counts.insert(sql.to_string(), count);
        self
    }

    pub fn with_columns(mut self, db: &str, table: &str, names: &[&str]) -> Self {
        self.columns.insert(
            key(db, table),
            names
                .iter()
                .map(|n| ColumnInfo {
                    name: n.to_string(),
                    data_type: "varchar".to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn with_job_runs(mut self, job_name: &str, runs: Vec<JobRunRecord>) -> Self {
        self.job_runs.insert(job_name.to_string(), runs);
        self
    }
}

#[async_trait]
impl SqlSource for ScriptedSource {
    async fn row_count(&self, db: &str, table: &str) -> Result<i64, SourceError> {
        self.row_counts
            .get(&key(db, table))
            .copied()
            .ok_or_else(|| SourceError::Transport(format!("unknown table {}", key(db, table))))
    }

    async fn run_query(
        &self,
        _db: &str,
        sql: &str,
        _params: &[SqlValue],
    ) -> Result<Vec<Vec<SqlValue>>, SourceError> {
        self.counts
            .get(sql)
            .map(|&count| vec![vec![SqlValue::Int(count)]])
            .ok_or_else(|| SourceError::Transport(format!("unscripted query: {}", sql)))
    }

    async fn recent_job_runs(
        &self,
        job_name: &str,
        _within_hours: i64,
    ) -> Result<Vec<JobRunRecord>, SourceError> {
        self.job_runs
            .get(job_name)
            .cloned()
            .ok_or_else(|| SourceError::Transport(format!("no history for job {}", job_name)))
    }

    async fn table_columns(&self, db: &str, table: &str) -> Result<Vec<ColumnInfo>, SourceError> {
        self.columns
            .get(&key(db, table))
            .cloned()
            .ok_or_else(|| {
                SourceError::Transport(format!("no column metadata for {}", key(db, table)))
            })
    }
}

/// Install a log subscriber once so failing tests show engine diagnostics
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One run history entry with the duration in HHMMSS digit encoding
pub fn run(job_name: &str, status: JobTerminalStatus, duration: i64) -> JobRunRecord {
    JobRunRecord {
        job_name: job_name.to_string(),
        run_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        run_time: NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
        duration,
        status,
        message: String::new(),
    }
}
