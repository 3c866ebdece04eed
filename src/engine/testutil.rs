//! Scripted [`SqlSource`] for evaluator unit tests

use crate::model::{JobRunRecord, JobTerminalStatus};
use crate::source::{ColumnInfo, SourceError, SqlSource, SqlValue};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory source with canned responses keyed by table and exact SQL text
pub(crate) struct ScriptedSource {
    row_counts: HashMap<String, i64>,
    table_errors: HashMap<String, String>,
    counts: HashMap<String, i64>,
    columns: HashMap<String, Vec<ColumnInfo>>,
    job_runs: HashMap<String, Vec<JobRunRecord>>,
    history_calls: Mutex<HashMap<String, usize>>,
}

fn key(db: &str, table: &str) -> String {
    format!("{}.{}", db, table)
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            row_counts: HashMap::new(),
            table_errors: HashMap::new(),
            counts: HashMap::new(),
            columns: HashMap::new(),
            job_runs: HashMap::new(),
            history_calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_row_count(mut self, db: &str, table: &str, count: i64) -> Self {
        self.row_counts.insert(key(db, table), count);
        self
    }

    pub fn with_table_error(mut self, db: &str, table: &str, message: &str) -> Self {
        self.table_errors.insert(key(db, table), message.to_string());
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

    /// How many times `recent_job_runs` was called for a job
    pub fn history_call_count(&self, job_name: &str) -> usize {
        *self
            .history_calls
            .lock()
            .unwrap()
            .get(job_name)
            .unwrap_or(&0)
    }
}

#[async_trait]
impl SqlSource for ScriptedSource {
    async fn row_count(&self, db: &str, table: &str) -> Result<i64, SourceError> {
        let key = key(db, table);
        if let Some(msg) = self.table_errors.get(&key) {
            return Err(SourceError::Transport(msg.clone()));
        }
        self.row_counts
            .get(&key)
            .copied()
            .ok_or_else(|| SourceError::Transport(format!("unknown table {}", key)))
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
        *self
            .history_calls
            .lock()
            .unwrap()
            .entry(job_name.to_string())
            .or_insert(0) += 1;

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

/// Convenience constructor for a history entry
pub(crate) fn run(job_name: &str, status: JobTerminalStatus, duration: i64) -> JobRunRecord {
    JobRunRecord {
        job_name: job_name.to_string(),
        run_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        run_time: NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
        duration,
        status,
        message: String::new(),
    }
}
