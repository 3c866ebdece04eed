//! Evaluation cycle orchestration
//!
//! One tick: load configuration, evaluate every monitored table and job
//! sequentially in configuration order, persist check results and alerts.
//! Per-item data-access failures degrade to that item's Error status or a
//! skipped job; persistence failures abort the tick, which is retried
//! wholesale by the caller on the next interval.

use crate::alerts;
use crate::engine::anomaly::DEFAULT_Z_THRESHOLD;
use crate::engine::job::{evaluate_job_run, CycleContext};
use crate::engine::stats::DEFAULT_SAMPLE_SIZE;
use crate::engine::table::{evaluate_table, TableCheckResult};
use crate::model::{JobRunEvaluation, JobRunRecord};
use crate::source::SqlSource;
use crate::store::{MonitorStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tunables for one evaluation cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleOptions {
    /// Job run history window evaluated per tick (hours)
    pub history_hours: i64,
    /// How far back to look when sampling successful runs for the baseline
    pub stats_lookback_hours: i64,
    /// Successful runs sampled per job for duration statistics
    pub sample_size: usize,
    /// Classify run durations against the historical baseline
    pub anomaly_detection: bool,
    /// Z-score beyond which a duration is Slow/Fast
    pub z_threshold: f64,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            history_hours: 24,
            stats_lookback_hours: 720,
            sample_size: DEFAULT_SAMPLE_SIZE,
            anomaly_detection: true,
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

/// One evaluated job run within a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCheckResult {
    pub run: JobRunRecord,
    pub evaluation: JobRunEvaluation,
    pub checked_at: DateTime<Utc>,
}

/// Everything one tick observed
#[derive(Debug, Default)]
pub struct CycleReport {
    pub tables: Vec<TableCheckResult>,
    pub job_runs: Vec<JobCheckResult>,
    /// Alert rows appended this cycle
    pub alerts: usize,
    /// Jobs whose history could not be fetched this cycle
    pub skipped_jobs: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Run one full evaluation tick against the monitored server.
pub async fn run_cycle(
    source: &dyn SqlSource,
    store: &MonitorStore,
    opts: &CycleOptions,
) -> Result<CycleReport, CycleError> {
    let mut report = CycleReport::default();

    let table_configs = store.load_table_config().await?;
    for cfg in &table_configs {
        let conditions = store
            .load_column_config(&cfg.db_name, &cfg.table_name)
            .await?;
        let result = evaluate_table(source, cfg, &conditions).await;

        store.log_table_check(&result).await?;
        if alerts::log_if_unhealthy(store, &result).await?.is_some() {
            report.alerts += 1;
        }
        report.tables.push(result);
    }

    let jobs = store.load_job_config().await?;
    let mut ctx = CycleContext::new();
    for job in &jobs {
        let runs = match source
            .recent_job_runs(&job.job_name, opts.history_hours)
            .await
        {
            Ok(runs) => runs,
            Err(e) => {
                tracing::warn!(
                    job_name = %job.job_name,
                    error = %e,
                    "Job history fetch failed; skipping job this cycle"
                );
                report.skipped_jobs.push(job.job_name.clone());
                continue;
            }
        };

        for run in runs {
            let evaluation = evaluate_job_run(source, &run, &mut ctx, opts).await;
            let checked_at = Utc::now();

            store.log_job_check(&run, &evaluation, checked_at).await?;
            report.alerts += alerts::log_job_run(store, &run, &evaluation).await?.len();
            report.job_runs.push(JobCheckResult {
                run,
                evaluation,
                checked_at,
            });
        }
    }

    tracing::info!(
        tables = report.tables.len(),
        job_runs = report.job_runs.len(),
        alerts = report.alerts,
        skipped_jobs = report.skipped_jobs.len(),
        "Evaluation cycle complete"
    );

    Ok(report)
}
