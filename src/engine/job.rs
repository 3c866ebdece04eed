//! Job status evaluator
//!
//! Pairs the run's terminal status with an anomaly classification of its
//! duration. Per-job baseline statistics are fetched lazily at most once per
//! evaluation cycle via [`CycleContext`], even when a job appears multiple
//! times in the run history window.

use crate::engine::anomaly::classify_duration;
use crate::engine::cycle::CycleOptions;
use crate::engine::stats::{compute_duration_stats, duration_to_secs, JobDurationStats};
use crate::model::{DurationStatus, JobRunEvaluation, JobRunRecord, JobTerminalStatus};
use crate::source::SqlSource;
use std::collections::HashMap;

/// Per-cycle evaluation state. Build a fresh context every tick; carrying one
/// across ticks would serve stale baselines.
#[derive(Default)]
pub struct CycleContext {
    job_stats: HashMap<String, JobDurationStats>,
}

impl CycleContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline stats for a job, computed on first use this cycle.
    ///
    /// A stats fetch failure degrades to "insufficient data" for the rest of
    /// the cycle rather than failing the run evaluation.
    async fn stats_for(
        &mut self,
        source: &dyn SqlSource,
        job_name: &str,
        opts: &CycleOptions,
    ) -> JobDurationStats {
        if let Some(stats) = self.job_stats.get(job_name) {
            return *stats;
        }

        let stats = match compute_duration_stats(
            source,
            job_name,
            opts.sample_size,
            opts.stats_lookback_hours,
        )
        .await
        {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(
                    job_name,
                    error = %e,
                    "Duration stats fetch failed; skipping anomaly detection for this job"
                );
                JobDurationStats::default()
            }
        };

        self.job_stats.insert(job_name.to_string(), stats);
        stats
    }
}

/// Evaluate one historical job run.
///
/// Only successful runs are classified for duration anomalies; the
/// variability of failed, canceled, or retried runs is not meaningful signal.
pub async fn evaluate_job_run(
    source: &dyn SqlSource,
    run: &JobRunRecord,
    ctx: &mut CycleContext,
    opts: &CycleOptions,
) -> JobRunEvaluation {
    let terminal = run.status;

    let duration = if opts.anomaly_detection && terminal == JobTerminalStatus::Succeeded {
        let stats = ctx.stats_for(source, &run.job_name, opts).await;
        match duration_to_secs(run.duration) {
            Some(secs) => classify_duration(secs, &stats, opts.z_threshold),
            None => {
                tracing::warn!(
                    job_name = %run.job_name,
                    duration = run.duration,
                    "Run has malformed duration encoding; not classified"
                );
                DurationStatus::Normal
            }
        }
    } else {
        DurationStatus::Normal
    };

    JobRunEvaluation { terminal, duration }
}
