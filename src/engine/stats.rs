//! Statistics collector for job run durations
//!
//! Builds the historical baseline the anomaly classifier compares against:
//! mean and population standard deviation over the most recent N successful
//! runs of a job. Failed, canceled, and retried runs are excluded; their
//! variability is not meaningful signal.

use crate::model::JobTerminalStatus;
use crate::source::{SourceError, SqlSource};
use serde::{Deserialize, Serialize};

/// Default number of successful runs sampled per job
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Derived duration statistics for one job.
///
/// `sample_count == 0` means "insufficient data, skip anomaly detection",
/// never "duration is exactly zero".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDurationStats {
    pub sample_count: usize,
    pub mean_secs: f64,
    pub stddev_secs: f64,
    pub min_secs: u32,
    pub max_secs: u32,
}

/// Decode an HHMMSS-encoded duration (e.g. `13542` = 1h 35m 42s) to total
/// seconds. Returns `None` for values that are not valid HHMMSS digits; a
/// malformed sample is excluded from statistics rather than aborting the
/// whole computation.
pub fn duration_to_secs(raw: i64) -> Option<u32> {
    if raw < 0 {
        return None;
    }
    let secs = raw % 100;
    let mins = (raw / 100) % 100;
    let hours = raw / 10_000;
    if secs >= 60 || mins >= 60 {
        return None;
    }
    u32::try_from(hours * 3600 + mins * 60 + secs).ok()
}

/// Compute duration statistics over the most recent `sample_size` successful
/// runs of a job, looking back `lookback_hours` into the run history.
///
/// Returns zero-valued stats with `sample_count == 0` when no successful runs
/// exist; propagates data-access failures without partial results.
pub async fn compute_duration_stats(
    source: &dyn SqlSource,
    job_name: &str,
    sample_size: usize,
    lookback_hours: i64,
) -> Result<JobDurationStats, SourceError> {
    let runs = source.recent_job_runs(job_name, lookback_hours).await?;

    let durations: Vec<u32> = runs
        .iter()
        .filter(|r| r.status == JobTerminalStatus::Succeeded)
        .filter_map(|r| {
            let secs = duration_to_secs(r.duration);
            if secs.is_none() {
                tracing::warn!(
                    job_name,
                    duration = r.duration,
                    "Skipping run with malformed duration encoding"
                );
            }
            secs
        })
        .take(sample_size)
        .collect();

    Ok(stats_from_samples(&durations))
}

fn stats_from_samples(durations: &[u32]) -> JobDurationStats {
    if durations.is_empty() {
        return JobDurationStats::default();
    }

    let n = durations.len() as f64;
    let mean = durations.iter().map(|&d| d as f64).sum::<f64>() / n;
    let variance = durations
        .iter()
        .map(|&d| {
            let diff = d as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    JobDurationStats {
        sample_count: durations.len(),
        mean_secs: mean,
        stddev_secs: variance.sqrt(),
        min_secs: *durations.iter().min().unwrap_or(&0),
        max_secs: *durations.iter().max().unwrap_or(&0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{run, ScriptedSource};
    use crate::model::JobTerminalStatus;

    #[test]
    fn test_duration_decoding() {
        assert_eq!(duration_to_secs(0), Some(0));
        assert_eq!(duration_to_secs(45), Some(45));
        assert_eq!(duration_to_secs(230), Some(150)); // 2m 30s
        assert_eq!(duration_to_secs(13542), Some(5742)); // 1h 35m 42s
        assert_eq!(duration_to_secs(1_000_000), Some(360_000)); // 100h
    }

    #[test]
    fn test_duration_decoding_rejects_malformed() {
        assert_eq!(duration_to_secs(-1), None);
        assert_eq!(duration_to_secs(75), None); // 75 seconds
        assert_eq!(duration_to_secs(7500), None); // 75 minutes
    }

    #[test]
    fn test_stats_from_samples() {
        let stats = stats_from_samples(&[100, 110, 90]);
        assert_eq!(stats.sample_count, 3);
        assert!((stats.mean_secs - 100.0).abs() < 1e-9);
        // Population stddev: sqrt(((0)^2 + (10)^2 + (-10)^2) / 3)
        assert!((stats.stddev_secs - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(stats.min_secs, 90);
        assert_eq!(stats.max_secs, 110);
    }

    #[test]
    fn test_no_successful_runs_yields_zero_sample_count() {
        let source = ScriptedSource::new().with_job_runs(
            "nightly-etl",
            vec![
                run("nightly-etl", JobTerminalStatus::Failed, 100),
                run("nightly-etl", JobTerminalStatus::Canceled, 200),
            ],
        );

        let stats = tokio_test::block_on(compute_duration_stats(&source, "nightly-etl", 10, 720))
            .unwrap();
        assert_eq!(stats, JobDurationStats::default());
        assert_eq!(stats.sample_count, 0);
    }

    #[test]
    fn test_only_successful_runs_are_sampled() {
        let source = ScriptedSource::new().with_job_runs(
            "nightly-etl",
            vec![
                run("nightly-etl", JobTerminalStatus::Succeeded, 130), // 90s
                run("nightly-etl", JobTerminalStatus::Failed, 5959),
                run("nightly-etl", JobTerminalStatus::Succeeded, 150), // 110s
            ],
        );

        let stats = tokio_test::block_on(compute_duration_stats(&source, "nightly-etl", 10, 720))
            .unwrap();
        assert_eq!(stats.sample_count, 2);
        assert!((stats.mean_secs - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_duration_excluded_not_fatal() {
        let source = ScriptedSource::new().with_job_runs(
            "nightly-etl",
            vec![
                run("nightly-etl", JobTerminalStatus::Succeeded, 90), // invalid seconds
                run("nightly-etl", JobTerminalStatus::Succeeded, 100), // 60s
            ],
        );

        let stats = tokio_test::block_on(compute_duration_stats(&source, "nightly-etl", 10, 720))
            .unwrap();
        assert_eq!(stats.sample_count, 1);
        assert!((stats.mean_secs - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_size_caps_history() {
        let runs: Vec<_> = (0..20)
            .map(|i| run("etl", JobTerminalStatus::Succeeded, 100 + i))
            .collect();
        let source = ScriptedSource::new().with_job_runs("etl", runs);

        let stats = tokio_test::block_on(compute_duration_stats(&source, "etl", 10, 720)).unwrap();
        assert_eq!(stats.sample_count, 10);
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let source = ScriptedSource::new();
        let result = tokio_test::block_on(compute_duration_stats(&source, "missing", 10, 720));
        assert!(result.is_err());
    }
}
