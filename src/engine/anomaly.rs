//! Z-score anomaly classification for job run durations

use crate::engine::stats::JobDurationStats;
use crate::model::DurationStatus;

/// Deviations beyond this many standard deviations are anomalous
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// Classify a single successful run's duration against the job's historical
/// baseline.
///
/// Pure and stateless: no historical state is mutated. With no samples there
/// is no baseline, and with zero variance no meaningful deviation threshold
/// exists; both degenerate cases classify as Normal.
pub fn classify_duration(
    duration_secs: u32,
    stats: &JobDurationStats,
    z_threshold: f64,
) -> DurationStatus {
    if stats.sample_count == 0 || stats.stddev_secs == 0.0 {
        return DurationStatus::Normal;
    }

    let duration = duration_secs as f64;
    let z = (duration - stats.mean_secs).abs() / stats.stddev_secs;

    if z > z_threshold {
        if duration > stats.mean_secs {
            DurationStatus::Slow
        } else {
            DurationStatus::Fast
        }
    } else {
        DurationStatus::Normal
    }
}
