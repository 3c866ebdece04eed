//! Alert derivation and logging
//!
//! Called once per table and once per job run per evaluation cycle. The only
//! silent table status is the bare `OK`; everything else appends exactly one
//! alert row, and a job run can contribute both a Failed Job alert and a
//! Duration Anomaly alert for the same run. There is no de-duplication across
//! cycles: the log is a time series of observations, not an incident tracker.

use crate::engine::stats::duration_to_secs;
use crate::engine::{TableCheckResult, TableKind};
use crate::model::{
    Alert, AlertType, JobRunEvaluation, JobRunRecord, JobTerminalStatus, RowCountStatus,
};
use crate::store::{MonitorStore, StoreError};
use chrono::Utc;

fn table_source_type(result: &TableCheckResult) -> &'static str {
    match &result.status.row_count {
        RowCountStatus::Empty => "Empty Table",
        RowCountStatus::Error(_) => "Table Error",
        RowCountStatus::LowCount => "Low Row Count",
        RowCountStatus::HighCount => "High Row Count",
        // Only reachable with a condition overlay present; the work-item
        // table gets its own reason
        RowCountStatus::Ok => match TableKind::resolve(&result.table_name) {
            TableKind::DailyWorkQueue => "Unprocessed Records",
            _ => "Column Condition",
        },
    }
}

/// Derive the alert for a table check, if any
pub fn table_alert(result: &TableCheckResult) -> Option<Alert> {
    if result.status.is_healthy() {
        return None;
    }

    let source_name = format!("{}.{}", result.db_name, result.table_name);
    let status = result.status.to_string();

    Some(Alert {
        created_at: Utc::now(),
        alert_type: AlertType::Table,
        source_type: table_source_type(result).to_string(),
        source_name: source_name.clone(),
        message: format!("{} has status {}", source_name, status),
        status,
        details: serde_json::json!({
            "row_count": result.row_count,
            "per_column": result.per_column,
        }),
    })
}

/// Derive the alerts for a job run: a Failed Job alert and/or a Duration
/// Anomaly alert, independently
pub fn job_alerts(run: &JobRunRecord, eval: &JobRunEvaluation) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if eval.terminal == JobTerminalStatus::Failed {
        let message = if run.message.is_empty() {
            format!("Job {} failed", run.job_name)
        } else {
            run.message.clone()
        };
        alerts.push(Alert {
            created_at: Utc::now(),
            alert_type: AlertType::Job,
            source_type: "Failed Job".to_string(),
            source_name: run.job_name.clone(),
            status: eval.terminal.to_string(),
            message,
            details: serde_json::json!({
                "run_date": run.run_date,
                "run_time": run.run_time,
            }),
        });
    }

    if eval.duration.is_anomalous() {
        let secs = duration_to_secs(run.duration);
        alerts.push(Alert {
            created_at: Utc::now(),
            alert_type: AlertType::Job,
            source_type: "Duration Anomaly".to_string(),
            source_name: run.job_name.clone(),
            status: eval.duration.to_string(),
            message: match secs {
                Some(secs) => format!(
                    "Job {} run duration {}s classified {}",
                    run.job_name, secs, eval.duration
                ),
                None => format!("Job {} run duration classified {}", run.job_name, eval.duration),
            },
            details: serde_json::json!({
                "run_date": run.run_date,
                "run_time": run.run_time,
                "duration_secs": secs,
            }),
        });
    }

    alerts
}

/// Persist the alert for an unhealthy table check, if any
pub async fn log_if_unhealthy(
    store: &MonitorStore,
    result: &TableCheckResult,
) -> Result<Option<Alert>, StoreError> {
    let Some(alert) = table_alert(result) else {
        return Ok(None);
    };

    store.save_alert(&alert).await?;
    tracing::warn!(
        source = %alert.source_name,
        source_type = %alert.source_type,
        status = %alert.status,
        "Table alert"
    );
    Ok(Some(alert))
}

/// Persist the alerts for an evaluated job run
pub async fn log_job_run(
    store: &MonitorStore,
    run: &JobRunRecord,
    eval: &JobRunEvaluation,
) -> Result<Vec<Alert>, StoreError> {
    let alerts = job_alerts(run, eval);

    for alert in &alerts {
        store.save_alert(alert).await?;
        tracing::warn!(
            source = %alert.source_name,
            source_type = %alert.source_type,
            status = %alert.status,
            "Job alert"
        );
    }
    Ok(alerts)
}
