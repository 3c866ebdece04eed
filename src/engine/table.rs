//! Table status evaluator
//!
//! Row-count health first (Empty beats everything, then the configured
//! min/max bounds), column-condition health second as an overlay that either
//! confirms "OK" more specifically or adds a distinct warning signal.

use crate::engine::conditions::evaluate_column_conditions;
use crate::model::{ColumnConditionConfig, RowCountStatus, TableMonitorConfig, TableStatus};
use crate::source::SqlSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of one table check. Computed per cycle; only the
/// (db, table, timestamp, count, status) tuple is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCheckResult {
    pub db_name: String,
    pub table_name: String,
    /// `None` when the table could not be checked at all
    pub row_count: Option<i64>,
    pub status: TableStatus,
    pub per_column: HashMap<String, bool>,
    pub checked_at: DateTime<Utc>,
}

fn row_count_status(count: i64, min: Option<i64>, max: Option<i64>) -> RowCountStatus {
    if count == 0 {
        return RowCountStatus::Empty;
    }
    if let Some(min) = min {
        if count < min {
            return RowCountStatus::LowCount;
        }
    }
    if let Some(max) = max {
        if count > max {
            return RowCountStatus::HighCount;
        }
    }
    RowCountStatus::Ok
}

/// Evaluate one monitored table.
///
/// A data-access failure produces an `Error: <message>` status with the row
/// count unavailable and short-circuits the pipeline; no threshold or column
/// evaluation is attempted.
pub async fn evaluate_table(
    source: &dyn SqlSource,
    cfg: &TableMonitorConfig,
    conditions: &[ColumnConditionConfig],
) -> TableCheckResult {
    let checked_at = Utc::now();

    let count = match source.row_count(&cfg.db_name, &cfg.table_name).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(
                db = %cfg.db_name,
                table = %cfg.table_name,
                error = %e,
                "Table check failed"
            );
            return TableCheckResult {
                db_name: cfg.db_name.clone(),
                table_name: cfg.table_name.clone(),
                row_count: None,
                status: TableStatus::error(e.to_string()),
                per_column: HashMap::new(),
                checked_at,
            };
        }
    };

    let primary = row_count_status(count, cfg.min_rows, cfg.max_rows);
    let mut status = TableStatus::from(primary);
    let mut per_column = HashMap::new();

    // Empty takes precedence over everything; conditions are only overlaid on
    // OK and the threshold warnings.
    if !conditions.is_empty() && status.row_count != RowCountStatus::Empty {
        let verdict = evaluate_column_conditions(
            source,
            &cfg.db_name,
            &cfg.table_name,
            conditions,
            cfg.min_match_count,
        )
        .await;
        status = status.with_condition(verdict.met);
        per_column = verdict.per_column;
    }

    TableCheckResult {
        db_name: cfg.db_name.clone(),
        table_name: cfg.table_name.clone(),
        row_count: Some(count),
        status,
        per_column,
        checked_at,
    }
}
