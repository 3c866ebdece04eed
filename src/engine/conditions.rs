//! Column condition evaluator
//!
//! A configured set of column rules on one table represents one compound
//! business rule, not N independent rules: all conditions are conjoined with
//! AND into a single matching-count query, and the same verdict is assigned to
//! every configured column. Two named table shapes override the default
//! combination rule; everything else takes the generic path.
//!
//! Evaluation failures never raise past this component: a query or
//! configuration error degrades to "not met" with a logged diagnostic.

use crate::engine::sqlgen::{self, SqlGenError, WhereFragment};
use crate::model::{ColumnConditionConfig, ConditionType};
use crate::source::{SourceError, SqlSource, SqlValue};
use std::collections::{HashMap, HashSet};

/// Combination-rule dispatch, resolved by table name.
///
/// The two non-generic variants reproduce business-specific carve-outs whose
/// polarity is inverted relative to the default rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// AND of all predicates, matched against `min_match_count`
    Generic,
    /// Day-stamped work items with a processed flag: any unprocessed row dated
    /// today means the condition is NOT met ("all of today's work should be
    /// done")
    DailyWorkQueue,
    /// Upload/ingestion log: zero rows matching the status + created-today
    /// pair is healthy ("no failed uploads today is good")
    UploadLog,
}

impl TableKind {
    pub fn resolve(table_name: &str) -> Self {
        if table_name.eq_ignore_ascii_case("DailyMoves") {
            TableKind::DailyWorkQueue
        } else if table_name.eq_ignore_ascii_case("UploadLog") {
            TableKind::UploadLog
        } else {
            TableKind::Generic
        }
    }
}

/// Outcome of evaluating a table's condition set
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionVerdict {
    /// Whether the compound condition is satisfied
    pub met: bool,
    /// Per-column verdicts; conditions evaluated jointly share one boolean
    pub per_column: HashMap<String, bool>,
}

impl ConditionVerdict {
    fn uniform(configs: &[ColumnConditionConfig], met: bool) -> Self {
        Self {
            met,
            per_column: configs
                .iter()
                .map(|c| (c.column_name.clone(), met))
                .collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum EvalError {
    #[error(transparent)]
    Config(#[from] SqlGenError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Evaluate the configured conditions for one table.
///
/// `min_match_count == 0` requires every row to match (an empty table never
/// qualifies); any positive value requires at least that many matching rows.
pub async fn evaluate_column_conditions(
    source: &dyn SqlSource,
    db: &str,
    table: &str,
    configs: &[ColumnConditionConfig],
    min_match_count: i64,
) -> ConditionVerdict {
    if configs.is_empty() {
        return ConditionVerdict {
            met: true,
            per_column: HashMap::new(),
        };
    }

    if let Err(reason) = validate_columns(source, db, table, configs).await {
        tracing::warn!(
            db,
            table,
            reason,
            "Column condition configuration invalid; treating as not met"
        );
        return ConditionVerdict::uniform(configs, false);
    }

    match TableKind::resolve(table) {
        TableKind::Generic => evaluate_generic(source, db, table, configs, min_match_count).await,
        TableKind::DailyWorkQueue => {
            evaluate_daily_work_queue(source, db, table, configs, min_match_count).await
        }
        TableKind::UploadLog => {
            evaluate_upload_log(source, db, table, configs, min_match_count).await
        }
    }
}

/// Verify every configured column exists on the live table
async fn validate_columns(
    source: &dyn SqlSource,
    db: &str,
    table: &str,
    configs: &[ColumnConditionConfig],
) -> Result<(), String> {
    let columns = source
        .table_columns(db, table)
        .await
        .map_err(|e| e.to_string())?;

    let known: HashSet<String> = columns.iter().map(|c| c.name.to_lowercase()).collect();

    for cfg in configs {
        if !known.contains(&cfg.column_name.to_lowercase()) {
            return Err(format!("column '{}' not present on table", cfg.column_name));
        }
    }
    Ok(())
}

fn build_fragments(configs: &[ColumnConditionConfig]) -> Result<Vec<WhereFragment>, SqlGenError> {
    configs.iter().map(sqlgen::condition_fragment).collect()
}

/// One query for rows matching all fragments, one for the total row count
async fn match_counts(
    source: &dyn SqlSource,
    db: &str,
    table: &str,
    fragments: &[WhereFragment],
) -> Result<(i64, i64), EvalError> {
    let (sql, params) = sqlgen::count_matching(table, fragments)?;
    let matching = scalar_count(source, db, &sql, &params).await?;
    let total = source.row_count(db, table).await?;
    Ok((matching, total))
}

async fn scalar_count(
    source: &dyn SqlSource,
    db: &str,
    sql: &str,
    params: &[SqlValue],
) -> Result<i64, SourceError> {
    let rows = source.run_query(db, sql, params).await?;
    rows.first()
        .and_then(|row| row.first())
        .and_then(SqlValue::as_i64)
        .ok_or_else(|| SourceError::Malformed(format!("count query returned no scalar: {}", sql)))
}

fn default_rule(matching: i64, total: i64, min_match_count: i64) -> bool {
    if min_match_count == 0 {
        matching == total && total > 0
    } else {
        matching >= min_match_count
    }
}

async fn evaluate_generic(
    source: &dyn SqlSource,
    db: &str,
    table: &str,
    configs: &[ColumnConditionConfig],
    min_match_count: i64,
) -> ConditionVerdict {
    let result = async {
        let fragments = build_fragments(configs)?;
        match_counts(source, db, table, &fragments).await
    }
    .await;

    match result {
        Ok((matching, total)) => {
            ConditionVerdict::uniform(configs, default_rule(matching, total, min_match_count))
        }
        Err(e) => {
            tracing::warn!(db, table, error = %e, "Condition evaluation failed; treating as not met");
            ConditionVerdict::uniform(configs, false)
        }
    }
}

/// Dedicated two-column combo for the day-stamped work-item table: the
/// processed-flag condition and the move-date-equals-today condition are
/// checked together, and finding any matching (unprocessed, dated-today) row
/// means the condition is NOT met. Falls back to the generic path when the
/// pair is not configured.
async fn evaluate_daily_work_queue(
    source: &dyn SqlSource,
    db: &str,
    table: &str,
    configs: &[ColumnConditionConfig],
    min_match_count: i64,
) -> ConditionVerdict {
    let flag = configs
        .iter()
        .find(|c| c.condition_type == ConditionType::Equals);
    let date = configs
        .iter()
        .find(|c| c.condition_type == ConditionType::DateEqualsToday);

    let (flag, date) = match (flag, date) {
        (Some(f), Some(d)) => (f, d),
        _ => return evaluate_generic(source, db, table, configs, min_match_count).await,
    };

    let result = async {
        let fragments = build_fragments(&[flag.clone(), date.clone()])?;
        match_counts(source, db, table, &fragments).await
    }
    .await;

    match result {
        Ok((unprocessed_today, _)) => ConditionVerdict::uniform(configs, unprocessed_today == 0),
        Err(e) => {
            tracing::warn!(db, table, error = %e, "Work-queue condition evaluation failed; treating as not met");
            ConditionVerdict::uniform(configs, false)
        }
    }
}

/// Upload-log override: when the status filter and the created-today
/// condition are configured as a pair, zero matches is healthy (inverted
/// polarity). Either sub-condition configured alone is evaluated under the
/// default rule.
async fn evaluate_upload_log(
    source: &dyn SqlSource,
    db: &str,
    table: &str,
    configs: &[ColumnConditionConfig],
    min_match_count: i64,
) -> ConditionVerdict {
    let has_status = configs.iter().any(|c| {
        matches!(
            c.condition_type,
            ConditionType::Equals | ConditionType::In
        )
    });
    let has_date = configs
        .iter()
        .any(|c| c.condition_type == ConditionType::DateEqualsToday);

    if !(has_status && has_date) {
        return evaluate_generic(source, db, table, configs, min_match_count).await;
    }

    let result = async {
        let fragments = build_fragments(configs)?;
        match_counts(source, db, table, &fragments).await
    }
    .await;

    match result {
        Ok((matching, _)) => ConditionVerdict::uniform(configs, matching == 0),
        Err(e) => {
            tracing::warn!(db, table, error = %e, "Upload-log condition evaluation failed; treating as not met");
            ConditionVerdict::uniform(configs, false)
        }
    }
}
