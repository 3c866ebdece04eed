//! Predicate-to-SQL translation
//!
//! Each column condition becomes one WHERE-clause fragment; sibling fragments
//! for a table are conjoined with AND. Values travel as positional parameters,
//! never interpolated into the statement text. The dialect is SQL Server
//! (bracketed identifiers, `CONVERT(date, ...)`, `GETDATE()`).

use crate::model::{ColumnConditionConfig, ConditionType};
use crate::source::SqlValue;
use chrono::NaiveDate;

/// One WHERE-clause fragment plus its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WhereFragment {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Configuration errors surfaced while translating a condition. Callers treat
/// these as "condition not met", never as a crash.
#[derive(Debug, thiserror::Error)]
pub enum SqlGenError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("empty IN list for column {0}")]
    EmptyInList(String),

    #[error("unparseable date '{value}' for column {column} (expected YYYY-MM-DD)")]
    BadDate { column: String, value: String },
}

/// Bracket an identifier, rejecting anything that could escape the brackets
fn bracket(ident: &str) -> Result<String, SqlGenError> {
    if ident.is_empty() || ident.contains(['[', ']']) || ident.chars().any(|c| c.is_control()) {
        return Err(SqlGenError::InvalidIdentifier(ident.to_string()));
    }
    Ok(format!("[{}]", ident))
}

fn parse_date(cfg: &ColumnConditionConfig) -> Result<NaiveDate, SqlGenError> {
    NaiveDate::parse_from_str(cfg.condition_value.trim(), "%Y-%m-%d").map_err(|_| {
        SqlGenError::BadDate {
            column: cfg.column_name.clone(),
            value: cfg.condition_value.clone(),
        }
    })
}

/// Translate a single column condition into a WHERE fragment
pub fn condition_fragment(cfg: &ColumnConditionConfig) -> Result<WhereFragment, SqlGenError> {
    let col = bracket(&cfg.column_name)?;

    let fragment = match cfg.condition_type {
        ConditionType::Equals => WhereFragment {
            sql: format!("{} = ?", col),
            params: vec![SqlValue::String(cfg.condition_value.clone())],
        },
        ConditionType::NotEquals => WhereFragment {
            sql: format!("{} <> ?", col),
            params: vec![SqlValue::String(cfg.condition_value.clone())],
        },
        ConditionType::In => {
            let items: Vec<String> = cfg
                .condition_value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if items.is_empty() {
                return Err(SqlGenError::EmptyInList(cfg.column_name.clone()));
            }
            let placeholders = vec!["?"; items.len()].join(", ");
            WhereFragment {
                sql: format!("{} IN ({})", col, placeholders),
                params: items.into_iter().map(SqlValue::String).collect(),
            }
        }
        ConditionType::DateEqualsToday => WhereFragment {
            sql: format!("CONVERT(date, {}) = CONVERT(date, GETDATE())", col),
            params: vec![],
        },
        ConditionType::DateGreaterThan => WhereFragment {
            sql: format!("CONVERT(date, {}) > ?", col),
            params: vec![SqlValue::Date(parse_date(cfg)?)],
        },
        ConditionType::DateLessThan => WhereFragment {
            sql: format!("CONVERT(date, {}) < ?", col),
            params: vec![SqlValue::Date(parse_date(cfg)?)],
        },
    };

    Ok(fragment)
}

/// Count query for rows matching all fragments conjoined with AND
pub fn count_matching(
    table: &str,
    fragments: &[WhereFragment],
) -> Result<(String, Vec<SqlValue>), SqlGenError> {
    let table = bracket(table)?;

    if fragments.is_empty() {
        return Ok((format!("SELECT COUNT(*) FROM {}", table), vec![]));
    }

    let clauses: Vec<&str> = fragments.iter().map(|f| f.sql.as_str()).collect();
    let params: Vec<SqlValue> = fragments.iter().flat_map(|f| f.params.clone()).collect();

    Ok((
        format!("SELECT COUNT(*) FROM {} WHERE {}", table, clauses.join(" AND ")),
        params,
    ))
}
