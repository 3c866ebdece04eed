//! SQLite-backed configuration and history store
//!
//! Holds everything the engine needs between ticks: which tables and jobs to
//! monitor, the column conditions per table, and the append-only check and
//! alert logs. Configuration writes are upserts keyed on the natural
//! uniqueness of each entity; log writes are inserts only.

use crate::engine::TableCheckResult;
use crate::model::{
    Alert, AlertType, ColumnConditionConfig, JobMonitorConfig, JobRunEvaluation, JobRunRecord,
    TableMonitorConfig,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One row of the table check log, as read back for the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct TableCheckRow {
    pub db_name: String,
    pub table_name: String,
    pub row_count: Option<i64>,
    pub status: String,
    pub checked_at: DateTime<Utc>,
}

/// Handle to the monitoring database
#[derive(Clone)]
pub struct MonitorStore {
    pool: SqlitePool,
}

impl MonitorStore {
    /// Open (or create) the store at the given path and run the schema.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory store for tests. Pinned to a single connection because each
    /// sqlite `:memory:` connection is its own database.
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Close the pool, flushing outstanding writes
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS table_monitor_config (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                db_name TEXT NOT NULL,
                table_name TEXT NOT NULL,
                min_rows INTEGER,
                max_rows INTEGER,
                min_match_count INTEGER NOT NULL DEFAULT 1,
                UNIQUE(db_name, table_name)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS column_condition_config (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                db_name TEXT NOT NULL,
                table_name TEXT NOT NULL,
                column_name TEXT NOT NULL,
                condition_type TEXT NOT NULL,
                condition_value TEXT NOT NULL,
                UNIQUE(db_name, table_name, column_name)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS job_monitor_config (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_name TEXT NOT NULL UNIQUE
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS table_check_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                db_name TEXT NOT NULL,
                table_name TEXT NOT NULL,
                row_count INTEGER,
                status TEXT NOT NULL,
                checked_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS job_check_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_name TEXT NOT NULL,
                run_date TEXT NOT NULL,
                run_time TEXT NOT NULL,
                status TEXT NOT NULL,
                duration_status TEXT NOT NULL,
                message TEXT NOT NULL,
                checked_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS alert_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL,
                alert_type TEXT NOT NULL,
                source_type TEXT NOT NULL,
                source_name TEXT NOT NULL,
                status TEXT NOT NULL,
                message TEXT NOT NULL,
                details TEXT NOT NULL
            )
            "#,
        ];
        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // Table configuration

    pub async fn save_table_config(&self, cfg: &TableMonitorConfig) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO table_monitor_config
                (db_name, table_name, min_rows, max_rows, min_match_count)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(db_name, table_name) DO UPDATE SET
                min_rows = excluded.min_rows,
                max_rows = excluded.max_rows,
                min_match_count = excluded.min_match_count
            "#,
        )
        .bind(&cfg.db_name)
        .bind(&cfg.table_name)
        .bind(cfg.min_rows)
        .bind(cfg.max_rows)
        .bind(cfg.min_match_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All monitored tables, in the order they were added
    pub async fn load_table_config(&self) -> Result<Vec<TableMonitorConfig>, StoreError> {
        let rows = sqlx::query(
            "SELECT db_name, table_name, min_rows, max_rows, min_match_count
             FROM table_monitor_config ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TableMonitorConfig {
                db_name: row.get("db_name"),
                table_name: row.get("table_name"),
                min_rows: row.get("min_rows"),
                max_rows: row.get("max_rows"),
                min_match_count: row.get("min_match_count"),
            })
            .collect())
    }

    /// Remove a table and its column conditions
    pub async fn delete_table_config(&self, db: &str, table: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM column_condition_config WHERE db_name = ? AND table_name = ?")
            .bind(db)
            .bind(table)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM table_monitor_config WHERE db_name = ? AND table_name = ?")
            .bind(db)
            .bind(table)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // Column conditions

    /// Replace the full condition set for one table atomically
    pub async fn replace_column_config(
        &self,
        db: &str,
        table: &str,
        conditions: &[ColumnConditionConfig],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM column_condition_config WHERE db_name = ? AND table_name = ?")
            .bind(db)
            .bind(table)
            .execute(&mut *tx)
            .await?;
        for cond in conditions {
            sqlx::query(
                "INSERT INTO column_condition_config
                     (db_name, table_name, column_name, condition_type, condition_value)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&cond.db_name)
            .bind(&cond.table_name)
            .bind(&cond.column_name)
            .bind(cond.condition_type.to_string())
            .bind(&cond.condition_value)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Conditions for one table, in the order they were added. Rows with a
    /// condition type this build does not know are skipped with a warning
    /// rather than failing the load.
    pub async fn load_column_config(
        &self,
        db: &str,
        table: &str,
    ) -> Result<Vec<ColumnConditionConfig>, StoreError> {
        let rows = sqlx::query(
            "SELECT db_name, table_name, column_name, condition_type, condition_value
             FROM column_condition_config
             WHERE db_name = ? AND table_name = ? ORDER BY id",
        )
        .bind(db)
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.get("condition_type");
            match raw.parse() {
                Ok(condition_type) => out.push(ColumnConditionConfig {
                    db_name: row.get("db_name"),
                    table_name: row.get("table_name"),
                    column_name: row.get("column_name"),
                    condition_type,
                    condition_value: row.get("condition_value"),
                }),
                Err(e) => {
                    tracing::warn!(
                        db_name = db,
                        table_name = table,
                        error = %e,
                        "Skipping stored column condition"
                    );
                }
            }
        }
        Ok(out)
    }

    // Job configuration

    pub async fn save_job_config(&self, cfg: &JobMonitorConfig) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO job_monitor_config (job_name) VALUES (?) ON CONFLICT DO NOTHING")
            .bind(&cfg.job_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn load_job_config(&self) -> Result<Vec<JobMonitorConfig>, StoreError> {
        let rows = sqlx::query("SELECT job_name FROM job_monitor_config ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| JobMonitorConfig {
                job_name: row.get("job_name"),
            })
            .collect())
    }

    pub async fn delete_job_config(&self, job_name: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM job_monitor_config WHERE job_name = ?")
            .bind(job_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Check logs

    pub async fn log_table_check(&self, result: &TableCheckResult) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO table_check_log (db_name, table_name, row_count, status, checked_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&result.db_name)
        .bind(&result.table_name)
        .bind(result.row_count)
        .bind(result.status.to_string())
        .bind(result.checked_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn log_job_check(
        &self,
        run: &JobRunRecord,
        eval: &JobRunEvaluation,
        checked_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO job_check_log
                 (job_name, run_date, run_time, status, duration_status, message, checked_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&run.job_name)
        .bind(run.run_date.to_string())
        .bind(run.run_time.to_string())
        .bind(eval.terminal.to_string())
        .bind(eval.duration.to_string())
        .bind(&run.message)
        .bind(checked_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent table checks, newest first
    pub async fn recent_table_checks(&self, limit: i64) -> Result<Vec<TableCheckRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT db_name, table_name, row_count, status, checked_at
             FROM table_check_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row.get("checked_at");
            let checked_at = match DateTime::parse_from_rfc3339(&raw) {
                Ok(ts) => ts.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(timestamp = %raw, error = %e, "Skipping malformed check row");
                    continue;
                }
            };
            out.push(TableCheckRow {
                db_name: row.get("db_name"),
                table_name: row.get("table_name"),
                row_count: row.get("row_count"),
                status: row.get("status"),
                checked_at,
            });
        }
        Ok(out)
    }

    // Alert log

    pub async fn save_alert(&self, alert: &Alert) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO alert_log
                 (created_at, alert_type, source_type, source_name, status, message, details)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(alert.created_at.to_rfc3339())
        .bind(alert.alert_type.to_string())
        .bind(&alert.source_type)
        .bind(&alert.source_name)
        .bind(&alert.status)
        .bind(&alert.message)
        .bind(alert.details.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent alerts, newest first. Malformed rows are skipped with a
    /// warning so one corrupt entry cannot take the dashboard down.
    pub async fn recent_alerts(&self, limit: i64) -> Result<Vec<Alert>, StoreError> {
        let rows = sqlx::query(
            "SELECT created_at, alert_type, source_type, source_name, status, message, details
             FROM alert_log ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let created_raw: String = row.get("created_at");
            let type_raw: String = row.get("alert_type");
            let details_raw: String = row.get("details");

            let created_at = DateTime::parse_from_rfc3339(&created_raw)
                .map(|ts| ts.with_timezone(&Utc));
            let alert_type = type_raw.parse::<AlertType>();
            match (created_at, alert_type) {
                (Ok(created_at), Ok(alert_type)) => out.push(Alert {
                    created_at,
                    alert_type,
                    source_type: row.get("source_type"),
                    source_name: row.get("source_name"),
                    status: row.get("status"),
                    message: row.get("message"),
                    details: serde_json::from_str(&details_raw)
                        .unwrap_or(serde_json::Value::Null),
                }),
                _ => {
                    tracing::warn!(
                        created_at = %created_raw,
                        alert_type = %type_raw,
                        "Skipping malformed alert row"
                    );
                }
            }
        }
        Ok(out)
    }
}
