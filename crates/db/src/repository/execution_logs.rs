//! The execution log table: its DDL and the one insert we issue against it.

use sqlx::mysql::MySqlConnection;
use tracing::info;

use crate::{
    DbError, TableRef,
    models::{LogRecord, SqlParam},
};

/// Insert columns, in bind order.
pub const LOG_COLUMNS: [&str; 12] = [
    "script_id",
    "execution_id",
    "execution_mode",
    "execution_type",
    "workflow_name",
    "status",
    "items_processed",
    "pixel_new",
    "pixel_duplicates",
    "pixel_updated",
    "event_summary",
    "full_details",
];

/// Build the parameterized insert for `target`.
pub fn insert_statement(target: &TableRef) -> String {
    let placeholders = vec!["?"; LOG_COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO {target} ({}) VALUES ({placeholders})",
        LOG_COLUMNS.join(", ")
    )
}

/// Positional values for [`insert_statement`], one per entry of [`LOG_COLUMNS`].
pub fn insert_params(record: &LogRecord) -> Vec<SqlParam> {
    vec![
        record.script_id.into(),
        record.execution_id.clone().into(),
        record.execution_mode.clone().into(),
        record.execution_type.as_str().into(),
        record.workflow_name.clone().into(),
        record.status.as_str().into(),
        record.items_processed.into(),
        record.pixel_new.into(),
        record.pixel_duplicates.into(),
        record.pixel_updated.into(),
        record.event_summary.clone().into(),
        record.full_details.clone().into(),
    ]
}

/// Insert one execution log row and return its auto-increment id.
pub async fn insert_execution_log(
    conn: &mut MySqlConnection,
    target: &TableRef,
    record: &LogRecord,
) -> Result<u64, DbError> {
    let statement = insert_statement(target);

    let mut query = sqlx::query(&statement);
    for param in insert_params(record) {
        query = match param {
            SqlParam::Int(v) => query.bind(v),
            SqlParam::Text(v) => query.bind(v),
        };
    }

    let result = query.execute(&mut *conn).await?;
    Ok(result.last_insert_id())
}

/// Create the execution log table when it does not exist yet.
pub async fn create_log_table(conn: &mut MySqlConnection, target: &TableRef) -> Result<(), DbError> {
    info!("Ensuring execution log table {target} exists");
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {target} (
            id               BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
            script_id        BIGINT          NOT NULL,
            execution_id     VARCHAR(64)     NOT NULL,
            execution_mode   VARCHAR(32)     NOT NULL,
            execution_type   VARCHAR(16)     NOT NULL,
            workflow_name    VARCHAR(255)    NOT NULL,
            status           VARCHAR(16)     NOT NULL,
            items_processed  BIGINT          NOT NULL DEFAULT 0,
            pixel_new        BIGINT          NOT NULL DEFAULT 0,
            pixel_duplicates BIGINT          NOT NULL DEFAULT 0,
            pixel_updated    BIGINT          NOT NULL DEFAULT 0,
            event_summary    LONGTEXT        NOT NULL,
            full_details     LONGTEXT        NOT NULL,
            created_at       TIMESTAMP       NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            KEY idx_script_id (script_id),
            KEY idx_created_at (created_at)
        )
        "#
    );

    sqlx::raw_sql(&ddl).execute(&mut *conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExecutionType, LogStatus};

    fn sample_record() -> LogRecord {
        LogRecord {
            script_id: 42,
            execution_id: "1001".into(),
            execution_mode: "monthly".into(),
            execution_type: ExecutionType::Manual,
            workflow_name: "Pixel Sender".into(),
            status: LogStatus::Success,
            items_processed: 10,
            pixel_new: 3,
            pixel_duplicates: 5,
            pixel_updated: 2,
            event_summary: r#"{"Lead":3}"#.into(),
            full_details: "[]".into(),
        }
    }

    #[test]
    fn statement_lists_every_column_with_a_placeholder() {
        let target = TableRef::new("backoffice", "n8n_scraper_logs").expect("valid");
        assert_eq!(
            insert_statement(&target),
            "INSERT INTO `backoffice`.`n8n_scraper_logs` \
             (script_id, execution_id, execution_mode, execution_type, workflow_name, status, \
             items_processed, pixel_new, pixel_duplicates, pixel_updated, event_summary, full_details) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn params_follow_column_order() {
        let params = insert_params(&sample_record());
        assert_eq!(params.len(), LOG_COLUMNS.len());
        assert_eq!(
            params,
            vec![
                SqlParam::Int(42),
                SqlParam::Text("1001".into()),
                SqlParam::Text("monthly".into()),
                SqlParam::Text("manual".into()),
                SqlParam::Text("Pixel Sender".into()),
                SqlParam::Text("success".into()),
                SqlParam::Int(10),
                SqlParam::Int(3),
                SqlParam::Int(5),
                SqlParam::Int(2),
                SqlParam::Text(r#"{"Lead":3}"#.into()),
                SqlParam::Text("[]".into()),
            ]
        );
    }
}
