//! `ExecutionLogger` — records one pixel sender run as a row in MySQL.
//!
//! Only the first input item is read. It is parsed into an
//! [`ExecutionSummary`], shaped into a [`LogRecord`], and handed to the
//! injected [`LogStore`]. Failures after the input check either abort the
//! branch or become a `success: false` item, depending on
//! `options.failOnError`.

mod params;
mod summary;

pub use params::{DEFAULT_TABLE, ExecutionModeParam, LoggerOptions, LoggerParameters};
pub use summary::ExecutionSummary;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use db::{DbError, ExecutionType, LogRecord, LogStatus, LogStore, MySqlCredentials, TableRef};

use crate::{ContextError, ExecutableNode, Item, NodeError, traits::ExecutionContext};

/// Name under which the host supplies the MySQL credential.
pub const CREDENTIAL_NAME: &str = "mySql";

const UNKNOWN_WORKFLOW: &str = "Unknown";

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("no input item to log")]
    MissingInput,

    #[error(
        "execution.script_id is required and must be a positive integer, \
         given as a JSON number or a decimal string (got {0})"
    )]
    InvalidScriptId(String),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<LoggerError> for NodeError {
    fn from(err: LoggerError) -> Self {
        if matches!(&err, LoggerError::Database(db) if db.is_connect()) {
            Self::Retryable(err.to_string())
        } else {
            Self::Fatal(err.to_string())
        }
    }
}

/// Shape a parsed summary into the row that gets inserted.
pub fn build_record(
    summary: &ExecutionSummary,
    mode: ExecutionModeParam,
    ctx: &ExecutionContext,
) -> LogRecord {
    let execution_type = if ctx.trigger.is_manual() {
        ExecutionType::Manual
    } else {
        ExecutionType::Scheduled
    };

    let status = if summary.has_failures() {
        LogStatus::Failed
    } else {
        LogStatus::Success
    };

    let workflow_name = ctx
        .workflow_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_WORKFLOW)
        .to_owned();

    LogRecord {
        script_id: summary.script_id,
        execution_id: ctx.execution_id.clone(),
        execution_mode: mode.resolve(summary.mode.as_deref()),
        execution_type,
        workflow_name,
        status,
        items_processed: summary.total_input,
        pixel_new: summary.new_items,
        pixel_duplicates: summary.exact_duplicates,
        pixel_updated: summary.updated_items,
        event_summary: json_text(&summary.event_summary, "{}"),
        full_details: json_text(&summary.sent_items, "[]"),
    }
}

fn json_text<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_owned())
}

/// The execution logger node.
pub struct ExecutionLogger {
    store: Arc<dyn LogStore>,
}

impl ExecutionLogger {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    /// Parse `input` and build its record without touching the database.
    pub fn prepare(
        input: &Value,
        mode: ExecutionModeParam,
        ctx: &ExecutionContext,
    ) -> Result<LogRecord, LoggerError> {
        let summary = ExecutionSummary::parse(input)?;
        Ok(build_record(&summary, mode, ctx))
    }

    /// Everything between reading the item and inserting it. Errors come back
    /// as values; [`ExecutableNode::execute`] decides what the host sees.
    async fn log_execution(
        &self,
        input: &Value,
        params: &LoggerParameters,
        ctx: &ExecutionContext,
    ) -> Result<LogRecord, LoggerError> {
        let record = Self::prepare(input, params.execution_mode, ctx)?;

        if params.options.verbose_logging {
            info!(
                record = %json_text(&record, "{}"),
                "prepared execution log record"
            );
        }

        let target = TableRef::new(&params.database, &params.table)?;
        let credentials: MySqlCredentials = ctx.credential(CREDENTIAL_NAME)?;

        self.store.insert_log(&credentials, &target, &record).await?;
        Ok(record)
    }
}

#[async_trait]
impl ExecutableNode for ExecutionLogger {
    #[instrument(skip_all, fields(execution_id = %ctx.execution_id))]
    async fn execute(
        &self,
        items: Vec<Item>,
        ctx: &ExecutionContext,
    ) -> Result<Vec<Item>, NodeError> {
        if items.len() > 1 {
            debug!("only the first of {} input items is logged", items.len());
        }
        let item = items
            .into_iter()
            .next()
            .ok_or_else(|| NodeError::from(LoggerError::MissingInput))?;

        let params: LoggerParameters = ctx
            .parameters()
            .map_err(|e| NodeError::Fatal(e.to_string()))?;

        match self.log_execution(&item.json, &params, ctx).await {
            Ok(record) => {
                info!(
                    "logged script {} ({}) to {}.{}",
                    record.script_id, record.status, params.database, params.table
                );
                Ok(vec![Item::new(json!({
                    "success": true,
                    "logged_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    "script_id": record.script_id,
                    "log_data": record,
                }))])
            }

            Err(err) => {
                error!("failed to log execution: {err}");
                if params.options.fail_on_error {
                    return Err(err.into());
                }
                Ok(vec![Item::new(json!({
                    "success": false,
                    "error": err.to_string(),
                }))])
            }
        }
    }
}
