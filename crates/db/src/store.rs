//! The `LogStore` trait — where a finished [`LogRecord`] goes.
//!
//! Nodes hold an `Arc<dyn LogStore>` so tests can swap the MySQL
//! implementation for an in-memory double.

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::{
    DbError, LogRecord, MySqlCredentials, TableRef,
    connection,
    repository::execution_logs,
};

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persist `record` as one row of `target`, using `credentials` to reach
    /// the server.
    async fn insert_log(
        &self,
        credentials: &MySqlCredentials,
        target: &TableRef,
        record: &LogRecord,
    ) -> Result<(), DbError>;
}

/// Writes each record over a fresh connection that is closed before
/// returning, whatever the insert outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlLogStore;

#[async_trait]
impl LogStore for MySqlLogStore {
    #[instrument(skip_all, fields(table = %target, script_id = record.script_id))]
    async fn insert_log(
        &self,
        credentials: &MySqlCredentials,
        target: &TableRef,
        record: &LogRecord,
    ) -> Result<(), DbError> {
        let mut conn = connection::connect(credentials, Some(target.database())).await?;
        let result = execution_logs::insert_execution_log(&mut conn, target, record).await;
        connection::close(conn).await;

        let id = result?;
        info!("execution log row {id} written");
        Ok(())
    }
}
