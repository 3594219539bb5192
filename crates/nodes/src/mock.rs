//! `MockLogStore` — a test double for `db::LogStore`.
//!
//! Useful in unit and integration tests where a live MySQL server is
//! either unavailable or irrelevant.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use db::{
    DbError, LogRecord, LogStore, MySqlCredentials, SqlParam, TableRef,
    repository::execution_logs::{insert_params, insert_statement},
};

/// Behaviour injected into `MockLogStore` at construction time.
pub enum MockBehaviour {
    /// Accept every insert.
    Succeed,
    /// Fail as if the server could not be reached.
    FailConnect(String),
    /// Connect, then fail the statement.
    FailQuery(String),
}

/// One insert as it would have gone over the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedInsert {
    pub credentials: MySqlCredentials,
    pub statement: String,
    pub params: Vec<SqlParam>,
    pub record: LogRecord,
}

/// A mock store that records every insert it receives and returns a
/// programmer-specified result.
pub struct MockLogStore {
    /// What the store will do when `insert_log` is called.
    pub behaviour: MockBehaviour,
    /// All inserts attempted against this store (in call order).
    pub calls: Arc<Mutex<Vec<RecordedInsert>>>,
}

impl MockLogStore {
    /// Create a store that accepts every insert.
    pub fn succeeding() -> Self {
        Self::with(MockBehaviour::Succeed)
    }

    /// Create a store whose connection attempts always fail.
    pub fn failing_connect(msg: impl Into<String>) -> Self {
        Self::with(MockBehaviour::FailConnect(msg.into()))
    }

    /// Create a store whose insert statement always fails.
    pub fn failing_query(msg: impl Into<String>) -> Self {
        Self::with(MockBehaviour::FailQuery(msg.into()))
    }

    fn with(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of inserts attempted against this store.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every insert attempted so far.
    pub fn recorded(&self) -> Vec<RecordedInsert> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogStore for MockLogStore {
    async fn insert_log(
        &self,
        credentials: &MySqlCredentials,
        target: &TableRef,
        record: &LogRecord,
    ) -> Result<(), DbError> {
        self.calls.lock().unwrap().push(RecordedInsert {
            credentials: credentials.clone(),
            statement: insert_statement(target),
            params: insert_params(record),
            record: record.clone(),
        });

        match &self.behaviour {
            MockBehaviour::Succeed => Ok(()),
            MockBehaviour::FailConnect(msg) => Err(DbError::Connect {
                host: credentials.host.clone(),
                port: credentials.port,
                source: sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    msg.clone(),
                )),
            }),
            MockBehaviour::FailQuery(msg) => Err(DbError::Query(sqlx::Error::Protocol(msg.clone()))),
        }
    }
}
