//! Row and connection structs for the execution log table.
//!
//! These are *persistence* models — they carry no domain behaviour.
//! Building a [`LogRecord`] from an upstream summary lives in the `nodes` crate.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// credentials
// ---------------------------------------------------------------------------

/// Decrypted MySQL connection parameters, as handed over by the host.
///
/// Unknown fields are ignored, missing ones fall back to the credential
/// schema defaults.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MySqlCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Default for MySqlCredentials {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3306,
            user: String::new(),
            password: String::new(),
        }
    }
}

impl std::fmt::Debug for MySqlCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// execution log columns
// ---------------------------------------------------------------------------

/// How the logged workflow run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionType {
    Manual,
    Scheduled,
}

impl ExecutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
        }
    }
}

impl std::fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the upstream pixel run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Failed,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the execution log table.
///
/// Field order matches the insert column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub script_id: i64,
    pub execution_id: String,
    /// `regular`, `monthly`, or whatever mode the upstream step reported.
    pub execution_mode: String,
    pub execution_type: ExecutionType,
    pub workflow_name: String,
    pub status: LogStatus,
    pub items_processed: i64,
    pub pixel_new: i64,
    pub pixel_duplicates: i64,
    pub pixel_updated: i64,
    /// JSON text, `{}` when the upstream step reported no events.
    pub event_summary: String,
    /// JSON text, `[]` when the upstream step sent nothing.
    pub full_details: String,
}

// ---------------------------------------------------------------------------
// bind parameters
// ---------------------------------------------------------------------------

/// A positional value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
