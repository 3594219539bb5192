//! `db` crate — pure persistence layer for the execution log table.
//!
//! Provides credential and row structs, identifier validation, per-call
//! MySQL connections, and the repository functions that touch the table.
//! No business logic lives here.

pub mod error;
pub mod connection;
pub mod repository;
pub mod models;
pub mod store;
pub mod table;

pub use error::DbError;
pub use models::{ExecutionType, LogRecord, LogStatus, MySqlCredentials, SqlParam};
pub use store::{LogStore, MySqlLogStore};
pub use table::TableRef;
