//! Repository functions — one function per database operation.
//!
//! Every function takes an open `&mut MySqlConnection` and returns a
//! `Result<T, DbError>`. No business logic, no domain types — pure SQL.

pub mod execution_logs;
