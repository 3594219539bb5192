//! `nodes` crate — the `ExecutableNode` trait and the execution logger node.
//!
//! Every node must implement [`ExecutableNode`]. The host drives it with the
//! previous node's items and an [`ExecutionContext`] holding the node's
//! parameters, credentials and run metadata.

pub mod error;
pub mod traits;
pub mod execution_logger;
pub mod mock;

pub use error::{ContextError, NodeError};
pub use execution_logger::ExecutionLogger;
pub use traits::{ExecutableNode, ExecutionContext, Item, Trigger};
