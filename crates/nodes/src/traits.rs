//! The `ExecutableNode` trait — the contract every node must fulfil.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ContextError, NodeError};

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// The unit of data flowing between nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub json: Value,
}

impl Item {
    pub fn new(json: Value) -> Self {
        Self { json }
    }
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

/// How the current workflow run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Started by a person from the editor or the API.
    Manual,
    /// Started on a cron schedule.
    Cron,
    /// Started by an incoming HTTP request.
    Webhook,
    /// Started by another workflow or a retry.
    Internal,
}

impl Trigger {
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual)
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual   => write!(f, "manual"),
            Self::Cron     => write!(f, "cron"),
            Self::Webhook  => write!(f, "webhook"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl std::str::FromStr for Trigger {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual"   => Ok(Self::Manual),
            "cron"     => Ok(Self::Cron),
            "webhook"  => Ok(Self::Webhook),
            "internal" => Ok(Self::Internal),
            other      => Err(format!("unknown trigger: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// ExecutionContext
// ---------------------------------------------------------------------------

/// Everything the host hands a node besides its input items.
///
/// Parameters and credentials are read through [`ExecutionContext::parameters`]
/// and [`ExecutionContext::credential`] so each node deserializes exactly the
/// shape it declares.
#[derive(Clone)]
pub struct ExecutionContext {
    /// Host-assigned identifier of the current run.
    pub execution_id: String,
    /// Display name of the running workflow, if the host knows it.
    pub workflow_name: Option<String>,
    pub trigger: Trigger,
    /// The node's configured parameters as a JSON object.
    pub parameters: Value,
    /// Decrypted credentials keyed by credential name.
    pub credentials: HashMap<String, Value>,
}

impl ExecutionContext {
    /// Deserialize the node parameters into `T`.
    pub fn parameters<T: DeserializeOwned>(&self) -> Result<T, ContextError> {
        T::deserialize(&self.parameters).map_err(ContextError::InvalidParameters)
    }

    /// Look up credential `name` and deserialize it into `T`.
    pub fn credential<T: DeserializeOwned>(&self, name: &str) -> Result<T, ContextError> {
        let raw = self
            .credentials
            .get(name)
            .ok_or_else(|| ContextError::MissingCredential(name.to_owned()))?;
        T::deserialize(raw).map_err(|source| ContextError::InvalidCredential {
            name: name.to_owned(),
            source,
        })
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.credentials.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ExecutionContext")
            .field("execution_id", &self.execution_id)
            .field("workflow_name", &self.workflow_name)
            .field("trigger", &self.trigger)
            .field("parameters", &self.parameters)
            .field("credentials", &names)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ExecutableNode
// ---------------------------------------------------------------------------

/// The core node trait.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Execute the node on the items produced by the *previous* node and
    /// return this node's output items.
    async fn execute(
        &self,
        items: Vec<Item>,
        ctx: &ExecutionContext,
    ) -> Result<Vec<Item>, NodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Conn {
        host: String,
        port: u16,
    }

    fn ctx_with(credentials: HashMap<String, Value>) -> ExecutionContext {
        ExecutionContext {
            execution_id: "1".into(),
            workflow_name: None,
            trigger: Trigger::Cron,
            parameters: json!({ "table": "logs" }),
            credentials,
        }
    }

    #[test]
    fn credential_is_deserialized_by_name() {
        let ctx = ctx_with(HashMap::from([(
            "mySql".to_owned(),
            json!({ "host": "db.internal", "port": 3307, "password": "s3cret" }),
        )]));
        let conn: Conn = ctx.credential("mySql").expect("credential present");
        assert_eq!(conn, Conn { host: "db.internal".into(), port: 3307 });
    }

    #[test]
    fn missing_credential_names_the_credential() {
        let ctx = ctx_with(HashMap::new());
        let err = ctx.credential::<Conn>("mySql").unwrap_err();
        assert!(matches!(err, ContextError::MissingCredential(ref n) if n == "mySql"));
    }

    #[test]
    fn malformed_credential_is_reported() {
        let ctx = ctx_with(HashMap::from([("mySql".to_owned(), json!({ "host": 5 }))]));
        assert!(matches!(
            ctx.credential::<Conn>("mySql"),
            Err(ContextError::InvalidCredential { .. })
        ));
    }

    #[test]
    fn debug_lists_credential_names_only() {
        let ctx = ctx_with(HashMap::from([(
            "mySql".to_owned(),
            json!({ "password": "s3cret" }),
        )]));
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("mySql"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn trigger_parses_from_its_display_form() {
        for t in [Trigger::Manual, Trigger::Cron, Trigger::Webhook, Trigger::Internal] {
            assert_eq!(t.to_string().parse::<Trigger>(), Ok(t));
        }
        assert!(Trigger::Manual.is_manual());
        assert!(!Trigger::Webhook.is_manual());
    }
}
