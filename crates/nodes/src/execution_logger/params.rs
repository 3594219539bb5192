//! Node parameters of the execution logger.

use serde::{Deserialize, Serialize};

/// Default name of the execution log table.
pub const DEFAULT_TABLE: &str = "n8n_scraper_logs";

/// Which execution mode to record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionModeParam {
    /// Take the mode reported upstream, falling back to `regular`.
    #[default]
    Auto,
    Regular,
    Monthly,
}

impl ExecutionModeParam {
    /// The mode to store, given what the upstream step reported.
    pub fn resolve(self, reported: Option<&str>) -> String {
        match self {
            Self::Auto => reported.unwrap_or("regular").to_owned(),
            Self::Regular => "regular".to_owned(),
            Self::Monthly => "monthly".to_owned(),
        }
    }
}

impl std::fmt::Display for ExecutionModeParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto    => write!(f, "auto"),
            Self::Regular => write!(f, "regular"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for ExecutionModeParam {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto"    => Ok(Self::Auto),
            "regular" => Ok(Self::Regular),
            "monthly" => Ok(Self::Monthly),
            other     => Err(format!("unknown execution mode: {other}")),
        }
    }
}

/// The `options` collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerOptions {
    /// Abort the workflow branch when logging fails instead of emitting a
    /// `success: false` item.
    pub fail_on_error: bool,
    /// Log the full record before inserting it.
    pub verbose_logging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerParameters {
    pub database: String,
    pub table: String,
    #[serde(default)]
    pub execution_mode: ExecutionModeParam,
    #[serde(default)]
    pub options: LoggerOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_parameters_default() {
        let params: LoggerParameters =
            serde_json::from_value(json!({ "database": "backoffice", "table": DEFAULT_TABLE }))
                .expect("minimal parameters parse");
        assert_eq!(params.execution_mode, ExecutionModeParam::Auto);
        assert!(!params.options.fail_on_error);
        assert!(!params.options.verbose_logging);
    }

    #[test]
    fn camel_case_options_are_read() {
        let params: LoggerParameters = serde_json::from_value(json!({
            "database": "backoffice",
            "table": "logs",
            "executionMode": "monthly",
            "options": { "failOnError": true }
        }))
        .expect("parameters parse");
        assert_eq!(params.execution_mode, ExecutionModeParam::Monthly);
        assert!(params.options.fail_on_error);
        assert!(!params.options.verbose_logging);
    }

    #[test]
    fn database_and_table_are_required() {
        assert!(serde_json::from_value::<LoggerParameters>(json!({ "table": "logs" })).is_err());
        assert!(serde_json::from_value::<LoggerParameters>(json!({ "database": "db" })).is_err());
    }

    #[test]
    fn auto_prefers_the_reported_mode() {
        assert_eq!(ExecutionModeParam::Auto.resolve(Some("monthly")), "monthly");
        assert_eq!(ExecutionModeParam::Auto.resolve(None), "regular");
        assert_eq!(ExecutionModeParam::Regular.resolve(Some("monthly")), "regular");
        assert_eq!(ExecutionModeParam::Monthly.resolve(None), "monthly");
    }
}
