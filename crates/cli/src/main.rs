//! `execution-logger` CLI entry-point.
//!
//! Acts as a minimal host for the execution logger node: it reads a pixel
//! sender summary from a file, supplies parameters and MySQL credentials
//! from flags or the environment, and prints the node's output items.
//!
//! Available sub-commands:
//! - `log`        — run the node and insert one row.
//! - `preview`    — print the row that would be inserted, without a database.
//! - `check`      — verify the MySQL credentials with `SELECT 1`.
//! - `init-table` — create the execution log table if it is missing.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use db::{MySqlCredentials, MySqlLogStore, TableRef};
use nodes::execution_logger::{CREDENTIAL_NAME, DEFAULT_TABLE, ExecutionModeParam};
use nodes::{ExecutableNode, ExecutionContext, ExecutionLogger, Item, Trigger};

#[derive(Parser)]
#[command(
    name = "execution-logger",
    about = "Record pixel sender runs in a MySQL audit table",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log an execution summary as one row.
    Log {
        #[command(flatten)]
        run: RunArgs,
        /// Database holding the log table.
        #[arg(long, env = "LOG_DATABASE")]
        database: String,
        #[arg(long, env = "LOG_TABLE", default_value = DEFAULT_TABLE)]
        table: String,
        /// Exit with an error instead of printing a `success: false` item.
        #[arg(long)]
        fail_on_error: bool,
        /// Log the full record before inserting it.
        #[arg(long)]
        verbose: bool,
        #[command(flatten)]
        mysql: MySqlArgs,
    },
    /// Print the row an execution summary would produce.
    Preview {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Check that the MySQL credentials work.
    Check {
        #[arg(long, env = "LOG_DATABASE")]
        database: Option<String>,
        #[command(flatten)]
        mysql: MySqlArgs,
    },
    /// Create the execution log table if it does not exist.
    InitTable {
        #[arg(long, env = "LOG_DATABASE")]
        database: String,
        #[arg(long, env = "LOG_TABLE", default_value = DEFAULT_TABLE)]
        table: String,
        #[command(flatten)]
        mysql: MySqlArgs,
    },
}

/// Input and run metadata shared by `log` and `preview`.
#[derive(Args)]
struct RunArgs {
    /// Summary JSON file, or `-` for stdin.
    #[arg(long, short)]
    input: PathBuf,
    #[arg(long, default_value_t = ExecutionModeParam::Auto)]
    execution_mode: ExecutionModeParam,
    #[arg(long)]
    workflow_name: Option<String>,
    /// Defaults to a random UUID.
    #[arg(long)]
    execution_id: Option<String>,
    #[arg(long, default_value_t = Trigger::Manual)]
    trigger: Trigger,
}

#[derive(Args)]
struct MySqlArgs {
    #[arg(long = "mysql-host", env = "MYSQL_HOST", default_value = "localhost")]
    host: String,
    #[arg(long = "mysql-port", env = "MYSQL_PORT", default_value_t = 3306)]
    port: u16,
    #[arg(long = "mysql-user", env = "MYSQL_USER", default_value = "")]
    user: String,
    #[arg(
        long = "mysql-password",
        env = "MYSQL_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    password: String,
}

impl From<MySqlArgs> for MySqlCredentials {
    fn from(args: MySqlArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            user: args.user,
            password: args.password,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Log { run, database, table, fail_on_error, verbose, mysql } => {
            let items = read_items(&run.input)?;
            let parameters = json!({
                "database": database,
                "table": table,
                "executionMode": run.execution_mode,
                "options": { "failOnError": fail_on_error, "verboseLogging": verbose },
            });
            let credentials = HashMap::from([(
                CREDENTIAL_NAME.to_owned(),
                serde_json::to_value(MySqlCredentials::from(mysql))?,
            )]);
            let ctx = build_context(&run, parameters, credentials);

            let node = ExecutionLogger::new(Arc::new(MySqlLogStore));
            let output = node.execute(items, &ctx).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Preview { run } => {
            let item = read_items(&run.input)?
                .into_iter()
                .next()
                .context("input holds no items")?;
            let ctx = build_context(&run, Value::Null, HashMap::new());

            let record = ExecutionLogger::prepare(&item.json, run.execution_mode, &ctx)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Check { database, mysql } => {
            let credentials = MySqlCredentials::from(mysql);
            db::connection::ping(&credentials, database.as_deref()).await?;
            println!("MySQL connection to {}:{} OK", credentials.host, credentials.port);
        }
        Command::InitTable { database, table, mysql } => {
            let credentials = MySqlCredentials::from(mysql);
            let target = TableRef::new(&database, &table)?;

            let mut conn = db::connection::connect(&credentials, Some(target.database())).await?;
            let result = db::repository::execution_logs::create_log_table(&mut conn, &target).await;
            db::connection::close(conn).await;
            result?;
            info!("Table {target} is ready");
        }
    }

    Ok(())
}

fn build_context(
    run: &RunArgs,
    parameters: Value,
    credentials: HashMap<String, Value>,
) -> ExecutionContext {
    ExecutionContext {
        execution_id: run
            .execution_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        workflow_name: run.workflow_name.clone(),
        trigger: run.trigger,
        parameters,
        credentials,
    }
}

fn read_items(path: &Path) -> Result<Vec<Item>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read summary from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("cannot read file {}", path.display()))?
    };
    parse_items(&content)
}

/// Accepts an array of items (`[{"json": {...}}]`), an array of bare
/// summaries, or a single summary object.
fn parse_items(content: &str) -> Result<Vec<Item>> {
    let value: Value = serde_json::from_str(content).context("input is not valid JSON")?;
    let items = match value {
        Value::Array(entries) => entries.into_iter().map(into_item).collect(),
        other => vec![into_item(other)],
    };
    Ok(items)
}

fn into_item(value: Value) -> Item {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("json") => {
            Item::new(map.remove("json").unwrap_or_default())
        }
        other => Item::new(other),
    }
}
