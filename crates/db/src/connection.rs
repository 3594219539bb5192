//! Single MySQL connections, opened and closed per call.
//!
//! No pool is kept: every logged execution pays for its own handshake and
//! leaves nothing behind.

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, info, warn};

use crate::{DbError, MySqlCredentials};

fn connect_options(credentials: &MySqlCredentials, database: Option<&str>) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(&credentials.host)
        .port(credentials.port)
        .username(&credentials.user);

    if !credentials.password.is_empty() {
        options = options.password(&credentials.password);
    }

    if let Some(db) = database.filter(|db| !db.is_empty()) {
        options = options.database(db);
    }

    options
}

/// Open a connection, optionally selecting `database` as the default schema.
pub async fn connect(
    credentials: &MySqlCredentials,
    database: Option<&str>,
) -> Result<MySqlConnection, DbError> {
    debug!(
        "Connecting to MySQL at {}:{} as '{}'",
        credentials.host, credentials.port, credentials.user
    );
    connect_options(credentials, database)
        .connect()
        .await
        .map_err(|source| DbError::Connect {
            host: credentials.host.clone(),
            port: credentials.port,
            source,
        })
}

/// Close `conn`, logging instead of failing if the server already went away.
pub async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        warn!("failed to close MySQL connection cleanly: {e}");
    }
}

/// Connect and run `SELECT 1` to prove the credentials work.
pub async fn ping(credentials: &MySqlCredentials, database: Option<&str>) -> Result<(), DbError> {
    let mut conn = connect(credentials, database).await?;
    let result = sqlx::query("SELECT 1").execute(&mut conn).await;
    close(conn).await;
    result?;

    info!("MySQL connection to {}:{} verified", credentials.host, credentials.port);
    Ok(())
}
