use crate::error::ProxyError;
use common::model::connection::ConnectionConfig;
use futures_util::future::BoxFuture;
use log::{debug, warn};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection};

fn connect_options(config: &ConnectionConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .ssl_mode(PgSslMode::Disable)
}

/// Opens one connection for `config`, runs `f` on it and closes it, whether
/// `f` succeeded or not.
pub async fn with_connection<T, F>(config: &ConnectionConfig, f: F) -> Result<T, ProxyError>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, ProxyError>>,
{
    debug!("Connecting to {}", config);
    let mut conn = PgConnection::connect_with(&connect_options(config))
        .await
        .map_err(ProxyError::Connection)?;

    let result = f(&mut conn).await;

    if let Err(e) = conn.close().await {
        warn!("Error closing connection to {}: {}", config, e);
    }
    result
}
