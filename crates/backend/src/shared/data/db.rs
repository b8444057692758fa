use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::shared::config::{self, Config};

/// Open the warehouse connection.
///
/// The handle is created once in `main`, passed down explicitly and closed on
/// shutdown; there is no process-wide connection.
pub async fn connect(config: &Config) -> anyhow::Result<DatabaseConnection> {
    let db_url = config::get_database_url(config)?;
    connect_url(&db_url).await
}

pub async fn connect_url(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(db_url.to_string());
    options
        .max_connections(4)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    tracing::info!("Connecting to warehouse: {}", db_url);
    let conn = Database::connect(options).await?;
    tracing::info!("Warehouse connection ready");
    Ok(conn)
}
