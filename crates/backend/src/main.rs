pub mod api;
pub mod dashboards;
pub mod routes;
pub mod shared;
pub mod system;
pub mod web;

use std::sync::Arc;

use dashboards::d400_sales_overview::lookup::LookupProvider;
use dashboards::d400_sales_overview::repository::{SalesWarehouse, SqlWarehouse};
use dashboards::d400_sales_overview::service::SalesOverview;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::http::{header, Method};
    use axum::middleware;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let db = shared::data::db::connect(&config).await?;

    let warehouse: Arc<dyn SalesWarehouse> = Arc::new(SqlWarehouse::new(db.clone()));
    let lookup = Arc::new(LookupProvider::new(warehouse.clone(), config.lookup.ttl()));
    tracing::info!("Lookup cache window: {}s", config.lookup.ttl_secs);

    let state = routes::AppState {
        overview: Arc::new(SalesOverview::new(warehouse, lookup)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(state)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server address: {e}"))?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, closing database connection");
    db.close().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // keep serving without a signal handler
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
