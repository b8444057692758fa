use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::dashboards::d400_sales_overview::service::SalesOverview;

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pub overview: Arc<SalesOverview>,
}

/// Configure all application routes
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D400 SALES OVERVIEW
        // ========================================
        // Server-rendered page; filters travel in the query string
        .route("/", get(handlers::d400_sales_overview::dashboard_page))
        .route(
            "/api/d400/filters",
            get(handlers::d400_sales_overview::get_filter_options),
        )
        .route(
            "/api/d400/dashboard",
            post(handlers::d400_sales_overview::get_dashboard),
        )
        .route(
            "/api/d400/sql",
            get(handlers::d400_sales_overview::get_generated_sql),
        )
        .route(
            "/api/d400/raw.csv",
            get(handlers::d400_sales_overview::get_raw_csv),
        )
        .with_state(state)
}
