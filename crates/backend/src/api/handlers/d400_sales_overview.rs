use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use contracts::dashboards::d400_sales_overview::{
    DashboardView, FilterOptions, SalesFilter, SqlPreview,
};

use crate::dashboards::d400_sales_overview::error::DashboardError;
use crate::dashboards::d400_sales_overview::export;
use crate::dashboards::d400_sales_overview::filter_state::{parse_query, to_query_string};
use crate::routes::AppState;
use crate::web::page;

/// Log and map a pipeline error to its status code
fn failure(context: &str, e: DashboardError) -> StatusCode {
    let status = e.status_code();
    if status.is_client_error() {
        tracing::warn!("D400 Dashboard: {}: {}", context, e);
    } else {
        tracing::error!("D400 Dashboard: {}: {}", context, e);
    }
    status
}

fn error_html(status: StatusCode, e: &DashboardError) -> Response {
    let title = if status.is_client_error() {
        "Invalid filter"
    } else {
        "The dashboard could not be loaded"
    };
    (status, Html(page::error_page(title, &e.to_string()).into_string())).into_response()
}

/// GET /?date_from=..&date_to=..&product=..&channel=..&city=..
///
/// Every filter change submits the form and re-runs the whole pipeline.
pub async fn dashboard_page(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let request = match parse_query(query.as_deref()) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("D400 Dashboard: Rejected page filter: {}", e);
            return error_html(e.status_code(), &e);
        }
    };

    match state.overview.run(&request).await {
        Ok(view) => {
            let query = match view.applied.as_ref().map(to_query_string).transpose() {
                Ok(query) => query.unwrap_or_default(),
                Err(e) => {
                    tracing::warn!("D400 Dashboard: Dropping filter from links: {}", e);
                    String::new()
                }
            };
            Html(page::dashboard_page(&view, &query).into_string()).into_response()
        }
        Err(e) => {
            tracing::error!("D400 Dashboard: Failed to render page: {}", e);
            error_html(e.status_code(), &e)
        }
    }
}

/// GET /api/d400/filters
pub async fn get_filter_options(
    State(state): State<AppState>,
) -> Result<Json<FilterOptions>, StatusCode> {
    match state.overview.lookup().filter_options().await {
        Ok(options) => {
            tracing::info!(
                "D400 Dashboard: Returning filters ({} products, {} channels, {} cities)",
                options.products.len(),
                options.channels.len(),
                options.cities.len()
            );
            Ok(Json(options))
        }
        Err(e) => Err(failure("Failed to load filter options", e)),
    }
}

/// POST /api/d400/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Json(request): Json<SalesFilter>,
) -> Result<Json<DashboardView>, StatusCode> {
    tracing::info!(
        "D400 Dashboard: Running for {:?}..{:?} ({} products, {} channels, {} cities)",
        request.date_from,
        request.date_to,
        request.products.len(),
        request.channels.len(),
        request.cities.len()
    );

    match state.overview.run(&request).await {
        Ok(view) => {
            tracing::info!(
                "D400 Dashboard: Returning {} metrics, {} charts",
                view.metrics.len(),
                view.charts.len()
            );
            Ok(Json(view))
        }
        Err(e) => Err(failure("Failed to build dashboard", e)),
    }
}

/// GET /api/d400/sql?...
pub async fn get_generated_sql(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<SqlPreview>, StatusCode> {
    let request = parse_query(query.as_deref()).map_err(|e| failure("Rejected SQL filter", e))?;

    match state.overview.sql_preview(&request).await {
        Ok(Some(preview)) => Ok(Json(preview)),
        Ok(None) => {
            tracing::warn!("D400 Dashboard: No SQL preview, the date dimension is empty");
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => Err(failure("Failed to generate SQL", e)),
    }
}

/// GET /api/d400/raw.csv?...
pub async fn get_raw_csv(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response, StatusCode> {
    let request = parse_query(query.as_deref()).map_err(|e| failure("Rejected CSV filter", e))?;

    let frame = state
        .overview
        .frame(&request)
        .await
        .map_err(|e| failure("Failed to load raw data", e))?;
    let body = export::to_csv(&frame.raw_table()).map_err(|e| failure("Failed to export CSV", e))?;

    tracing::info!("D400 Dashboard: Exporting {} raw rows", frame.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export::CSV_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::to_bytes;

    use crate::dashboards::d400_sales_overview::lookup::LookupProvider;
    use crate::dashboards::d400_sales_overview::repository::{SalesWarehouse, SqlWarehouse};
    use crate::dashboards::d400_sales_overview::service::SalesOverview;
    use crate::dashboards::d400_sales_overview::test_support;

    fn state(warehouse: SqlWarehouse) -> State<AppState> {
        let warehouse: Arc<dyn SalesWarehouse> = Arc::new(warehouse);
        let lookup = Arc::new(LookupProvider::new(warehouse.clone(), Duration::from_secs(300)));
        State(AppState {
            overview: Arc::new(SalesOverview::new(warehouse, lookup)),
        })
    }

    async fn seeded() -> State<AppState> {
        state(test_support::seeded_warehouse(false).await)
    }

    fn query(raw: &str) -> RawQuery {
        RawQuery(Some(raw.to_string()))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_page_rejects_bad_date() {
        let response = dashboard_page(seeded().await, query("date_from=yesterday")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("Invalid filter"));
    }

    #[tokio::test]
    async fn test_page_renders_selected_filter() {
        let response = dashboard_page(
            seeded().await,
            query("date_from=2024-01-01&date_to=2024-01-31&city%5B%5D=Cali"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"<option value="Cali" selected>"#));
        assert!(html.contains("/api/d400/raw.csv?date_from=2024-01-01"));
    }

    #[tokio::test]
    async fn test_sql_preview_rejects_bad_date() {
        let result = get_generated_sql(seeded().await, query("date_to=31/01/2024")).await;
        assert_eq!(result.err(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_sql_preview_not_found_without_dates() {
        let state = state(test_support::empty_warehouse().await);
        let result = get_generated_sql(state, RawQuery(None)).await;
        assert_eq!(result.err(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_sql_preview_binds_selection() {
        let Json(preview) = get_generated_sql(seeded().await, query("channel[]=Online"))
            .await
            .unwrap();

        assert!(preview.fact_query.sql.contains("c.channel IN (?)"));
        assert_eq!(
            preview.fact_query.params,
            vec!["'2024-01-01'", "'2024-01-31'", "'Online'"]
        );
    }

    #[tokio::test]
    async fn test_raw_csv_is_an_attachment() {
        let response = get_raw_csv(seeded().await, query("city[]=Cali")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            headers.get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"sales_raw_data.csv\""
        );

        let csv = body_text(response).await;
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().contains("quantity"));
        assert!(lines.all(|line| line.contains("Cali")));
    }
}
