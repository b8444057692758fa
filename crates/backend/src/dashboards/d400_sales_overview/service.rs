use contracts::dashboards::d400_sales_overview::{DashboardView, SalesFilter, SqlPreview};
use std::sync::Arc;

use super::aggregation::ResultFrame;
use super::error::DashboardError;
use super::filter_state::FilterState;
use super::lookup::LookupProvider;
use super::presentation::{self, DashboardSink, ViewCollector};
use super::query_builder::SalesQueryBuilder;
use super::repository::SalesWarehouse;

/// Filter request resolved against the current warehouse
pub struct ResolvedRequest {
    pub state: FilterState,
    pub has_rating: bool,
}

/// Sales overview pipeline: filter → queries → aggregation → presentation.
///
/// One call of [`SalesOverview::run`] is one full re-run of the dashboard.
#[derive(Clone)]
pub struct SalesOverview {
    warehouse: Arc<dyn SalesWarehouse>,
    lookup: Arc<LookupProvider>,
}

impl SalesOverview {
    pub fn new(warehouse: Arc<dyn SalesWarehouse>, lookup: Arc<LookupProvider>) -> Self {
        Self { warehouse, lookup }
    }

    pub fn lookup(&self) -> &LookupProvider {
        &self.lookup
    }

    /// Resolve the request; `None` when the date dimension is empty
    pub async fn resolve(
        &self,
        request: &SalesFilter,
    ) -> Result<Option<ResolvedRequest>, DashboardError> {
        let Some(bounds) = self.lookup.date_bounds().await? else {
            return Ok(None);
        };

        Ok(Some(ResolvedRequest {
            state: FilterState::resolve(request, bounds),
            has_rating: self.lookup.has_rating_column().await?,
        }))
    }

    /// Run the pipeline and collect the dashboard view
    pub async fn run(&self, request: &SalesFilter) -> Result<DashboardView, DashboardError> {
        let options = self.lookup.filter_options().await?;
        let mut collector = ViewCollector::new(options);

        let Some(resolved) = self.resolve(request).await? else {
            collector.warning(presentation::NO_DATES_WARNING);
            return Ok(collector.finish());
        };

        let mut collector = collector.applied(resolved.state.applied());
        self.render(&resolved, &mut collector).await?;
        Ok(collector.finish())
    }

    /// Query, aggregate and emit into any sink
    pub async fn render(
        &self,
        resolved: &ResolvedRequest,
        sink: &mut (dyn DashboardSink + Send),
    ) -> Result<(), DashboardError> {
        let frame = self.fetch_frame(resolved).await?;

        let top_products = if frame.is_empty() {
            Vec::new()
        } else {
            let query = SalesQueryBuilder::new(&resolved.state).top_products_query();
            self.warehouse.fetch_top_products(&query).await?
        };

        tracing::info!(
            "D400 pipeline: {} rows, {} top products ({} .. {})",
            frame.len(),
            top_products.len(),
            resolved.state.start,
            resolved.state.end
        );

        presentation::render(&frame, &top_products, sink);
        Ok(())
    }

    /// Filtered fact rows; empty when the warehouse has no dates
    pub async fn frame(&self, request: &SalesFilter) -> Result<ResultFrame, DashboardError> {
        match self.resolve(request).await? {
            Some(resolved) => self.fetch_frame(&resolved).await,
            None => Ok(ResultFrame::default()),
        }
    }

    /// Generated statements without executing them
    pub async fn sql_preview(
        &self,
        request: &SalesFilter,
    ) -> Result<Option<SqlPreview>, DashboardError> {
        Ok(self.resolve(request).await?.map(|resolved| {
            SalesQueryBuilder::new(&resolved.state)
                .with_rating(resolved.has_rating)
                .preview()
        }))
    }

    async fn fetch_frame(&self, resolved: &ResolvedRequest) -> Result<ResultFrame, DashboardError> {
        let query = SalesQueryBuilder::new(&resolved.state)
            .with_rating(resolved.has_rating)
            .fact_query();
        tracing::debug!("D400 fact query: {} ({} params)", query.sql, query.params.len());

        let rows = self.warehouse.fetch_fact_rows(&query).await?;
        Ok(ResultFrame::new(rows, resolved.has_rating))
    }
}
