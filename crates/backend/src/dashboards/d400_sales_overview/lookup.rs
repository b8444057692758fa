use contracts::dashboards::d400_sales_overview::{DateBounds, FilterOptions};
use std::sync::Arc;
use std::time::Duration;

use super::error::DashboardError;
use super::repository::SalesWarehouse;
use crate::shared::cache::TtlCache;

/// Reference data for the filter controls, memoized per query
pub struct LookupProvider {
    warehouse: Arc<dyn SalesWarehouse>,
    products: TtlCache<Vec<String>>,
    channels: TtlCache<Vec<String>>,
    cities: TtlCache<Vec<String>>,
    date_bounds: TtlCache<Option<DateBounds>>,
    rating_column: TtlCache<bool>,
}

impl LookupProvider {
    pub fn new(warehouse: Arc<dyn SalesWarehouse>, ttl: Duration) -> Self {
        Self {
            warehouse,
            products: TtlCache::new(ttl),
            channels: TtlCache::new(ttl),
            cities: TtlCache::new(ttl),
            date_bounds: TtlCache::new(ttl),
            rating_column: TtlCache::new(ttl),
        }
    }

    pub async fn products(&self) -> Result<Arc<Vec<String>>, DashboardError> {
        self.products
            .get_or_refresh(|| async {
                tracing::debug!("D400 lookup: refreshing products");
                self.warehouse.distinct_products().await
            })
            .await
    }

    pub async fn channels(&self) -> Result<Arc<Vec<String>>, DashboardError> {
        self.channels
            .get_or_refresh(|| async {
                tracing::debug!("D400 lookup: refreshing channels");
                self.warehouse.distinct_channels().await
            })
            .await
    }

    pub async fn cities(&self) -> Result<Arc<Vec<String>>, DashboardError> {
        self.cities
            .get_or_refresh(|| async {
                tracing::debug!("D400 lookup: refreshing cities");
                self.warehouse.distinct_cities().await
            })
            .await
    }

    pub async fn date_bounds(&self) -> Result<Option<DateBounds>, DashboardError> {
        let bounds = self
            .date_bounds
            .get_or_refresh(|| async {
                tracing::debug!("D400 lookup: refreshing date bounds");
                self.warehouse.date_bounds().await
            })
            .await?;
        Ok(*bounds)
    }

    pub async fn has_rating_column(&self) -> Result<bool, DashboardError> {
        let present = self
            .rating_column
            .get_or_refresh(|| self.warehouse.has_rating_column())
            .await?;
        Ok(*present)
    }

    /// Everything the sidebar needs in one call
    pub async fn filter_options(&self) -> Result<FilterOptions, DashboardError> {
        let date_bounds = self.date_bounds().await?;
        if date_bounds.is_none() {
            tracing::warn!("D400 lookup: date dimension is empty, filters disabled");
        }

        Ok(FilterOptions {
            date_bounds,
            products: self.products().await?.as_ref().clone(),
            channels: self.channels().await?.as_ref().clone(),
            cities: self.cities().await?.as_ref().clone(),
            has_rating: self.has_rating_column().await?,
        })
    }

    /// Drop all cached lookups
    pub async fn invalidate(&self) {
        self.products.invalidate().await;
        self.channels.invalidate().await;
        self.cities.invalidate().await;
        self.date_bounds.invalidate().await;
        self.rating_column.invalidate().await;
    }
}
