use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

mod chart;

pub use chart::*;

/// Filter request for the sales overview dashboard.
///
/// Every field is optional on the wire: missing dates fall back to the
/// warehouse bounds, and an empty selection means "no filter on this
/// dimension", never "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesFilter {
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
}

/// Inclusive calendar bounds of the date dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateBounds {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Pull a date into `[min, max]`
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.min, self.max)
    }
}

/// Values offered by the sidebar controls (lookup queries)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// `None` when the date dimension is empty; the filters are disabled then
    pub date_bounds: Option<DateBounds>,
    pub products: Vec<String>,
    pub channels: Vec<String>,
    pub cities: Vec<String>,
    /// Whether `fact_sales` carries the optional `customer_rating` column
    pub has_rating: bool,
}

impl FilterOptions {
    pub fn filters_enabled(&self) -> bool {
        self.date_bounds.is_some()
    }
}

/// Filter after resolution against the warehouse bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFilter {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub products: Vec<String>,
    pub channels: Vec<String>,
    pub cities: Vec<String>,
}

/// One fact record enriched with its dimension attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFactRow {
    pub quantity: i64,
    pub unit_price: f64,
    pub revenue: f64,
    pub cost: f64,
    pub margin: f64,
    pub category: String,
    pub product: String,
    pub channel: String,
    pub date: NaiveDate,
    pub city: Option<String>,
    /// Only populated when the warehouse has a rating column
    pub customer_rating: Option<f64>,
}

// ---------------------------------------------------------------------------
// Aggregated tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_units: i64,
    pub total_revenue: f64,
    pub total_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub units: i64,
    pub revenue: f64,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTotal {
    pub product: String,
    pub units: i64,
    pub margin: f64,
}

/// Row of the top-products query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUnits {
    pub product: String,
    pub total_units: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRevenue {
    pub channel: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub units: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityUnits {
    pub city: String,
    pub units: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel: String,
    pub units: i64,
    /// Share of all units in percent (0..=100)
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRating {
    pub product: String,
    pub mean_rating: f64,
    /// Number of rated rows behind the mean
    pub rated_rows: usize,
}

// ---------------------------------------------------------------------------
// Rendered view
// ---------------------------------------------------------------------------

/// KPI card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    pub label: String,
    pub value: f64,
    /// Value formatted for display ("1,234" or "$1,234")
    pub display: String,
}

/// Raw result frame prepared for a table widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Response of `POST /api/d400/dashboard`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub title: String,
    pub subtitle: String,
    pub options: FilterOptions,
    /// `None` when the filters are disabled (empty date dimension)
    pub applied: Option<AppliedFilter>,
    /// Replaces metrics and charts when set
    pub warning: Option<String>,
    pub metrics: Vec<Metric>,
    pub charts: Vec<ChartSpec>,
    pub raw_data: Option<RawTable>,
}

impl DashboardView {
    pub fn has_data(&self) -> bool {
        self.warning.is_none() && !self.metrics.is_empty()
    }
}

/// Generated statement for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSql {
    pub sql: String,
    pub params: Vec<String>,
}

/// Response of `GET /api/d400/sql`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlPreview {
    pub fact_query: GeneratedSql,
    pub top_products_query: GeneratedSql,
}
