use chrono::NaiveDate;
use contracts::dashboards::d400_sales_overview::{AppliedFilter, DateBounds, SalesFilter};
use serde::{Deserialize, Serialize};

use super::error::DashboardError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Discrete dimensions the user can restrict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Product,
    Channel,
    City,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Product, Dimension::Channel, Dimension::City];

    /// Qualified column the `IN` clause is applied to
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Product => "p.name",
            Dimension::Channel => "c.channel",
            Dimension::City => "r.city",
        }
    }
}

/// Selected values of one dimension. Empty means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Vec<String>);

impl Selection {
    /// Drops blank values and duplicates (first occurrence wins).
    ///
    /// Values are kept verbatim so they still match the dimension rows.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref();
            if !value.trim().is_empty() && !out.iter().any(|v| v == value) {
                out.push(value.to_string());
            }
        }
        Self(out)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

/// Resolved filter the query builder works from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub products: Selection,
    pub channels: Selection,
    pub cities: Selection,
}

impl FilterState {
    /// Unrestricted filter over `[start, end]`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let bounds = DateBounds::new(start, end);
        Self {
            start: bounds.min,
            end: bounds.max,
            products: Selection::default(),
            channels: Selection::default(),
            cities: Selection::default(),
        }
    }

    /// Resolve a request against the warehouse date bounds.
    ///
    /// Missing dates default to the bounds, given dates are clamped into
    /// them, and a reversed range is swapped.
    pub fn resolve(request: &SalesFilter, bounds: DateBounds) -> Self {
        let start = bounds.clamp(request.date_from.unwrap_or(bounds.min));
        let end = bounds.clamp(request.date_to.unwrap_or(bounds.max));

        Self::new(start, end)
            .with_selection(Dimension::Product, &request.products)
            .with_selection(Dimension::Channel, &request.channels)
            .with_selection(Dimension::City, &request.cities)
    }

    pub fn with_selection<S: AsRef<str>>(mut self, dimension: Dimension, values: &[S]) -> Self {
        let selection = Selection::new(values);
        match dimension {
            Dimension::Product => self.products = selection,
            Dimension::Channel => self.channels = selection,
            Dimension::City => self.cities = selection,
        }
        self
    }

    pub fn selection(&self, dimension: Dimension) -> &Selection {
        match dimension {
            Dimension::Product => &self.products,
            Dimension::Channel => &self.channels,
            Dimension::City => &self.cities,
        }
    }

    pub fn applied(&self) -> AppliedFilter {
        AppliedFilter {
            date_from: self.start,
            date_to: self.end,
            products: self.products.values().to_vec(),
            channels: self.channels.values().to_vec(),
            cities: self.cities.values().to_vec(),
        }
    }
}

/// Dashboard filter as it travels in the query string.
///
/// The page form posts its multi-selects as `product[]=A&product[]=B`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FilterQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_to: Option<String>,
    #[serde(default, rename = "product", skip_serializing_if = "Vec::is_empty")]
    products: Vec<String>,
    #[serde(default, rename = "channel", skip_serializing_if = "Vec::is_empty")]
    channels: Vec<String>,
    #[serde(default, rename = "city", skip_serializing_if = "Vec::is_empty")]
    cities: Vec<String>,
}

/// Browsers percent-encode the brackets of `product[]`, so strict mode is off
fn query_config() -> serde_qs::Config {
    serde_qs::Config::new(2, false)
}

/// Parse the dashboard query string.
///
/// Unknown keys are ignored, blank dates mean "not set".
pub fn parse_query(raw: Option<&str>) -> Result<SalesFilter, DashboardError> {
    let raw = raw.unwrap_or_default();
    let query: FilterQuery = query_config()
        .deserialize_str(raw)
        .map_err(|e| DashboardError::InvalidFilter(format!("bad query string: {}", e)))?;

    Ok(SalesFilter {
        date_from: parse_date(query.date_from.as_deref())?,
        date_to: parse_date(query.date_to.as_deref())?,
        products: query.products,
        channels: query.channels,
        cities: query.cities,
    })
}

/// Inverse of [`parse_query`], used for links that keep the current filter
pub fn to_query_string(filter: &AppliedFilter) -> Result<String, DashboardError> {
    let query = FilterQuery {
        date_from: Some(filter.date_from.format(DATE_FORMAT).to_string()),
        date_to: Some(filter.date_to.format(DATE_FORMAT).to_string()),
        products: filter.products.clone(),
        channels: filter.channels.clone(),
        cities: filter.cities.clone(),
    };
    serde_qs::to_string(&query)
        .map_err(|e| DashboardError::InvalidFilter(format!("unencodable filter: {}", e)))
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, DashboardError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| DashboardError::InvalidFilter(format!("invalid date: {}", value))),
    }
}
