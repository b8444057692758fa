use async_trait::async_trait;
use chrono::NaiveDate;
use contracts::dashboards::d400_sales_overview::{DateBounds, ProductUnits, SalesFactRow};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, QueryResult, Statement,
};

use super::error::DashboardError;
use super::query_builder::BuiltQuery;

/// Read-only access to the sales warehouse.
///
/// The lookup provider and the pipeline only talk to this trait, so the
/// concrete store stays a collaborator that is opened once and passed in.
#[async_trait]
pub trait SalesWarehouse: Send + Sync {
    async fn distinct_products(&self) -> Result<Vec<String>, DashboardError>;

    async fn distinct_channels(&self) -> Result<Vec<String>, DashboardError>;

    async fn distinct_cities(&self) -> Result<Vec<String>, DashboardError>;

    /// `None` when the date dimension is empty
    async fn date_bounds(&self) -> Result<Option<DateBounds>, DashboardError>;

    /// Whether `fact_sales` has the optional `customer_rating` column
    async fn has_rating_column(&self) -> Result<bool, DashboardError>;

    async fn fetch_fact_rows(&self, query: &BuiltQuery) -> Result<Vec<SalesFactRow>, DashboardError>;

    async fn fetch_top_products(
        &self,
        query: &BuiltQuery,
    ) -> Result<Vec<ProductUnits>, DashboardError>;
}

/// [`SalesWarehouse`] over a sea-orm connection to the SQLite warehouse
#[derive(Clone)]
pub struct SqlWarehouse {
    db: DatabaseConnection,
}

impl SqlWarehouse {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn distinct_values(&self, sql: &str) -> Result<Vec<String>, DashboardError> {
        #[derive(Debug, FromQueryResult)]
        struct DistinctValue {
            value: Option<String>,
        }

        let stmt = Statement::from_string(DatabaseBackend::Sqlite, sql.to_string());
        let rows = DistinctValue::find_by_statement(stmt).all(&self.db).await?;

        Ok(rows.into_iter().filter_map(|r| r.value).collect())
    }
}

#[async_trait]
impl SalesWarehouse for SqlWarehouse {
    async fn distinct_products(&self) -> Result<Vec<String>, DashboardError> {
        self.distinct_values(
            "SELECT DISTINCT name AS value FROM dim_product WHERE name IS NOT NULL ORDER BY name",
        )
        .await
    }

    async fn distinct_channels(&self) -> Result<Vec<String>, DashboardError> {
        self.distinct_values(
            "SELECT DISTINCT channel AS value FROM dim_channel WHERE channel IS NOT NULL ORDER BY channel",
        )
        .await
    }

    async fn distinct_cities(&self) -> Result<Vec<String>, DashboardError> {
        self.distinct_values(
            "SELECT DISTINCT city AS value FROM dim_region WHERE city IS NOT NULL ORDER BY city",
        )
        .await
    }

    async fn date_bounds(&self) -> Result<Option<DateBounds>, DashboardError> {
        #[derive(Debug, FromQueryResult)]
        struct Bounds {
            min_date: Option<String>,
            max_date: Option<String>,
        }

        let stmt = Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT MIN(date(date)) AS min_date, MAX(date(date)) AS max_date FROM dim_date".to_string(),
        );
        let row = Bounds::find_by_statement(stmt).one(&self.db).await?;

        match row {
            Some(Bounds {
                min_date: Some(min),
                max_date: Some(max),
            }) => Ok(Some(DateBounds::new(
                parse_date("date", &min)?,
                parse_date("date", &max)?,
            ))),
            _ => Ok(None),
        }
    }

    async fn has_rating_column(&self) -> Result<bool, DashboardError> {
        let stmt = Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA table_info(fact_sales)".to_string(),
        );
        let columns = self.db.query_all(stmt).await?;

        Ok(columns.iter().any(|row| {
            row.try_get::<String>("", "name")
                .map(|name| name == "customer_rating")
                .unwrap_or(false)
        }))
    }

    async fn fetch_fact_rows(&self, query: &BuiltQuery) -> Result<Vec<SalesFactRow>, DashboardError> {
        let rows = self.db.query_all(query.statement()).await?;
        rows.iter()
            .map(|row| fact_row(row, query.include_rating))
            .collect()
    }

    async fn fetch_top_products(
        &self,
        query: &BuiltQuery,
    ) -> Result<Vec<ProductUnits>, DashboardError> {
        #[derive(Debug, FromQueryResult)]
        struct TopRow {
            product: String,
            total_units: i64,
        }

        let rows = TopRow::find_by_statement(query.statement())
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductUnits {
                product: r.product,
                total_units: r.total_units,
            })
            .collect())
    }
}

fn fact_row(row: &QueryResult, with_rating: bool) -> Result<SalesFactRow, DashboardError> {
    let date: String = row.try_get("", "date")?;
    let customer_rating = if with_rating {
        row.try_get::<Option<f64>>("", "customer_rating")?
    } else {
        None
    };

    Ok(SalesFactRow {
        quantity: row.try_get("", "quantity")?,
        unit_price: row.try_get("", "unit_price")?,
        revenue: row.try_get("", "revenue")?,
        cost: row.try_get("", "cost")?,
        margin: row.try_get("", "margin")?,
        category: row.try_get("", "category")?,
        product: row.try_get("", "product")?,
        channel: row.try_get("", "channel")?,
        date: parse_date("date", &date)?,
        city: row.try_get("", "city")?,
        customer_rating,
    })
}

fn parse_date(column: &str, value: &str) -> Result<NaiveDate, DashboardError> {
    // Some loaders store timestamps; only the calendar part matters
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| DashboardError::decode(column, format!("{} ({})", value, e)))
}
