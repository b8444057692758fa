use chrono::NaiveDate;
use contracts::dashboards::d400_sales_overview::{GeneratedSql, SqlPreview};
use sea_orm::{DatabaseBackend, Statement};

use super::filter_state::{Dimension, FilterState};

/// Rows returned by the top-products chart query
pub const TOP_PRODUCTS_LIMIT: usize = 10;

/// Star-schema joins shared by both dashboard queries
const STAR_JOINS: &str = "FROM fact_sales f \
     JOIN dim_product p ON f.product_key = p.product_key \
     JOIN dim_channel c ON f.channel_key = c.channel_key \
     JOIN dim_date t ON f.date_key = t.date_key \
     JOIN dim_customer cu ON f.customer_key = cu.customer_key \
     JOIN dim_region r ON cu.region_key = r.region_key";

/// Query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Date(NaiveDate),
}

impl QueryParam {
    /// Representation for the SQL preview
    pub fn display(&self) -> String {
        match self {
            QueryParam::Text(s) => format!("'{}'", s),
            QueryParam::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        }
    }

    fn to_value(&self) -> sea_orm::Value {
        match self {
            QueryParam::Text(s) => s.clone().into(),
            // dim_date.date is ISO text
            QueryParam::Date(d) => d.format("%Y-%m-%d").to_string().into(),
        }
    }
}

/// Result of query building
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    /// SQL query string
    pub sql: String,
    /// Bound parameters, in placeholder order
    pub params: Vec<QueryParam>,
    /// Whether `customer_rating` is among the selected columns
    pub include_rating: bool,
}

impl BuiltQuery {
    pub fn statement(&self) -> Statement {
        let values: Vec<sea_orm::Value> = self.params.iter().map(QueryParam::to_value).collect();
        Statement::from_sql_and_values(DatabaseBackend::Sqlite, &self.sql, values)
    }

    pub fn generated(&self) -> GeneratedSql {
        GeneratedSql {
            sql: self.sql.clone(),
            params: self.params.iter().map(QueryParam::display).collect(),
        }
    }
}

/// One conjunct of the WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    DateRange { start: NaiveDate, end: NaiveDate },
    InSet { dimension: Dimension, values: Vec<String> },
}

/// Conjunction of clauses; always starts with the date range
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Whether an `IN` clause for `dimension` is present
    pub fn restricts(&self, dimension: Dimension) -> bool {
        self.clauses
            .iter()
            .any(|c| matches!(c, Clause::InSet { dimension: d, .. } if *d == dimension))
    }

    /// Render to SQL with `?` placeholders
    pub fn to_sql(&self) -> (String, Vec<QueryParam>) {
        let mut conditions = Vec::with_capacity(self.clauses.len());
        let mut params = Vec::new();

        for clause in &self.clauses {
            match clause {
                Clause::DateRange { start, end } => {
                    // dim_date.date may carry a time part
                    conditions.push("date(t.date) BETWEEN ? AND ?".to_string());
                    params.push(QueryParam::Date(*start));
                    params.push(QueryParam::Date(*end));
                }
                Clause::InSet { dimension, values } => {
                    let placeholders = vec!["?"; values.len()].join(", ");
                    conditions.push(format!("{} IN ({})", dimension.column(), placeholders));
                    params.extend(values.iter().cloned().map(QueryParam::Text));
                }
            }
        }

        (conditions.join(" AND "), params)
    }
}

/// Builds the parameterized dashboard queries from a [`FilterState`]
pub struct SalesQueryBuilder<'a> {
    filter: &'a FilterState,
    include_rating: bool,
}

impl<'a> SalesQueryBuilder<'a> {
    pub fn new(filter: &'a FilterState) -> Self {
        Self {
            filter,
            include_rating: false,
        }
    }

    /// Select `f.customer_rating` as well (only when the column exists)
    pub fn with_rating(mut self, include_rating: bool) -> Self {
        self.include_rating = include_rating;
        self
    }

    /// Predicate over the dimensions in `scope`; empty selections are skipped
    pub fn predicate(&self, scope: &[Dimension]) -> Predicate {
        let mut clauses = vec![Clause::DateRange {
            start: self.filter.start,
            end: self.filter.end,
        }];

        for dimension in scope {
            let selection = self.filter.selection(*dimension);
            if selection.is_empty() {
                continue;
            }
            clauses.push(Clause::InSet {
                dimension: *dimension,
                values: selection.values().to_vec(),
            });
        }

        Predicate { clauses }
    }

    /// Filtered fact rows enriched with all dimension attributes
    pub fn fact_query(&self) -> BuiltQuery {
        let (where_clause, params) = self.predicate(&Dimension::ALL).to_sql();

        let mut columns = vec![
            "f.quantity",
            "f.unit_price",
            "f.revenue",
            "f.cost",
            "f.margin",
            "p.category",
            "p.name AS product",
            "c.channel",
            "t.date",
            "r.city",
        ];
        if self.include_rating {
            columns.push("f.customer_rating");
        }

        let sql = format!(
            "SELECT {} {} WHERE {} ORDER BY t.date, p.name",
            columns.join(", "),
            STAR_JOINS,
            where_clause
        );

        BuiltQuery {
            sql,
            params,
            include_rating: self.include_rating,
        }
    }

    /// Top products by units; ignores the product selection on purpose so the
    /// chart always shows the overall best sellers
    pub fn top_products_query(&self) -> BuiltQuery {
        let (where_clause, params) = self
            .predicate(&[Dimension::Channel, Dimension::City])
            .to_sql();

        let sql = format!(
            "SELECT p.name AS product, SUM(f.quantity) AS total_units {} WHERE {} \
             GROUP BY p.name ORDER BY total_units DESC, p.name LIMIT {}",
            STAR_JOINS, where_clause, TOP_PRODUCTS_LIMIT
        );

        BuiltQuery {
            sql,
            params,
            include_rating: false,
        }
    }

    pub fn preview(&self) -> SqlPreview {
        SqlPreview {
            fact_query: self.fact_query().generated(),
            top_products_query: self.top_products_query().generated(),
        }
    }
}
