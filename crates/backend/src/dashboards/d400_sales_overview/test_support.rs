//! In-memory star schema used by the dashboard tests.

use chrono::NaiveDate;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

use super::repository::SqlWarehouse;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// (product_key, channel_key, day of January, customer_key, quantity, unit_price, rating)
pub const FACTS: &[(i64, i64, u32, i64, i64, f64, Option<f64>)] = &[
    (1, 1, 1, 1, 5, 200.0, Some(4.0)),
    (2, 1, 5, 3, 2, 900.0, Some(4.5)),
    (3, 2, 5, 2, 1, 1500.0, Some(5.0)),
    (1, 3, 10, 3, 8, 180.0, None),
    (2, 2, 15, 1, 3, 950.0, Some(3.5)),
    (1, 2, 20, 2, 4, 210.0, Some(4.0)),
    (3, 1, 25, 3, 2, 1400.0, Some(3.0)),
    (2, 3, 31, 2, 1, 880.0, None),
];

/// Cost is 70% of revenue in the fixture
pub const COST_RATIO: f64 = 0.7;

async fn memory_connection() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    // every pooled connection would get its own empty database
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(options).await.unwrap()
}

async fn exec(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
        .await
        .unwrap_or_else(|e| panic!("fixture statement failed: {e}\n{sql}"));
}

async fn create_schema(db: &DatabaseConnection, with_rating: bool) {
    let rating_column = if with_rating {
        ", customer_rating REAL"
    } else {
        ""
    };

    exec(db, "CREATE TABLE dim_product (product_key INTEGER PRIMARY KEY, name TEXT NOT NULL, category TEXT NOT NULL)").await;
    exec(db, "CREATE TABLE dim_channel (channel_key INTEGER PRIMARY KEY, channel TEXT NOT NULL)").await;
    exec(db, "CREATE TABLE dim_date (date_key INTEGER PRIMARY KEY, date TEXT NOT NULL)").await;
    exec(db, "CREATE TABLE dim_region (region_key INTEGER PRIMARY KEY, city TEXT)").await;
    exec(db, "CREATE TABLE dim_customer (customer_key INTEGER PRIMARY KEY, region_key INTEGER NOT NULL)").await;
    exec(
        db,
        &format!(
            "CREATE TABLE fact_sales (\
             sale_key INTEGER PRIMARY KEY, product_key INTEGER NOT NULL, channel_key INTEGER NOT NULL, \
             date_key INTEGER NOT NULL, customer_key INTEGER NOT NULL, quantity INTEGER NOT NULL, \
             unit_price REAL NOT NULL, revenue REAL NOT NULL, cost REAL NOT NULL, margin REAL NOT NULL{})",
            rating_column
        ),
    )
    .await;
}

async fn seed(db: &DatabaseConnection, with_rating: bool, date_suffix: &str) {
    exec(db, "INSERT INTO dim_product VALUES (1, 'Panel Solar', 'Paneles'), (2, 'Inversor', 'Electrónica'), (3, 'Batería', 'Almacenamiento')").await;
    exec(db, "INSERT INTO dim_channel VALUES (1, 'Online'), (2, 'Tienda'), (3, 'Distribuidor')").await;
    exec(db, "INSERT INTO dim_region VALUES (1, 'Bogotá'), (2, 'Medellín'), (3, 'Cali')").await;
    exec(db, "INSERT INTO dim_customer VALUES (1, 1), (2, 2), (3, 3)").await;

    for day in 1..=31u32 {
        exec(
            db,
            &format!(
                "INSERT INTO dim_date VALUES ({}, '{}{}')",
                day,
                date(2024, 1, day).format("%Y-%m-%d"),
                date_suffix
            ),
        )
        .await;
    }

    for (product, channel, day, customer, quantity, price, rating) in FACTS {
        let revenue = *quantity as f64 * price;
        let cost = revenue * COST_RATIO;
        let rating_value = match (with_rating, rating) {
            (true, Some(r)) => format!(", {}", r),
            (true, None) => ", NULL".to_string(),
            (false, _) => String::new(),
        };
        let rating_column = if with_rating { ", customer_rating" } else { "" };
        exec(
            db,
            &format!(
                "INSERT INTO fact_sales (product_key, channel_key, date_key, customer_key, quantity, \
                 unit_price, revenue, cost, margin{}) VALUES ({}, {}, {}, {}, {}, {}, {}, {}, {}{})",
                rating_column,
                product,
                channel,
                day,
                customer,
                quantity,
                price,
                revenue,
                cost,
                revenue - cost,
                rating_value
            ),
        )
        .await;
    }
}

/// Warehouse with three products, channels and cities over January 2024
pub async fn seeded_warehouse(with_rating: bool) -> SqlWarehouse {
    let db = memory_connection().await;
    create_schema(&db, with_rating).await;
    seed(&db, with_rating, "").await;
    SqlWarehouse::new(db)
}

/// Same data with `dim_date.date` stored as `YYYY-MM-DD 00:00:00`
pub async fn timestamped_warehouse() -> SqlWarehouse {
    let db = memory_connection().await;
    create_schema(&db, false).await;
    seed(&db, false, " 00:00:00").await;
    SqlWarehouse::new(db)
}

/// Schema without any rows
pub async fn empty_warehouse() -> SqlWarehouse {
    let db = memory_connection().await;
    create_schema(&db, false).await;
    SqlWarehouse::new(db)
}

/// Total units of the fixture
pub fn fixture_units() -> i64 {
    FACTS.iter().map(|f| f.4).sum()
}
