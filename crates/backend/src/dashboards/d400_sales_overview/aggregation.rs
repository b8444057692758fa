use chrono::NaiveDate;
use contracts::dashboards::d400_sales_overview::{
    CategoryTotal, ChannelRevenue, ChannelShare, CityUnits, DailyTotal, ProductRating,
    ProductTotal, RawTable, SalesFactRow, SalesSummary,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Rows kept in the city ranking
pub const CITY_RANKING_LIMIT: usize = 10;

/// Filtered fact rows of one pipeline run.
///
/// Every chart except the top-products one is computed from the same frame.
/// Grouped tables come out in key order unless stated otherwise.
#[derive(Debug, Clone, Default)]
pub struct ResultFrame {
    rows: Vec<SalesFactRow>,
    has_rating: bool,
}

impl ResultFrame {
    pub fn new(rows: Vec<SalesFactRow>, has_rating: bool) -> Self {
        Self { rows, has_rating }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row carries a city
    pub fn has_city_data(&self) -> bool {
        self.rows
            .iter()
            .any(|r| r.city.as_deref().is_some_and(|c| !c.is_empty()))
    }

    pub fn summary(&self) -> SalesSummary {
        self.rows.iter().fold(SalesSummary::default(), |mut acc, r| {
            acc.total_units += r.quantity;
            acc.total_revenue += r.revenue;
            acc.total_margin += r.margin;
            acc
        })
    }

    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        let mut groups: BTreeMap<&str, (i64, f64, f64)> = BTreeMap::new();
        for r in &self.rows {
            let entry = groups.entry(r.category.as_str()).or_default();
            entry.0 += r.quantity;
            entry.1 += r.revenue;
            entry.2 += r.margin;
        }

        groups
            .into_iter()
            .map(|(category, (units, revenue, margin))| CategoryTotal {
                category: category.to_string(),
                units,
                revenue,
                margin,
            })
            .collect()
    }

    pub fn product_totals(&self) -> Vec<ProductTotal> {
        let mut groups: BTreeMap<&str, (i64, f64)> = BTreeMap::new();
        for r in &self.rows {
            let entry = groups.entry(r.product.as_str()).or_default();
            entry.0 += r.quantity;
            entry.1 += r.margin;
        }

        groups
            .into_iter()
            .map(|(product, (units, margin))| ProductTotal {
                product: product.to_string(),
                units,
                margin,
            })
            .collect()
    }

    /// Revenue per channel, highest first
    pub fn channel_revenue(&self) -> Vec<ChannelRevenue> {
        let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
        for r in &self.rows {
            *groups.entry(r.channel.as_str()).or_default() += r.revenue;
        }

        let mut out: Vec<ChannelRevenue> = groups
            .into_iter()
            .map(|(channel, revenue)| ChannelRevenue {
                channel: channel.to_string(),
                revenue,
            })
            .collect();
        // stable sort keeps name order among equal revenues
        out.sort_by(|a, b| desc_f64(a.revenue, b.revenue));
        out
    }

    pub fn daily_totals(&self) -> Vec<DailyTotal> {
        let mut groups: BTreeMap<NaiveDate, (i64, f64)> = BTreeMap::new();
        for r in &self.rows {
            let entry = groups.entry(r.date).or_default();
            entry.0 += r.quantity;
            entry.1 += r.revenue;
        }

        groups
            .into_iter()
            .map(|(date, (units, revenue))| DailyTotal {
                date,
                units,
                revenue,
            })
            .collect()
    }

    /// Units per city, highest first, at most [`CITY_RANKING_LIMIT`] rows
    pub fn city_ranking(&self) -> Vec<CityUnits> {
        let mut groups: BTreeMap<&str, i64> = BTreeMap::new();
        for r in &self.rows {
            if let Some(city) = r.city.as_deref().filter(|c| !c.is_empty()) {
                *groups.entry(city).or_default() += r.quantity;
            }
        }

        let mut out: Vec<CityUnits> = groups
            .into_iter()
            .map(|(city, units)| CityUnits {
                city: city.to_string(),
                units,
            })
            .collect();
        out.sort_by(|a, b| b.units.cmp(&a.units));
        out.truncate(CITY_RANKING_LIMIT);
        out
    }

    /// Unit share per channel. Percentages are 0 when no units were sold.
    pub fn channel_share(&self) -> Vec<ChannelShare> {
        let mut groups: BTreeMap<&str, i64> = BTreeMap::new();
        for r in &self.rows {
            *groups.entry(r.channel.as_str()).or_default() += r.quantity;
        }

        let total: i64 = groups.values().sum();
        groups
            .into_iter()
            .map(|(channel, units)| ChannelShare {
                channel: channel.to_string(),
                units,
                percent: if total == 0 {
                    0.0
                } else {
                    units as f64 * 100.0 / total as f64
                },
            })
            .collect()
    }

    /// Mean rating per product; `None` when the frame has no rating column.
    /// Products without any rated row are left out.
    pub fn rating_by_product(&self) -> Option<Vec<ProductRating>> {
        if !self.has_rating {
            return None;
        }

        let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for r in &self.rows {
            if let Some(rating) = r.customer_rating {
                let entry = groups.entry(r.product.as_str()).or_default();
                entry.0 += rating;
                entry.1 += 1;
            }
        }

        Some(
            groups
                .into_iter()
                .map(|(product, (sum, count))| ProductRating {
                    product: product.to_string(),
                    mean_rating: sum / count as f64,
                    rated_rows: count,
                })
                .collect(),
        )
    }

    /// Unformatted cell values for the raw-data table and the CSV export
    pub fn raw_table(&self) -> RawTable {
        let mut columns: Vec<String> = [
            "quantity",
            "unit_price",
            "revenue",
            "cost",
            "margin",
            "category",
            "product",
            "channel",
            "date",
            "city",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect();
        if self.has_rating {
            columns.push("customer_rating".to_string());
        }

        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut cells = vec![
                    r.quantity.to_string(),
                    r.unit_price.to_string(),
                    r.revenue.to_string(),
                    r.cost.to_string(),
                    r.margin.to_string(),
                    r.category.clone(),
                    r.product.clone(),
                    r.channel.clone(),
                    r.date.format("%Y-%m-%d").to_string(),
                    r.city.clone().unwrap_or_default(),
                ];
                if self.has_rating {
                    cells.push(r.customer_rating.map(|v| v.to_string()).unwrap_or_default());
                }
                cells
            })
            .collect();

        RawTable { columns, rows }
    }
}

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn row(category: &str, product: &str, channel: &str, quantity: i64, margin: f64) -> SalesFactRow {
        SalesFactRow {
            quantity,
            unit_price: 10.0,
            revenue: quantity as f64 * 10.0,
            cost: quantity as f64 * 10.0 - margin,
            margin,
            category: category.to_string(),
            product: product.to_string(),
            channel: channel.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            city: Some("Cali".to_string()),
            customer_rating: None,
        }
    }

    #[test]
    fn test_category_example_scenario() {
        let frame = ResultFrame::new(
            vec![
                row("A", "p1", "Online", 3, 10.0),
                row("A", "p2", "Online", 2, 5.0),
                row("B", "p3", "Online", 1, 2.0),
            ],
            false,
        );

        let categories = frame.category_totals();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].category, "A");
        assert_eq!(categories[0].units, 5);
        assert_eq!(categories[0].margin, 15.0);
        assert_eq!(categories[1].category, "B");
        assert_eq!(categories[1].units, 1);
        assert_eq!(categories[1].margin, 2.0);
        assert_eq!(frame.summary().total_units, 6);
    }

    #[test]
    fn test_category_units_reconcile_with_summary() {
        let frame = ResultFrame::new(
            (0..40)
                .map(|i| row(&format!("cat{}", i % 7), &format!("p{}", i % 13), "Online", i, 1.5))
                .collect(),
            false,
        );

        let by_category: i64 = frame.category_totals().iter().map(|c| c.units).sum();
        assert_eq!(by_category, frame.summary().total_units);
        let by_product: i64 = frame.product_totals().iter().map(|p| p.units).sum();
        assert_eq!(by_product, frame.summary().total_units);
    }

    #[test]
    fn test_channel_revenue_sorted_descending() {
        let frame = ResultFrame::new(
            vec![
                row("A", "p1", "Online", 1, 0.0),
                row("A", "p1", "Tienda", 5, 0.0),
                row("A", "p1", "Distribuidor", 3, 0.0),
                row("A", "p1", "Online", 1, 0.0),
            ],
            false,
        );

        let channels: Vec<_> = frame
            .channel_revenue()
            .into_iter()
            .map(|c| (c.channel, c.revenue))
            .collect();
        assert_eq!(
            channels,
            vec![
                ("Tienda".to_string(), 50.0),
                ("Distribuidor".to_string(), 30.0),
                ("Online".to_string(), 20.0)
            ]
        );
    }

    #[test]
    fn test_city_ranking_top_ten_descending() {
        let rows = (1..=14)
            .map(|i| {
                let mut r = row("A", "p1", "Online", i, 0.0);
                r.city = Some(format!("City {:02}", i));
                r
            })
            .collect();
        let ranking = ResultFrame::new(rows, false).city_ranking();

        assert_eq!(ranking.len(), CITY_RANKING_LIMIT);
        assert!(ranking.windows(2).all(|w| w[0].units >= w[1].units));
        assert_eq!(ranking[0].city, "City 14");
        assert_eq!(ranking[9].units, 5);
    }

    #[test]
    fn test_city_ranking_skips_rows_without_city() {
        let mut anonymous = row("A", "p1", "Online", 9, 0.0);
        anonymous.city = None;
        let frame = ResultFrame::new(vec![anonymous.clone()], false);
        assert!(!frame.has_city_data());
        assert!(frame.city_ranking().is_empty());

        let frame = ResultFrame::new(vec![anonymous, row("A", "p1", "Online", 1, 0.0)], false);
        assert!(frame.has_city_data());
        assert_eq!(frame.city_ranking().len(), 1);
    }

    #[test]
    fn test_channel_share_sums_to_hundred() {
        let frame = ResultFrame::new(
            vec![
                row("A", "p1", "Online", 1, 0.0),
                row("A", "p1", "Tienda", 1, 0.0),
                row("A", "p1", "Distribuidor", 1, 0.0),
            ],
            false,
        );

        let total: f64 = frame.channel_share().iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_channel_share_without_units_is_zero() {
        let frame = ResultFrame::new(vec![row("A", "p1", "Online", 0, 0.0)], false);
        assert_eq!(frame.channel_share()[0].percent, 0.0);
    }

    #[test]
    fn test_daily_totals_in_date_order() {
        let mut late = row("A", "p1", "Online", 2, 0.0);
        late.date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let frame = ResultFrame::new(
            vec![late, row("A", "p1", "Online", 1, 0.0), row("A", "p2", "Online", 3, 0.0)],
            false,
        );

        let days = frame.daily_totals();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].units, 4);
        assert_eq!(days[0].revenue, 40.0);
        assert_eq!(days[1].units, 2);
    }

    #[test]
    fn test_rating_only_with_column() {
        let mut rated = row("A", "p1", "Online", 1, 0.0);
        rated.customer_rating = Some(4.0);
        let mut rated_again = rated.clone();
        rated_again.customer_rating = Some(5.0);
        let unrated = row("A", "p2", "Online", 1, 0.0);

        let rows = vec![rated, rated_again, unrated];
        assert!(ResultFrame::new(rows.clone(), false).rating_by_product().is_none());

        let ratings = ResultFrame::new(rows, true).rating_by_product().unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].product, "p1");
        assert_eq!(ratings[0].mean_rating, 4.5);
        assert_eq!(ratings[0].rated_rows, 2);
    }

    #[test]
    fn test_raw_table_columns_follow_rating_presence() {
        let rows = vec![row("A", "p1", "Online", 1, 0.0)];
        let plain = ResultFrame::new(rows.clone(), false).raw_table();
        let rated = ResultFrame::new(rows, true).raw_table();

        assert_eq!(plain.columns.len(), 10);
        assert_eq!(rated.columns.last().map(String::as_str), Some("customer_rating"));
        assert_eq!(rated.rows[0].len(), 11);
        assert_eq!(plain.rows[0][8], "2024-01-01");
    }
}
