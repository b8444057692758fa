use contracts::dashboards::d400_sales_overview::{
    AppliedFilter, CategoryTotal, ChannelRevenue, ChannelShare, ChartData, ChartSpec, CityUnits,
    Coloring, DailyTotal, DashboardView, FilterOptions, Metric, Orientation, Palette, PieSlice,
    ProductRating, ProductTotal, ProductUnits, RawTable, SalesSummary, ScatterPoint, ValueFormat,
};

use super::aggregation::ResultFrame;
use crate::shared::format::{format_currency, format_number};

pub const TITLE: &str = "Real-Time Sales Dashboard";
pub const SUBTITLE: &str = "Sales and margins by category, channel and product";
pub const EMPTY_RESULT_WARNING: &str = "No data for the selected filters.";
pub const NO_DATES_WARNING: &str = "The warehouse has no sales dates yet.";

/// Receiver of the rendered dashboard parts, in display order
pub trait DashboardSink {
    fn metrics(&mut self, metrics: Vec<Metric>);
    fn warning(&mut self, message: &str);
    fn chart(&mut self, chart: ChartSpec);
    fn raw_data(&mut self, table: RawTable);
}

/// Emit the whole dashboard for one result frame.
///
/// An empty frame produces only the warning.
pub fn render(frame: &ResultFrame, top_products: &[ProductUnits], sink: &mut dyn DashboardSink) {
    if frame.is_empty() {
        sink.warning(EMPTY_RESULT_WARNING);
        return;
    }

    sink.metrics(summary_metrics(&frame.summary()));

    sink.chart(top_products_chart(top_products));
    sink.chart(category_chart(&frame.category_totals()));
    sink.chart(margin_volume_chart(&frame.product_totals()));
    sink.chart(channel_revenue_chart(&frame.channel_revenue()));
    if let Some(ratings) = frame.rating_by_product() {
        sink.chart(rating_chart(&ratings));
    }
    sink.chart(revenue_trend_chart(&frame.daily_totals()));
    if frame.has_city_data() {
        sink.chart(city_chart(&frame.city_ranking()));
    }
    sink.chart(channel_share_chart(&frame.channel_share()));

    sink.raw_data(frame.raw_table());
}

pub fn summary_metrics(summary: &SalesSummary) -> Vec<Metric> {
    vec![
        Metric {
            id: "units".into(),
            label: "Units Sold".into(),
            value: summary.total_units as f64,
            display: format_number(summary.total_units),
        },
        Metric {
            id: "revenue".into(),
            label: "Total Revenue".into(),
            value: summary.total_revenue,
            display: format_currency(summary.total_revenue),
        },
        Metric {
            id: "margin".into(),
            label: "Total Margin".into(),
            value: summary.total_margin,
            display: format_currency(summary.total_margin),
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn spec(
    id: &str,
    heading: &str,
    title: &str,
    x_label: &str,
    y_label: &str,
    palette: Palette,
    value_format: ValueFormat,
    data: ChartData,
) -> ChartSpec {
    ChartSpec {
        id: id.to_string(),
        heading: heading.to_string(),
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        palette,
        value_format,
        data,
    }
}

pub fn top_products_chart(rows: &[ProductUnits]) -> ChartSpec {
    spec(
        "top-products",
        "Top 10 Best-Selling Products",
        "Top 10 Products by Units Sold",
        "Units Sold",
        "Product",
        Palette::Blues,
        ValueFormat::Integer,
        ChartData::Bar {
            categories: rows.iter().map(|r| r.product.clone()).collect(),
            values: rows.iter().map(|r| r.total_units as f64).collect(),
            orientation: Orientation::Horizontal,
            coloring: Coloring::ByValue,
        },
    )
}

pub fn category_chart(rows: &[CategoryTotal]) -> ChartSpec {
    spec(
        "units-by-category",
        "Sales by Category",
        "Units Sold by Category",
        "Category",
        "Units",
        Palette::Pastel,
        ValueFormat::Integer,
        ChartData::Bar {
            categories: rows.iter().map(|r| r.category.clone()).collect(),
            values: rows.iter().map(|r| r.units as f64).collect(),
            orientation: Orientation::Vertical,
            coloring: Coloring::ByCategory,
        },
    )
}

pub fn margin_volume_chart(rows: &[ProductTotal]) -> ChartSpec {
    spec(
        "margin-vs-volume",
        "Margin vs Sales Volume (Products)",
        "Turnover vs Margin by Product",
        "Units Sold",
        "Margin",
        Palette::Teal,
        ValueFormat::Currency,
        ChartData::Scatter {
            points: rows
                .iter()
                .map(|r| ScatterPoint {
                    label: r.product.clone(),
                    x: r.units as f64,
                    y: r.margin,
                    size: r.units as f64,
                })
                .collect(),
        },
    )
}

pub fn channel_revenue_chart(rows: &[ChannelRevenue]) -> ChartSpec {
    spec(
        "revenue-by-channel",
        "Sales Comparison by Channel",
        "Total Sales by Channel",
        "Channel",
        "Total Revenue",
        Palette::Set2,
        ValueFormat::Currency,
        ChartData::Bar {
            categories: rows.iter().map(|r| r.channel.clone()).collect(),
            values: rows.iter().map(|r| r.revenue).collect(),
            orientation: Orientation::Vertical,
            coloring: Coloring::ByCategory,
        },
    )
}

pub fn rating_chart(rows: &[ProductRating]) -> ChartSpec {
    spec(
        "rating-by-product",
        "Customer Satisfaction by Product",
        "Average Rating by Product",
        "Product",
        "Rating",
        Palette::Oranges,
        ValueFormat::Decimal2,
        ChartData::Bar {
            categories: rows.iter().map(|r| r.product.clone()).collect(),
            values: rows.iter().map(|r| r.mean_rating).collect(),
            orientation: Orientation::Vertical,
            coloring: Coloring::ByValue,
        },
    )
}

pub fn revenue_trend_chart(rows: &[DailyTotal]) -> ChartSpec {
    spec(
        "revenue-trend",
        "Sales Trend Over Time",
        "Total Revenue by Date",
        "Date",
        "Revenue",
        Palette::Blues,
        ValueFormat::Currency,
        ChartData::Line {
            labels: rows
                .iter()
                .map(|r| r.date.format("%Y-%m-%d").to_string())
                .collect(),
            values: rows.iter().map(|r| r.revenue).collect(),
            markers: true,
        },
    )
}

pub fn city_chart(rows: &[CityUnits]) -> ChartSpec {
    spec(
        "top-cities",
        "Sales by City",
        "Top 10 Cities by Units Sold",
        "Units Sold",
        "City",
        Palette::Greens,
        ValueFormat::Integer,
        ChartData::Bar {
            categories: rows.iter().map(|r| r.city.clone()).collect(),
            values: rows.iter().map(|r| r.units as f64).collect(),
            orientation: Orientation::Horizontal,
            coloring: Coloring::ByValue,
        },
    )
}

pub fn channel_share_chart(rows: &[ChannelShare]) -> ChartSpec {
    spec(
        "channel-share",
        "Sales Channel Share",
        "Share of Units Sold by Channel",
        "",
        "",
        Palette::Set3,
        ValueFormat::Integer,
        ChartData::Pie {
            slices: rows
                .iter()
                .map(|r| PieSlice {
                    label: r.channel.clone(),
                    value: r.units as f64,
                    percent: r.percent,
                })
                .collect(),
        },
    )
}

/// Sink that assembles the JSON [`DashboardView`]
pub struct ViewCollector {
    view: DashboardView,
}

impl ViewCollector {
    pub fn new(options: FilterOptions) -> Self {
        Self {
            view: DashboardView {
                title: TITLE.to_string(),
                subtitle: SUBTITLE.to_string(),
                options,
                applied: None,
                warning: None,
                metrics: Vec::new(),
                charts: Vec::new(),
                raw_data: None,
            },
        }
    }

    pub fn applied(mut self, applied: AppliedFilter) -> Self {
        self.view.applied = Some(applied);
        self
    }

    pub fn finish(self) -> DashboardView {
        self.view
    }
}

impl DashboardSink for ViewCollector {
    fn metrics(&mut self, metrics: Vec<Metric>) {
        self.view.metrics = metrics;
    }

    fn warning(&mut self, message: &str) {
        self.view.warning = Some(message.to_string());
    }

    fn chart(&mut self, chart: ChartSpec) {
        self.view.charts.push(chart);
    }

    fn raw_data(&mut self, table: RawTable) {
        self.view.raw_data = Some(table);
    }
}
