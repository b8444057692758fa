use contracts::dashboards::d400_sales_overview::{
    AppliedFilter, ChartSpec, DashboardView, FilterOptions, Metric, RawTable,
};
use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::echarts;

const ECHARTS_SRC: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f4f6f8; color: #2c3e50; }
.layout { display: flex; min-height: 100vh; }
aside { width: 280px; padding: 1.5rem; background: #fff; border-right: 1px solid #dde3e8; }
aside label { display: block; margin-top: 1rem; font-weight: 600; }
aside input, aside select { width: 100%; margin-top: .3rem; }
aside select { min-height: 7rem; }
main { flex: 1; padding: 1.5rem 2rem; }
.warning { padding: 1rem; background: #fff3cd; border: 1px solid #ffe69c; border-radius: 6px; }
.metrics { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; }
.metric { background: #fff; border-radius: 6px; padding: 1rem; }
.metric .value { font-size: 2rem; font-weight: 700; }
.chart { min-height: 420px; background: #f9f9f9; border-radius: 6px; }
table { border-collapse: collapse; font-size: .85rem; }
th, td { border: 1px solid #dde3e8; padding: .25rem .5rem; text-align: left; }
"#;

/// Full dashboard page; `query` is the current filter as a query string
pub fn dashboard_page(view: &DashboardView, query: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (view.title) }
                style { (PreEscaped(STYLE)) }
                @if !view.charts.is_empty() {
                    script src=(ECHARTS_SRC) {}
                }
            }
            body {
                div class="layout" {
                    (sidebar(&view.options, view.applied.as_ref()))
                    main {
                        h1 { (view.title) }
                        p { strong { (view.subtitle) } }
                        @if let Some(warning) = &view.warning {
                            div class="warning" role="alert" { (warning) }
                        }
                        @if !view.metrics.is_empty() {
                            (metric_cards(&view.metrics))
                            hr;
                        }
                        @for chart in &view.charts {
                            (chart_section(chart))
                        }
                        @if let Some(table) = &view.raw_data {
                            (raw_data(table, query))
                        }
                    }
                }
            }
        }
    }
}

/// Short page for failed requests
pub fn error_page(title: &str, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                main {
                    h1 { (title) }
                    div class="warning" role="alert" { (message) }
                    p { a href="/" { "Back to the dashboard" } }
                }
            }
        }
    }
}

fn sidebar(options: &FilterOptions, applied: Option<&AppliedFilter>) -> Markup {
    let enabled = options.filters_enabled();
    let min = options.date_bounds.map(|b| b.min.to_string());
    let max = options.date_bounds.map(|b| b.max.to_string());
    let from = applied.map(|a| a.date_from.to_string());
    let to = applied.map(|a| a.date_to.to_string());
    let empty: &[String] = &[];

    html! {
        aside {
            h2 { "Global Filters" }
            form method="get" action="/" onchange="this.submit()" {
                label for="date_from" { "Sales date from" }
                input type="date" id="date_from" name="date_from"
                    value=[from] min=[min.as_ref()] max=[max.as_ref()] disabled[!enabled];
                label for="date_to" { "Sales date to" }
                input type="date" id="date_to" name="date_to"
                    value=[to] min=[min] max=[max] disabled[!enabled];

                (multi_select("product", "Product", &options.products,
                    applied.map(|a| a.products.as_slice()).unwrap_or(empty), enabled))
                (multi_select("channel", "Sales channel", &options.channels,
                    applied.map(|a| a.channels.as_slice()).unwrap_or(empty), enabled))
                (multi_select("city", "City", &options.cities,
                    applied.map(|a| a.cities.as_slice()).unwrap_or(empty), enabled))

                noscript { button type="submit" { "Apply" } }
                p { a href="/" { "Reset filters" } }
            }
        }
    }
}

/// Nothing selected means no filter on that dimension.
///
/// Submitted as `name[]=..` once per selected option.
fn multi_select(
    name: &str,
    label: &str,
    values: &[String],
    selected: &[String],
    enabled: bool,
) -> Markup {
    html! {
        label for=(name) { (label) }
        select id=(name) name=(format!("{}[]", name)) multiple disabled[!enabled] {
            @for value in values {
                option value=(value) selected[selected.contains(value)] { (value) }
            }
        }
    }
}

fn metric_cards(metrics: &[Metric]) -> Markup {
    html! {
        section class="metrics" {
            @for metric in metrics {
                div class="metric" id=(format!("metric-{}", metric.id)) {
                    div class="label" { (metric.label) }
                    div class="value" { (metric.display) }
                }
            }
        }
    }
}

fn chart_section(chart: &ChartSpec) -> Markup {
    html! {
        section {
            h2 { (chart.heading) }
            div class="chart" id=(chart.id) {}
            script { (PreEscaped(init_script(chart))) }
        }
    }
}

/// Inline script that draws one chart
pub fn init_script(chart: &ChartSpec) -> String {
    let option = echarts::options(chart).to_string();
    format!(
        "(function() {{ const chart = echarts.init(document.getElementById(\"{}\")); \
         chart.setOption({}); window.addEventListener('resize', chart.resize); }})();",
        chart.id,
        escape_script(&option)
    )
}

/// Keep JSON from closing the surrounding script element
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn raw_data(table: &RawTable, query: &str) -> Markup {
    html! {
        details {
            summary { "Show raw data (" (table.rows.len()) " rows)" }
            p {
                a href=(format!("/api/d400/raw.csv?{}", query)) { "Download CSV" }
                " · "
                a href=(format!("/api/d400/sql?{}", query)) { "Generated SQL" }
            }
            table {
                thead {
                    tr {
                        @for column in &table.columns {
                            th { (column) }
                        }
                    }
                }
                tbody {
                    @for row in &table.rows {
                        tr {
                            @for cell in row {
                                td { (cell) }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::dashboards::d400_sales_overview::{
        ChartData, Coloring, DateBounds, Orientation, Palette, ValueFormat,
    };

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn view() -> DashboardView {
        DashboardView {
            title: "Sales".into(),
            subtitle: "Overview".into(),
            options: FilterOptions {
                date_bounds: Some(DateBounds::new(date(1), date(31))),
                products: vec!["Inversor".into(), "Panel Solar".into()],
                channels: vec!["Online".into()],
                cities: vec![],
                has_rating: false,
            },
            applied: Some(AppliedFilter {
                date_from: date(2),
                date_to: date(30),
                products: vec!["Inversor".into()],
                channels: vec![],
                cities: vec![],
            }),
            warning: None,
            metrics: vec![Metric {
                id: "units".into(),
                label: "Units Sold".into(),
                value: 1234.0,
                display: "1,234".into(),
            }],
            charts: vec![ChartSpec {
                id: "top-products".into(),
                heading: "Top".into(),
                title: "</script><b>".into(),
                x_label: "Units".into(),
                y_label: "Product".into(),
                palette: Palette::Blues,
                value_format: ValueFormat::Integer,
                data: ChartData::Bar {
                    categories: vec!["Inversor".into()],
                    values: vec![3.0],
                    orientation: Orientation::Horizontal,
                    coloring: Coloring::ByValue,
                },
            }],
            raw_data: Some(RawTable {
                columns: vec!["quantity".into()],
                rows: vec![vec!["3".into()]],
            }),
        }
    }

    #[test]
    fn test_page_renders_filters_and_charts() {
        let html = dashboard_page(&view(), "date_from=2024-01-02").into_string();

        assert!(html.contains(r#"min="2024-01-01""#));
        assert!(html.contains(r#"value="2024-01-02""#));
        assert!(html.contains(r#"<option value="Inversor" selected>"#));
        assert!(html.contains(r#"<option value="Panel Solar">"#));
        assert!(html.contains(r#"name="product[]""#));
        assert!(html.contains("1,234"));
        assert!(html.contains(r#"id="top-products""#));
        assert!(html.contains("/api/d400/raw.csv?date_from=2024-01-02"));
        assert!(!html.contains("</script><b>"));
    }

    #[test]
    fn test_warning_page_has_no_chart_script() {
        let mut view = view();
        view.warning = Some("No data for the selected filters.".into());
        view.metrics.clear();
        view.charts.clear();
        view.raw_data = None;

        let html = dashboard_page(&view, "").into_string();
        assert!(html.contains("No data for the selected filters."));
        assert!(!html.contains("echarts"));
        assert!(!html.contains("<details>"));
    }

    #[test]
    fn test_disabled_filters_without_dates() {
        let mut view = view();
        view.options.date_bounds = None;
        view.applied = None;

        let html = dashboard_page(&view, "").into_string();
        assert!(html.contains("disabled"));
    }
}
