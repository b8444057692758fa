//! ECharts configuration for [`ChartSpec`]s.
//!
//! Each chart spec becomes a `charming` chart; the page script only calls
//! `chart.setOption(option)` with its serialized form. Value labels are
//! formatted in the browser with `Intl.NumberFormat`.

use charming::{
    component::{Axis, Grid, Title, VisualMap, VisualMapPiece},
    datatype::{DataPoint, DataPointItem},
    element::{
        AxisPointer, AxisPointerType, AxisType, Color, ItemStyle, JsFunction, Label,
        LabelPosition, Symbol, Tooltip, Trigger,
    },
    series::{Bar, Line, Pie, Scatter},
    Chart,
};
use contracts::dashboards::d400_sales_overview::{
    ChartData, ChartSpec, Coloring, Orientation, Palette, PieSlice, ScatterPoint, ValueFormat,
};

const BACKGROUND: &str = "#F9F9F9";

const MIN_BUBBLE: f64 = 10.0;
const MAX_BUBBLE: f64 = 50.0;

/// Colors of a palette. Sequential palettes run from light to dark.
pub fn colors(palette: Palette) -> &'static [&'static str] {
    match palette {
        Palette::Blues => &["#deebf7", "#9ecae1", "#6baed6", "#3182bd", "#08519c"],
        Palette::Teal => &["#d1eeea", "#a8dbd9", "#85c4c9", "#4f90a6", "#2a5674"],
        Palette::Oranges => &["#fee6ce", "#fdae6b", "#fd8d3c", "#e6550d", "#a63603"],
        Palette::Greens => &["#e5f5e0", "#a1d99b", "#74c476", "#31a354", "#006d2c"],
        Palette::Pastel => &[
            "#66C5CC", "#F6CF71", "#F89C74", "#DCB0F2", "#87C55F", "#9EB9F3", "#FE88B1",
            "#C9DB74", "#8BE0A4", "#B497E7",
        ],
        Palette::Set2 => &[
            "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494",
            "#b3b3b3",
        ],
        Palette::Set3 => &[
            "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69",
            "#fccde5", "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
        ],
    }
}

/// Discrete color for the `index`-th category
pub fn cycle(palette: Palette, index: usize) -> &'static str {
    let stops = colors(palette);
    stops[index % stops.len()]
}

fn palette_colors(palette: Palette) -> Vec<Color> {
    colors(palette).iter().map(|c| Color::from(*c)).collect()
}

/// `Intl.NumberFormat` options for a value format
fn number_format(format: ValueFormat) -> &'static str {
    match format {
        ValueFormat::Integer => "{ maximumFractionDigits: 0 }",
        ValueFormat::Currency => {
            "{ style: 'currency', currency: 'USD', minimumFractionDigits: 0, maximumFractionDigits: 0 }"
        }
        ValueFormat::Decimal2 => "{ minimumFractionDigits: 2, maximumFractionDigits: 2 }",
    }
}

/// Formatter for plain numbers (tooltips)
fn value_formatter(format: ValueFormat) -> JsFunction {
    JsFunction::new_with_args(
        "value",
        &format!(
            "return new Intl.NumberFormat('en-US', {}).format(value);",
            number_format(format)
        ),
    )
}

/// Formatter for series labels, which receive the data item
fn label_formatter(format: ValueFormat) -> JsFunction {
    JsFunction::new_with_args(
        "params",
        &format!(
            "return new Intl.NumberFormat('en-US', {}).format(params.value);",
            number_format(format)
        ),
    )
}

/// Position of `value` within `[min, max]`; 1 when the range is empty
fn normalized(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        1.0
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Piecewise visual map splitting `[min, max]` into one band per palette stop
fn value_bands(palette: Palette, values: &[f64]) -> VisualMap {
    let stops = colors(palette);
    let (min, max) = min_max(values.iter().copied());

    let pieces: Vec<VisualMapPiece> = if !min.is_finite() {
        Vec::new()
    } else if max > min {
        let width = (max - min) / stops.len() as f64;
        stops
            .iter()
            .enumerate()
            .map(|(i, color)| {
                let upper = if i + 1 == stops.len() {
                    max
                } else {
                    min + width * (i + 1) as f64
                };
                VisualMapPiece::new()
                    .gte(min + width * i as f64)
                    .lte(upper)
                    .color(*color)
            })
            .collect()
    } else {
        // all bars equal: darkest stop
        vec![VisualMapPiece::new().gte(min).color(stops[stops.len() - 1])]
    };

    VisualMap::new().show(false).pieces(pieces)
}

/// `charming` chart for one [`ChartSpec`]
pub fn options(spec: &ChartSpec) -> Chart {
    let chart = Chart::new()
        .background_color(BACKGROUND)
        .title(Title::new().text(spec.title.as_str()).left("center"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(70)
                .contain_label(true),
        );

    match &spec.data {
        ChartData::Bar {
            categories,
            values,
            orientation,
            coloring,
        } => bar(chart, spec, categories, values, *orientation, *coloring),
        ChartData::Scatter { points } => scatter(chart, spec, points),
        ChartData::Line {
            labels,
            values,
            markers,
        } => line(chart, spec, labels, values, *markers),
        ChartData::Pie { slices } => pie(chart, spec, slices),
    }
}

fn bar(
    chart: Chart,
    spec: &ChartSpec,
    categories: &[String],
    values: &[f64],
    orientation: Orientation,
    coloring: Coloring,
) -> Chart {
    let category_axis = Axis::new()
        .type_(AxisType::Category)
        .data(categories.to_vec());

    let (x_axis, y_axis, label_position) = match orientation {
        // first row at the top
        Orientation::Horizontal => (
            Axis::new()
                .type_(AxisType::Value)
                .name(spec.x_label.as_str()),
            category_axis.name(spec.y_label.as_str()).inverse(true),
            LabelPosition::Right,
        ),
        Orientation::Vertical => (
            category_axis.name(spec.x_label.as_str()),
            Axis::new()
                .type_(AxisType::Value)
                .name(spec.y_label.as_str()),
            LabelPosition::Top,
        ),
    };

    let series = Bar::new().name(spec.title.as_str()).label(
        Label::new()
            .show(true)
            .position(label_position)
            .formatter(label_formatter(spec.value_format)),
    );

    let chart = chart
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(value_formatter(spec.value_format))
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    match coloring {
        Coloring::ByValue => chart
            .visual_map(value_bands(spec.palette, values))
            .series(series.data(values.to_vec())),
        Coloring::ByCategory => {
            let data: Vec<DataPoint> = values
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    DataPointItem::new(*value)
                        .item_style(ItemStyle::new().color(cycle(spec.palette, i)))
                        .into()
                })
                .collect();
            chart.series(series.data(data))
        }
    }
}

/// One series per point so every bubble carries its own size and legend name
fn scatter(chart: Chart, spec: &ChartSpec, points: &[ScatterPoint]) -> Chart {
    let (size_min, size_max) = min_max(points.iter().map(|p| p.size.max(0.0).sqrt()));

    let chart = chart
        .color(palette_colors(spec.palette))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .x_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name(spec.x_label.as_str()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name(spec.y_label.as_str()),
        );

    points.iter().fold(chart, |chart, p| {
        let t = normalized(p.size.max(0.0).sqrt(), size_min, size_max);
        chart.series(
            Scatter::new()
                .name(p.label.as_str())
                .symbol_size(MIN_BUBBLE + (MAX_BUBBLE - MIN_BUBBLE) * t)
                .data(vec![vec![p.x, p.y]]),
        )
    })
}

fn line(chart: Chart, spec: &ChartSpec, labels: &[String], values: &[f64], markers: bool) -> Chart {
    let dark = colors(spec.palette)[colors(spec.palette).len() - 1];
    let symbol = if markers { Symbol::Circle } else { Symbol::None };

    chart
        .color(vec![Color::from(dark)])
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(value_formatter(spec.value_format)),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .name(spec.x_label.as_str())
                .data(labels.to_vec()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name(spec.y_label.as_str()),
        )
        .series(
            Line::new()
                .name(spec.y_label.as_str())
                .symbol(symbol)
                .data(values.to_vec()),
        )
}

fn pie(chart: Chart, spec: &ChartSpec, slices: &[PieSlice]) -> Chart {
    let data: Vec<DataPoint> = slices
        .iter()
        .map(|s| DataPointItem::new(s.value).name(s.label.as_str()).into())
        .collect();

    chart
        .color(palette_colors(spec.palette))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .series(
            Pie::new()
                .name(spec.title.as_str())
                .radius("65%")
                .center(vec!["50%", "55%"])
                .label(Label::new().formatter("{b}\n{d}%"))
                .data(data),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn bar_spec(orientation: Orientation, coloring: Coloring) -> ChartSpec {
        ChartSpec {
            id: "bars".into(),
            heading: "Bars".into(),
            title: "Bars".into(),
            x_label: "X".into(),
            y_label: "Y".into(),
            palette: Palette::Blues,
            value_format: ValueFormat::Integer,
            data: ChartData::Bar {
                categories: vec!["a".into(), "b".into()],
                values: vec![1200.0, 300.0],
                orientation,
                coloring,
            },
        }
    }

    fn option(spec: &ChartSpec) -> Value {
        serde_json::to_value(options(spec)).unwrap()
    }

    /// Components may serialize as a single object or a list of them
    fn first(value: &Value) -> &Value {
        match value {
            Value::Array(items) => &items[0],
            other => other,
        }
    }

    fn absent(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }

    #[test]
    fn test_cycle_wraps() {
        let n = colors(Palette::Set2).len();
        assert_eq!(cycle(Palette::Set2, n), cycle(Palette::Set2, 0));
    }

    #[test]
    fn test_horizontal_bar_has_reversed_category_axis() {
        let option = option(&bar_spec(Orientation::Horizontal, Coloring::ByValue));

        assert_eq!(first(&option["yAxis"])["type"], "category");
        assert_eq!(first(&option["yAxis"])["inverse"], true);
        assert_eq!(first(&option["xAxis"])["type"], "value");
        assert_eq!(option["series"][0]["type"], "bar");
        assert_eq!(option["series"][0]["label"]["show"], true);
        assert_eq!(first(&option["title"])["text"], "Bars");
    }

    #[test]
    fn test_bar_by_value_bands_end_on_darkest_stop() {
        let option = option(&bar_spec(Orientation::Horizontal, Coloring::ByValue));
        let pieces = first(&option["visualMap"])["pieces"].as_array().unwrap();

        assert_eq!(pieces.len(), colors(Palette::Blues).len());
        assert_eq!(pieces[0]["gte"], 300.0);
        assert_eq!(pieces[0]["color"], "#deebf7");
        // largest value falls into the darkest band
        let last = pieces.last().unwrap();
        assert_eq!(last["lte"], 1200.0);
        assert_eq!(last["color"], "#08519c");
    }

    #[test]
    fn test_equal_bars_use_one_band() {
        let spec = ChartSpec {
            data: ChartData::Bar {
                categories: vec!["a".into(), "b".into()],
                values: vec![4.0, 4.0],
                orientation: Orientation::Vertical,
                coloring: Coloring::ByValue,
            },
            ..bar_spec(Orientation::Vertical, Coloring::ByValue)
        };
        let option = option(&spec);
        let pieces = first(&option["visualMap"])["pieces"].as_array().unwrap();

        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0]["color"], "#08519c");
    }

    #[test]
    fn test_vertical_bar_by_category() {
        let option = option(&bar_spec(Orientation::Vertical, Coloring::ByCategory));

        assert_eq!(first(&option["xAxis"])["data"][1], "b");
        assert_eq!(
            option["series"][0]["data"][1]["itemStyle"]["color"],
            cycle(Palette::Blues, 1)
        );
        assert!(absent(option.get("visualMap")));
    }

    #[test]
    fn test_pie_labels_show_percent() {
        let spec = ChartSpec {
            data: ChartData::Pie {
                slices: vec![PieSlice {
                    label: "Online".into(),
                    value: 3.0,
                    percent: 75.0,
                }],
            },
            ..bar_spec(Orientation::Vertical, Coloring::ByCategory)
        };
        let option = option(&spec);

        assert_eq!(option["series"][0]["type"], "pie");
        assert_eq!(option["series"][0]["data"][0]["name"], "Online");
        assert_eq!(option["series"][0]["label"]["formatter"], "{b}\n{d}%");
        assert!(absent(option.get("xAxis")));
    }

    #[test]
    fn test_bubble_size_tracks_units() {
        let spec = ChartSpec {
            data: ChartData::Scatter {
                points: vec![
                    ScatterPoint { label: "small".into(), x: 1.0, y: 5.0, size: 1.0 },
                    ScatterPoint { label: "big".into(), x: 100.0, y: 9.0, size: 100.0 },
                ],
            },
            ..bar_spec(Orientation::Vertical, Coloring::ByCategory)
        };
        let option = option(&spec);
        let series = option["series"].as_array().unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0]["symbolSize"], MIN_BUBBLE);
        assert_eq!(series[1]["symbolSize"], MAX_BUBBLE);
        assert_eq!(series[1]["name"], "big");
    }

    #[test]
    fn test_line_uses_darkest_palette_color() {
        let spec = ChartSpec {
            data: ChartData::Line {
                labels: vec!["2024-01-01".into(), "2024-01-02".into()],
                values: vec![10.0, 20.0],
                markers: true,
            },
            ..bar_spec(Orientation::Vertical, Coloring::ByCategory)
        };
        let option = option(&spec);

        assert_eq!(option["series"][0]["type"], "line");
        assert_eq!(first(&option["xAxis"])["data"][1], "2024-01-02");
        assert_eq!(option["color"][0], "#08519c");
    }
}
