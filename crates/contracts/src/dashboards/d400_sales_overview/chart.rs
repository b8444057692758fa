use serde::{Deserialize, Serialize};

/// Declarative chart configuration.
///
/// The server decides what to draw; the browser side only maps a chart onto
/// the charting library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// DOM-friendly identifier (kebab-case)
    pub id: String,
    /// Section heading shown above the chart
    pub heading: String,
    /// Chart title
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub palette: Palette,
    pub value_format: ValueFormat,
    pub data: ChartData,
}

impl ChartSpec {
    /// Number of plotted points (bars, markers or slices)
    pub fn point_count(&self) -> usize {
        match &self.data {
            ChartData::Bar { categories, .. } => categories.len(),
            ChartData::Scatter { points } => points.len(),
            ChartData::Line { labels, .. } => labels.len(),
            ChartData::Pie { slices } => slices.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Bar {
        categories: Vec<String>,
        values: Vec<f64>,
        orientation: Orientation,
        coloring: Coloring,
    },
    Scatter {
        points: Vec<ScatterPoint>,
    },
    Line {
        labels: Vec<String>,
        values: Vec<f64>,
        markers: bool,
    },
    Pie {
        slices: Vec<PieSlice>,
    },
}

/// Horizontal bars list the first category at the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// How bar colors are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coloring {
    /// Sequential palette bands driven by the bar value
    ByValue,
    /// One discrete color per category
    ByCategory,
}

/// Bubble: x = units, y = margin, size = units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    Blues,
    Pastel,
    Teal,
    Set2,
    Oranges,
    Greens,
    Set3,
}

/// How values are printed in labels and tooltips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    Integer,
    Currency,
    Decimal2,
}
