use serde::{Deserialize, Serialize};

use crate::parser::Options;
use crate::table::{ResultTable, Scalar};
use crate::{Error, Result};

/// Chart families a `chart` directive can name.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Writes the table and draws nothing.
    Chart,
    Area,
    Line,
    Bar,
    BarLine,
    Pie,
    Radar,
    Bubble,
    Scatter,
    StackedBar,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Chart => "chart",
            ChartKind::Area => "area",
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::BarLine => "barline",
            ChartKind::Pie => "pie",
            ChartKind::Radar => "radar",
            ChartKind::Bubble => "bubble",
            ChartKind::Scatter => "scatter",
            ChartKind::StackedBar => "stackedbar",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chart" => Some(ChartKind::Chart),
            "area" => Some(ChartKind::Area),
            "line" => Some(ChartKind::Line),
            "bar" => Some(ChartKind::Bar),
            "barline" => Some(ChartKind::BarLine),
            "pie" => Some(ChartKind::Pie),
            "radar" => Some(ChartKind::Radar),
            "bubble" => Some(ChartKind::Bubble),
            "scatter" => Some(ChartKind::Scatter),
            "stackedbar" => Some(ChartKind::StackedBar),
            _ => None,
        }
    }

    /// Whether this kind draws an actual chart next to its table.
    pub fn draws(&self) -> bool {
        *self != ChartKind::Chart
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a chart sits relative to its table.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartPosition {
    #[default]
    Right,
    Bottom,
}

impl ChartPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartPosition::Right => "right",
            ChartPosition::Bottom => "bottom",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "right" => Some(ChartPosition::Right),
            "bottom" => Some(ChartPosition::Bottom),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChartPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fallback chart settings, overridable per statement and from a layout
/// configuration file.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartDefaults {
    pub width: f64,
    pub height: f64,
    pub position: ChartPosition,
    pub show_legend: bool,
    pub legend_position: String,
    pub use_ref_line: bool,
    pub vary_color: bool,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        Self {
            width: 15.0,
            height: 7.5,
            position: ChartPosition::Right,
            show_legend: true,
            legend_position: "b".to_owned(),
            use_ref_line: true,
            vary_color: false,
        }
    }
}

/// The 1-based table columns feeding a chart.
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
pub struct SeriesSelection {
    pub category_column: u32,
    pub data_columns: Vec<u32>,
    pub baseline_columns: Vec<u32>,
}

/// Everything downstream rendering needs to draw one chart.
#[derive(PartialEq, Clone, Debug, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xlabel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ylabel: Option<String>,
    pub width: f64,
    pub height: f64,
    pub position: ChartPosition,
    pub show_legend: bool,
    pub legend_position: String,
    pub vary_color: bool,
    pub series: SeriesSelection,
}

/// Resolve a statement's chart request against the table it will draw
/// from. `None` when nothing is to be drawn: no `chart` key, or a bare
/// `chart` asking for the table alone.
pub fn resolve_chart(
    options: &Options,
    table: &ResultTable,
    defaults: &ChartDefaults,
) -> Result<Option<ChartSpec>> {
    let Some(value) = options.get("chart") else {
        return Ok(None);
    };
    let raw = value.to_string();
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let kind = ChartKind::from_str_opt(raw)
        .ok_or_else(|| Error::Configuration(format!("Found unknown chart type `{}`", raw)))?;
    if !kind.draws() {
        return Ok(None);
    }

    let use_ref_line = options
        .bool_value("use_ref_line")?
        .unwrap_or(defaults.use_ref_line);
    let series = select_series(options, table, use_ref_line)?;

    let position = match options.text_value("chart_position") {
        Some(raw) => ChartPosition::from_str_opt(raw.trim()).ok_or_else(|| {
            Error::Configuration(format!("Found unknown chart position `{}`", raw.trim()))
        })?,
        None => defaults.position,
    };

    let width = options.f64_value("width")?.unwrap_or(defaults.width);
    let height = options.f64_value("height")?.unwrap_or(defaults.height);
    if width <= 0.0 || height <= 0.0 {
        return Err(Error::Configuration(format!(
            "Chart size {}x{} is not drawable",
            width, height
        )));
    }

    Ok(Some(ChartSpec {
        kind,
        title: options.text_value("title"),
        xlabel: options.text_value("xlabel"),
        ylabel: options.text_value("ylabel"),
        width,
        height,
        position,
        show_legend: options
            .bool_value("show_legend")?
            .unwrap_or(defaults.show_legend),
        legend_position: options
            .text_value("legend_position")
            .unwrap_or_else(|| defaults.legend_position.clone()),
        vary_color: options
            .bool_value("vary_color")?
            .unwrap_or(defaults.vary_color),
        series,
    }))
}

/// Resolve which 1-based columns feed the chart's series. Column 1 is
/// always the category axis; `baseline_columns` marks the selected
/// columns holding one constant numeric value over every row.
pub fn select_series(
    options: &Options,
    table: &ResultTable,
    use_ref_line: bool,
) -> Result<SeriesSelection> {
    let data_columns = resolve_data_columns(options, table.column_count())?;
    if data_columns.is_empty() {
        return Err(Error::Configuration(
            "Found no data columns to chart".to_owned(),
        ));
    }
    let baseline_columns = if use_ref_line {
        data_columns
            .iter()
            .copied()
            .filter(|&column| is_constant_numeric(table, column))
            .collect()
    } else {
        vec![]
    };
    Ok(SeriesSelection {
        category_column: 1,
        data_columns,
        baseline_columns,
    })
}

fn resolve_data_columns(options: &Options, column_count: usize) -> Result<Vec<u32>> {
    if let Some(values) = options.list_value("data_columns")? {
        if values.is_empty() {
            return Err(Error::Configuration(
                "Option `data_columns` names no columns".to_owned(),
            ));
        }
        let mut columns = vec![];
        for value in values {
            let Some(index) = value.as_int() else {
                return Err(Error::Configuration(format!(
                    "Option `data_columns` expects integer columns, got `{}`",
                    value
                )));
            };
            columns.push(validate_column(index, column_count)?);
        }
        columns.sort_unstable();
        columns.dedup();
        return Ok(columns);
    }

    let start = options.int_value("data_column_start")?;
    let end = options.int_value("data_column_end")?;
    if start.is_some() || end.is_some() {
        let start = match start {
            Some(s) => validate_column(s, column_count)?,
            None => 2,
        };
        let end = match end {
            Some(e) => validate_column(e, column_count)?,
            None => start,
        };
        if start > end {
            return Err(Error::Configuration(format!(
                "Found empty data column range {}..{}",
                start, end
            )));
        }
        return Ok((start..=end).collect());
    }

    Ok((2..=column_count as u32).collect())
}

fn validate_column(index: i64, column_count: usize) -> Result<u32> {
    if index < 1 || index > column_count as i64 {
        return Err(Error::Configuration(format!(
            "Found chart column {} outside the table's {} columns",
            index, column_count
        )));
    }
    Ok(index as u32)
}

fn is_constant_numeric(table: &ResultTable, column: u32) -> bool {
    let idx = (column - 1) as usize;
    let mut first = None;
    for row in &table.rows {
        let Some(value) = row.get(idx).and_then(Scalar::as_f64) else {
            return false;
        };
        if value.is_nan() {
            return false;
        }
        match first {
            None => first = Some(value),
            Some(f) if value == f => {}
            Some(_) => return false,
        }
    }
    first.is_some()
}
