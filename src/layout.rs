use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::chart::{ChartDefaults, ChartPosition};
use crate::{Error, Result};

/// Spacing constants and chart fallbacks, overridable from a TOML file.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Blank rows kept between consecutive items on a sheet.
    pub separator: u32,
    /// Blank columns kept between a table and a chart placed to its right.
    pub chart_gap: u32,
    /// Converts a chart's height into the sheet rows it covers.
    pub chart_height_scale: f64,
    pub chart: ChartDefaults,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            separator: 2,
            chart_gap: 1,
            chart_height_scale: 1.9,
            chart: ChartDefaults::default(),
        }
    }
}

/// Occupancy bookkeeping for one sheet.
#[derive(PartialEq, Clone, Debug, Serialize)]
pub struct SheetState {
    pub name: String,
    pub next_free_row: u32,
    pub is_fresh: bool,
}

/// One table-with-optional-chart placement ask.
#[derive(PartialEq, Clone, Debug)]
pub struct PlacementRequest {
    pub row_start: Option<u32>,
    pub column_start: Option<u32>,
    pub heading: Option<String>,
    pub data_rows: u32,
    pub columns: u32,
    pub chart: Option<ChartExtent>,
}

/// Vertical footprint inputs for an accompanying chart.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct ChartExtent {
    pub position: ChartPosition,
    pub height: f64,
}

/// The sheet region assigned to one write.
#[derive(PartialEq, Clone, Debug, Serialize)]
pub struct PlacementPlan {
    pub row_start: u32,
    pub column_start: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    /// Row holding the column names; data rows follow directly under it.
    pub header_row: u32,
    pub table_rows: u32,
    pub table_columns: u32,
    pub table_bottom: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartPlacement>,
    /// Where the sheet's cursor moved to after this write.
    pub next_free_row: u32,
}

/// Where an accompanying chart is anchored and how far down it reaches.
#[derive(PartialEq, Clone, Copy, Debug, Serialize)]
pub struct ChartPlacement {
    pub position: ChartPosition,
    pub anchor_row: u32,
    pub anchor_column: u32,
    pub bottom_row: u32,
}

/// Per-sheet cursor state for one report run. Sheets are created the
/// first time a statement targets them and keep their cursor for the
/// whole run, wherever the statements targeting them sit in the script.
#[derive(Debug, Default)]
pub struct SheetLayout {
    config: LayoutConfig,
    sheets: IndexMap<String, SheetState>,
}

impl SheetLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            config,
            sheets: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetState> {
        self.sheets.get(name)
    }

    /// Compute where the next table (and chart) lands on `sheet` and
    /// advance the sheet's cursor past it. A rejected placement leaves
    /// the sheet untouched.
    pub fn place(&mut self, sheet: &str, request: &PlacementRequest) -> Result<PlacementPlan> {
        let (fresh, stored_next) = match self.sheets.get(sheet) {
            Some(state) => (state.is_fresh, state.next_free_row),
            None => (true, 1),
        };

        let row_start = match request.row_start {
            Some(row) => {
                if row < 1 {
                    return Err(Error::Configuration(format!(
                        "Rows on sheet `{}` are numbered from 1, got {}",
                        sheet, row
                    )));
                }
                if !fresh {
                    let last_occupied = stored_next - self.config.separator;
                    if row <= last_occupied {
                        return Err(Error::Configuration(format!(
                            "Row {} on sheet `{}` is already occupied through row {}",
                            row, sheet, last_occupied
                        )));
                    }
                }
                row
            }
            None => {
                if fresh {
                    1
                } else {
                    stored_next
                }
            }
        };
        let column_start = request.column_start.unwrap_or(1);
        if column_start < 1 {
            return Err(Error::Configuration(format!(
                "Columns on sheet `{}` are numbered from 1, got {}",
                sheet, column_start
            )));
        }

        let heading_rows = u32::from(request.heading.is_some());
        let header_row = row_start + heading_rows;
        let table_rows = heading_rows + 1 + request.data_rows;
        let table_bottom = row_start + table_rows - 1;

        let chart = request.chart.map(|extent| {
            let rows = chart_rows(self.config.chart_height_scale, extent.height);
            match extent.position {
                ChartPosition::Right => ChartPlacement {
                    position: extent.position,
                    anchor_row: header_row,
                    anchor_column: column_start + request.columns + self.config.chart_gap,
                    bottom_row: header_row + rows - 1,
                },
                ChartPosition::Bottom => ChartPlacement {
                    position: extent.position,
                    anchor_row: table_bottom + 1,
                    anchor_column: column_start,
                    bottom_row: table_bottom + rows,
                },
            }
        });

        let bottom = chart.map_or(table_bottom, |chart| table_bottom.max(chart.bottom_row));
        let next_free_row = bottom + self.config.separator;

        let state = self
            .sheets
            .entry(sheet.to_owned())
            .or_insert_with(|| SheetState {
                name: sheet.to_owned(),
                next_free_row: 1,
                is_fresh: true,
            });
        state.next_free_row = state.next_free_row.max(next_free_row);
        state.is_fresh = false;

        Ok(PlacementPlan {
            row_start,
            column_start,
            heading: request.heading.clone(),
            header_row,
            table_rows,
            table_columns: request.columns,
            table_bottom,
            chart,
            next_free_row,
        })
    }
}

fn chart_rows(scale: f64, height: f64) -> u32 {
    let rows = (scale * height).ceil();
    if rows < 1.0 { 1 } else { rows as u32 }
}
