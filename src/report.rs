use serde::Serialize;
use strum::IntoDiscriminant;

use crate::chart::{ChartSpec, resolve_chart};
use crate::layout::{ChartExtent, LayoutConfig, PlacementPlan, PlacementRequest, SheetLayout};
use crate::parser::{Options, QueryConfig};
use crate::table::{ResultTable, SqlParams, pivot};
use crate::{Error, ErrorKind, Result};

/// Runs one SQL statement and returns its rows.
pub trait QueryExecutor {
    fn run_query(&mut self, sql: &str, params: Option<&SqlParams>) -> anyhow::Result<ResultTable>;
}

/// Receives each placed table, and chart when one is drawn.
pub trait SheetWriter {
    fn write(
        &mut self,
        sheet: &str,
        plan: &PlacementPlan,
        table: &ResultTable,
        chart: Option<&ChartSpec>,
    ) -> anyhow::Result<()>;
}

/// What happened to one statement of a report run.
#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatementOutcome {
    Written {
        statement: usize,
        sheet: String,
        plan: PlacementPlan,
    },
    Skipped {
        statement: usize,
        reason: String,
    },
    Failed {
        statement: usize,
        kind: ErrorKind,
        error: String,
    },
}

/// Drives parsed statements through execution, layout and writing.
pub struct Report<E> {
    executor: E,
    config: LayoutConfig,
}

impl<E: QueryExecutor> Report<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            config: LayoutConfig::default(),
        }
    }

    pub fn with_config(executor: E, config: LayoutConfig) -> Self {
        Self { executor, config }
    }

    /// Process `configs` strictly in order, handing every exported
    /// statement to `writer`. Returns one outcome per statement, first
    /// statement numbered 1; sheet cursors live for this call only.
    pub fn generate<W: SheetWriter>(
        &mut self,
        configs: &[QueryConfig],
        writer: &mut W,
    ) -> Vec<StatementOutcome> {
        let mut layout = SheetLayout::with_config(self.config.clone());
        let mut outcomes = Vec::with_capacity(configs.len());
        for (i, config) in configs.iter().enumerate() {
            let statement = i + 1;
            if !config.export_requested {
                log::debug!("Skipping statement {} without a chart directive", statement);
                outcomes.push(StatementOutcome::Skipped {
                    statement,
                    reason: "no chart directive".to_owned(),
                });
                continue;
            }
            match self.export_statement(config, &mut layout, writer) {
                Ok((sheet, plan)) => outcomes.push(StatementOutcome::Written {
                    statement,
                    sheet,
                    plan,
                }),
                Err(err) => {
                    log::warn!("Statement {} failed: {}", statement, err);
                    outcomes.push(StatementOutcome::Failed {
                        statement,
                        kind: err.discriminant(),
                        error: err.to_string(),
                    });
                }
            }
        }
        outcomes
    }

    fn export_statement<W: SheetWriter>(
        &mut self,
        config: &QueryConfig,
        layout: &mut SheetLayout,
        writer: &mut W,
    ) -> Result<(String, PlacementPlan)> {
        let mut table = self
            .executor
            .run_query(&config.sql, config.params.as_ref())
            .map_err(|err| Error::Execution(format!("{:#}", err)))?;

        if let Some(index) = config.options.text_value("index") {
            let columns = config.options.text_value("columns").ok_or_else(|| {
                Error::Configuration("Option `index` requires `columns` and `values`".to_owned())
            })?;
            let values = config.options.text_value("values").ok_or_else(|| {
                Error::Configuration("Option `index` requires `columns` and `values`".to_owned())
            })?;
            table = pivot(&table, &index, &columns, &values)?;
        }

        apply_headings(&config.options, &mut table)?;

        let chart = resolve_chart(&config.options, &table, &self.config.chart)?;

        let request = PlacementRequest {
            row_start: positive_option(&config.options, "row_start")?,
            column_start: positive_option(&config.options, "column_start")?,
            heading: config.options.text_value("section_heading"),
            data_rows: table.row_count() as u32,
            columns: table.column_count() as u32,
            chart: chart.as_ref().map(|spec| ChartExtent {
                position: spec.position,
                height: spec.height,
            }),
        };
        let plan = layout.place(&config.target_sheet, &request)?;

        writer
            .write(&config.target_sheet, &plan, &table, chart.as_ref())
            .map_err(|err| Error::Execution(format!("{:#}", err)))?;

        Ok((config.target_sheet.clone(), plan))
    }
}

fn apply_headings(options: &Options, table: &mut ResultTable) -> Result<()> {
    let Some(headings) = options.list_value("headings")? else {
        return Ok(());
    };
    if headings.len() > table.column_count() {
        return Err(Error::Configuration(format!(
            "Found {} headings for {} columns",
            headings.len(),
            table.column_count()
        )));
    }
    for (name, heading) in table.column_names.iter_mut().zip(headings) {
        *name = heading.to_string();
    }
    Ok(())
}

fn positive_option(options: &Options, key: &str) -> Result<Option<u32>> {
    match options.int_value(key)? {
        Some(v) if v >= 1 => Ok(Some(v as u32)),
        Some(v) => Err(Error::Configuration(format!(
            "Option `{}` must be at least 1, got {}",
            key, v
        ))),
        None => Ok(None),
    }
}
