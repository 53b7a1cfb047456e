//! # sqlsheet
//!
//! A library for turning annotated multi-statement SQL scripts into spreadsheet reports.
//!
//! # Features
//!
//! - Split multi-statement SQL scripts into statements together with the comment lines above them.
//! - Parse directives out of those comments: chart type, target sheet, layout overrides, typed options.
//! - Pivot result tables and pick chart series and reference baselines straight from the directives.
//! - Plan worksheet placement for tables and charts, flowing a per-sheet cursor down the page.
//! - Plug in any database and any spreadsheet backend through small executor and writer traits.
//!
//! # Example
//!
//! ```rust,no_run
//! use sqlsheet::{
//!     chart::ChartSpec,
//!     layout::PlacementPlan,
//!     parser::parse_script,
//!     report::{QueryExecutor, Report, SheetWriter},
//!     table::{ResultTable, Scalar, SqlParams},
//! };
//!
//! struct SalesExecutor;
//!
//! impl QueryExecutor for SalesExecutor {
//!     fn run_query(
//!         &mut self,
//!         _sql: &str,
//!         _params: Option<&SqlParams>,
//!     ) -> anyhow::Result<ResultTable> {
//!         Ok(ResultTable {
//!             column_names: vec!["region".to_owned(), "sales".to_owned()],
//!             rows: vec![
//!                 vec![Scalar::Text("north".to_owned()), Scalar::Int(120)],
//!                 vec![Scalar::Text("south".to_owned()), Scalar::Int(95)],
//!             ],
//!         })
//!     }
//! }
//!
//! struct StdoutWriter;
//!
//! impl SheetWriter for StdoutWriter {
//!     fn write(
//!         &mut self,
//!         sheet: &str,
//!         plan: &PlacementPlan,
//!         table: &ResultTable,
//!         chart: Option<&ChartSpec>,
//!     ) -> anyhow::Result<()> {
//!         println!(
//!             "{}: rows {}..={}, {} data rows, chart drawn: {}",
//!             sheet,
//!             plan.row_start,
//!             plan.table_bottom,
//!             table.row_count(),
//!             chart.is_some()
//!         );
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     env_logger::init();
//!
//!     let script = r#"
//!         -- sheetname: Sales
//!         -- chart: bar, title: Sales by region
//!         select region, sales from sales_by_region;
//!
//!         -- kept for auditing only
//!         create temp table audit as select * from raw_events;
//!     "#;
//!     let configs = parse_script(script)?;
//!
//!     let mut report = Report::new(SalesExecutor);
//!     let outcomes = report.generate(&configs, &mut StdoutWriter);
//!     println!("{}", serde_json::to_string_pretty(&outcomes)?);
//!     Ok(())
//! }
//! ```
use serde::Serialize;
use strum_macros::EnumDiscriminants;

pub mod chart;
pub mod layout;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod table;
pub mod test_utils;

/// Everything that can go wrong between an annotated script and a
/// written report.
#[derive(thiserror::Error, EnumDiscriminants, Debug)]
#[strum_discriminants(name(ErrorKind))]
#[strum_discriminants(derive(Serialize), serde(rename_all = "lowercase"))]
pub enum Error {
    /// The script or a directive line could not be lexed.
    #[error("Syntax error: {0}")]
    Syntax(String),
    /// Directives parsed but ask for something the data cannot satisfy.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The database or spreadsheet backend failed.
    #[error("Execution error: {0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, Error>;
