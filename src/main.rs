use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser as ClapParser;
use clap::Subcommand;
use indexmap::IndexMap;
use serde::Serialize;
use sqlsheet::layout::LayoutConfig;
use sqlsheet::parser::{QueryConfig, parse_script};
use std::time::Instant;

#[derive(clap::Parser)]
#[command(name = "sqlsheet")]
#[command(about = "Annotated SQL script parser for spreadsheet reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse report directives from one or more annotated SQL files.
    Inspect(InspectCommand),
}

#[derive(clap::Args)]
struct InspectCommand {
    /// Path to a TOML file overriding the default layout settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Path to the SQL file or directory containing SQL files.
    #[arg(value_name = "SQL_[FILE|DIR]")]
    sql: PathBuf,
    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
enum OutReport {
    Ok(OkReport),
    ErrReport { error: String },
}

#[derive(Serialize)]
struct OkReport {
    statements: Vec<QueryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<LayoutConfig>,
}

fn output_report(
    layout: Option<&LayoutConfig>,
    sql_file_path: &PathBuf,
) -> anyhow::Result<OutReport> {
    let script = std::fs::read_to_string(sql_file_path).map_err(|_| {
        anyhow!(
            "Failed to read sql file {}",
            sql_file_path.display().to_string()
        )
    })?;
    let out_report = match parse_script(&script) {
        Ok(statements) => OutReport::Ok(OkReport {
            statements,
            layout: layout.cloned(),
        }),
        Err(err) => OutReport::ErrReport {
            error: format!(
                "Could not parse SQL in file {} due to error: {}",
                sql_file_path.display(),
                err
            ),
        },
    };
    Ok(out_report)
}

fn main() -> anyhow::Result<()> {
    let now = Instant::now();

    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Inspect(inspect_command) => {
            let sql_file_or_dir = &inspect_command.sql;
            let layout = inspect_command
                .config
                .as_ref()
                .map(|config_path| -> anyhow::Result<LayoutConfig> {
                    toml::from_str(&std::fs::read_to_string(config_path).map_err(|_| {
                        anyhow!(
                            "Failed to read config file: {}",
                            config_path.display().to_string()
                        )
                    })?)
                    .map_err(|err| {
                        anyhow!(
                            "Failed to parse TOML config in file {} due to error: {}",
                            config_path.display().to_string(),
                            err
                        )
                    })
                })
                .transpose()?;
            let out_str = if sql_file_or_dir.is_dir() {
                let mut file_reports: IndexMap<String, OutReport> = IndexMap::new();
                let sql_in_dir: Vec<_> = std::fs::read_dir(sql_file_or_dir)?
                    .filter_map(|res| res.ok())
                    .map(|entry| entry.path())
                    .filter_map(|file| {
                        if file.extension().is_some_and(|ext| ext == "sql") {
                            Some(file)
                        } else {
                            None
                        }
                    })
                    .collect();

                for sql_file in sql_in_dir {
                    let output_report = output_report(layout.as_ref(), &sql_file)?;
                    file_reports.insert(
                        std::path::absolute(sql_file)?.display().to_string(),
                        output_report,
                    );
                }

                if inspect_command.pretty {
                    serde_json::to_string_pretty(&file_reports)?
                } else {
                    serde_json::to_string(&file_reports)?
                }
            } else {
                let output_report = output_report(layout.as_ref(), sql_file_or_dir)?;
                if inspect_command.pretty {
                    serde_json::to_string_pretty(&output_report)?
                } else {
                    serde_json::to_string(&output_report)?
                }
            };
            println!("{}", out_str);
        }
    }

    let elapsed = now.elapsed();
    log::info!("Elapsed: {:.2?}", elapsed);

    Ok(())
}
