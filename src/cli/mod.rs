//! CLI command implementations.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `analyze` | Classify events by filter parameter and root id |
//! | `query` | Run a pipe-delimited query against a dataset |
//! | `catalog` | Print column and frequency summaries for a dataset |
//!
//! # Example Usage
//!
//! ```bash
//! # How many events carried fbc for step 305546688?
//! eventsift analyze events.json fbc 305546688 --show-ids
//!
//! # Failed Schedule fires
//! eventsift query events.json 'where event_name == "Schedule" and isfire == true | count by status'
//!
//! # What columns and values are in here?
//! eventsift catalog events.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::config::EventsiftConfig;
use crate::services::{CatalogBuilder, QueryInterpreter, analyze, normalize};
use crate::{Result, io};

/// Eventsift - field resolution and query DSL for webhook event logs.
#[derive(Parser)]
#[command(name = "eventsift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "EVENTSIFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Classify events by filter parameter and root id.
    Analyze {
        /// Path to the JSON event dump.
        file: PathBuf,

        /// The parameter to look for (e.g. `fbc`).
        filter_param: String,

        /// The automation-step root id the parameter belongs to.
        root_id: String,

        /// List target and failed event ids in the output.
        #[arg(long)]
        show_ids: bool,

        /// Write the report to a timestamped text file in this directory.
        #[arg(long, value_name = "DIR")]
        save_report: Option<PathBuf>,
    },

    /// Run a pipe-delimited query against a dataset.
    Query {
        /// Path to the JSON event dump.
        file: PathBuf,

        /// The query, e.g. `where status == "failed" | count by event_name`.
        dsl: String,

        /// Output format for the result rows.
        #[arg(short, long, value_enum, default_value_t = QueryFormat::Json)]
        format: QueryFormat,
    },

    /// Print column and frequency summaries for a dataset.
    Catalog {
        /// Path to the JSON event dump.
        file: PathBuf,
    },
}

/// Output format for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryFormat {
    /// Full result with rows and metadata as JSON.
    Json,
    /// Rows only, as CSV on stdout.
    Csv,
}

/// Runs the selected command against stdout.
///
/// # Errors
///
/// Returns an error when the dataset cannot be loaded, the query is
/// malformed, or output fails.
pub fn run(cli: Cli, config: &EventsiftConfig) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            file,
            filter_param,
            root_id,
            show_ids,
            save_report,
        } => cmd_analyze(&file, &filter_param, &root_id, show_ids, save_report.as_deref()),
        Commands::Query { file, dsl, format } => cmd_query(config, &file, &dsl, format),
        Commands::Catalog { file } => cmd_catalog(config, &file),
    }
}

fn cmd_analyze(
    file: &std::path::Path,
    filter_param: &str,
    root_id: &str,
    show_ids: bool,
    save_dir: Option<&std::path::Path>,
) -> Result<()> {
    let raw = io::load_dataset_file(file)?;
    let report = analyze(&raw, filter_param, root_id)?;
    let rendered = report.render(show_ids);
    println!("{rendered}");
    println!("\nsuccess rate: {:.2}%", report.success_rate);

    if let Some(dir) = save_dir {
        let path = io::save_report(dir, &rendered)?;
        info!(path = %path.display(), "report saved");
        println!("report saved to {}", path.display());
    }
    Ok(())
}

fn cmd_query(
    config: &EventsiftConfig,
    file: &std::path::Path,
    dsl: &str,
    format: QueryFormat,
) -> Result<()> {
    let raw = io::load_dataset_file(file)?;
    let dataset = normalize(&raw);
    let interpreter = QueryInterpreter::new(config);
    let result = interpreter.execute(&dataset, dsl)?;

    match format {
        QueryFormat::Json => {
            let text = serde_json::to_string_pretty(&result).map_err(|e| {
                crate::Error::OperationFailed {
                    operation: "serialize result".to_string(),
                    cause: e.to_string(),
                }
            })?;
            println!("{text}");
        }
        QueryFormat::Csv => {
            io::write_rows_csv(std::io::stdout().lock(), &result.rows)?;
        }
    }
    Ok(())
}

fn cmd_catalog(config: &EventsiftConfig, file: &std::path::Path) -> Result<()> {
    let raw = io::load_dataset_file(file)?;
    let dataset = normalize(&raw);
    let catalog = CatalogBuilder::new(config).build(&dataset);
    let text =
        serde_json::to_string_pretty(&catalog).map_err(|e| crate::Error::OperationFailed {
            operation: "serialize catalog".to_string(),
            cause: e.to_string(),
        })?;
    println!("{text}");
    Ok(())
}
