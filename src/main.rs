//! Binary entry point for eventsift.
//!
//! This binary provides the CLI interface for loading event dumps, running
//! analyses and queries, and printing catalogs.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use std::process::ExitCode;

use clap::Parser;
use eventsift::cli::{self, Cli};
use eventsift::config::EventsiftConfig;
use eventsift::observability;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => match EventsiftConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => EventsiftConfig::default(),
    };

    observability::init(cli.verbose);

    match cli::run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
