// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// coverwerk: extract book covers from photographs.
//
// Entry point. Initialises logging, parses arguments and turns failures into
// plain-language messages with suggestions.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use coverwerk_core::human_errors::{Severity, humanize_error};

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Command::Detect(args) => commands::run_detect(args),
        Command::Place(args) => commands::run_place(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "Command failed");
            let human = humanize_error(&err);
            eprintln!("Error: {}", human.message);
            if human.severity == Severity::ActionRequired {
                eprintln!("Try:");
            }
            for suggestion in &human.suggestions {
                eprintln!("  - {suggestion}");
            }
            ExitCode::FAILURE
        }
    }
}
