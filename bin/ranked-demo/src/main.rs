// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # ranked-demo
//!
//! Command-line walkthrough of the `ranked-tensor` crate.
//!
//! ## Usage
//! ```bash
//! # Build the demo tensors and the numbered matrix
//! ranked-demo run --rows 4 --cols 3 --budget 1M
//!
//! # Inspect a shape: element count and strides
//! ranked-demo shape 15 128 64 7 7
//!
//! # Read defaults from a file, with debug logging
//! ranked-demo -vv -c demo.toml run
//! ```

mod commands;
mod config;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ranked-demo",
    about = "Fixed-rank tensors, rank-reducing views and pooled allocation",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments take precedence).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the demo tensors and walk a matrix through row views.
    Run {
        /// Matrix rows.
        #[arg(long)]
        rows: Option<usize>,

        /// Matrix columns.
        #[arg(long)]
        cols: Option<usize>,

        /// Pool budget for the matrix and rank-7 tensor (e.g., "1M", "512K").
        #[arg(short, long)]
        budget: Option<String>,
    },

    /// Validate axis lengths and print the resulting shape and strides.
    Shape {
        /// Axis lengths, one per axis (1 to 5 axes).
        #[arg(required = true, allow_negative_numbers = true)]
        axes: Vec<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => config::DemoConfig::from_file(path)?,
        None => config::DemoConfig::default(),
    };

    match cli.command {
        Commands::Run { rows, cols, budget } => {
            config.apply_overrides(rows, cols, budget);
            commands::run::execute(&config)
        }
        Commands::Shape { axes } => commands::shape::execute(&axes),
    }
}
