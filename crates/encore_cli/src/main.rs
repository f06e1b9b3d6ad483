//! Encore CLI
//!
//! Play scripted visit scenarios against the animation lifecycle coordinator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod player;

use config::Scenario;

#[derive(Parser)]
#[command(name = "encore")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Encore animation lifecycle scenario runner", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario file against an in-memory stage
    Run {
        /// Scenario TOML file
        scenario: PathBuf,

        /// Print the final state as JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Write a starter scenario file
    Sample {
        /// Output path
        #[arg(short, long, default_value = "scenario.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { scenario, json } => cmd_run(&scenario, json),
        Commands::Sample { output, force } => cmd_sample(&output, force),
    }
}

fn cmd_run(path: &Path, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;

    info!(
        "Playing {} ({} page(s), {} event(s))",
        scenario.scenario.name,
        scenario.pages.len(),
        scenario.events.len()
    );

    let summary = player::play(&scenario)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        player::print_summary(&summary);
    }

    Ok(())
}

fn cmd_sample(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (pass --force to overwrite)",
            output.display()
        );
    }

    fs::write(output, config::SAMPLE_SCENARIO)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Sample scenario written to {}", output.display());
    info!("Play it with `encore run {}`", output.display());

    Ok(())
}
