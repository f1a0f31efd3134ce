//! Command-line interface for the bioreactor library
//!
//! This binary runs reactor scenarios and writes editable scenario templates.
//!
//! # Usage
//!
//! ```bash
//! # Run the reference multi-species RBC scenario and plot it
//! bioreactor run --model multi-species-rbc --plot rbc.html
//!
//! # Write a scenario template, edit it, then run it
//! bioreactor template --model bioremediation --output scenario.json
//! bioreactor run --config scenario.json --output series.json
//! ```
//!
//! Logging is controlled through `RUST_LOG`, e.g. `RUST_LOG=debug`.

use std::{fs::File, path::PathBuf, process::ExitCode};

use bioreactor::prelude::*;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::info;

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Run a reactor scenario and summarize the result
    Run {
        /// Reference scenario to run
        #[arg(short, long, conflicts_with = "config", default_value = "bioremediation")]
        model: ModelKind,

        /// Path to a scenario JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Integration method, overriding the scenario
        #[arg(long)]
        method: Option<Method>,

        /// Path to write the figure to (HTML)
        #[arg(short, long)]
        plot: Option<PathBuf>,

        /// Path to write the extracted series to (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the figure in the browser
        #[arg(long, default_value_t = false)]
        show: bool,
    },
    /// Write the reference scenario of a model as JSON
    Template {
        /// Model of the scenario
        #[arg(short, long)]
        model: ModelKind,

        /// Path to the output file. Prints to stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Main entry point for the CLI application
pub fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "Error:".bold().red(), err.to_string().red());
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run {
            model,
            config,
            method,
            plot,
            output,
            show,
        } => {
            let mut scenario = match config {
                Some(path) => load_scenario(path)?,
                None => Scenario::default_for(model),
            };
            if let Some(method) = method {
                scenario.setup.method = method;
            }

            scenario.validate()?;
            println!("{}", scenario.reactor);

            let trajectory: Trajectory = scenario.run()?;
            let series = scenario.reactor.extract(&trajectory)?;

            println!("{series}");
            println!("{trajectory}");

            if let Some(path) = output {
                serde_json::to_writer_pretty(File::create(&path)?, &series)?;
                info!("Wrote extracted series to {}", path.display());
            }

            if plot.is_some() || show {
                let figure = series
                    .plot()
                    .config(PlotConfig {
                        title: format!("{} simulation", scenario.reactor.kind()),
                        ..Default::default()
                    })
                    .show(show)
                    .call();
                if let Some(path) = plot {
                    figure.write_html(&path);
                    info!("Wrote figure to {}", path.display());
                }
            }

            println!("{}", "Simulation finished".bold().green());
        }
        Commands::Template { model, output } => {
            let scenario = Scenario::default_for(model);
            match output {
                Some(path) => {
                    save_scenario(&path, &scenario)?;
                    println!(
                        "{} {}",
                        "Wrote scenario template to".green(),
                        path.display()
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&scenario)?),
            }
        }
    }

    Ok(())
}
