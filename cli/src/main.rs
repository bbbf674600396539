//! CLI for convbench
//!
//! Commands:
//! - run: benchmark the offload pipeline and optionally log every iteration
//! - summarize: per-stage statistics of a logged run
//! - diff: compare two logged runs
//! - devices: list the devices a backend can see

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;
mod progress;

#[derive(Parser)]
#[command(name = "convbench")]
#[command(about = "convbench - per-stage latency of accelerator offload", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time each offload stage of the convolution kernel
    Run(commands::run::RunArgs),

    /// Per-stage statistics of a CSV log
    Summarize(commands::summarize::SummarizeArgs),

    /// Compare two CSV logs stage by stage
    Diff(commands::diff::DiffArgs),

    /// List compute devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Usage errors exit with 1; --help and --version keep clap's 0.
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    match cli.command {
        Commands::Run(args) => {
            init_tracing(args.verbose, cli.log_json);
            commands::run::run(args)
        }
        Commands::Summarize(args) => {
            init_tracing(false, cli.log_json);
            commands::summarize::run(args)
        }
        Commands::Diff(args) => {
            init_tracing(false, cli.log_json);
            commands::diff::run(args)
        }
        Commands::Devices(args) => {
            init_tracing(false, cli.log_json);
            commands::devices::run(args)
        }
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
