//! Diff command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use convbench_harness::output::read_records;
use convbench_harness::output::summary::render_diff;
use convbench_shared::{RunDiff, RunSummary};

use crate::output;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Baseline CSV log
    pub baseline: PathBuf,

    /// CSV log compared against the baseline
    pub comparison: PathBuf,

    /// Leading rows of each log to ignore as warm-up
    #[arg(long, default_value_t = 0)]
    pub skip_warmup: usize,

    /// Print the diff as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DiffArgs) -> Result<()> {
    let baseline = RunSummary::from_records(
        &read_records(&args.baseline).context("Failed to load baseline")?,
        args.skip_warmup,
    );
    let comparison = RunSummary::from_records(
        &read_records(&args.comparison).context("Failed to load comparison")?,
        args.skip_warmup,
    );

    let diff = RunDiff::compare(&baseline, &comparison);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }

    output::heading(&format!(
        "=== {} vs {} ===",
        args.baseline.display(),
        args.comparison.display()
    ));
    render_diff(&diff, std::io::stdout().lock())?;

    Ok(())
}
