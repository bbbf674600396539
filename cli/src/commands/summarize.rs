//! Summarize command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use convbench_harness::output::json::write_summary_json;
use convbench_harness::output::read_records;
use convbench_harness::output::summary::render_summary;
use convbench_shared::RunSummary;
use tracing::warn;

use crate::output;

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// CSV log written by `convbench run --log`
    pub csv: PathBuf,

    /// Leading rows to ignore as cold-start warm-up
    #[arg(long, default_value_t = 0)]
    pub skip_warmup: usize,

    /// Also write the summary as JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,
}

pub fn run(args: SummarizeArgs) -> Result<()> {
    let records = read_records(&args.csv)?;
    let summary = RunSummary::from_records(&records, args.skip_warmup);

    if summary.skipped > 0 && summary.rows == 0 {
        warn!("All {} row(s) skipped as warm-up", summary.skipped);
    }

    render_summary(&summary, std::io::stdout().lock())?;

    if let Some(path) = &args.json {
        write_summary_json(&summary, path)?;
        output::success(&format!("Summary written to {}", path.display()));
    }

    Ok(())
}
