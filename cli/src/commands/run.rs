//! Run command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use convbench_harness::config::{log_path_for, DEFAULT_KERNEL_NAME, DEFAULT_KERNEL_PATH};
use convbench_harness::{run_benchmark, ConsoleReporter, MultiSink, RunConfig, RunOutcome};
use convbench_runtime::host::HostRuntime;
use tracing::warn;

use super::Backend;
use crate::output;
use crate::progress::ProgressSink;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Matrix dimension; the kernel convolves a DIM x DIM matrix
    pub dim: usize,

    /// CPU to pin the process to
    pub affinity: usize,

    /// SCHED_FIFO priority (0 keeps the default scheduler)
    #[arg(allow_negative_numbers = true)]
    pub priority: i32,

    /// Number of iterations; exactly this many rows are logged
    #[arg(short = 'n', long, default_value_t = 1)]
    pub iterations: u32,

    /// Log every iteration to NAME.csv (plus NAME.meta.json) in --log-dir
    #[arg(long, value_name = "NAME")]
    pub log: Option<String>,

    /// Directory for --log output
    #[arg(long, env = "CONVBENCH_LOG_DIR", default_value = ".")]
    pub log_dir: PathBuf,

    /// OpenCL C source of the kernel
    #[arg(long, env = "CONVBENCH_KERNEL", default_value = DEFAULT_KERNEL_PATH)]
    pub kernel: PathBuf,

    /// Kernel entry point
    #[arg(long, default_value = DEFAULT_KERNEL_NAME)]
    pub kernel_name: String,

    /// Compute runtime
    #[arg(long, env = "CONVBENCH_BACKEND", value_enum, default_value_t)]
    pub backend: Backend,

    /// Extra buffer-allocation attempts before failing
    #[arg(long, default_value_t = 0)]
    pub alloc_retries: u32,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,

    /// Do not print the per-iteration kernel time
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    fn to_config(&self) -> RunConfig {
        RunConfig {
            dim: self.dim,
            iterations: self.iterations,
            affinity: self.affinity,
            priority: self.priority,
            log_path: self.log.as_deref().map(|name| log_path_for(&self.log_dir, name)),
            kernel_path: self.kernel.clone(),
            kernel_name: self.kernel_name.clone(),
            alloc_retries: self.alloc_retries,
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = args.to_config();
    let log_path = config.log_path.clone();

    let mut sinks = MultiSink::new();
    if !args.quiet {
        sinks.push(ConsoleReporter::stdout());
    }
    if args.progress {
        sinks.push(ProgressSink::new(args.iterations)?);
    }

    let outcome = match args.backend {
        Backend::Host => run_benchmark(config, HostRuntime::open, &mut sinks)?,
        Backend::Opencl => run_opencl(config, &mut sinks)?,
    };

    if !outcome.scheduling.is_clean() {
        warn!(
            "{} scheduling hint(s) not applied; timings may be less deterministic",
            outcome.scheduling.warnings.len()
        );
    }
    if let Some(path) = log_path {
        output::success(&format!(
            "Logged {} iteration(s) to {}",
            outcome.records.len(),
            path.display()
        ));
    }

    Ok(())
}

#[cfg(feature = "opencl")]
fn run_opencl(config: RunConfig, sinks: &mut MultiSink<'_>) -> Result<RunOutcome> {
    use convbench_runtime::opencl::OpenClRuntime;

    run_benchmark(config, OpenClRuntime::open, sinks)
}

#[cfg(not(feature = "opencl"))]
fn run_opencl(_config: RunConfig, _sinks: &mut MultiSink<'_>) -> Result<RunOutcome> {
    Err(super::opencl_unavailable())
}
