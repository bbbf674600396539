//! Offload pipeline microbenchmark
//!
//! Times each stage of an accelerator offload (buffer creation, host-to-device
//! write, kernel creation, argument binding, launch, device-to-host read) over
//! repeated iterations and records the results.

pub mod config;
pub mod driver;
pub mod matrix;
pub mod output;
pub mod pipeline;
pub mod retry;
pub mod sched;
pub mod timer;

pub use config::RunConfig;
pub use driver::{BenchmarkDriver, RunOutcome};
pub use output::{ConsoleReporter, CsvSink, MultiSink, ResultSink};
pub use pipeline::OffloadPipeline;
pub use timer::{StageTimer, TimerError};

use std::path::Path;

use anyhow::Result;
use convbench_runtime::ComputeRuntime;

/// Run the benchmark described by `config`, opening the session with `open`.
pub fn run_benchmark<R, F>(config: RunConfig, open: F, sink: &mut dyn ResultSink) -> Result<RunOutcome>
where
    R: ComputeRuntime,
    F: FnOnce(&Path) -> convbench_runtime::Result<R>,
{
    BenchmarkDriver::new(config).run(open, sink)
}
