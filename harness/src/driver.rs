//! Benchmark driver: configuration to recorded iterations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use convbench_runtime::ComputeRuntime;
use convbench_shared::utils::time::host_name;
use convbench_shared::{IterationRecord, RunMetadata};
use tracing::info;

use crate::config::RunConfig;
use crate::matrix::Matrix;
use crate::output::json::write_metadata;
use crate::output::{CsvSink, MultiSink, ResultSink};
use crate::pipeline::OffloadPipeline;
use crate::sched::{self, SchedulingReport};
use crate::timer::StageTimer;

/// What a completed run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub backend: String,
    pub device: String,
    pub iterations: u32,
    pub records: Vec<IterationRecord>,
    pub scheduling: SchedulingReport,
}

impl RunOutcome {
    /// Device-reported kernel time of the final iteration
    pub fn last_kernel_time(&self) -> Option<f64> {
        self.records.last().map(|r| r.kernel_execution_time)
    }
}

/// Runs a configured benchmark against one runtime session
#[derive(Debug, Clone)]
pub struct BenchmarkDriver {
    config: RunConfig,
}

impl BenchmarkDriver {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Validate, apply scheduling hints, open a session with `open` and run
    /// every iteration.
    ///
    /// Records go to `sink` and, when a log path is configured, to a CSV file
    /// plus its metadata sidecar. Nothing is written to disk before the
    /// session opened successfully.
    pub fn run<R, F>(&self, open: F, sink: &mut dyn ResultSink) -> Result<RunOutcome>
    where
        R: ComputeRuntime,
        F: FnOnce(&Path) -> convbench_runtime::Result<R>,
    {
        self.config.validate().context("Invalid configuration")?;

        let scheduling = sched::apply(self.config.affinity, self.config.priority);

        let runtime = open(&self.config.kernel_path).with_context(|| {
            format!(
                "Failed to set up {} session",
                self.config.kernel_path.display()
            )
        })?;
        info!(
            "Session ready: backend {} on {}",
            runtime.backend_name(),
            runtime.device_name()
        );

        let mut sinks = MultiSink::new();
        if let Some(path) = &self.config.log_path {
            sinks.push(CsvSink::create(path)?);
        }
        if let Some(meta_path) = self.config.metadata_path() {
            write_metadata(&self.metadata(&runtime), &meta_path)?;
        }
        sinks.push(sink);

        let records = self.run_iterations(&runtime, &mut sinks)?;
        sinks.finish()?;

        info!("Completed {} iteration(s)", records.len());

        Ok(RunOutcome {
            backend: runtime.backend_name().to_string(),
            device: runtime.device_name().to_string(),
            iterations: self.config.iterations,
            records,
            scheduling,
        })
    }

    /// Run exactly `iterations` passes on an open session
    pub fn run_iterations<R: ComputeRuntime>(
        &self,
        runtime: &R,
        sink: &mut dyn ResultSink,
    ) -> Result<Vec<IterationRecord>> {
        let pipeline = OffloadPipeline::new(&self.config);
        let mut timer = StageTimer::new();

        let input = Matrix::sequential(self.config.dim);
        let mut output = Matrix::zeroed(self.config.dim);

        let mut records = Vec::with_capacity(self.config.iterations as usize);
        for iteration in 0..self.config.iterations {
            let record = pipeline
                .run_iteration(runtime, &mut timer, &input, &mut output)
                .with_context(|| format!("Iteration {} failed", iteration))?;

            sink.record(iteration, &record)?;
            timer.clear_all();
            records.push(record);
        }

        Ok(records)
    }

    fn metadata<R: ComputeRuntime>(&self, runtime: &R) -> RunMetadata {
        RunMetadata {
            started_at: Utc::now(),
            host: host_name(),
            backend: runtime.backend_name().to_string(),
            device: runtime.device_name().to_string(),
            kernel_source: self.config.kernel_path.display().to_string(),
            kernel_name: self.config.kernel_name.clone(),
            dim: self.config.dim,
            iterations: self.config.iterations,
            affinity: self.config.affinity,
            priority: self.config.priority,
            global_work_size: self.config.global_work_size(),
            local_work_size: self.config.local_work_size(),
        }
    }
}
