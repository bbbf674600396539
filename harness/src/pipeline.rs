//! One offload iteration: allocate, upload, bind, launch, download, release

use std::time::Duration;

use anyhow::{Context, Result};
use convbench_runtime::{ArgKind, ComputeRuntime, KernelArg};
use convbench_shared::{IterationRecord, Stage};
use tracing::debug;

use crate::config::RunConfig;
use crate::matrix::Matrix;
use crate::retry::retry_with_backoff;
use crate::timer::{Clock, StageTimer};

/// Argument layout of the benchmark kernel: input, output, dimension
pub const KERNEL_SIGNATURE: [ArgKind; 3] = [ArgKind::Buffer, ArgKind::Buffer, ArgKind::Int];

const ALLOC_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Drives a single iteration of the offload pipeline against a runtime session
#[derive(Debug, Clone)]
pub struct OffloadPipeline {
    kernel_name: String,
    dim: usize,
    element_count: usize,
    global_work_size: [usize; 2],
    local_work_size: [usize; 2],
    alloc_retries: u32,
}

impl OffloadPipeline {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            kernel_name: config.kernel_name.clone(),
            dim: config.dim,
            element_count: config.element_count(),
            global_work_size: config.global_work_size(),
            local_work_size: config.local_work_size(),
            alloc_retries: config.alloc_retries,
        }
    }

    /// Run one iteration and return its measurements.
    ///
    /// `TOTAL_RESPONSE_TIME` spans buffer creation through release. Any
    /// runtime failure is returned with the failing stage attached.
    pub fn run_iteration<R, C>(
        &self,
        runtime: &R,
        timer: &mut StageTimer<C>,
        input: &Matrix,
        output: &mut Matrix,
    ) -> Result<IterationRecord>
    where
        R: ComputeRuntime,
        C: Clock,
    {
        let len = self.element_count;
        let dim_arg = i32::try_from(self.dim)
            .with_context(|| format!("Matrix dimension {} does not fit a kernel int", self.dim))?;

        timer.start(Stage::TotalResponseTime)?;

        timer.start(Stage::CreateBuffer)?;
        let (input_buf, output_buf) = retry_with_backoff(
            "create_buffer",
            self.alloc_retries,
            ALLOC_RETRY_DELAY,
            || -> convbench_runtime::Result<_> {
                let input_buf = runtime.create_buffer(len)?;
                let output_buf = runtime.create_buffer(len)?;
                Ok((input_buf, output_buf))
            },
        )
        .with_context(|| {
            format!(
                "{}: failed to create buffers of {} floats",
                Stage::CreateBuffer,
                len
            )
        })?;
        timer.stop(Stage::CreateBuffer)?;

        timer.start(Stage::WriteBuffer)?;
        runtime
            .write_buffer(&input_buf, input.as_slice())
            .with_context(|| format!("{}: failed to copy the input matrix", Stage::WriteBuffer))?;
        timer.stop(Stage::WriteBuffer)?;

        timer.start(Stage::CreateKernel)?;
        let mut kernel = runtime
            .create_kernel(&self.kernel_name, &KERNEL_SIGNATURE)
            .with_context(|| {
                format!(
                    "{}: failed to create kernel `{}`",
                    Stage::CreateKernel,
                    self.kernel_name
                )
            })?;
        timer.stop(Stage::CreateKernel)?;

        timer.start(Stage::CreateKernelArgs)?;
        let args = [
            KernelArg::Buffer(&input_buf),
            KernelArg::Buffer(&output_buf),
            KernelArg::Int(dim_arg),
        ];
        for (index, arg) in (0u32..).zip(args) {
            runtime
                .set_kernel_arg(&mut kernel, index, arg)
                .with_context(|| {
                    format!("{}: failed to set kernel argument {}", Stage::CreateKernelArgs, index)
                })?;
        }
        timer.stop(Stage::CreateKernelArgs)?;

        timer.start(Stage::LaunchKernel)?;
        let event = runtime
            .launch(&kernel, self.global_work_size, self.local_work_size)
            .with_context(|| format!("{}: failed to launch kernel", Stage::LaunchKernel))?;
        runtime
            .wait(&event)
            .with_context(|| format!("{}: failed waiting for the kernel", Stage::LaunchKernel))?;
        timer.stop(Stage::LaunchKernel)?;

        let kernel_time = runtime
            .event_timestamps(&event)
            .context("Failed to read kernel event timestamps")?
            .elapsed_secs();

        timer.start(Stage::ReadBuffer)?;
        runtime
            .read_buffer(&output_buf, output.as_mut_slice())
            .with_context(|| format!("{}: failed to copy the output matrix", Stage::ReadBuffer))?;
        timer.stop(Stage::ReadBuffer)?;

        drop(event);
        drop(kernel);
        drop(input_buf);
        drop(output_buf);

        timer.stop(Stage::TotalResponseTime)?;

        let record = IterationRecord::from_stages(timer.snapshot(), kernel_time);
        debug!(
            "total {:.9}s create_buffer {:.9}s write {:.9}s kernel {:.9}s args {:.9}s launch {:.9}s read {:.9}s",
            record.total_response_time,
            record.create_buffer,
            record.write_buffer,
            record.create_kernel,
            record.create_kernel_args,
            record.launch_kernel,
            record.read_buffer,
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convbench_runtime::host::{convolve_at, HostRuntime};
    use std::path::Path;

    fn kernel_source() -> &'static Path {
        Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../kernels/convolution.cl"))
    }

    #[test]
    fn test_iteration_on_host_backend() {
        let runtime = HostRuntime::open(kernel_source()).unwrap();
        let config = RunConfig::new(20, 0, 0);
        let pipeline = OffloadPipeline::new(&config);
        let mut timer = StageTimer::new();

        let input = Matrix::sequential(config.dim);
        let mut output = Matrix::zeroed(config.dim);

        let record = pipeline
            .run_iteration(&runtime, &mut timer, &input, &mut output)
            .unwrap();

        for stage in Stage::ALL {
            assert!(record.stage(stage) >= 0.0);
            assert!(!timer.is_running(stage));
        }
        assert!(record.total_response_time >= record.launch_kernel);
        assert!(record.kernel_execution_time >= 0.0);

        for (x, y) in [(0, 0), (7, 3), (19, 19)] {
            assert_eq!(
                output.get(x, y),
                Some(convolve_at(input.as_slice(), config.dim, x, y))
            );
        }
    }

    #[test]
    fn test_unknown_kernel_names_stage() {
        let runtime = HostRuntime::open(kernel_source()).unwrap();
        let config = RunConfig {
            kernel_name: "transpose".to_string(),
            ..RunConfig::new(4, 0, 0)
        };
        let pipeline = OffloadPipeline::new(&config);
        let mut timer = StageTimer::new();

        let err = pipeline
            .run_iteration(
                &runtime,
                &mut timer,
                &Matrix::sequential(4),
                &mut Matrix::zeroed(4),
            )
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("CREATE_KERNEL"));
        assert!(message.contains("transpose"));
    }
}
