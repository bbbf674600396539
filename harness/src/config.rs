//! Configuration types for a benchmark run

use std::path::{Path, PathBuf};

use convbench_shared::utils::round_up;

/// Work-group edge length used for every launch
pub const LOCAL_WORK_SIZE: usize = 16;

/// Kernel launched when none is configured
pub const DEFAULT_KERNEL_NAME: &str = "convolution";

/// Kernel source loaded when none is configured
pub const DEFAULT_KERNEL_PATH: &str = "kernels/convolution.cl";

/// Benchmark run configuration
///
/// Built once from the command line and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Row/column length of the square matrix
    pub dim: usize,

    /// Number of measured passes; exactly this many rows are recorded
    pub iterations: u32,

    /// CPU the process is pinned to
    pub affinity: usize,

    /// SCHED_FIFO priority (0 = keep the default scheduler)
    pub priority: i32,

    /// Optional CSV destination
    pub log_path: Option<PathBuf>,

    /// OpenCL C source of the benchmark kernel
    pub kernel_path: PathBuf,

    /// Entry point inside `kernel_path`
    pub kernel_name: String,

    /// Extra buffer-allocation attempts before giving up (0 = fail on first error)
    pub alloc_retries: u32,
}

impl RunConfig {
    /// Single-pass configuration with default kernel and no logging
    pub fn new(dim: usize, affinity: usize, priority: i32) -> Self {
        Self {
            dim,
            iterations: 1,
            affinity,
            priority,
            log_path: None,
            kernel_path: PathBuf::from(DEFAULT_KERNEL_PATH),
            kernel_name: DEFAULT_KERNEL_NAME.to_string(),
            alloc_retries: 0,
        }
    }

    /// Number of `f32` values in one matrix
    pub fn element_count(&self) -> usize {
        self.dim * self.dim
    }

    /// 2D global range: `dim` rounded up to the work-group size in each dimension
    pub fn global_work_size(&self) -> [usize; 2] {
        global_work_size(self.dim)
    }

    pub fn local_work_size(&self) -> [usize; 2] {
        [LOCAL_WORK_SIZE, LOCAL_WORK_SIZE]
    }

    /// Path of the JSON metadata written next to the CSV log
    pub fn metadata_path(&self) -> Option<PathBuf> {
        self.log_path
            .as_ref()
            .map(|p| p.with_extension("meta.json"))
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dim == 0 {
            anyhow::bail!("Matrix dimension must be greater than 0");
        }

        // The dimension is passed to the kernel as a 32-bit int and used to
        // index the flattened matrix there.
        let fits = self
            .dim
            .checked_mul(self.dim)
            .is_some_and(|n| n <= i32::MAX as usize);
        if !fits {
            anyhow::bail!("Matrix dimension {} is too large", self.dim);
        }

        if self.iterations == 0 {
            anyhow::bail!("Iteration count must be greater than 0");
        }

        if self.kernel_name.is_empty() {
            anyhow::bail!("Kernel name must not be empty");
        }

        Ok(())
    }
}

/// `ceil(dim / 16) * 16` in both dimensions
pub fn global_work_size(dim: usize) -> [usize; 2] {
    let edge = round_up(dim, LOCAL_WORK_SIZE);
    [edge, edge]
}

/// `<dir>/<name>.csv`
pub fn log_path_for(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.csv", name))
}
