//! Per-iteration measurement records
//!
//! These types represent one row of the benchmark log plus the metadata
//! describing the run that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stage::Stage;

/// CSV column holding the device-reported kernel execution time
pub const KERNEL_EXECUTION_TIME: &str = "KERNEL_EXECUTION_TIME";

/// Number of measured fields in a record
pub const FIELD_COUNT: usize = Stage::COUNT + 1;

/// Column names in serialization order
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "TOTAL_RESPONSE_TIME",
    "CREATE_BUFFER",
    "WRITE_BUFFER",
    "CREATE_KERNEL_ARGS",
    "CREATE_KERNEL",
    "LAUNCH_KERNEL",
    "READ_BUFFER",
    KERNEL_EXECUTION_TIME,
];

/// One iteration's measurements, all in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct IterationRecord {
    pub total_response_time: f64,
    pub create_buffer: f64,
    pub write_buffer: f64,
    pub create_kernel_args: f64,
    pub create_kernel: f64,
    pub launch_kernel: f64,
    pub read_buffer: f64,

    /// Derived from the launch event's device timestamps
    pub kernel_execution_time: f64,
}

impl IterationRecord {
    /// Build a record from per-stage durations and the device-side kernel time
    pub fn from_stages(stage_secs: [f64; Stage::COUNT], kernel_execution_time: f64) -> Self {
        Self {
            total_response_time: stage_secs[Stage::TotalResponseTime.index()],
            create_buffer: stage_secs[Stage::CreateBuffer.index()],
            write_buffer: stage_secs[Stage::WriteBuffer.index()],
            create_kernel_args: stage_secs[Stage::CreateKernelArgs.index()],
            create_kernel: stage_secs[Stage::CreateKernel.index()],
            launch_kernel: stage_secs[Stage::LaunchKernel.index()],
            read_buffer: stage_secs[Stage::ReadBuffer.index()],
            kernel_execution_time,
        }
    }

    /// Duration recorded for a stage
    pub fn stage(&self, stage: Stage) -> f64 {
        match stage {
            Stage::TotalResponseTime => self.total_response_time,
            Stage::CreateBuffer => self.create_buffer,
            Stage::WriteBuffer => self.write_buffer,
            Stage::CreateKernelArgs => self.create_kernel_args,
            Stage::CreateKernel => self.create_kernel,
            Stage::LaunchKernel => self.launch_kernel,
            Stage::ReadBuffer => self.read_buffer,
        }
    }

    /// All fields in [`FIELD_NAMES`] order
    pub fn values(&self) -> [f64; FIELD_COUNT] {
        [
            self.total_response_time,
            self.create_buffer,
            self.write_buffer,
            self.create_kernel_args,
            self.create_kernel,
            self.launch_kernel,
            self.read_buffer,
            self.kernel_execution_time,
        ]
    }
}

/// Description of a benchmark run, written next to the CSV log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub started_at: DateTime<Utc>,
    pub host: String,
    pub backend: String,
    pub device: String,
    pub kernel_source: String,
    pub kernel_name: String,
    pub dim: usize,
    pub iterations: u32,
    pub affinity: usize,
    pub priority: i32,
    pub global_work_size: [usize; 2],
    pub local_work_size: [usize; 2],
}

/// Convert a device timestamp delta in nanoseconds to seconds
pub fn nanos_to_secs(start_ns: u64, end_ns: u64) -> f64 {
    end_ns.saturating_sub(start_ns) as f64 * 1e-9
}
