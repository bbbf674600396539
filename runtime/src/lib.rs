//! Compute-runtime backends
//!
//! The benchmark harness never talks to a driver directly. It drives a
//! [`ComputeRuntime`] session, which owns the long-lived device, program and
//! queue, and hands out per-iteration buffers, kernels and events.

pub mod error;
pub mod host;
#[cfg(feature = "opencl")]
pub mod opencl;

pub use error::{Result, RuntimeError};

use convbench_shared::nanos_to_secs;
use serde::Serialize;

/// Argument slot declared when a kernel is instantiated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Device buffer of `f32`
    Buffer,
    /// 32-bit signed scalar
    Int,
}

/// Value bound to a kernel argument slot
#[derive(Debug)]
pub enum KernelArg<'a, B> {
    Buffer(&'a B),
    Int(i32),
}

impl<B> KernelArg<'_, B> {
    pub fn kind(&self) -> ArgKind {
        match self {
            KernelArg::Buffer(_) => ArgKind::Buffer,
            KernelArg::Int(_) => ArgKind::Int,
        }
    }
}

/// Device-side start/end timestamps of a completed command, in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTimestamps {
    pub start_ns: u64,
    pub end_ns: u64,
}

impl EventTimestamps {
    /// Execution time in seconds
    pub fn elapsed_secs(&self) -> f64 {
        nanos_to_secs(self.start_ns, self.end_ns)
    }
}

/// Kind of compute device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceKind {
    Gpu,
    Cpu,
}

/// A device visible to a backend
#[derive(Debug, Clone, Serialize)]
pub struct DeviceDescriptor {
    pub platform: String,
    pub name: String,
    pub kind: DeviceKind,
}

/// Capability interface the benchmark pipeline requires from a compute runtime.
///
/// Session setup (device selection, program build, queue creation) happens
/// in each backend's constructor; the methods here cover what one offload
/// iteration needs. Dropping a buffer, kernel or event releases it.
pub trait ComputeRuntime {
    type Buffer;
    type Kernel;
    type Event;

    /// Short backend identifier (e.g. "opencl")
    fn backend_name(&self) -> &'static str;

    /// Name of the device the session runs on
    fn device_name(&self) -> &str;

    /// Allocate a device buffer holding `len` `f32` values
    fn create_buffer(&self, len: usize) -> Result<Self::Buffer>;

    /// Blocking host-to-device copy
    fn write_buffer(&self, buffer: &Self::Buffer, data: &[f32]) -> Result<()>;

    /// Blocking device-to-host copy
    fn read_buffer(&self, buffer: &Self::Buffer, data: &mut [f32]) -> Result<()>;

    /// Instantiate kernel `name` from the session's program with the given argument layout
    fn create_kernel(&self, name: &str, signature: &[ArgKind]) -> Result<Self::Kernel>;

    /// Bind argument `index` of `kernel`
    fn set_kernel_arg(
        &self,
        kernel: &mut Self::Kernel,
        index: u32,
        arg: KernelArg<'_, Self::Buffer>,
    ) -> Result<()>;

    /// Enqueue `kernel` over a 2D range
    fn launch(
        &self,
        kernel: &Self::Kernel,
        global: [usize; 2],
        local: [usize; 2],
    ) -> Result<Self::Event>;

    /// Block until `event` has completed
    fn wait(&self, event: &Self::Event) -> Result<()>;

    /// Device-reported start and end of a completed command
    fn event_timestamps(&self, event: &Self::Event) -> Result<EventTimestamps>;
}
