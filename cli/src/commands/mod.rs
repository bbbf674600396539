//! Subcommand implementations

pub mod devices;
pub mod diff;
pub mod run;
pub mod summarize;

use clap::ValueEnum;

/// Compute runtime to drive
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// OpenCL device via the system ICD loader
    Opencl,
    /// Single-threaded host reference implementation
    Host,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(feature = "opencl") {
            Backend::Opencl
        } else {
            Backend::Host
        }
    }
}

#[cfg(not(feature = "opencl"))]
pub(crate) fn opencl_unavailable() -> anyhow::Error {
    anyhow::anyhow!("convbench was built without OpenCL support; rebuild with `--features opencl` or pass `--backend host`")
}
