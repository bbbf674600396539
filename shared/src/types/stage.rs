//! Pipeline stage identifiers
//!
//! Every timed step of an offload iteration is named by a [`Stage`]. The
//! timer table in the harness is indexed by these values, so the set is
//! closed and the indices are dense.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A timed stage of one offload iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Whole iteration, from buffer creation to handle release
    TotalResponseTime,
    CreateBuffer,
    WriteBuffer,
    CreateKernelArgs,
    CreateKernel,
    /// Enqueue plus the blocking wait on the launch event
    LaunchKernel,
    ReadBuffer,
}

/// Error returned when a column name does not match any stage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage: {0}")]
pub struct UnknownStage(pub String);

impl Stage {
    /// Number of stages (and timer slots)
    pub const COUNT: usize = 7;

    /// All stages in CSV column order
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::TotalResponseTime,
        Stage::CreateBuffer,
        Stage::WriteBuffer,
        Stage::CreateKernelArgs,
        Stage::CreateKernel,
        Stage::LaunchKernel,
        Stage::ReadBuffer,
    ];

    /// Dense slot index of this stage
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name used in the CSV header
    pub fn column_name(self) -> &'static str {
        match self {
            Stage::TotalResponseTime => "TOTAL_RESPONSE_TIME",
            Stage::CreateBuffer => "CREATE_BUFFER",
            Stage::WriteBuffer => "WRITE_BUFFER",
            Stage::CreateKernelArgs => "CREATE_KERNEL_ARGS",
            Stage::CreateKernel => "CREATE_KERNEL",
            Stage::LaunchKernel => "LAUNCH_KERNEL",
            Stage::ReadBuffer => "READ_BUFFER",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.column_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}
