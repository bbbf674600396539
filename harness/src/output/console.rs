//! Per-iteration console line

use std::io::Write;

use anyhow::{Context, Result};
use convbench_shared::IterationRecord;

use super::ResultSink;

/// Prints `Kernel execution time: <secs> sec` for every iteration
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ResultSink for ConsoleReporter<W> {
    fn record(&mut self, _iteration: u32, record: &IterationRecord) -> Result<()> {
        writeln!(
            self.out,
            "Kernel execution time: {:.6} sec",
            record.kernel_execution_time
        )
        .context("Failed to write kernel execution time")
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush().context("Failed to flush console output")
    }
}
