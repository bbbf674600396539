//! Progress bar sink

use anyhow::Result;
use convbench_harness::ResultSink;
use convbench_shared::IterationRecord;
use indicatif::{ProgressBar, ProgressStyle};

/// Advances a progress bar on stderr for every recorded iteration
pub struct ProgressSink {
    pb: ProgressBar,
}

impl ProgressSink {
    pub fn new(iterations: u32) -> Result<Self> {
        let pb = ProgressBar::new(u64::from(iterations));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Ok(Self { pb })
    }
}

impl ResultSink for ProgressSink {
    fn record(&mut self, _iteration: u32, record: &IterationRecord) -> Result<()> {
        self.pb
            .set_message(format!("kernel {:.6} sec", record.kernel_execution_time));
        self.pb.inc(1);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.pb.finish_and_clear();
        Ok(())
    }
}
