//! Result sinks and report rendering

pub mod console;
pub mod csv;
pub mod json;
pub mod summary;

use anyhow::Result;
use convbench_shared::IterationRecord;

pub use self::console::ConsoleReporter;
pub use self::csv::{read_records, CsvSink};

/// Destination for per-iteration records
pub trait ResultSink {
    /// Accept the record of iteration `iteration` (0-based)
    fn record(&mut self, iteration: u32, record: &IterationRecord) -> Result<()>;

    /// Flush anything still buffered; called once after the last iteration
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn record(&mut self, iteration: u32, record: &IterationRecord) -> Result<()> {
        (**self).record(iteration, record)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Fans each record out to every inner sink, in insertion order
#[derive(Default)]
pub struct MultiSink<'a> {
    sinks: Vec<Box<dyn ResultSink + 'a>>,
}

impl<'a> MultiSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(&mut self, sink: impl ResultSink + 'a) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ResultSink for MultiSink<'_> {
    fn record(&mut self, iteration: u32, record: &IterationRecord) -> Result<()> {
        for sink in &mut self.sinks {
            sink.record(iteration, record)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.finish()?;
        }
        Ok(())
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<IterationRecord>,
}

impl ResultSink for MemorySink {
    fn record(&mut self, _iteration: u32, record: &IterationRecord) -> Result<()> {
        self.records.push(*record);
        Ok(())
    }
}
