//! CSV result log
//!
//! One header line followed by one row of eight fixed-point values per
//! iteration. Rows are flushed as soon as they are written so a run that
//! fails midway keeps everything recorded so far.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use convbench_shared::utils::format_secs;
use convbench_shared::{IterationRecord, FIELD_NAMES};
use tracing::{debug, info};

use super::ResultSink;

/// Writes iteration records as CSV
pub struct CsvSink<W: Write = File> {
    writer: csv::Writer<W>,
    path: Option<PathBuf>,
    rows: usize,
}

impl CsvSink<File> {
    /// Create (or truncate) `path` and write the header
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV log: {}", path.display()))?;
        let mut sink = Self::from_writer(file)?;
        sink.path = Some(path.to_path_buf());

        info!("Logging iterations to {}", path.display());
        Ok(sink)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wrap an arbitrary writer and write the header
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(inner);
        writer
            .write_record(FIELD_NAMES)
            .context("Failed to write CSV header")?;
        writer.flush().context("Failed to flush CSV header")?;

        Ok(Self {
            writer,
            path: None,
            rows: 0,
        })
    }

    /// Data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV log: {}", e.error()))
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn record(&mut self, iteration: u32, record: &IterationRecord) -> Result<()> {
        let row = record.values().map(format_secs);
        self.writer
            .write_record(&row)
            .with_context(|| format!("Failed to write CSV row for iteration {}", iteration))?;
        self.writer.flush().context("Failed to flush CSV log")?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush CSV log")?;
        debug!("CSV log complete: {} rows", self.rows);
        Ok(())
    }
}

/// Load every record from a CSV log written by [`CsvSink`]
pub fn read_records(path: &Path) -> Result<Vec<IterationRecord>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open CSV log: {}", path.display()))?;
    read_records_from(file).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load records from any reader producing [`CsvSink`] output
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<IterationRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader.headers().context("Missing CSV header")?.clone();
    if headers.len() != FIELD_NAMES.len() {
        anyhow::bail!(
            "Expected {} columns, found {}",
            FIELD_NAMES.len(),
            headers.len()
        );
    }

    reader
        .deserialize()
        .enumerate()
        .map(|(row, result)| result.with_context(|| format!("Invalid record on row {}", row + 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seed: f64) -> IterationRecord {
        IterationRecord {
            total_response_time: seed * 8.0,
            create_buffer: seed,
            write_buffer: seed * 2.0,
            create_kernel_args: seed * 3.0,
            create_kernel: seed * 4.0,
            launch_kernel: seed * 5.0,
            read_buffer: seed * 6.0,
            kernel_execution_time: 0.000001,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
        sink.record(0, &sample(0.001)).unwrap();
        sink.record(1, &sample(0.002)).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.rows(), 2);

        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "TOTAL_RESPONSE_TIME,CREATE_BUFFER,WRITE_BUFFER,CREATE_KERNEL_ARGS,CREATE_KERNEL,LAUNCH_KERNEL,READ_BUFFER,KERNEL_EXECUTION_TIME"
        );
        assert_eq!(
            lines[1],
            "0.008000000,0.001000000,0.002000000,0.003000000,0.004000000,0.005000000,0.006000000,0.000001000"
        );
    }

    #[test]
    fn test_create_truncates_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        std::fs::write(&path, "stale contents\n").unwrap();

        let mut sink = CsvSink::create(&path).unwrap();
        assert_eq!(sink.path(), Some(path.as_path()));
        sink.record(0, &sample(0.25)).unwrap();

        // Visible before finish(): rows are flushed as written
        let records = read_records(&path).unwrap();
        assert_eq!(records, vec![sample(0.25)]);

        sink.finish().unwrap();
    }

    #[test]
    fn test_read_rejects_wrong_columns() {
        let err = read_records_from("A,B\n1,2\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Expected 8 columns"));
    }

    #[test]
    fn test_read_rejects_non_numeric() {
        let header = FIELD_NAMES.join(",");
        let input = format!("{}\n1,2,3,4,5,6,7,fast\n", header);
        assert!(read_records_from(input.as_bytes()).is_err());
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_records(Path::new("/nonexistent/run.csv")).is_err());
    }
}
