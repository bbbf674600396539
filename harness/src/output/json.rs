//! JSON output
//!
//! Exports run metadata and summaries for further analysis

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use convbench_shared::{RunMetadata, RunSummary};
use serde::Serialize;
use tracing::info;

fn write_pretty<T: Serialize>(value: &T, output_path: &Path, what: &str) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value)
        .with_context(|| format!("Failed to serialize {} to JSON", what))?;

    info!("{} written to {}", what, output_path.display());
    Ok(())
}

/// Write the run description sidecar
pub fn write_metadata(metadata: &RunMetadata, output_path: &Path) -> Result<()> {
    write_pretty(metadata, output_path, "Run metadata")
}

/// Export summary statistics
pub fn write_summary_json(summary: &RunSummary, output_path: &Path) -> Result<()> {
    write_pretty(summary, output_path, "Summary")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use convbench_shared::IterationRecord;

    #[test]
    fn test_write_summary_json() {
        let records = vec![IterationRecord::default(); 3];
        let summary = RunSummary::from_records(&records, 1);

        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("summary.json");

        write_summary_json(&summary, &output_path).unwrap();

        let contents = std::fs::read_to_string(&output_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["rows"], 2);
        assert_eq!(parsed["skipped"], 1);
        assert_eq!(parsed["columns"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_write_metadata() {
        let metadata = RunMetadata {
            started_at: Utc::now(),
            host: "bench-01".to_string(),
            backend: "host".to_string(),
            device: "cpu".to_string(),
            kernel_source: "kernels/convolution.cl".to_string(),
            kernel_name: "convolution".to_string(),
            dim: 4,
            iterations: 2,
            affinity: 0,
            priority: 0,
            global_work_size: [16, 16],
            local_work_size: [16, 16],
        };

        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("t.meta.json");
        write_metadata(&metadata, &output_path).unwrap();

        let contents = std::fs::read_to_string(&output_path).unwrap();
        let parsed: RunMetadata = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.host, "bench-01");
        assert_eq!(parsed.global_work_size, [16, 16]);
    }

    #[test]
    fn test_unwritable_path() {
        let summary = RunSummary::from_records(&[], 0);
        assert!(write_summary_json(&summary, Path::new("/nonexistent/dir/s.json")).is_err());
    }
}
