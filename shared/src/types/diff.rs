//! Differential run comparison
//!
//! Compares two run summaries (baseline vs comparison) and computes
//! per-column deltas of the mean.

use serde::{Deserialize, Serialize};

use super::summary::RunSummary;

/// Diff of two runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDiff {
    pub baseline_rows: usize,
    pub comparison_rows: usize,
    /// Per-column diffs in CSV order.
    pub columns: Vec<ColumnDiff>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDiff {
    pub name: String,
    pub baseline_mean: f64,
    pub comparison_mean: f64,
    /// comparison - baseline
    pub delta: f64,
    /// delta / baseline * 100 (0.0 if baseline is 0)
    pub delta_pct: f64,
    pub baseline_p99: f64,
    pub comparison_p99: f64,
}

impl RunDiff {
    /// Compare two summaries column-by-column.
    ///
    /// Columns missing from the comparison are treated as zero.
    pub fn compare(baseline: &RunSummary, comparison: &RunSummary) -> Self {
        let columns = baseline
            .columns
            .iter()
            .map(|b| {
                let c = comparison.column(&b.name);
                let comparison_mean = c.map_or(0.0, |s| s.mean);
                let delta = comparison_mean - b.mean;
                let delta_pct = if b.mean > 0.0 {
                    delta / b.mean * 100.0
                } else {
                    0.0
                };
                ColumnDiff {
                    name: b.name.clone(),
                    baseline_mean: b.mean,
                    comparison_mean,
                    delta,
                    delta_pct,
                    baseline_p99: b.p99,
                    comparison_p99: c.map_or(0.0, |s| s.p99),
                }
            })
            .collect();

        Self {
            baseline_rows: baseline.rows,
            comparison_rows: comparison.rows,
            columns,
        }
    }

    /// The column whose mean moved the most, in relative terms
    pub fn largest_regression(&self) -> Option<&ColumnDiff> {
        self.columns
            .iter()
            .filter(|c| c.delta > 0.0)
            .max_by(|a, b| a.delta_pct.total_cmp(&b.delta_pct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::IterationRecord;

    fn summary_of(totals: &[f64]) -> RunSummary {
        let records: Vec<_> = totals
            .iter()
            .map(|&t| IterationRecord {
                total_response_time: t,
                read_buffer: t / 10.0,
                ..Default::default()
            })
            .collect();
        RunSummary::from_records(&records, 0)
    }

    #[test]
    fn test_diff_basic() {
        let baseline = summary_of(&[1.0, 1.0]);
        let comparison = summary_of(&[1.5, 1.5, 1.5]);

        let diff = RunDiff::compare(&baseline, &comparison);
        assert_eq!(diff.baseline_rows, 2);
        assert_eq!(diff.comparison_rows, 3);

        let total = &diff.columns[0];
        assert_eq!(total.name, "TOTAL_RESPONSE_TIME");
        assert!((total.delta - 0.5).abs() < 1e-12);
        assert!((total.delta_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_diff_zero_baseline() {
        let baseline = summary_of(&[0.0]);
        let comparison = summary_of(&[2.0]);

        let diff = RunDiff::compare(&baseline, &comparison);
        assert_eq!(diff.columns[0].delta_pct, 0.0);
        assert_eq!(diff.columns[0].delta, 2.0);
    }

    #[test]
    fn test_largest_regression() {
        let baseline = summary_of(&[1.0]);
        let faster = summary_of(&[0.5]);
        assert!(RunDiff::compare(&baseline, &faster).largest_regression().is_none());

        let slower = summary_of(&[3.0]);
        let diff = RunDiff::compare(&baseline, &slower);
        let worst = diff.largest_regression().unwrap();
        assert!((worst.delta_pct - 200.0).abs() < 1e-9);
    }
}
