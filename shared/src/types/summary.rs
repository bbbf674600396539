//! Summary statistics over a recorded run

use serde::{Deserialize, Serialize};

use super::record::{IterationRecord, FIELD_COUNT, FIELD_NAMES};

/// Statistics of one CSV column, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub p50: f64,
    pub p99: f64,
    pub max: f64,
    pub stddev: f64,
}

/// Per-column statistics of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Leading rows excluded as warm-up
    pub skipped: usize,

    /// Rows that contributed to the statistics
    pub rows: usize,

    /// One entry per column, in CSV order
    pub columns: Vec<StageStats>,
}

impl RunSummary {
    /// Summarize `records`, ignoring the first `skip_warmup` rows.
    pub fn from_records(records: &[IterationRecord], skip_warmup: usize) -> Self {
        let skipped = skip_warmup.min(records.len());
        let measured = &records[skipped..];

        let columns = (0..FIELD_COUNT)
            .map(|field| {
                let samples: Vec<f64> = measured.iter().map(|r| r.values()[field]).collect();
                StageStats::from_samples(FIELD_NAMES[field], samples)
            })
            .collect();

        Self {
            skipped,
            rows: measured.len(),
            columns,
        }
    }

    /// Look up a column by its CSV name
    pub fn column(&self, name: &str) -> Option<&StageStats> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl StageStats {
    fn from_samples(name: &str, mut samples: Vec<f64>) -> Self {
        let count = samples.len();
        if count == 0 {
            return Self {
                name: name.to_string(),
                count: 0,
                mean: 0.0,
                min: 0.0,
                p50: 0.0,
                p99: 0.0,
                max: 0.0,
                stddev: 0.0,
            };
        }

        samples.sort_by(|a, b| a.total_cmp(b));

        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Self {
            name: name.to_string(),
            count,
            mean,
            min: samples[0],
            p50: nearest_rank(&samples, 0.50),
            p99: nearest_rank(&samples, 0.99),
            max: samples[count - 1],
            stddev: variance.sqrt(),
        }
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice
fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    let rank = (percentile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_total(total: f64) -> IterationRecord {
        IterationRecord {
            total_response_time: total,
            kernel_execution_time: total / 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_nearest_rank() {
        let sorted: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(nearest_rank(&sorted, 0.50), 50.0);
        assert_eq!(nearest_rank(&sorted, 0.99), 99.0);
        assert_eq!(nearest_rank(&[7.0], 0.99), 7.0);
    }

    #[test]
    fn test_summary_basic() {
        let records: Vec<_> = [4.0, 1.0, 3.0, 2.0].into_iter().map(record_with_total).collect();
        let summary = RunSummary::from_records(&records, 0);

        assert_eq!(summary.rows, 4);
        assert_eq!(summary.columns.len(), FIELD_COUNT);

        let total = summary.column("TOTAL_RESPONSE_TIME").unwrap();
        assert_eq!(total.count, 4);
        assert_eq!(total.min, 1.0);
        assert_eq!(total.max, 4.0);
        assert!((total.mean - 2.5).abs() < 1e-12);
        assert_eq!(total.p50, 2.0);
        assert!((total.stddev - 1.25f64.sqrt()).abs() < 1e-12);

        let kernel = summary.column("KERNEL_EXECUTION_TIME").unwrap();
        assert_eq!(kernel.max, 2.0);
    }

    #[test]
    fn test_summary_skips_warmup() {
        let records: Vec<_> = [100.0, 1.0, 1.0].into_iter().map(record_with_total).collect();
        let summary = RunSummary::from_records(&records, 1);

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.column("TOTAL_RESPONSE_TIME").unwrap().max, 1.0);
    }

    #[test]
    fn test_summary_warmup_larger_than_run() {
        let records = vec![record_with_total(1.0)];
        let summary = RunSummary::from_records(&records, 10);

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.rows, 0);
        assert!(summary.columns.iter().all(|c| c.count == 0 && c.mean == 0.0));
    }
}
