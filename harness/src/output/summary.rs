//! Text tables for run summaries and diffs

use std::io::Write;

use anyhow::Result;
use convbench_shared::{RunDiff, RunSummary};

const US_PER_SEC: f64 = 1_000_000.0;

/// Render per-column statistics, in microseconds
pub fn render_summary<W: Write>(summary: &RunSummary, mut writer: W) -> Result<()> {
    writeln!(writer, "Stage Response Times")?;
    writeln!(writer, "====================")?;
    writeln!(writer, "Rows:    {}", summary.rows)?;
    writeln!(writer, "Skipped: {} (warm-up)", summary.skipped)?;

    if summary.rows == 0 {
        writeln!(writer, "\nNo iterations recorded.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "\n{:<22} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Stage", "Mean(us)", "Min(us)", "P50(us)", "P99(us)", "Max(us)", "StdDev(us)"
    )?;
    writeln!(writer, "{:-<100}", "")?;

    for c in &summary.columns {
        writeln!(
            writer,
            "{:<22} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3}",
            c.name,
            c.mean * US_PER_SEC,
            c.min * US_PER_SEC,
            c.p50 * US_PER_SEC,
            c.p99 * US_PER_SEC,
            c.max * US_PER_SEC,
            c.stddev * US_PER_SEC,
        )?;
    }

    Ok(())
}

/// Render mean deltas between two runs, in microseconds
pub fn render_diff<W: Write>(diff: &RunDiff, mut writer: W) -> Result<()> {
    writeln!(
        writer,
        "Baseline rows: {}  Comparison rows: {}",
        diff.baseline_rows, diff.comparison_rows
    )?;
    writeln!(
        writer,
        "\n{:<22} {:>14} {:>14} {:>14} {:>9}",
        "Stage", "Baseline(us)", "Compare(us)", "Delta(us)", "Delta%"
    )?;
    writeln!(writer, "{:-<77}", "")?;

    for c in &diff.columns {
        writeln!(
            writer,
            "{:<22} {:>14.3} {:>14.3} {:>+14.3} {:>+8.1}%",
            c.name,
            c.baseline_mean * US_PER_SEC,
            c.comparison_mean * US_PER_SEC,
            c.delta * US_PER_SEC,
            c.delta_pct,
        )?;
    }

    if let Some(worst) = diff.largest_regression() {
        writeln!(
            writer,
            "\nLargest regression: {} ({:+.1}%)",
            worst.name, worst.delta_pct
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use convbench_shared::IterationRecord;

    fn records(totals: &[f64]) -> Vec<IterationRecord> {
        totals
            .iter()
            .map(|&t| IterationRecord {
                total_response_time: t,
                kernel_execution_time: 0.0001,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_render_summary() {
        let summary = RunSummary::from_records(&records(&[0.001, 0.002, 0.003]), 0);
        let mut out = Vec::new();
        render_summary(&summary, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Rows:    3"));
        let total_line = text
            .lines()
            .find(|l| l.starts_with("TOTAL_RESPONSE_TIME"))
            .unwrap();
        assert!(total_line.contains("2000.000"));
        assert!(text.contains("KERNEL_EXECUTION_TIME"));
    }

    #[test]
    fn test_render_empty_summary() {
        let summary = RunSummary::from_records(&records(&[0.001]), 5);
        let mut out = Vec::new();
        render_summary(&summary, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No iterations recorded."));
    }

    #[test]
    fn test_render_diff() {
        let baseline = RunSummary::from_records(&records(&[0.001, 0.001]), 0);
        let comparison = RunSummary::from_records(&records(&[0.002, 0.002]), 0);
        let diff = RunDiff::compare(&baseline, &comparison);

        let mut out = Vec::new();
        render_diff(&diff, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("+100.0%"));
        assert!(text.contains("Largest regression: TOTAL_RESPONSE_TIME"));
    }
}
