use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use pullsim_engine::{CurvePoint, DistributionSummary, Estimator};
use serde::Serialize;
use std::io::Write;

use crate::budget::RoundRecord;
use crate::util::format_percentile;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileRow {
    pub percentile: f64,
    pub pulls: u64,
}

/// Everything a report renders, collected once after the schedule ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    pub generated_at: String,
    pub banner: String,
    pub goal: String,
    pub root_seed: u64,
    pub samples: u64,
    pub percentiles: Vec<PercentileRow>,
    pub summary: Option<DistributionSummary>,
    pub rounds: Vec<RoundRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<Vec<CurvePoint>>,
}

impl EstimateReport {
    pub fn collect(
        estimator: &Estimator,
        percentiles: &[f64],
        rounds: Vec<RoundRecord>,
        curve_points: Option<usize>,
    ) -> Result<Self> {
        let scenario = estimator.scenario();
        let pulls = estimator.query_quantiles(percentiles)?;
        let curve = curve_points.map(|n| estimator.curve(n)).transpose()?;
        Ok(Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            banner: scenario.banner().to_string(),
            goal: scenario.goal().to_string(),
            root_seed: estimator.root_seed(),
            samples: estimator.sample_count(),
            percentiles: percentiles
                .iter()
                .zip(pulls)
                .map(|(&percentile, pulls)| PercentileRow { percentile, pulls })
                .collect(),
            summary: estimator.summary(),
            rounds,
            curve,
        })
    }
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    report: &EstimateReport,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Pull Estimate".bright_cyan().bold())?;
    writeln!(writer, "{}", "================".cyan())?;
    writeln!(writer, "Banner: {}", report.banner.bold())?;
    writeln!(writer, "Goal: {}", report.goal.bold())?;
    writeln!(writer, "Samples: {}", report.samples.to_string().green())?;
    writeln!(writer, "Seed: {:#x}", report.root_seed)?;
    writeln!(writer)?;

    for row in &report.percentiles {
        writeln!(
            writer,
            "  {:>6}  {} pulls",
            format_percentile(row.percentile),
            row.pulls.to_string().bright_white().bold()
        )?;
    }

    if let Some(summary) = report.summary {
        writeln!(writer)?;
        writeln!(
            writer,
            "Min {} / Mean {:.1} / Max {}",
            summary.min, summary.mean, summary.max
        )?;
    }

    if !report.rounds.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "{}", "⚡ Batches".bright_yellow().bold())?;
        writeln!(writer, "{}", "=========".yellow())?;
        for round in &report.rounds {
            writeln!(
                writer,
                "  #{:<2} {:>9} trials  {:>6} ms  ({} total)",
                round.round + 1,
                round.batch,
                round.elapsed_ms,
                round.total_samples
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(writer: &mut W, report: &EstimateReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    report: &EstimateReport,
) -> Result<()> {
    writeln!(writer, "# Pull Estimate\n")?;
    writeln!(writer, "- **Banner**: `{}`", report.banner)?;
    writeln!(writer, "- **Goal**: {}", report.goal)?;
    writeln!(writer, "- **Samples**: {}", report.samples)?;
    writeln!(writer, "- **Seed**: `{:#x}`", report.root_seed)?;
    writeln!(writer, "- **Generated**: {}\n", report.generated_at)?;

    writeln!(writer, "## Percentiles\n")?;
    writeln!(writer, "| Percentile | Pulls |")?;
    writeln!(writer, "|-----------:|------:|")?;
    for row in &report.percentiles {
        writeln!(
            writer,
            "| {} | {} |",
            format_percentile(row.percentile),
            row.pulls
        )?;
    }

    if let Some(summary) = report.summary {
        writeln!(writer, "\n## Summary\n")?;
        writeln!(writer, "- **Min**: {}", summary.min)?;
        writeln!(writer, "- **Mean**: {:.2}", summary.mean)?;
        writeln!(writer, "- **Max**: {}", summary.max)?;
    }

    if !report.rounds.is_empty() {
        writeln!(writer, "\n## Batches\n")?;
        writeln!(writer, "| Round | Trials | Time (ms) | Total samples |")?;
        writeln!(writer, "|------:|-------:|----------:|--------------:|")?;
        for round in &report.rounds {
            writeln!(
                writer,
                "| {} | {} | {} | {} |",
                round.round + 1,
                round.batch,
                round.elapsed_ms,
                round.total_samples
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> EstimateReport {
        let estimator = Estimator::with_seed(0xABC);
        estimator.run_batch(400).unwrap();
        let rounds = vec![RoundRecord {
            round: 0,
            batch: 400,
            elapsed_ms: 3,
            total_samples: 400,
        }];
        EstimateReport::collect(&estimator, &[0.5, 0.9], rounds, Some(4)).unwrap()
    }

    #[test]
    fn collect_pairs_percentiles_with_pulls() {
        let report = sample_report();
        assert_eq!(report.samples, 400);
        assert_eq!(report.banner, "1/1/1/1 (3, 3)");
        assert_eq!(report.goal, "Any 5* x1");
        assert_eq!(report.percentiles.len(), 2);
        assert!(report.percentiles[0].pulls <= report.percentiles[1].pulls);
        assert_eq!(report.curve.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn collect_fails_without_samples() {
        let estimator = Estimator::with_seed(1);
        assert!(EstimateReport::collect(&estimator, &[0.5], Vec::new(), None).is_err());
    }

    #[test]
    fn json_report_is_parseable() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["samples"], 400);
        assert_eq!(value["percentiles"][0]["percentile"], 0.5);
        assert_eq!(value["rounds"][0]["batch"], 400);
    }

    #[test]
    fn markdown_report_has_tables() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &sample_report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("# Pull Estimate"));
        assert!(text.contains("| 50% |"));
        assert!(text.contains("## Batches"));
    }

    #[test]
    fn console_report_lists_percentiles() {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &sample_report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Goal: Any 5* x1"));
        assert!(text.contains("90%"));
        assert!(text.contains("Min "));
    }
}
