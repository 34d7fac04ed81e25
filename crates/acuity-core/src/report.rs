//! Test report types with JSON persistence and baseline comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Chart, ResponseRecord};
use crate::session::{TestResults, TestSession};
use crate::statistics::{best_passed_line, compute_line_stats, overall_accuracy, LineStats};

/// A complete test report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// Session identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the chart used.
    pub chart: ChartSummary,
    /// Final (or provisional) acuity.
    pub final_acuity: Option<String>,
    pub complete: bool,
    pub provisional: bool,
    pub max_line_reached: usize,
    /// Every answer, in order.
    pub responses: Vec<ResponseRecord>,
    /// Per-line aggregates.
    pub line_stats: Vec<LineStats>,
    /// Fraction of all answers that were correct.
    pub overall_accuracy: f64,
    /// Wall-clock duration of the session in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a chart (without the line definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSummary {
    pub id: String,
    pub name: String,
    pub line_count: usize,
}

impl TestReport {
    /// Build a report from a session and the results it produced.
    pub fn from_session(chart: &Chart, session: &TestSession, results: &TestResults) -> Self {
        let created_at = Utc::now();
        let ended_at = session.completed_at().unwrap_or(created_at);
        let duration_ms = (ended_at - session.started_at())
            .num_milliseconds()
            .max(0) as u64;

        Self {
            id: session.id(),
            created_at,
            chart: ChartSummary {
                id: chart.id().to_string(),
                name: chart.name().to_string(),
                line_count: chart.len(),
            },
            final_acuity: results.final_acuity.clone(),
            complete: results.complete,
            provisional: results.provisional,
            max_line_reached: results.max_line_reached,
            responses: results.responses.clone(),
            line_stats: compute_line_stats(chart, &results.responses),
            overall_accuracy: overall_accuracy(&results.responses),
            duration_ms,
        }
    }

    /// Hardest line passed during the session.
    pub fn best_passed_line(&self) -> Option<usize> {
        best_passed_line(&self.line_stats)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: TestReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against an earlier baseline.
    pub fn compare(&self, baseline: &TestReport) -> AcuityComparison {
        if self.chart.id != baseline.chart.id {
            tracing::warn!(
                baseline = %baseline.chart.id,
                current = %self.chart.id,
                "comparing reports from different charts"
            );
        }

        let baseline_line = baseline.best_passed_line();
        let current_line = self.best_passed_line();
        let as_level = |line: Option<usize>| line.map_or(0, |l| l as i64 + 1);
        let line_delta = as_level(current_line) - as_level(baseline_line);

        let change = match line_delta {
            d if d > 0 => Change::Improved,
            d if d < 0 => Change::Declined,
            _ => Change::Unchanged,
        };

        AcuityComparison {
            baseline_acuity: baseline.final_acuity.clone(),
            current_acuity: self.final_acuity.clone(),
            baseline_best_line: baseline_line,
            current_best_line: current_line,
            line_delta,
            change,
            same_chart: self.chart.id == baseline.chart.id,
        }
    }
}

/// Direction of change between two reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Improved,
    Declined,
    Unchanged,
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcuityComparison {
    pub baseline_acuity: Option<String>,
    pub current_acuity: Option<String>,
    pub baseline_best_line: Option<usize>,
    pub current_best_line: Option<usize>,
    /// Passed levels gained (positive) or lost (negative).
    pub line_delta: i64,
    pub change: Change,
    pub same_chart: bool,
}

impl AcuityComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let show = |acuity: &Option<String>| acuity.clone().unwrap_or_else(|| "-".into());

        md.push_str(&format!(
            "**Summary:** {} ({:+} lines)\n\n",
            self.change_label(),
            self.line_delta
        ));
        md.push_str("| | Acuity | Best line |\n");
        md.push_str("|---|--------|-----------|\n");
        md.push_str(&format!(
            "| Baseline | {} | {} |\n",
            show(&self.baseline_acuity),
            level(self.baseline_best_line)
        ));
        md.push_str(&format!(
            "| Current | {} | {} |\n",
            show(&self.current_acuity),
            level(self.current_best_line)
        ));

        if !self.same_chart {
            md.push_str("\n_Reports were taken on different charts._\n");
        }

        md
    }

    pub fn change_label(&self) -> &'static str {
        match self.change {
            Change::Improved => "improved",
            Change::Declined => "declined",
            Change::Unchanged => "unchanged",
        }
    }

    pub fn has_decline(&self) -> bool {
        self.change == Change::Declined
    }
}

fn level(line: Option<usize>) -> String {
    line.map_or_else(|| "none".to_string(), |l| format!("level {}", l + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_for(answers: &[&str]) -> TestReport {
        let chart = Chart::standard();
        let mut session = TestSession::new();
        for answer in answers {
            session.submit(&chart, answer).unwrap();
        }
        let results = session.results(&chart);
        TestReport::from_session(&chart, &session, &results)
    }

    #[test]
    fn report_from_completed_session() {
        let report = report_for(&["E", "F", "P", "x", "x", "x"]);
        assert!(report.complete);
        assert!(!report.provisional);
        assert_eq!(report.final_acuity.as_deref(), Some("20/100"));
        assert_eq!(report.chart.id, "snellen");
        assert_eq!(report.chart.line_count, 8);
        assert_eq!(report.responses.len(), 6);
        assert_eq!(report.line_stats.len(), 3);
        assert_eq!(report.best_passed_line(), Some(1));
    }

    #[test]
    fn report_from_unfinished_session_is_provisional() {
        let report = report_for(&["E", "F"]);
        assert!(!report.complete);
        assert!(report.provisional);
        assert_eq!(report.final_acuity.as_deref(), Some("20/200"));
    }

    #[test]
    fn compare_detects_improvement_and_decline() {
        let baseline = report_for(&["E", "F", "P", "x", "x", "x"]);
        let current = report_for(&["E", "F", "P", "T", "O", "Z", "x", "x", "x", "x"]);

        let comparison = current.compare(&baseline);
        assert_eq!(comparison.change, Change::Improved);
        assert_eq!(comparison.line_delta, 1);
        assert!(comparison.same_chart);

        let reverse = baseline.compare(&current);
        assert_eq!(reverse.change, Change::Declined);
        assert!(reverse.has_decline());
    }

    #[test]
    fn compare_identical_reports() {
        let report = report_for(&["E", "x", "x"]);
        let comparison = report.compare(&report.clone());
        assert_eq!(comparison.change, Change::Unchanged);
        assert_eq!(comparison.line_delta, 0);
    }

    #[test]
    fn json_roundtrip() {
        let report = report_for(&["E", "F", "P"]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = TestReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.responses, report.responses);
        assert_eq!(loaded.final_acuity, report.final_acuity);
    }

    #[test]
    fn markdown_output() {
        let baseline = report_for(&["x"]);
        let current = report_for(&["E", "F", "P", "x", "x", "x"]);
        let md = current.compare(&baseline).to_markdown();
        assert!(md.contains("improved"));
        assert!(md.contains("Worse than 20/200"));
        assert!(md.contains("20/100"));
        assert!(md.contains("level 2"));
    }
}
