//! Per-line and overall statistics over a response log.

use serde::{Deserialize, Serialize};

use crate::model::{Chart, ResponseRecord};

/// How a line ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOutcome {
    Passed,
    Failed,
    /// Not every letter has been answered yet.
    InProgress,
}

/// Aggregated answers for one chart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStats {
    pub line_index: usize,
    pub acuity_label: String,
    pub level_label: String,
    pub letters_in_line: usize,
    pub attempts: u32,
    pub correct: u32,
    pub required_correct: u32,
    pub outcome: LineOutcome,
}

impl LineStats {
    /// Fraction of attempts answered correctly.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.correct as f64 / self.attempts as f64
    }
}

/// Group a response log by line, in chart order.
///
/// Only lines with at least one response appear. Responses pointing outside
/// the chart are ignored.
pub fn compute_line_stats(chart: &Chart, responses: &[ResponseRecord]) -> Vec<LineStats> {
    let mut stats: Vec<LineStats> = Vec::new();

    for record in responses {
        let Some(line) = chart.lines().get(record.line_index) else {
            tracing::warn!(
                line = record.line_index,
                "response refers to a line outside the chart"
            );
            continue;
        };

        let position = match stats.iter().position(|s| s.line_index == record.line_index) {
            Some(position) => position,
            None => {
                stats.push(LineStats {
                    line_index: record.line_index,
                    acuity_label: chart.label_for(line),
                    level_label: line.level_label.clone(),
                    letters_in_line: line.letter_count(),
                    attempts: 0,
                    correct: 0,
                    required_correct: line.required_correct,
                    outcome: LineOutcome::InProgress,
                });
                stats.len() - 1
            }
        };

        let entry = &mut stats[position];
        entry.attempts += 1;
        if record.is_correct {
            entry.correct += 1;
        }
    }

    for entry in &mut stats {
        entry.outcome = if (entry.attempts as usize) < entry.letters_in_line {
            LineOutcome::InProgress
        } else if entry.correct >= entry.required_correct {
            LineOutcome::Passed
        } else {
            LineOutcome::Failed
        };
    }

    stats.sort_by_key(|s| s.line_index);
    stats
}

/// Fraction of all responses that were correct.
pub fn overall_accuracy(responses: &[ResponseRecord]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let correct = responses.iter().filter(|r| r.is_correct).count();
    correct as f64 / responses.len() as f64
}

/// Index of the hardest line that was passed.
pub fn best_passed_line(stats: &[LineStats]) -> Option<usize> {
    stats
        .iter()
        .filter(|s| s.outcome == LineOutcome::Passed)
        .map(|s| s.line_index)
        .max()
}
