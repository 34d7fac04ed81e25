//! Core data model types for acuity.
//!
//! A [`Chart`] is the immutable, validated catalogue of chart lines ordered
//! from easiest (largest letters) to hardest. Session state never lives here.

use serde::{Deserialize, Serialize};

use crate::error::AcuityError;

/// One line of an eye chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartLine {
    /// Letters presented one at a time, in order.
    pub letters: Vec<char>,
    /// Acuity denominator: the line reads as "numerator/size".
    pub size: u32,
    /// Correct answers needed within this line to pass it.
    pub required_correct: u32,
    /// Human-readable descriptor (e.g. "Level 5/8: Medium").
    pub level_label: String,
}

impl ChartLine {
    pub fn new(letters: &str, size: u32, required_correct: u32, level_label: &str) -> Self {
        Self {
            letters: letters.chars().collect(),
            size,
            required_correct,
            level_label: level_label.to_string(),
        }
    }

    /// Number of letters on the line.
    pub fn letter_count(&self) -> usize {
        self.letters.len()
    }

    pub fn letter_at(&self, index: usize) -> Option<char> {
        self.letters.get(index).copied()
    }

    /// The whole line as a string.
    pub fn letters_str(&self) -> String {
        self.letters.iter().collect()
    }
}

/// Descriptive header of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartInfo {
    /// Unique identifier for this chart.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Test distance in the notation (20 for feet, 6 for metres).
    #[serde(default = "default_numerator")]
    pub numerator: u32,
}

pub(crate) fn default_numerator() -> u32 {
    20
}

impl ChartInfo {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            numerator: default_numerator(),
        }
    }
}

/// A validated eye chart.
///
/// Lines are ordered easiest first and sizes strictly decrease with the index.
/// A `Chart` can only be obtained through [`Chart::new`] or [`Chart::standard`],
/// so every instance upholds these invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    info: ChartInfo,
    lines: Vec<ChartLine>,
}

impl Chart {
    /// Build a chart, validating every line.
    ///
    /// Fails with [`AcuityError::MalformedChartDefinition`] naming the first
    /// offending line.
    pub fn new(info: ChartInfo, lines: Vec<ChartLine>) -> Result<Self, AcuityError> {
        if info.numerator == 0 {
            return Err(AcuityError::malformed(0, "notation numerator must be positive"));
        }
        validate_lines(&lines)?;
        Ok(Self { info, lines })
    }

    /// The eight-line Snellen chart used when no chart file is given.
    pub fn standard() -> Self {
        Self {
            info: ChartInfo {
                id: "snellen".into(),
                name: "Snellen".into(),
                description: "Standard eight-line Snellen chart, 20/200 to 20/15".into(),
                numerator: default_numerator(),
            },
            lines: standard_lines(),
        }
    }

    pub fn info(&self) -> &ChartInfo {
        &self.info
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn lines(&self) -> &[ChartLine] {
        &self.lines
    }

    /// Number of lines (levels) on the chart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false for a validated chart.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Result<&ChartLine, AcuityError> {
        self.lines.get(index).ok_or(AcuityError::InvalidLineIndex {
            index,
            line_count: self.lines.len(),
        })
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.lines.len()
    }

    /// Acuity label for the given line, e.g. "20/40".
    pub fn acuity_label(&self, index: usize) -> Result<String, AcuityError> {
        let line = self.line(index)?;
        Ok(self.label_for(line))
    }

    pub fn label_for(&self, line: &ChartLine) -> String {
        format!("{}/{}", self.info.numerator, line.size)
    }

    /// Label of the hardest line, awarded when every line is passed.
    pub fn best_label(&self) -> String {
        self.lines
            .last()
            .map(|line| self.label_for(line))
            .unwrap_or_default()
    }

    /// Result reported when not even the easiest line could be read.
    pub fn worse_than_easiest(&self) -> String {
        match self.lines.first() {
            Some(line) => format!("Worse than {}", self.label_for(line)),
            None => "Worse than the easiest line".to_string(),
        }
    }
}

/// Check the structural invariants of a sequence of chart lines.
pub fn validate_lines(lines: &[ChartLine]) -> Result<(), AcuityError> {
    if lines.is_empty() {
        return Err(AcuityError::malformed(0, "chart has no lines"));
    }

    for (i, line) in lines.iter().enumerate() {
        if line.letters.is_empty() {
            return Err(AcuityError::malformed(i, "line has no letters"));
        }
        if line.size == 0 {
            return Err(AcuityError::malformed(i, "size must be positive"));
        }
        if line.required_correct as usize > line.letters.len() {
            return Err(AcuityError::malformed(
                i,
                format!(
                    "required_correct ({}) exceeds letter count ({})",
                    line.required_correct,
                    line.letters.len()
                ),
            ));
        }
        if i > 0 && line.size >= lines[i - 1].size {
            return Err(AcuityError::malformed(
                i,
                format!(
                    "size {} does not decrease from previous line size {}",
                    line.size,
                    lines[i - 1].size
                ),
            ));
        }
    }

    Ok(())
}

fn standard_lines() -> Vec<ChartLine> {
    vec![
        ChartLine::new("E", 200, 1, "Level 1/8: Largest"),
        ChartLine::new("FP", 100, 1, "Level 2/8: Very Large"),
        ChartLine::new("TOZ", 70, 2, "Level 3/8: Large"),
        ChartLine::new("LPED", 50, 2, "Level 4/8: Medium-Large"),
        ChartLine::new("PECFD", 40, 3, "Level 5/8: Medium"),
        ChartLine::new("EDFCZP", 30, 3, "Level 6/8: Small"),
        ChartLine::new("DEFPOTEC", 20, 4, "Level 7/8: Very Small"),
        ChartLine::new("FELOPZD", 15, 4, "Level 8/8: Smallest"),
    ]
}

/// A single recorded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub line_index: usize,
    pub letter_index: usize,
    pub expected_letter: char,
    /// The answer as the user typed it.
    pub user_response: String,
    pub is_correct: bool,
    /// Acuity label of the line the letter belongs to.
    pub acuity_label: String,
}
