//! Test progression state machine.
//!
//! A [`TestSession`] walks a [`Chart`] one letter at a time. Each submitted
//! answer is scored, logged, and may end the line: a passed line advances to
//! the next (harder) line, a failed line completes the session with the
//! acuity of the previous line.
//!
//! ```text
//! NotStarted --start--> InProgress(line, letter) --submit--> InProgress | Complete
//! ```
//!
//! Sessions never mutate the chart. All per-line counters live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AcuityError;
use crate::model::{Chart, ResponseRecord};

/// Mutable state of one test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    current_line_index: usize,
    current_letter_index: usize,
    correct_count_for_line: u32,
    attempts_for_line: u32,
    responses: Vec<ResponseRecord>,
    max_line_reached: usize,
    complete: bool,
    final_acuity: Option<String>,
}

/// What the caller should present next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Prompt {
    /// A single letter is due.
    Letter(LetterPrompt),
    /// The session is over.
    Complete { final_acuity: String },
}

/// The letter currently due, with display metadata for its line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterPrompt {
    pub letter: char,
    pub acuity_label: String,
    pub is_last_line: bool,
    pub letter_index_in_line: usize,
    pub total_letters_in_line: usize,
    pub level_label: String,
    /// 1-based level number.
    pub current_level: usize,
    pub total_levels: usize,
}

/// State change performed by a single submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    /// Letters remain on the current line.
    NextLetter,
    /// The line was passed and the next line is now active.
    NextLine { from: usize, to: usize },
    /// The session finished.
    Completed { reason: CompletionReason },
}

/// Why a session completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionReason {
    /// The hardest line was passed.
    ChartFinished,
    /// Too few correct answers on `line`.
    LineFailed { line: usize },
}

/// Result of submitting one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOutcome {
    pub is_correct: bool,
    pub expected_letter: char,
    pub complete: bool,
    pub final_acuity: Option<String>,
    pub advances_to_next_letter: bool,
    pub advances_to_next_line: bool,
    pub transition: Transition,
}

/// Cumulative results of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    /// Final acuity, or a provisional one while the session is in progress.
    pub final_acuity: Option<String>,
    pub responses: Vec<ResponseRecord>,
    pub complete: bool,
    pub max_line_reached: usize,
    /// True when `final_acuity` was estimated from an unfinished session.
    pub provisional: bool,
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSession {
    /// A fresh session positioned on the first letter of the easiest line.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            completed_at: None,
            current_line_index: 0,
            current_letter_index: 0,
            correct_count_for_line: 0,
            attempts_for_line: 0,
            responses: Vec::new(),
            max_line_reached: 0,
            complete: false,
            final_acuity: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn current_line_index(&self) -> usize {
        self.current_line_index
    }

    pub fn current_letter_index(&self) -> usize {
        self.current_letter_index
    }

    pub fn correct_count_for_line(&self) -> u32 {
        self.correct_count_for_line
    }

    pub fn attempts_for_line(&self) -> u32 {
        self.attempts_for_line
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        &self.responses
    }

    pub fn max_line_reached(&self) -> usize {
        self.max_line_reached
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn final_acuity(&self) -> Option<&str> {
        self.final_acuity.as_deref()
    }

    /// The letter currently due, or the completion marker.
    ///
    /// Pure read: calling it repeatedly returns the same prompt.
    pub fn prompt(&self, chart: &Chart) -> Result<Prompt, AcuityError> {
        let line = chart.line(self.current_line_index)?;

        if self.complete {
            return Ok(Prompt::Complete {
                final_acuity: self.final_acuity.clone().unwrap_or_default(),
            });
        }

        let letter = line.letter_at(self.current_letter_index).ok_or_else(|| {
            AcuityError::InvalidSessionState(format!(
                "no letter at index {} on line {}",
                self.current_letter_index, self.current_line_index
            ))
        })?;

        Ok(Prompt::Letter(LetterPrompt {
            letter,
            acuity_label: chart.label_for(line),
            is_last_line: chart.is_last(self.current_line_index),
            letter_index_in_line: self.current_letter_index,
            total_letters_in_line: line.letter_count(),
            level_label: line.level_label.clone(),
            current_level: self.current_line_index + 1,
            total_levels: chart.len(),
        }))
    }

    /// Score `answer` against the current letter and advance the state machine.
    pub fn submit(&mut self, chart: &Chart, answer: &str) -> Result<ResponseOutcome, AcuityError> {
        if self.complete {
            return Err(AcuityError::InvalidSessionState(
                "session already complete, start a new session".into(),
            ));
        }

        let line_index = self.current_line_index;
        let line = chart.line(line_index)?;
        let letter_index = self.current_letter_index;
        let expected = line.letter_at(letter_index).ok_or_else(|| {
            AcuityError::InvalidSessionState(format!(
                "no letter at index {letter_index} on line {line_index}"
            ))
        })?;

        let is_correct = answers_match(answer, expected);
        self.attempts_for_line += 1;
        if is_correct {
            self.correct_count_for_line += 1;
        }

        self.responses.push(ResponseRecord {
            line_index,
            letter_index,
            expected_letter: expected,
            user_response: answer.trim().to_string(),
            is_correct,
            acuity_label: chart.label_for(line),
        });

        self.current_letter_index += 1;

        let transition = if self.current_letter_index < line.letter_count() {
            Transition::NextLetter
        } else if self.correct_count_for_line >= line.required_correct {
            if chart.is_last(line_index) {
                self.finish(chart.best_label(), CompletionReason::ChartFinished)
            } else {
                self.advance_to(line_index + 1)
            }
        } else {
            let acuity = if line_index > 0 {
                chart.acuity_label(line_index - 1)?
            } else {
                chart.worse_than_easiest()
            };
            self.finish(acuity, CompletionReason::LineFailed { line: line_index })
        };

        tracing::debug!(
            session = %self.id,
            line = line_index,
            letter = letter_index,
            is_correct,
            ?transition,
            "response recorded"
        );

        Ok(ResponseOutcome {
            is_correct,
            expected_letter: expected,
            complete: self.complete,
            final_acuity: self.final_acuity.clone(),
            advances_to_next_letter: matches!(transition, Transition::NextLetter),
            advances_to_next_line: matches!(transition, Transition::NextLine { .. }),
            transition,
        })
    }

    /// Cumulative results.
    ///
    /// An unfinished session with at least one response gets a provisional
    /// acuity: the label of the last line actually passed, or the
    /// "worse than" sentinel when no line has been passed yet. This never
    /// completes the session.
    pub fn results(&self, chart: &Chart) -> TestResults {
        let (final_acuity, provisional) = if self.complete {
            (self.final_acuity.clone(), false)
        } else if self.responses.is_empty() {
            (None, false)
        } else {
            (Some(self.provisional_acuity(chart)), true)
        };

        TestResults {
            final_acuity,
            responses: self.responses.clone(),
            complete: self.complete,
            max_line_reached: self.max_line_reached,
            provisional,
        }
    }

    fn provisional_acuity(&self, chart: &Chart) -> String {
        self.max_line_reached
            .checked_sub(1)
            .and_then(|passed| chart.lines().get(passed))
            .map(|line| chart.label_for(line))
            .unwrap_or_else(|| chart.worse_than_easiest())
    }

    fn advance_to(&mut self, next: usize) -> Transition {
        let from = self.current_line_index;
        self.current_line_index = next;
        self.current_letter_index = 0;
        self.correct_count_for_line = 0;
        self.attempts_for_line = 0;
        self.max_line_reached = self.max_line_reached.max(next);
        Transition::NextLine { from, to: next }
    }

    fn finish(&mut self, acuity: String, reason: CompletionReason) -> Transition {
        self.complete = true;
        self.final_acuity = Some(acuity);
        self.completed_at = Some(Utc::now());
        Transition::Completed { reason }
    }
}

/// Compare an answer with the expected letter, ignoring case and surrounding
/// whitespace. Anything other than exactly one character is wrong.
pub fn answers_match(answer: &str, expected: char) -> bool {
    let mut chars = answer.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().eq(expected.to_lowercase()),
        _ => false,
    }
}
