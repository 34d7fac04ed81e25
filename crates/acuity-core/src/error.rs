//! Engine error types.
//!
//! Every failure the progression engine can report is deterministic: the same
//! chart and the same sequence of calls always produce the same error. None of
//! them is fatal, a caller can always start a fresh session.

use thiserror::Error;

/// Errors reported by the chart model and the test engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcuityError {
    /// A requested or derived line index falls outside the chart.
    #[error("line index {index} out of bounds for chart with {line_count} lines")]
    InvalidLineIndex { index: usize, line_count: usize },

    /// The operation is not valid for the current session state.
    #[error("invalid session state: {0}")]
    InvalidSessionState(String),

    /// A chart line fails its invariants at load time.
    #[error("malformed chart definition at line {line}: {reason}")]
    MalformedChartDefinition { line: usize, reason: String },
}

impl AcuityError {
    /// Stable name of the error kind, suitable for structured responses.
    pub fn kind(&self) -> &'static str {
        match self {
            AcuityError::InvalidLineIndex { .. } => "InvalidLineIndex",
            AcuityError::InvalidSessionState(_) => "InvalidSessionState",
            AcuityError::MalformedChartDefinition { .. } => "MalformedChartDefinition",
        }
    }

    pub(crate) fn no_session() -> Self {
        AcuityError::InvalidSessionState("no active session, call start_session first".into())
    }

    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        AcuityError::MalformedChartDefinition {
            line,
            reason: reason.into(),
        }
    }
}
