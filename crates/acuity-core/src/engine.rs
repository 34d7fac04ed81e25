//! Central test engine.
//!
//! Owns the chart and the single active session. Every mutation goes through
//! one mutex, so concurrent submissions are applied strictly one at a time and
//! each line transition happens exactly once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::error::AcuityError;
use crate::model::{Chart, ResponseRecord};
use crate::session::{Prompt, ResponseOutcome, TestResults, TestSession, Transition};
use crate::traits::DistanceSignal;

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_session_start(&self, session_id: Uuid);
    fn on_response(&self, record: &ResponseRecord);
    fn on_line_advance(&self, from: usize, to: usize);
    fn on_complete(&self, final_acuity: &str);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_session_start(&self, _: Uuid) {}
    fn on_response(&self, _: &ResponseRecord) {}
    fn on_line_advance(&self, _: usize, _: usize) {}
    fn on_complete(&self, _: &str) {}
}

/// The acuity test engine.
pub struct AcuityTestEngine {
    chart: Arc<Chart>,
    session: Mutex<Option<TestSession>>,
    reporter: Arc<dyn ProgressReporter>,
    signal: Option<Arc<dyn DistanceSignal>>,
}

impl AcuityTestEngine {
    pub fn new(chart: Arc<Chart>) -> Self {
        Self {
            chart,
            session: Mutex::new(None),
            reporter: Arc::new(NoopReporter),
            signal: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Gate progression on a distance signal.
    pub fn with_distance_signal(mut self, signal: Arc<dyn DistanceSignal>) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Start a fresh session, discarding any previous one.
    pub fn start_session(&self) -> TestSession {
        let session = TestSession::new();
        let previous = self.lock().replace(session.clone());
        if let Some(previous) = previous {
            tracing::debug!(
                discarded = %previous.id(),
                responses = previous.responses().len(),
                "replacing active session"
            );
        }
        tracing::info!(session = %session.id(), chart = self.chart.id(), "session started");
        self.reporter.on_session_start(session.id());
        session
    }

    /// The letter currently due, or the completion marker.
    pub fn current_prompt(&self) -> Result<Prompt, AcuityError> {
        let guard = self.lock();
        let session = guard.as_ref().ok_or_else(AcuityError::no_session)?;
        session.prompt(&self.chart)
    }

    /// Like [`current_prompt`](Self::current_prompt), with the caller's idea of
    /// the current line.
    ///
    /// The hint is validated against the chart but never overrides the
    /// session's own line.
    pub fn get_current_prompt(&self, line_index: Option<usize>) -> Result<Prompt, AcuityError> {
        let guard = self.lock();
        let session = guard.as_ref().ok_or_else(AcuityError::no_session)?;

        if let Some(hint) = line_index {
            if hint >= self.chart.len() {
                return Err(AcuityError::InvalidLineIndex {
                    index: hint,
                    line_count: self.chart.len(),
                });
            }
            if hint != session.current_line_index() {
                tracing::warn!(
                    requested = hint,
                    actual = session.current_line_index(),
                    "line hint does not match session, serving the session's line"
                );
            }
        }

        session.prompt(&self.chart)
    }

    /// Score an answer for the current letter and advance the session.
    pub fn submit_response(&self, answer: &str) -> Result<ResponseOutcome, AcuityError> {
        let (outcome, record) = {
            let mut guard = self.lock();
            let session = guard.as_mut().ok_or_else(AcuityError::no_session)?;
            let outcome = session.submit(&self.chart, answer)?;
            let record = session
                .responses()
                .last()
                .cloned()
                .ok_or_else(|| AcuityError::InvalidSessionState("response was not recorded".into()))?;
            (outcome, record)
        };

        self.reporter.on_response(&record);
        match &outcome.transition {
            Transition::NextLetter => {}
            Transition::NextLine { from, to } => {
                tracing::info!(from, to, "line passed");
                self.reporter.on_line_advance(*from, *to);
            }
            Transition::Completed { reason } => {
                let acuity = outcome.final_acuity.as_deref().unwrap_or_default();
                tracing::info!(?reason, acuity, "session complete");
                self.reporter.on_complete(acuity);
            }
        }

        Ok(outcome)
    }

    /// Cumulative results of the active session.
    pub fn get_results(&self) -> Result<TestResults, AcuityError> {
        let guard = self.lock();
        let session = guard.as_ref().ok_or_else(AcuityError::no_session)?;
        Ok(session.results(&self.chart))
    }

    /// A copy of the active session's state.
    pub fn session_snapshot(&self) -> Result<TestSession, AcuityError> {
        self.lock().clone().ok_or_else(AcuityError::no_session)
    }

    /// Ask the distance signal whether the user may proceed.
    ///
    /// Without a configured signal the distance is always acceptable. The
    /// session lock is not held while the signal is queried.
    pub async fn check_distance(&self) -> anyhow::Result<bool> {
        let Some(signal) = &self.signal else {
            return Ok(true);
        };
        let ok = signal.distance_ok().await?;
        tracing::debug!(signal = signal.name(), ok, "distance checked");
        Ok(ok)
    }

    fn lock(&self) -> MutexGuard<'_, Option<TestSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
