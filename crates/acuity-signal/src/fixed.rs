//! In-process signals: a constant answer and a scripted sequence.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use acuity_core::traits::DistanceSignal;

/// A signal that always gives the same answer.
///
/// `FixedSignal::acceptable()` is the default when no detector is configured.
pub struct FixedSignal {
    name: &'static str,
    acceptable: bool,
    call_count: AtomicU32,
}

impl FixedSignal {
    pub fn new(acceptable: bool) -> Self {
        Self {
            name: "fixed",
            acceptable,
            call_count: AtomicU32::new(0),
        }
    }

    /// A signal that never blocks progression.
    pub fn acceptable() -> Self {
        Self {
            name: "always",
            ..Self::new(true)
        }
    }

    /// Get the number of times the signal was queried.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DistanceSignal for FixedSignal {
    fn name(&self) -> &str {
        self.name
    }

    async fn distance_ok(&self) -> anyhow::Result<bool> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.acceptable)
    }
}

/// A signal that replays a fixed sequence of readings, then repeats the last.
///
/// Useful for exercising distance gating without a camera.
pub struct ScriptedSignal {
    readings: Mutex<VecDeque<bool>>,
    last: Mutex<bool>,
    call_count: AtomicU32,
}

impl ScriptedSignal {
    pub fn new(readings: impl IntoIterator<Item = bool>) -> Self {
        let readings: VecDeque<bool> = readings.into_iter().collect();
        let last = readings.back().copied().unwrap_or(true);
        Self {
            readings: Mutex::new(readings),
            last: Mutex::new(last),
            call_count: AtomicU32::new(0),
        }
    }

    /// Get the number of times the signal was queried.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DistanceSignal for ScriptedSignal {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn distance_ok(&self) -> anyhow::Result<bool> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let next = self
            .readings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(reading) = next {
            *last = reading;
        }
        Ok(*last)
    }
}
