//! Trait definitions for the collaborators the engine consumes.
//!
//! `DistanceSignal` is implemented by the `acuity-signal` crate.

use async_trait::async_trait;

/// Source of the "user is at an acceptable viewing distance" signal.
///
/// Implementations typically sit in front of a camera and face-landmark
/// pipeline. The engine never interprets geometry, only the boolean.
#[async_trait]
pub trait DistanceSignal: Send + Sync {
    /// Human-readable signal name (e.g. "http").
    fn name(&self) -> &str;

    /// Whether the user is currently at an acceptable distance.
    async fn distance_ok(&self) -> anyhow::Result<bool>;
}
