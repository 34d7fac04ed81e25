//! Distance signal error types.

use thiserror::Error;

/// Errors that can occur when querying a distance signal.
#[derive(Debug, Error)]
pub enum SignalError {
    /// The detector did not answer in time.
    #[error("distance detector timed out after {0}s")]
    Timeout(u64),

    /// The detector could not be reached.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The detector answered with an error status.
    #[error("detector error (HTTP {status}): {message}")]
    DetectorError { status: u16, message: String },

    /// The detector's answer could not be decoded.
    #[error("invalid detector response: {0}")]
    InvalidResponse(String),

    /// The signal configuration is unusable.
    #[error("invalid signal configuration: {0}")]
    InvalidConfig(String),
}

impl SignalError {
    /// Returns `true` if asking again later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SignalError::Timeout(_) | SignalError::NetworkError(_)
        ) || matches!(self, SignalError::DetectorError { status, .. } if *status >= 500)
    }
}
