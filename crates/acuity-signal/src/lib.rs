//! acuity-signal: distance signal backends.
//!
//! Implements the `DistanceSignal` trait for fixed answers, scripted
//! sequences, and a remote HTTP detector, and loads the acuity configuration
//! that selects between them.

pub mod config;
pub mod error;
pub mod fixed;
pub mod http;

pub use config::{create_signal, load_config, AcuityConfig, SignalConfig};
pub use error::SignalError;
