//! acuity-core: Chart model, test progression engine, and scoring.
//!
//! This crate defines the chart data model, the letter-by-letter progression
//! state machine, and the result types that the rest of acuity builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod session;
pub mod statistics;
pub mod traits;

pub use engine::{AcuityTestEngine, NoopReporter, ProgressReporter};
pub use error::AcuityError;
pub use model::{Chart, ChartInfo, ChartLine, ResponseRecord};
pub use session::{Prompt, ResponseOutcome, TestResults, TestSession, Transition};
