//! acuity-report: report generation.
//!
//! Renders test reports as self-contained HTML pages.

pub mod html;
