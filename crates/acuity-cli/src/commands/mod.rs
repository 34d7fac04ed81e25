pub mod chart;
pub mod check_distance;
pub mod compare;
pub mod init;
pub mod report;
pub mod run;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use acuity_core::model::Chart;
use acuity_core::parser;

/// Load the chart at `path`, or the built-in Snellen chart.
pub(crate) fn load_chart(path: Option<&Path>) -> Result<Chart> {
    match path {
        Some(path) => parser::parse_chart(path),
        None => Ok(Chart::standard()),
    }
}
