//! The `acuity report` command.

use std::path::PathBuf;

use anyhow::Result;

use acuity_core::report::TestReport;
use acuity_report::html::write_html_report;

pub fn execute(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let report = TestReport::load_json(&input)?;
    let output = output.unwrap_or_else(|| input.with_extension("html"));

    write_html_report(&report, &output)?;
    println!("HTML report: {}", output.display());

    Ok(())
}
