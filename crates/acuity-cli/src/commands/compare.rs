//! The `acuity compare` command.

use std::path::PathBuf;

use anyhow::Result;

use acuity_core::report::TestReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    fail_on_decline: bool,
    format: String,
) -> Result<()> {
    let baseline = TestReport::load_json(&baseline_path)?;
    let current = TestReport::load_json(&current_path)?;

    let comparison = current.compare(&baseline);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", comparison.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => {
            let show = |acuity: &Option<String>| acuity.clone().unwrap_or_else(|| "-".into());
            println!(
                "Comparison: {} ({:+} lines)",
                comparison.change_label(),
                comparison.line_delta
            );
            println!("  Baseline: {}", show(&comparison.baseline_acuity));
            println!("  Current:  {}", show(&comparison.current_acuity));
            if !comparison.same_chart {
                println!("\nWarning: reports were taken on different charts.");
            }
        }
    }

    if fail_on_decline && comparison.has_decline() {
        std::process::exit(1);
    }

    Ok(())
}
