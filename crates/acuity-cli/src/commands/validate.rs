//! The `acuity validate` command.

use std::path::PathBuf;

use anyhow::Result;

use acuity_core::parser;

pub fn execute(chart_path: PathBuf) -> Result<()> {
    let files = parser::chart_files(&chart_path)?;
    anyhow::ensure!(
        !files.is_empty(),
        "no chart files found in {}",
        chart_path.display()
    );

    let mut total_warnings = 0;
    let mut invalid = 0;

    for file in &files {
        let chart = match parser::parse_chart(file) {
            Ok(chart) => chart,
            Err(e) => {
                println!("{}", file.display());
                println!("  ERROR: {e:#}");
                invalid += 1;
                continue;
            }
        };

        println!("Chart: {} ({} lines)", chart.name(), chart.len());

        let warnings = parser::validate_chart(&chart);
        for w in &warnings {
            let prefix = w
                .line
                .map(|line| format!("  [line {line}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} of {} chart file(s) are invalid", files.len());
    }

    if total_warnings == 0 {
        println!("All charts valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
