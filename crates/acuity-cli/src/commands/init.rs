//! The `acuity init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("acuity.toml").exists() {
        println!("acuity.toml already exists, skipping.");
    } else {
        std::fs::write("acuity.toml", SAMPLE_CONFIG)?;
        println!("Created acuity.toml");
    }

    std::fs::create_dir_all("charts")?;
    let example_path = std::path::Path::new("charts/example.toml");
    if example_path.exists() {
        println!("charts/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CHART)?;
        println!("Created charts/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit acuity.toml to point at your distance detector");
    println!("  2. Run: acuity validate --chart charts/example.toml");
    println!("  3. Run: acuity run --chart charts/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# acuity configuration

output_dir = "./acuity-results"
require_distance = true
distance_poll_interval_ms = 500

# Without a detector the distance is always acceptable.
[signal]
type = "always"

# [signal]
# type = "http"
# url = "${ACUITY_DETECTOR_URL}"
# timeout_secs = 5
"#;

const EXAMPLE_CHART: &str = r#"[chart]
id = "example-metric"
name = "Example Metric Chart"
description = "A short six-metre chart to get started"
numerator = 6

[[lines]]
letters = "E"
size = 60
required_correct = 1
level_label = "Level 1/4: Largest"

[[lines]]
letters = "TZ"
size = 36
required_correct = 1
level_label = "Level 2/4: Large"

[[lines]]
letters = "DFPO"
size = 12
required_correct = 3
level_label = "Level 3/4: Medium"

[[lines]]
letters = "LPEDCZ"
size = 6
required_correct = 4
level_label = "Level 4/4: Normal"
"#;
