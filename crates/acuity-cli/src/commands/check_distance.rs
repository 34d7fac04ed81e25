//! The `acuity check-distance` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use acuity_signal::config::load_config_from;
use acuity_signal::create_signal;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let signal = create_signal(&config.signal)?;

    let ok = signal
        .distance_ok()
        .await
        .with_context(|| format!("signal '{}' failed", signal.name()))?;

    println!("Signal: {}", signal.name());
    if ok {
        println!("Distance: acceptable");
    } else {
        println!("Distance: not acceptable");
    }

    Ok(())
}
