//! The `acuity chart` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::load_chart;

pub fn execute(chart_path: Option<PathBuf>) -> Result<()> {
    let chart = load_chart(chart_path.as_deref())?;

    println!("{} ({})", chart.name(), chart.id());
    if !chart.info().description.is_empty() {
        println!("{}", chart.info().description);
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Letters", "Acuity", "Required", "Level"]);
    for (i, line) in chart.lines().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(line.letters_str()),
            Cell::new(chart.label_for(line)),
            Cell::new(format!("{}/{}", line.required_correct, line.letter_count())),
            Cell::new(&line.level_label),
        ]);
    }

    println!("{table}");
    Ok(())
}
