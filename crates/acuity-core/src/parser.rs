//! TOML chart parser.
//!
//! Loads charts from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{default_numerator, Chart, ChartInfo, ChartLine};

/// Intermediate TOML structure for parsing chart files.
#[derive(Debug, Deserialize)]
struct TomlChartFile {
    chart: TomlChartHeader,
    #[serde(default)]
    lines: Vec<TomlChartLine>,
}

#[derive(Debug, Deserialize)]
struct TomlChartHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_numerator")]
    numerator: u32,
}

#[derive(Debug, Deserialize)]
struct TomlChartLine {
    letters: String,
    size: u32,
    required_correct: u32,
    #[serde(default)]
    level_label: Option<String>,
}

/// Parse a single TOML file into a `Chart`.
pub fn parse_chart(path: &Path) -> Result<Chart> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read chart file: {}", path.display()))?;

    parse_chart_str(&content, path)
}

/// Parse a TOML string into a `Chart` (useful for testing).
pub fn parse_chart_str(content: &str, source_path: &Path) -> Result<Chart> {
    let parsed: TomlChartFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let total = parsed.lines.len();
    let lines = parsed
        .lines
        .into_iter()
        .enumerate()
        .map(|(i, l)| ChartLine {
            letters: l.letters.chars().collect(),
            size: l.size,
            required_correct: l.required_correct,
            level_label: l
                .level_label
                .unwrap_or_else(|| format!("Level {}/{}", i + 1, total)),
        })
        .collect();

    let info = ChartInfo {
        id: parsed.chart.id,
        name: parsed.chart.name,
        description: parsed.chart.description,
        numerator: parsed.chart.numerator,
    };

    Chart::new(info, lines).with_context(|| format!("invalid chart: {}", source_path.display()))
}

/// Recursively load all `.toml` chart files from a directory.
///
/// Files that fail to parse are skipped with a warning; use [`chart_files`]
/// and [`parse_chart`] to see every failure.
pub fn load_chart_directory(dir: &Path) -> Result<Vec<Chart>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut charts = Vec::new();
    for path in chart_files(dir)? {
        match parse_chart(&path) {
            Ok(chart) => charts.push(chart),
            Err(e) => {
                tracing::warn!("skipping {}: {:#}", path.display(), e);
            }
        }
    }

    charts.sort_by(|a, b| a.id().cmp(b.id()));
    Ok(charts)
}

/// Chart files under `path`: the file itself, or every `.toml` file below a
/// directory, sorted by path.
pub fn chart_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
    {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            files.extend(chart_files(&entry_path)?);
        } else if entry_path.extension().is_some_and(|ext| ext == "toml") {
            files.push(entry_path);
        }
    }

    files.sort();
    Ok(files)
}

/// Load a chart file, or every chart in a directory.
pub fn load_charts(path: &Path) -> Result<Vec<Chart>> {
    if path.is_dir() {
        load_chart_directory(path)
    } else {
        Ok(vec![parse_chart(path)?])
    }
}

/// A warning from chart validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The line index (if applicable).
    pub line: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Check a chart for issues that are legal but probably unintended.
pub fn validate_chart(chart: &Chart) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (i, line) in chart.lines().iter().enumerate() {
        if line.required_correct == 0 {
            warnings.push(ValidationWarning {
                line: Some(i),
                message: "required_correct is 0, the line passes without a correct answer".into(),
            });
        }
        if line.letters.iter().any(|c| c.is_lowercase()) {
            warnings.push(ValidationWarning {
                line: Some(i),
                message: format!(
                    "letters '{}' contain lowercase characters",
                    line.letters_str()
                ),
            });
        }
        if line.letters.iter().any(|c| c.is_whitespace()) {
            warnings.push(ValidationWarning {
                line: Some(i),
                message: "letters contain whitespace, which can never be answered".into(),
            });
        }
    }

    let mut seen_labels = HashSet::new();
    for (i, line) in chart.lines().iter().enumerate() {
        if !seen_labels.insert(line.level_label.as_str()) {
            warnings.push(ValidationWarning {
                line: Some(i),
                message: format!("duplicate level label: {}", line.level_label),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TOML: &str = r#"
[chart]
id = "short"
name = "Short Chart"
description = "Three lines for quick checks"

[[lines]]
letters = "E"
size = 200
required_correct = 1
level_label = "Level 1/3: Largest"

[[lines]]
letters = "FP"
size = 100
required_correct = 1

[[lines]]
letters = "TOZ"
size = 70
required_correct = 2
"#;

    #[test]
    fn parse_valid_toml() {
        let chart = parse_chart_str(VALID_TOML, &PathBuf::from("short.toml")).unwrap();
        assert_eq!(chart.id(), "short");
        assert_eq!(chart.name(), "Short Chart");
        assert_eq!(chart.len(), 3);
        assert_eq!(chart.info().numerator, 20);
        assert_eq!(chart.lines()[0].level_label, "Level 1/3: Largest");
        assert_eq!(chart.lines()[1].level_label, "Level 2/3");
        assert_eq!(chart.lines()[2].letters, vec!['T', 'O', 'Z']);
    }

    #[test]
    fn parse_rejects_required_above_letters() {
        let toml = r#"
[chart]
id = "bad"
name = "Bad"

[[lines]]
letters = "FP"
size = 100
required_correct = 3
"#;
        let err = parse_chart_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("invalid chart"));
        assert!(message.contains("exceeds letter count"));
    }

    #[test]
    fn parse_rejects_increasing_size() {
        let toml = r#"
[chart]
id = "bad"
name = "Bad"

[[lines]]
letters = "E"
size = 100
required_correct = 1

[[lines]]
letters = "FP"
size = 200
required_correct = 1
"#;
        let err = parse_chart_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("does not decrease"));
    }

    #[test]
    fn parse_rejects_chart_without_lines() {
        let toml = r#"
[chart]
id = "empty"
name = "Empty"
"#;
        let err = parse_chart_str(toml, &PathBuf::from("empty.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("no lines"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_chart_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_flags_soft_issues() {
        let toml = r#"
[chart]
id = "odd"
name = "Odd"

[[lines]]
letters = "e"
size = 200
required_correct = 0
level_label = "Same"

[[lines]]
letters = "F P"
size = 100
required_correct = 1
level_label = "Same"
"#;
        let chart = parse_chart_str(toml, &PathBuf::from("odd.toml")).unwrap();
        let warnings = validate_chart(&chart);
        assert!(warnings.iter().any(|w| w.message.contains("required_correct is 0")));
        assert!(warnings.iter().any(|w| w.message.contains("lowercase")));
        assert!(warnings.iter().any(|w| w.message.contains("whitespace")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("duplicate level label") && w.line == Some(1)));
    }

    #[test]
    fn standard_chart_has_no_warnings() {
        assert!(validate_chart(&Chart::standard()).is_empty());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("short.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not [ toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let charts = load_chart_directory(dir.path()).unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].id(), "short");
    }

    #[test]
    fn chart_files_lists_every_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("nested").join("a.toml"), "not [ toml").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = chart_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("b.toml"), dir.path().join("nested").join("a.toml")]
        );

        let single = dir.path().join("b.toml");
        assert_eq!(chart_files(&single).unwrap(), vec![single.clone()]);
    }

    #[test]
    fn load_charts_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.toml");
        std::fs::write(&path, VALID_TOML).unwrap();

        let charts = load_charts(&path).unwrap();
        assert_eq!(charts.len(), 1);
        assert!(load_charts(&dir.path().join("missing.toml")).is_err());
    }
}
