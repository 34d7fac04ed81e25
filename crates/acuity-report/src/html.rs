//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use acuity_core::report::TestReport;
use acuity_core::statistics::{LineOutcome, LineStats};

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from a test report.
pub fn generate_html(report: &TestReport) -> String {
    let mut html = String::new();
    let acuity = report.final_acuity.as_deref().unwrap_or("-");

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>acuity report: {}</title>\n",
        html_escape(&report.chart.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>acuity report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Chart: <strong>{}</strong> | {} lines | session {} | {}</p>\n",
        html_escape(&report.chart.name),
        report.chart.line_count,
        report.id,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    let status = if report.complete {
        "complete"
    } else {
        "incomplete"
    };
    html.push_str(&format!(
        "<p class=\"acuity\">{}{}</p>\n",
        html_escape(acuity),
        if report.provisional {
            " <span class=\"badge\">provisional</span>"
        } else {
            ""
        }
    ));
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<tbody>\n");
    html.push_str(&format!("<tr><th>Status</th><td>{status}</td></tr>\n"));
    html.push_str(&format!(
        "<tr><th>Deepest level</th><td>{} of {}</td></tr>\n",
        report.max_line_reached + 1,
        report.chart.line_count
    ));
    html.push_str(&format!(
        "<tr><th>Responses</th><td>{}</td></tr>\n",
        report.responses.len()
    ));
    html.push_str(&format!(
        "<tr><th>Overall accuracy</th><td>{:.1}%</td></tr>\n",
        report.overall_accuracy * 100.0
    ));
    html.push_str(&format!(
        "<tr><th>Duration</th><td>{}ms</td></tr>\n",
        report.duration_ms
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Per-line breakdown
    html.push_str("<section class=\"lines\">\n");
    html.push_str("<h2>Lines</h2>\n");
    html.push_str("<table class=\"lines-table\">\n");
    html.push_str("<thead><tr><th>Level</th><th>Acuity</th><th>Correct</th><th>Required</th><th>Outcome</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for stats in &report.line_stats {
        let (class, text) = outcome_cell(stats.outcome);
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&stats.level_label),
            html_escape(&stats.acuity_label),
            stats.correct,
            stats.attempts,
            stats.required_correct,
            text
        ));
    }
    html.push_str("</tbody></table>\n");

    if !report.line_stats.is_empty() {
        html.push_str(&generate_bar_chart(&report.line_stats));
    }
    html.push_str("</section>\n");

    // Response log
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Responses</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"responses\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Acuity</th><th onclick=\"sortTable(2)\">Expected</th><th onclick=\"sortTable(3)\">Answer</th><th onclick=\"sortTable(4)\">Result</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for (i, r) in report.responses.iter().enumerate() {
        let (class, text) = if r.is_correct {
            ("pass", "OK")
        } else {
            ("fail", "MISS")
        };

        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            class,
            i + 1,
            html_escape(&r.acuity_label),
            html_escape(&r.expected_letter.to_string()),
            html_escape(&r.user_response),
            class,
            text
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &TestReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn outcome_cell(outcome: LineOutcome) -> (&'static str, &'static str) {
    match outcome {
        LineOutcome::Passed => ("pass", "passed"),
        LineOutcome::Failed => ("fail", "failed"),
        LineOutcome::InProgress => ("pending", "in progress"),
    }
}

fn generate_bar_chart(line_stats: &[LineStats]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 120;

    let total_height = line_stats.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, stats) in line_stats.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let score = stats.accuracy();
        let width = (score * max_width as f64) as usize;

        let color = match stats.outcome {
            LineOutcome::Passed => "#22c55e",
            LineOutcome::InProgress => "#eab308",
            LineOutcome::Failed => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&stats.acuity_label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.0}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --pending: #fef9c3; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --pending: #713f12; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.acuity { font-size: 2.5rem; font-weight: bold; margin: 0.5rem 0; }
.badge { font-size: 0.9rem; font-weight: normal; padding: 0.2rem 0.6rem; border-radius: 999px; background: var(--pending); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.results-table th { cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.pending { background: var(--pending); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('responses');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = Number(va), nb = Number(vb);
    if (!isNaN(na) && !isNaN(nb)) return asc ? na - nb : nb - na;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
