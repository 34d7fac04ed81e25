//! The `acuity run` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use acuity_core::engine::{AcuityTestEngine, ProgressReporter};
use acuity_core::model::ResponseRecord;
use acuity_core::report::TestReport;
use acuity_core::session::{LetterPrompt, Prompt};
use acuity_core::statistics::LineOutcome;
use acuity_report::html::write_html_report;
use acuity_signal::config::load_config_from;
use acuity_signal::{create_signal, SignalError};

use super::load_chart;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_session_start(&self, session_id: Uuid) {
        eprintln!("Session {session_id} started");
    }

    fn on_response(&self, record: &ResponseRecord) {
        tracing::debug!(
            line = record.line_index,
            letter = record.letter_index,
            correct = record.is_correct,
            "answer scored"
        );
    }

    fn on_line_advance(&self, from: usize, to: usize) {
        eprintln!("  Level {} passed, moving to level {}", from + 1, to + 1);
    }

    fn on_complete(&self, final_acuity: &str) {
        eprintln!("\nTest complete: {final_acuity}");
    }
}

pub async fn execute(
    chart_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    skip_distance_check: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let chart_path = chart_path.or_else(|| config.chart.clone());
    let chart = load_chart(chart_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let mut engine =
        AcuityTestEngine::new(Arc::new(chart)).with_reporter(Arc::new(ConsoleReporter));
    if config.require_distance && !skip_distance_check {
        let signal = create_signal(&config.signal)?;
        tracing::debug!(signal = signal.name(), "distance gating enabled");
        engine = engine.with_distance_signal(signal);
    }
    let poll_interval = Duration::from_millis(config.distance_poll_interval_ms.max(1));

    eprintln!(
        "acuity v{}: {} ({} levels)",
        env!("CARGO_PKG_VERSION"),
        engine.chart().name(),
        engine.chart().len()
    );
    eprintln!("Type the letter you see and press Enter.\n");

    engine.start_session();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let prompt = match engine.current_prompt()? {
            Prompt::Letter(prompt) => prompt,
            Prompt::Complete { .. } => break,
        };

        wait_for_distance(&engine, poll_interval).await?;
        print_prompt(&prompt);

        let Some(answer) = lines.next_line().await.context("failed to read stdin")? else {
            eprintln!("\nInput ended before the test was complete.");
            break;
        };

        let outcome = engine.submit_response(&answer)?;
        if outcome.is_correct {
            println!("  correct");
        } else {
            println!("  incorrect (expected {})", outcome.expected_letter);
        }
    }

    let results = engine.get_results()?;
    let session = engine.session_snapshot()?;
    let report = TestReport::from_session(engine.chart(), &session, &results);

    print_summary(&report);
    match (&report.final_acuity, report.provisional) {
        (Some(acuity), false) => println!("Final acuity: {acuity}"),
        (Some(acuity), true) => println!("Provisional acuity: {acuity} (test incomplete)"),
        (None, _) => println!("No answers recorded."),
    }

    save_outputs(&report, &output, &format)?;

    Ok(())
}

/// Poll the distance signal until it reports an acceptable distance.
///
/// Transient signal failures are retried, anything else aborts the run.
async fn wait_for_distance(engine: &AcuityTestEngine, interval: Duration) -> Result<()> {
    let mut told_user = false;
    loop {
        match engine.check_distance().await {
            Ok(true) => return Ok(()),
            Ok(false) => {
                if !told_user {
                    eprintln!("Please adjust your distance from the screen...");
                    told_user = true;
                }
            }
            Err(e) => {
                let transient = e
                    .downcast_ref::<SignalError>()
                    .is_some_and(SignalError::is_transient);
                if !transient {
                    return Err(e.context("distance check failed"));
                }
                tracing::warn!("distance check failed, retrying: {e:#}");
            }
        }
        tokio::time::sleep(interval).await;
    }
}

fn print_prompt(prompt: &LetterPrompt) {
    println!(
        "{} [{}] letter {}/{}: {}",
        prompt.level_label,
        prompt.acuity_label,
        prompt.letter_index_in_line + 1,
        prompt.total_letters_in_line,
        prompt.letter
    );
}

fn save_outputs(report: &TestReport, output: &std::path::Path, format: &str) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}

fn print_summary(report: &TestReport) {
    use comfy_table::{Cell, Table};

    if report.line_stats.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Level", "Acuity", "Correct", "Required", "Outcome"]);

    for stats in &report.line_stats {
        let outcome = match stats.outcome {
            LineOutcome::Passed => "passed",
            LineOutcome::Failed => "failed",
            LineOutcome::InProgress => "in progress",
        };
        table.add_row(vec![
            Cell::new(&stats.level_label),
            Cell::new(&stats.acuity_label),
            Cell::new(format!("{}/{}", stats.correct, stats.attempts)),
            Cell::new(stats.required_correct),
            Cell::new(outcome),
        ]);
    }

    eprintln!("\n{table}");
}
