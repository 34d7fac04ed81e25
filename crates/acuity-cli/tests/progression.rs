//! Engine and distance signal working together, the way `acuity run` drives them.

use std::sync::Arc;

use acuity_core::engine::AcuityTestEngine;
use acuity_core::model::Chart;
use acuity_core::parser::parse_chart;
use acuity_core::session::{Prompt, Transition};
use acuity_signal::config::{create_signal, SignalConfig};
use acuity_signal::fixed::ScriptedSignal;

fn charts_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../charts")
}

/// Answer every prompt by polling the signal until it clears, then replying
/// with `answer_for(letter)`.
async fn drive(engine: &AcuityTestEngine, answer_for: impl Fn(char) -> String) -> usize {
    let mut polls = 0;
    loop {
        let letter = match engine.current_prompt().unwrap() {
            Prompt::Letter(p) => p.letter,
            Prompt::Complete { .. } => return polls,
        };
        loop {
            polls += 1;
            if engine.check_distance().await.unwrap() {
                break;
            }
        }
        engine.submit_response(&answer_for(letter)).unwrap();
    }
}

#[tokio::test]
async fn gated_perfect_run() {
    let signal = Arc::new(ScriptedSignal::new([false, false, true]));
    let engine = AcuityTestEngine::new(Arc::new(Chart::standard()))
        .with_distance_signal(signal.clone());
    engine.start_session();

    let polls = drive(&engine, |c| c.to_string()).await;

    let results = engine.get_results().unwrap();
    assert!(results.complete);
    assert_eq!(results.final_acuity.as_deref(), Some("20/15"));
    assert_eq!(results.responses.len(), 36);
    // two refusals before the first letter, then one poll per letter
    assert_eq!(polls, 38);
    assert_eq!(signal.call_count(), 38);
}

#[tokio::test]
async fn default_signal_never_blocks() {
    let signal = create_signal(&SignalConfig::default()).unwrap();
    let engine = AcuityTestEngine::new(Arc::new(Chart::standard())).with_distance_signal(signal);
    engine.start_session();

    let polls = drive(&engine, |_| "?".into()).await;
    assert_eq!(polls, 1);

    let results = engine.get_results().unwrap();
    assert_eq!(results.final_acuity.as_deref(), Some("Worse than 20/200"));
}

#[test]
fn chart_file_matches_builtin_chart() {
    let parsed = parse_chart(&charts_dir().join("snellen.toml")).unwrap();
    let builtin = Chart::standard();
    assert_eq!(parsed.lines(), builtin.lines());
    assert_eq!(parsed.info(), builtin.info());
}

#[test]
fn metric_chart_from_file() {
    let chart = parse_chart(&charts_dir().join("metric.toml")).unwrap();
    let engine = AcuityTestEngine::new(Arc::new(chart));
    engine.start_session();

    // pass the first three lines, then miss everything on the fourth
    let mut transitions = Vec::new();
    for answer in ["E", "F", "P", "T", "O", "Z", "x", "x", "x", "x"] {
        transitions.push(engine.submit_response(answer).unwrap().transition);
    }

    assert!(matches!(transitions.last(), Some(Transition::Completed { .. })));
    let results = engine.get_results().unwrap();
    assert_eq!(results.final_acuity.as_deref(), Some("6/21"));
    assert_eq!(results.max_line_reached, 3);
}
