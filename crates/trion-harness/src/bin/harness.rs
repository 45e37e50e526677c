//! CLI entrypoint for the Trion conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use trion_harness::fixtures::FixtureSet;
use trion_harness::runner::{run_all, run_named, ScenarioReport};
use trion_harness::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// Conformance tooling for the Trion runtime core.
#[derive(Debug, Parser)]
#[command(name = "trion-harness")]
#[command(about = "Conformance testing harness for the Trion runtime")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run all spec.md §8 end-to-end scenarios and print a pass/fail table.
    RunScenario {
        /// Run only the named scenario instead of all of them.
        #[arg(long)]
        name: Option<String>,
        /// Write a JSONL structured log of each scenario's outcome.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Validate the base-12 codec against the built-in fixture set.
    Conformance {
        /// Path to a fixture JSON file; falls back to the harness's
        /// built-in fixture set when omitted.
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
}

fn timestamp_now() -> String {
    // Deterministic-enough for a CLI tool: humans read this, tests read the
    // per-scenario duration_ms field instead of comparing timestamps.
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("unix:{}", now.as_secs())
}

fn emit_log(log: Option<PathBuf>, reports: &[ScenarioReport]) -> std::io::Result<()> {
    let Some(path) = log else {
        return Ok(());
    };
    let mut emitter = LogEmitter::to_file(path)?;
    for report in reports {
        let level = match report.outcome {
            Outcome::Pass => LogLevel::Info,
            Outcome::Fail => LogLevel::Error,
            Outcome::Skip => LogLevel::Warn,
        };
        let entry = LogEntry::new(timestamp_now(), report.name.clone(), level, "scenario_result")
            .with_scenario(report.name.clone())
            .with_outcome(report.outcome)
            .with_duration_ms(report.duration_ms)
            .with_details(serde_json::json!({ "detail": report.detail }));
        emitter.emit(&entry)?;
    }
    Ok(())
}

fn print_reports(reports: &[ScenarioReport]) -> bool {
    let mut all_passed = true;
    for report in reports {
        let marker = match report.outcome {
            Outcome::Pass => "PASS",
            Outcome::Fail => {
                all_passed = false;
                "FAIL"
            }
            Outcome::Skip => "SKIP",
        };
        println!(
            "{marker:<4} {:<32} {:>6}ms  {}",
            report.name, report.duration_ms, report.detail
        );
    }
    all_passed
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::RunScenario { name, log } => {
            let reports = match name {
                Some(name) => match run_named(&name) {
                    Some(report) => vec![report],
                    None => {
                        eprintln!("unknown scenario: {name}");
                        return std::process::ExitCode::FAILURE;
                    }
                },
                None => run_all(),
            };
            if let Err(e) = emit_log(log, &reports) {
                eprintln!("failed to write structured log: {e}");
                return std::process::ExitCode::FAILURE;
            }
            if print_reports(&reports) {
                std::process::ExitCode::SUCCESS
            } else {
                std::process::ExitCode::FAILURE
            }
        }
        Command::Conformance { fixture } => {
            let set = match &fixture {
                Some(path) => match FixtureSet::from_file(path) {
                    Ok(set) => set,
                    Err(e) => {
                        eprintln!("failed to load fixture set from {path:?}: {e}");
                        return std::process::ExitCode::FAILURE;
                    }
                },
                None => FixtureSet::builtin_base12(),
            };
            if let Some(path) = &fixture {
                match FixtureSet::digest_file(path) {
                    Ok(digest) => println!("fixture sha256: {digest}"),
                    Err(e) => eprintln!("warning: could not digest {path:?}: {e}"),
                }
            }
            let mut all_passed = true;
            for case in &set.cases {
                let result = trion_core::bytes_to_base12_scaled(&case.bytes, case.scale as i64);
                let (marker, detail) = match result {
                    Ok(text) if text == case.expected_text => ("PASS", text),
                    Ok(text) => {
                        all_passed = false;
                        ("FAIL", format!("got {text:?}, expected {:?}", case.expected_text))
                    }
                    Err(e) => {
                        all_passed = false;
                        ("FAIL", e.to_string())
                    }
                };
                println!("{marker:<4} {:<32} {}", case.name, detail);
            }
            if all_passed {
                std::process::ExitCode::SUCCESS
            } else {
                std::process::ExitCode::FAILURE
            }
        }
    }
}
