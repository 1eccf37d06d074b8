// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! binfield-bench - encoding size and speed against JSON
//!
//! Runs every scenario through both codecs, serialize then deserialize, and
//! reports size and wall time differences.

mod scenarios;

use clap::Parser;
use colored::*;
use scenarios::Scenario;
use std::hint::black_box;
use std::time::{Duration, Instant};

/// binfield vs JSON benchmark
#[derive(Parser, Debug)]
#[command(name = "binfield-bench")]
#[command(version)]
#[command(about = "Compare binfield encoding size and speed against JSON")]
struct Args {
    /// Iterations per scenario and codec
    #[arg(short = 'n', long, default_value = "500000")]
    runs: u64,

    /// Only run scenarios whose name contains this text
    #[arg(short, long)]
    filter: Option<String>,

    /// Output JSON results
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Serialize,
    Deserialize,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Self::Serialize => "Serialize",
            Self::Deserialize => "Deserialize",
        }
    }
}

struct Outcome {
    title: String,
    runs: u64,
    json_size: usize,
    binary_size: usize,
    json_time: Duration,
    binary_time: Duration,
}

impl Outcome {
    /// Percent saved by binfield (negative when it loses).
    fn size_gain(&self) -> f64 {
        gain(self.json_size as f64, self.binary_size as f64)
    }

    fn time_gain(&self) -> f64 {
        gain(self.json_time.as_secs_f64(), self.binary_time.as_secs_f64())
    }
}

fn gain(json: f64, binary: f64) -> f64 {
    if json == 0.0 {
        0.0
    } else {
        ((json - binary) / json * 100.0).round()
    }
}

fn main() {
    // Initialize logger for RUST_LOG-based debug output
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let filter = args.filter.as_deref().map(str::to_lowercase);
    let selected: Vec<Scenario> = scenarios::all()?
        .into_iter()
        .filter(|s| filter.as_ref().map_or(true, |f| s.name.contains(f.as_str())))
        .collect();

    if selected.is_empty() {
        return Err("no scenario matches the filter".into());
    }
    if !args.json {
        eprintln!(
            "{} {} scenarios, {} runs each",
            ">>>".green().bold(),
            selected.len(),
            args.runs
        );
    }

    let mut outcomes = Vec::new();
    for direction in [Direction::Serialize, Direction::Deserialize] {
        for scenario in &selected {
            let outcome = measure(scenario, direction, args.runs.max(1))?;
            log::debug!(
                "[binfield-bench] {}: json {:?}, binary {:?}",
                outcome.title,
                outcome.json_time,
                outcome.binary_time
            );
            outcomes.push(outcome);
        }
    }

    if args.json {
        print_json_results(&outcomes);
    } else {
        print_results(&outcomes);
    }
    Ok(())
}

fn measure(
    scenario: &Scenario,
    direction: Direction,
    runs: u64,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let title = format!("{} {}", direction.label(), scenario.name);
    let json_value = scenarios::record_to_json(&scenario.data);

    // sanity check before timing anything
    let binary = scenario.schema.serialize(&scenario.data)?;
    let decoded = scenario.schema.deserialize(&binary)?;
    if decoded != scenario.data {
        return Err(format!("{}: round trip changed the record", title).into());
    }
    let json_bytes = serde_json::to_vec(&json_value)?;

    let (json_time, binary_time) = match direction {
        Direction::Serialize => {
            let json_time = time_runs(runs, || {
                black_box(
                    serde_json::to_vec(black_box(&json_value))
                        .map(|v| v.len())
                        .unwrap_or(0),
                );
            });
            let binary_time = time_runs(runs, || {
                black_box(
                    scenario
                        .schema
                        .serialize(black_box(&scenario.data))
                        .map(|b| b.len())
                        .unwrap_or(0),
                );
            });
            (json_time, binary_time)
        }
        Direction::Deserialize => {
            let json_time = time_runs(runs, || {
                let parsed = serde_json::from_slice::<serde_json::Value>(black_box(&json_bytes));
                black_box(parsed.is_ok());
            });
            let binary_time = time_runs(runs, || {
                black_box(scenario.schema.deserialize(black_box(&binary)).is_ok());
            });
            (json_time, binary_time)
        }
    };

    Ok(Outcome {
        title,
        runs,
        json_size: json_bytes.len(),
        binary_size: binary.len(),
        json_time,
        binary_time,
    })
}

fn time_runs(runs: u64, mut f: impl FnMut()) -> Duration {
    let start = Instant::now();
    for _ in 0..runs {
        f();
    }
    start.elapsed()
}

fn colored_gain(value: f64) -> ColoredString {
    let text = format!("{}%", value);
    if value < 0.0 {
        text.red()
    } else {
        text.green()
    }
}

fn print_results(outcomes: &[Outcome]) {
    println!();
    println!("{}", "=== binfield vs JSON ===".bold());
    println!();
    println!(
        "{}",
        format!(
            "{:<10} {:<40} {:>10} {:>12} {:>10} {:>12} {:>12} {:>10}",
            "Runs",
            "Test",
            "JSON Size",
            "Binary Size",
            "Size Diff",
            "JSON Time",
            "Binary Time",
            "Time Diff"
        )
        .dimmed()
    );
    for o in outcomes {
        println!(
            "{:<10} {:<40} {:>10} {:>12} {:>10} {:>10}ms {:>10}ms {:>10}",
            o.runs,
            o.title,
            o.json_size,
            o.binary_size,
            colored_gain(o.size_gain()),
            o.json_time.as_millis(),
            o.binary_time.as_millis(),
            colored_gain(o.time_gain()),
        );
    }
    println!();
}

fn print_json_results(outcomes: &[Outcome]) {
    let rows: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|o| {
            serde_json::json!({
                "test": o.title,
                "runs": o.runs,
                "json_size": o.json_size,
                "binary_size": o.binary_size,
                "size_diff_pct": o.size_gain(),
                "json_ms": o.json_time.as_secs_f64() * 1000.0,
                "binary_ms": o.binary_time.as_secs_f64() * 1000.0,
                "time_diff_pct": o.time_gain(),
            })
        })
        .collect();
    println!("{}", serde_json::Value::Array(rows));
}
