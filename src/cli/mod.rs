//! Command-line interface
//!
//! Flags keep the underscore spelling (`--input_csv`) that existing job
//! definitions already pass.

use anyhow::Context;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::pipeline::{run, PipelineConfig, PipelineReport};
use crate::preprocessing::ColumnSchema;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "detection-recalibrator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recalibrate object-detection confidence scores with a random forest")]
#[command(long_about = None)]
pub struct Cli {
    /// Input CSV file, or a directory containing one
    #[arg(long = "input_csv", value_name = "PATH")]
    pub input_csv: PathBuf,

    /// Output CSV file, or a directory to write adjusted_predictions.csv into
    #[arg(long = "output_csv", value_name = "PATH")]
    pub output_csv: PathBuf,

    /// Column holding the detected class name
    #[arg(long = "name_column", default_value = "class_name")]
    pub name_column: String,

    /// Column holding the numeric class id
    #[arg(long = "class_id_column", default_value = "class_id")]
    pub class_id_column: String,

    /// Column holding the original detection score
    #[arg(long = "score_column", default_value = "score")]
    pub score_column: String,

    /// Write the run report (metrics, classes, paths) as JSON
    #[arg(long = "metrics_json", value_name = "PATH")]
    pub metrics_json: Option<PathBuf>,
}

impl Cli {
    /// Pipeline configuration described by these arguments
    pub fn to_config(&self) -> PipelineConfig {
        let schema = ColumnSchema::new()
            .with_class_name(&self.name_column)
            .with_class_id(&self.class_id_column)
            .with_score(&self.score_column);

        let config = PipelineConfig::new(&self.input_csv, &self.output_csv).with_schema(schema);
        match &self.metrics_json {
            Some(path) => config.with_metrics_path(path),
            None => config,
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Run the pipeline and print the console report
pub fn cmd_run(cli: &Cli) -> anyhow::Result<()> {
    section("Recalibrate");
    println!("  {}", kv("Input CSV (raw):", &cli.input_csv.display().to_string()));
    println!("  {}", kv("Output CSV (raw):", &cli.output_csv.display().to_string()));

    let start = Instant::now();
    let report = run(&cli.to_config()).context("recalibration run failed")?;

    print_report(&report);
    println!();
    println!("  {}", dim(&format!("finished in {:.2?}", start.elapsed())));
    println!();
    Ok(())
}

fn print_report(report: &PipelineReport) {
    step_ok(&format!(
        "Resolved input CSV file: {}",
        report.resolved_input.display()
    ));
    step_ok(&format!(
        "Loaded CSV with shape: ({}, {})",
        report.shape.0, report.shape.1
    ));
    println!("    {}", kv("Columns:", &format!("[{}]", report.columns.join(", "))));
    println!("    {}", kv("Classes:", &report.classes.len().to_string()));

    let metrics = &report.metrics;
    println!();
    println!(
        "  {}",
        kv(
            "Held-out rows:",
            &format!("{} (trained on {})", metrics.n_test, metrics.n_train)
        )
    );
    println!("  {}", kv("MSE:", &format!("{:.6}", metrics.mse)));
    println!("  {}", kv("R2:", &format!("{:.6}", metrics.r2)));
    if let Some(oob) = metrics.oob_score {
        println!("  {}", kv("OOB R2:", &format!("{:.6}", oob)));
    }
    println!();

    step_ok(&format!(
        "Saved adjusted CSV to {}",
        report.output_path.display()
    ));
}
