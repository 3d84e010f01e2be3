//! detection-recalibrator - command-line entry point

use clap::Parser;
use detection_recalibrator::cli::{cmd_run, Cli};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the run report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "detection_recalibrator=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cmd_run(&cli)
}
