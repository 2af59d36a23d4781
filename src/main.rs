//! Readiness - agent readiness scanner CLI
//!
//! Scores a repository for autonomous coding agents and renders reports.

use clap::Parser;
use readiness::cli;
use readiness::error::ReadinessError;
use readiness::sonar::SonarError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level; logs stay on stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(err) = cli::run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| {
            cause
                .downcast_ref::<SonarError>()
                .map(SonarError::exit_code)
                .or_else(|| cause.downcast_ref::<ReadinessError>().map(ReadinessError::exit_code))
        })
        .unwrap_or(1)
}
