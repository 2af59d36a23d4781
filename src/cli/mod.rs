//! CLI command definitions and handlers

mod analyze;
mod report;
mod sonar;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::ProgressStyle;
use std::path::PathBuf;

/// File name of the analysis record in the temp directory
pub const ANALYSIS_FILE_NAME: &str = "readiness_analysis.json";

/// Where `analyze` writes and `report` reads when no path is given
pub fn default_analysis_path() -> PathBuf {
    std::env::temp_dir().join(ANALYSIS_FILE_NAME)
}

/// Readiness - score a repository for autonomous coding agents
#[derive(Parser, Debug)]
#[command(name = "readiness")]
#[command(
    version,
    about = "Score a repository against nine pillars of agent readiness and render the result",
    long_about = "Readiness inspects a repository's files, CI workflows and git metadata, \
evaluates ~80 criteria across nine pillars, and assigns a maturity level from L1 to L5.\n\n\
A level counts as achieved once 80% of its applicable criteria pass and every level \
below it is achieved too.",
    after_help = "\
Examples:
  readiness analyze --repo-path .                      Analyze and save the record
  readiness report                                     Markdown report to stdout
  readiness report --format html -o report.html        Self-contained HTML report
  readiness report --no-diagrams                       Markdown without Mermaid charts
  readiness sonar                                      Open SonarQube issues for this PR"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a repository and write the analysis record as JSON
    #[command(after_help = "\
Examples:
  readiness analyze                                  Analyze current directory
  readiness analyze -r ../service -o out.json        Analyze another repo
  readiness analyze --quiet                          No progress output")]
    Analyze {
        /// Path to the repository to analyze
        #[arg(long, short = 'r', default_value = ".")]
        repo_path: PathBuf,

        /// Output file for the analysis record (default: <tmp>/readiness_analysis.json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Suppress progress output
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Render a report from a saved analysis record
    #[command(after_help = "\
Examples:
  readiness report                                   Markdown to stdout
  readiness report -f html -o readiness.html         HTML file
  readiness report -f json                           The record, pretty-printed
  readiness report -s \"Strong CI, thin docs.\"        Add an executive summary")]
    Report {
        /// Analysis record written by `readiness analyze` (default: <tmp>/readiness_analysis.json)
        #[arg(long, short = 'a')]
        analysis_file: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Output format: markdown (or md), html, json
        #[arg(long, short = 'f', value_parser = ["markdown", "md", "html", "json"])]
        format: Option<String>,

        /// Leave out the Mermaid diagrams in Markdown output
        #[arg(long)]
        no_diagrams: bool,

        /// Executive summary text to include in the report
        #[arg(long, short = 's')]
        summary: Option<String>,
    },

    /// Fetch open SonarQube issues for the current branch's pull request
    #[command(after_help = "\
Requires sonar-project.properties in this directory or a parent, and a token in
SONAR_TOKEN or ~/.config/readiness/config.toml.

Exit codes:
  0  report printed (or no open issues)
  1  configuration error
  2  no pull request for the current branch")]
    Sonar {
        /// Directory to start searching for sonar-project.properties
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
}

/// Run the CLI command
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            repo_path,
            output,
            quiet,
        } => analyze::run(&repo_path, output, quiet),

        Commands::Report {
            analysis_file,
            output,
            format,
            no_diagrams,
            summary,
        } => report::run(
            analysis_file,
            output.as_deref(),
            format.as_deref(),
            no_diagrams,
            summary,
        ),

        Commands::Sonar { path } => sonar::run(&path),
    }
}

/// Create spinner progress style
fn create_spinner_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")?)
}
