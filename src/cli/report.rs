//! `readiness report`: render a saved analysis record

use super::default_analysis_path;
use crate::config::{load_project_config, ProjectConfig};
use crate::error::ReadinessError;
use crate::models::AnalysisResult;
use crate::reporters::{self, OutputFormat, ReportOptions};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub fn run(
    analysis_file: Option<PathBuf>,
    output: Option<&Path>,
    format: Option<&str>,
    no_diagrams: bool,
    summary: Option<String>,
) -> Result<()> {
    let analysis_file = analysis_file.unwrap_or_else(default_analysis_path);
    let result = load_record(&analysis_file)?;

    // Report settings live next to the analyzed repo, when it is still there
    let project_config = Path::new(&result.repo_path)
        .is_dir()
        .then(|| load_project_config(Path::new(&result.repo_path)))
        .unwrap_or_default();

    let format = resolve_format(format, &project_config)?;
    let options = ReportOptions {
        diagrams: !no_diagrams && project_config.diagrams(),
        summary,
    };
    debug!("Rendering {} report (diagrams: {})", format, options.diagrams);

    let rendered = reporters::render(&result, format, &options)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("📄 Report saved to: {}", style(path.display()).cyan());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Read and parse the record written by `analyze`
pub(crate) fn load_record(path: &Path) -> Result<AnalysisResult> {
    if !path.exists() {
        return Err(ReadinessError::AnalysisFileMissing(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let result = serde_json::from_str(&content).map_err(|source| ReadinessError::InvalidAnalysis {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(result)
}

/// Flag, then `[report] format` in readiness.toml, then Markdown
fn resolve_format(flag: Option<&str>, config: &ProjectConfig) -> Result<OutputFormat> {
    match flag.or(config.report.format.as_deref()) {
        Some(name) => OutputFormat::from_str(name),
        None => Ok(OutputFormat::default()),
    }
}
