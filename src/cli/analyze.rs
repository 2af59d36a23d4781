//! `readiness analyze`: evaluate a repository and save the record

use super::{create_spinner_style, default_analysis_path};
use crate::analyzer::ReadinessAnalyzer;
use crate::config::{load_project_config, ProjectConfig};
use crate::models::AnalysisResult;
use crate::probe::{CommandRunner, SystemRunner};
use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub fn run(repo_path: &Path, output: Option<PathBuf>, quiet: bool) -> Result<()> {
    let project_config = load_project_config(repo_path);
    let runner = match project_config.command_timeout() {
        Some(timeout) => SystemRunner::with_timeout(timeout),
        None => SystemRunner::default(),
    };
    run_with_runner(repo_path, output, quiet, &project_config, runner)
}

fn run_with_runner(
    repo_path: &Path,
    output: Option<PathBuf>,
    quiet: bool,
    project_config: &ProjectConfig,
    runner: impl CommandRunner + 'static,
) -> Result<()> {
    let output = output.unwrap_or_else(default_analysis_path);

    if !quiet {
        println!(
            "\n🔍 Analyzing repository: {}",
            style(repo_path.display()).cyan()
        );
    }

    let analyzer = ReadinessAnalyzer::new(repo_path)?
        .with_runner(runner)
        .with_repo_type(project_config.analysis.repo_type);

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(create_spinner_style()?);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    };
    let result = analyzer.analyze_with_progress(|pillar| {
        spinner.set_message(format!("Evaluating {}...", pillar));
    });
    spinner.finish_and_clear();
    let result = result?;

    write_record(&result, &output)?;

    if !quiet {
        print_summary(&result, &output);
    }
    Ok(())
}

fn write_record(result: &AnalysisResult, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(result).context("Failed to serialize analysis")?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

fn print_summary(result: &AnalysisResult, output: &Path) {
    let level = if result.achieved_level > 0 {
        style(format!("L{}", result.achieved_level)).green().bold()
    } else {
        style("Not yet L1".to_string()).yellow().bold()
    };
    println!(
        "✅ Analysis complete: {}/{} criteria passed ({}%)",
        result.total_passed, result.total_criteria, result.pass_rate
    );
    println!("📊 Achieved Level: {}", level);
    println!(
        "💾 Results saved to: {}",
        style(output.display()).dim()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::tests::OfflineRunner;

    #[test]
    fn test_write_record_creates_parent_dirs() {
        let repo = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("nested/dir/analysis.json");
        run_with_runner(
            repo.path(),
            Some(output.clone()),
            true,
            &ProjectConfig::default(),
            OfflineRunner,
        ).unwrap();

        let record: AnalysisResult =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(record.pillars.len(), 9);
        assert_eq!(record.achieved_level, 0);
        assert_eq!(record.git_branch, "unknown");
        let vcs = record.criteria().find(|c| c.id == "vcs_cli_tools").unwrap();
        assert!(vcs.is_fail());
    }

    #[test]
    fn test_missing_repo_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_with_runner(
            &dir.path().join("absent"),
            Some(dir.path().join("a.json")),
            true,
            &ProjectConfig::default(),
            OfflineRunner,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
