//! `readiness sonar`: open SonarQube issues for the current pull request
//!
//! The JSON report goes to stdout so an agent can parse it; progress and
//! the saved-file notice go to stderr.

use crate::config::UserConfig;
use crate::probe::SystemRunner;
use crate::sonar::{self, SonarClient, SonarReport};
use anyhow::Result;
use console::style;
use std::path::Path;

pub fn run(start: &Path) -> Result<()> {
    let config = UserConfig::load()?;
    let runner = SystemRunner::default();
    let target = sonar::prepare(start, &config, &runner)?;

    eprintln!(
        "Fetching SonarQube issues for project: {} (PR #{})...",
        style(&target.project_key).cyan(),
        target.pull_request
    );

    let client = SonarClient::new(&target.base_url, &target.token, &target.project_key);
    let issues = client.pull_request_issues(&target.pull_request);

    if issues.is_empty() {
        println!(
            "✅ No open issues found for PR #{}! Your code is clean.",
            target.pull_request
        );
        return Ok(());
    }

    let report = SonarReport::new(&target.project_key, &issues, target.context.clone());
    println!("{}", report.to_json()?);

    let saved = report.save(&target.project_root)?;
    eprintln!("\nReport saved to: {}", saved.display());
    eprintln!(
        "Total issues found for PR #{}: {}",
        target.pull_request, report.total_issues
    );
    Ok(())
}
