//! Project-level configuration support
//!
//! Loads per-project configuration from `readiness.toml` in the repository
//! root. Every key is optional; command-line flags take precedence.
//!
//! # Configuration Format
//!
//! ```toml
//! # readiness.toml
//!
//! [analysis]
//! repo_type = "library"       # skip classification
//! command_timeout_secs = 20   # bound for gh/glab/git probes
//!
//! [report]
//! format = "html"
//! diagrams = false
//! ```

use crate::models::RepoType;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

pub const PROJECT_CONFIG_FILE: &str = "readiness.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisConfig {
    /// Overrides the detected repository type
    pub repo_type: Option<RepoType>,
    pub command_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportConfig {
    /// "markdown", "html" or "json"
    pub format: Option<String>,
    /// Include Mermaid diagrams in Markdown output
    pub diagrams: Option<bool>,
}

impl ProjectConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        self.analysis
            .command_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn diagrams(&self) -> bool {
        self.report.diagrams.unwrap_or(true)
    }
}

/// Load `readiness.toml` from the repository root. A missing file yields the
/// defaults; an unreadable or invalid one is logged and also yields defaults.
pub fn load_project_config(repo_path: &Path) -> ProjectConfig {
    let toml_path = repo_path.join(PROJECT_CONFIG_FILE);
    if !toml_path.exists() {
        return ProjectConfig::default();
    }
    match load_toml_config(&toml_path) {
        Ok(config) => {
            debug!("Loaded project config from {}", toml_path.display());
            config
        }
        Err(e) => {
            warn!("Failed to load {}: {:#}", toml_path.display(), e);
            ProjectConfig::default()
        }
    }
}

fn load_toml_config(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
