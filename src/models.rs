//! Core data models for readiness analysis
//!
//! These types are produced by one analysis run and persisted as the JSON
//! hand-off record that the report renderers consume.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Score string used for skipped criteria
pub const SKIP_SCORE: &str = "—/—";

/// Outcome of a single criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionStatus {
    Pass,
    Fail,
    Skip,
}

impl CriterionStatus {
    /// Status icon used by the Markdown renderer
    pub fn icon(&self) -> &'static str {
        match self {
            CriterionStatus::Pass => "✓",
            CriterionStatus::Fail => "✗",
            CriterionStatus::Skip => "—",
        }
    }
}

impl std::fmt::Display for CriterionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CriterionStatus::Pass => write!(f, "pass"),
            CriterionStatus::Fail => write!(f, "fail"),
            CriterionStatus::Skip => write!(f, "skip"),
        }
    }
}

/// Whether a criterion was evaluated once for the repo or per sub-application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Repo,
    App,
}

/// Result of one rubric check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub id: String,
    pub pillar: String,
    pub level: u8,
    pub status: CriterionStatus,
    /// "1/1", "0/1", "3/4" or "—/—"
    pub score: String,
    pub reason: String,
    #[serde(default)]
    pub scope: Scope,
    /// App name to pass/fail, in detection order. Empty for repo scope.
    #[serde(default)]
    pub app_results: IndexMap<String, bool>,
}

impl CriterionResult {
    pub fn is_pass(&self) -> bool {
        self.status == CriterionStatus::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.status == CriterionStatus::Fail
    }

    pub fn is_skip(&self) -> bool {
        self.status == CriterionStatus::Skip
    }

    /// Names of apps that failed this criterion
    pub fn failing_apps(&self) -> Vec<&str> {
        self.app_results
            .iter()
            .filter(|(_, passed)| !**passed)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Named group of criteria with derived counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarResult {
    pub name: String,
    pub passed: usize,
    /// Non-skipped criteria
    pub total: usize,
    pub percentage: u32,
    #[serde(default)]
    pub criteria: Vec<CriterionResult>,
}

impl PillarResult {
    pub fn from_criteria(name: impl Into<String>, criteria: Vec<CriterionResult>) -> Self {
        let passed = criteria.iter().filter(|c| c.is_pass()).count();
        let total = criteria.iter().filter(|c| !c.is_skip()).count();
        Self {
            name: name.into(),
            passed,
            total,
            percentage: pillar_percentage(passed, total),
            criteria,
        }
    }
}

/// 100 for an empty pillar, otherwise the rounded pass percentage
pub fn pillar_percentage(passed: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((passed as f64 / total as f64) * 100.0).round() as u32
}

/// Repository archetype, used to skip inapplicable criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    Library,
    Cli,
    Database,
    Monorepo,
    #[default]
    Application,
}

impl std::fmt::Display for RepoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoType::Library => write!(f, "library"),
            RepoType::Cli => write!(f, "cli"),
            RepoType::Database => write!(f, "database"),
            RepoType::Monorepo => write!(f, "monorepo"),
            RepoType::Application => write!(f, "application"),
        }
    }
}

/// Detected programming language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    TypeScript,
    JavaScript,
    Go,
    Rust,
    Java,
    Ruby,
    #[serde(rename = "C++")]
    Cpp,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::TypeScript => "TypeScript",
            Language::JavaScript => "JavaScript",
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Java => "Java",
            Language::Ruby => "Ruby",
            Language::Cpp => "C++",
            Language::Unknown => "Unknown",
        }
    }

    /// Go and Rust are type checked by their compilers
    pub fn is_statically_typed(&self) -> bool {
        matches!(self, Language::Go | Language::Rust)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma-separated language list for report headers
pub fn join_languages(languages: &[Language]) -> String {
    languages
        .iter()
        .map(Language::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn unknown_languages() -> Vec<Language> {
    vec![Language::Unknown]
}

fn unknown_branch() -> String {
    "unknown".to_string()
}

/// A sub-application detected inside a monorepo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Directory name
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
    #[serde(default = "unknown_languages")]
    pub languages: Vec<Language>,
}

/// Aggregate root of one analysis run, and the persisted JSON record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub repo_path: String,
    pub repo_name: String,
    #[serde(default)]
    pub repo_type: RepoType,
    #[serde(default = "unknown_branch")]
    pub git_branch: String,
    #[serde(default)]
    pub generated_at: String,
    #[serde(default = "unknown_languages")]
    pub languages: Vec<Language>,
    pub pass_rate: f64,
    pub total_passed: usize,
    pub total_criteria: usize,
    /// 0 means no level reached yet
    pub achieved_level: u8,
    /// Serialized with string keys "1".."5"
    pub level_scores: BTreeMap<u8, f64>,
    #[serde(default)]
    pub detected_apps: Vec<AppInfo>,
    #[serde(default)]
    pub undetected_app_folders: Vec<String>,
    pub pillars: IndexMap<String, PillarResult>,
}

impl AnalysisResult {
    /// Score for a level, 0.0 when the record does not carry it
    pub fn level_score(&self, level: u8) -> f64 {
        self.level_scores.get(&level).copied().unwrap_or(0.0)
    }

    /// Every criterion across pillars, in pillar order
    pub fn criteria(&self) -> impl Iterator<Item = &CriterionResult> {
        self.pillars.values().flat_map(|p| p.criteria.iter())
    }

    /// (passed, failed, skipped) counts over all criteria
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.criteria()
            .fold((0, 0, 0), |(p, f, s), c| match c.status {
                CriterionStatus::Pass => (p + 1, f, s),
                CriterionStatus::Fail => (p, f + 1, s),
                CriterionStatus::Skip => (p, f, s + 1),
            })
    }

    pub fn is_monorepo(&self) -> bool {
        self.repo_type == RepoType::Monorepo
    }
}
