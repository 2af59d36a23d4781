//! Analysis orchestration
//!
//! One run: classify the repository, detect apps (monorepos only), evaluate
//! every pillar, aggregate levels, and stamp the record with branch and time.

use crate::classifier::{detect_apps, detect_languages, detect_repo_type, AppDetection};
use crate::criteria::{Evaluator, Pillar, Registry, RuleContext};
use crate::error::ReadinessError;
use crate::models::{AnalysisResult, RepoType};
use crate::probe::{CommandRunner, RepoProbe, SystemRunner};
use crate::scoring;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ReadinessAnalyzer {
    root: PathBuf,
    runner: Box<dyn CommandRunner>,
    repo_type: Option<RepoType>,
}

impl ReadinessAnalyzer {
    /// Resolve `repo_path` to an absolute directory
    pub fn new(repo_path: &Path) -> Result<Self, ReadinessError> {
        if !repo_path.exists() {
            return Err(ReadinessError::RepoNotFound(repo_path.to_path_buf()));
        }
        if !repo_path.is_dir() {
            return Err(ReadinessError::NotADirectory(repo_path.to_path_buf()));
        }
        let root = std::fs::canonicalize(repo_path)
            .map_err(|_| ReadinessError::RepoNotFound(repo_path.to_path_buf()))?;
        Ok(Self {
            root,
            runner: Box::new(SystemRunner::default()),
            repo_type: None,
        })
    }

    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    /// Use this repository type instead of detecting one
    pub fn with_repo_type(mut self, repo_type: Option<RepoType>) -> Self {
        self.repo_type = repo_type;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn analyze(&self) -> Result<AnalysisResult, ReadinessError> {
        self.analyze_with_progress(|_| {})
    }

    /// Like [`analyze`](Self::analyze), calling `on_pillar` before each pillar
    pub fn analyze_with_progress(
        &self,
        mut on_pillar: impl FnMut(Pillar),
    ) -> Result<AnalysisResult, ReadinessError> {
        let registry = Registry::global()?;
        let probe = RepoProbe::new(&self.root);
        let repo_name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string());

        let repo_type = match self.repo_type {
            Some(configured) => {
                debug!("Using configured repo type: {}", configured);
                configured
            }
            None => detect_repo_type(&probe, &repo_name),
        };
        let languages = detect_languages(&probe);
        let AppDetection { apps, undetected } = if repo_type == RepoType::Monorepo {
            detect_apps(&probe)
        } else {
            AppDetection::default()
        };
        info!(
            "Analyzing {} as {} ({} apps)",
            repo_name,
            repo_type,
            apps.len()
        );

        let ctx = RuleContext {
            probe: &probe,
            runner: self.runner.as_ref(),
            repo_type,
            languages: &languages,
            apps: &apps,
        };
        let evaluator = Evaluator::new(&ctx, registry);
        let mut pillars = IndexMap::new();
        for pillar in Pillar::ALL {
            on_pillar(pillar);
            pillars.insert(pillar.name().to_string(), evaluator.evaluate_pillar(pillar));
        }

        let summary = scoring::summarize(&pillars);
        let git_branch = self.git_branch();

        Ok(AnalysisResult {
            repo_path: self.root.display().to_string(),
            repo_name,
            repo_type,
            git_branch,
            generated_at: chrono::Local::now().to_rfc3339(),
            languages,
            pass_rate: summary.pass_rate,
            total_passed: summary.total_passed,
            total_criteria: summary.total_criteria,
            achieved_level: summary.achieved_level,
            level_scores: summary.level_scores,
            detected_apps: apps,
            undetected_app_folders: undetected,
            pillars,
        })
    }

    fn git_branch(&self) -> String {
        self.runner
            .run("git", &["rev-parse", "--abbrev-ref", "HEAD"], &self.root)
            .filter(|out| out.success)
            .map(|out| out.stdout.trim().to_string())
            .filter(|branch| !branch.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
