//! SonarQube / SonarCloud issue report for the current pull request
//!
//! Flow: find `sonar-project.properties` above the working directory, read
//! the project key, resolve the token, work out the branch and its pull
//! request, then page through `/api/issues/search` and group the result by
//! severity.

mod client;

pub use client::{IssuePage, SonarClient, PAGE_SIZE};

use crate::config::UserConfig;
use crate::probe::CommandRunner;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const PROPERTIES_FILE: &str = "sonar-project.properties";
pub const REPORT_FILE: &str = "sonarqube_report.json";

/// Severity buckets in report order
pub const SEVERITIES: [&str; 5] = ["blocker", "critical", "major", "minor", "info"];

#[derive(Debug, Error)]
pub enum SonarError {
    #[error(
        "No sonar-project.properties file found in current directory or parent directories.\n\
         Please run this command from a project with SonarCloud configured."
    )]
    PropertiesNotFound,

    #[error("sonar.projectKey not found in {}", .0.display())]
    MissingProjectKey(PathBuf),

    #[error(
        "SONAR_TOKEN environment variable not found.\n\
         Set SONAR_TOKEN or add a [sonar] token to ~/.config/readiness/config.toml."
    )]
    MissingToken,

    #[error(
        "No pull request found for current branch '{}'.\n\n\
         The sonar command only works with branches that have an associated pull request.\n\
         Please create a pull request for your branch first, then run this command again.",
        .branch.as_deref().unwrap_or("unknown")
    )]
    NoPullRequest { branch: Option<String> },

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SonarError {
    /// 2 when the branch has no pull request, 1 for everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            SonarError::NoPullRequest { .. } => 2,
            _ => 1,
        }
    }
}

/// Nearest ancestor of `start` (inclusive) holding the properties file
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROPERTIES_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Value of the first `sonar.projectKey=` line, if non-empty
pub fn parse_project_key(properties: &str) -> Option<String> {
    properties
        .lines()
        .find_map(|line| line.strip_prefix("sonar.projectKey="))
        .map(|value| value.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Branch and pull request of the working copy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitContext {
    pub branch: Option<String>,
    pub pull_request: Option<String>,
}

impl GitContext {
    pub fn detect(runner: &dyn CommandRunner, cwd: &Path) -> Self {
        let branch = runner
            .run("git", &["branch", "--show-current"], cwd)
            .filter(|out| out.success)
            .map(|out| out.stdout.trim().to_string())
            .filter(|b| !b.is_empty());

        let pull_request = branch.as_deref().and_then(|b| {
            runner
                .run(
                    "gh",
                    &["pr", "list", "--head", b, "--json", "number", "--jq", ".[0].number"],
                    cwd,
                )
                .filter(|out| out.success)
                .map(|out| out.stdout.trim().to_string())
                .filter(|n| !n.is_empty())
        });

        debug!("Git context: branch={:?} pr={:?}", branch, pull_request);
        Self {
            branch,
            pull_request,
        }
    }
}

/// Everything needed to query issues for one pull request
#[derive(Debug, Clone)]
pub struct SonarTarget {
    pub project_root: PathBuf,
    pub project_key: String,
    pub token: String,
    pub base_url: String,
    pub context: GitContext,
    /// Always set once `prepare` succeeds
    pub pull_request: String,
}

/// Resolve project, credentials and pull request, in that order
pub fn prepare(
    start: &Path,
    config: &UserConfig,
    runner: &dyn CommandRunner,
) -> Result<SonarTarget, SonarError> {
    let project_root = find_project_root(start).ok_or(SonarError::PropertiesNotFound)?;
    let properties_path = project_root.join(PROPERTIES_FILE);
    let properties = std::fs::read_to_string(&properties_path).map_err(|source| SonarError::Io {
        path: properties_path.clone(),
        source,
    })?;
    let project_key =
        parse_project_key(&properties).ok_or(SonarError::MissingProjectKey(properties_path))?;

    let token = config
        .sonar_token()
        .filter(|t| !t.is_empty())
        .ok_or(SonarError::MissingToken)?
        .to_string();

    let context = GitContext::detect(runner, &project_root);
    let pull_request = context
        .pull_request
        .clone()
        .ok_or_else(|| SonarError::NoPullRequest {
            branch: context.branch.clone(),
        })?;

    Ok(SonarTarget {
        project_root,
        project_key,
        token,
        base_url: config.sonar_base_url().to_string(),
        context,
        pull_request,
    })
}

/// One issue as returned by the search API and as written to the report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SonarIssue {
    pub key: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub rule: Option<String>,
    pub message: Option<String>,
    pub component: Option<String>,
    pub line: Option<u64>,
    pub effort: Option<String>,
    pub debt: Option<String>,
    #[serde(default, skip_serializing)]
    pub severity: Option<String>,
}

/// Bucket issues by lowercase severity. A missing severity counts as info;
/// unknown severities are dropped.
pub fn categorize(issues: &[SonarIssue]) -> IndexMap<String, Vec<SonarIssue>> {
    let mut buckets: IndexMap<String, Vec<SonarIssue>> =
        SEVERITIES.iter().map(|s| (s.to_string(), Vec::new())).collect();
    for issue in issues {
        let severity = issue.severity.as_deref().unwrap_or("INFO").to_lowercase();
        if let Some(bucket) = buckets.get_mut(&severity) {
            bucket.push(issue.clone());
        }
    }
    buckets
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonarReport {
    pub timestamp: String,
    pub project: String,
    pub total_issues: usize,
    pub by_severity: IndexMap<String, usize>,
    pub issues: IndexMap<String, Vec<SonarIssue>>,
    pub context: GitContext,
}

impl SonarReport {
    pub fn new(project_key: &str, issues: &[SonarIssue], context: GitContext) -> Self {
        let categorized = categorize(issues);
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            project: project_key.to_string(),
            total_issues: issues.len(),
            by_severity: categorized
                .iter()
                .map(|(severity, items)| (severity.clone(), items.len()))
                .collect(),
            issues: categorized,
            context,
        }
    }

    pub fn to_json(&self) -> Result<String, SonarError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as `sonarqube_report.json` under `project_root`
    pub fn save(&self, project_root: &Path) -> Result<PathBuf, SonarError> {
        let path = project_root.join(REPORT_FILE);
        std::fs::write(&path, self.to_json()?).map_err(|source| SonarError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::CommandOutput;
    use std::fs;

    struct GitStub {
        branch: Option<&'static str>,
        pr: Option<&'static str>,
    }

    impl CommandRunner for GitStub {
        fn run(&self, program: &str, _: &[&str], _: &Path) -> Option<CommandOutput> {
            let stdout = match program {
                "git" => self.branch?,
                "gh" => self.pr?,
                _ => return None,
            };
            Some(CommandOutput {
                success: true,
                stdout: format!("{}\n", stdout),
                stderr: String::new(),
            })
        }
    }

    fn config_with_token(token: Option<&str>) -> UserConfig {
        let mut config = UserConfig::default();
        config.sonar.token = token.map(str::to_string);
        config
    }

    fn issue(key: &str, severity: Option<&str>) -> SonarIssue {
        SonarIssue {
            key: Some(key.into()),
            severity: severity.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_project_key() {
        let props = "sonar.organization=acme\nsonar.projectKey= acme_web \nsonar.projectKey=other\n";
        assert_eq!(parse_project_key(props).as_deref(), Some("acme_web"));
        assert!(parse_project_key("sonar.projectKey=\n").is_none());
        assert!(parse_project_key("# sonar.projectKey=x").is_none());
    }

    #[test]
    fn test_find_project_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROPERTIES_FILE), "sonar.projectKey=k\n").unwrap();
        let nested = dir.path().join("src/deep");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested).as_deref(), Some(dir.path()));
    }

    #[test]
    fn test_prepare_error_order() {
        let dir = tempfile::tempdir().unwrap();
        let stub = GitStub {
            branch: Some("feature/x"),
            pr: None,
        };
        let err = prepare(dir.path(), &config_with_token(Some("t")), &stub).unwrap_err();
        if find_project_root(dir.path()).is_none() {
            assert!(matches!(err, SonarError::PropertiesNotFound));
            assert_eq!(err.exit_code(), 1);
        }

        fs::write(dir.path().join(PROPERTIES_FILE), "sonar.host=x\n").unwrap();
        let err = prepare(dir.path(), &config_with_token(Some("t")), &stub).unwrap_err();
        assert!(matches!(err, SonarError::MissingProjectKey(_)));

        fs::write(dir.path().join(PROPERTIES_FILE), "sonar.projectKey=acme\n").unwrap();
        let err = prepare(dir.path(), &config_with_token(None), &stub).unwrap_err();
        assert!(matches!(err, SonarError::MissingToken));

        let err = prepare(dir.path(), &config_with_token(Some("t")), &stub).unwrap_err();
        assert!(matches!(err, SonarError::NoPullRequest { .. }));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("'feature/x'"));
    }

    #[test]
    fn test_prepare_success() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROPERTIES_FILE), "sonar.projectKey=acme\n").unwrap();
        let stub = GitStub {
            branch: Some("feature/x"),
            pr: Some("42"),
        };
        let target = prepare(dir.path(), &config_with_token(Some("t")), &stub).unwrap();
        assert_eq!(target.project_key, "acme");
        assert_eq!(target.pull_request, "42");
        assert_eq!(target.base_url, "https://sonarcloud.io");
        assert_eq!(target.context.branch.as_deref(), Some("feature/x"));
    }

    #[test]
    fn test_no_branch_means_no_pr_lookup() {
        let stub = GitStub {
            branch: None,
            pr: Some("7"),
        };
        let ctx = GitContext::detect(&stub, Path::new("."));
        assert_eq!(ctx, GitContext::default());
    }

    #[test]
    fn test_categorize_by_severity() {
        let issues = vec![
            issue("a", Some("MAJOR")),
            issue("b", None),
            issue("c", Some("BLOCKER")),
            issue("d", Some("WEIRD")),
        ];
        let buckets = categorize(&issues);
        let keys: Vec<&str> = buckets.keys().map(String::as_str).collect();
        assert_eq!(keys, SEVERITIES.to_vec());
        assert_eq!(buckets["major"].len(), 1);
        assert_eq!(buckets["info"].len(), 1);
        assert_eq!(buckets["blocker"].len(), 1);
        assert_eq!(buckets.values().map(Vec::len).sum::<usize>(), 3);
    }

    #[test]
    fn test_report_shape_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let context = GitContext {
            branch: Some("feature/x".into()),
            pull_request: Some("42".into()),
        };
        let report = SonarReport::new("acme", &[issue("a", Some("CRITICAL"))], context);
        let path = report.save(dir.path()).unwrap();
        assert!(path.ends_with(REPORT_FILE));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["project"], "acme");
        assert_eq!(value["total_issues"], 1);
        assert_eq!(value["by_severity"]["critical"], 1);
        assert_eq!(value["by_severity"]["info"], 0);
        assert_eq!(value["issues"]["critical"][0]["key"], "a");
        assert!(value["issues"]["critical"][0].get("severity").is_none());
        assert!(value["issues"]["critical"][0]["line"].is_null());
        assert_eq!(value["context"]["pull_request"], "42");
    }
}
