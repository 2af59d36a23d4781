//! Rule evaluation
//!
//! Turns the static rubric into [`CriterionResult`]s for one repository.
//! Skip resolution always runs first, so a skipped rule's check is never
//! executed.

use super::{skip, Check, Pillar, Registry, Rule, RuleContext};
use crate::models::{CriterionResult, CriterionStatus, PillarResult, Scope, SKIP_SCORE};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Fraction of apps that must pass for an app-scoped criterion to pass.
/// Inclusive: exactly 80% passes.
pub const APP_PASS_RATE: f64 = 0.8;

/// Evaluates rules against one repository context
pub struct Evaluator<'a> {
    ctx: &'a RuleContext<'a>,
    registry: &'a Registry,
}

impl<'a> Evaluator<'a> {
    pub fn new(ctx: &'a RuleContext<'a>, registry: &'a Registry) -> Self {
        Self { ctx, registry }
    }

    /// All pillars, keyed by display name, in report order
    pub fn evaluate_all(&self) -> IndexMap<String, PillarResult> {
        Pillar::ALL
            .iter()
            .map(|pillar| (pillar.name().to_string(), self.evaluate_pillar(*pillar)))
            .collect()
    }

    pub fn evaluate_pillar(&self, pillar: Pillar) -> PillarResult {
        let criteria: Vec<CriterionResult> = self
            .registry
            .for_pillar(pillar)
            .map(|rule| self.evaluate_rule(rule))
            .collect();
        let result = PillarResult::from_criteria(pillar.name(), criteria);
        debug!(
            "{}: {}/{} ({}%)",
            result.name, result.passed, result.total, result.percentage
        );
        result
    }

    pub fn evaluate_rule(&self, rule: &Rule) -> CriterionResult {
        if let Some(reason) = skip::skip_reason(self.ctx, rule.id) {
            trace!("{} skipped: {}", rule.id, reason);
            return skip_result(rule, reason);
        }

        let result = match rule.check {
            Check::Repo(check) => repo_result(rule, check(self.ctx)),
            Check::PerApp(check) if self.ctx.uses_app_scope() => {
                let outcomes = self
                    .ctx
                    .app_targets()
                    .iter()
                    .map(|target| (target.name.to_string(), check(self.ctx, target)))
                    .collect();
                app_result(rule, outcomes)
            }
            Check::PerApp(check) => repo_result(rule, check(self.ctx, &self.ctx.root_target())),
            Check::NotDetectable => repo_result(rule, false),
        };
        trace!("{} -> {} ({})", rule.id, result.status, result.score);
        result
    }
}

fn base_result(rule: &Rule, status: CriterionStatus, score: String, reason: &str) -> CriterionResult {
    CriterionResult {
        id: rule.id.to_string(),
        pillar: rule.pillar.name().to_string(),
        level: rule.level,
        status,
        score,
        reason: reason.to_string(),
        scope: Scope::Repo,
        app_results: IndexMap::new(),
    }
}

/// Single repository-wide outcome: "1/1" or "0/1"
pub fn repo_result(rule: &Rule, passed: bool) -> CriterionResult {
    if passed {
        base_result(rule, CriterionStatus::Pass, "1/1".to_string(), rule.pass_reason)
    } else {
        base_result(rule, CriterionStatus::Fail, "0/1".to_string(), rule.fail_reason)
    }
}

/// Skipped criteria keep their scope so reports can still show them as per-app
pub fn skip_result(rule: &Rule, reason: &str) -> CriterionResult {
    let mut result = base_result(rule, CriterionStatus::Skip, SKIP_SCORE.to_string(), reason);
    if rule.is_app_scoped() {
        result.scope = Scope::App;
    }
    result
}

/// Roll per-app outcomes up against [`APP_PASS_RATE`]. A failing result
/// names every failing app after the remediation text.
pub fn app_result(rule: &Rule, outcomes: IndexMap<String, bool>) -> CriterionResult {
    let total = outcomes.len();
    let passed = outcomes.values().filter(|ok| **ok).count();
    let pass_rate = if total > 0 {
        passed as f64 / total as f64
    } else {
        0.0
    };

    let mut result = if pass_rate >= APP_PASS_RATE {
        base_result(
            rule,
            CriterionStatus::Pass,
            format!("{}/{}", passed, total),
            rule.pass_reason,
        )
    } else {
        let failing: Vec<&str> = outcomes
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| name.as_str())
            .collect();
        let reason = format!(
            "{} (failing: {})",
            rule.app_fail_reason.unwrap_or(rule.fail_reason),
            failing.join(", ")
        );
        base_result(
            rule,
            CriterionStatus::Fail,
            format!("{}/{}", passed, total),
            &reason,
        )
    };
    result.scope = Scope::App;
    result.app_results = outcomes;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::tests::OfflineRunner;
    use crate::models::{AppInfo, Language, RepoType};
    use crate::probe::RepoProbe;
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn formatter_rule() -> &'static Rule {
        Registry::global().unwrap().get("formatter").unwrap()
    }

    fn outcomes(pairs: &[(&str, bool)]) -> IndexMap<String, bool> {
        pairs.iter().map(|(n, ok)| (n.to_string(), *ok)).collect()
    }

    fn evaluate(probe: &RepoProbe, repo_type: RepoType, apps: &[AppInfo]) -> IndexMap<String, CriterionResult> {
        let ctx = RuleContext {
            probe,
            runner: &OfflineRunner,
            repo_type,
            languages: &[Language::Unknown],
            apps,
        };
        let evaluator = Evaluator::new(&ctx, Registry::global().unwrap());
        evaluator
            .evaluate_all()
            .into_values()
            .flat_map(|p| p.criteria)
            .map(|c| (c.id.clone(), c))
            .collect()
    }

    #[test]
    fn test_three_of_four_apps_fails_and_names_the_failure() {
        let result = app_result(
            formatter_rule(),
            outcomes(&[("web", true), ("api", true), ("cli", false), ("worker", true)]),
        );
        assert_eq!(result.status, CriterionStatus::Fail);
        assert_eq!(result.score, "3/4");
        assert_eq!(result.scope, Scope::App);
        assert!(result.reason.contains("cli"));
        assert!(result.reason.ends_with("(failing: cli)"));
        assert!(result.reason.starts_with("Add .prettierrc, ruff/black in pyproject.toml"));
    }

    #[test]
    fn test_four_of_five_apps_passes() {
        let result = app_result(
            formatter_rule(),
            outcomes(&[("a", true), ("b", true), ("c", true), ("d", false), ("e", true)]),
        );
        assert_eq!(result.status, CriterionStatus::Pass);
        assert_eq!(result.score, "4/5");
        assert_eq!(result.reason, "Formatter configured");
        assert_eq!(result.app_results.len(), 5);
    }

    #[test]
    fn test_no_apps_fails() {
        let result = app_result(formatter_rule(), IndexMap::new());
        assert_eq!(result.status, CriterionStatus::Fail);
        assert_eq!(result.score, "0/0");
    }

    #[test]
    fn test_repo_result_scores() {
        let rule = formatter_rule();
        assert_eq!(repo_result(rule, true).score, "1/1");
        let failed = repo_result(rule, false);
        assert_eq!(failed.score, "0/1");
        assert_eq!(
            failed.reason,
            "Add .prettierrc, ruff/black in pyproject.toml, or rustfmt.toml for consistent formatting"
        );
    }

    #[test]
    fn test_empty_repository() {
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        let results = evaluate(&probe, RepoType::Application, &[]);

        for (id, reason) in [
            (
                "build_cmd_doc",
                "Document build commands (npm run, make, cargo build, etc.) in README or AGENTS.md",
            ),
            (
                "fast_ci_feedback",
                "Add .github/workflows/*.yml, .gitlab-ci.yml, or .circleci/config.yml",
            ),
            (
                "readme",
                "Add README.md with project overview, setup instructions, and usage examples",
            ),
        ] {
            assert_eq!(results[id].status, CriterionStatus::Fail, "{}", id);
            assert_eq!(results[id].reason, reason);
        }
        assert!(results["formatter"].is_fail());
        assert_eq!(results["formatter"].scope, Scope::Repo);
        assert!(results["devcontainer_runnable"].is_skip());
        assert!(results["agents_md_validation"].is_skip());
        assert_eq!(results["agents_md_validation"].score, SKIP_SCORE);
        assert!(results["monorepo_tooling"].is_skip());
        assert!(results["rollback_automation"].is_fail());
    }

    #[test]
    fn test_library_skips_applied() {
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        let results = evaluate(&probe, RepoType::Library, &[]);
        let skipped: Vec<&str> = results
            .values()
            .filter(|c| c.is_skip())
            .map(|c| c.id.as_str())
            .collect();
        for id in crate::criteria::skip::LIBRARY_SKIPS.iter().map(|(id, _)| *id) {
            assert!(skipped.contains(&id), "{} should be skipped", id);
        }
        assert_eq!(results["health_checks"].scope, Scope::App);
        assert_eq!(results["health_checks"].reason, "Library, not a deployed service");
    }

    #[test]
    fn test_database_skips_applied() {
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        let results = evaluate(&probe, RepoType::Database, &[]);

        assert!(results["n_plus_one_detection"].is_skip());
        assert_eq!(
            results["n_plus_one_detection"].reason,
            "Database project IS the database layer"
        );
        assert_eq!(results["dast_scanning"].score, SKIP_SCORE);
        assert_eq!(results["dast_scanning"].reason, "Database server, not web application");
        assert!(!results["health_checks"].is_skip());
        assert!(!results["database_schema"].is_skip());
    }

    #[test]
    fn test_every_criterion_evaluated_once() {
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        let ctx = RuleContext {
            probe: &probe,
            runner: &OfflineRunner,
            repo_type: RepoType::Application,
            languages: &[Language::Unknown],
            apps: &[],
        };
        let registry = Registry::global().unwrap();
        let pillars = Evaluator::new(&ctx, registry).evaluate_all();
        assert_eq!(pillars.len(), 9);

        let ids: Vec<String> = pillars
            .values()
            .flat_map(|p| p.criteria.iter().map(|c| c.id.clone()))
            .collect();
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(ids.len(), registry.len());
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_monorepo_evaluates_per_app() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "packages/web/package.json", "{}");
        write(dir.path(), "packages/web/.prettierrc", "{}");
        write(dir.path(), "packages/api/package.json", "{}");
        let apps = vec![
            AppInfo {
                name: "web".into(),
                path: dir.path().join("packages/web"),
                languages: vec![Language::JavaScript],
            },
            AppInfo {
                name: "api".into(),
                path: dir.path().join("packages/api"),
                languages: vec![Language::JavaScript],
            },
        ];
        let probe = RepoProbe::new(dir.path());
        let results = evaluate(&probe, RepoType::Monorepo, &apps);

        let formatter = &results["formatter"];
        assert_eq!(formatter.scope, Scope::App);
        assert_eq!(formatter.score, "1/2");
        assert_eq!(formatter.failing_apps(), vec!["api"]);
        assert!(!results["monorepo_tooling"].is_skip());
    }

    #[test]
    fn test_apps_sharing_a_folder_name_each_count() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "packages/web/package.json", "{}");
        write(dir.path(), "packages/web/.prettierrc", "{}");
        write(dir.path(), "apps/web/package.json", "{}");
        let probe = RepoProbe::new(dir.path());
        let apps = crate::classifier::detect_apps(&probe).apps;
        assert_eq!(apps.len(), 2);

        let results = evaluate(&probe, RepoType::Monorepo, &apps);
        let formatter = &results["formatter"];
        assert_eq!(formatter.score, "1/2");
        assert_eq!(formatter.app_results.len(), apps.len());
        assert_eq!(formatter.failing_apps(), vec!["apps/web"]);
    }

    #[test]
    fn test_skip_result_scope() {
        let registry = Registry::global().unwrap();
        let readme = registry.get("readme").unwrap();
        assert_eq!(skip_result(readme, "n/a").scope, Scope::Repo);
        assert_eq!(skip_result(formatter_rule(), "n/a").scope, Scope::App);
    }
}
