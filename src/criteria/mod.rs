//! Readiness rubric
//!
//! Every criterion is one static [`Rule`]: an id, a pillar, a maturity level,
//! a boolean check over the [`RuleContext`], and the reason text shown on
//! pass and on failure. The pillar files below each contribute one table;
//! [`Registry::global`] stitches them together in pillar order and validates
//! the whole rubric (unique ids, levels 1-5, skip and app-scope tables
//! referring only to known ids) the first time it is used.
//!
//! Checks return plain `bool`. All I/O and subprocess failures are absorbed
//! by the probe and command runner as negative signals, so evaluation always
//! yields a complete result set.

mod build;
mod dev_env;
mod docs;
pub mod engine;
mod observability;
mod product;
mod security;
pub mod skip;
mod style;
mod tasks;
mod testing;

pub use engine::{app_result, repo_result, skip_result, Evaluator, APP_PASS_RATE};

use crate::models::{AppInfo, Language, RepoType};
use crate::probe::{CommandOutput, CommandRunner, RepoProbe};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

/// Criterion categories, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pillar {
    StyleValidation,
    BuildSystem,
    Testing,
    Documentation,
    DevEnvironment,
    Observability,
    Security,
    TaskDiscovery,
    ProductAnalytics,
}

impl Pillar {
    pub const ALL: [Pillar; 9] = [
        Pillar::StyleValidation,
        Pillar::BuildSystem,
        Pillar::Testing,
        Pillar::Documentation,
        Pillar::DevEnvironment,
        Pillar::Observability,
        Pillar::Security,
        Pillar::TaskDiscovery,
        Pillar::ProductAnalytics,
    ];

    /// Display name, also the key in the persisted record
    pub fn name(&self) -> &'static str {
        match self {
            Pillar::StyleValidation => "Style & Validation",
            Pillar::BuildSystem => "Build System",
            Pillar::Testing => "Testing",
            Pillar::Documentation => "Documentation",
            Pillar::DevEnvironment => "Dev Environment",
            Pillar::Observability => "Debugging & Observability",
            Pillar::Security => "Security",
            Pillar::TaskDiscovery => "Task Discovery",
            Pillar::ProductAnalytics => "Product & Analytics",
        }
    }

    /// Concise chart label
    pub fn short_name(&self) -> &'static str {
        match self {
            Pillar::StyleValidation => "Style",
            Pillar::BuildSystem => "Build",
            Pillar::Testing => "Test",
            Pillar::Documentation => "Docs",
            Pillar::DevEnvironment => "DevEnv",
            Pillar::Observability => "Debug",
            Pillar::Security => "Security",
            Pillar::TaskDiscovery => "Tasks",
            Pillar::ProductAnalytics => "Product",
        }
    }

    pub fn from_name(name: &str) -> Option<Pillar> {
        Pillar::ALL.into_iter().find(|p| p.name() == name)
    }

    fn rules(&self) -> &'static [Rule] {
        match self {
            Pillar::StyleValidation => style::RULES,
            Pillar::BuildSystem => build::RULES,
            Pillar::Testing => testing::RULES,
            Pillar::Documentation => docs::RULES,
            Pillar::DevEnvironment => dev_env::RULES,
            Pillar::Observability => observability::RULES,
            Pillar::Security => security::RULES,
            Pillar::TaskDiscovery => tasks::RULES,
            Pillar::ProductAnalytics => product::RULES,
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Criteria evaluated per sub-application in a monorepo. Each must use
/// [`Check::PerApp`], and every per-app check must be listed here.
pub const APP_SCOPED: &[&str] = &[
    "formatter",
    "lint_config",
    "type_check",
    "strict_typing",
    "unit_tests_exist",
    "unit_tests_runnable",
    "test_naming_conventions",
    "test_isolation",
    "integration_tests_exist",
    "test_coverage_thresholds",
    "deps_pinned",
    "build_cmd_doc",
    "structured_logging",
    "health_checks",
    "error_tracking_contextualized",
];

pub type RepoCheck = fn(&RuleContext<'_>) -> bool;
pub type AppCheck = fn(&RuleContext<'_>, &AppTarget<'_>) -> bool;

/// How a criterion decides pass or fail
#[derive(Clone, Copy)]
pub enum Check {
    /// One evaluation for the whole repository
    Repo(RepoCheck),
    /// Evaluated per app in a monorepo, or once against the repo root
    PerApp(AppCheck),
    /// No reliable signal exists yet; always fails
    NotDetectable,
}

/// One rubric entry
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub pillar: Pillar,
    pub level: u8,
    pub check: Check,
    pub pass_reason: &'static str,
    pub fail_reason: &'static str,
    /// Remediation used when failing apps are listed after it
    pub app_fail_reason: Option<&'static str>,
}

impl Rule {
    pub const fn repo(
        pillar: Pillar,
        id: &'static str,
        level: u8,
        check: RepoCheck,
        pass_reason: &'static str,
        fail_reason: &'static str,
    ) -> Self {
        Rule {
            id,
            pillar,
            level,
            check: Check::Repo(check),
            pass_reason,
            fail_reason,
            app_fail_reason: None,
        }
    }

    pub const fn per_app(
        pillar: Pillar,
        id: &'static str,
        level: u8,
        check: AppCheck,
        pass_reason: &'static str,
        fail_reason: &'static str,
    ) -> Self {
        Rule {
            id,
            pillar,
            level,
            check: Check::PerApp(check),
            pass_reason,
            fail_reason,
            app_fail_reason: None,
        }
    }

    pub const fn not_detectable(
        pillar: Pillar,
        id: &'static str,
        level: u8,
        pass_reason: &'static str,
        fail_reason: &'static str,
    ) -> Self {
        Rule {
            id,
            pillar,
            level,
            check: Check::NotDetectable,
            pass_reason,
            fail_reason,
            app_fail_reason: None,
        }
    }

    pub const fn with_app_fail_reason(self, reason: &'static str) -> Self {
        Rule {
            app_fail_reason: Some(reason),
            ..self
        }
    }

    pub fn is_app_scoped(&self) -> bool {
        matches!(self.check, Check::PerApp(_))
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("pillar", &self.pillar)
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

/// Everything a check may look at
pub struct RuleContext<'a> {
    pub probe: &'a RepoProbe,
    pub runner: &'a dyn CommandRunner,
    pub repo_type: RepoType,
    pub languages: &'a [Language],
    pub apps: &'a [AppInfo],
}

impl<'a> RuleContext<'a> {
    pub fn has_language(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    /// True for Go or Rust, whose compilers already enforce types
    pub fn statically_typed(&self) -> bool {
        self.languages.iter().any(Language::is_statically_typed)
    }

    /// Per-app evaluation applies only to monorepos with detected apps
    pub fn uses_app_scope(&self) -> bool {
        self.repo_type == RepoType::Monorepo && !self.apps.is_empty()
    }

    /// Run a command in the repository root
    pub fn run(&self, program: &str, args: &[&str]) -> Option<CommandOutput> {
        self.runner.run(program, args, self.probe.root())
    }

    pub fn run_succeeds(&self, program: &str, args: &[&str]) -> bool {
        self.runner.succeeds(program, args, self.probe.root())
    }

    /// The whole repository as an evaluation target
    pub fn root_target(&self) -> AppTarget<'a> {
        AppTarget {
            name: "",
            dir: String::new(),
            languages: self.languages,
        }
    }

    /// One target per detected app, in detection order
    pub fn app_targets(&self) -> Vec<AppTarget<'a>> {
        self.apps
            .iter()
            .map(|app| AppTarget {
                name: &app.name,
                dir: relative_dir(self.probe, app),
                languages: &app.languages,
            })
            .collect()
    }

    /// Lowercased concatenation of dependency manifests in a repo-relative dir
    pub(crate) fn dependency_text(&self, dir: &str, manifests: &[&str]) -> String {
        self.probe.read_all_lower_in(dir, manifests)
    }

    /// README plus AGENTS.md (or CLAUDE.md) at the root, lowercased
    pub(crate) fn agent_docs_text(&self) -> String {
        self.agent_docs_text_in("")
    }

    pub(crate) fn agent_docs_text_in(&self, dir: &str) -> String {
        let agents = ["AGENTS.md", "CLAUDE.md"]
            .iter()
            .find_map(|f| self.probe.read_in(dir, f))
            .map(|c| c.to_lowercase())
            .unwrap_or_default();
        format!("{}\n{}", self.probe.read_lower_in(dir, "README.md"), agents)
    }
}

/// A directory a per-app check runs against: an app folder, or the repo
/// root (empty `dir`) when the repository is evaluated as a whole.
#[derive(Debug, Clone)]
pub struct AppTarget<'a> {
    pub name: &'a str,
    /// Repo-relative, `/`-separated
    pub dir: String,
    pub languages: &'a [Language],
}

impl AppTarget<'_> {
    pub fn is_root(&self) -> bool {
        self.dir.is_empty()
    }

    pub fn statically_typed(&self) -> bool {
        self.languages.iter().any(Language::is_statically_typed)
    }

    /// Apply `check` to this target, then to the repo root as a fallback.
    /// Apps inherit configuration placed at the top of the monorepo.
    pub fn or_root(&self, check: impl Fn(&str) -> bool) -> bool {
        check(&self.dir) || (!self.is_root() && check(""))
    }
}

fn relative_dir(probe: &RepoProbe, app: &AppInfo) -> String {
    app.path
        .strip_prefix(probe.root())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_else(|_| app.name.clone())
}

/// Rubric validation failures. These are programming errors in the rule
/// tables and abort the run before any repository is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate criterion id '{0}'")]
    DuplicateId(&'static str),

    #[error("criterion '{id}' has level {level}, expected 1-5")]
    InvalidLevel { id: &'static str, level: u8 },

    #[error("criterion '{id}' is listed under {expected} but declared in {actual}")]
    WrongPillar {
        id: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("skip table references unknown criterion '{0}'")]
    UnknownSkip(&'static str),

    #[error("app-scope list references unknown criterion '{0}'")]
    UnknownAppScoped(&'static str),

    #[error("criterion '{0}' is app-scoped but has no per-app check")]
    MissingAppCheck(&'static str),

    #[error("criterion '{0}' has a per-app check but is not in the app-scope list")]
    UnlistedAppCheck(&'static str),
}

/// Validated rubric, in pillar order
#[derive(Debug)]
pub struct Registry {
    rules: Vec<&'static Rule>,
}

static REGISTRY: OnceLock<Result<Registry, RegistryError>> = OnceLock::new();

impl Registry {
    /// The built-in rubric, validated on first use
    pub fn global() -> Result<&'static Registry, RegistryError> {
        REGISTRY
            .get_or_init(|| {
                let tables: Vec<(Pillar, &'static [Rule])> =
                    Pillar::ALL.iter().map(|p| (*p, p.rules())).collect();
                Registry::build(&tables, skip::referenced_ids(), APP_SCOPED)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Assemble and validate a rubric from per-pillar tables
    pub fn build(
        tables: &[(Pillar, &'static [Rule])],
        skip_ids: impl IntoIterator<Item = &'static str>,
        app_scoped: &[&'static str],
    ) -> Result<Registry, RegistryError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::new();

        for &(pillar, table) in tables {
            for rule in table {
                if !seen.insert(rule.id) {
                    return Err(RegistryError::DuplicateId(rule.id));
                }
                if !(1..=5).contains(&rule.level) {
                    return Err(RegistryError::InvalidLevel {
                        id: rule.id,
                        level: rule.level,
                    });
                }
                if rule.pillar != pillar {
                    return Err(RegistryError::WrongPillar {
                        id: rule.id,
                        expected: pillar.name(),
                        actual: rule.pillar.name(),
                    });
                }
                rules.push(rule);
            }
        }

        for id in skip_ids {
            if !seen.contains(id) {
                return Err(RegistryError::UnknownSkip(id));
            }
        }

        for &id in app_scoped {
            let rule = rules
                .iter()
                .find(|r| r.id == id)
                .ok_or(RegistryError::UnknownAppScoped(id))?;
            if !rule.is_app_scoped() {
                return Err(RegistryError::MissingAppCheck(id));
            }
        }
        if let Some(rule) = rules
            .iter()
            .find(|r| r.is_app_scoped() && !app_scoped.contains(&r.id))
        {
            return Err(RegistryError::UnlistedAppCheck(rule.id));
        }

        Ok(Registry { rules })
    }

    pub fn rules(&self) -> &[&'static Rule] {
        &self.rules
    }

    pub fn for_pillar(&self, pillar: Pillar) -> impl Iterator<Item = &'static Rule> + '_ {
        self.rules.iter().copied().filter(move |r| r.pillar == pillar)
    }

    pub fn get(&self, id: &str) -> Option<&'static Rule> {
        self.rules.iter().copied().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;

    /// Runner that never succeeds, keeping checks hermetic
    pub(crate) struct OfflineRunner;

    impl CommandRunner for OfflineRunner {
        fn run(&self, _: &str, _: &[&str], _: &Path) -> Option<CommandOutput> {
            None
        }
    }

    fn yes(_: &RuleContext<'_>) -> bool {
        true
    }

    fn yes_app(_: &RuleContext<'_>, _: &AppTarget<'_>) -> bool {
        true
    }

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = Registry::global().expect("built-in rubric validates");
        assert!(registry.len() > 80);
        assert!(registry.get("formatter").is_some());
        assert!(registry.get("product_analytics_instrumentation").is_some());
    }

    #[test]
    fn test_builtin_registry_is_in_pillar_order() {
        let registry = Registry::global().unwrap();
        let order: Vec<usize> = registry
            .rules()
            .iter()
            .map(|r| Pillar::ALL.iter().position(|p| *p == r.pillar).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_every_pillar_has_rules() {
        let registry = Registry::global().unwrap();
        for pillar in Pillar::ALL {
            assert!(registry.for_pillar(pillar).count() > 0, "{}", pillar);
        }
    }

    #[test]
    fn test_app_scoped_ids_have_per_app_checks() {
        let registry = Registry::global().unwrap();
        for id in APP_SCOPED {
            assert!(registry.get(id).unwrap().is_app_scoped(), "{}", id);
        }
    }

    static DUPLICATE: &[Rule] = &[
        Rule::repo(Pillar::Testing, "a", 1, yes, "ok", "no"),
        Rule::repo(Pillar::Testing, "a", 2, yes, "ok", "no"),
    ];

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Registry::build(&[(Pillar::Testing, DUPLICATE)], [], &[]).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("a"));
    }

    static BAD_LEVEL: &[Rule] = &[Rule::repo(Pillar::Testing, "a", 6, yes, "ok", "no")];

    #[test]
    fn test_level_out_of_range_rejected() {
        let err = Registry::build(&[(Pillar::Testing, BAD_LEVEL)], [], &[]).unwrap_err();
        assert_eq!(err, RegistryError::InvalidLevel { id: "a", level: 6 });
    }

    static SIMPLE: &[Rule] = &[
        Rule::repo(Pillar::Testing, "a", 1, yes, "ok", "no"),
        Rule::per_app(Pillar::Testing, "b", 1, yes_app, "ok", "no"),
    ];

    #[test]
    fn test_unknown_skip_id_rejected() {
        let err = Registry::build(&[(Pillar::Testing, SIMPLE)], ["zzz"], &["b"]).unwrap_err();
        assert_eq!(err, RegistryError::UnknownSkip("zzz"));
    }

    #[test]
    fn test_app_scope_list_must_match_checks() {
        let err = Registry::build(&[(Pillar::Testing, SIMPLE)], [], &["b", "a"]).unwrap_err();
        assert_eq!(err, RegistryError::MissingAppCheck("a"));

        let err = Registry::build(&[(Pillar::Testing, SIMPLE)], [], &[]).unwrap_err();
        assert_eq!(err, RegistryError::UnlistedAppCheck("b"));

        let err = Registry::build(&[(Pillar::Testing, SIMPLE)], [], &["b", "c"]).unwrap_err();
        assert_eq!(err, RegistryError::UnknownAppScoped("c"));

        assert!(Registry::build(&[(Pillar::Testing, SIMPLE)], ["a"], &["b"]).is_ok());
    }

    #[test]
    fn test_rule_in_wrong_table_rejected() {
        let err = Registry::build(&[(Pillar::Security, BAD_LEVEL)], [], &[]).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidLevel { .. }));

        static MISPLACED: &[Rule] = &[Rule::repo(Pillar::Testing, "m", 1, yes, "ok", "no")];
        let err = Registry::build(&[(Pillar::Security, MISPLACED)], [], &[]).unwrap_err();
        assert!(matches!(err, RegistryError::WrongPillar { id: "m", .. }));
    }

    #[test]
    fn test_pillar_names_round_trip() {
        for pillar in Pillar::ALL {
            assert_eq!(Pillar::from_name(pillar.name()), Some(pillar));
        }
        assert_eq!(Pillar::from_name("Nope"), None);
    }
}
