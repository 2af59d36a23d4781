//! Skip resolution
//!
//! A skipped criterion is excluded from every denominator. Membership in
//! these tables is the only source of skips; nothing is inferred by analogy
//! between repo types.

use super::RuleContext;
use crate::models::RepoType;

/// Criteria that make no sense for a reusable library
pub const LIBRARY_SKIPS: &[(&str, &str)] = &[
    ("health_checks", "Library, not a deployed service"),
    ("progressive_rollout", "Not applicable for a library"),
    ("rollback_automation", "Not applicable for a library"),
    ("dast_scanning", "Library, not a web service"),
    ("alerting_configured", "Library without runtime"),
    ("deployment_observability", "Library without deployments"),
    ("metrics_collection", "Library without runtime"),
    ("profiling_instrumentation", "Library where profiling not meaningful"),
    ("circuit_breakers", "Library without external dependencies"),
    ("distributed_tracing", "Library without runtime"),
    ("local_services_setup", "Library without external dependencies"),
    ("database_schema", "Library without database"),
    ("n_plus_one_detection", "Library without database/ORM"),
    ("privacy_compliance", "Library without user data"),
    ("pii_handling", "Library without user data"),
];

pub const DATABASE_SKIPS: &[(&str, &str)] = &[
    ("n_plus_one_detection", "Database project IS the database layer"),
    ("dast_scanning", "Database server, not web application"),
];

pub const CLI_SKIPS: &[(&str, &str)] = &[
    ("dast_scanning", "CLI tool, not web application"),
    ("health_checks", "CLI tool, not a service"),
    ("progressive_rollout", "CLI tool without deployments"),
];

/// Only meaningful when the repository holds several applications
pub const MONOREPO_ONLY: &[&str] = &["monorepo_tooling", "version_drift_detection"];

const MONOREPO_ONLY_REASON: &str = "Single-application repository, not a monorepo";

/// Criteria that cannot be judged until something else exists
struct Prerequisite {
    id: &'static str,
    met: fn(&RuleContext<'_>) -> bool,
    reason: &'static str,
}

const PREREQUISITES: &[Prerequisite] = &[
    Prerequisite {
        id: "devcontainer_runnable",
        met: has_devcontainer,
        reason: "No devcontainer to test (prerequisite failed)",
    },
    Prerequisite {
        id: "agents_md_validation",
        met: has_agents_md,
        reason: "No AGENTS.md exists (prerequisite failed)",
    },
    Prerequisite {
        id: "dead_feature_flag_detection",
        met: has_feature_flags,
        reason: "No feature flag infrastructure (prerequisite failed)",
    },
];

/// Vendor names and spellings that indicate feature-flag infrastructure
const FEATURE_FLAG_MARKERS: &[&str] = &[
    "launchdarkly",
    "statsig",
    "unleash",
    "growthbook",
    "feature.flag",
    "featureflag",
    "feature_flag",
];

const FEATURE_FLAG_MANIFESTS: &[&str] = &["package.json", "requirements.txt", "go.mod", "Gemfile"];

fn has_devcontainer(ctx: &RuleContext<'_>) -> bool {
    ctx.probe.exists(&[".devcontainer/devcontainer.json"])
}

fn has_agents_md(ctx: &RuleContext<'_>) -> bool {
    ctx.probe.exists(&["AGENTS.md", "CLAUDE.md"])
}

/// True if a dependency manifest names a known feature-flag provider
pub fn has_feature_flags(ctx: &RuleContext<'_>) -> bool {
    FEATURE_FLAG_MANIFESTS.iter().any(|manifest| {
        let content = ctx.probe.read_lower(manifest);
        FEATURE_FLAG_MARKERS.iter().any(|m| content.contains(m))
    })
}

fn type_skips(repo_type: RepoType) -> &'static [(&'static str, &'static str)] {
    match repo_type {
        RepoType::Library => LIBRARY_SKIPS,
        RepoType::Database => DATABASE_SKIPS,
        RepoType::Cli => CLI_SKIPS,
        RepoType::Monorepo | RepoType::Application => &[],
    }
}

/// Reason to skip `id` for this repository, if any. Repo-type skips take
/// precedence, then monorepo-only criteria, then unmet prerequisites.
pub fn skip_reason(ctx: &RuleContext<'_>, id: &str) -> Option<&'static str> {
    if let Some(&(_, reason)) = type_skips(ctx.repo_type).iter().find(|(s, _)| *s == id) {
        return Some(reason);
    }
    if ctx.repo_type != RepoType::Monorepo && MONOREPO_ONLY.contains(&id) {
        return Some(MONOREPO_ONLY_REASON);
    }
    PREREQUISITES
        .iter()
        .find(|p| p.id == id)
        .filter(|p| !(p.met)(ctx))
        .map(|p| p.reason)
}

/// Every criterion id named by a skip table, for registry validation
pub fn referenced_ids() -> impl Iterator<Item = &'static str> {
    LIBRARY_SKIPS
        .iter()
        .chain(DATABASE_SKIPS)
        .chain(CLI_SKIPS)
        .map(|(id, _)| *id)
        .chain(MONOREPO_ONLY.iter().copied())
        .chain(PREREQUISITES.iter().map(|p| p.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::tests::OfflineRunner;
    use crate::models::Language;
    use crate::probe::RepoProbe;
    use std::fs;

    fn ctx<'a>(probe: &'a RepoProbe, repo_type: RepoType) -> RuleContext<'a> {
        RuleContext {
            probe,
            runner: &OfflineRunner,
            repo_type,
            languages: &[Language::Unknown],
            apps: &[],
        }
    }

    #[test]
    fn test_library_skips_exactly_fifteen() {
        assert_eq!(LIBRARY_SKIPS.len(), 15);
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        let c = ctx(&probe, RepoType::Library);
        assert_eq!(skip_reason(&c, "health_checks"), Some("Library, not a deployed service"));
        assert_eq!(skip_reason(&c, "database_schema"), Some("Library without database"));
        assert_eq!(skip_reason(&c, "formatter"), None);
        assert_eq!(skip_reason(&c, "secret_scanning"), None);
    }

    #[test]
    fn test_skips_do_not_leak_between_repo_types() {
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        let c = ctx(&probe, RepoType::Cli);
        assert_eq!(skip_reason(&c, "dast_scanning"), Some("CLI tool, not web application"));
        assert_eq!(skip_reason(&c, "pii_handling"), None);

        let c = ctx(&probe, RepoType::Application);
        assert_eq!(skip_reason(&c, "health_checks"), None);
    }

    #[test]
    fn test_database_skips() {
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        let db = ctx(&probe, RepoType::Database);
        assert_eq!(
            skip_reason(&db, "n_plus_one_detection"),
            Some("Database project IS the database layer")
        );
        assert_eq!(
            skip_reason(&db, "dast_scanning"),
            Some("Database server, not web application")
        );
        // CLI-only skips stay evaluated for a database
        assert_eq!(skip_reason(&db, "health_checks"), None);
        assert_eq!(skip_reason(&db, "progressive_rollout"), None);
        assert_eq!(skip_reason(&db, "pii_handling"), None);

        let cli = ctx(&probe, RepoType::Cli);
        assert_eq!(skip_reason(&cli, "n_plus_one_detection"), None);
        assert_eq!(skip_reason(&cli, "dast_scanning"), Some("CLI tool, not web application"));
    }

    #[test]
    fn test_monorepo_only_criteria() {
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        assert_eq!(
            skip_reason(&ctx(&probe, RepoType::Application), "monorepo_tooling"),
            Some(MONOREPO_ONLY_REASON)
        );
        assert_eq!(skip_reason(&ctx(&probe, RepoType::Monorepo), "monorepo_tooling"), None);
    }

    #[test]
    fn test_prerequisites() {
        let dir = tempfile::tempdir().unwrap();
        let probe = RepoProbe::new(dir.path());
        let c = ctx(&probe, RepoType::Application);
        assert_eq!(
            skip_reason(&c, "devcontainer_runnable"),
            Some("No devcontainer to test (prerequisite failed)")
        );
        assert_eq!(
            skip_reason(&c, "agents_md_validation"),
            Some("No AGENTS.md exists (prerequisite failed)")
        );
        assert_eq!(
            skip_reason(&c, "dead_feature_flag_detection"),
            Some("No feature flag infrastructure (prerequisite failed)")
        );

        fs::write(dir.path().join("CLAUDE.md"), "# ctx").unwrap();
        fs::write(dir.path().join("package.json"), r#"{"dependencies":{"@growthbook/growthbook":"1"}}"#)
            .unwrap();
        let probe = RepoProbe::new(dir.path());
        let c = ctx(&probe, RepoType::Application);
        assert_eq!(skip_reason(&c, "agents_md_validation"), None);
        assert_eq!(skip_reason(&c, "dead_feature_flag_detection"), None);
    }
}
