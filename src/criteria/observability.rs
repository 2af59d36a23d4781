//! Debugging & Observability
//!
//! Most signals come from dependency manifests: a logging, tracing, or metrics
//! library named in package.json, requirements.txt, or go.mod.

use super::{AppTarget, Pillar, Rule, RuleContext};
use crate::models::Language;
use crate::probe::WORKFLOW_GLOB;

const P: Pillar = Pillar::Observability;

pub(super) const DEPENDENCY_MANIFESTS: &[&str] = &["package.json", "requirements.txt", "go.mod"];

const HEALTH_PATTERN: &str = r"health|ready|alive";

pub(super) const RULES: &[Rule] = &[
    Rule::per_app(
        P,
        "structured_logging",
        2,
        structured_logging,
        "Structured logging configured",
        "Add pino/winston (JS), structlog/loguru (Python), or zap/zerolog (Go) for structured logs",
    ),
    Rule::repo(
        P,
        "code_quality_metrics",
        2,
        |ctx| ctx.probe.search(WORKFLOW_GLOB, Some(r"(coverage|sonar|quality)")),
        "Code quality metrics tracked",
        "Add SonarQube, Codecov, or code coverage reporting to CI workflow",
    ),
    Rule::per_app(
        P,
        "error_tracking_contextualized",
        3,
        error_tracking,
        "Error tracking configured",
        "Add Sentry, Bugsnag, Rollbar, or Honeybadger for error monitoring",
    ),
    Rule::repo(
        P,
        "distributed_tracing",
        3,
        |ctx| {
            root_deps_mention(
                ctx,
                &["opentelemetry", "jaeger", "zipkin", "datadog", "x-request-id"],
            )
        },
        "Distributed tracing configured",
        "Add OpenTelemetry, Jaeger, or Datadog APM for distributed request tracing",
    ),
    Rule::repo(
        P,
        "metrics_collection",
        3,
        |ctx| {
            root_deps_mention(
                ctx,
                &["prometheus", "datadog", "newrelic", "statsd", "cloudwatch"],
            )
        },
        "Metrics collection configured",
        "Add Prometheus, Datadog, or StatsD for application metrics collection",
    ),
    Rule::per_app(
        P,
        "health_checks",
        3,
        health_checks,
        "Health checks implemented",
        "Add /health, /ready, and /alive endpoints for container orchestration",
    ),
    Rule::repo(
        P,
        "profiling_instrumentation",
        4,
        |ctx| root_deps_mention(ctx, &["pyinstrument", "py-spy", "pprof", "clinic"]),
        "Profiling configured",
        "Add pyinstrument/py-spy (Python), pprof (Go), or clinic (Node) for profiling",
    ),
    Rule::repo(
        P,
        "alerting_configured",
        4,
        |ctx| {
            ctx.probe
                .exists(&["**/alerts*.yml", "**/alertmanager*", "monitoring/**"])
        },
        "Alerting configured",
        "Add monitoring/alerts.yml or configure Alertmanager/PagerDuty integration",
    ),
    Rule::repo(
        P,
        "deployment_observability",
        4,
        |ctx| {
            ctx.probe
                .search(WORKFLOW_GLOB, Some(r"(datadog|grafana|newrelic|deploy.*notify)"))
        },
        "Deployment observability configured",
        "Add deployment tracking via Datadog, Grafana annotations, or deploy notifications",
    ),
    Rule::repo(
        P,
        "runbooks_documented",
        4,
        |ctx| ctx.probe.exists(&["runbooks/**", "docs/runbooks/**", "ops/**"]),
        "Runbooks documented",
        "Add runbooks/ or docs/runbooks/ with incident response procedures",
    ),
    Rule::repo(
        P,
        "circuit_breakers",
        5,
        |ctx| {
            root_deps_mention(
                ctx,
                &["opossum", "resilience4j", "hystrix", "cockatiel"],
            )
        },
        "Circuit breakers configured",
        "Add opossum (Node), resilience4j (Java), or cockatiel (TS) for circuit breakers",
    ),
];

const LOGGING_LIBRARIES: &[&str] = &[
    "pino",
    "winston",
    "bunyan",
    "structlog",
    "loguru",
    "zerolog",
    "zap",
    "slog",
];

const ERROR_TRACKERS: &[&str] = &["sentry", "bugsnag", "rollbar", "honeybadger"];

fn deps_mention(ctx: &RuleContext<'_>, dir: &str, needles: &[&str]) -> bool {
    let deps = ctx.dependency_text(dir, DEPENDENCY_MANIFESTS);
    needles.iter().any(|n| deps.contains(n))
}

fn root_deps_mention(ctx: &RuleContext<'_>, needles: &[&str]) -> bool {
    deps_mention(ctx, "", needles)
}

fn structured_logging(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    target.or_root(|dir| deps_mention(ctx, dir, LOGGING_LIBRARIES))
        || (target.languages.contains(&Language::Python)
            && ctx
                .probe
                .search_in(&target.dir, "**/*.py", Some("import logging")))
}

fn error_tracking(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    target.or_root(|dir| deps_mention(ctx, dir, ERROR_TRACKERS))
}

fn health_checks(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    ["**/*.py", "**/*.ts", "**/*.go"]
        .iter()
        .any(|glob| ctx.probe.search_in(&target.dir, glob, Some(HEALTH_PATTERN)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::tests::OfflineRunner;
    use crate::models::{AppInfo, RepoType};
    use crate::probe::RepoProbe;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_logging_from_stdlib_import_in_python() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app/main.py", "import logging\nlog = logging.getLogger()\n");
        let probe = RepoProbe::new(dir.path());
        let ctx = RuleContext {
            probe: &probe,
            runner: &OfflineRunner,
            repo_type: RepoType::Application,
            languages: &[Language::Python],
            apps: &[],
        };
        assert!(structured_logging(&ctx, &ctx.root_target()));

        let ctx = RuleContext {
            languages: &[Language::Go],
            ..ctx
        };
        assert!(!structured_logging(&ctx, &ctx.root_target()));
    }

    #[test]
    fn test_health_checks_scoped_to_app_folder() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "services/api/go.mod", "module api");
        write(dir.path(), "services/api/server.go", "mux.HandleFunc(\"/healthz\", ok)");
        write(dir.path(), "services/worker/go.mod", "module worker");
        write(dir.path(), "services/worker/main.go", "func main() {}");
        let apps = vec![
            AppInfo {
                name: "api".into(),
                path: dir.path().join("services/api"),
                languages: vec![Language::Go],
            },
            AppInfo {
                name: "worker".into(),
                path: dir.path().join("services/worker"),
                languages: vec![Language::Go],
            },
        ];
        let probe = RepoProbe::new(dir.path());
        let ctx = RuleContext {
            probe: &probe,
            runner: &OfflineRunner,
            repo_type: RepoType::Monorepo,
            languages: &[Language::Go],
            apps: &apps,
        };
        let targets = ctx.app_targets();
        assert!(health_checks(&ctx, &targets[0]));
        assert!(!health_checks(&ctx, &targets[1]));
        assert!(health_checks(&ctx, &ctx.root_target()));
    }

    #[test]
    fn test_error_tracking_inherits_root_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", r#"{"dependencies":{"@sentry/node":"7"}}"#);
        write(dir.path(), "apps/web/package.json", "{}");
        let apps = vec![AppInfo {
            name: "web".into(),
            path: dir.path().join("apps/web"),
            languages: vec![Language::JavaScript],
        }];
        let probe = RepoProbe::new(dir.path());
        let ctx = RuleContext {
            probe: &probe,
            runner: &OfflineRunner,
            repo_type: RepoType::Monorepo,
            languages: &[Language::JavaScript],
            apps: &apps,
        };
        assert!(error_tracking(&ctx, &ctx.app_targets()[0]));
    }
}
