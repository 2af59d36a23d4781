//! Build System: documented commands, pinned dependencies, CI and release

use super::skip::has_feature_flags;
use super::{AppTarget, Pillar, Rule, RuleContext};
use crate::probe::WORKFLOW_GLOB;

const P: Pillar = Pillar::BuildSystem;

pub(super) const RULES: &[Rule] = &[
    Rule::per_app(
        P,
        "build_cmd_doc",
        1,
        build_cmd_doc,
        "Build commands documented",
        "Document build commands (npm run, make, cargo build, etc.) in README or AGENTS.md",
    ),
    Rule::per_app(
        P,
        "deps_pinned",
        1,
        deps_pinned,
        "Dependencies pinned with lockfile",
        "Add package-lock.json, uv.lock, poetry.lock, or Cargo.lock to pin dependencies",
    )
    .with_app_fail_reason("Add package-lock.json, uv.lock, or Cargo.lock"),
    Rule::repo(
        P,
        "vcs_cli_tools",
        1,
        vcs_cli_tools,
        "VCS CLI authenticated",
        "Run 'gh auth login' or 'glab auth login' to authenticate VCS CLI",
    ),
    Rule::repo(
        P,
        "fast_ci_feedback",
        2,
        fast_ci_feedback,
        "CI workflow configured",
        "Add .github/workflows/*.yml, .gitlab-ci.yml, or .circleci/config.yml",
    ),
    Rule::repo(
        P,
        "single_command_setup",
        2,
        single_command_setup,
        "Single command setup documented",
        "Document a single setup command (make install, npm install, docker-compose up) in README",
    ),
    Rule::repo(
        P,
        "release_automation",
        2,
        release_workflow,
        "Release automation configured",
        "Add a release/publish workflow in .github/workflows/ with semantic-release or similar",
    ),
    // Release automation stands in for deploy cadence; there is no history to read
    Rule::repo(
        P,
        "deployment_frequency",
        2,
        release_workflow,
        "Regular deployments",
        "Set up CI/CD pipeline for automated deployments on merge to main",
    ),
    Rule::repo(
        P,
        "release_notes_automation",
        3,
        |ctx| {
            ctx.probe
                .search(WORKFLOW_GLOB, Some(r"(changelog|release.notes|latest.changes)"))
        },
        "Release notes automated",
        "Add auto-changelog, release-please, or semantic-release for automated release notes",
    ),
    Rule::repo(
        P,
        "agentic_development",
        3,
        agentic_development,
        "AI agent commits found",
        "Use AI coding assistants (Claude, Copilot) with Co-Authored-By commit trailers",
    ),
    Rule::repo(
        P,
        "automated_pr_review",
        3,
        automated_pr_review,
        "Automated PR review configured",
        "Add danger.js or a PR lint workflow for automated PR review checks",
    ),
    Rule::repo(
        P,
        "feature_flag_infrastructure",
        3,
        has_feature_flags,
        "Feature flags configured",
        "Add LaunchDarkly, Statsig, Unleash, or GrowthBook for feature flag management",
    ),
    Rule::repo(
        P,
        "build_performance_tracking",
        4,
        |ctx| ctx.probe.exists(&["turbo.json", "nx.json"]),
        "Build caching configured",
        "Add turbo.json or nx.json for build caching and performance tracking",
    ),
    Rule::repo(
        P,
        "heavy_dependency_detection",
        4,
        heavy_dependency_detection,
        "Bundle size tracking configured",
        "Add webpack-bundle-analyzer, bundlesize, or size-limit for bundle size tracking",
    ),
    Rule::repo(
        P,
        "unused_dependencies_detection",
        4,
        |ctx| ctx.probe.workflows_mention(&["depcheck", "deptry", "go mod tidy"]),
        "Unused deps detection enabled",
        "Add depcheck (JS), deptry (Python), or 'go mod tidy' check to CI",
    ),
    Rule::not_detectable(
        P,
        "dead_feature_flag_detection",
        4,
        "Dead flag detection enabled",
        "Add stale flag detection via feature flag provider (LaunchDarkly, Statsig)",
    ),
    Rule::repo(
        P,
        "monorepo_tooling",
        4,
        |ctx| {
            ctx.probe
                .exists(&["lerna.json", "nx.json", "turbo.json", "pnpm-workspace.yaml"])
        },
        "Monorepo tooling configured",
        "Add lerna.json, nx.json, turbo.json, or pnpm-workspace.yaml for monorepo management",
    ),
    Rule::not_detectable(
        P,
        "version_drift_detection",
        4,
        "Version drift detection enabled",
        "Add syncpack or manypkg check to detect package version drift across workspaces",
    ),
    Rule::repo(
        P,
        "progressive_rollout",
        5,
        |ctx| ctx.probe.search(WORKFLOW_GLOB, Some(r"canary|gradual|rollout")),
        "Progressive rollout configured",
        "Add canary deployments or gradual rollout strategy in deployment workflow",
    ),
    Rule::not_detectable(
        P,
        "rollback_automation",
        5,
        "Rollback automation configured",
        "Add automated rollback triggers based on error rates or health checks",
    ),
];

const BUILD_COMMANDS: &[&str] = &[
    "npm run",
    "yarn",
    "pnpm",
    "make",
    "cargo build",
    "go build",
    "pip install",
    "python setup.py",
    "gradle",
    "mvn",
];

const SETUP_COMMANDS: &[&str] = &[
    "make install",
    "npm install",
    "yarn install",
    "pip install -e",
    "docker-compose up",
    "./dev",
    "make setup",
    "just",
];

const LOCKFILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "uv.lock",
    "poetry.lock",
    "Pipfile.lock",
    "go.sum",
    "Cargo.lock",
    "Gemfile.lock",
];

/// Workspace lockfiles that pin every JS package from the monorepo root
const SHARED_LOCKFILES: &[&str] = &["package-lock.json", "yarn.lock", "pnpm-lock.yaml"];

const AGENT_TRAILERS: &[&str] = &[
    "co-authored-by",
    "droid",
    "copilot",
    "claude",
    "gpt",
    "ai agent",
];

fn build_cmd_doc(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    target.or_root(|dir| {
        let docs = ctx.agent_docs_text_in(dir);
        BUILD_COMMANDS.iter().any(|c| docs.contains(c))
    })
}

fn deps_pinned(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    ctx.probe.exists_in(&target.dir, LOCKFILES)
        || (!target.is_root() && ctx.probe.exists(SHARED_LOCKFILES))
}

fn vcs_cli_tools(ctx: &RuleContext<'_>) -> bool {
    ctx.run_succeeds("gh", &["auth", "status"]) || ctx.run_succeeds("glab", &["auth", "status"])
}

fn fast_ci_feedback(ctx: &RuleContext<'_>) -> bool {
    ctx.probe.exists(&[
        ".github/workflows/*.yml",
        ".github/workflows/*.yaml",
        ".gitlab-ci.yml",
        ".circleci/config.yml",
        "Jenkinsfile",
        ".travis.yml",
    ])
}

fn single_command_setup(ctx: &RuleContext<'_>) -> bool {
    let docs = ctx.agent_docs_text();
    SETUP_COMMANDS.iter().any(|c| docs.contains(c))
}

fn release_workflow(ctx: &RuleContext<'_>) -> bool {
    ctx.probe
        .search(WORKFLOW_GLOB, Some(r"(release|publish|deploy)"))
}

fn agentic_development(ctx: &RuleContext<'_>) -> bool {
    let Some(output) = ctx.run("git", &["log", "--oneline", "-50"]) else {
        return false;
    };
    let log = output.stdout.to_lowercase();
    AGENT_TRAILERS.iter().any(|t| log.contains(t))
}

fn automated_pr_review(ctx: &RuleContext<'_>) -> bool {
    ctx.probe
        .exists(&["danger.js", "dangerfile.js", "dangerfile.ts"])
        || ctx.probe.workflows_mention(&["review", "danger", "lint-pr"])
}

fn heavy_dependency_detection(ctx: &RuleContext<'_>) -> bool {
    let package = ctx.probe.read_lower("package.json");
    ["webpack-bundle-analyzer", "bundlesize", "size-limit"]
        .iter()
        .any(|t| package.contains(t))
}
