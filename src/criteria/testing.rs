//! Testing: test presence, runnability, and CI test hygiene

use super::{AppTarget, Pillar, Rule, RuleContext};
use crate::models::Language;

const P: Pillar = Pillar::Testing;

pub(super) const RULES: &[Rule] = &[
    Rule::per_app(
        P,
        "unit_tests_exist",
        1,
        unit_tests_exist,
        "Unit tests found",
        "Add unit tests in tests/ directory with *_test.py, *.spec.ts, or *_test.go naming",
    )
    .with_app_fail_reason("Add unit tests in tests/ directory"),
    Rule::per_app(
        P,
        "unit_tests_runnable",
        1,
        unit_tests_runnable,
        "Test commands documented",
        "Document test command (pytest, npm test, go test, etc.) in README or AGENTS.md",
    ),
    Rule::per_app(
        P,
        "test_naming_conventions",
        2,
        test_naming_conventions,
        "Test naming conventions enforced",
        "Configure pytest in pyproject.toml or jest.config.js for test naming conventions",
    ),
    Rule::per_app(
        P,
        "test_isolation",
        2,
        test_isolation,
        "Tests support isolation/parallelism",
        "Add pytest-xdist for parallel tests or use matrix strategy in CI workflow",
    ),
    Rule::per_app(
        P,
        "integration_tests_exist",
        3,
        integration_tests_exist,
        "Integration tests found",
        "Add tests/integration/, e2e/, or configure Playwright/Cypress for E2E tests",
    ),
    Rule::per_app(
        P,
        "test_coverage_thresholds",
        3,
        test_coverage_thresholds,
        "Coverage thresholds enforced",
        "Add coverage reporting (codecov.yml, .coveragerc) with minimum threshold enforcement",
    ),
    Rule::repo(
        P,
        "flaky_test_detection",
        4,
        |ctx| {
            ctx.probe
                .workflows_mention(&["retry", "flaky", "quarantine", "rerun"])
        },
        "Flaky test handling configured",
        "Add test retry logic or flaky test quarantine mechanism in CI workflow",
    ),
    Rule::repo(
        P,
        "test_performance_tracking",
        4,
        |ctx| ctx.probe.workflows_mention(&["durations", "timing", "benchmark"]),
        "Test performance tracked",
        "Add --durations flag to pytest or benchmark tracking in CI for test timing analysis",
    ),
];

const UNIT_TEST_GLOBS: &[&str] = &[
    "tests/**/*.py",
    "test/**/*.py",
    "*_test.py",
    "*_test.go",
    "**/*.spec.ts",
    "**/*.spec.js",
    "**/*.test.ts",
    "**/*.test.js",
    "spec/**/*.rb",
    "tests/**/*.rs",
];

const TEST_COMMANDS: &[&str] = &[
    "pytest",
    "npm test",
    "yarn test",
    "go test",
    "cargo test",
    "make test",
    "rake test",
    "rspec",
    "jest",
];

const INTEGRATION_GLOBS: &[&str] = &[
    "tests/integration/**",
    "integration/**",
    "e2e/**",
    "tests/e2e/**",
    "cypress/**",
    "playwright.config.*",
];

// Tests live with the code they cover, so presence checks never fall back to the root
fn unit_tests_exist(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    ctx.probe.exists_in(&target.dir, UNIT_TEST_GLOBS)
}

fn unit_tests_runnable(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    target.or_root(|dir| {
        let docs = ctx.agent_docs_text_in(dir);
        TEST_COMMANDS.iter().any(|c| docs.contains(c))
    })
}

fn test_naming_conventions(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    // `_test.go` is enforced by the toolchain
    target.languages.contains(&Language::Go)
        || target.or_root(|dir| {
            ctx.probe
                .read_lower_in(dir, "pyproject.toml")
                .contains("pytest")
                || ctx
                    .probe
                    .exists_in(dir, &["jest.config.js", "jest.config.ts"])
        })
}

fn test_isolation(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    // Go runs packages in parallel by default
    target.languages.contains(&Language::Go)
        || ctx.probe.workflows_mention(&["matrix"])
        || target.or_root(|dir| {
            ctx.probe
                .read_in(dir, "pyproject.toml")
                .is_some_and(|c| c.contains("pytest-xdist") || c.contains("-n auto"))
        })
}

fn integration_tests_exist(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    ctx.probe.exists_in(&target.dir, INTEGRATION_GLOBS)
}

fn test_coverage_thresholds(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    ctx.probe
        .workflows_mention(&["coverage", "codecov", "coveralls"])
        || target.or_root(|dir| {
            ctx.probe
                .exists_in(dir, &[".coveragerc", "coverage.xml", "codecov.yml"])
        })
}
