//! Style & Validation: formatters, linters, typing, and static hygiene

use super::{AppTarget, Pillar, Rule, RuleContext};

const P: Pillar = Pillar::StyleValidation;

pub(super) const RULES: &[Rule] = &[
    Rule::per_app(
        P,
        "formatter",
        1,
        formatter,
        "Formatter configured",
        "Add .prettierrc, ruff/black in pyproject.toml, or rustfmt.toml for consistent formatting",
    )
    .with_app_fail_reason("Add .prettierrc, ruff/black in pyproject.toml"),
    Rule::per_app(
        P,
        "lint_config",
        1,
        lint_config,
        "Linter configured",
        "Add .eslintrc.js, ruff/pylint in pyproject.toml, or .golangci.yml",
    )
    .with_app_fail_reason("Add .eslintrc.js, ruff/pylint in pyproject.toml"),
    Rule::per_app(
        P,
        "type_check",
        1,
        type_check,
        "Type checking configured",
        "Add tsconfig.json for TS, or mypy in pyproject.toml for Python",
    )
    .with_app_fail_reason("Add tsconfig.json or mypy in pyproject.toml"),
    Rule::per_app(
        P,
        "strict_typing",
        2,
        strict_typing,
        "Strict typing enabled",
        "Enable 'strict: true' in tsconfig.json or mypy strict mode in pyproject.toml",
    ),
    Rule::repo(
        P,
        "pre_commit_hooks",
        2,
        pre_commit_hooks,
        "Pre-commit hooks configured",
        "Add .pre-commit-config.yaml or .husky/ to automate checks before commits",
    ),
    Rule::repo(
        P,
        "naming_consistency",
        2,
        naming_consistency,
        "Naming conventions enforced",
        "Document naming conventions in AGENTS.md or enable @typescript-eslint/naming-convention",
    ),
    Rule::repo(
        P,
        "large_file_detection",
        2,
        large_file_detection,
        "Large file detection configured",
        "Add .gitattributes with Git LFS or check-added-large-files in pre-commit",
    ),
    Rule::repo(
        P,
        "code_modularization",
        3,
        code_modularization,
        "Module boundaries enforced",
        "Add import-linter, nx.json, or BUILD.bazel to enforce module boundaries",
    ),
    Rule::repo(
        P,
        "cyclomatic_complexity",
        3,
        cyclomatic_complexity,
        "Complexity analysis configured",
        "Add mccabe/radon in pyproject.toml or gocyclo in .golangci.yml",
    ),
    Rule::repo(
        P,
        "dead_code_detection",
        3,
        |ctx| ctx.probe.workflows_mention(&["vulture", "knip", "deadcode"]),
        "Dead code detection enabled",
        "Add vulture (Python), knip (JS/TS), or deadcode (Go) to CI workflow",
    ),
    Rule::repo(
        P,
        "duplicate_code_detection",
        3,
        |ctx| ctx.probe.workflows_mention(&["jscpd", "pmd cpd", "sonarqube"]),
        "Duplicate detection enabled",
        "Add jscpd, PMD CPD, or SonarQube to CI for duplicate code detection",
    ),
    Rule::repo(
        P,
        "tech_debt_tracking",
        4,
        |ctx| ctx.probe.workflows_mention(&["todo", "fixme", "sonar"]),
        "Tech debt tracking enabled",
        "Add TODO/FIXME scanning in CI or integrate SonarQube for tech debt tracking",
    ),
    Rule::repo(
        P,
        "n_plus_one_detection",
        4,
        n_plus_one_detection,
        "N+1 detection enabled",
        "Add nplusone (Python), bullet (Ruby), or query-analyzer for N+1 detection",
    ),
];

const FORMATTER_FILES: &[&str] = &[
    ".prettierrc",
    ".prettierrc.json",
    ".prettierrc.js",
    "prettier.config.js",
    ".black.toml",
    "rustfmt.toml",
    ".rustfmt.toml",
];

const LINTER_FILES: &[&str] = &[
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.json",
    ".eslintrc.yaml",
    "eslint.config.js",
    "eslint.config.mjs",
    ".pylintrc",
    "pylintrc",
    "golangci.yml",
    ".golangci.yml",
];

fn pyproject_mentions(ctx: &RuleContext<'_>, dir: &str, tools: &[&str]) -> bool {
    let pyproject = ctx.probe.read_lower_in(dir, "pyproject.toml");
    tools.iter().any(|t| pyproject.contains(t))
}

fn formatter(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    target.or_root(|dir| {
        ctx.probe.exists_in(dir, FORMATTER_FILES) || pyproject_mentions(ctx, dir, &["ruff", "black"])
    })
}

fn lint_config(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    target.or_root(|dir| {
        ctx.probe.exists_in(dir, LINTER_FILES) || pyproject_mentions(ctx, dir, &["ruff", "pylint"])
    })
}

fn type_check(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    target.statically_typed()
        || target.or_root(|dir| {
            ctx.probe.exists_in(dir, &["tsconfig.json"]) || pyproject_mentions(ctx, dir, &["mypy"])
        })
}

fn strict_typing(ctx: &RuleContext<'_>, target: &AppTarget<'_>) -> bool {
    target.statically_typed() || target.or_root(|dir| strict_config(ctx, dir))
}

/// tsconfig takes precedence over pyproject when both exist
fn strict_config(ctx: &RuleContext<'_>, dir: &str) -> bool {
    if let Some(tsconfig) = ctx.probe.read_in(dir, "tsconfig.json") {
        return tsconfig.contains("\"strict\": true") || tsconfig.contains("\"strict\":true");
    }
    if let Some(pyproject) = ctx.probe.read_in(dir, "pyproject.toml") {
        return pyproject.contains("strict = true") || pyproject.contains("strict=true");
    }
    false
}

fn pre_commit_hooks(ctx: &RuleContext<'_>) -> bool {
    ctx.probe.exists(&[
        ".pre-commit-config.yaml",
        ".pre-commit-config.yml",
        ".husky",
        ".husky/*",
    ])
}

fn naming_consistency(ctx: &RuleContext<'_>) -> bool {
    let eslint = ctx.probe.read_first_lower(&[".eslintrc.json", ".eslintrc"]);
    if eslint.contains("naming") {
        return true;
    }
    let agents = ctx.probe.read_first_lower(&["AGENTS.md", "CLAUDE.md"]);
    if agents.contains("naming") || agents.contains("convention") {
        return true;
    }
    // gofmt and golint settle naming for Go
    ctx.has_language(crate::models::Language::Go)
}

fn large_file_detection(ctx: &RuleContext<'_>) -> bool {
    ctx.probe.exists(&[".gitattributes", ".lfsconfig"])
        || ctx
            .probe
            .read(".pre-commit-config.yaml")
            .is_some_and(|c| c.contains("check-added-large-files"))
}

fn code_modularization(ctx: &RuleContext<'_>) -> bool {
    ctx.probe
        .exists(&[".importlinter", "nx.json", "BUILD.bazel", "BUILD"])
}

fn cyclomatic_complexity(ctx: &RuleContext<'_>) -> bool {
    [".golangci.yml", ".golangci.yaml", "pyproject.toml"]
        .iter()
        .any(|config| {
            let content = ctx.probe.read_lower(config);
            ["gocyclo", "mccabe", "complexity", "radon"]
                .iter()
                .any(|t| content.contains(t))
        })
}

fn n_plus_one_detection(ctx: &RuleContext<'_>) -> bool {
    let deps = ctx.dependency_text("", &["requirements.txt", "Gemfile", "package.json"]);
    ["nplusone", "bullet", "query-analyzer"]
        .iter()
        .any(|t| deps.contains(t))
}
