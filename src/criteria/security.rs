//! Security

use super::{Pillar, Rule, RuleContext};
use crate::probe::WORKFLOW_GLOB;

const P: Pillar = Pillar::Security;

pub(super) const RULES: &[Rule] = &[
    Rule::repo(
        P,
        "gitignore_comprehensive",
        1,
        gitignore_comprehensive,
        "Comprehensive .gitignore",
        "Add .env, node_modules, __pycache__, .idea, .vscode to .gitignore",
    ),
    Rule::repo(
        P,
        "secrets_management",
        2,
        secrets_management,
        "Secrets properly managed",
        "Use GitHub Secrets (${{ secrets.* }}) in workflows instead of hardcoded values",
    ),
    Rule::repo(
        P,
        "codeowners",
        2,
        |ctx| ctx.probe.exists(&["CODEOWNERS", ".github/CODEOWNERS"]),
        "CODEOWNERS configured",
        "Add .github/CODEOWNERS to define code ownership and review requirements",
    ),
    Rule::repo(
        P,
        "branch_protection",
        2,
        |ctx| {
            ctx.probe
                .exists(&[".github/branch-protection.yml", ".github/rulesets/**"])
        },
        "Branch protection configured",
        "Enable branch protection rules in GitHub Settings or add .github/rulesets/",
    ),
    Rule::repo(
        P,
        "dependency_update_automation",
        3,
        |ctx| {
            ctx.probe
                .exists(&[".github/dependabot.yml", "renovate.json", ".renovaterc"])
        },
        "Dependency updates automated",
        "Add .github/dependabot.yml or renovate.json for automated dependency updates",
    ),
    Rule::repo(
        P,
        "log_scrubbing",
        3,
        log_scrubbing,
        "Log scrubbing configured",
        "Configure pino redact, loguru filters, or custom log sanitizers for sensitive data",
    ),
    Rule::repo(
        P,
        "pii_handling",
        3,
        |ctx| {
            ["**/*.py", "**/*.ts"]
                .iter()
                .any(|glob| ctx.probe.search(glob, Some(r"(redact|sanitize|mask|pii)")))
        },
        "PII handling implemented",
        "Add redact/sanitize/mask functions for PII in logs, errors, and responses",
    ),
    Rule::repo(
        P,
        "automated_security_review",
        4,
        |ctx| ctx.probe.search(WORKFLOW_GLOB, Some(r"(codeql|snyk|sonar|security)")),
        "Security scanning enabled",
        "Add CodeQL, Snyk, or SonarQube security scanning to CI workflow",
    ),
    Rule::repo(
        P,
        "secret_scanning",
        4,
        |ctx| ctx.probe.search(WORKFLOW_GLOB, Some(r"(gitleaks|trufflehog|secret)")),
        "Secret scanning enabled",
        "Add gitleaks or trufflehog to CI for secret scanning in commits",
    ),
    Rule::repo(
        P,
        "dast_scanning",
        5,
        |ctx| ctx.probe.search(WORKFLOW_GLOB, Some(r"(zap|dast|owasp|burp)")),
        "DAST scanning enabled",
        "Add OWASP ZAP or Burp Suite DAST scanning in CI for runtime security testing",
    ),
    Rule::repo(
        P,
        "privacy_compliance",
        5,
        |ctx| ctx.probe.exists(&["PRIVACY.md", "docs/privacy/**", "gdpr/**"]),
        "Privacy compliance documented",
        "Add PRIVACY.md or docs/privacy/ with GDPR/CCPA compliance documentation",
    ),
];

const GITIGNORE_ENTRIES: &[&str] = &[".env", "node_modules", "__pycache__", ".idea", ".vscode"];

fn gitignore_comprehensive(ctx: &RuleContext<'_>) -> bool {
    let gitignore = ctx.probe.read_lower(".gitignore");
    GITIGNORE_ENTRIES.iter().any(|e| gitignore.contains(e))
}

/// Case-sensitive: `secrets.` is the GitHub Actions expression namespace
fn secrets_management(ctx: &RuleContext<'_>) -> bool {
    ctx.probe
        .workflows()
        .iter()
        .any(|wf| wf.contains("secrets."))
}

fn log_scrubbing(ctx: &RuleContext<'_>) -> bool {
    let deps = ctx.dependency_text("", &["package.json", "requirements.txt"]);
    ["pino", "redact", "scrub"].iter().any(|t| deps.contains(t))
}
