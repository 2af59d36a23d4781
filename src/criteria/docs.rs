//! Documentation

use super::{Pillar, Rule, RuleContext};
use crate::probe::WORKFLOW_GLOB;

const P: Pillar = Pillar::Documentation;

pub(super) const RULES: &[Rule] = &[
    Rule::repo(
        P,
        "readme",
        1,
        |ctx| {
            ctx.probe
                .exists(&["README.md", "README.rst", "README.txt", "README"])
        },
        "README exists",
        "Add README.md with project overview, setup instructions, and usage examples",
    ),
    Rule::repo(
        P,
        "agents_md",
        2,
        |ctx| ctx.probe.exists(&["AGENTS.md", "CLAUDE.md"]),
        "AGENTS.md exists",
        "Add AGENTS.md or CLAUDE.md with codebase context for AI coding assistants",
    ),
    Rule::repo(
        P,
        "documentation_freshness",
        2,
        documentation_freshness,
        "Documentation recently updated",
        "Update README.md with latest project changes and ensure docs stay current",
    ),
    Rule::repo(
        P,
        "api_schema_docs",
        3,
        |ctx| {
            ctx.probe.exists(&[
                "openapi.yaml",
                "openapi.json",
                "swagger.yaml",
                "swagger.json",
                "schema.graphql",
                "*.graphql",
                "docs/api/**",
                "api-docs/**",
            ])
        },
        "API documentation exists",
        "Add openapi.yaml, schema.graphql, or docs/api/ for API documentation",
    ),
    Rule::repo(
        P,
        "automated_doc_generation",
        3,
        |ctx| {
            ctx.probe
                .search(WORKFLOW_GLOB, Some(r"(docs|documentation|mkdocs|sphinx|typedoc)"))
        },
        "Doc generation automated",
        "Add mkdocs, sphinx, or typedoc workflow to CI for automated doc generation",
    ),
    Rule::repo(
        P,
        "service_flow_documented",
        3,
        |ctx| {
            ctx.probe.exists(&[
                "**/*.mermaid",
                "**/*.puml",
                "docs/architecture*",
                "docs/**/*.md",
            ])
        },
        "Architecture documented",
        "Add docs/architecture.md with Mermaid diagrams or PlantUML for service flow",
    ),
    Rule::repo(
        P,
        "skills",
        3,
        |ctx| {
            ctx.probe
                .exists(&[".claude/skills/**", ".factory/skills/**", ".skills/**"])
        },
        "Skills directory exists",
        "Add .claude/skills/ or .skills/ directory with reusable AI agent workflows",
    ),
    Rule::repo(
        P,
        "agents_md_validation",
        4,
        |ctx| ctx.probe.workflows_mention(&["agents.md", "claude.md"]),
        "AGENTS.md validation in CI",
        "Add CI workflow to validate AGENTS.md structure and content on PRs",
    ),
];

/// README.md has at least one commit. A committed README reads as maintained.
fn documentation_freshness(ctx: &RuleContext<'_>) -> bool {
    ctx.run("git", &["log", "-1", "--format=%ci", "--", "README.md"])
        .is_some_and(|out| out.success && !out.stdout.trim().is_empty())
}
