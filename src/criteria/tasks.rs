//! Task Discovery

use super::{Pillar, Rule, RuleContext};

const P: Pillar = Pillar::TaskDiscovery;

/// Issue templates inspected for label frontmatter
const TEMPLATE_SCAN_LIMIT: usize = 5;

pub(super) const RULES: &[Rule] = &[
    Rule::repo(
        P,
        "issue_templates",
        2,
        has_issue_templates,
        "Issue templates configured",
        "Add .github/ISSUE_TEMPLATE/ with bug_report.md and feature_request.md",
    ),
    Rule::repo(
        P,
        "issue_labeling_system",
        2,
        issue_labeling_system,
        "Issue labels configured",
        "Add 'labels:' frontmatter to issue templates for automatic categorization",
    ),
    Rule::repo(
        P,
        "pr_templates",
        2,
        |ctx| {
            ctx.probe.exists(&[
                ".github/pull_request_template.md",
                ".github/PULL_REQUEST_TEMPLATE.md",
                "pull_request_template.md",
            ])
        },
        "PR template configured",
        "Add .github/pull_request_template.md with checklist and description sections",
    ),
    Rule::repo(
        P,
        "backlog_health",
        3,
        |ctx| ctx.probe.exists(&["CONTRIBUTING.md", ".github/CONTRIBUTING.md"]),
        "Contributing guidelines exist",
        "Add CONTRIBUTING.md with setup instructions, coding standards, and PR process",
    ),
];

fn has_issue_templates(ctx: &RuleContext<'_>) -> bool {
    ctx.probe
        .exists(&[".github/ISSUE_TEMPLATE/**", ".github/ISSUE_TEMPLATE.md"])
}

fn issue_labeling_system(ctx: &RuleContext<'_>) -> bool {
    has_issue_templates(ctx)
        && ctx
            .probe
            .glob_files(".github/ISSUE_TEMPLATE/*.md", TEMPLATE_SCAN_LIMIT)
            .iter()
            .any(|t| ctx.probe.read_lower(t).contains("labels:"))
}
