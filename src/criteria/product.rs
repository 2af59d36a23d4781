//! Product & Analytics

use super::observability::DEPENDENCY_MANIFESTS;
use super::{Pillar, Rule, RuleContext};
use regex::Regex;
use std::sync::OnceLock;

const P: Pillar = Pillar::ProductAnalytics;

pub(super) const RULES: &[Rule] = &[
    Rule::repo(
        P,
        "error_to_insight_pipeline",
        5,
        error_to_insight_pipeline,
        "Error-to-issue pipeline exists",
        "Configure Sentry-GitHub integration to auto-create issues from production errors",
    ),
    Rule::repo(
        P,
        "product_analytics_instrumentation",
        5,
        product_analytics,
        "Product analytics configured",
        "Add Mixpanel, Amplitude, PostHog, or Segment for product usage analytics",
    ),
];

const ANALYTICS_VENDORS: &[&str] = &[
    "mixpanel",
    "amplitude",
    "posthog",
    "heap",
    "segment",
    "ga4",
    "google-analytics",
];

/// Sentry, or a workflow step that turns errors into issues
fn issue_automation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"sentry|create.*issue|error.*issue").expect("valid regex")
    })
}

fn error_to_insight_pipeline(ctx: &RuleContext<'_>) -> bool {
    let workflows: Vec<String> = ctx
        .probe
        .workflows()
        .iter()
        .map(|wf| wf.to_lowercase())
        .collect();
    if workflows.iter().any(|wf| issue_automation().is_match(wf)) {
        return true;
    }
    ctx.dependency_text("", DEPENDENCY_MANIFESTS).contains("sentry")
        && workflows
            .iter()
            .any(|wf| wf.contains("issue") && wf.contains("sentry"))
}

fn product_analytics(ctx: &RuleContext<'_>) -> bool {
    let deps = ctx.dependency_text("", DEPENDENCY_MANIFESTS);
    ANALYTICS_VENDORS.iter().any(|v| deps.contains(v))
}
