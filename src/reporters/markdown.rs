//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Sections, in order: header, detected apps (monorepos), level progress,
//! executive summary, visual summary, strengths and priority improvements,
//! per-pillar details, recommended next steps.

use super::{mermaid, top_opportunities, top_strengths, ReportOptions};
use crate::models::{join_languages, AnalysisResult, CriterionResult, Scope};
use crate::scoring::{LEVEL_GATE, MAX_LEVEL};
use anyhow::Result;

/// Render the record as GitHub-flavored Markdown
pub fn render(result: &AnalysisResult, options: &ReportOptions) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();

    render_header(result, &mut lines);
    render_apps(result, &mut lines);
    render_level_progress(result, &mut lines);

    if let Some(summary) = options.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push("## Executive Summary".into());
        lines.push(String::new());
        lines.push(summary.trim().to_string());
        lines.push(String::new());
    }

    if options.diagrams {
        lines.push(mermaid::visual_summary(result));
        lines.push(String::new());
    }

    render_summary(result, &mut lines);
    render_details(result, &mut lines);
    render_next_steps(result.achieved_level, &mut lines);

    lines.push(String::new());
    lines.push("---".into());
    lines.push("*Report generated from repository analysis*".into());

    Ok(lines.join("\n"))
}

fn render_header(result: &AnalysisResult, lines: &mut Vec<String>) {
    lines.push(format!("# Agent Readiness Report: {}", result.repo_name));
    lines.push(String::new());
    lines.push(format!("**Languages**: {}  ", join_languages(&result.languages)));
    lines.push(format!("**Repository Type**: {}  ", result.repo_type));
    lines.push(format!(
        "**Pass Rate**: {:.1}% ({}/{} criteria)  ",
        result.pass_rate, result.total_passed, result.total_criteria
    ));
    if result.achieved_level > 0 {
        lines.push(format!("**Achieved Level**: **L{}**", result.achieved_level));
    } else {
        lines.push("**Achieved Level**: **Not yet L1** (need 80% at L1)".into());
    }
    lines.push(String::new());
}

fn render_apps(result: &AnalysisResult, lines: &mut Vec<String>) {
    if !result.is_monorepo() || result.detected_apps.is_empty() {
        return;
    }
    lines.push("### Detected Applications".into());
    lines.push(String::new());
    for app in &result.detected_apps {
        lines.push(format!("- **{}**: {}", app.name, join_languages(&app.languages)));
    }
    lines.push(String::new());
    if !result.undetected_app_folders.is_empty() {
        lines.push(format!(
            "> **Warning**: Folders without manifest files: {}",
            result.undetected_app_folders.join(", ")
        ));
        lines.push(String::new());
    }
}

/// A level is shown locked while the one below it is under the gate
fn render_level_progress(result: &AnalysisResult, lines: &mut Vec<String>) {
    lines.push("## Level Progress".into());
    lines.push(String::new());
    lines.push("| Level | Score | Status |".into());
    lines.push("|-------|-------|--------|".into());
    for level in 1..=MAX_LEVEL {
        let score = result.level_score(level);
        let unlocked = level == 1 || result.level_score(level - 1) >= LEVEL_GATE;

        let row = if !unlocked {
            format!("| L{} | 🔒 | Locked (need 80% at L{}) |", level, level - 1)
        } else if result.achieved_level > 0 && level <= result.achieved_level {
            format!("| L{} | {:.0}% | ✓ Achieved |", level, score)
        } else if score >= LEVEL_GATE {
            format!("| L{} | {:.0}% | Passed |", level, score)
        } else {
            format!("| L{} | {:.0}% | {:.0}% to go |", level, score, LEVEL_GATE - score)
        };
        lines.push(row);
    }
    lines.push(String::new());
}

fn render_summary(result: &AnalysisResult, lines: &mut Vec<String>) {
    lines.push("## Summary".into());
    lines.push(String::new());

    let strengths = top_strengths(result, 3);
    if !strengths.is_empty() {
        lines.push("### Strengths".into());
        lines.push(String::new());
        for strength in &strengths {
            if strength.passing.is_empty() {
                lines.push(format!("- **{}** ({}%)", strength.pillar, strength.percentage));
            } else {
                let passing: Vec<String> =
                    strength.passing.iter().map(|id| format!("`{}`", id)).collect();
                lines.push(format!(
                    "- **{}** ({}%): {}",
                    strength.pillar,
                    strength.percentage,
                    passing.join(", ")
                ));
            }
        }
        lines.push(String::new());
    }

    let improvements = top_opportunities(result, 5);
    if !improvements.is_empty() {
        lines.push("### Priority Improvements".into());
        lines.push(String::new());
        lines.push("| Criterion | Issue | Pillar |".into());
        lines.push("|-----------|-------|--------|".into());
        for item in &improvements {
            lines.push(format!("| `{}` | {} | {} |", item.id, item.reason, item.pillar));
        }
        lines.push(String::new());
    }
}

fn render_details(result: &AnalysisResult, lines: &mut Vec<String>) {
    lines.push("## Detailed Results".into());
    lines.push(String::new());

    for (name, pillar) in &result.pillars {
        lines.push(format!("### {}", name));
        lines.push(format!(
            "**Score**: {}/{} ({}%)",
            pillar.passed, pillar.total, pillar.percentage
        ));
        lines.push(String::new());
        lines.push("| Status | Criterion | Score | Details |".into());
        lines.push("|--------|-----------|-------|---------|".into());
        for criterion in &pillar.criteria {
            lines.push(criterion_row(criterion));
        }
        lines.push(String::new());
    }
}

/// App-scoped rows replace the reason's failing list with an italic breakdown
fn criterion_row(criterion: &CriterionResult) -> String {
    let icon = criterion.status.icon();
    if criterion.scope == Scope::App && !criterion.app_results.is_empty() {
        let clean_reason = criterion
            .reason
            .split(" (failing:")
            .next()
            .unwrap_or_default();
        let failing = criterion.failing_apps();
        let detail = if failing.is_empty() {
            " *(all apps pass)*".to_string()
        } else {
            format!(" *(failing: {})*", failing.join(", "))
        };
        format!(
            "| {} | `{}` | {} | {}{} |",
            icon, criterion.id, criterion.score, clean_reason, detail
        )
    } else {
        format!(
            "| {} | `{}` | {} | {} |",
            icon, criterion.id, criterion.score, criterion.reason
        )
    }
}

fn render_next_steps(achieved: u8, lines: &mut Vec<String>) {
    lines.push("## Recommended Next Steps".into());
    lines.push(String::new());

    let (heading, steps): (&str, [&str; 4]) = if achieved < 2 {
        (
            "**Focus on L1/L2 Foundations:**",
            [
                "Add missing linter and formatter configurations",
                "Document build and test commands in README",
                "Set up pre-commit hooks for fast feedback",
                "Create AGENTS.md with project context for AI agents",
            ],
        )
    } else if achieved < 3 {
        (
            "**Progress to L3 (Production Ready):**",
            [
                "Add integration/E2E tests",
                "Set up test coverage thresholds",
                "Configure devcontainer for reproducible environments",
                "Add automated PR review tooling",
            ],
        )
    } else {
        (
            "**Optimize for L4+:**",
            [
                "Implement complexity analysis and dead code detection",
                "Set up flaky test detection and quarantine",
                "Add security scanning (CodeQL, Snyk)",
                "Configure deployment observability",
            ],
        )
    };

    lines.push(heading.into());
    for (i, step) in steps.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, step));
    }
}
