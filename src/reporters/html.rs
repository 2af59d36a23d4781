//! HTML reporter with embedded styles
//!
//! Generates one self-contained document that can be opened in any browser:
//! - Hero stats and level progress bars
//! - Strength and opportunity cards
//! - Collapsible criteria list per pillar
//!
//! Every piece of record text is escaped before it is written.

use super::{top_opportunities, top_strengths, ReportOptions};
use crate::models::{join_languages, AnalysisResult, CriterionStatus};
use crate::scoring::{LEVEL_GATE, MAX_LEVEL};
use anyhow::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Render the record as a standalone HTML page
pub fn render(result: &AnalysisResult, options: &ReportOptions) -> Result<String> {
    let mut html = String::new();

    html.push_str(&render_head(result));
    html.push_str("<body>\n");
    html.push_str(&render_header(result));
    html.push_str("<div class=\"container\">\n");
    html.push_str(&render_hero(result));

    if let Some(summary) = options.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        html.push_str(&render_summary(summary));
    }

    html.push_str(&render_cards(result));
    html.push_str(&render_criteria(result));
    html.push_str("</div>\n");
    html.push_str(&render_footer(result));
    html.push_str("</body>\n</html>\n");

    Ok(html)
}

fn render_head(result: &AnalysisResult) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Agent Readiness Report: {}</title>
    <style>
{CSS}
    </style>
</head>
"#,
        html_escape(&result.repo_name)
    )
}

fn render_header(result: &AnalysisResult) -> String {
    format!(
        r#"<header>
    <div class="header-content">
        <img src="data:image/svg+xml;base64,{}" alt="Agent Readiness" class="logo">
        <div class="header-meta">
            <span>{}</span>
            <span>{}</span>
            <span>{}</span>
        </div>
    </div>
</header>
"#,
        logo_base64(),
        html_escape(&join_languages(&result.languages)),
        result.repo_type,
        html_escape(&result.git_branch)
    )
}

fn render_hero(result: &AnalysisResult) -> String {
    let achieved = if result.achieved_level > 0 {
        format!("L{}", result.achieved_level)
    } else {
        "L—".to_string()
    };

    let mut bars = String::new();
    for level in 1..=MAX_LEVEL {
        let score = result.level_score(level);
        let class = if result.achieved_level > 0 && level <= result.achieved_level {
            "achieved"
        } else if score >= LEVEL_GATE {
            "passed"
        } else {
            ""
        };
        bars.push_str(&format!(
            r#"        <div class="level-item {}">
            <div class="level-label">L{}</div>
            <div class="level-bar"><div class="level-fill" style="width: {}%"></div></div>
            <div class="level-score">{:.0}%</div>
        </div>
"#,
            class, level, score, score
        ));
    }

    format!(
        r#"<section class="hero">
    <h1 class="hero-title">{}</h1>
    <div class="hero-stats">
        <div class="stat">
            <div class="stat-value">{:.0}%</div>
            <div class="stat-label">Pass Rate</div>
        </div>
        <div class="stat">
            <div class="stat-value">{}</div>
            <div class="stat-label">Achieved Level</div>
        </div>
        <div class="stat">
            <div class="stat-value">{}/{}</div>
            <div class="stat-label">Criteria Passing</div>
        </div>
    </div>
    <div class="level-progress">
{}    </div>
</section>
"#,
        html_escape(&result.repo_name),
        result.pass_rate,
        achieved,
        result.total_passed,
        result.total_criteria,
        bars
    )
}

/// Paragraphs split on blank lines
fn render_summary(summary: &str) -> String {
    let paragraphs: String = summary
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("    <p>{}</p>\n", html_escape(p)))
        .collect();
    format!(
        r#"<section class="summary">
    <h2 class="section-title">Executive Summary</h2>
{}</section>
"#,
        paragraphs
    )
}

fn render_cards(result: &AnalysisResult) -> String {
    let mut strengths = String::new();
    for (i, strength) in top_strengths(result, 3).iter().enumerate() {
        let passing: Vec<String> = strength
            .passing
            .iter()
            .map(|id| format!("<code>{}</code>", html_escape(id)))
            .collect();
        strengths.push_str(&format!(
            r#"        <div class="card">
            <div class="card-number">{:02}</div>
            <div class="card-title">{} <span class="pct">{}%</span></div>
            <div class="card-detail">{}</div>
        </div>
"#,
            i + 1,
            html_escape(strength.pillar),
            strength.percentage,
            passing.join(", ")
        ));
    }

    let mut opportunities = String::new();
    for (i, item) in top_opportunities(result, 5).iter().enumerate() {
        opportunities.push_str(&format!(
            r#"        <div class="card opportunity">
            <div class="card-number">{:02}</div>
            <div class="card-title"><code>{}</code></div>
            <div class="card-detail">{}</div>
            <div class="card-pillar">{}</div>
        </div>
"#,
            i + 1,
            html_escape(item.id),
            html_escape(item.reason),
            html_escape(item.pillar)
        ));
    }

    format!(
        r#"<div class="grid">
    <section>
        <h2 class="section-title">Strengths</h2>
{}    </section>
    <section>
        <h2 class="section-title">Opportunities</h2>
{}    </section>
</div>
"#,
        strengths, opportunities
    )
}

fn render_criteria(result: &AnalysisResult) -> String {
    let mut sections = String::new();
    for (name, pillar) in &result.pillars {
        let mut rows = String::new();
        for criterion in &pillar.criteria {
            rows.push_str(&format!(
                r#"            <div class="criterion">
                {}
                <code class="criterion-id">{}</code>
                <span class="criterion-score">{}</span>
                <span class="criterion-reason">{}</span>
            </div>
"#,
                status_html(criterion.status),
                html_escape(&criterion.id),
                html_escape(&criterion.score),
                html_escape(&criterion.reason)
            ));
        }
        sections.push_str(&format!(
            r#"    <details class="pillar-section">
        <summary>
            <span class="pillar-name">{}</span>
            <span class="pillar-score">{}/{} ({}%)</span>
        </summary>
        <div class="criteria-list">
{}        </div>
    </details>
"#,
            html_escape(name),
            pillar.passed,
            pillar.total,
            pillar.percentage,
            rows
        ));
    }

    format!(
        r#"<section>
    <h2 class="section-title">All Criteria</h2>
{}</section>
"#,
        sections
    )
}

fn render_footer(result: &AnalysisResult) -> String {
    format!(
        r#"<footer>
    Agent Readiness Report · generated {}
</footer>
"#,
        html_escape(&result.generated_at)
    )
}

fn status_html(status: CriterionStatus) -> &'static str {
    match status {
        CriterionStatus::Pass => r#"<span class="status pass">&#x2713;</span>"#,
        CriterionStatus::Fail => r#"<span class="status fail">&#x2717;</span>"#,
        CriterionStatus::Skip => r#"<span class="status skip">&#x2014;</span>"#,
    }
}

fn logo_base64() -> String {
    STANDARD.encode(LOGO_SVG)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="220" height="40" viewBox="0 0 220 40"><rect x="2" y="6" width="28" height="28" rx="6" fill="#ffffff"/><path d="M9 21l5 5 10-11" stroke="#00594C" stroke-width="3.5" fill="none" stroke-linecap="round" stroke-linejoin="round"/><text x="40" y="27" font-family="Segoe UI, Roboto, sans-serif" font-size="18" font-weight="600" fill="#ffffff">Agent Readiness</text></svg>"##;

// Embedded CSS
const CSS: &str = r#"
:root {
    --teal: #00594C;
    --teal-light: #007A68;
    --teal-dark: #003D34;
    --pass: #22c55e;
    --fail: #ef4444;
    --skip: #94a3b8;
    --bg: #f8fafc;
    --card-bg: #ffffff;
    --text: #1e293b;
    --text-muted: #64748b;
    --border: #e2e8f0;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    line-height: 1.6;
}
.container { max-width: 1200px; margin: 0 auto; padding: 2rem; }

header { background: var(--teal); color: white; padding: 2rem; }
.header-content {
    max-width: 1200px;
    margin: 0 auto;
    display: flex;
    justify-content: space-between;
    align-items: center;
    flex-wrap: wrap;
    gap: 1rem;
}
.logo { height: 40px; }
.header-meta { display: flex; gap: 2rem; flex-wrap: wrap; }
.header-meta span { opacity: 0.9; }

.hero, .summary {
    background: var(--card-bg);
    border-radius: 12px;
    padding: 2rem;
    margin-bottom: 2rem;
    box-shadow: 0 1px 3px rgba(0,0,0,0.1);
}
.summary p { margin-bottom: 0.75rem; }
.hero-title { font-size: 1.75rem; font-weight: 600; margin-bottom: 0.5rem; }
.hero-stats { display: flex; gap: 3rem; flex-wrap: wrap; margin-top: 1.5rem; }
.stat { text-align: center; }
.stat-value { font-size: 2.5rem; font-weight: 700; color: var(--teal); }
.stat-label { color: var(--text-muted); font-size: 0.875rem; }

.level-progress { display: flex; gap: 1rem; margin-top: 2rem; flex-wrap: wrap; }
.level-item { flex: 1; min-width: 100px; text-align: center; }
.level-label { font-weight: 600; margin-bottom: 0.5rem; color: var(--text-muted); }
.level-item.achieved .level-label { color: var(--teal); }
.level-bar { height: 8px; background: var(--border); border-radius: 4px; overflow: hidden; }
.level-fill { height: 100%; background: var(--teal-light); border-radius: 4px; }
.level-item.achieved .level-fill { background: var(--teal); }
.level-score { font-size: 0.875rem; margin-top: 0.25rem; color: var(--text-muted); }

.grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
    gap: 2rem;
    margin-bottom: 2rem;
}
.section-title { font-size: 1.25rem; font-weight: 600; margin-bottom: 1rem; color: var(--teal-dark); }

.card {
    background: var(--card-bg);
    border-radius: 8px;
    padding: 1rem;
    margin-bottom: 0.75rem;
    box-shadow: 0 1px 2px rgba(0,0,0,0.05);
    border-left: 4px solid var(--pass);
}
.card.opportunity { border-left-color: var(--fail); }
.card-number { font-size: 0.75rem; color: var(--text-muted); font-weight: 600; }
.card-title { font-weight: 600; margin: 0.25rem 0; }
.card-title .pct { color: var(--teal); }
.card-detail { font-size: 0.875rem; color: var(--text-muted); }
.card-pillar { font-size: 0.75rem; color: var(--text-muted); margin-top: 0.5rem; }

.pillar-section {
    background: var(--card-bg);
    border-radius: 8px;
    margin-bottom: 0.75rem;
    box-shadow: 0 1px 2px rgba(0,0,0,0.05);
}
.pillar-section summary {
    padding: 1rem;
    cursor: pointer;
    display: flex;
    justify-content: space-between;
    align-items: center;
    font-weight: 600;
}
.pillar-section summary:hover { background: var(--bg); }
.pillar-score { color: var(--text-muted); font-weight: normal; }
.criteria-list { padding: 0 1rem 1rem; border-top: 1px solid var(--border); }
.criterion {
    display: flex;
    align-items: flex-start;
    gap: 0.75rem;
    padding: 0.5rem 0;
    border-bottom: 1px solid var(--border);
    font-size: 0.875rem;
}
.criterion:last-child { border-bottom: none; }
.status { font-weight: bold; width: 1.5rem; flex-shrink: 0; }
.status.pass { color: var(--pass); }
.status.fail { color: var(--fail); }
.status.skip { color: var(--skip); }
.criterion-score { color: var(--text-muted); white-space: nowrap; }
.criterion-reason { color: var(--text-muted); flex: 1; }

code {
    font-family: 'SF Mono', Monaco, monospace;
    background: var(--bg);
    padding: 0.125rem 0.375rem;
    border-radius: 4px;
    font-size: 0.8125rem;
}

footer { text-align: center; padding: 2rem; color: var(--text-muted); font-size: 0.875rem; }

@media print {
    .pillar-section { page-break-inside: avoid; }
}
"#;
