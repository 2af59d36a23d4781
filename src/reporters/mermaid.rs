//! Mermaid diagrams for the Markdown report's visual summary

use super::{opportunities, Opportunity};
use crate::criteria::Pillar;
use crate::models::{AnalysisResult, PillarResult};
use crate::scoring::{LEVEL_GATE, MAX_LEVEL};
use indexmap::IndexMap;

/// Improvement steps drawn in the roadmap
const ROADMAP_STEPS: usize = 4;

fn short_name(pillar_name: &str) -> String {
    match Pillar::from_name(pillar_name) {
        Some(pillar) => pillar.short_name().to_string(),
        None => pillar_name.chars().take(8).collect(),
    }
}

pub fn pillar_bar_chart(pillars: &IndexMap<String, PillarResult>) -> String {
    let names: Vec<String> = pillars.keys().map(|name| format!("\"{}\"", short_name(name))).collect();
    let scores: Vec<String> = pillars.values().map(|p| p.percentage.to_string()).collect();

    format!(
        r#"```mermaid
xychart-beta
    title "Pillar Scores (%)"
    x-axis [{}]
    y-axis "Score" 0 --> 100
    bar [{}]
```"#,
        names.join(", "),
        scores.join(", ")
    )
}

/// Level bars with the 80% gate drawn as a line; achieved levels get a `*`
pub fn level_progress_chart(result: &AnalysisResult) -> String {
    let levels: Vec<String> = (1..=MAX_LEVEL)
        .map(|level| {
            let marker = if level <= result.achieved_level { " *" } else { "" };
            format!("\"L{}{}\"", level, marker)
        })
        .collect();
    let scores: Vec<String> = (1..=MAX_LEVEL)
        .map(|level| (result.level_score(level) as i64).to_string())
        .collect();
    let gate = vec![(LEVEL_GATE as i64).to_string(); MAX_LEVEL as usize];

    format!(
        r#"```mermaid
xychart-beta
    title "Maturity Level Progress"
    x-axis [{}]
    y-axis "Completion %" 0 --> 100
    bar [{}]
    line [{}]
```"#,
        levels.join(", "),
        scores.join(", "),
        gate.join(", ")
    )
}

pub fn distribution_pie(passed: usize, failed: usize, skipped: usize) -> String {
    format!(
        r#"```mermaid
pie showData
    title Criteria Distribution
    "Pass ({passed})" : {passed}
    "Fail ({failed})" : {failed}
    "Skip ({skipped})" : {skipped}
```"#
    )
}

/// Flowchart from the current level through the first few fixes to the next level
pub fn roadmap_flowchart(current_level: u8, target_level: u8, steps: &[Opportunity<'_>]) -> String {
    let current = if current_level > 0 {
        format!("L{}", current_level)
    } else {
        "Pre-L1".to_string()
    };

    let mut lines = vec![
        "```mermaid".to_string(),
        "flowchart LR".to_string(),
        format!("    A[\"{}\"]", current),
    ];

    let mut prev = 'A';
    let mut next = 'B';
    for step in steps.iter().take(ROADMAP_STEPS) {
        lines.push(format!("    {}[\"{}\"]", next, step.id));
        lines.push(format!("    {} --> {}", prev, next));
        prev = next;
        next = (next as u8 + 1) as char;
    }

    lines.push(format!("    {}([\"L{}\"])", next, target_level));
    lines.push(format!("    {} --> {}", prev, next));
    lines.push("    style A fill:#f9f,stroke:#333".to_string());
    lines.push(format!("    style {} fill:#9f9,stroke:#333", next));
    lines.push("```".to_string());
    lines.join("\n")
}

/// The whole "Visual Summary" section. The roadmap appears only when
/// something is failing.
pub fn visual_summary(result: &AnalysisResult) -> String {
    let (passed, failed, skipped) = result.status_counts();
    let failing = opportunities(result);
    let target_level = (result.achieved_level + 1).min(MAX_LEVEL);

    let mut sections = vec![
        "## Visual Summary".to_string(),
        String::new(),
        "### Pillar Scores".to_string(),
        String::new(),
        pillar_bar_chart(&result.pillars),
        String::new(),
        "### Level Progress".to_string(),
        String::new(),
        level_progress_chart(result),
        String::new(),
        "### Criteria Distribution".to_string(),
        String::new(),
        distribution_pie(passed, failed, skipped),
        String::new(),
    ];

    if !failing.is_empty() {
        sections.push("### Improvement Roadmap".to_string());
        sections.push(String::new());
        sections.push(roadmap_flowchart(result.achieved_level, target_level, &failing));
        sections.push(String::new());
    }

    sections.join("\n")
}
