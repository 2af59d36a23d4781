//! Report renderers for readiness analysis records
//!
//! Supports multiple output formats:
//! - `markdown` - GitHub-flavored Markdown with Mermaid diagrams
//! - `html` - Self-contained HTML report
//! - `json` - The analysis record itself, pretty-printed
//!
//! Renderers are pure functions of the record. They never recompute scores.

mod html;
mod json;
mod markdown;
mod mermaid;

use crate::models::AnalysisResult;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: markdown, html, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Rendering switches that do not come from the record
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Mermaid section in Markdown output
    pub diagrams: bool,
    /// Executive summary text, typically written by an agent
    pub summary: Option<String>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            diagrams: true,
            summary: None,
        }
    }
}

/// Render an analysis record in the specified format
pub fn render(result: &AnalysisResult, format: OutputFormat, options: &ReportOptions) -> Result<String> {
    match format {
        OutputFormat::Markdown => markdown::render(result, options),
        OutputFormat::Html => html::render(result, options),
        OutputFormat::Json => json::render(result),
    }
}

/// A well-performing pillar with a few of its passing criteria
#[derive(Debug, Clone, PartialEq)]
pub struct Strength<'a> {
    pub pillar: &'a str,
    pub percentage: u32,
    pub passing: Vec<&'a str>,
}

/// A failing criterion worth fixing first
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity<'a> {
    pub id: &'a str,
    pub level: u8,
    pub reason: &'a str,
    pub pillar: &'a str,
}

/// Top `n` pillars by percentage, ignoring pillars with nothing evaluated.
/// Ties keep pillar order.
pub(crate) fn top_strengths(result: &AnalysisResult, n: usize) -> Vec<Strength<'_>> {
    let mut strengths: Vec<Strength<'_>> = result
        .pillars
        .iter()
        .filter(|(_, pillar)| pillar.total > 0)
        .map(|(name, pillar)| Strength {
            pillar: name.as_str(),
            percentage: pillar.percentage,
            passing: pillar
                .criteria
                .iter()
                .filter(|c| c.is_pass())
                .take(3)
                .map(|c| c.id.as_str())
                .collect(),
        })
        .collect();
    strengths.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    strengths.truncate(n);
    strengths
}

/// Every failing criterion, lowest level first. Ties keep pillar order.
pub(crate) fn opportunities(result: &AnalysisResult) -> Vec<Opportunity<'_>> {
    let mut found: Vec<Opportunity<'_>> = result
        .pillars
        .iter()
        .flat_map(|(name, pillar)| {
            pillar
                .criteria
                .iter()
                .filter(|c| c.is_fail())
                .map(move |c| Opportunity {
                    id: c.id.as_str(),
                    level: c.level,
                    reason: c.reason.as_str(),
                    pillar: name.as_str(),
                })
        })
        .collect();
    found.sort_by_key(|o| o.level);
    found
}

pub(crate) fn top_opportunities(result: &AnalysisResult, n: usize) -> Vec<Opportunity<'_>> {
    let mut found = opportunities(result);
    found.truncate(n);
    found
}
