//! Maturity level aggregation
//!
//! ```text
//! Level score    = round(100 × passed / non-skipped, 1)   (100.0 if empty)
//! Achieved level = highest L such that L1..=L all score ≥ 80.0
//! Pass rate      = round(100 × passed / non-skipped, 1)   over every pillar
//! ```
//!
//! Skipped criteria are excluded from every denominator. A level gates the
//! next one: L3 cannot be achieved while L2 is below the gate, however well
//! L3 itself scores.

use crate::models::{CriterionResult, PillarResult};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Minimum level score (percent) for a level to count as achieved
pub const LEVEL_GATE: f64 = 80.0;

pub const MAX_LEVEL: u8 = 5;

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Headline numbers derived from the evaluated pillars
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub level_scores: BTreeMap<u8, f64>,
    pub achieved_level: u8,
    pub total_passed: usize,
    pub total_criteria: usize,
    pub pass_rate: f64,
}

/// Score each level 1..=5 over non-skipped criteria
pub fn level_scores<'a>(criteria: impl IntoIterator<Item = &'a CriterionResult>) -> BTreeMap<u8, f64> {
    let mut counts: BTreeMap<u8, (usize, usize)> = (1..=MAX_LEVEL).map(|l| (l, (0, 0))).collect();
    for criterion in criteria {
        if criterion.is_skip() {
            continue;
        }
        if let Some((passed, total)) = counts.get_mut(&criterion.level) {
            *total += 1;
            if criterion.is_pass() {
                *passed += 1;
            }
        }
    }
    counts
        .into_iter()
        .map(|(level, (passed, total))| {
            let score = if total == 0 {
                100.0
            } else {
                round1(passed as f64 / total as f64 * 100.0)
            };
            (level, score)
        })
        .collect()
}

/// Longest run of gated levels starting at L1; 0 when L1 misses the gate
pub fn achieved_level(level_scores: &BTreeMap<u8, f64>) -> u8 {
    (1..=MAX_LEVEL)
        .take_while(|level| level_scores.get(level).copied().unwrap_or(0.0) >= LEVEL_GATE)
        .last()
        .unwrap_or(0)
}

/// Overall pass rate in percent, 0.0 when nothing was evaluated
pub fn pass_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(passed as f64 / total as f64 * 100.0)
}

pub fn summarize(pillars: &IndexMap<String, PillarResult>) -> LevelSummary {
    let level_scores = level_scores(pillars.values().flat_map(|p| p.criteria.iter()));
    let total_passed = pillars.values().map(|p| p.passed).sum();
    let total_criteria = pillars.values().map(|p| p.total).sum();
    LevelSummary {
        achieved_level: achieved_level(&level_scores),
        level_scores,
        total_passed,
        total_criteria,
        pass_rate: pass_rate(total_passed, total_criteria),
    }
}
