//! Readiness - agent readiness scanner
//!
//! Evaluates a repository against a fixed rubric of criteria grouped into
//! nine pillars, aggregates a maturity level (L1 to L5), and renders the
//! result as Markdown, HTML or JSON.

pub mod analyzer;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod criteria;
pub mod error;
pub mod models;
pub mod probe;
pub mod reporters;
pub mod scoring;
pub mod sonar;

pub use analyzer::ReadinessAnalyzer;
pub use error::ReadinessError;
