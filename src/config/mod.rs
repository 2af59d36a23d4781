//! Configuration module for readiness
//!
//! This module handles:
//! - Project-level configuration (readiness.toml in the scanned repository)
//! - User-level configuration (~/.config/readiness/config.toml) for the
//!   Sonar credentials

mod project_config;
mod user_config;

pub use project_config::{load_project_config, AnalysisConfig, ProjectConfig, ReportConfig};
pub use user_config::{SonarConfig, UserConfig};
