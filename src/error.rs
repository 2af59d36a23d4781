//! Typed errors for analysis and reporting

use crate::criteria::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("Repository path does not exist: {}", .0.display())]
    RepoNotFound(PathBuf),

    #[error("Repository path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error(
        "Analysis file not found: {}\nRun 'readiness analyze' first to generate it.",
        .0.display()
    )]
    AnalysisFileMissing(PathBuf),

    #[error("Analysis file {} is not a valid readiness record: {source}", .path.display())]
    InvalidAnalysis {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid rule table: {0}")]
    Registry(#[from] RegistryError),
}

impl ReadinessError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        1
    }
}
