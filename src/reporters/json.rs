//! JSON reporter
//!
//! Outputs the analysis record as pretty-printed JSON, the same shape
//! `readiness analyze` writes, so the output can be fed back to `report`.

use crate::models::AnalysisResult;
use anyhow::Result;

/// Render the record as JSON
pub fn render(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_json_render_valid() {
        let result = test_result();
        let json_str = render(&result).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["repo_name"], "acme");
        assert_eq!(parsed["repo_type"], "monorepo");
        assert_eq!(parsed["level_scores"]["1"], 66.7);
        assert_eq!(parsed["pillars"]["Testing"]["criteria"][1]["status"], "fail");
    }

    #[test]
    fn test_json_reads_back_identically() {
        let result = test_result();
        let json_str = render(&result).expect("render JSON");
        let back: AnalysisResult = serde_json::from_str(&json_str).expect("parse record");
        assert_eq!(back, result);
    }
}
