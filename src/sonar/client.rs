//! Issue search client
//!
//! Sync HTTP via ureq. A failed page is logged and ends pagination with
//! whatever was collected so far.

use super::SonarIssue;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const PAGE_SIZE: usize = 500;

const STATUSES: &str = "OPEN,CONFIRMED,REOPENED";
const SEVERITY_FILTER: &str = "BLOCKER,CRITICAL,MAJOR,MINOR,INFO";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One page of `/api/issues/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuePage {
    #[serde(default)]
    pub issues: Vec<SonarIssue>,
    #[serde(default)]
    pub total: usize,
}

pub struct SonarClient {
    base_url: String,
    token: String,
    project_key: String,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

impl SonarClient {
    pub fn new(base_url: &str, token: &str, project_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            project_key: project_key.to_string(),
            agent: make_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Every open issue raised on `pull_request`
    pub fn pull_request_issues(&self, pull_request: &str) -> Vec<SonarIssue> {
        collect_pages(|page| self.fetch_page(pull_request, page))
    }

    fn fetch_page(&self, pull_request: &str, page: usize) -> Result<IssuePage> {
        let url = format!("{}/api/issues/search", self.base_url);
        let page_str = page.to_string();
        let size_str = PAGE_SIZE.to_string();

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .query("componentKeys", &self.project_key)
            .query("statuses", STATUSES)
            .query("severities", SEVERITY_FILTER)
            .query("p", &page_str)
            .query("ps", &size_str)
            .query("pullRequest", pull_request)
            .call()
            .with_context(|| format!("GET {} failed", url))?;
        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.into_body().read_to_string().unwrap_or_default();
            return Err(anyhow!("HTTP {} from {}: {}", status, url, body.trim()));
        }

        response
            .into_body()
            .read_json::<IssuePage>()
            .context("Unexpected issue search response")
    }
}

/// Request pages from 1 until the accumulated count reaches the reported
/// total or a page comes back empty. A failing page stops the loop.
pub(crate) fn collect_pages(mut fetch: impl FnMut(usize) -> Result<IssuePage>) -> Vec<SonarIssue> {
    let mut issues = Vec::new();
    let mut page = 1;
    loop {
        match fetch(page) {
            Ok(batch) => {
                let empty = batch.issues.is_empty();
                issues.extend(batch.issues);
                debug!("Issue page {}: {}/{} collected", page, issues.len(), batch.total);
                if issues.len() >= batch.total || empty {
                    break;
                }
                page += 1;
            }
            Err(e) => {
                warn!("Error fetching issues: {:#}", e);
                break;
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(keys: &[&str], total: usize) -> IssuePage {
        IssuePage {
            issues: keys
                .iter()
                .map(|k| SonarIssue {
                    key: Some(k.to_string()),
                    ..Default::default()
                })
                .collect(),
            total,
        }
    }

    #[test]
    fn test_pages_until_total() {
        let mut requested = Vec::new();
        let issues = collect_pages(|p| {
            requested.push(p);
            Ok(match p {
                1 => page(&["a", "b"], 3),
                2 => page(&["c"], 3),
                _ => page(&["never"], 3),
            })
        });
        assert_eq!(requested, vec![1, 2]);
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_empty_page_stops() {
        let issues = collect_pages(|p| Ok(if p == 1 { page(&["a"], 10) } else { page(&[], 10) }));
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_error_keeps_partial_result() {
        let issues = collect_pages(|p| {
            if p == 1 {
                Ok(page(&["a", "b"], 5))
            } else {
                Err(anyhow!("connection reset"))
            }
        });
        assert_eq!(issues.len(), 2);
    }

    /// Answer one HTTP request with `body`, returning the request head
    fn serve_once(body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        use std::io::{BufRead, BufReader, Write};
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line.trim().is_empty() {
                    break;
                }
                head.push_str(&line);
            }
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            )
            .unwrap();
            head
        });
        (base_url, handle)
    }

    #[test]
    fn test_issue_search_is_scoped_to_the_pull_request() {
        let (base_url, server) = serve_once(r#"{"total": 1, "issues": [{"key": "AX1", "severity": "MAJOR"}]}"#);
        let mut client = SonarClient::new(&format!("{}/", base_url), "s3cret", "acme");
        client.agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .proxy(None)
            .timeout_global(Some(Duration::from_secs(5)))
            .build()
            .new_agent();

        let issues = client.pull_request_issues("42");
        let head = server.join().unwrap();

        assert_eq!(issues.len(), 1);
        let request_line = head.lines().next().unwrap();
        assert!(request_line.starts_with("GET /api/issues/search?"));
        assert!(request_line.contains("pullRequest=42"));
        assert!(request_line.contains("componentKeys=acme"));
        assert!(request_line.contains("ps=500"));
        assert!(!request_line.contains("branch="));
        assert!(head.to_lowercase().contains("authorization: bearer s3cret"));
    }

    #[test]
    fn test_page_parses_api_shape() {
        let json = r#"{
            "total": 1, "p": 1, "ps": 500,
            "issues": [{
                "key": "AX1", "rule": "rust:S100", "severity": "MAJOR",
                "component": "acme:src/lib.rs", "line": 12,
                "message": "Rename this", "type": "CODE_SMELL",
                "effort": "5min", "debt": "5min", "status": "OPEN"
            }]
        }"#;
        let parsed: IssuePage = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total, 1);
        let issue = &parsed.issues[0];
        assert_eq!(issue.issue_type.as_deref(), Some("CODE_SMELL"));
        assert_eq!(issue.severity.as_deref(), Some("MAJOR"));
        assert_eq!(issue.line, Some(12));
    }
}
