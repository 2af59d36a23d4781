//! User-level configuration for readiness
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/readiness/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SONAR_URL: &str = "https://sonarcloud.io";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub sonar: SonarConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SonarConfig {
    /// SonarQube / SonarCloud user token
    pub token: Option<String>,

    /// Server URL (default: https://sonarcloud.io)
    pub base_url: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/readiness/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
        {
            config.merge(user_config);
        }

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Get the user config directory path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("readiness").join("config.toml"))
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.sonar.token.is_some() {
            self.sonar.token = other.sonar.token;
        }
        if other.sonar.base_url.is_some() {
            self.sonar.base_url = other.sonar.base_url;
        }
    }

    /// Environment variables override everything. Empty values are ignored.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("SONAR_TOKEN").filter(|v| !v.is_empty()) {
            self.sonar.token = Some(token);
        }
        if let Some(url) = var("SONAR_HOST_URL").filter(|v| !v.is_empty()) {
            self.sonar.base_url = Some(url);
        }
    }

    pub fn sonar_token(&self) -> Option<&str> {
        self.sonar.token.as_deref()
    }

    /// Server URL without a trailing slash
    pub fn sonar_base_url(&self) -> &str {
        self.sonar
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_SONAR_URL)
            .trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(config.sonar_token().is_none());
        assert_eq!(config.sonar_base_url(), "https://sonarcloud.io");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
[sonar]
token = "squ_abc"
base_url = "https://sonar.example.com/"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sonar_token(), Some("squ_abc"));
        assert_eq!(config.sonar_base_url(), "https://sonar.example.com");
    }

    #[test]
    fn test_toml_parsing_minimal() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert!(config.sonar_token().is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config: UserConfig = toml::from_str("[sonar]\ntoken = \"from-file\"\n").unwrap();
        config.apply_env(|name| match name {
            "SONAR_TOKEN" => Some("from-env".to_string()),
            "SONAR_HOST_URL" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.sonar_token(), Some("from-env"));
        assert_eq!(config.sonar_base_url(), DEFAULT_SONAR_URL);
    }

    #[test]
    fn test_merge_preserves_base_when_other_is_none() {
        let mut base = UserConfig {
            sonar: SonarConfig {
                token: Some("from-file".to_string()),
                base_url: None,
            },
        };
        base.merge(UserConfig::default());
        assert_eq!(base.sonar_token(), Some("from-file"));
    }

    #[test]
    fn test_user_config_path_returns_some() {
        if let Some(p) = UserConfig::user_config_path() {
            assert!(p.ends_with("readiness/config.toml"));
        }
    }
}
