//! Monorepo sub-application detection

use crate::models::{AppInfo, Language};
use crate::probe::RepoProbe;
use tracing::{debug, warn};

/// Conventional top-level folders that hold sub-applications
pub const APP_GROUP_DIRS: &[&str] = &["packages", "apps", "services", "modules"];

/// A folder holding any of these is treated as an application
pub const MANIFEST_FILES: &[&str] = &[
    "package.json",
    "pyproject.toml",
    "setup.py",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Gemfile",
];

const IGNORED_FOLDERS: &[&str] = &["node_modules", "__pycache__"];

/// Per-app language signals, checked only at the top of the app folder
const APP_LANGUAGE_SIGNALS: &[(Language, &[&str])] = &[
    (Language::Python, &["*.py", "pyproject.toml"]),
    (Language::TypeScript, &["*.ts", "tsconfig.json"]),
    (Language::JavaScript, &["*.js", "package.json"]),
    (Language::Go, &["*.go", "go.mod"]),
    (Language::Rust, &["*.rs", "Cargo.toml"]),
];

/// Apps found in a monorepo, plus candidate folders that had no manifest
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppDetection {
    pub apps: Vec<AppInfo>,
    /// "group/name" for each folder without a manifest
    pub undetected: Vec<String>,
}

/// Enumerate sub-applications under the conventional group folders.
/// Only meaningful for monorepos; callers gate on the repo type.
pub fn detect_apps(probe: &RepoProbe) -> AppDetection {
    let mut detection = AppDetection::default();

    for group in APP_GROUP_DIRS {
        if !probe.is_dir(group) {
            continue;
        }
        for (name, is_dir) in probe.list_dir(group) {
            if !is_dir || name.starts_with('.') || IGNORED_FOLDERS.contains(&name.as_str()) {
                continue;
            }
            let rel = format!("{}/{}", group, name);
            if probe.exists_in(&rel, MANIFEST_FILES) {
                let languages = app_languages(probe, &rel);
                debug!("Detected app {} ({:?})", rel, languages);
                let path = probe.root().join(group).join(&name);
                // Names key per-app results; a repeated folder name keeps its group
                let name = if detection.apps.iter().any(|a| a.name == name) {
                    debug!("App name {} already taken, using {}", name, rel);
                    rel
                } else {
                    name
                };
                detection.apps.push(AppInfo {
                    name,
                    path,
                    languages,
                });
            } else {
                warn!("Folder {} has no manifest file, not treated as an app", rel);
                detection.undetected.push(rel);
            }
        }
    }

    detection
}

/// Languages of one app folder. JavaScript is dropped when TypeScript is present.
pub fn app_languages(probe: &RepoProbe, rel_dir: &str) -> Vec<Language> {
    let mut languages = Vec::new();
    for (language, signals) in APP_LANGUAGE_SIGNALS {
        if *language == Language::JavaScript && languages.contains(&Language::TypeScript) {
            continue;
        }
        if probe.exists_in(rel_dir, signals) {
            languages.push(*language);
        }
    }
    if languages.is_empty() {
        languages.push(Language::Unknown);
    }
    languages
}
