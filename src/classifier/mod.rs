//! Repository classification
//!
//! Infers the repository archetype (used to skip inapplicable criteria) and
//! the languages present, from manifest and file signals only.

pub mod apps;

pub use apps::{detect_apps, AppDetection};

use crate::models::{Language, RepoType};
use crate::probe::RepoProbe;
use tracing::debug;

/// Phrases in a README that mark a command-line tool
const CLI_README_MARKERS: &[&str] = &["command line", "cli", "usage:"];

/// File signals per language, in detection order
const LANGUAGE_SIGNALS: &[(Language, &[&str])] = &[
    (Language::Python, &["*.py", "**/*.py", "pyproject.toml", "setup.py"]),
    (Language::TypeScript, &["*.ts", "**/*.ts", "tsconfig.json"]),
    (Language::JavaScript, &["*.js", "**/*.js", "package.json"]),
    (Language::Go, &["*.go", "**/*.go", "go.mod"]),
    (Language::Rust, &["*.rs", "**/*.rs", "Cargo.toml"]),
    (Language::Java, &["*.java", "**/*.java", "pom.xml", "build.gradle"]),
    (Language::Ruby, &["*.rb", "**/*.rb", "Gemfile"]),
    (Language::Cpp, &["*.cpp", "*.cc", "**/*.cpp", "CMakeLists.txt"]),
];

/// Classify the repository. The first matching rule wins:
/// library, cli, database, monorepo, then application.
pub fn detect_repo_type(probe: &RepoProbe, repo_name: &str) -> RepoType {
    let repo_type = if is_library(probe) {
        RepoType::Library
    } else if is_cli(probe) {
        RepoType::Cli
    } else if is_database(repo_name) {
        RepoType::Database
    } else if probe.exists(&["packages/*", "apps/*", "lerna.json", "pnpm-workspace.yaml"]) {
        RepoType::Monorepo
    } else {
        RepoType::Application
    };
    debug!("Detected repo type: {}", repo_type);
    repo_type
}

fn is_library(probe: &RepoProbe) -> bool {
    let has_dockerfile = probe.exists(&["Dockerfile"]);

    if probe.exists(&["setup.py", "setup.cfg"])
        && !has_dockerfile
        && probe.read_lower("setup.py").contains("library")
    {
        return true;
    }

    // PEP 621 package advertising pip install and no container story
    let declares_project = probe
        .read("pyproject.toml")
        .is_some_and(|c| c.contains("[project]"));
    if declares_project && !has_dockerfile {
        let readme = probe.read_lower("README.md");
        return readme.contains("pip install") && !readme.contains("docker");
    }
    false
}

fn is_cli(probe: &RepoProbe) -> bool {
    if !probe.exists(&["**/cli.py", "**/main.py", "**/cmd/**"]) {
        return false;
    }
    let readme = probe.read_lower("README.md");
    CLI_README_MARKERS.iter().any(|m| readme.contains(m))
}

fn is_database(repo_name: &str) -> bool {
    let name = repo_name.to_lowercase();
    name.contains("database") || name.contains("db")
}

/// Languages present in the repository, deduplicated in detection order.
/// JavaScript is dropped when TypeScript is present. Never empty.
pub fn detect_languages(probe: &RepoProbe) -> Vec<Language> {
    let mut languages = Vec::new();
    for (language, signals) in LANGUAGE_SIGNALS {
        if *language == Language::JavaScript && languages.contains(&Language::TypeScript) {
            continue;
        }
        if probe.exists(signals) {
            languages.push(*language);
        }
    }
    if languages.is_empty() {
        languages.push(Language::Unknown);
    }
    languages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn classify(root: &Path, name: &str) -> RepoType {
        detect_repo_type(&RepoProbe::new(root), name)
    }

    #[test]
    fn test_setup_py_library() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "setup.py", "setup(description='A small library')");
        assert_eq!(classify(dir.path(), "widgets"), RepoType::Library);
    }

    #[test]
    fn test_dockerfile_blocks_library() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "setup.py", "setup(description='A small library')");
        write(dir.path(), "Dockerfile", "FROM python");
        assert_eq!(classify(dir.path(), "widgets"), RepoType::Application);
    }

    #[test]
    fn test_pyproject_library_needs_pip_install_without_docker() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pyproject.toml", "[project]\nname = \"w\"\n");
        write(dir.path(), "README.md", "Install with `pip install w`.");
        assert_eq!(classify(dir.path(), "widgets"), RepoType::Library);

        write(dir.path(), "README.md", "pip install w, or use Docker");
        assert_eq!(classify(dir.path(), "widgets"), RepoType::Application);
    }

    #[test]
    fn test_cli_needs_entrypoint_and_readme_marker() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "tool/cli.py", "");
        assert_eq!(classify(dir.path(), "tool"), RepoType::Application);

        write(dir.path(), "README.md", "## Usage:\n  tool run");
        assert_eq!(classify(dir.path(), "tool"), RepoType::Cli);
    }

    #[test]
    fn test_go_cmd_directory_is_cli() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "cmd/tool/main.go", "package main");
        write(dir.path(), "README.md", "A CLI for things");
        assert_eq!(classify(dir.path(), "tool"), RepoType::Cli);
    }

    #[test]
    fn test_database_by_name() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(classify(dir.path(), "TimescaleDB"), RepoType::Database);
        assert_eq!(classify(dir.path(), "my-database"), RepoType::Database);
    }

    #[test]
    fn test_monorepo_signals() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("packages/web")).unwrap();
        assert_eq!(classify(dir.path(), "platform"), RepoType::Monorepo);

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "pnpm-workspace.yaml", "packages: []");
        assert_eq!(classify(dir.path(), "platform"), RepoType::Monorepo);
    }

    #[test]
    fn test_library_wins_over_database_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "setup.cfg", "");
        write(dir.path(), "setup.py", "# client library");
        assert_eq!(classify(dir.path(), "pydb"), RepoType::Library);
    }

    #[test]
    fn test_languages_in_detection_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "go.mod", "module x");
        write(dir.path(), "scripts/gen.py", "");
        write(dir.path(), "Cargo.toml", "[package]");
        let langs = detect_languages(&RepoProbe::new(dir.path()));
        assert_eq!(langs, vec![Language::Python, Language::Go, Language::Rust]);
    }

    #[test]
    fn test_typescript_suppresses_javascript() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", "{}");
        write(dir.path(), "tsconfig.json", "{}");
        let langs = detect_languages(&RepoProbe::new(dir.path()));
        assert_eq!(langs, vec![Language::TypeScript]);
    }

    #[test]
    fn test_no_signals_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let langs = detect_languages(&RepoProbe::new(dir.path()));
        assert_eq!(langs, vec![Language::Unknown]);
    }
}
