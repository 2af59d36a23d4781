//! Dev Environment

use super::{Pillar, Rule, RuleContext};

const P: Pillar = Pillar::DevEnvironment;

const DEVCONTAINER: &str = ".devcontainer/devcontainer.json";

pub(super) const RULES: &[Rule] = &[
    Rule::repo(
        P,
        "env_template",
        2,
        env_template,
        "Environment template exists",
        "Add .env.example or .env.template with required environment variables",
    ),
    Rule::repo(
        P,
        "devcontainer",
        3,
        |ctx| ctx.probe.exists(&[DEVCONTAINER]),
        "Devcontainer configured",
        "Add .devcontainer/devcontainer.json for reproducible dev environments",
    ),
    Rule::repo(
        P,
        "devcontainer_runnable",
        3,
        |ctx| ctx.probe.read_lower(DEVCONTAINER).contains("image"),
        "Devcontainer appears valid",
        "Add 'image' or 'dockerFile' key to devcontainer.json",
    ),
    Rule::repo(
        P,
        "database_schema",
        3,
        |ctx| {
            ctx.probe.exists(&[
                "migrations/**",
                "db/migrations/**",
                "alembic/**",
                "prisma/schema.prisma",
                "schema.sql",
                "db/schema.rb",
            ])
        },
        "Database schema managed",
        "Add migrations/ (Alembic/Prisma/Rails) or schema.sql for database versioning",
    ),
    Rule::repo(
        P,
        "local_services_setup",
        3,
        |ctx| {
            ctx.probe.exists(&[
                "docker-compose.yml",
                "docker-compose.yaml",
                "compose.yml",
                "compose.yaml",
            ])
        },
        "Local services configured",
        "Add docker-compose.yml for local database, cache, and service dependencies",
    ),
];

fn env_template(ctx: &RuleContext<'_>) -> bool {
    ctx.probe
        .exists(&[".env.example", ".env.template", ".env.sample"])
        || ctx
            .probe
            .read_all_lower(&["README.md", "AGENTS.md"])
            .contains("environment variable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::tests::OfflineRunner;
    use crate::criteria::Check;
    use crate::models::RepoType;
    use crate::probe::RepoProbe;
    use std::fs;

    fn check(id: &str, probe: &RepoProbe) -> bool {
        let ctx = RuleContext {
            probe,
            runner: &OfflineRunner,
            repo_type: RepoType::Application,
            languages: &[],
            apps: &[],
        };
        match RULES.iter().find(|r| r.id == id).map(|r| r.check) {
            Some(Check::Repo(f)) => f(&ctx),
            _ => panic!("{} is not a repo check", id),
        }
    }

    #[test]
    fn test_env_template_from_readme_prose() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("README.md"),
            "Set the DATABASE_URL Environment Variable first.",
        )
        .unwrap();
        assert!(check("env_template", &RepoProbe::new(dir.path())));
    }

    #[test]
    fn test_devcontainer_runnable_needs_image() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".devcontainer")).unwrap();
        fs::write(dir.path().join(DEVCONTAINER), r#"{"name": "dev"}"#).unwrap();
        let probe = RepoProbe::new(dir.path());
        assert!(check("devcontainer", &probe));
        assert!(!check("devcontainer_runnable", &probe));

        fs::write(
            dir.path().join(DEVCONTAINER),
            r#"{"image": "mcr.microsoft.com/devcontainers/rust:1"}"#,
        )
        .unwrap();
        assert!(check("devcontainer_runnable", &RepoProbe::new(dir.path())));
    }

    #[test]
    fn test_compose_file_is_local_services() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("compose.yaml"), "services: {}").unwrap();
        assert!(check("local_services_setup", &RepoProbe::new(dir.path())));
    }
}
