//! Implementation of the `reflecto init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::adapters::sqlite::{database_url, initialize_database};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::CONFIG_DIR;

/// Prompt templates read by the file prompt store.
const PROMPT_TEMPLATES: [&str; 5] = [
    "identity.txt",
    "context.txt",
    "daily_state.txt",
    "style_rules.txt",
    "purpose.txt",
];

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub directories_created: Vec<String>,
    pub config_written: bool,
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {dir}"));
            }
        }
        if self.config_written {
            lines.push(format!("\nWrote {CONFIG_DIR}/config.yaml"));
        }
        if self.database_initialized {
            lines.push(format!("Database initialized at {CONFIG_DIR}/reflecto.db"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };
    let result = initialize(&target_path, args.force).await?;
    output(&result, json_mode);
    Ok(())
}

/// Lay out `.reflecto/` under `target_path`.
pub async fn initialize(target_path: &Path, force: bool) -> Result<InitOutput> {
    let reflecto_dir = target_path.join(CONFIG_DIR);

    if reflecto_dir.exists() && !force {
        return Ok(InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            initialized_path: target_path.to_path_buf(),
            directories_created: vec![],
            config_written: false,
            database_initialized: false,
        });
    }

    if force && reflecto_dir.exists() {
        fs::remove_dir_all(&reflecto_dir)
            .await
            .context("Failed to remove existing .reflecto directory")?;
    }

    let mut directories_created = vec![];
    let dirs = [
        reflecto_dir.clone(),
        reflecto_dir.join("profiles"),
        reflecto_dir.join("prompts").join("avatar"),
        reflecto_dir.join("avatars"),
        reflecto_dir.join("logs"),
    ];
    for dir in &dirs {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let relative = dir
                .strip_prefix(target_path)
                .unwrap_or(dir)
                .to_string_lossy()
                .to_string();
            directories_created.push(relative);
        }
    }

    for name in PROMPT_TEMPLATES {
        let path = reflecto_dir.join("prompts").join("avatar").join(name);
        if !path.exists() {
            fs::write(&path, "")
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    let config_yaml = serde_yaml::to_string(&Config::default()).context("Failed to render config")?;
    fs::write(reflecto_dir.join("config.yaml"), config_yaml)
        .await
        .context("Failed to write config.yaml")?;

    let db_path = reflecto_dir.join("reflecto.db");
    let pool = initialize_database(&database_url(&db_path.to_string_lossy()), None)
        .await
        .context("Failed to initialize database")?;
    pool.close().await;

    Ok(InitOutput {
        success: true,
        message: if force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path.to_path_buf(),
        directories_created,
        config_written: true,
        database_initialized: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_lays_out_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = initialize(dir.path(), false).await.unwrap();

        assert!(result.success);
        assert!(result.database_initialized);
        assert!(dir.path().join(".reflecto/config.yaml").exists());
        assert!(dir.path().join(".reflecto/reflecto.db").exists());
        assert!(dir.path().join(".reflecto/prompts/avatar/purpose.txt").exists());
        assert!(result.directories_created.contains(&".reflecto/profiles".to_string()));

        let config: Config = serde_yaml::from_str(
            &std::fs::read_to_string(dir.path().join(".reflecto/config.yaml")).unwrap(),
        )
        .unwrap();
        assert_eq!(config.database.path, ".reflecto/reflecto.db");
    }

    #[tokio::test]
    async fn test_second_init_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        initialize(dir.path(), false).await.unwrap();

        let again = initialize(dir.path(), false).await.unwrap();
        assert!(!again.success);

        let forced = initialize(dir.path(), true).await.unwrap();
        assert!(forced.success);
    }
}
