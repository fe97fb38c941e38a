//! Implementation of the `pollwise init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::PROJECT_DIR;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
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
    pub config_path: PathBuf,
    pub config_written: bool,
    pub database_path: String,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("Wrote default config to {}", self.config_path.display()));
        }
        lines.push(format!("Database ready at {}", self.database_path));
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, mut config: Config, json_mode: bool) -> Result<()> {
    let project_dir = args.path.join(PROJECT_DIR);
    let config_path = project_dir.join("config.yaml");

    fs::create_dir_all(&project_dir)
        .await
        .with_context(|| format!("Failed to create {}", project_dir.display()))?;

    let config_written = if config_path.exists() && !args.force {
        false
    } else {
        let yaml = serde_yaml::to_string(&Config::default()).context("Failed to render default config")?;
        fs::write(&config_path, yaml)
            .await
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        true
    };

    if args.path != PathBuf::from(".") && !PathBuf::from(&config.database.path).is_absolute() {
        config.database.path = args.path.join(&config.database.path).display().to_string();
    }
    let pool = initialize_database(&config.database).await.context("Failed to initialize database")?;
    pool.close().await;

    let message = if config_written {
        "Project initialized."
    } else {
        "Project already initialized; kept existing config (use --force to overwrite)."
    };

    output(
        &InitOutput {
            success: true,
            message: message.to_string(),
            config_path,
            config_written,
            database_path: config.database.path,
        },
        json_mode,
    );
    Ok(())
}
