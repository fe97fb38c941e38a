//! Command-line interface for pollwise.

pub mod commands;
pub mod context;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::Result;

use crate::domain::models::Config;

/// Dispatch a parsed command.
pub async fn run(command: Commands, config: Config, json_mode: bool) -> Result<()> {
    match command {
        Commands::Init(args) => commands::init::execute(args, config, json_mode).await,
        Commands::Sweep(args) => commands::sweep::execute(args, config, json_mode).await,
        Commands::Check(args) => commands::check::execute(args, config, json_mode).await,
        Commands::Status(args) => commands::status::execute(args, config, json_mode).await,
        Commands::Generate(args) => commands::generate::execute(args, config, json_mode).await,
        Commands::Cast(args) => commands::cast::execute(args, config, json_mode).await,
        Commands::Daemon(args) => commands::daemon::execute(args, config, json_mode).await,
    }
}

/// Print `err` (with its cause chain) and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        println!(
            "{}",
            serde_json::json!({ "success": false, "error": err.to_string(), "causes": causes })
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
