//! Pollwise CLI entry point.

use clap::Parser;

use pollwise::cli::{context::load_config, Cli};
use pollwise::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => pollwise::cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => pollwise::cli::handle_error(err, cli.json),
    };

    if let Err(err) = pollwise::cli::run(cli.command, config, cli.json).await {
        pollwise::cli::handle_error(err, cli.json);
    }
}
