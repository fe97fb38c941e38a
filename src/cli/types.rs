//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    cast::CastArgs, check::CheckArgs, daemon::DaemonArgs, generate::GenerateArgs, init::InitArgs,
    status::StatusArgs, sweep::SweepArgs,
};

#[derive(Parser, Debug)]
#[command(name = "pollwise")]
#[command(about = "Pollwise - vote closure and AI guide synthesis", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from this file instead of .pollwise/
    #[arg(short, long, global = true, env = "POLLWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the project directory, default config and database
    Init(InitArgs),

    /// Close every vote that is past its finish date or at its threshold
    Sweep(SweepArgs),

    /// Run the real-time threshold check for one vote
    Check(CheckArgs),

    /// Explain why a vote is or would be closed
    Status(StatusArgs),

    /// Generate (or regenerate) the guide for a vote
    Generate(GenerateArgs),

    /// Record a response and run the threshold check
    Cast(CastArgs),

    /// Run periodic sweeps until interrupted
    Daemon(DaemonArgs),
}
