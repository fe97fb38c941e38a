//! Implementation of the `pollwise daemon` command.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::context::AppContext;
use crate::domain::models::Config;
use crate::services::{ClosureDaemon, ClosureDaemonConfig, ClosureDaemonEvent};

#[derive(Args, Debug)]
pub struct DaemonArgs {
    /// Override the configured sweep interval (seconds)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Skip the sweep that normally runs at startup
    #[arg(long)]
    pub no_startup_sweep: bool,
}

pub async fn execute(args: DaemonArgs, config: Config, json_mode: bool) -> Result<()> {
    let detach = config.closure.detach_generation;
    let mut daemon_config = ClosureDaemonConfig::from(&config.closure);
    if let Some(secs) = args.interval {
        anyhow::ensure!(secs > 0, "--interval must be at least 1 second");
        daemon_config.sweep_interval = Duration::from_secs(secs);
    }
    if args.no_startup_sweep {
        daemon_config.run_on_startup = false;
    }

    let ctx = AppContext::build(config, detach).await?;
    let daemon = ClosureDaemon::new(Arc::clone(&ctx.evaluator), daemon_config);
    let handle = daemon.handle();
    let mut events = daemon.run();

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                report(&event, json_mode);
                if matches!(event, ClosureDaemonEvent::Stopped { .. }) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, draining");
                ctx.registry.shutdown();
                handle.stop();
            }
        }
    }

    let status = handle.status().await;
    tracing::info!(
        runs = status.total_runs,
        failed = status.failed_runs,
        closed = status.total_closed,
        "daemon exited"
    );
    if status.failed_runs > 0 && !handle.is_stop_requested() {
        anyhow::bail!("Closure daemon stopped after {} failed sweep(s)", status.failed_runs);
    }
    Ok(())
}

fn report(event: &ClosureDaemonEvent, json_mode: bool) {
    match event {
        ClosureDaemonEvent::SweepCompleted { run_number, closed, duration_ms } => {
            if json_mode {
                println!(
                    "{}",
                    serde_json::json!({ "run": run_number, "closed": closed, "duration_ms": duration_ms })
                );
            } else {
                println!("sweep #{run_number}: closed {closed} vote(s) in {duration_ms}ms");
            }
        }
        ClosureDaemonEvent::SweepFailed { run_number, error } => {
            if json_mode {
                println!("{}", serde_json::json!({ "run": run_number, "error": error }));
            } else {
                eprintln!("sweep #{run_number} failed: {error}");
            }
        }
        _ => {}
    }
}
