//! Closure sweep background daemon.
//!
//! Drives [`ClosureEvaluator::sweep`] on a fixed interval and reports each run
//! over an event channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::domain::errors::DomainResult;
use crate::domain::models::ClosureConfig;
use crate::services::closure_evaluator::ClosureEvaluator;

/// Configuration for the closure daemon.
#[derive(Debug, Clone)]
pub struct ClosureDaemonConfig {
    /// Interval between sweeps.
    pub sweep_interval: Duration,
    /// Whether to sweep immediately on startup.
    pub run_on_startup: bool,
    /// Maximum consecutive failed sweeps before stopping.
    pub max_consecutive_failures: u32,
}

impl Default for ClosureDaemonConfig {
    fn default() -> Self {
        Self::from(&ClosureConfig::default())
    }
}

impl From<&ClosureConfig> for ClosureDaemonConfig {
    fn from(config: &ClosureConfig) -> Self {
        Self {
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            run_on_startup: config.run_on_startup,
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }
}

impl ClosureDaemonConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            sweep_interval: interval,
            ..Default::default()
        }
    }
}

/// Event emitted by the closure daemon.
#[derive(Debug, Clone)]
pub enum ClosureDaemonEvent {
    Started,
    SweepStarted { run_number: u64 },
    SweepCompleted {
        run_number: u64,
        closed: usize,
        duration_ms: u64,
    },
    SweepFailed { run_number: u64, error: String },
    Stopped { reason: StopReason },
}

/// Reason the daemon stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    TooManyFailures,
}

/// Status of the closure daemon.
#[derive(Debug, Clone, Default)]
pub struct DaemonStatus {
    pub running: bool,
    pub total_runs: u64,
    pub successful_runs: u64,
    pub failed_runs: u64,
    pub last_run: Option<Instant>,
    /// Votes closed across all sweeps.
    pub total_closed: u64,
}

/// Handle to control a running daemon.
#[derive(Clone)]
pub struct DaemonHandle {
    stop_flag: Arc<AtomicBool>,
    status: Arc<RwLock<DaemonStatus>>,
}

impl DaemonHandle {
    /// Request the daemon to stop. Takes effect after the current sweep.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> DaemonStatus {
        self.status.read().await.clone()
    }
}

pub struct ClosureDaemon {
    evaluator: Arc<ClosureEvaluator>,
    config: ClosureDaemonConfig,
    status: Arc<RwLock<DaemonStatus>>,
    stop_flag: Arc<AtomicBool>,
}

impl ClosureDaemon {
    pub fn new(evaluator: Arc<ClosureEvaluator>, config: ClosureDaemonConfig) -> Self {
        Self {
            evaluator,
            config,
            status: Arc::new(RwLock::new(DaemonStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> DaemonHandle {
        DaemonHandle {
            stop_flag: self.stop_flag.clone(),
            status: self.status.clone(),
        }
    }

    /// Spawn the daemon loop, returning a channel for its events.
    pub fn run(self) -> mpsc::Receiver<ClosureDaemonEvent> {
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            self.run_loop(tx).await;
        });

        rx
    }

    async fn run_loop(self, tx: mpsc::Sender<ClosureDaemonEvent>) {
        self.status.write().await.running = true;
        let _ = tx.send(ClosureDaemonEvent::Started).await;
        tracing::info!(
            interval_secs = self.config.sweep_interval.as_secs(),
            "closure daemon started"
        );

        let mut consecutive_failures = 0u32;
        let mut timer = interval(self.config.sweep_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        timer.tick().await;

        if self.config.run_on_startup {
            self.run_sweep_cycle(&tx, &mut consecutive_failures).await;
        }

        // poll the stop flag at least once a second so stop() is prompt even
        // with hour-long sweep intervals
        let mut stop_poll = interval(Duration::from_secs(1).min(self.config.sweep_interval));

        let reason = loop {
            if self.stop_flag.load(Ordering::Acquire) {
                break StopReason::Requested;
            }
            if consecutive_failures >= self.config.max_consecutive_failures {
                break StopReason::TooManyFailures;
            }

            tokio::select! {
                _ = timer.tick() => {
                    if self.stop_flag.load(Ordering::Acquire) {
                        break StopReason::Requested;
                    }
                    self.run_sweep_cycle(&tx, &mut consecutive_failures).await;
                }
                _ = stop_poll.tick() => {}
            }
        };

        self.status.write().await.running = false;
        match reason {
            StopReason::Requested => tracing::info!("closure daemon stopped"),
            StopReason::TooManyFailures => tracing::error!(
                failures = consecutive_failures,
                "closure daemon stopped after repeated sweep failures"
            ),
        }
        let _ = tx.send(ClosureDaemonEvent::Stopped { reason }).await;
    }

    async fn run_sweep_cycle(&self, tx: &mpsc::Sender<ClosureDaemonEvent>, consecutive_failures: &mut u32) {
        let run_number = {
            let mut status = self.status.write().await;
            status.total_runs += 1;
            status.total_runs
        };
        let _ = tx.send(ClosureDaemonEvent::SweepStarted { run_number }).await;

        let start = Instant::now();
        let result = self.evaluator.sweep().await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(closed) => {
                *consecutive_failures = 0;
                {
                    let mut status = self.status.write().await;
                    status.successful_runs += 1;
                    status.last_run = Some(Instant::now());
                    status.total_closed += closed as u64;
                }
                let _ = tx
                    .send(ClosureDaemonEvent::SweepCompleted {
                        run_number,
                        closed,
                        duration_ms,
                    })
                    .await;
            }
            Err(e) => {
                *consecutive_failures += 1;
                self.status.write().await.failed_runs += 1;
                tracing::warn!(run_number, error = %e, "closure sweep failed");
                let _ = tx
                    .send(ClosureDaemonEvent::SweepFailed {
                        run_number,
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    }

    /// Run a single sweep outside the loop.
    pub async fn run_once(&self) -> DomainResult<usize> {
        self.evaluator.sweep().await
    }

    pub fn config(&self) -> &ClosureDaemonConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Category, VoteStatus};
    use crate::domain::ports::VoteRepository;
    use crate::services::test_support::{day, Fixture};

    fn daemon(fx: &Fixture, config: ClosureDaemonConfig) -> ClosureDaemon {
        let evaluator = ClosureEvaluator::new(fx.votes.clone(), fx.responses.clone(), fx.pipeline());
        ClosureDaemon::new(Arc::new(evaluator), config)
    }

    #[test]
    fn test_config_from_closure_config() {
        let config = ClosureDaemonConfig::from(&ClosureConfig {
            sweep_interval_secs: 60,
            run_on_startup: false,
            detach_generation: true,
            max_consecutive_failures: 2,
        });
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert!(!config.run_on_startup);
        assert_eq!(config.max_consecutive_failures, 2);
    }

    #[test]
    fn test_daemon_status_default() {
        let status = DaemonStatus::default();
        assert!(!status.running);
        assert_eq!(status.total_runs, 0);
        assert!(status.last_run.is_none());
    }

    #[tokio::test]
    async fn test_startup_sweep_then_stop() {
        let fx = Fixture::new().await;
        let (vote, _) = fx.seed_open_vote(Category::Travel, day(2020, 1, 1)).await;

        let daemon = daemon(&fx, ClosureDaemonConfig::with_interval(Duration::from_secs(3600)));
        let handle = daemon.handle();
        let mut events = daemon.run();

        assert!(matches!(events.recv().await, Some(ClosureDaemonEvent::Started)));
        assert!(matches!(events.recv().await, Some(ClosureDaemonEvent::SweepStarted { run_number: 1 })));
        match events.recv().await {
            Some(ClosureDaemonEvent::SweepCompleted { closed, .. }) => assert_eq!(closed, 1),
            other => panic!("unexpected event: {other:?}"),
        }

        handle.stop();
        assert!(handle.is_stop_requested());
        match events.recv().await {
            Some(ClosureDaemonEvent::Stopped { reason }) => assert_eq!(reason, StopReason::Requested),
            other => panic!("unexpected event: {other:?}"),
        }

        let status = handle.status().await;
        assert!(!status.running);
        assert_eq!(status.successful_runs, 1);
        assert_eq!(status.total_closed, 1);
        let stored = fx.votes.get(vote.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VoteStatus::Closed);
    }

    #[tokio::test]
    async fn test_run_once() {
        let fx = Fixture::new().await;
        fx.seed_open_vote(Category::Food, day(2020, 1, 1)).await;
        fx.seed_open_vote(Category::Food, day(2020, 1, 2)).await;

        let daemon = daemon(&fx, ClosureDaemonConfig::default());
        assert_eq!(daemon.run_once().await.unwrap(), 2);
        assert_eq!(daemon.run_once().await.unwrap(), 0);
        assert_eq!(daemon.config().sweep_interval, Duration::from_secs(3600));
    }
}
