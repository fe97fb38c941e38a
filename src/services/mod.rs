pub mod ballot_service;
pub mod closure_daemon;
pub mod closure_evaluator;
pub mod guide_pipeline;
pub mod guide_prompt;
pub mod request_registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use ballot_service::{BallotService, CastOutcome};
pub use closure_daemon::{
    ClosureDaemon, ClosureDaemonConfig, ClosureDaemonEvent, DaemonHandle, DaemonStatus, StopReason,
};
pub use closure_evaluator::{ClosureEvaluator, ClosureReason, ClosureStatus};
pub use guide_pipeline::GuidePipeline;
pub use guide_prompt::{OptionTally, ParsedGuide};
pub use request_registry::{RequestGuard, RequestKey, RequestRegistry, RequestTicket};
