//! Pollwise - vote closure and AI guide synthesis
//!
//! Pollwise closes community votes once their finish date has passed or their
//! participant threshold is reached, then asks a text-completion backend to
//! turn the results and follow-up answers into a guide.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and repository/client ports
//! - **Adapters** (`adapters`): SQLite repositories and completion clients
//! - **Service Layer** (`services`): closure evaluation, guide synthesis,
//!   request supervision and the sweep daemon
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use pollwise::services::ClosureEvaluator;
//!
//! let closed = evaluator.sweep().await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{CancellationError, DomainError, DomainResult};
pub use domain::models::{
    Category, ClosureType, Config, Guide, Tail, TailResponse, Vote, VoteOption, VoteResponse,
    VoteStatus,
};
pub use domain::ports::{
    CompletionClient, GuideRepository, ResponseRepository, TailRepository, VoteRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    BallotService, ClosureDaemon, ClosureEvaluator, ClosureReason, ClosureStatus, GuidePipeline,
    RequestKey, RequestRegistry,
};
