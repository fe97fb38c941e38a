pub mod config;
pub mod guide;
pub mod tail;
pub mod vote;

pub use config::{ClosureConfig, CompletionConfig, Config, DatabaseConfig, LoggingConfig};
pub use guide::Guide;
pub use tail::{Tail, TailResponse};
pub use vote::{Category, ClosureType, Vote, VoteOption, VoteResponse, VoteStatus};
