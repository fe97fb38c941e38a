//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that infrastructure adapters implement:
//! - VoteRepository / ResponseRepository: votes, options and responses
//! - TailRepository: follow-up questions and answers
//! - GuideRepository: synthesized guides
//! - CompletionClient: the external text-generation service

pub mod completion_client;
pub mod guide_repository;
pub mod response_repository;
pub mod tail_repository;
pub mod vote_repository;

pub use completion_client::CompletionClient;
pub use guide_repository::GuideRepository;
pub use response_repository::ResponseRepository;
pub use tail_repository::TailRepository;
pub use vote_repository::VoteRepository;
