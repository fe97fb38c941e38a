//! Follow-up question attached to a vote and its free-text answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single follow-up free-text question attached to a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tail {
    pub id: Uuid,
    pub vote_id: Uuid,
    pub question: String,
    pub created_at: DateTime<Utc>,
}

impl Tail {
    pub fn new(vote_id: Uuid, question: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vote_id,
            question: question.into(),
            created_at: Utc::now(),
        }
    }
}

/// One user's answer to a tail question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailResponse {
    pub id: Uuid,
    pub tail_id: Uuid,
    pub user_id: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl TailResponse {
    pub fn new(tail_id: Uuid, user_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tail_id,
            user_id: user_id.into(),
            answer: answer.into(),
            created_at: Utc::now(),
        }
    }
}
