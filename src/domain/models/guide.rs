//! Guide domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vote::Category;

/// A summary document synthesized from a closed vote's results and the
/// answers to its follow-up question. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    pub id: Uuid,
    pub vote_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub guide_type: Category,
    pub like_count: u64,
    pub revote_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Guide {
    pub fn new(
        vote_id: Uuid,
        title: impl Into<String>,
        content: impl Into<String>,
        category: Category,
        guide_type: Category,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            vote_id,
            title: title.into(),
            content: content.into(),
            category,
            guide_type,
            like_count: 0,
            revote_count: 0,
            created_at: Utc::now(),
        }
    }
}
