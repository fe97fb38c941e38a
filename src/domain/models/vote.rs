//! Vote domain model.
//!
//! A vote is a poll that stays open until either its finish date passes or
//! it collects enough responses, then closes exactly once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status of a vote. The only transition is `Open -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteStatus {
    #[default]
    Open,
    Closed,
}

impl VoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        matches!((self, new_status), (Self::Open, Self::Closed))
    }
}

/// How the vote creator intended the vote to end.
///
/// Both closure predicates are evaluated regardless of this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureType {
    #[default]
    Date,
    Participant,
}

impl ClosureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Participant => "participant",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "date" => Some(Self::Date),
            "participant" | "participants" => Some(Self::Participant),
            _ => None,
        }
    }
}

/// Topic of a vote. Doubles as the guide type when a guide is synthesized
/// from a closed vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Travel,
    Food,
    Fashion,
    Lifestyle,
    Hobby,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Travel,
        Self::Food,
        Self::Fashion,
        Self::Lifestyle,
        Self::Hobby,
        Self::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Food => "food",
            Self::Fashion => "fashion",
            Self::Lifestyle => "lifestyle",
            Self::Hobby => "hobby",
            Self::General => "general",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A poll awaiting responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub question: String,
    pub category: Category,
    pub status: VoteStatus,
    /// Last day the vote accepts responses; it closes once this date is in the past.
    pub finished_at: NaiveDate,
    pub participant_threshold: Option<u32>,
    pub closure_type: ClosureType,
    /// Bumped on every status change.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Vote {
    pub fn new(question: impl Into<String>, category: Category, finished_at: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            category,
            status: VoteStatus::Open,
            finished_at,
            participant_threshold: None,
            closure_type: ClosureType::Date,
            version: 1,
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    /// Close the vote once `threshold` responses have been recorded.
    pub fn with_participant_threshold(mut self, threshold: u32) -> Self {
        self.participant_threshold = Some(threshold);
        self.closure_type = ClosureType::Participant;
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == VoteStatus::Open
    }

    /// Date predicate: the finish date lies strictly before `today`.
    pub fn date_passed(&self, today: NaiveDate) -> bool {
        self.finished_at < today
    }

    /// Participant predicate: a threshold is set and `response_count` meets it.
    pub fn threshold_reached(&self, response_count: u64) -> bool {
        self.participant_threshold
            .is_some_and(|threshold| response_count >= u64::from(threshold))
    }

    /// Transition `Open -> Closed`.
    pub fn close(&mut self) -> Result<(), String> {
        if !self.status.can_transition_to(VoteStatus::Closed) {
            return Err(format!(
                "Cannot transition from {} to {}",
                self.status.as_str(),
                VoteStatus::Closed.as_str()
            ));
        }

        self.status = VoteStatus::Closed;
        self.closed_at = Some(Utc::now());
        self.version += 1;
        Ok(())
    }
}

/// A selectable choice within a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOption {
    pub id: Uuid,
    pub vote_id: Uuid,
    pub content: String,
    /// Display order within the vote.
    pub position: u32,
}

impl VoteOption {
    pub fn new(vote_id: Uuid, content: impl Into<String>, position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            vote_id,
            content: content.into(),
            position,
        }
    }
}

/// One user's recorded selection for a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub id: Uuid,
    pub vote_id: Uuid,
    pub option_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl VoteResponse {
    pub fn new(vote_id: Uuid, option_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vote_id,
            option_id,
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}
