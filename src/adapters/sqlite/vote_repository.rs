//! SQLite implementation of the VoteRepository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{
    parse_category, parse_closure_type, parse_date, parse_datetime, parse_optional_datetime, parse_uuid,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Vote, VoteOption, VoteStatus};
use crate::domain::ports::VoteRepository;

#[derive(Clone)]
pub struct SqliteVoteRepository {
    pool: SqlitePool,
}

impl SqliteVoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: Uuid) -> DomainResult<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM votes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl VoteRepository for SqliteVoteRepository {
    async fn create(&self, vote: &Vote) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO votes (id, question, category, status, finished_at, participant_threshold,
               closure_type, version, created_at, closed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(vote.id.to_string())
        .bind(&vote.question)
        .bind(vote.category.as_str())
        .bind(vote.status.as_str())
        .bind(vote.finished_at.to_string())
        .bind(vote.participant_threshold.map(i64::from))
        .bind(vote.closure_type.as_str())
        .bind(vote.version as i64)
        .bind(vote.created_at.to_rfc3339())
        .bind(vote.closed_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Vote>> {
        let row: Option<VoteRow> = sqlx::query_as("SELECT * FROM votes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Vote::try_from).transpose()
    }

    async fn list_by_status(&self, status: VoteStatus) -> DomainResult<Vec<Vote>> {
        let rows: Vec<VoteRow> = sqlx::query_as(
            "SELECT * FROM votes WHERE status = ? ORDER BY created_at"
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Vote::try_from).collect()
    }

    async fn list_by_status_finished_before(
        &self,
        status: VoteStatus,
        date: NaiveDate,
    ) -> DomainResult<Vec<Vote>> {
        // ISO-8601 dates order lexicographically
        let rows: Vec<VoteRow> = sqlx::query_as(
            "SELECT * FROM votes WHERE status = ? AND finished_at < ? ORDER BY finished_at, created_at"
        )
        .bind(status.as_str())
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Vote::try_from).collect()
    }

    async fn save_closed(&self, vote: &Vote) -> DomainResult<()> {
        let expected_version = vote.version.saturating_sub(1);

        let result = sqlx::query(
            r#"UPDATE votes SET status = ?, version = ?, closed_at = ?
               WHERE id = ? AND version = ? AND status = 'open'"#
        )
        .bind(vote.status.as_str())
        .bind(vote.version as i64)
        .bind(vote.closed_at.map(|t| t.to_rfc3339()))
        .bind(vote.id.to_string())
        .bind(expected_version as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if !self.exists(vote.id).await? {
                return Err(DomainError::VoteNotFound(vote.id));
            }
            return Err(DomainError::ConcurrencyConflict {
                entity: "vote".to_string(),
                id: vote.id.to_string(),
            });
        }

        Ok(())
    }

    async fn add_option(&self, option: &VoteOption) -> DomainResult<()> {
        sqlx::query("INSERT INTO vote_options (id, vote_id, content, position) VALUES (?, ?, ?, ?)")
            .bind(option.id.to_string())
            .bind(option.vote_id.to_string())
            .bind(&option.content)
            .bind(i64::from(option.position))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_options(&self, vote_id: Uuid) -> DomainResult<Vec<VoteOption>> {
        let rows: Vec<OptionRow> = sqlx::query_as(
            "SELECT * FROM vote_options WHERE vote_id = ? ORDER BY position, content"
        )
        .bind(vote_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VoteOption::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    id: String,
    question: String,
    category: String,
    status: String,
    finished_at: String,
    participant_threshold: Option<i64>,
    closure_type: String,
    version: i64,
    created_at: String,
    closed_at: Option<String>,
}

impl TryFrom<VoteRow> for Vote {
    type Error = DomainError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        let status = VoteStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::SerializationError(format!("unknown vote status: {}", row.status)))?;
        let participant_threshold = row
            .participant_threshold
            .map(u32::try_from)
            .transpose()
            .map_err(|e| DomainError::SerializationError(e.to_string()))?;

        Ok(Vote {
            id: parse_uuid(&row.id)?,
            question: row.question,
            category: parse_category(&row.category)?,
            status,
            finished_at: parse_date(&row.finished_at)?,
            participant_threshold,
            closure_type: parse_closure_type(&row.closure_type)?,
            version: row.version as u64,
            created_at: parse_datetime(&row.created_at)?,
            closed_at: parse_optional_datetime(row.closed_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OptionRow {
    id: String,
    vote_id: String,
    content: String,
    position: i64,
}

impl TryFrom<OptionRow> for VoteOption {
    type Error = DomainError;

    fn try_from(row: OptionRow) -> Result<Self, Self::Error> {
        Ok(VoteOption {
            id: parse_uuid(&row.id)?,
            vote_id: parse_uuid(&row.vote_id)?,
            content: row.content,
            position: u32::try_from(row.position)
                .map_err(|e| DomainError::SerializationError(e.to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::{Category, ClosureType};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup_repo() -> SqliteVoteRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteVoteRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_vote() {
        let repo = setup_repo().await;
        let vote = Vote::new("Best ramen?", Category::Food, day(2024, 3, 1)).with_participant_threshold(10);
        repo.create(&vote).await.unwrap();

        let loaded = repo.get(vote.id).await.unwrap().unwrap();
        assert_eq!(loaded.question, "Best ramen?");
        assert_eq!(loaded.category, Category::Food);
        assert_eq!(loaded.participant_threshold, Some(10));
        assert_eq!(loaded.closure_type, ClosureType::Participant);
        assert_eq!(loaded.finished_at, day(2024, 3, 1));
        assert_eq!(loaded.status, VoteStatus::Open);
    }

    #[tokio::test]
    async fn test_list_finished_before_is_strict() {
        let repo = setup_repo().await;
        let past = Vote::new("past", Category::General, day(2024, 1, 1));
        let today = Vote::new("today", Category::General, day(2024, 1, 2));
        repo.create(&past).await.unwrap();
        repo.create(&today).await.unwrap();

        let due = repo
            .list_by_status_finished_before(VoteStatus::Open, day(2024, 1, 2))
            .await
            .unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, past.id);
    }

    #[tokio::test]
    async fn test_save_closed_rejects_second_writer() {
        let repo = setup_repo().await;
        let vote = Vote::new("q", Category::General, day(2030, 1, 1));
        repo.create(&vote).await.unwrap();

        let mut first = repo.get(vote.id).await.unwrap().unwrap();
        let mut second = first.clone();
        first.close().unwrap();
        second.close().unwrap();

        repo.save_closed(&first).await.unwrap();
        let err = repo.save_closed(&second).await.unwrap_err();
        assert!(matches!(err, DomainError::ConcurrencyConflict { .. }));

        let stored = repo.get(vote.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VoteStatus::Closed);
        assert_eq!(stored.version, 2);
        assert!(repo.list_by_status(VoteStatus::Open).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_closed_unknown_vote() {
        let repo = setup_repo().await;
        let mut vote = Vote::new("ghost", Category::General, day(2030, 1, 1));
        vote.close().unwrap();
        let err = repo.save_closed(&vote).await.unwrap_err();
        assert!(matches!(err, DomainError::VoteNotFound(id) if id == vote.id));
    }

    #[tokio::test]
    async fn test_options_in_position_order() {
        let repo = setup_repo().await;
        let vote = Vote::new("q", Category::General, day(2030, 1, 1));
        repo.create(&vote).await.unwrap();
        repo.add_option(&VoteOption::new(vote.id, "second", 2)).await.unwrap();
        repo.add_option(&VoteOption::new(vote.id, "first", 1)).await.unwrap();

        let options = repo.list_options(vote.id).await.unwrap();
        let contents: Vec<_> = options.iter().map(|o| o.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() {
        let repo = setup_repo().await;
        let vote = Vote::new("q", Category::Travel, day(2030, 1, 1));
        repo.create(&vote).await.unwrap();
        sqlx::query("UPDATE votes SET category = 'astrology' WHERE id = ?")
            .bind(vote.id.to_string())
            .execute(&repo.pool)
            .await
            .unwrap();

        let err = repo.get(vote.id).await.unwrap_err();
        assert!(matches!(err, DomainError::SerializationError(ref msg) if msg.contains("astrology")));
    }

    #[tokio::test]
    async fn test_unknown_closure_type_is_rejected() {
        let repo = setup_repo().await;
        let vote = Vote::new("q", Category::Travel, day(2030, 1, 1));
        repo.create(&vote).await.unwrap();
        sqlx::query("UPDATE votes SET closure_type = 'lottery' WHERE id = ?")
            .bind(vote.id.to_string())
            .execute(&repo.pool)
            .await
            .unwrap();

        let err = repo.list_by_status(VoteStatus::Open).await.unwrap_err();
        assert!(matches!(err, DomainError::SerializationError(_)));
    }
}
