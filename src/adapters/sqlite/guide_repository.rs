//! SQLite implementation of the GuideRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_category, parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Guide;
use crate::domain::ports::GuideRepository;

#[derive(Clone)]
pub struct SqliteGuideRepository {
    pool: SqlitePool,
}

impl SqliteGuideRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct GuideRow {
    id: String,
    vote_id: String,
    title: String,
    content: String,
    category: String,
    guide_type: String,
    like_count: i64,
    revote_count: i64,
    created_at: String,
}

impl TryFrom<GuideRow> for Guide {
    type Error = DomainError;

    fn try_from(row: GuideRow) -> Result<Self, Self::Error> {
        Ok(Guide {
            id: parse_uuid(&row.id)?,
            vote_id: parse_uuid(&row.vote_id)?,
            title: row.title,
            content: row.content,
            category: parse_category(&row.category)?,
            guide_type: parse_category(&row.guide_type)?,
            like_count: row.like_count as u64,
            revote_count: row.revote_count as u64,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[async_trait]
impl GuideRepository for SqliteGuideRepository {
    async fn save(&self, guide: &Guide) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO guides (id, vote_id, title, content, category, guide_type,
               like_count, revote_count, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(guide.id.to_string())
        .bind(guide.vote_id.to_string())
        .bind(&guide.title)
        .bind(&guide.content)
        .bind(guide.category.as_str())
        .bind(guide.guide_type.as_str())
        .bind(guide.like_count as i64)
        .bind(guide.revote_count as i64)
        .bind(guide.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Guide>> {
        let row: Option<GuideRow> = sqlx::query_as("SELECT * FROM guides WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Guide::try_from).transpose()
    }

    async fn list_by_vote(&self, vote_id: Uuid) -> DomainResult<Vec<Guide>> {
        let rows: Vec<GuideRow> = sqlx::query_as(
            "SELECT * FROM guides WHERE vote_id = ? ORDER BY created_at DESC"
        )
        .bind(vote_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Guide::try_from).collect()
    }
}
