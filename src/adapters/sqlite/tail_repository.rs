//! SQLite implementation of the TailRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::DomainResult;
use crate::domain::models::{Tail, TailResponse};
use crate::domain::ports::TailRepository;

#[derive(Clone)]
pub struct SqliteTailRepository {
    pool: SqlitePool,
}

impl SqliteTailRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TailRow {
    id: String,
    vote_id: String,
    question: String,
    created_at: String,
}

#[derive(sqlx::FromRow)]
struct TailResponseRow {
    id: String,
    tail_id: String,
    user_id: String,
    answer: String,
    created_at: String,
}

#[async_trait]
impl TailRepository for SqliteTailRepository {
    async fn create(&self, tail: &Tail) -> DomainResult<()> {
        sqlx::query("INSERT INTO tails (id, vote_id, question, created_at) VALUES (?, ?, ?, ?)")
            .bind(tail.id.to_string())
            .bind(tail.vote_id.to_string())
            .bind(&tail.question)
            .bind(tail.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_first_by_vote(&self, vote_id: Uuid) -> DomainResult<Option<Tail>> {
        let row: Option<TailRow> = sqlx::query_as(
            "SELECT * FROM tails WHERE vote_id = ? ORDER BY created_at LIMIT 1"
        )
        .bind(vote_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            Ok(Tail {
                id: parse_uuid(&r.id)?,
                vote_id: parse_uuid(&r.vote_id)?,
                question: r.question,
                created_at: parse_datetime(&r.created_at)?,
            })
        })
        .transpose()
    }

    async fn add_answer(&self, answer: &TailResponse) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO tail_responses (id, tail_id, user_id, answer, created_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(answer.id.to_string())
        .bind(answer.tail_id.to_string())
        .bind(&answer.user_id)
        .bind(&answer.answer)
        .bind(answer.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_answers(&self, tail_id: Uuid) -> DomainResult<Vec<TailResponse>> {
        let rows: Vec<TailResponseRow> = sqlx::query_as(
            "SELECT * FROM tail_responses WHERE tail_id = ? ORDER BY created_at"
        )
        .bind(tail_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(TailResponse {
                    id: parse_uuid(&r.id)?,
                    tail_id: parse_uuid(&r.tail_id)?,
                    user_id: r.user_id,
                    answer: r.answer,
                    created_at: parse_datetime(&r.created_at)?,
                })
            })
            .collect()
    }
}
