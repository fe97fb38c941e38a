//! SQLite implementation of the ResponseRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::VoteResponse;
use crate::domain::ports::ResponseRepository;

#[derive(Clone)]
pub struct SqliteResponseRepository {
    pool: SqlitePool,
}

impl SqliteResponseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResponseRepository for SqliteResponseRepository {
    async fn record(&self, response: &VoteResponse) -> DomainResult<()> {
        let result = sqlx::query(
            "INSERT INTO vote_responses (id, vote_id, option_id, user_id, created_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(response.id.to_string())
        .bind(response.vote_id.to_string())
        .bind(response.option_id.to_string())
        .bind(&response.user_id)
        .bind(response.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DomainError::AlreadyResponded {
                    vote_id: response.vote_id,
                    user_id: response.user_id.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn count_by_vote(&self, vote_id: Uuid) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vote_responses WHERE vote_id = ?")
            .bind(vote_id.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn count_by_option(&self, vote_id: Uuid) -> DomainResult<HashMap<Uuid, u64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT option_id, COUNT(*) FROM vote_responses WHERE vote_id = ? GROUP BY option_id"
        )
        .bind(vote_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(option_id, count)| Ok((parse_uuid(&option_id)?, count as u64)))
            .collect()
    }

    async fn list_by_vote(&self, vote_id: Uuid) -> DomainResult<Vec<VoteResponse>> {
        let rows: Vec<ResponseRow> = sqlx::query_as(
            "SELECT * FROM vote_responses WHERE vote_id = ? ORDER BY created_at"
        )
        .bind(vote_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(VoteResponse {
                    id: parse_uuid(&row.id)?,
                    vote_id: parse_uuid(&row.vote_id)?,
                    option_id: parse_uuid(&row.option_id)?,
                    user_id: row.user_id,
                    created_at: parse_datetime(&row.created_at)?,
                })
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct ResponseRow {
    id: String,
    vote_id: String,
    option_id: String,
    user_id: String,
    created_at: String,
}
