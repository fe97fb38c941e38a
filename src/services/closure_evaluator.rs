//! Vote closure: the batch sweep, the real-time threshold check, and the
//! read-only status descriptor.
//!
//! A vote closes when its finish date lies strictly in the past or when its
//! response count reaches its participant threshold. The transition itself
//! goes through [`VoteRepository::save_closed`], an optimistic compare-and-set,
//! so concurrent closers agree on exactly one winner and only the winner
//! dispatches guide generation.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ClosureType, Vote, VoteStatus};
use crate::domain::ports::{ResponseRepository, VoteRepository};
use crate::services::guide_pipeline::GuidePipeline;

/// Why a vote is, or would be, closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ClosureReason {
    AlreadyClosed,
    DatePassed,
    ThresholdReached { count: u64, threshold: u32 },
    StillOpen,
}

impl ClosureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyClosed => "already_closed",
            Self::DatePassed => "date_passed",
            Self::ThresholdReached { .. } => "threshold_reached",
            Self::StillOpen => "still_open",
        }
    }
}

/// Diagnostic snapshot returned by [`ClosureEvaluator::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosureStatus {
    pub vote_id: Uuid,
    pub status: VoteStatus,
    pub closure_type: ClosureType,
    pub finished_at: NaiveDate,
    pub participant_threshold: Option<u32>,
    pub response_count: u64,
    pub evaluated_on: NaiveDate,
    #[serde(flatten)]
    pub reason: ClosureReason,
}

pub struct ClosureEvaluator {
    votes: Arc<dyn VoteRepository>,
    responses: Arc<dyn ResponseRepository>,
    pipeline: Arc<GuidePipeline>,
    detach_generation: bool,
}

impl ClosureEvaluator {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        responses: Arc<dyn ResponseRepository>,
        pipeline: Arc<GuidePipeline>,
    ) -> Self {
        Self {
            votes,
            responses,
            pipeline,
            detach_generation: false,
        }
    }

    /// Spawn guide generation on its own task instead of awaiting it.
    pub fn with_detached_generation(mut self, detach: bool) -> Self {
        self.detach_generation = detach;
        self
    }

    /// Close every open vote that satisfies either predicate as of today (UTC).
    pub async fn sweep(&self) -> DomainResult<usize> {
        self.sweep_at(Utc::now().date_naive()).await
    }

    /// Close every open vote that satisfies either predicate as of `today`.
    ///
    /// The threshold predicate scans all open votes and counts responses one
    /// vote at a time, which is fine at current volume but wants an indexed
    /// query once open votes number in the thousands.
    pub async fn sweep_at(&self, today: NaiveDate) -> DomainResult<usize> {
        let by_date = self
            .votes
            .list_by_status_finished_before(VoteStatus::Open, today)
            .await?;

        let mut by_threshold = Vec::new();
        for vote in self.votes.list_by_status(VoteStatus::Open).await? {
            if vote.participant_threshold.is_none() {
                continue;
            }
            let count = self.responses.count_by_vote(vote.id).await?;
            if vote.threshold_reached(count) {
                by_threshold.push(vote);
            }
        }

        let mut seen = HashSet::new();
        let candidates: Vec<Vote> = by_date
            .into_iter()
            .chain(by_threshold)
            .filter(|vote| seen.insert(vote.id))
            .collect();

        let mut closed = 0;
        let mut failed = 0;
        for vote in &candidates {
            match self.close_vote(vote).await {
                Ok(true) => closed += 1,
                Ok(false) => {}
                Err(e) => {
                    failed += 1;
                    tracing::warn!(vote_id = %vote.id, error = %e, "failed to close vote during sweep");
                }
            }
        }

        tracing::info!(
            %today,
            candidates = candidates.len(),
            closed,
            failed,
            "closure sweep finished"
        );
        Ok(closed)
    }

    /// Real-time threshold check, run right after a response is recorded.
    ///
    /// Returns `true` only for the caller whose transition won. Callers that
    /// find the vote already closed, or lose the race to close it, get `false`.
    #[tracing::instrument(skip(self), fields(vote_id = %vote_id))]
    pub async fn check_single(&self, vote_id: Uuid) -> DomainResult<bool> {
        let vote = self
            .votes
            .get(vote_id)
            .await?
            .ok_or(DomainError::VoteNotFound(vote_id))?;

        if !vote.is_open() || vote.participant_threshold.is_none() {
            return Ok(false);
        }

        let count = self.responses.count_by_vote(vote_id).await?;
        if !vote.threshold_reached(count) {
            return Ok(false);
        }

        self.close_vote(&vote).await
    }

    /// Transition `vote` to closed and dispatch guide generation.
    ///
    /// Returns `Ok(false)` when the vote is not open or another writer closed
    /// it first. Generation failures never surface here.
    pub async fn close_vote(&self, vote: &Vote) -> DomainResult<bool> {
        if !vote.is_open() {
            return Ok(false);
        }

        let mut closing = vote.clone();
        closing.close().map_err(DomainError::ValidationFailed)?;

        match self.votes.save_closed(&closing).await {
            Ok(()) => {}
            Err(DomainError::ConcurrencyConflict { .. }) => {
                tracing::debug!(vote_id = %vote.id, "vote already closed by a concurrent caller");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            vote_id = %closing.id,
            closure_type = closing.closure_type.as_str(),
            "vote closed"
        );
        self.dispatch_generation(&closing).await;
        Ok(true)
    }

    async fn dispatch_generation(&self, vote: &Vote) {
        let (vote_id, guide_type) = (vote.id, vote.category);

        if self.detach_generation {
            let pipeline = Arc::clone(&self.pipeline);
            tokio::spawn(async move {
                log_generation_outcome(vote_id, pipeline.generate(vote_id, guide_type).await);
            });
        } else {
            log_generation_outcome(vote_id, self.pipeline.generate(vote_id, guide_type).await);
        }
    }

    /// Report why a vote is or would be closed, as of today (UTC).
    pub async fn status(&self, vote_id: Uuid) -> DomainResult<ClosureStatus> {
        self.status_at(vote_id, Utc::now().date_naive()).await
    }

    pub async fn status_at(&self, vote_id: Uuid, today: NaiveDate) -> DomainResult<ClosureStatus> {
        let vote = self
            .votes
            .get(vote_id)
            .await?
            .ok_or(DomainError::VoteNotFound(vote_id))?;
        let response_count = self.responses.count_by_vote(vote_id).await?;

        let reason = match vote.participant_threshold {
            _ if !vote.is_open() => ClosureReason::AlreadyClosed,
            _ if vote.date_passed(today) => ClosureReason::DatePassed,
            Some(threshold) if vote.threshold_reached(response_count) => {
                ClosureReason::ThresholdReached {
                    count: response_count,
                    threshold,
                }
            }
            _ => ClosureReason::StillOpen,
        };

        Ok(ClosureStatus {
            vote_id,
            status: vote.status,
            closure_type: vote.closure_type,
            finished_at: vote.finished_at,
            participant_threshold: vote.participant_threshold,
            response_count,
            evaluated_on: today,
            reason,
        })
    }
}

fn log_generation_outcome<T>(vote_id: Uuid, result: DomainResult<T>) {
    match result {
        Ok(_) => {}
        Err(DomainError::Cancelled(reason)) => {
            tracing::info!(%vote_id, %reason, "post-closure generation superseded");
        }
        Err(e) => {
            tracing::warn!(%vote_id, error = %e, "guide generation after closure failed; vote stays closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::completion::{MockCompletionClient, MockReply};
    use crate::domain::models::Category;
    use crate::domain::ports::GuideRepository;
    use crate::services::test_support::{day, Fixture};

    fn evaluator(fx: &Fixture) -> ClosureEvaluator {
        ClosureEvaluator::new(fx.votes.clone(), fx.responses.clone(), fx.pipeline())
    }

    async fn stored_status(fx: &Fixture, vote_id: Uuid) -> VoteStatus {
        fx.votes.get(vote_id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_sweep_closes_past_due_vote() {
        let fx = Fixture::new().await;
        let (due, _) = fx.seed_open_vote(Category::Travel, day(2024, 1, 1)).await;
        fx.add_tail(due.id, &["sunsets"]).await;
        let (today, _) = fx.seed_open_vote(Category::Food, day(2024, 1, 2)).await;

        let closed = evaluator(&fx).sweep_at(day(2024, 1, 2)).await.unwrap();

        assert_eq!(closed, 1);
        assert_eq!(stored_status(&fx, due.id).await, VoteStatus::Closed);
        assert_eq!(stored_status(&fx, today.id).await, VoteStatus::Open);
        assert_eq!(fx.completion.call_count(), 1);
        assert_eq!(fx.guides.list_by_vote(due.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_counts_vote_matching_both_predicates_once() {
        let fx = Fixture::new().await;
        let (vote, options) = fx
            .seed_vote(
                Vote::new("both", Category::General, day(2024, 1, 1)).with_participant_threshold(1),
                &["A"],
            )
            .await;
        fx.add_tail(vote.id, &[]).await;
        fx.respond(vote.id, options[0].id, "u1").await;

        let closed = evaluator(&fx).sweep_at(day(2024, 3, 1)).await.unwrap();

        assert_eq!(closed, 1);
        assert_eq!(fx.completion.call_count(), 1);
    }

    #[tokio::test]
    async fn test_sweep_closes_by_threshold_before_finish_date() {
        let fx = Fixture::new().await;
        let (vote, options) = fx
            .seed_vote(
                Vote::new("soon", Category::Hobby, day(2030, 1, 1)).with_participant_threshold(2),
                &["A", "B"],
            )
            .await;
        fx.respond(vote.id, options[0].id, "u1").await;
        fx.respond(vote.id, options[1].id, "u2").await;

        let closed = evaluator(&fx).sweep_at(day(2024, 1, 1)).await.unwrap();

        assert_eq!(closed, 1);
        assert_eq!(stored_status(&fx, vote.id).await, VoteStatus::Closed);
    }

    #[tokio::test]
    async fn test_generation_failure_does_not_reopen_or_abort_sweep() {
        let fx = Fixture::with_completion(MockCompletionClient::with_default_reply(MockReply::failure(
            "overloaded",
        )))
        .await;
        let (first, _) = fx.seed_open_vote(Category::Travel, day(2024, 1, 1)).await;
        let (second, _) = fx.seed_open_vote(Category::Travel, day(2024, 1, 1)).await;
        fx.add_tail(first.id, &["x"]).await;
        // second has no tail, so its generation fails before the AI call

        let closed = evaluator(&fx).sweep_at(day(2024, 1, 5)).await.unwrap();

        assert_eq!(closed, 2);
        assert_eq!(stored_status(&fx, first.id).await, VoteStatus::Closed);
        assert_eq!(stored_status(&fx, second.id).await, VoteStatus::Closed);
        assert!(fx.guides.list_by_vote(first.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_single_closes_on_fifth_response() {
        let fx = Fixture::new().await;
        let (vote, options) = fx
            .seed_vote(
                Vote::new("five", Category::Lifestyle, day(2030, 1, 1)).with_participant_threshold(5),
                &["A", "B"],
            )
            .await;
        fx.add_tail(vote.id, &["routine"]).await;
        let evaluator = evaluator(&fx);

        for user in ["u1", "u2", "u3", "u4"] {
            fx.respond(vote.id, options[0].id, user).await;
        }
        assert!(!evaluator.check_single(vote.id).await.unwrap());
        assert_eq!(stored_status(&fx, vote.id).await, VoteStatus::Open);

        fx.respond(vote.id, options[1].id, "u5").await;
        assert!(evaluator.check_single(vote.id).await.unwrap());
        assert_eq!(stored_status(&fx, vote.id).await, VoteStatus::Closed);

        assert!(!evaluator.check_single(vote.id).await.unwrap());
        assert_eq!(fx.completion.call_count(), 1);
    }

    #[tokio::test]
    async fn test_check_single_ignores_finish_date() {
        let fx = Fixture::new().await;
        let (vote, _) = fx.seed_open_vote(Category::General, day(2000, 1, 1)).await;

        assert!(!evaluator(&fx).check_single(vote.id).await.unwrap());
        assert_eq!(stored_status(&fx, vote.id).await, VoteStatus::Open);
    }

    #[tokio::test]
    async fn test_check_single_unknown_vote() {
        let fx = Fixture::new().await;
        let err = evaluator(&fx).check_single(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::VoteNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_checks_close_exactly_once() {
        let fx = Fixture::new().await;
        let (vote, options) = fx
            .seed_vote(
                Vote::new("race", Category::Fashion, day(2030, 1, 1)).with_participant_threshold(3),
                &["A"],
            )
            .await;
        fx.add_tail(vote.id, &["colour"]).await;
        for user in ["u1", "u2", "u3"] {
            fx.respond(vote.id, options[0].id, user).await;
        }
        let evaluator = evaluator(&fx);

        let results =
            futures::future::join_all((0..8).map(|_| evaluator.check_single(vote.id))).await;

        let winners = results.into_iter().filter(|r| matches!(r, Ok(true))).count();
        assert_eq!(winners, 1);
        assert_eq!(fx.completion.call_count(), 1);
        assert_eq!(fx.guides.list_by_vote(vote.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_close_vote_is_idempotent() {
        let fx = Fixture::new().await;
        let (vote, _) = fx.seed_open_vote(Category::General, day(2024, 1, 1)).await;
        let evaluator = evaluator(&fx);

        assert!(evaluator.close_vote(&vote).await.unwrap());
        // stale snapshot still says open; the stored row decides
        assert!(!evaluator.close_vote(&vote).await.unwrap());

        let closed = fx.votes.get(vote.id).await.unwrap().unwrap();
        assert!(!evaluator.close_vote(&closed).await.unwrap());
        assert_eq!(closed.version, vote.version + 1);
        assert!(closed.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_detached_generation_still_runs() {
        let fx = Fixture::new().await;
        let (vote, _) = fx.seed_open_vote(Category::Food, day(2024, 1, 1)).await;
        fx.add_tail(vote.id, &["kimchi"]).await;
        let evaluator = evaluator(&fx).with_detached_generation(true);

        assert!(evaluator.close_vote(&vote).await.unwrap());

        for _ in 0..100 {
            if !fx.guides.list_by_vote(vote.id).await.unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(fx.guides.list_by_vote(vote.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_status_reasons() {
        let fx = Fixture::new().await;
        let evaluator = evaluator(&fx);
        let today = day(2024, 6, 1);

        let (open, _) = fx.seed_open_vote(Category::General, day(2024, 6, 1)).await;
        let status = evaluator.status_at(open.id, today).await.unwrap();
        assert_eq!(status.reason, ClosureReason::StillOpen);

        let (due, _) = fx.seed_open_vote(Category::General, day(2024, 5, 31)).await;
        let status = evaluator.status_at(due.id, today).await.unwrap();
        assert_eq!(status.reason, ClosureReason::DatePassed);
        assert_eq!(status.status, VoteStatus::Open);

        let (full, options) = fx
            .seed_vote(
                Vote::new("full", Category::General, day(2030, 1, 1)).with_participant_threshold(1),
                &["A"],
            )
            .await;
        fx.respond(full.id, options[0].id, "u1").await;
        let status = evaluator.status_at(full.id, today).await.unwrap();
        assert_eq!(status.reason, ClosureReason::ThresholdReached { count: 1, threshold: 1 });
        assert_eq!(status.response_count, 1);

        evaluator.close_vote(&due).await.unwrap();
        let status = evaluator.status_at(due.id, today).await.unwrap();
        assert_eq!(status.reason, ClosureReason::AlreadyClosed);
        assert_eq!(status.reason.as_str(), "already_closed");
    }

    #[test]
    fn test_status_serializes_flat_reason() {
        let status = ClosureStatus {
            vote_id: Uuid::nil(),
            status: VoteStatus::Open,
            closure_type: ClosureType::Participant,
            finished_at: day(2024, 1, 1),
            participant_threshold: Some(5),
            response_count: 5,
            evaluated_on: day(2024, 1, 1),
            reason: ClosureReason::ThresholdReached { count: 5, threshold: 5 },
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["reason"], "threshold_reached");
        assert_eq!(json["threshold"], 5);
        assert_eq!(json["response_count"], 5);
    }
}
