//! End-to-end closure and guide synthesis over SQLite.

mod common;

use common::{day, setup_test_logging, threshold_vote, Harness};
use pollwise::adapters::completion::{MockCompletionClient, MockReply};
use pollwise::{
    CancellationError, Category, ClosureReason, DomainError, GuideRepository, ResponseRepository,
    Vote, VoteStatus,
};
use std::time::Duration;

#[tokio::test]
async fn test_casts_close_vote_and_produce_guide() {
    setup_test_logging();
    let h = Harness::in_memory(MockCompletionClient::with_default_reply(MockReply::success(
        "<think>Jeju leads</think>\n제목: 제주 여행 가이드\n내용: 봄에 가면 유채꽃이 좋아요.",
    )))
    .await;
    let (vote, options) = h
        .seed(threshold_vote(Category::Travel, 3), &["Jeju", "Busan"], &["flowers", "ocean"])
        .await;

    let first = h.ballots.cast(vote.id, options[0].id, "alice").await.unwrap();
    let second = h.ballots.cast(vote.id, options[1].id, "bob").await.unwrap();
    assert!(!first.closed && !second.closed);
    assert_eq!(h.status_of(vote.id).await, VoteStatus::Open);

    let third = h.ballots.cast(vote.id, options[0].id, "carol").await.unwrap();
    assert!(third.closed);
    assert_eq!(h.status_of(vote.id).await, VoteStatus::Closed);

    let guides = h.guides.list_by_vote(vote.id).await.unwrap();
    assert_eq!(guides.len(), 1);
    assert_eq!(guides[0].title, "제주 여행 가이드");
    assert_eq!(guides[0].guide_type, Category::Travel);

    let prompt = &h.completion.prompts()[0];
    assert!(prompt.contains("- Jeju: 66.7% (2 votes)"));
    assert!(prompt.contains("- flowers"));

    let status = h.evaluator.status(vote.id).await.unwrap();
    assert_eq!(status.reason, ClosureReason::AlreadyClosed);
    assert_eq!(status.response_count, 3);

    let late = h.ballots.cast(vote.id, options[1].id, "dave").await.unwrap_err();
    assert!(matches!(late, DomainError::VoteClosed(_)));
}

#[tokio::test]
async fn test_sweep_closes_only_past_due_votes() {
    let h = Harness::in_memory(MockCompletionClient::new()).await;
    let (due, _) = h
        .seed(Vote::new("Lunch?", Category::Food, day(2024, 1, 1)), &["Bibimbap", "Ramen"], &["quick"])
        .await;
    let (current, _) = h
        .seed(Vote::new("Dinner?", Category::Food, day(2024, 1, 2)), &["Tacos"], &[])
        .await;

    let closed = h.evaluator.sweep_at(day(2024, 1, 2)).await.unwrap();

    assert_eq!(closed, 1);
    assert_eq!(h.status_of(due.id).await, VoteStatus::Closed);
    assert_eq!(h.status_of(current.id).await, VoteStatus::Open);
    assert_eq!(h.completion.call_count(), 1);
    assert_eq!(h.guides.list_by_vote(due.id).await.unwrap().len(), 1);

    assert_eq!(h.evaluator.sweep_at(day(2024, 1, 2)).await.unwrap(), 0);
    assert_eq!(h.completion.call_count(), 1);
}

#[tokio::test]
async fn test_closure_survives_shutdown() {
    let h = Harness::in_memory(MockCompletionClient::new()).await;
    let (vote, _) = h
        .seed(Vote::new("Hobby?", Category::Hobby, day(2024, 1, 1)), &["Climbing"], &["strong"])
        .await;

    h.registry.shutdown();
    let closed = h.evaluator.sweep_at(day(2024, 2, 1)).await.unwrap();

    assert_eq!(closed, 1);
    assert_eq!(h.status_of(vote.id).await, VoteStatus::Closed);
    assert_eq!(h.completion.call_count(), 0);
    assert!(h.guides.list_by_vote(vote.id).await.unwrap().is_empty());

    let err = h.pipeline.generate(vote.id, Category::Hobby).await.unwrap_err();
    assert!(matches!(err, DomainError::Cancelled(CancellationError::ShuttingDown)));
}

#[tokio::test]
async fn test_manual_regeneration_supersedes_slow_one() {
    let h = Harness::in_memory(MockCompletionClient::new()).await;
    h.completion
        .push_reply(MockReply::success("Title: first\nContent: slow").delayed(Duration::from_millis(300)));
    h.completion.push_reply(MockReply::success("Title: second\nContent: fast"));
    let (vote, _) = h
        .seed(Vote::new("Outfit?", Category::Fashion, day(2024, 1, 1)), &["Denim"], &["comfy"])
        .await;

    let slow = {
        let pipeline = h.pipeline.clone();
        let vote_id = vote.id;
        tokio::spawn(async move { pipeline.generate(vote_id, Category::Fashion).await })
    };
    while h.completion.call_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let fast = h.pipeline.generate(vote.id, Category::Fashion).await.unwrap();
    let slow = slow.await.unwrap();

    assert_eq!(fast.title, "second");
    assert!(matches!(slow, Err(DomainError::Cancelled(CancellationError::Superseded { .. }))));
    let stored = h.guides.list_by_vote(vote.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "second");

    // a different guide type for the same vote is not affected
    let other = h.pipeline.generate(vote.id, Category::General).await.unwrap();
    assert_eq!(other.guide_type, Category::General);
    assert_eq!(h.guides.list_by_vote(vote.id).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_casts_close_exactly_once() {
    let h = Harness::on_disk(MockCompletionClient::new()).await;
    let (vote, options) = h
        .seed(threshold_vote(Category::Lifestyle, 5), &["Morning", "Evening"], &["sleep"])
        .await;

    let tasks: Vec<_> = (0..12)
        .map(|i| {
            let ballots = h.ballots.clone();
            let option_id = options[i % 2].id;
            let vote_id = vote.id;
            tokio::spawn(async move { ballots.cast(vote_id, option_id, &format!("user-{i}")).await })
        })
        .collect();

    let mut recorded = 0;
    let mut closers = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(outcome) => {
                recorded += 1;
                if outcome.closed {
                    closers += 1;
                }
            }
            Err(DomainError::VoteClosed(_)) => {}
            Err(other) => panic!("unexpected cast error: {other}"),
        }
    }

    assert_eq!(closers, 1);
    assert!(recorded >= 5);
    assert_eq!(h.responses.count_by_vote(vote.id).await.unwrap(), recorded);
    assert_eq!(h.status_of(vote.id).await, VoteStatus::Closed);
    assert_eq!(h.completion.call_count(), 1);
    assert_eq!(h.guides.list_by_vote(vote.id).await.unwrap().len(), 1);
}
