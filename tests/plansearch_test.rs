// Integration tests for plan search

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use common::{last_user, reply, FakeService};
use ponder::strategies::{
    plansearch, plansearch_single, ObservationOrigin, PlanSearch, PlanSearchConfig,
};
use ponder::TokenUsage;

/// Answers each stage by recognising its prompt
fn staged_service() -> Arc<FakeService> {
    FakeService::new(|request| {
        let prompt = last_user(request);
        if prompt.contains("key observations.") {
            Ok(reply(&["obs one\n\nobs two\n  \nobs three"], 10, 1))
        } else if prompt.contains("new observations derived") {
            Ok(reply(&["derived one\nderived two"], 20, 2))
        } else if prompt.contains("QUOTING IS CRUCIAL") {
            Ok(reply(&["  Insight 1 says... so step one.  "], 30, 3))
        } else if prompt.contains("Please implement the solution.") {
            Ok(reply(&["fn solve() {}\n"], 40, 4))
        } else {
            Err(anyhow::anyhow!("unexpected prompt: {}", prompt))
        }
    })
}

#[tokio::test]
async fn test_single_run_makes_four_calls() -> Result<()> {
    let service = staged_service();

    let artifact = plansearch_single("sys", "Sort a list", service.clone(), "m", 3, 2).await?;
    assert_eq!(artifact.solution, "Insight 1 says... so step one.");
    assert_eq!(artifact.implementation, "fn solve() {}");
    assert_eq!(service.call_count(), 4);

    for request in service.requests() {
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, "sys");
        assert_eq!(request.max_tokens, Some(4096));
        assert_eq!(request.n, 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_stage_prompts_carry_observations() -> Result<()> {
    let service = staged_service();

    plansearch_single("sys", "Sort a list", service.clone(), "m", 3, 2).await?;
    let requests = service.requests();

    let first = last_user(&requests[0]);
    assert!(first.contains("Here is the problem:\nSort a list"));
    assert!(first.contains("Please provide 3 key observations."));

    let second = last_user(&requests[1]);
    assert!(second.contains("1. obs one\n2. obs two\n3. obs three"));
    assert!(second.contains("Please provide 2 new observations"));

    let third = last_user(&requests[2]);
    assert!(third.contains("Insight 1: obs one"));
    assert!(third.contains("Insight 4: derived one"));
    assert!(third.contains("Insight 5: derived two"));

    let fourth = last_user(&requests[3]);
    assert!(fourth.contains("Solution Approach:\nInsight 1 says... so step one."));
    Ok(())
}

#[tokio::test]
async fn test_run_records_observation_origins() -> Result<()> {
    let planner = PlanSearch::new(staged_service(), "m", "sys", PlanSearchConfig::default());

    let run = planner.solve("problem").await?;
    assert_eq!(run.observations.len(), 5);
    assert_eq!(run.observations.initial(), vec!["obs one", "obs two", "obs three"]);
    assert_eq!(run.observations.derived(), vec!["derived one", "derived two"]);
    assert!(run
        .observations
        .iter()
        .take(3)
        .all(|o| o.origin == ObservationOrigin::Initial));
    assert_eq!(run.usage, TokenUsage::new(100, 10));
    Ok(())
}

#[tokio::test]
async fn test_multiple_runs_sum_usage() -> Result<()> {
    let service = staged_service();

    let (implementations, usage) = plansearch("sys", "p", service.clone(), "m", 3, 3, 2).await?;
    assert_eq!(implementations, vec!["fn solve() {}"; 3]);
    assert_eq!(usage, TokenUsage::new(300, 30));
    assert_eq!(service.call_count(), 12);
    Ok(())
}

#[tokio::test]
async fn test_runs_are_independent() -> Result<()> {
    let planner = PlanSearch::new(staged_service(), "m", "sys", PlanSearchConfig::default());

    let mut runs = planner.solve_runs("p", 2).await?;
    runs[0]
        .observations
        .extend(ObservationOrigin::Derived, ["extra".to_string()]);
    assert_eq!(runs[0].observations.len(), 6);
    assert_eq!(runs[1].observations.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_runs_match_sequential() -> Result<()> {
    let sequential = PlanSearch::new(staged_service(), "m", "sys", PlanSearchConfig::default())
        .solve_multiple("p", 4)
        .await?;

    let concurrent_config = PlanSearchConfig {
        concurrent_runs: true,
        ..PlanSearchConfig::default()
    };
    let service = staged_service();
    let concurrent = PlanSearch::new(service.clone(), "m", "sys", concurrent_config)
        .solve_multiple("p", 4)
        .await?;

    assert_eq!(concurrent, sequential);
    assert_eq!(service.call_count(), 16);
    Ok(())
}

#[tokio::test]
async fn test_under_generation_proceeds() -> Result<()> {
    let service = FakeService::scripted(vec![
        reply(&["only one"], 1, 1),
        reply(&[""], 1, 1),
        reply(&["solution"], 1, 1),
        reply(&["impl"], 1, 1),
    ]);
    let planner = PlanSearch::new(
        service.clone(),
        "m",
        "sys",
        PlanSearchConfig {
            initial_observations: 5,
            derived_observations: 3,
            ..PlanSearchConfig::default()
        },
    );

    let run = planner.solve("p").await?;
    assert_eq!(run.observations.texts(), vec!["only one"]);
    assert!(last_user(&service.requests()[2]).contains("Insight 1: only one"));
    assert_eq!(run.artifact.implementation, "impl");
    Ok(())
}

#[tokio::test]
async fn test_stage_failure_aborts_run() {
    let calls = AtomicUsize::new(0);
    let service = FakeService::new(move |_| {
        if calls.fetch_add(1, Ordering::SeqCst) == 2 {
            Err(anyhow::anyhow!("rate limited"))
        } else {
            Ok(reply(&["text"], 1, 1))
        }
    });

    let result = plansearch("sys", "p", service.clone(), "m", 2, 3, 2).await;
    assert!(result.is_err());
    assert_eq!(service.call_count(), 3, "no stage runs after the failure");
}
