//! Both evaluation backends must agree on ordering and lookup semantics.

use std::sync::Arc;

use intel_evals::storage::Error;
use intel_evals::{
    AsyncEvaluationRepository, EvaluationOverview, ExampleEvaluation,
    InMemoryEvaluationRepository, PartialEvaluationOverview, TursoEvaluationRepository,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Verdict {
    correct: bool,
}

/// Run one scenario against every backend.
macro_rules! for_each_backend {
    ($scenario:ident) => {
        $scenario(InMemoryEvaluationRepository::new()).await;
        $scenario(TursoEvaluationRepository::new_memory().await.unwrap()).await;
    };
}

async fn results_sorted_by_example_id<R: AsyncEvaluationRepository>(repo: R) {
    let overview = EvaluationOverview::new("nightly").with_id("E1");
    repo.store_evaluation_overview(overview.clone()).await.unwrap();
    for (example_id, correct) in [("x2", true), ("x1", false)] {
        repo.store_example_evaluation(ExampleEvaluation::new("E1", example_id, Verdict { correct }))
            .await
            .unwrap();
    }

    let results = repo.example_evaluations::<Verdict>("E1").await.unwrap();
    let ids: Vec<_> = results.iter().map(|e| e.example_id.as_str()).collect();
    assert_eq!(ids, vec!["x1", "x2"]);

    assert_eq!(repo.evaluation_overview("E1").await.unwrap(), Some(overview));
    assert!(repo.evaluation_overview("E2").await.unwrap().is_none());
    assert!(matches!(
        repo.example_evaluations::<Verdict>("E2").await,
        Err(Error::EvaluationNotFound(id)) if id == "E2"
    ));
}

async fn overview_ids_sorted<R: AsyncEvaluationRepository>(repo: R) {
    for id in ["c", "a", "b"] {
        repo.store_evaluation_overview(EvaluationOverview::new("run").with_id(id))
            .await
            .unwrap();
    }

    assert_eq!(repo.evaluation_overview_ids().await.unwrap(), vec!["a", "b", "c"]);
    let listed: Vec<_> = repo
        .evaluation_overviews()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(listed, vec!["a", "b", "c"]);
}

async fn partial_run_then_finalize<R: AsyncEvaluationRepository>(repo: R) {
    let partial = PartialEvaluationOverview::new("streaming").with_id("run-1");
    repo.store_partial_evaluation_overview(partial.clone())
        .await
        .unwrap();
    repo.store_example_evaluation(ExampleEvaluation::new("run-1", "a", Verdict { correct: true }))
        .await
        .unwrap();
    repo.store_example_evaluation(ExampleEvaluation::<Verdict>::failed("run-1", "b", "timeout"))
        .await
        .unwrap();

    let successful = repo
        .successful_example_evaluations::<Verdict>("run-1")
        .await
        .unwrap();
    let failed = repo.failed_example_evaluations::<Verdict>("run-1").await.unwrap();
    repo.store_evaluation_overview(partial.finalize(successful.len() as u64, failed.len() as u64))
        .await
        .unwrap();

    let overview = repo.evaluation_overview("run-1").await.unwrap().unwrap();
    assert_eq!(overview.successful_evaluation_count, 1);
    assert_eq!(overview.failed_evaluation_count, 1);
    assert_eq!(overview.start_date, partial.start_date);
    assert_eq!(repo.partial_evaluation_overview_ids().await.unwrap(), vec!["run-1"]);
}

async fn concurrent_appends_all_kept<R: AsyncEvaluationRepository + 'static>(repo: R) {
    const WRITERS: usize = 64;
    let repo = Arc::new(repo);
    repo.store_evaluation_overview(EvaluationOverview::new("parallel").with_id("E1"))
        .await
        .unwrap();

    let mut handles = Vec::with_capacity(WRITERS);
    for i in (0..WRITERS).rev() {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            let evaluation = ExampleEvaluation::new("E1", format!("ex-{i:03}"), Verdict {
                correct: i % 2 == 0,
            });
            repo.store_example_evaluation(evaluation).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let results = repo.example_evaluations::<Verdict>("E1").await.unwrap();
    let ids: Vec<String> = results.into_iter().map(|e| e.example_id).collect();
    let expected: Vec<String> = (0..WRITERS).map(|i| format!("ex-{i:03}")).collect();
    assert_eq!(ids, expected);
}

async fn mismatched_payload_type_is_serialization_error<R: AsyncEvaluationRepository>(repo: R) {
    repo.store_example_evaluation(ExampleEvaluation::new("E1", "a", Verdict { correct: true }))
        .await
        .unwrap();

    assert!(matches!(
        repo.example_evaluations::<u32>("E1").await,
        Err(Error::Serialization(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_with_distinct_examples_are_all_kept_in_order() {
    for_each_backend!(concurrent_appends_all_kept);
}

#[tokio::test]
async fn reading_results_as_the_wrong_type_fails_the_same_way() {
    for_each_backend!(mismatched_payload_type_is_serialization_error);
}

#[tokio::test]
async fn results_for_one_overview_are_sorted_by_example_id() {
    for_each_backend!(results_sorted_by_example_id);
}

#[tokio::test]
async fn overview_ids_are_sorted_regardless_of_insertion_order() {
    for_each_backend!(overview_ids_sorted);
}

#[tokio::test]
async fn partial_run_collects_results_before_finalizing() {
    for_each_backend!(partial_run_then_finalize);
}
