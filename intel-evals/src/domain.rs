//! Evaluation run records and per-example results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::new_id;

/// Summary of a finished evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOverview {
    pub id: String,
    /// Runs whose outputs were evaluated.
    #[serde(default)]
    pub run_ids: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub successful_evaluation_count: u64,
    pub failed_evaluation_count: u64,
    #[serde(default)]
    pub description: String,
}

impl EvaluationOverview {
    /// Create an overview with a generated id, started and ended now.
    pub fn new(description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            run_ids: Vec::new(),
            start_date: now,
            end_date: now,
            successful_evaluation_count: 0,
            failed_evaluation_count: 0,
            description: description.into(),
        }
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Total number of evaluated examples.
    pub fn evaluation_count(&self) -> u64 {
        self.successful_evaluation_count + self.failed_evaluation_count
    }
}

/// Summary of an evaluation run that is still collecting results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialEvaluationOverview {
    pub id: String,
    #[serde(default)]
    pub run_ids: Vec<String>,
    pub start_date: DateTime<Utc>,
    /// Examples handed out for evaluation so far.
    pub submitted_evaluation_count: u64,
    #[serde(default)]
    pub description: String,
}

impl PartialEvaluationOverview {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            run_ids: Vec::new(),
            start_date: Utc::now(),
            submitted_evaluation_count: 0,
            description: description.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Final overview for this run, ending now.
    pub fn finalize(&self, successful: u64, failed: u64) -> EvaluationOverview {
        EvaluationOverview {
            id: self.id.clone(),
            run_ids: self.run_ids.clone(),
            start_date: self.start_date,
            end_date: Utc::now(),
            successful_evaluation_count: successful,
            failed_evaluation_count: failed,
            description: self.description.clone(),
        }
    }
}

/// Recorded when evaluating an example raised an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedExampleEvaluation {
    pub error_message: String,
}

/// Either the evaluation payload or the reason it could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleResult<E> {
    Evaluation(E),
    Failed(FailedExampleEvaluation),
}

impl<E> ExampleResult<E> {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExampleResult::Failed(_))
    }

    pub fn evaluation(&self) -> Option<&E> {
        match self {
            ExampleResult::Evaluation(evaluation) => Some(evaluation),
            ExampleResult::Failed(_) => None,
        }
    }
}

/// Result of evaluating one example within an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleEvaluation<E> {
    /// Id of the overview this result belongs to.
    pub evaluation_id: String,
    pub example_id: String,
    pub result: ExampleResult<E>,
}

impl<E> ExampleEvaluation<E> {
    pub fn new(evaluation_id: impl Into<String>, example_id: impl Into<String>, evaluation: E) -> Self {
        Self {
            evaluation_id: evaluation_id.into(),
            example_id: example_id.into(),
            result: ExampleResult::Evaluation(evaluation),
        }
    }

    pub fn failed(
        evaluation_id: impl Into<String>,
        example_id: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            evaluation_id: evaluation_id.into(),
            example_id: example_id.into(),
            result: ExampleResult::Failed(FailedExampleEvaluation {
                error_message: error_message.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_serializes_with_variant_name() {
        let ok = ExampleEvaluation::new("eval-1", "a", 0.5f64);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["result"]["evaluation"], 0.5);

        let failed: ExampleEvaluation<f64> = ExampleEvaluation::failed("eval-1", "b", "timeout");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["result"]["failed"]["error_message"], "timeout");
    }

    #[test]
    fn result_accessors() {
        let ok = ExampleEvaluation::new("e", "a", 3u32);
        assert!(!ok.result.is_failed());
        assert_eq!(ok.result.evaluation(), Some(&3));

        let failed: ExampleEvaluation<u32> = ExampleEvaluation::failed("e", "a", "boom");
        assert!(failed.result.is_failed());
        assert!(failed.result.evaluation().is_none());
    }

    #[test]
    fn finalize_keeps_identity_of_partial_run() {
        let partial = PartialEvaluationOverview::new("nightly").with_id("eval-7");

        let overview = partial.finalize(8, 2);

        assert_eq!(overview.id, "eval-7");
        assert_eq!(overview.start_date, partial.start_date);
        assert_eq!(overview.evaluation_count(), 10);
        assert_eq!(overview.description, "nightly");
    }

    #[test]
    fn overview_round_trips_through_json() {
        let overview = EvaluationOverview::new("baseline").with_id("eval-1");
        let json = serde_json::to_string(&overview).unwrap();
        let parsed: EvaluationOverview = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, overview);
    }
}
