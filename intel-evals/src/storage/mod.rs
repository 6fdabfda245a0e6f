//! Repository traits and implementations for evaluation data.
//!
//! - [`EvaluationRepository`] - overviews of finished runs and their per-example results
//! - [`AsyncEvaluationRepository`] - adds overviews of runs still in progress
//! - [`DatasetRepository`] - datasets and their examples
//!
//! Every listing is sorted by id so reports are reproducible regardless of
//! insertion order. Two backends share one contract: in-memory maps for
//! tests and notebooks-style use, and Turso (libSQL) for durable storage.

mod dataset;
mod error;
mod memory;
mod turso;

pub use dataset::InMemoryDatasetRepository;
pub use error::{Error, Result};
pub use memory::InMemoryEvaluationRepository;
pub use turso::TursoEvaluationRepository;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::dataset::{Dataset, Example};
use crate::domain::{EvaluationOverview, ExampleEvaluation, PartialEvaluationOverview};

/// Storage for evaluation overviews and per-example results.
///
/// An id is *known* once an overview (final or partial) or an example
/// evaluation has been stored under it. Listing results for a known id with
/// no results yields an empty vector; listing results for an unknown id is
/// [`Error::EvaluationNotFound`].
#[async_trait]
pub trait EvaluationRepository: Send + Sync {
    /// Insert or replace the overview with the same id.
    async fn store_evaluation_overview(&self, overview: EvaluationOverview) -> Result<()>;

    /// Get an overview by id.
    async fn evaluation_overview(&self, evaluation_id: &str) -> Result<Option<EvaluationOverview>>;

    /// Ids of all stored overviews, sorted.
    async fn evaluation_overview_ids(&self) -> Result<Vec<String>>;

    /// Append a result to its evaluation. Results are never deduplicated.
    async fn store_example_evaluation<E>(&self, evaluation: ExampleEvaluation<E>) -> Result<()>
    where
        E: Serialize + Send;

    /// All results of an evaluation, sorted by example id.
    ///
    /// Results sharing an example id keep their insertion order.
    async fn example_evaluations<E>(&self, evaluation_id: &str) -> Result<Vec<ExampleEvaluation<E>>>
    where
        E: DeserializeOwned + Send;

    /// First result for `example_id` within an evaluation.
    async fn example_evaluation<E>(
        &self,
        evaluation_id: &str,
        example_id: &str,
    ) -> Result<Option<ExampleEvaluation<E>>>
    where
        E: DeserializeOwned + Send,
    {
        let evaluations = self.example_evaluations::<E>(evaluation_id).await?;
        Ok(evaluations
            .into_iter()
            .find(|evaluation| evaluation.example_id == example_id))
    }

    /// All stored overviews, sorted by id.
    async fn evaluation_overviews(&self) -> Result<Vec<EvaluationOverview>> {
        let mut overviews = Vec::new();
        for id in self.evaluation_overview_ids().await? {
            if let Some(overview) = self.evaluation_overview(&id).await? {
                overviews.push(overview);
            }
        }
        Ok(overviews)
    }

    /// Results that carry an evaluation payload, sorted by example id.
    async fn successful_example_evaluations<E>(
        &self,
        evaluation_id: &str,
    ) -> Result<Vec<ExampleEvaluation<E>>>
    where
        E: DeserializeOwned + Send,
    {
        let evaluations = self.example_evaluations::<E>(evaluation_id).await?;
        Ok(evaluations
            .into_iter()
            .filter(|evaluation| !evaluation.result.is_failed())
            .collect())
    }

    /// Results recorded as failures, sorted by example id.
    async fn failed_example_evaluations<E>(
        &self,
        evaluation_id: &str,
    ) -> Result<Vec<ExampleEvaluation<E>>>
    where
        E: DeserializeOwned + Send,
    {
        let evaluations = self.example_evaluations::<E>(evaluation_id).await?;
        Ok(evaluations
            .into_iter()
            .filter(|evaluation| evaluation.result.is_failed())
            .collect())
    }
}

/// Evaluation storage that also tracks runs still in progress.
///
/// Partial overviews live in their own id space. Storing one makes its id
/// known for results, so results can arrive before the final overview.
/// Replacing a partial overview by a final one is the caller's job.
#[async_trait]
pub trait AsyncEvaluationRepository: EvaluationRepository {
    /// Insert or replace the partial overview with the same id.
    async fn store_partial_evaluation_overview(
        &self,
        overview: PartialEvaluationOverview,
    ) -> Result<()>;

    /// Get a partial overview by id.
    async fn partial_evaluation_overview(
        &self,
        evaluation_id: &str,
    ) -> Result<Option<PartialEvaluationOverview>>;

    /// Ids of all stored partial overviews, sorted.
    async fn partial_evaluation_overview_ids(&self) -> Result<Vec<String>>;

    /// All stored partial overviews, sorted by id.
    async fn partial_evaluation_overviews(&self) -> Result<Vec<PartialEvaluationOverview>> {
        let mut overviews = Vec::new();
        for id in self.partial_evaluation_overview_ids().await? {
            if let Some(overview) = self.partial_evaluation_overview(&id).await? {
                overviews.push(overview);
            }
        }
        Ok(overviews)
    }
}

/// Storage for datasets and the examples that belong to them.
#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Store `examples` under a new dataset called `name`.
    async fn create_dataset<I, O>(&self, examples: Vec<Example<I, O>>, name: &str) -> Result<Dataset>
    where
        I: Serialize + Send,
        O: Serialize + Send;

    /// Get a dataset by id.
    async fn dataset(&self, dataset_id: &str) -> Result<Option<Dataset>>;

    /// Ids of all datasets, sorted.
    async fn dataset_ids(&self) -> Result<Vec<String>>;

    /// Remove a dataset and its examples. Unknown ids are ignored.
    async fn delete_dataset(&self, dataset_id: &str) -> Result<()>;

    /// Examples of a dataset, sorted by example id.
    async fn examples<I, O>(&self, dataset_id: &str) -> Result<Vec<Example<I, O>>>
    where
        I: DeserializeOwned + Send,
        O: DeserializeOwned + Send;

    /// A single example of a dataset.
    async fn example<I, O>(&self, dataset_id: &str, example_id: &str) -> Result<Option<Example<I, O>>>
    where
        I: DeserializeOwned + Send,
        O: DeserializeOwned + Send,
    {
        let examples = self.examples::<I, O>(dataset_id).await?;
        Ok(examples.into_iter().find(|example| example.id() == example_id))
    }
}
