//! In-memory evaluation repository.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{AsyncEvaluationRepository, Error, EvaluationRepository, Result};
use crate::domain::{EvaluationOverview, ExampleEvaluation, PartialEvaluationOverview};

#[derive(Default)]
struct State {
    overviews: HashMap<String, EvaluationOverview>,
    partial_overviews: HashMap<String, PartialEvaluationOverview>,
    /// Results per evaluation id in arrival order. A key exists for every known id.
    example_evaluations: HashMap<String, Vec<ExampleEvaluation<Value>>>,
}

/// Keeps evaluation data in process memory.
///
/// Suited for tests and short-lived runs; nothing survives the process.
/// Results are stored untyped and decoded into the requested type on read.
#[derive(Default)]
pub struct InMemoryEvaluationRepository {
    state: RwLock<State>,
}

impl InMemoryEvaluationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut ids: Vec<String> = map.keys().cloned().collect();
    ids.sort();
    ids
}

fn decode<E: DeserializeOwned>(stored: &ExampleEvaluation<Value>) -> Result<ExampleEvaluation<E>> {
    Ok(serde_json::from_value(serde_json::to_value(stored)?)?)
}

#[async_trait]
impl EvaluationRepository for InMemoryEvaluationRepository {
    async fn store_evaluation_overview(&self, overview: EvaluationOverview) -> Result<()> {
        let mut state = self.state.write().await;
        debug!(id = %overview.id, "storing evaluation overview");
        state
            .example_evaluations
            .entry(overview.id.clone())
            .or_default();
        state.overviews.insert(overview.id.clone(), overview);
        Ok(())
    }

    async fn evaluation_overview(&self, evaluation_id: &str) -> Result<Option<EvaluationOverview>> {
        Ok(self.state.read().await.overviews.get(evaluation_id).cloned())
    }

    async fn evaluation_overview_ids(&self) -> Result<Vec<String>> {
        Ok(sorted_keys(&self.state.read().await.overviews))
    }

    async fn store_example_evaluation<E>(&self, evaluation: ExampleEvaluation<E>) -> Result<()>
    where
        E: Serialize + Send,
    {
        let stored: ExampleEvaluation<Value> = serde_json::from_value(serde_json::to_value(&evaluation)?)?;
        let mut state = self.state.write().await;
        state
            .example_evaluations
            .entry(stored.evaluation_id.clone())
            .or_default()
            .push(stored);
        Ok(())
    }

    async fn example_evaluations<E>(&self, evaluation_id: &str) -> Result<Vec<ExampleEvaluation<E>>>
    where
        E: DeserializeOwned + Send,
    {
        let state = self.state.read().await;
        let stored = state
            .example_evaluations
            .get(evaluation_id)
            .ok_or_else(|| Error::EvaluationNotFound(evaluation_id.to_string()))?;

        let mut evaluations = stored
            .iter()
            .map(decode::<E>)
            .collect::<Result<Vec<_>>>()?;
        evaluations.sort_by(|a, b| a.example_id.cmp(&b.example_id));
        Ok(evaluations)
    }
}

#[async_trait]
impl AsyncEvaluationRepository for InMemoryEvaluationRepository {
    async fn store_partial_evaluation_overview(
        &self,
        overview: PartialEvaluationOverview,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        debug!(id = %overview.id, "storing partial evaluation overview");
        state
            .example_evaluations
            .entry(overview.id.clone())
            .or_default();
        state.partial_overviews.insert(overview.id.clone(), overview);
        Ok(())
    }

    async fn partial_evaluation_overview(
        &self,
        evaluation_id: &str,
    ) -> Result<Option<PartialEvaluationOverview>> {
        Ok(self
            .state
            .read()
            .await
            .partial_overviews
            .get(evaluation_id)
            .cloned())
    }

    async fn partial_evaluation_overview_ids(&self) -> Result<Vec<String>> {
        Ok(sorted_keys(&self.state.read().await.partial_overviews))
    }
}
