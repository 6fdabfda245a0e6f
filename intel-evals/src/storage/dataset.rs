//! In-memory dataset repository.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{DatasetRepository, Error, Result};
use crate::dataset::{Dataset, Example};

#[derive(Default)]
struct State {
    datasets: HashMap<String, Dataset>,
    /// Examples per dataset id; this map is the membership index.
    examples: HashMap<String, Vec<Example<Value, Value>>>,
}

/// Keeps datasets and their examples in process memory.
#[derive(Default)]
pub struct InMemoryDatasetRepository {
    state: RwLock<State>,
}

impl InMemoryDatasetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetRepository for InMemoryDatasetRepository {
    async fn create_dataset<I, O>(&self, examples: Vec<Example<I, O>>, name: &str) -> Result<Dataset>
    where
        I: Serialize + Send,
        O: Serialize + Send,
    {
        let stored = examples
            .iter()
            .map(|example| Ok(serde_json::from_value(serde_json::to_value(example)?)?))
            .collect::<Result<Vec<Example<Value, Value>>>>()?;

        let dataset = Dataset::new(name);
        debug!(id = %dataset.id, examples = stored.len(), "creating dataset");
        let mut state = self.state.write().await;
        state.examples.insert(dataset.id.clone(), stored);
        state.datasets.insert(dataset.id.clone(), dataset.clone());
        Ok(dataset)
    }

    async fn dataset(&self, dataset_id: &str) -> Result<Option<Dataset>> {
        Ok(self.state.read().await.datasets.get(dataset_id).cloned())
    }

    async fn dataset_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.state.read().await.datasets.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn delete_dataset(&self, dataset_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.datasets.remove(dataset_id);
        state.examples.remove(dataset_id);
        Ok(())
    }

    async fn examples<I, O>(&self, dataset_id: &str) -> Result<Vec<Example<I, O>>>
    where
        I: DeserializeOwned + Send,
        O: DeserializeOwned + Send,
    {
        let state = self.state.read().await;
        let stored = state
            .examples
            .get(dataset_id)
            .ok_or_else(|| Error::DatasetNotFound(dataset_id.to_string()))?;

        let mut examples = stored
            .iter()
            .map(|example| Ok(serde_json::from_value(serde_json::to_value(example)?)?))
            .collect::<Result<Vec<Example<I, O>>>>()?;
        examples.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(examples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples() -> Vec<Example<String, String>> {
        vec![
            Example::with_id("b", "2+2".to_string(), "4".to_string()),
            Example::with_id("a", "1+1".to_string(), "2".to_string()),
        ]
    }

    #[tokio::test]
    async fn created_dataset_is_listed_and_readable() {
        let repo = InMemoryDatasetRepository::new();

        let dataset = repo.create_dataset(examples(), "arithmetic").await.unwrap();

        assert_eq!(repo.dataset(&dataset.id).await.unwrap(), Some(dataset.clone()));
        assert_eq!(repo.dataset_ids().await.unwrap(), vec![dataset.id.clone()]);
    }

    #[tokio::test]
    async fn examples_are_sorted_by_id() {
        let repo = InMemoryDatasetRepository::new();
        let dataset = repo.create_dataset(examples(), "arithmetic").await.unwrap();

        let loaded = repo.examples::<String, String>(&dataset.id).await.unwrap();

        let ids: Vec<_> = loaded.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(loaded[1].expected_output(), "4");
    }

    #[tokio::test]
    async fn single_example_lookup() {
        let repo = InMemoryDatasetRepository::new();
        let dataset = repo.create_dataset(examples(), "arithmetic").await.unwrap();

        let found = repo
            .example::<String, String>(&dataset.id, "a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.input(), "1+1");
        assert!(
            repo.example::<String, String>(&dataset.id, "zzz")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn unknown_dataset_examples_is_not_found() {
        let repo = InMemoryDatasetRepository::new();

        assert!(repo.dataset("missing").await.unwrap().is_none());
        let err = repo.examples::<String, String>("missing").await.unwrap_err();
        assert!(matches!(err, Error::DatasetNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn delete_removes_dataset_and_examples() {
        let repo = InMemoryDatasetRepository::new();
        let dataset = repo.create_dataset(examples(), "arithmetic").await.unwrap();

        repo.delete_dataset(&dataset.id).await.unwrap();
        repo.delete_dataset("never-existed").await.unwrap();

        assert!(repo.dataset(&dataset.id).await.unwrap().is_none());
        assert!(repo.examples::<String, String>(&dataset.id).await.is_err());
    }
}
