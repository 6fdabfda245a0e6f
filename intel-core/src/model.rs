//! Named hosted models and the tasks that call them.

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokenizers::{Encoding, Tokenizer};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::client::{
    Client, CompletionRequest, CompletionResponse, ExplanationRequest, ExplanationResponse,
};
use crate::task::Task;
use crate::tracer::Tracer;
use crate::{Error, Result};

/// Input of a completion task. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompleteInput(CompletionRequest);

impl CompleteInput {
    pub fn new(request: CompletionRequest) -> Self {
        Self(request)
    }

    /// The request sent to the client.
    pub fn to_completion_request(&self) -> CompletionRequest {
        self.0.clone()
    }

    /// Copy of this input with `sequence` appended to the stop sequences,
    /// unless it is already one of them.
    pub fn with_stop_sequence(&self, sequence: &str) -> Self {
        let mut request = self.0.clone();
        let stops = request.stop_sequences.get_or_insert_with(Vec::new);
        if !stops.iter().any(|s| s == sequence) {
            stops.push(sequence.to_string());
        }
        Self(request)
    }
}

impl From<CompletionRequest> for CompleteInput {
    fn from(request: CompletionRequest) -> Self {
        Self(request)
    }
}

impl Deref for CompleteInput {
    type Target = CompletionRequest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Output of a completion task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompleteOutput(CompletionResponse);

impl CompleteOutput {
    /// Text of the first completion, or an empty string.
    pub fn completion(&self) -> &str {
        self.0
            .completions
            .first()
            .and_then(|c| c.completion.as_deref())
            .unwrap_or("")
    }

    /// Number of tokens the model generated.
    pub fn generated_tokens(&self) -> u32 {
        self.0.num_tokens_generated
    }

    pub fn into_response(self) -> CompletionResponse {
        self.0
    }
}

impl From<CompletionResponse> for CompleteOutput {
    fn from(response: CompletionResponse) -> Self {
        Self(response)
    }
}

impl Deref for CompleteOutput {
    type Target = CompletionResponse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Input of an explanation task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplainInput(ExplanationRequest);

impl ExplainInput {
    pub fn new(request: ExplanationRequest) -> Self {
        Self(request)
    }

    pub fn to_explanation_request(&self) -> ExplanationRequest {
        self.0.clone()
    }
}

impl From<ExplanationRequest> for ExplainInput {
    fn from(request: ExplanationRequest) -> Self {
        Self(request)
    }
}

impl Deref for ExplainInput {
    type Target = ExplanationRequest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Output of an explanation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplainOutput(ExplanationResponse);

impl ExplainOutput {
    pub fn into_response(self) -> ExplanationResponse {
        self.0
    }
}

impl From<ExplanationResponse> for ExplainOutput {
    fn from(response: ExplanationResponse) -> Self {
        Self(response)
    }
}

impl Deref for ExplainOutput {
    type Target = ExplanationResponse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Sends completion requests with every parameter exposed.
pub struct CompleteTask {
    client: Arc<dyn Client>,
    model: String,
}

impl CompleteTask {
    pub fn new(client: Arc<dyn Client>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Task for CompleteTask {
    type Input = CompleteInput;
    type Output = CompleteOutput;

    fn name(&self) -> &str {
        "complete"
    }

    async fn do_run(&self, input: CompleteInput, tracer: &dyn Tracer) -> Result<CompleteOutput> {
        tracer.log("Model", json!(self.model));
        let response = self
            .client
            .complete(input.to_completion_request(), &self.model)
            .await?;
        Ok(response.into())
    }
}

/// Sends explanation requests with every parameter exposed.
pub struct ExplainTask {
    client: Arc<dyn Client>,
    model: String,
}

impl ExplainTask {
    pub fn new(client: Arc<dyn Client>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Task for ExplainTask {
    type Input = ExplainInput;
    type Output = ExplainOutput;

    fn name(&self) -> &str {
        "explain"
    }

    async fn do_run(&self, input: ExplainInput, tracer: &dyn Tracer) -> Result<ExplainOutput> {
        tracer.log("Model", json!(self.model));
        let response = self
            .client
            .explain(input.to_explanation_request(), &self.model)
            .await?;
        Ok(response.into())
    }
}

/// A named hosted model reached through a shared client.
///
/// `context_size` and the tokenizer are fetched on first use and kept for the
/// lifetime of the value. The model registry is treated as static while a
/// `Model` is alive; build a new `Model` to pick up registry changes.
pub struct Model {
    name: String,
    client: Arc<dyn Client>,
    complete: CompleteTask,
    explain: ExplainTask,
    context_size: OnceCell<u32>,
    tokenizer: OnceCell<Arc<Tokenizer>>,
}

impl Model {
    pub fn new(name: impl Into<String>, client: Arc<dyn Client>) -> Self {
        let name = name.into();
        Self {
            complete: CompleteTask::new(Arc::clone(&client), name.clone()),
            explain: ExplainTask::new(Arc::clone(&client), name.clone()),
            name,
            client,
            context_size: OnceCell::new(),
            tokenizer: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Arc<dyn Client> {
        &self.client
    }

    /// Maximum context size of this model according to the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelNotFound`] if the registry does not list the name.
    pub async fn context_size(&self) -> Result<u32> {
        self.context_size
            .get_or_try_init(|| async {
                let models = self.client.models().await?;
                let size = models
                    .iter()
                    .find(|info| info.name == self.name)
                    .map(|info| info.max_context_size)
                    .ok_or_else(|| Error::ModelNotFound(self.name.clone()))?;
                debug!(model = %self.name, size, "resolved context size");
                Ok::<_, Error>(size)
            })
            .await
            .copied()
    }

    /// The task used by [`complete`](Self::complete), for composition.
    pub fn complete_task(&self) -> &CompleteTask {
        &self.complete
    }

    pub fn explain_task(&self) -> &ExplainTask {
        &self.explain
    }

    pub async fn complete(&self, input: CompleteInput, tracer: &dyn Tracer) -> Result<CompleteOutput> {
        self.complete.run(input, tracer).await
    }

    pub async fn explain(&self, input: ExplainInput, tracer: &dyn Tracer) -> Result<ExplainOutput> {
        self.explain.run(input, tracer).await
    }

    /// Tokenizer bound to this model's name.
    pub async fn tokenizer(&self) -> Result<Arc<Tokenizer>> {
        self.tokenizer
            .get_or_try_init(|| async { self.client.tokenizer(&self.name).await.map(Arc::new) })
            .await
            .cloned()
    }

    pub async fn tokenize(&self, text: &str) -> Result<Encoding> {
        self.tokenizer()
            .await?
            .encode(text, false)
            .map_err(|e| Error::Tokenizer(e.to_string()))
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::ModelInfo;
    use crate::client::CompletionResult;
    use crate::client::testing::StubClient;
    use crate::tracer::{InMemoryTracer, NoOpTracer};

    fn stub() -> Arc<StubClient> {
        Arc::new(StubClient::with_models(vec![
            ModelInfo::new("luminous-base", 2048),
            ModelInfo::new("llama-3-8b-instruct", 8192),
        ]))
    }

    #[tokio::test]
    async fn context_size_is_looked_up_once() {
        let client = stub();
        let model = Model::new("llama-3-8b-instruct", client.clone());

        assert_eq!(model.context_size().await.unwrap(), 8192);
        assert_eq!(model.context_size().await.unwrap(), 8192);
        assert_eq!(client.model_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn context_size_fails_for_unknown_model() {
        let model = Model::new("luminous-nano", stub());

        let err = model.context_size().await.unwrap_err();

        assert!(matches!(err, Error::ModelNotFound(name) if name == "luminous-nano"));
    }

    #[tokio::test]
    async fn complete_logs_model_and_wraps_response() {
        let client = stub();
        let model = Model::new("luminous-base", client.clone());
        let tracer = InMemoryTracer::new();

        let output = model
            .complete(CompletionRequest::new("Hello").into(), &tracer)
            .await
            .unwrap();

        assert_eq!(output.completion(), "done");
        assert_eq!(output.generated_tokens(), 2);
        assert_eq!(tracer.values("Model"), vec![json!("luminous-base")]);
        let requests = client.completion_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, "luminous-base");
    }

    #[tokio::test]
    async fn explain_passes_target_through() {
        let model = Model::new("luminous-base", stub());

        let output = model
            .explain(ExplanationRequest::new("Hello", " world").into(), &NoOpTracer)
            .await
            .unwrap();

        assert_eq!(output.explanations[0].target, " world");
    }

    #[tokio::test]
    async fn tokenizer_is_fetched_once() {
        let client = stub();
        let model = Model::new("luminous-base", client.clone());

        let first = model.tokenize("hello world").await.unwrap();
        let second = model.tokenize("world").await.unwrap();

        assert_eq!(first.get_ids(), &[1, 2]);
        assert_eq!(second.get_ids(), &[2]);
        assert_eq!(client.tokenizer_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completion_is_empty_without_text() {
        let output = CompleteOutput::from(CompletionResponse {
            model_version: "v".to_string(),
            completions: vec![CompletionResult::default()],
            num_tokens_prompt_total: 0,
            num_tokens_generated: 0,
        });
        assert_eq!(output.completion(), "");

        let empty = CompleteOutput::from(CompletionResponse {
            model_version: "v".to_string(),
            completions: vec![],
            num_tokens_prompt_total: 0,
            num_tokens_generated: 0,
        });
        assert_eq!(empty.completion(), "");
    }

    #[test]
    fn with_stop_sequence_appends_once() {
        let input = CompleteInput::new(CompletionRequest::new("x"));

        let once = input.with_stop_sequence("END");
        let twice = once.with_stop_sequence("END");

        assert!(input.stop_sequences.is_none());
        assert_eq!(twice.stop_sequences, Some(vec!["END".to_string()]));
    }
}
