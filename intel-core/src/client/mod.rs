//! Client capability for the hosted model API.
//!
//! The [`Client`] trait is the only way models reach the network. Models hold
//! an `Arc<dyn Client>` that is built once at process start and injected, so
//! throughput control lives in one place.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use intel_core::client::{HttpClient, LimitedConcurrencyClient};
//!
//! let http = HttpClient::from_env()?;
//! let client = Arc::new(LimitedConcurrencyClient::new(http));
//! let models = client.models().await?;
//! ```

mod http;
mod limited;
mod types;

use async_trait::async_trait;
use tokenizers::Tokenizer;

pub use http::{DEFAULT_HOST, HttpClient, TOKEN_ENV_VAR};
pub use limited::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RETRY_TIME, LimitedConcurrencyClient};
pub use types::*;

use crate::{ModelInfo, Result};

/// Capability to run requests against hosted models.
///
/// Implementations own transport concerns. Retry, backoff and concurrency
/// limiting belong here, never in the models built on top.
#[async_trait]
pub trait Client: Send + Sync {
    /// Generate a completion for the request with the named model.
    async fn complete(
        &self,
        request: CompletionRequest,
        model: &str,
    ) -> Result<CompletionResponse>;

    /// Explain a target completion with the named model.
    async fn explain(
        &self,
        request: ExplanationRequest,
        model: &str,
    ) -> Result<ExplanationResponse>;

    /// List the models known to the registry.
    async fn models(&self) -> Result<Vec<ModelInfo>>;

    /// Fetch the tokenizer that belongs to the named model.
    async fn tokenizer(&self, model: &str) -> Result<Tokenizer>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted in-process client for unit tests.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::Error;

    /// Word-level tokenizer with a three-word vocabulary.
    pub(crate) const TOKENIZER_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"[UNK]": 0, "hello": 1, "world": 2},
            "unk_token": "[UNK]"
        }
    }"#;

    /// Records requests and answers with canned responses.
    #[derive(Default)]
    pub(crate) struct StubClient {
        pub(crate) models: Vec<ModelInfo>,
        pub(crate) completion: Option<String>,
        pub(crate) completions: Mutex<Vec<(CompletionRequest, String)>>,
        pub(crate) model_calls: AtomicUsize,
        pub(crate) tokenizer_calls: AtomicUsize,
    }

    impl StubClient {
        pub(crate) fn with_models(models: Vec<ModelInfo>) -> Self {
            Self {
                models,
                completion: Some("done".to_string()),
                ..Default::default()
            }
        }

        pub(crate) fn completion_requests(&self) -> Vec<(CompletionRequest, String)> {
            self.completions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Client for StubClient {
        async fn complete(
            &self,
            request: CompletionRequest,
            model: &str,
        ) -> Result<CompletionResponse> {
            self.completions
                .lock()
                .unwrap()
                .push((request, model.to_string()));
            Ok(CompletionResponse {
                model_version: "stub".to_string(),
                completions: vec![CompletionResult {
                    completion: self.completion.clone(),
                    finish_reason: Some("end_of_text".to_string()),
                }],
                num_tokens_prompt_total: 4,
                num_tokens_generated: 2,
            })
        }

        async fn explain(
            &self,
            request: ExplanationRequest,
            _model: &str,
        ) -> Result<ExplanationResponse> {
            Ok(ExplanationResponse {
                model_version: "stub".to_string(),
                explanations: vec![Explanation {
                    target: request.target,
                    items: vec![],
                }],
            })
        }

        async fn models(&self) -> Result<Vec<ModelInfo>> {
            self.model_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.models.clone())
        }

        async fn tokenizer(&self, _model: &str) -> Result<Tokenizer> {
            self.tokenizer_calls.fetch_add(1, Ordering::SeqCst);
            Tokenizer::from_bytes(TOKENIZER_JSON.as_bytes())
                .map_err(|e| Error::Tokenizer(e.to_string()))
        }
    }
}
