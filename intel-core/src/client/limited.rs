//! Concurrency-limiting wrapper around any [`Client`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokenizers::Tokenizer;
use tokio::sync::Semaphore;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use super::{
    Client, CompletionRequest, CompletionResponse, ExplanationRequest, ExplanationResponse,
};
use crate::{Error, ModelInfo, Result};

/// Default number of requests allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;

/// Default total time spent retrying a busy API before giving up.
pub const DEFAULT_MAX_RETRY_TIME: Duration = Duration::from_secs(180);

/// First backoff delay after a busy response; doubles on every retry.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound for a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Bounds in-flight `complete`/`explain` calls and retries busy responses.
///
/// Build one per process and share it behind an `Arc`; every model using the
/// same instance shares the same budget.
pub struct LimitedConcurrencyClient<C> {
    client: C,
    semaphore: Semaphore,
    max_concurrency: usize,
    max_retry_time: Duration,
}

impl<C: Client> LimitedConcurrencyClient<C> {
    /// Wrap a client with the default limits.
    pub fn new(client: C) -> Self {
        Self::with_limits(client, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RETRY_TIME)
    }

    /// Wrap a client with explicit limits. A concurrency of zero is raised to one.
    pub fn with_limits(client: C, max_concurrency: usize, max_retry_time: Duration) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            client,
            semaphore: Semaphore::new(max_concurrency),
            max_concurrency,
            max_retry_time,
        }
    }

    /// Maximum number of concurrent requests.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Access the wrapped client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Run `call` under a permit, retrying while the API reports busy.
    async fn throttled<T, F, Fut>(&self, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        let started = Instant::now();
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 1u32;
        loop {
            match call().await {
                Err(err) if err.is_retryable() && started.elapsed() + backoff <= self.max_retry_time => {
                    debug!(attempt, backoff_ms = backoff.as_millis() as u64, "retrying busy request");
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!(attempt, "giving up on busy request");
                    }
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}

#[async_trait]
impl<C: Client> Client for LimitedConcurrencyClient<C> {
    async fn complete(
        &self,
        request: CompletionRequest,
        model: &str,
    ) -> Result<CompletionResponse> {
        self.throttled(|| self.client.complete(request.clone(), model))
            .await
    }

    async fn explain(
        &self,
        request: ExplanationRequest,
        model: &str,
    ) -> Result<ExplanationResponse> {
        self.throttled(|| self.client.explain(request.clone(), model))
            .await
    }

    async fn models(&self) -> Result<Vec<ModelInfo>> {
        self.client.models().await
    }

    async fn tokenizer(&self, model: &str) -> Result<Tokenizer> {
        self.client.tokenizer(model).await
    }
}
