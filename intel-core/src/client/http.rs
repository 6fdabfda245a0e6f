//! HTTP implementation of the [`Client`](super::Client) capability.
//!
//! # Example
//!
//! ```ignore
//! use intel_core::client::HttpClient;
//!
//! let client = HttpClient::from_env()?;  // AA_TOKEN, optional CLIENT_URL
//! let client = HttpClient::new("https://inference.example.com", token);
//! ```

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tokenizers::Tokenizer;
use tracing::{debug, instrument};

use super::{
    Client, CompletionRequest, CompletionResponse, ExplanationRequest, ExplanationResponse,
};
use crate::auth::ApiToken;
use crate::{Error, ModelInfo, Result};

/// Default API base URL.
pub const DEFAULT_HOST: &str = "https://api.aleph-alpha.com";

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "AA_TOKEN";

/// Environment variable overriding the API base URL.
const HOST_ENV_VAR: &str = "CLIENT_URL";

/// Request body: the model name next to the flattened request fields.
#[derive(Serialize)]
struct ModelRequest<'a, T: Serialize> {
    model: &'a str,
    #[serde(flatten)]
    request: &'a T,
}

/// Client speaking the hosted model API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClient {
    host: String,
    token: ApiToken,
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client for the given base URL.
    pub fn new(host: impl Into<String>, token: ApiToken) -> Self {
        let host: String = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from `AA_TOKEN` and, if set, `CLIENT_URL`.
    pub fn from_env() -> Result<Self> {
        let token = ApiToken::from_env(TOKEN_ENV_VAR)?;
        let host = std::env::var(HOST_ENV_VAR).unwrap_or_else(|_| DEFAULT_HOST.to_string());
        Ok(Self::new(host, token))
    }

    /// Get the base URL for this client.
    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// Turn a non-success response into an error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
            debug!(%status, "model API busy");
            return Err(Error::Busy);
        }
        let message = response.text().await.unwrap_or_default();
        Err(Error::ProviderApi {
            status: status.as_u16(),
            message,
        })
    }

    async fn post<T, R>(&self, path: &str, model: &str, request: &T) -> Result<R>
    where
        T: Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(self.token.expose_secret())
            .json(&ModelRequest { model, request })
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

#[async_trait]
impl Client for HttpClient {
    #[instrument(skip(self, request), level = "debug")]
    async fn complete(
        &self,
        request: CompletionRequest,
        model: &str,
    ) -> Result<CompletionResponse> {
        self.post("/complete", model, &request).await
    }

    #[instrument(skip(self, request), level = "debug")]
    async fn explain(
        &self,
        request: ExplanationRequest,
        model: &str,
    ) -> Result<ExplanationResponse> {
        self.post("/explain", model, &request).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.url("/models_available"))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self), level = "debug")]
    async fn tokenizer(&self, model: &str) -> Result<Tokenizer> {
        let response = self
            .client
            .get(self.url(&format!("/models/{model}/tokenizer")))
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        let bytes = Self::check(response).await?.bytes().await?;
        Tokenizer::from_bytes(&bytes).map_err(|e| Error::Tokenizer(e.to_string()))
    }
}
