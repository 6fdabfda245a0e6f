pub mod config;
pub mod evals;
pub mod instruct;
pub mod models;
pub mod tokenize;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use intel_core::auth::ApiToken;
use intel_core::client::{Client, HttpClient, LimitedConcurrencyClient};
use tracing::debug;

use crate::config::ClientConfig;

/// Build the one client every command shares.
pub fn build_client(config: &ClientConfig) -> Result<Arc<dyn Client>> {
    let token = ApiToken::from_env(&config.token_env)?;
    debug!(host = %config.host, max_concurrency = config.max_concurrency, "building model client");
    let http = HttpClient::new(config.host.clone(), token);
    Ok(Arc::new(LimitedConcurrencyClient::with_limits(
        http,
        config.max_concurrency,
        Duration::from_secs(config.max_retry_secs),
    )))
}
