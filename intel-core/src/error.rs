//! Error types for model access.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a model.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured model name is not listed by the client's model registry.
    #[error("no matching model found for name {0}")]
    ModelNotFound(String),

    /// A model variant was constructed with a name outside its family.
    #[error("unsupported {family} model: {name}")]
    UnsupportedModel { family: &'static str, name: String },

    /// The upstream API is temporarily overloaded (HTTP 429 or 503).
    #[error("model API is busy")]
    Busy,

    /// The upstream API answered with a non-success status.
    #[error("model API returned {status}: {message}")]
    ProviderApi { status: u16, message: String },

    /// Request failed before a response was received.
    #[error("request failed: {0}")]
    Request(String),

    /// Tokenizer could not be loaded or failed to encode.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// No API token in the environment.
    #[error("API token not set: {0}")]
    MissingToken(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the request may succeed when retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Busy)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_not_found_names_the_model() {
        let err = Error::ModelNotFound("luminous-nano".to_string());
        assert_eq!(err.to_string(), "no matching model found for name luminous-nano");
    }

    #[test]
    fn only_busy_is_retryable() {
        assert!(Error::Busy.is_retryable());
        assert!(
            !Error::ProviderApi {
                status: 401,
                message: "unauthorized".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn error_from_serde_json() {
        let json_err: serde_json::Error = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
