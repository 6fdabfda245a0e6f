//! Core types describing hosted models.

use serde::{Deserialize, Serialize};

/// Information about a model, as listed by the client's model registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name used when addressing requests.
    pub name: String,
    /// Maximum number of prompt plus completion tokens.
    pub max_context_size: u32,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Upper bound on generated tokens, if the model has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_completion_tokens: Option<u32>,
    /// Whether the model accepts image prompt items.
    #[serde(default)]
    pub image_support: bool,
}

impl ModelInfo {
    /// Create model info with the required fields.
    pub fn new(name: impl Into<String>, max_context_size: u32) -> Self {
        Self {
            name: name.into(),
            max_context_size,
            description: String::new(),
            maximum_completion_tokens: None,
            image_support: false,
        }
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the completion token limit.
    pub fn maximum_completion_tokens(mut self, tokens: u32) -> Self {
        self.maximum_completion_tokens = Some(tokens);
        self
    }
}
