//! Request and response types for the model API.

use serde::{Deserialize, Serialize};

/// One item of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PromptItem {
    /// Plain text.
    Text(String),
    /// Pre-tokenized input.
    TokenIds(Vec<u32>),
}

/// A prompt, made of one or more items sent to the model in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompt(pub Vec<PromptItem>);

impl Prompt {
    /// Create a prompt holding a single text item.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(vec![PromptItem::Text(text.into())])
    }

    /// Concatenate all text items, skipping token-id items.
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .filter_map(|item| match item {
                PromptItem::Text(text) => Some(text.as_str()),
                PromptItem::TokenIds(_) => None,
            })
            .collect()
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Self::from_text(s)
    }
}

impl From<String> for Prompt {
    fn from(s: String) -> Self {
        Self::from_text(s)
    }
}

/// Request for a text completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Prompt to complete.
    pub prompt: Prompt,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Sample only from the k most likely tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Nucleus sampling threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Penalty for tokens already present in the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Generation stops as soon as one of these is produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl CompletionRequest {
    /// Create a new completion request.
    pub fn new(prompt: impl Into<Prompt>) -> Self {
        Self {
            prompt: prompt.into(),
            maximum_tokens: None,
            temperature: None,
            top_k: None,
            top_p: None,
            presence_penalty: None,
            stop_sequences: None,
        }
    }

    /// Set the maximum tokens.
    pub fn maximum_tokens(mut self, tokens: u32) -> Self {
        self.maximum_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-k sampling.
    pub fn top_k(mut self, k: u32) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Set top-p sampling.
    pub fn top_p(mut self, p: f32) -> Self {
        self.top_p = Some(p);
        self
    }

    /// Set the presence penalty.
    pub fn presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Set stop sequences.
    pub fn stop_sequences(mut self, sequences: Vec<String>) -> Self {
        self.stop_sequences = Some(sequences);
        self
    }
}

/// A single generated completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Generated text, if any.
    #[serde(default)]
    pub completion: Option<String>,
    /// Why generation stopped (e.g. "maximum_tokens", "end_of_text").
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response from a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Version of the model that served the request.
    pub model_version: String,
    /// Generated completions, at least one for a successful request.
    pub completions: Vec<CompletionResult>,
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub num_tokens_prompt_total: u32,
    /// Number of tokens generated across all completions.
    #[serde(default)]
    pub num_tokens_generated: u32,
}

/// Granularity at which prompt explanations are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptGranularity {
    Token,
    Word,
    Sentence,
    Paragraph,
}

/// Request to explain how a prompt influences a target completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    /// Prompt to explain.
    pub prompt: Prompt,
    /// Completion whose likelihood is attributed to the prompt.
    pub target: String,
    /// Scoring granularity; the API picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_granularity: Option<PromptGranularity>,
}

impl ExplanationRequest {
    /// Create a new explanation request.
    pub fn new(prompt: impl Into<Prompt>, target: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            target: target.into(),
            prompt_granularity: None,
        }
    }

    /// Set the scoring granularity.
    pub fn granularity(mut self, granularity: PromptGranularity) -> Self {
        self.prompt_granularity = Some(granularity);
        self
    }
}

/// Score of a text span within a prompt item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextScore {
    pub start: u32,
    pub length: u32,
    pub score: f64,
}

/// Score of a single token within a token-id prompt item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenScore {
    pub score: f64,
}

/// Scores for one prompt item, or for the target itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExplanationItem {
    Text { scores: Vec<TextScore> },
    TokenIds { scores: Vec<TokenScore> },
    Target { scores: Vec<TextScore> },
}

/// Explanation for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub target: String,
    pub items: Vec<ExplanationItem>,
}

/// Response from an explanation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationResponse {
    /// Version of the model that served the request.
    pub model_version: String,
    pub explanations: Vec<Explanation>,
}
