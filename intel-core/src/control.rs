//! Instruction-following model families and their prompt formats.
//!
//! Each family is its own type holding a [`Model`] and a fixed
//! [`PromptTemplate`]; [`ControlModel`] is the single dispatch point callers
//! program against.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::Client;
use crate::model::{CompleteInput, CompleteOutput, Model};
use crate::prompt::{InstructValues, PromptTemplate, RichPrompt, Segment, Slot};
use crate::tracer::Tracer;
use crate::{Error, Result};

/// A model that expects instruction-formatted prompts.
#[async_trait]
pub trait ControlModel: Send + Sync {
    /// The underlying named model.
    fn model(&self) -> &Model;

    /// Render an instruction, an optional input and an optional response
    /// prefix in this family's prompt format.
    fn to_instruct_prompt(
        &self,
        instruction: &str,
        input: Option<&str>,
        response_prefix: Option<&str>,
    ) -> RichPrompt;

    /// Run a completion. Families may reshape the request first.
    async fn complete(&self, input: CompleteInput, tracer: &dyn Tracer) -> Result<CompleteOutput> {
        self.model().complete(input, tracer).await
    }
}

fn checked_name(family: &'static str, supported: &[&str], name: &str) -> Result<String> {
    if supported.contains(&name) {
        Ok(name.to_string())
    } else {
        Err(Error::UnsupportedModel {
            family,
            name: name.to_string(),
        })
    }
}

fn render(
    template: &PromptTemplate,
    instruction: &str,
    input: Option<&str>,
    response_prefix: Option<&str>,
) -> RichPrompt {
    template.to_rich_prompt(&InstructValues {
        instruction,
        input,
        response_prefix,
    })
}

/// Second-generation luminous control models.
#[derive(Debug)]
pub struct LuminousControlModel {
    model: Model,
}

impl LuminousControlModel {
    pub const DEFAULT_NAME: &'static str = "luminous-base-control";

    pub const SUPPORTED_NAMES: &'static [&'static str] = &[
        "luminous-base-control-20230501",
        "luminous-extended-control-20230501",
        "luminous-supreme-control-20230501",
        "luminous-base-control",
        "luminous-extended-control",
        "luminous-supreme-control",
        "luminous-base-control-20240215",
        "luminous-extended-control-20240215",
        "luminous-supreme-control-20240215",
    ];

    pub const TEMPLATE: PromptTemplate = PromptTemplate::new(&[
        Segment::Range(Slot::Instruction),
        Segment::Text("\n"),
        Segment::IfPresent(
            Slot::Input,
            &[Segment::Text("\n"), Segment::Range(Slot::Input), Segment::Text("\n")],
        ),
        Segment::Text("\n### Response:"),
        Segment::Value(Slot::ResponsePrefix),
    ]);

    pub fn new(name: &str, client: Arc<dyn Client>) -> Result<Self> {
        let name = checked_name("luminous control", Self::SUPPORTED_NAMES, name)?;
        Ok(Self {
            model: Model::new(name, client),
        })
    }

    pub fn with_default_name(client: Arc<dyn Client>) -> Self {
        Self {
            model: Model::new(Self::DEFAULT_NAME, client),
        }
    }
}

#[async_trait]
impl ControlModel for LuminousControlModel {
    fn model(&self) -> &Model {
        &self.model
    }

    fn to_instruct_prompt(
        &self,
        instruction: &str,
        input: Option<&str>,
        response_prefix: Option<&str>,
    ) -> RichPrompt {
        render(&Self::TEMPLATE, instruction, input, response_prefix)
    }
}

/// llama-2 chat models, prompted for single-turn instructions.
#[derive(Debug)]
pub struct Llama2InstructModel {
    model: Model,
}

impl Llama2InstructModel {
    pub const DEFAULT_NAME: &'static str = "llama-2-13b-chat";

    pub const SUPPORTED_NAMES: &'static [&'static str] =
        &["llama-2-7b-chat", "llama-2-13b-chat", "llama-2-70b-chat"];

    pub const TEMPLATE: PromptTemplate = PromptTemplate::new(&[
        Segment::Text("<s>[INST] <<SYS>>\n"),
        Segment::Range(Slot::Instruction),
        Segment::Text("\n<</SYS>>"),
        Segment::IfPresent(Slot::Input, &[Segment::Text("\n\n"), Segment::Range(Slot::Input)]),
        Segment::Text(" [/INST]"),
        Segment::IfPresent(
            Slot::ResponsePrefix,
            &[Segment::Text("\n\n"), Segment::Value(Slot::ResponsePrefix)],
        ),
    ]);

    pub fn new(name: &str, client: Arc<dyn Client>) -> Result<Self> {
        let name = checked_name("llama-2", Self::SUPPORTED_NAMES, name)?;
        Ok(Self {
            model: Model::new(name, client),
        })
    }

    pub fn with_default_name(client: Arc<dyn Client>) -> Self {
        Self {
            model: Model::new(Self::DEFAULT_NAME, client),
        }
    }
}

#[async_trait]
impl ControlModel for Llama2InstructModel {
    fn model(&self) -> &Model {
        &self.model
    }

    fn to_instruct_prompt(
        &self,
        instruction: &str,
        input: Option<&str>,
        response_prefix: Option<&str>,
    ) -> RichPrompt {
        render(&Self::TEMPLATE, instruction, input, response_prefix)
    }
}

/// llama-3 instruct models.
///
/// Every completion request gets [`EOT_TOKEN`](Self::EOT_TOKEN) added to its
/// stop sequences, since the API does not stop on it by itself.
#[derive(Debug)]
pub struct Llama3InstructModel {
    model: Model,
}

impl Llama3InstructModel {
    pub const DEFAULT_NAME: &'static str = "llama-3-8b-instruct";

    pub const SUPPORTED_NAMES: &'static [&'static str] =
        &["llama-3-8b-instruct", "llama-3-70b-instruct"];

    /// End-of-turn marker.
    pub const EOT_TOKEN: &'static str = "<|eot_id|>";

    pub const TEMPLATE: PromptTemplate = PromptTemplate::new(&[
        Segment::Text("<|begin_of_text|><|start_header_id|>user<|end_header_id|>\n\n"),
        Segment::Range(Slot::Instruction),
        Segment::IfPresent(Slot::Input, &[Segment::Text("\n\n"), Segment::Range(Slot::Input)]),
        Segment::Text("<|eot_id|><|start_header_id|>assistant<|end_header_id|>"),
        Segment::IfPresent(
            Slot::ResponsePrefix,
            &[Segment::Text("\n\n"), Segment::Value(Slot::ResponsePrefix)],
        ),
    ]);

    pub fn new(name: &str, client: Arc<dyn Client>) -> Result<Self> {
        let name = checked_name("llama-3", Self::SUPPORTED_NAMES, name)?;
        Ok(Self {
            model: Model::new(name, client),
        })
    }

    pub fn with_default_name(client: Arc<dyn Client>) -> Self {
        Self {
            model: Model::new(Self::DEFAULT_NAME, client),
        }
    }

    /// The input with the end-of-turn marker among its stop sequences.
    pub fn add_eot_to_stop_sequences(input: &CompleteInput) -> CompleteInput {
        input.with_stop_sequence(Self::EOT_TOKEN)
    }
}

#[async_trait]
impl ControlModel for Llama3InstructModel {
    fn model(&self) -> &Model {
        &self.model
    }

    fn to_instruct_prompt(
        &self,
        instruction: &str,
        input: Option<&str>,
        response_prefix: Option<&str>,
    ) -> RichPrompt {
        render(&Self::TEMPLATE, instruction, input, response_prefix)
    }

    async fn complete(&self, input: CompleteInput, tracer: &dyn Tracer) -> Result<CompleteOutput> {
        let input = Self::add_eot_to_stop_sequences(&input);
        self.model.complete(input, tracer).await
    }
}
