//! Instruction completion through a control model.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};
use intel_core::client::{Client, CompletionRequest};
use intel_core::{
    CompleteInput, ControlModel, Llama2InstructModel, Llama3InstructModel, LogTracer,
    LuminousControlModel,
};
use tracing::debug;

use super::build_client;
use crate::config::ConfigLoader;

/// Prompt format family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Family {
    #[default]
    Luminous,
    Llama2,
    Llama3,
}

#[derive(Args, Debug)]
pub struct InstructArgs {
    /// What the model should do
    pub instruction: String,

    /// Material the instruction refers to
    #[arg(short, long)]
    pub input: Option<String>,

    /// Text the response must start with
    #[arg(long)]
    pub response_prefix: Option<String>,

    /// Prompt format family
    #[arg(short, long, value_enum, default_value_t = Family::Luminous)]
    pub family: Family,

    /// Model name within the family (defaults to the family's default model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Upper bound on generated tokens
    #[arg(long, default_value_t = 128)]
    pub maximum_tokens: u32,
}

pub async fn run(args: InstructArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let client = build_client(&config.client)?;
    let control = control_model(args.family, args.model.as_deref(), client)?;

    let prompt = control.to_instruct_prompt(
        &args.instruction,
        args.input.as_deref(),
        args.response_prefix.as_deref(),
    );
    debug!(model = control.model().name(), prompt = %prompt.text, "rendered instruct prompt");

    let request = CompletionRequest::new(prompt).maximum_tokens(args.maximum_tokens);
    let output = control
        .complete(CompleteInput::new(request), &LogTracer)
        .await?;

    if let Some(prefix) = &args.response_prefix {
        print!("{prefix}");
    }
    println!("{}", output.completion());
    Ok(())
}

/// Build the control model for `family`, by name or with the family default.
pub fn control_model(
    family: Family,
    name: Option<&str>,
    client: Arc<dyn Client>,
) -> Result<Box<dyn ControlModel>> {
    let model: Box<dyn ControlModel> = match (family, name) {
        (Family::Luminous, Some(name)) => Box::new(LuminousControlModel::new(name, client)?),
        (Family::Luminous, None) => Box::new(LuminousControlModel::with_default_name(client)),
        (Family::Llama2, Some(name)) => Box::new(Llama2InstructModel::new(name, client)?),
        (Family::Llama2, None) => Box::new(Llama2InstructModel::with_default_name(client)),
        (Family::Llama3, Some(name)) => Box::new(Llama3InstructModel::new(name, client)?),
        (Family::Llama3, None) => Box::new(Llama3InstructModel::with_default_name(client)),
    };
    Ok(model)
}
