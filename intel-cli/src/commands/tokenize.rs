//! Tokenization preview.

use anyhow::Result;
use clap::Args;
use intel_core::{LuminousControlModel, Model};

use super::build_client;
use crate::config::ConfigLoader;

#[derive(Args, Debug)]
pub struct TokenizeArgs {
    /// Text to tokenize
    pub text: String,

    /// Model whose tokenizer to use (defaults to model.default_model)
    #[arg(short, long)]
    pub model: Option<String>,
}

pub async fn run(args: TokenizeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let client = build_client(&config.client)?;

    let name = args
        .model
        .or(config.model.default_model)
        .unwrap_or_else(|| LuminousControlModel::DEFAULT_NAME.to_string());
    let model = Model::new(name, client);

    let encoding = model.tokenize(&args.text).await?;
    let context_size = model.context_size().await?;

    for (id, token) in encoding.get_ids().iter().zip(encoding.get_tokens()) {
        println!("{id:>8}  {token}");
    }
    println!();
    println!(
        "{} tokens of {} available to {}",
        encoding.len(),
        context_size,
        model.name()
    );
    Ok(())
}
