//! Model listing.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use intel_core::ModelInfo;

use super::build_client;
use crate::config::ConfigLoader;

/// List the models the API serves, sorted by name.
pub async fn run() -> Result<()> {
    let config = ConfigLoader::load()?;
    let client = build_client(&config.client)?;

    let mut models = client.models().await?;
    if models.is_empty() {
        println!("No models available.");
        return Ok(());
    }
    models.sort_by(|a, b| a.name.cmp(&b.name));

    println!("{}", models_table(&models));
    Ok(())
}

fn models_table(models: &[ModelInfo]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Model").fg(Color::Cyan),
        Cell::new("Context").fg(Color::Cyan),
        Cell::new("Max completion").fg(Color::Cyan),
        Cell::new("Images").fg(Color::Cyan),
    ]);

    for model in models {
        table.add_row(vec![
            Cell::new(&model.name),
            Cell::new(format_context(model.max_context_size)),
            Cell::new(
                model
                    .maximum_completion_tokens
                    .map_or_else(|| "-".to_string(), |t| t.to_string()),
            ),
            Cell::new(if model.image_support { "yes" } else { "no" }),
        ]);
    }
    table
}

/// Format context size for display (e.g., 8192 -> "8K").
fn format_context(tokens: u32) -> String {
    if tokens >= 1_000_000 {
        format!("{}M", tokens / 1_000_000)
    } else if tokens >= 1024 {
        format!("{}K", tokens / 1024)
    } else {
        tokens.to_string()
    }
}
