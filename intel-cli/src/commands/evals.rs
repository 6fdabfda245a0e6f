//! Read-only views over a stored evaluation repository.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use intel_evals::{
    EvaluationOverview, EvaluationRepository, ExampleEvaluation, ExampleResult,
    TursoEvaluationRepository,
};
use serde_json::Value;

use crate::config::ConfigLoader;

/// Evals arguments.
#[derive(Args, Debug)]
pub struct EvalsArgs {
    #[command(subcommand)]
    pub command: EvalsCommands,
}

/// Evals subcommands.
#[derive(Subcommand, Debug)]
pub enum EvalsCommands {
    /// List evaluation overviews
    List,
    /// Show one evaluation overview
    Show {
        /// Evaluation ID
        id: String,
    },
    /// List per-example results of an evaluation
    Results {
        /// Evaluation ID
        id: String,

        /// Only show failed examples
        #[arg(long)]
        failed: bool,
    },
}

/// Run evals command.
pub async fn run(args: EvalsArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let path = &config.storage.database;
    if !path.exists() {
        bail!("no evaluation database at {}", path.display());
    }
    let repo = TursoEvaluationRepository::new_local(path).await?;

    match args.command {
        EvalsCommands::List => list(&repo).await,
        EvalsCommands::Show { id } => show(&repo, &id).await,
        EvalsCommands::Results { id, failed } => results(&repo, &id, failed).await,
    }
}

async fn list(repo: &impl EvaluationRepository) -> Result<()> {
    let overviews = repo.evaluation_overviews().await?;
    if overviews.is_empty() {
        println!("No evaluations stored.");
        return Ok(());
    }
    println!("{}", overview_table(&overviews));
    Ok(())
}

async fn show(repo: &impl EvaluationRepository, id: &str) -> Result<()> {
    let Some(overview) = repo.evaluation_overview(id).await? else {
        bail!("Evaluation '{}' not found", id);
    };

    println!("Evaluation: {}", overview.id);
    if !overview.description.is_empty() {
        println!("Description: {}", overview.description);
    }
    println!("Started: {}", overview.start_date.to_rfc3339());
    println!("Ended: {}", overview.end_date.to_rfc3339());
    println!(
        "Examples: {} ({} successful, {} failed)",
        overview.evaluation_count(),
        overview.successful_evaluation_count,
        overview.failed_evaluation_count
    );
    if !overview.run_ids.is_empty() {
        println!("Runs: {}", overview.run_ids.join(", "));
    }
    Ok(())
}

async fn results(repo: &impl EvaluationRepository, id: &str, failed_only: bool) -> Result<()> {
    let evaluations = if failed_only {
        repo.failed_example_evaluations::<Value>(id).await?
    } else {
        repo.example_evaluations::<Value>(id).await?
    };
    if evaluations.is_empty() {
        println!("No results for evaluation '{id}'.");
        return Ok(());
    }
    println!("{}", results_table(&evaluations));
    Ok(())
}

fn overview_table(overviews: &[EvaluationOverview]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
        Cell::new("Ended").fg(Color::Cyan),
        Cell::new("Successful").fg(Color::Cyan),
        Cell::new("Failed").fg(Color::Cyan),
    ]);

    for overview in overviews {
        table.add_row(vec![
            Cell::new(&overview.id),
            Cell::new(&overview.description),
            Cell::new(overview.end_date.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(overview.successful_evaluation_count),
            Cell::new(overview.failed_evaluation_count).fg(
                if overview.failed_evaluation_count > 0 {
                    Color::Red
                } else {
                    Color::Reset
                },
            ),
        ]);
    }
    table
}

fn results_table(evaluations: &[ExampleEvaluation<Value>]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Example").fg(Color::Cyan),
        Cell::new("Result").fg(Color::Cyan),
    ]);

    for evaluation in evaluations {
        let result = match &evaluation.result {
            ExampleResult::Evaluation(value) => Cell::new(value.to_string()),
            ExampleResult::Failed(failed) => {
                Cell::new(format!("failed: {}", failed.error_message)).fg(Color::Red)
            }
        };
        table.add_row(vec![Cell::new(&evaluation.example_id), result]);
    }
    table
}

#[cfg(test)]
mod tests {
    use intel_evals::InMemoryEvaluationRepository;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_results_table_marks_failures() {
        let evaluations = vec![
            ExampleEvaluation::new("e", "a", json!({"correct": true})),
            ExampleEvaluation::failed("e", "b", "timeout"),
        ];

        let rendered = results_table(&evaluations).to_string();

        assert!(rendered.contains("\"correct\":true"));
        assert!(rendered.contains("failed: timeout"));
    }

    #[tokio::test]
    async fn test_show_unknown_evaluation_fails() {
        let repo = InMemoryEvaluationRepository::new();

        assert!(show(&repo, "missing").await.is_err());
    }

    #[tokio::test]
    async fn test_results_for_unknown_evaluation_fail() {
        let repo = InMemoryEvaluationRepository::new();

        assert!(results(&repo, "missing", false).await.is_err());
    }

    #[tokio::test]
    async fn test_list_reads_stored_overviews() {
        let repo = InMemoryEvaluationRepository::new();
        repo.store_evaluation_overview(EvaluationOverview::new("nightly").with_id("e1"))
            .await
            .unwrap();

        assert!(list(&repo).await.is_ok());
        let table = overview_table(&repo.evaluation_overviews().await.unwrap()).to_string();
        assert!(table.contains("nightly"));
    }
}
