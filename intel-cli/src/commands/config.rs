//! Configuration inspection.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::{ConfigLoader, IntelConfig};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the merged configuration as TOML
    Show,
    /// List config layers in merge order and whether each file exists
    Path,
    /// Check that the API token and evaluation database are reachable
    Check,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = ConfigLoader::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigCommands::Path => {
            for line in layer_report(&layers()) {
                println!("{line}");
            }
        }
        ConfigCommands::Check => {
            let config = ConfigLoader::load()?;
            let token_set = std::env::var(&config.client.token_env)
                .is_ok_and(|value| !value.trim().is_empty());
            for line in check_report(&config, token_set) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Config layers in merge order; later layers override earlier ones.
fn layers() -> Vec<(&'static str, Option<PathBuf>)> {
    vec![
        ("user", ConfigLoader::user_config_path()),
        ("project", Some(ConfigLoader::project_config_path())),
    ]
}

fn presence(path: &Path) -> &'static str {
    if path.exists() { "found" } else { "missing" }
}

fn layer_report(layers: &[(&str, Option<PathBuf>)]) -> Vec<String> {
    layers
        .iter()
        .map(|(name, path)| match path {
            Some(path) => format!("{name:<8} {} ({})", path.display(), presence(path)),
            None => format!("{name:<8} (no home directory)"),
        })
        .collect()
}

fn check_report(config: &IntelConfig, token_set: bool) -> Vec<String> {
    let database = &config.storage.database;
    vec![
        format!("host     {}", config.client.host),
        format!(
            "token    ${} {}",
            config.client.token_env,
            if token_set { "set" } else { "not set" }
        ),
        format!("database {} ({})", database.display(), presence(database)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layer_report_marks_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("config.toml");
        std::fs::write(&present, "").unwrap();
        let absent = temp_dir.path().join("other.toml");

        let report = layer_report(&[
            ("user", None),
            ("project", Some(present.clone())),
            ("extra", Some(absent.clone())),
        ]);

        assert_eq!(report[0], "user     (no home directory)");
        assert_eq!(report[1], format!("project  {} (found)", present.display()));
        assert_eq!(report[2], format!("extra    {} (missing)", absent.display()));
    }

    #[test]
    fn test_check_report_never_prints_the_token() {
        let mut config = IntelConfig::default();
        config.client.token_env = "MY_TOKEN".to_string();
        config.storage.database = PathBuf::from("/nonexistent/evals.db");

        let report = check_report(&config, true);

        assert_eq!(report[1], "token    $MY_TOKEN set");
        assert_eq!(report[2], "database /nonexistent/evals.db (missing)");
        assert!(check_report(&config, false)[1].ends_with("not set"));
    }
}
