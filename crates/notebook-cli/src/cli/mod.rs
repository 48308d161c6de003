pub mod config;
pub mod note;
pub mod render;

use clap::{Parser, Subcommand};

/// ze-notebook: drive a notebook server and render paragraph pipelines.
#[derive(Debug, Parser)]
#[command(name = "ze-notebook", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a note and print one paragraph's result text.
    GetNote {
        /// Note ID (e.g. "2C78F5XN6").
        note_id: String,
        /// Give up if no answer arrives within this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Paragraph index whose result is printed.
        #[arg(long, default_value_t = 0)]
        index: usize,
        /// Print the whole frame as JSON instead of the result text.
        #[arg(long)]
        json: bool,
    },
    /// Run code in a paragraph and wait for it to finish.
    Run {
        note_id: String,
        paragraph_id: String,
        /// Paragraph text, including its `%interpreter` line.
        code: String,
        /// Fail if the paragraph has not finished within this many seconds.
        #[arg(long)]
        deadline_secs: Option<u64>,
        /// Print the whole frame as JSON instead of the result text.
        #[arg(long)]
        json: bool,
    },
    /// Build and execute a pipeline script, printing its output.
    Render {
        /// Script file: directive lines (`%in json`, `%out table`) with bodies.
        file: String,
        /// Interpreter property, `key=value`.  Repeatable.
        #[arg(long = "prop", value_name = "KEY=VALUE")]
        props: Vec<String>,
        /// Note used by `intpr` stages.  Requires `--paragraph`.
        #[arg(long, requires = "paragraph")]
        note: Option<String>,
        /// Paragraph used by `intpr` stages.
        #[arg(long, requires = "note")]
        paragraph: Option<String>,
        /// Deadline for each `intpr` run, in seconds.
        #[arg(long)]
        deadline_secs: Option<u64>,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `ZE_CONFIG` (or
/// `notebook.toml` by default).  A missing file yields the defaults.
/// Returns the parsed [`Config`](ze_domain::config::Config) and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(ze_domain::config::Config, String)> {
    let config_path = std::env::var("ZE_CONFIG").unwrap_or_else(|_| "notebook.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(config_path: &str) -> anyhow::Result<ze_domain::config::Config> {
    if !std::path::Path::new(config_path).exists() {
        tracing::debug!(path = %config_path, "config file not found, using defaults");
        return Ok(ze_domain::config::Config::default());
    }
    ze_domain::config::Config::load(config_path)
        .map_err(|e| anyhow::anyhow!("loading {config_path}: {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.notebook.queue_capacity, 10);
    }

    #[test]
    fn bad_file_names_its_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notebook\nendpoint = 1").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains(&path));
    }

    #[test]
    fn render_requires_note_and_paragraph_together() {
        let parsed = Cli::try_parse_from(["ze-notebook", "render", "s.txt", "--note", "n"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from([
            "ze-notebook", "render", "s.txt", "--note", "n", "--paragraph", "p",
        ])
        .unwrap();
        assert!(matches!(parsed.command, Command::Render { note: Some(_), .. }));
    }

    #[test]
    fn get_note_defaults_to_first_paragraph() {
        let parsed = Cli::try_parse_from(["ze-notebook", "get-note", "2C78F5XN6"]).unwrap();
        match parsed.command {
            Command::GetNote { note_id, index, timeout_secs, json } => {
                assert_eq!(note_id, "2C78F5XN6");
                assert_eq!(index, 0);
                assert_eq!(timeout_secs, None);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
