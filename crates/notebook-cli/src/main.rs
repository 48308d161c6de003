use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ze_notebook::cli::render::Target;
use ze_notebook::cli::{load_config, Cli, Command, ConfigCommand};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_tracing();

    match cli.command {
        Command::GetNote {
            note_id,
            timeout_secs,
            index,
            json,
        } => {
            let (config, _) = load_config()?;
            ze_notebook::cli::note::get_note(
                &config.notebook,
                &note_id,
                timeout_secs.map(Duration::from_secs),
                index,
                json,
            )
        }
        Command::Run {
            note_id,
            paragraph_id,
            code,
            deadline_secs,
            json,
        } => {
            let (config, _) = load_config()?;
            ze_notebook::cli::note::run(
                &config.notebook,
                &note_id,
                &paragraph_id,
                &code,
                deadline_secs.map(Duration::from_secs),
                json,
            )
        }
        Command::Render {
            file,
            props,
            note,
            paragraph,
            deadline_secs,
        } => {
            let (config, _) = load_config()?;
            let target = note.zip(paragraph).map(|(note_id, paragraph_id)| Target {
                note_id,
                paragraph_id,
                deadline: deadline_secs.map(Duration::from_secs),
            });
            ze_notebook::cli::render::render(&config, &file, &props, target)
        }
        Command::Config(ConfigCommand::Validate) => {
            let (config, config_path) = load_config()?;
            let summary =
                ze_notebook::cli::config::validate(&config, &config_path, &mut std::io::stdout())?;
            if !summary.passed() {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            let (config, _) = load_config()?;
            ze_notebook::cli::config::show(&config)
        }
    }
}

/// Logs go to stderr so stdout carries only command output.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
