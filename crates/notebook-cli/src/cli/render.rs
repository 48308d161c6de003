//! `render`: build a pipeline from a script file and execute it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use ze_domain::config::Config;
use ze_notebook_client::results::paragraph_result;
use ze_notebook_client::{ClientError, NotebookClient, NotebookTransport};
use ze_pipeline::stages::as_text;
use ze_pipeline::{
    Command, CommandBuilder, ExecutionContext, InterpreterInvoker, StageError, StageRegistry,
};

/// Where `intpr` stages send their code.
pub struct Target {
    pub note_id: String,
    pub paragraph_id: String,
    pub deadline: Option<Duration>,
}

/// Runs `intpr` code as a paragraph on the notebook server.
pub struct NotebookInterpreter<T: NotebookTransport = ze_notebook_client::Bridge> {
    client: Arc<NotebookClient<T>>,
    target: Arc<Target>,
}

impl<T: NotebookTransport> NotebookInterpreter<T> {
    pub fn new(client: Arc<NotebookClient<T>>, target: Target) -> Self {
        Self {
            client,
            target: Arc::new(target),
        }
    }
}

#[async_trait::async_trait]
impl<T: NotebookTransport + 'static> InterpreterInvoker for NotebookInterpreter<T> {
    async fn interpret(&self, interpreter: &str, code: &str) -> Result<String, StageError> {
        let text = if interpreter.is_empty() {
            code.to_string()
        } else {
            format!("%{interpreter}\n{code}")
        };
        let client = Arc::clone(&self.client);
        let target = Arc::clone(&self.target);

        // The client blocks; keep it off the async workers.
        let result = tokio::task::spawn_blocking(move || {
            let frame = match target.deadline {
                Some(d) => client.run_paragraph_with_deadline(
                    &target.note_id,
                    &target.paragraph_id,
                    &text,
                    d,
                ),
                None => client.run_paragraph(&target.note_id, &target.paragraph_id, &text),
            }?;
            paragraph_result(&frame).map(str::to_string)
        })
        .await
        .map_err(|e| StageError::Failed(format!("interpreter task: {e}")))?;

        result.map_err(|e| match e {
            ClientError::Closed | ClientError::Connection(_) => StageError::Unavailable(e.to_string()),
            other => StageError::Failed(other.to_string()),
        })
    }
}

/// Parse `key=value` pairs into interpreter properties.
pub fn parse_props(pairs: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("property {pair:?} is not KEY=VALUE"))?;
            Ok((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Build `script` into a command and execute it.
pub async fn render_script(
    config: &Config,
    script: &str,
    props: &BTreeMap<String, String>,
    ctx: &ExecutionContext,
) -> anyhow::Result<Value> {
    let registry = Arc::new(StageRegistry::builtin(&config.pipeline));
    let builder = CommandBuilder::new(registry).marker(config.pipeline.directive_marker);

    let mut command = Command::new();
    builder.build_script(&mut command, script)?;
    tracing::debug!(stages = ?command.describe(), "pipeline assembled");

    Ok(command.execute(props, ctx).await?)
}

/// Entry point for the `render` subcommand.
pub fn render(
    config: &Config,
    file: &str,
    props: &[String],
    target: Option<Target>,
) -> anyhow::Result<()> {
    let script = std::fs::read_to_string(file).with_context(|| format!("reading {file}"))?;
    let props = parse_props(props)?;

    // Connect before entering the runtime: the client blocks on its own.
    let mut ctx = ExecutionContext::new();
    let mut client = None;
    if let Some(target) = target {
        let connected = Arc::new(super::note::connect(&config.notebook)?);
        ctx = ExecutionContext::for_paragraph(&target.note_id, &target.paragraph_id)
            .with_interpreter(Arc::new(NotebookInterpreter::new(Arc::clone(&connected), target)));
        client = Some(connected);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    let output = runtime.block_on(render_script(config, &script, &props, &ctx));
    if let Some(client) = &client {
        super::note::disconnect(client);
    }
    let output = output?;

    println!("{}", as_text(&output));
    Ok(())
}
