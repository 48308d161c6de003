//! `get-note` and `run`: one request against the configured server.

use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use ze_domain::config::NotebookConfig;
use ze_notebook_client::results::{note_paragraph_result, paragraph_result};
use ze_notebook_client::{NotebookClient, NotebookClientBuilder};

/// How long to wait for the server to confirm a close.
pub const CLOSE_GRACE: Duration = Duration::from_secs(2);

pub fn connect(config: &NotebookConfig) -> anyhow::Result<NotebookClient> {
    NotebookClientBuilder::from_config(config)
        .build()
        .with_context(|| format!("connecting to {}", config.endpoint))
}

/// Close `client` and wait briefly for the handshake to finish.
pub fn disconnect(client: &NotebookClient) {
    client.close();
    if !client.await_closed(Some(CLOSE_GRACE)) {
        tracing::warn!(endpoint = %client.transport().endpoint(), "server did not confirm close");
    }
}

/// Fetch `note_id` and print paragraph `index`'s result (or the raw frame).
pub fn get_note(
    config: &NotebookConfig,
    note_id: &str,
    timeout: Option<Duration>,
    index: usize,
    json: bool,
) -> anyhow::Result<()> {
    let client = connect(config)?;
    let frame = match timeout {
        Some(t) => client
            .get_note_timeout(note_id, t)
            .map(|f| f.with_context(|| format!("no answer for note {note_id} within {t:?}"))),
        None => client.get_note(note_id).map(Ok),
    };
    disconnect(&client);
    let frame = frame??;

    print_frame(&frame, json, |f| note_paragraph_result(f, index))
}

/// Run `code` in a paragraph and print the finished result (or the raw frame).
pub fn run(
    config: &NotebookConfig,
    note_id: &str,
    paragraph_id: &str,
    code: &str,
    deadline: Option<Duration>,
    json: bool,
) -> anyhow::Result<()> {
    let client = connect(config)?;
    let frame = match deadline {
        Some(d) => client.run_paragraph_with_deadline(note_id, paragraph_id, code, d),
        None => client.run_paragraph(note_id, paragraph_id, code),
    };
    disconnect(&client);
    let frame = frame?;

    print_frame(&frame, json, paragraph_result)
}

fn print_frame<'a, F>(frame: &'a Value, json: bool, text: F) -> anyhow::Result<()>
where
    F: FnOnce(&'a Value) -> Result<&'a str, ze_notebook_client::ClientError>,
{
    if json {
        println!("{}", serde_json::to_string_pretty(frame)?);
    } else {
        println!("{}", text(frame)?);
    }
    Ok(())
}
