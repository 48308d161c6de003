//! Notebook server protocol: the JSON message envelope exchanged over the
//! notebook WebSocket.
//!
//! Outbound frames are serialized [`Message`]s.  Inbound frames are kept as
//! raw JSON; callers look at the `op` field and the nested `data.note` /
//! `data.paragraph` objects by convention.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operations the notebook server recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Op {
    /// Client → server: fetch one note.
    GetNote,
    /// Server → client: a note with its paragraphs.
    Note,
    /// Client → server: list every note.
    ListNotes,
    /// Server → client: note summaries.
    NotesInfo,
    /// Client → server: run one paragraph.
    RunParagraph,
    /// Server → client: paragraph state change.
    Paragraph,
    /// Server → client: paragraph progress percentage.
    Progress,
    GetInterpreterSettings,
    InterpreterSettings,
    ListConfigurations,
    ConfigurationsInfo,
    ErrorInfo,
    Ping,
}

impl Op {
    /// Wire name, e.g. `"RUN_PARAGRAPH"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::GetNote => "GET_NOTE",
            Op::Note => "NOTE",
            Op::ListNotes => "LIST_NOTES",
            Op::NotesInfo => "NOTES_INFO",
            Op::RunParagraph => "RUN_PARAGRAPH",
            Op::Paragraph => "PARAGRAPH",
            Op::Progress => "PROGRESS",
            Op::GetInterpreterSettings => "GET_INTERPRETER_SETTINGS",
            Op::InterpreterSettings => "INTERPRETER_SETTINGS",
            Op::ListConfigurations => "LIST_CONFIGURATIONS",
            Op::ConfigurationsInfo => "CONFIGURATIONS_INFO",
            Op::ErrorInfo => "ERROR_INFO",
            Op::Ping => "PING",
        }
    }

    /// Whether an inbound frame carries this operation.
    pub fn matches(self, frame: &Value) -> bool {
        op_name(frame) == Some(self.as_str())
    }
}

/// Paragraph status reported once a run has completed successfully.
pub const STATUS_FINISHED: &str = "FINISHED";

/// The `op` field of an inbound frame, if any.
pub fn op_name(frame: &Value) -> Option<&str> {
    frame.get("op").and_then(Value::as_str)
}

/// Opaque identity fields copied into every outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub principal: String,
    pub ticket: String,
    pub roles: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            principal: "anonymous".into(),
            ticket: "anonymous".into(),
            roles: String::new(),
        }
    }
}

/// Message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub op: Op,
    pub principal: String,
    pub ticket: String,
    pub roles: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Message {
    pub fn new(op: Op, credentials: &Credentials) -> Self {
        Self {
            op,
            principal: credentials.principal.clone(),
            ticket: credentials.ticket.clone(),
            roles: credentials.roles.clone(),
            data: Map::new(),
        }
    }

    /// Set one `data` entry.  Returns `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get_interpreter_settings(credentials: &Credentials) -> Self {
        Self::new(Op::GetInterpreterSettings, credentials)
    }

    pub fn list_configurations(credentials: &Credentials) -> Self {
        Self::new(Op::ListConfigurations, credentials)
    }

    pub fn list_notes(credentials: &Credentials) -> Self {
        Self::new(Op::ListNotes, credentials)
    }

    pub fn ping(credentials: &Credentials) -> Self {
        Self::new(Op::Ping, credentials)
    }

    pub fn get_note(credentials: &Credentials, note_id: &str) -> Self {
        Self::new(Op::GetNote, credentials).with("id", note_id)
    }

    /// Run `code` in the paragraph `paragraph_id`.
    ///
    /// The server expects `params`/`config` maps and `title`/`date` keys
    /// even when they carry nothing.
    pub fn run_paragraph(credentials: &Credentials, paragraph_id: &str, code: &str) -> Self {
        Self::new(Op::RunParagraph, credentials)
            .with("id", paragraph_id)
            .with("paragraph", code)
            .with("params", Map::new())
            .with("config", Map::new())
            .with("title", Value::Null)
            .with("date", Value::Null)
    }
}
