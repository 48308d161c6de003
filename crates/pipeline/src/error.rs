//! Assembly and execution errors.

use crate::stage::StageRole;

/// Errors raised while assembling or executing a [`Command`](crate::Command).
///
/// Assembly errors are returned unchanged by
/// [`CommandBuilder::build`](crate::CommandBuilder::build); the caller decides
/// whether to skip the directive or abort the whole paragraph.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("unknown command type '{0}' (expected in, process or out)")]
    UnknownCommandType(String),

    #[error("unknown {role} stage '{name}'")]
    UnknownStage { role: StageRole, name: String },

    #[error("failed to construct {role} stage '{name}': {reason}")]
    Construction {
        role: StageRole,
        name: String,
        reason: String,
    },

    #[error("{role} stage '{name}' is already registered")]
    DuplicateStage { role: StageRole, name: String },

    #[error("stage '{name}' failed: {source}")]
    Stage {
        name: String,
        #[source]
        source: StageError,
    },
}

/// Result type for stage execution.
pub type StageResult = Result<serde_json::Value, StageError>;

/// Errors a stage can return from [`Stage::execute`](crate::Stage::execute).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("invalid_input: {0}")]
    InvalidInput(String),
    #[error("failed: {0}")]
    Failed(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
}
