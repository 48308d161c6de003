use std::time::Duration;

/// Errors returned by the bridge, the client and the result accessors.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("config: {0}")]
    Config(String),
    #[error("connection: {0}")]
    Connection(String),
    #[error("runtime: {0}")]
    Runtime(String),
    /// The connection is gone (or closing) and no buffered frame is left.
    #[error("connection closed")]
    Closed,
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Only produced by the deadline-bounded waits.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response: missing {0}")]
    MalformedResponse(String),
}
