//! The seam between [`NotebookClient`](crate::NotebookClient) and the socket.

use std::time::Duration;

use serde_json::Value;
use ze_protocol::Message;

use crate::error::ClientError;

/// A single-queue, pull-style message channel.
///
/// [`Bridge`](crate::Bridge) is the production implementation; tests can
/// substitute a scripted one.
pub trait NotebookTransport: Send + Sync {
    /// Queue `message` for sending without waiting for an answer.
    fn send(&self, message: &Message) -> Result<(), ClientError>;

    /// Block until the next inbound frame arrives.
    fn receive(&self) -> Result<Value, ClientError>;

    /// Wait at most `timeout` for the next inbound frame.
    fn receive_timeout(&self, timeout: Duration) -> Result<Option<Value>, ClientError>;
}
