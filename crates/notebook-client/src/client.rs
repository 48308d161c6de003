//! Request/response operations on top of a [`NotebookTransport`].

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;
use ze_protocol::{op_name, Credentials, Message, Op, STATUS_FINISHED};

use crate::bridge::Bridge;
use crate::error::ClientError;
use crate::transport::NotebookTransport;

/// Blocking notebook client.
///
/// Create via [`NotebookClientBuilder`](crate::builder::NotebookClientBuilder),
/// or wrap any [`NotebookTransport`] with [`NotebookClient::new`].
///
/// Composite operations hold a request lock from their first send until
/// their answer is read, so only one of them is in flight per client.
pub struct NotebookClient<T = Bridge> {
    transport: T,
    credentials: Credentials,
    request_lock: Mutex<()>,
}

impl<T: NotebookTransport> NotebookClient<T> {
    pub fn new(transport: T, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            request_lock: Mutex::new(()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ── Request builders ─────────────────────────────────────────────

    pub fn get_interpreter_settings_request(&self) -> Message {
        Message::get_interpreter_settings(&self.credentials)
    }

    pub fn list_configurations_request(&self) -> Message {
        Message::list_configurations(&self.credentials)
    }

    pub fn list_notes_request(&self) -> Message {
        Message::list_notes(&self.credentials)
    }

    pub fn get_note_request(&self, note_id: &str) -> Message {
        Message::get_note(&self.credentials, note_id)
    }

    pub fn run_paragraph_request(&self, paragraph_id: &str, code: &str) -> Message {
        Message::run_paragraph(&self.credentials, paragraph_id, code)
    }

    // ── Raw channel access ───────────────────────────────────────────

    pub fn send(&self, message: &Message) -> Result<(), ClientError> {
        self.transport.send(message)
    }

    pub fn receive(&self) -> Result<Value, ClientError> {
        self.transport.receive()
    }

    pub fn receive_timeout(&self, timeout: Duration) -> Result<Option<Value>, ClientError> {
        self.transport.receive_timeout(timeout)
    }

    // ── Composite operations ─────────────────────────────────────────

    /// Request a note and return the next inbound frame.
    ///
    /// The frame is not checked against the request: whatever the server
    /// pushes next is returned, even if it is not the `NOTE` answer.
    pub fn get_note(&self, note_id: &str) -> Result<Value, ClientError> {
        let _guard = self.request_lock.lock();
        self.transport.send(&self.get_note_request(note_id))?;
        self.transport.receive()
    }

    /// [`get_note`](Self::get_note) with a bounded wait; `Ok(None)` when
    /// nothing arrived in time.
    pub fn get_note_timeout(
        &self,
        note_id: &str,
        timeout: Duration,
    ) -> Result<Option<Value>, ClientError> {
        let _guard = self.request_lock.lock();
        self.transport.send(&self.get_note_request(note_id))?;
        self.transport.receive_timeout(timeout)
    }

    /// Run `code` in a paragraph and block until the server reports it
    /// `FINISHED`.
    ///
    /// Every frame that is not a finished `PARAGRAPH` is discarded.  There
    /// is no time limit: a paragraph that never finishes (errors, aborts)
    /// blocks until the connection closes.  Use
    /// [`run_paragraph_with_deadline`](Self::run_paragraph_with_deadline)
    /// to bound the wait.
    pub fn run_paragraph(
        &self,
        note_id: &str,
        paragraph_id: &str,
        code: &str,
    ) -> Result<Value, ClientError> {
        let _guard = self.request_lock.lock();
        self.start_run(note_id, paragraph_id, code)?;
        loop {
            let frame = self.transport.receive()?;
            if is_finished_paragraph(&frame) {
                tracing::info!(paragraph_id = %paragraph_id, "paragraph finished");
                return Ok(frame);
            }
            discard(&frame);
        }
    }

    /// [`run_paragraph`](Self::run_paragraph) that gives up with
    /// [`ClientError::Timeout`] once `deadline` has passed.
    pub fn run_paragraph_with_deadline(
        &self,
        note_id: &str,
        paragraph_id: &str,
        code: &str,
        deadline: Duration,
    ) -> Result<Value, ClientError> {
        let _guard = self.request_lock.lock();
        let until = Instant::now() + deadline;
        self.start_run(note_id, paragraph_id, code)?;
        loop {
            let remaining = until.saturating_duration_since(Instant::now());
            match self.transport.receive_timeout(remaining)? {
                Some(frame) if is_finished_paragraph(&frame) => {
                    tracing::info!(paragraph_id = %paragraph_id, "paragraph finished");
                    return Ok(frame);
                }
                Some(frame) => discard(&frame),
                None => {
                    tracing::warn!(
                        paragraph_id = %paragraph_id,
                        deadline_ms = deadline.as_millis() as u64,
                        "paragraph did not finish before deadline"
                    );
                    return Err(ClientError::Timeout(deadline));
                }
            }
        }
    }

    fn start_run(&self, note_id: &str, paragraph_id: &str, code: &str) -> Result<(), ClientError> {
        tracing::debug!(note_id = %note_id, paragraph_id = %paragraph_id, "running paragraph");
        self.transport.send(&self.get_note_request(note_id))?;
        self.transport
            .send(&self.run_paragraph_request(paragraph_id, code))
    }
}

impl NotebookClient<Bridge> {
    /// Start closing the connection.  See [`Bridge::close`].
    pub fn close(&self) {
        self.transport.close();
    }

    /// See [`Bridge::await_closed`].
    pub fn await_closed(&self, timeout: Option<Duration>) -> bool {
        self.transport.await_closed(timeout)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for NotebookClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotebookClient")
            .field("transport", &self.transport)
            .field("principal", &self.credentials.principal)
            .field("busy", &self.request_lock.is_locked())
            .finish()
    }
}

fn is_finished_paragraph(frame: &Value) -> bool {
    Op::Paragraph.matches(frame)
        && frame
            .pointer("/data/paragraph/status")
            .and_then(Value::as_str)
            == Some(STATUS_FINISHED)
}

fn discard(frame: &Value) {
    tracing::trace!(
        op = op_name(frame).unwrap_or("<none>"),
        "discarding frame while waiting for paragraph"
    );
}
