//! Connection owner: turns pushed WebSocket frames into blocking reads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::CONTENT_TYPE;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as Frame};
use ze_protocol::Message;

use crate::error::ClientError;
use crate::inbox::{inbox, Inbox, InboxSender};
use crate::signal::ClosedSignal;
use crate::transport::NotebookTransport;

/// Connection parameters for [`Bridge::connect`].
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Largest inbound frame accepted, in bytes.
    pub max_frame_size: usize,
    /// Inbox capacity.  Must be at least 1.
    pub queue_capacity: usize,
    /// Limit on the TCP connect + WebSocket handshake.
    pub connect_timeout: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            max_frame_size: 99_999,
            queue_capacity: 10,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

enum Outbound {
    Frame(String),
    Close,
}

/// One open connection to the notebook server.
///
/// Frames pushed by the server are parsed as JSON and queued in arrival
/// order; [`receive`](Self::receive) and
/// [`receive_timeout`](Self::receive_timeout) pop them.  Outbound messages
/// are fire-and-forget.
pub struct Bridge {
    endpoint: String,
    handle: Handle,
    runtime: Option<Runtime>,
    outbound: mpsc::UnboundedSender<Outbound>,
    inbox: Inbox,
    closed: ClosedSignal,
    closing: AtomicBool,
}

impl Bridge {
    /// Connect with the given frame limit and queue capacity, and default
    /// timeouts.
    pub fn open(
        endpoint: &str,
        max_frame_size: usize,
        queue_capacity: usize,
    ) -> Result<Self, ClientError> {
        Self::connect(
            endpoint,
            BridgeOptions {
                max_frame_size,
                queue_capacity,
                ..Default::default()
            },
        )
    }

    /// Connect to `endpoint` and start the reader and writer tasks.
    ///
    /// Fails with [`ClientError::Connection`] if the handshake does not
    /// complete within `options.connect_timeout`.
    pub fn connect(endpoint: &str, options: BridgeOptions) -> Result<Self, ClientError> {
        if options.queue_capacity == 0 {
            return Err(ClientError::Config("queue_capacity must be at least 1".into()));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("ze-notebook-io")
            .enable_all()
            .build()
            .map_err(|e| ClientError::Runtime(e.to_string()))?;
        let handle = runtime.handle().clone();

        let mut request = endpoint
            .into_client_request()
            .map_err(|e| ClientError::Connection(format!("{endpoint}: {e}")))?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut ws_config = WebSocketConfig::default();
        ws_config.max_frame_size = Some(options.max_frame_size);

        tracing::info!(endpoint = %endpoint, "connecting to notebook server");
        let connect = tokio_tungstenite::connect_async_with_config(request, Some(ws_config), false);
        let (ws, _response) = handle
            .block_on(async { tokio::time::timeout(options.connect_timeout, connect).await })
            .map_err(|_| {
                ClientError::Connection(format!(
                    "{endpoint}: handshake timed out after {:?}",
                    options.connect_timeout
                ))
            })?
            .map_err(|e| ClientError::Connection(format!("{endpoint}: {e}")))?;
        tracing::info!(endpoint = %endpoint, "notebook connection open");

        let (mut sink, mut stream) = ws.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();
        let (inbox_tx, inbox) = inbox(options.queue_capacity, handle.clone());
        let closed = ClosedSignal::new();

        // Writer task: drains outbound frames into the socket.
        handle.spawn(async move {
            while let Some(out) = outbound_rx.recv().await {
                match out {
                    Outbound::Frame(text) => {
                        if let Err(e) = sink.send(Frame::Text(text)).await {
                            tracing::warn!(error = %e, "failed to send frame");
                            break;
                        }
                    }
                    Outbound::Close => {
                        if let Err(e) = sink.close().await {
                            tracing::debug!(error = %e, "close handshake failed");
                        }
                        break;
                    }
                }
            }
        });

        // Reader task: parses inbound frames and fires `closed` when the
        // stream ends.
        let reader_closed = closed.clone();
        let reader_endpoint = endpoint.to_string();
        handle.spawn(async move {
            read_frames(&mut stream, &inbox_tx).await;
            tracing::info!(endpoint = %reader_endpoint, "notebook connection closed");
            reader_closed.fire();
        });

        Ok(Self {
            endpoint: endpoint.to_string(),
            handle,
            runtime: Some(runtime),
            outbound,
            inbox,
            closed,
            closing: AtomicBool::new(false),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Serialize and queue `message` for sending.  No acknowledgement is
    /// awaited.
    pub fn send(&self, message: &Message) -> Result<(), ClientError> {
        if self.closing.load(Ordering::SeqCst) {
            return Err(ClientError::Closed);
        }
        let json = serde_json::to_string(message)?;
        tracing::debug!(op = message.op.as_str(), bytes = json.len(), "sending message");
        self.outbound
            .send(Outbound::Frame(json))
            .map_err(|_| ClientError::Closed)
    }

    /// Block until a frame is available and return the oldest one.
    pub fn receive(&self) -> Result<Value, ClientError> {
        self.inbox.receive()
    }

    /// Block for at most `timeout`; `Ok(None)` when nothing arrived.
    pub fn receive_timeout(&self, timeout: Duration) -> Result<Option<Value>, ClientError> {
        self.inbox.receive_timeout(timeout)
    }

    /// Frames buffered and not yet received.
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// Start the close handshake and discard buffered frames.
    ///
    /// Callers blocked in [`receive`](Self::receive) or
    /// [`receive_timeout`](Self::receive_timeout) return
    /// [`ClientError::Closed`].
    ///
    /// [`await_closed`](Self::await_closed) returns once the server has
    /// confirmed.  Calling this again is a no-op.
    pub fn close(&self) {
        if self.closing.swap(true, Ordering::SeqCst) {
            tracing::debug!(endpoint = %self.endpoint, "close already requested");
            return;
        }
        let dropped = self.inbox.close_and_drain();
        tracing::info!(endpoint = %self.endpoint, dropped, "closing notebook connection");
        // The writer is gone if the connection already died.
        let _ = self.outbound.send(Outbound::Close);
    }

    /// Block until the connection is closed or `timeout` elapses.  `None`
    /// waits indefinitely.  Returns whether the connection is closed.
    pub fn await_closed(&self, timeout: Option<Duration>) -> bool {
        self.closed.wait(&self.handle, timeout)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_fired()
    }
}

async fn read_frames<S>(stream: &mut S, inbox: &InboxSender)
where
    S: Stream<Item = Result<Frame, WsError>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Frame::Text(text)) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => {
                    tracing::trace!(bytes = text.len(), "received frame");
                    // Waits while the inbox is full.
                    if inbox.deliver(value).await.is_err() {
                        tracing::trace!("inbox closed, discarding frame");
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "skipping non-JSON frame");
                }
            },
            Ok(Frame::Close(reason)) => {
                tracing::debug!(?reason, "received close frame");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "notebook connection error");
                break;
            }
        }
    }
}

impl NotebookTransport for Bridge {
    fn send(&self, message: &Message) -> Result<(), ClientError> {
        Bridge::send(self, message)
    }

    fn receive(&self) -> Result<Value, ClientError> {
        Bridge::receive(self)
    }

    fn receive_timeout(&self, timeout: Duration) -> Result<Option<Value>, ClientError> {
        Bridge::receive_timeout(self, timeout)
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            // Does not block, so dropping inside async code is safe.
            runtime.shutdown_background();
        }
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("endpoint", &self.endpoint)
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish()
    }
}
