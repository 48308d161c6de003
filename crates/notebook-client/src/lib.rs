//! `ze-notebook-client`: blocking client for a notebook server's WebSocket.
//!
//! The server pushes JSON frames whenever it likes; callers want to ask a
//! question and block for the answer.  This crate bridges the two.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ send  ┌──────────────────────── Bridge ─────────────────────┐
//! │NotebookClient│──────▶│ outbound ─▶ writer task ─▶ WS sink                  │
//! │ (blocking)   │       │                                                     │
//! │              │◀──────│ Inbox (bounded FIFO) ◀─ reader task ◀─ WS stream    │
//! └──────────────┘receive│ ClosedSignal ◀──────── reader task ends             │
//!                        └─────────────────────────────────────────────────────┘
//! ```
//!
//! The Bridge owns a small Tokio runtime that drives the socket.  Its
//! blocking methods must not be called from inside an async task; wrap them
//! in `tokio::task::spawn_blocking` when you are.
//!
//! # Single request in flight
//!
//! Inbound frames carry no correlation id, so every caller shares one
//! queue.  [`NotebookClient`] serializes each send-then-drain sequence with
//! a request lock; raw [`Bridge::receive`] callers get no such protection.
//!
//! # Backpressure
//!
//! When the inbox is full the reader task waits for space instead of
//! dropping frames.  A caller that stops draining therefore stalls all
//! further inbound delivery, including the server's close handshake, until
//! [`Bridge::close`] discards the queue.

pub mod bridge;
pub mod builder;
pub mod client;
pub mod error;
pub mod inbox;
pub mod results;
pub mod signal;
pub mod transport;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use bridge::{Bridge, BridgeOptions};
pub use builder::NotebookClientBuilder;
pub use client::NotebookClient;
pub use error::ClientError;
pub use inbox::{inbox, Inbox, InboxSender};
pub use signal::ClosedSignal;
pub use transport::NotebookTransport;

// Re-export protocol types so callers never need to import ze-protocol directly.
pub use ze_protocol::{Credentials, Message, Op, STATUS_FINISHED};
