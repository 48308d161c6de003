//! Builder pattern for constructing a [`NotebookClient`].

use std::time::Duration;

use ze_domain::config::NotebookConfig;
use ze_protocol::Credentials;

use crate::bridge::{Bridge, BridgeOptions};
use crate::client::NotebookClient;
use crate::error::ClientError;

/// Fluent builder for a connected [`NotebookClient`].
///
/// # Example
///
/// ```rust,no_run
/// # use ze_notebook_client::NotebookClientBuilder;
/// let client = NotebookClientBuilder::new()
///     .endpoint("ws://localhost:8080/ws")
///     .max_frame_size(99_999)
///     .queue_capacity(10)
///     .principal("ethan")
///     .ticket("secret")
///     .build()
///     .unwrap();
/// ```
pub struct NotebookClientBuilder {
    pub(crate) endpoint: String,
    pub(crate) options: BridgeOptions,
    pub(crate) credentials: Credentials,
}

impl NotebookClientBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: "ws://localhost:8080/ws".into(),
            options: BridgeOptions::default(),
            credentials: Credentials::default(),
        }
    }

    /// Start from the `[notebook]` section of the configuration file.
    pub fn from_config(config: &NotebookConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            options: BridgeOptions {
                max_frame_size: config.max_frame_size,
                queue_capacity: config.queue_capacity,
                connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            },
            credentials: Credentials {
                principal: config.principal.clone(),
                ticket: config.ticket.clone(),
                roles: config.roles.clone(),
            },
        }
    }

    // ── Connection ───────────────────────────────────────────────────

    /// Set the server WebSocket URL (e.g. `ws://host:8080/ws`).
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Largest inbound frame accepted, in bytes (default 99 999).
    pub fn max_frame_size(mut self, n: usize) -> Self {
        self.options.max_frame_size = n;
        self
    }

    /// Inbound queue capacity (default 10).
    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.options.queue_capacity = n;
        self
    }

    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.options.connect_timeout = d;
        self
    }

    // ── Credentials ──────────────────────────────────────────────────

    pub fn principal(mut self, principal: impl Into<String>) -> Self {
        self.credentials.principal = principal.into();
        self
    }

    pub fn ticket(mut self, ticket: impl Into<String>) -> Self {
        self.credentials.ticket = ticket.into();
        self
    }

    pub fn roles(mut self, roles: impl Into<String>) -> Self {
        self.credentials.roles = roles.into();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Connect and build the [`NotebookClient`].
    ///
    /// Blocks for the handshake; must not be called from async code.
    pub fn build(self) -> Result<NotebookClient<Bridge>, ClientError> {
        self.check()?;
        let bridge = Bridge::connect(&self.endpoint, self.options)?;
        Ok(NotebookClient::new(bridge, self.credentials))
    }

    fn check(&self) -> Result<(), ClientError> {
        if self.endpoint.is_empty() {
            return Err(ClientError::Config("endpoint is required".into()));
        }
        if self.options.queue_capacity == 0 {
            return Err(ClientError::Config("queue_capacity must be at least 1".into()));
        }
        if self.options.max_frame_size == 0 {
            return Err(ClientError::Config("max_frame_size must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for NotebookClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
