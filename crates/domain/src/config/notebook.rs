use serde::{Deserialize, Serialize};

pub(crate) const ANONYMOUS: &str = "anonymous";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Notebook server connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookConfig {
    /// WebSocket endpoint of the notebook server (e.g. `ws://host:8080/ws`).
    #[serde(default = "d_endpoint")]
    pub endpoint: String,
    /// Largest inbound WebSocket frame accepted, in bytes.
    #[serde(default = "d_max_frame_size")]
    pub max_frame_size: usize,
    /// Capacity of the inbound message queue.  When full, frame ingestion
    /// stalls until a caller drains a message.
    #[serde(default = "d_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "d_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "d_anonymous")]
    pub principal: String,
    #[serde(default = "d_anonymous")]
    pub ticket: String,
    #[serde(default)]
    pub roles: String,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            endpoint: d_endpoint(),
            max_frame_size: d_max_frame_size(),
            queue_capacity: d_queue_capacity(),
            connect_timeout_secs: d_connect_timeout_secs(),
            principal: d_anonymous(),
            ticket: d_anonymous(),
            roles: String::new(),
        }
    }
}

fn d_endpoint() -> String {
    "ws://localhost:8080/ws".into()
}
fn d_max_frame_size() -> usize {
    99_999
}
fn d_queue_capacity() -> usize {
    10
}
fn d_connect_timeout_secs() -> u64 {
    10
}
fn d_anonymous() -> String {
    ANONYMOUS.into()
}
