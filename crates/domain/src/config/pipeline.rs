use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Character that introduces a directive line in a paragraph script.
    #[serde(default = "d_directive_marker")]
    pub directive_marker: char,
    /// Request timeout for the `http` input stage.
    #[serde(default = "d_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            directive_marker: d_directive_marker(),
            http_timeout_secs: d_http_timeout_secs(),
        }
    }
}

fn d_directive_marker() -> char {
    '%'
}
fn d_http_timeout_secs() -> u64 {
    30
}
