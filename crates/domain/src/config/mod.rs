mod notebook;
mod pipeline;

pub use notebook::*;
pub use pipeline::*;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use notebook::ANONYMOUS;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub notebook: NotebookConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&raw)?)
    }

    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let nb = &self.notebook;

        if nb.endpoint.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "notebook.endpoint".into(),
                message: "endpoint must not be empty".into(),
            });
        } else if !(nb.endpoint.starts_with("ws://") || nb.endpoint.starts_with("wss://")) {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "notebook.endpoint".into(),
                message: format!("expected a ws:// or wss:// URL, got '{}'", nb.endpoint),
            });
        }

        if nb.queue_capacity == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "notebook.queue_capacity".into(),
                message: "queue_capacity must be greater than 0".into(),
            });
        }

        if nb.max_frame_size == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "notebook.max_frame_size".into(),
                message: "max_frame_size must be greater than 0".into(),
            });
        }

        if nb.principal == ANONYMOUS && nb.ticket == ANONYMOUS {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "notebook.principal".into(),
                message: "connecting with anonymous credentials".into(),
            });
        }

        if self.pipeline.directive_marker.is_whitespace() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "pipeline.directive_marker".into(),
                message: "directive marker must not be whitespace".into(),
            });
        }

        issues
    }
}
