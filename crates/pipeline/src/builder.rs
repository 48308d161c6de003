//! Turns directive lines into configured stages.

use std::sync::Arc;

use crate::command::Command;
use crate::error::PipelineError;
use crate::parser::{self, DEFAULT_MARKER};
use crate::registry::StageRegistry;
use crate::script;

/// Builds [`Command`]s from directive lines.
///
/// Holds no per-call state, so one builder can be shared across threads;
/// every call constructs fresh stage instances.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use ze_pipeline::{Command, CommandBuilder, StageRegistry};
/// # use ze_domain::config::PipelineConfig;
/// let builder = CommandBuilder::new(Arc::new(StageRegistry::builtin(&PipelineConfig::default())));
/// let mut command = Command::new();
/// builder.build(&mut command, "%in html", "<b>hi</b>").unwrap();
/// builder.build(&mut command, "%out html", "").unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    registry: Arc<StageRegistry>,
    marker: char,
}

impl CommandBuilder {
    pub fn new(registry: Arc<StageRegistry>) -> Self {
        Self {
            registry,
            marker: DEFAULT_MARKER,
        }
    }

    /// Override the directive marker (default `%`).
    pub fn marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Parse `command_line`, construct the named stage, configure it with the
    /// line's parameters and `body`, and append it to `command`.
    ///
    /// Errors are returned unchanged and leave `command` untouched.
    pub fn build(
        &self,
        command: &mut Command,
        command_line: &str,
        body: &str,
    ) -> Result<(), PipelineError> {
        let parsed = parser::parse_with_marker(command_line, self.marker)?;
        let descriptor = self.registry.resolve(parsed.role, &parsed.stage_name)?;
        let mut stage = descriptor.instantiate()?;
        stage.set_parameters(&parsed.parameters);
        stage.set_body(body);

        tracing::debug!(
            role = %parsed.role,
            stage = %descriptor.name(),
            params = parsed.parameters.len(),
            "appended stage"
        );
        command.push(parsed.role, descriptor.name(), stage);
        Ok(())
    }

    /// Build every directive of a paragraph script into `command`.
    ///
    /// Stops at the first failing directive; stages appended before it stay
    /// in `command`.
    pub fn build_script(&self, command: &mut Command, text: &str) -> Result<(), PipelineError> {
        for directive in script::split_script(text, self.marker)? {
            self.build(command, &directive.line, &directive.body)?;
        }
        Ok(())
    }
}
