//! `ze-pipeline`: assembles notebook paragraphs into render pipelines.
//!
//! A paragraph is a short script of directives, each followed by a body:
//!
//! ```text
//! %in json
//! [{"city": "Paris", "visits": 3}, {"city": "Oslo", "visits": 5}]
//! %out table
//! ```
//!
//! Every directive names a stage role (`in`, `process`, `out`) and a stage.
//! The [`CommandBuilder`] resolves the stage from a [`StageRegistry`],
//! configures it with the directive's parameters and body, and appends it
//! to a [`Command`].  Executing the command threads one stage's output into
//! the next stage's input.
//!
//! # Grammar
//!
//! `<in|process|out> <stage> [param ...] <last>`: the final token after the
//! stage name is never a parameter.  `in http a b c` configures the `http`
//! stage with `["a", "b"]`.

pub mod builder;
pub mod command;
pub mod error;
pub mod parser;
pub mod registry;
pub mod script;
pub mod stage;
pub mod stages;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::CommandBuilder;
pub use command::{Command, ConfiguredStage};
pub use error::{PipelineError, StageError, StageResult};
pub use parser::{normalize, parse, parse_with_marker, ParsedCommand, DEFAULT_MARKER};
pub use registry::{StageDescriptor, StageRegistry};
pub use script::{split_script, ScriptDirective};
pub use stage::{ExecutionContext, InterpreterInvoker, PropertyLookup, Stage, StageRole};
