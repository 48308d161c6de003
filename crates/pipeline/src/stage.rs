//! The stage contract: roles, configuration, and execution context.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{StageError, StageResult};

/// Which registry namespace a stage lives in.
///
/// The role only matters at assembly time; a built [`Command`](crate::Command)
/// executes every stage the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageRole {
    Input,
    Process,
    Output,
}

impl StageRole {
    pub const ALL: [StageRole; 3] = [StageRole::Input, StageRole::Process, StageRole::Output];

    /// Parse the directive keyword (`in`, `process`, `out`).  Case-sensitive.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "in" => Some(Self::Input),
            "process" => Some(Self::Process),
            "out" => Some(Self::Output),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Input => "in",
            Self::Process => "process",
            Self::Output => "out",
        }
    }
}

impl fmt::Display for StageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One unit of a render pipeline.
///
/// Stages are constructed with no arguments by their registry entry, then
/// configured exactly once through [`set_parameters`](Self::set_parameters)
/// and [`set_body`](Self::set_body) before the first
/// [`execute`](Self::execute).
///
/// # Example
///
/// ```rust,no_run
/// use ze_pipeline::{ExecutionContext, PropertyLookup, Stage, StageResult};
///
/// #[derive(Default)]
/// struct Shout {
///     body: String,
/// }
///
/// #[async_trait::async_trait]
/// impl Stage for Shout {
///     fn set_body(&mut self, body: &str) {
///         self.body = body.to_uppercase();
///     }
///
///     async fn execute(
///         &self,
///         _input: serde_json::Value,
///         _props: &dyn PropertyLookup,
///         _ctx: &ExecutionContext,
///     ) -> StageResult {
///         Ok(serde_json::Value::String(self.body.clone()))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Stage: Send + Sync + 'static {
    /// Receive the directive's parameters.  Empty when the directive has none.
    fn set_parameters(&mut self, _parameters: &[String]) {}

    /// Receive the free text following the directive line.
    fn set_body(&mut self, body: &str);

    /// Transform the previous stage's output into this stage's output.
    ///
    /// * `input`: output of the previous stage (`Null` for the first stage)
    /// * `props`: interpreter properties
    /// * `ctx`: the paragraph being executed
    async fn execute(
        &self,
        input: Value,
        props: &dyn PropertyLookup,
        ctx: &ExecutionContext,
    ) -> StageResult;
}

/// Read-only access to interpreter properties.
pub trait PropertyLookup: Send + Sync {
    fn property(&self, key: &str) -> Option<String>;
}

impl PropertyLookup for HashMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl PropertyLookup for BTreeMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Runs code through another notebook interpreter on behalf of the `intpr`
/// input stage.
#[async_trait::async_trait]
pub trait InterpreterInvoker: Send + Sync {
    /// Run `code` with `interpreter` (e.g. `"sh"`, `"jdbc"`) and return its
    /// textual result.  An empty interpreter name means `code` already
    /// carries its own `%interpreter` line.
    async fn interpret(&self, interpreter: &str, code: &str) -> Result<String, StageError>;
}

/// The paragraph a [`Command`](crate::Command) is executing for.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    pub note_id: Option<String>,
    pub paragraph_id: Option<String>,
    /// Backend for the `intpr` stage.  `None` makes that stage unavailable.
    pub interpreter: Option<Arc<dyn InterpreterInvoker>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_paragraph(note_id: impl Into<String>, paragraph_id: impl Into<String>) -> Self {
        Self {
            note_id: Some(note_id.into()),
            paragraph_id: Some(paragraph_id.into()),
            interpreter: None,
        }
    }

    pub fn with_interpreter(mut self, interpreter: Arc<dyn InterpreterInvoker>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("note_id", &self.note_id)
            .field("paragraph_id", &self.paragraph_id)
            .field("interpreter", &self.interpreter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_roundtrip() {
        for role in StageRole::ALL {
            assert_eq!(StageRole::from_keyword(role.keyword()), Some(role));
        }
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(StageRole::from_keyword("IN"), None);
        assert_eq!(StageRole::from_keyword("output"), None);
    }

    #[test]
    fn hashmap_is_a_property_lookup() {
        let mut props = HashMap::new();
        props.insert("echarts.script".to_string(), "/js/echarts.js".to_string());
        assert_eq!(props.property("echarts.script").as_deref(), Some("/js/echarts.js"));
        assert_eq!(props.property("missing"), None);
    }

    #[test]
    fn debug_hides_interpreter() {
        let ctx = ExecutionContext::for_paragraph("note-1", "p-1");
        let rendered = format!("{ctx:?}");
        assert!(rendered.contains("note-1"));
        assert!(rendered.contains("interpreter: false"));
    }
}
