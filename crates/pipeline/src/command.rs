//! The assembled pipeline and its execution.

use serde_json::Value;

use crate::error::PipelineError;
use crate::stage::{ExecutionContext, PropertyLookup, Stage, StageRole};

/// A configured stage together with the directive that produced it.
pub struct ConfiguredStage {
    pub role: StageRole,
    pub name: String,
    pub stage: Box<dyn Stage>,
}

/// Ordered, append-only sequence of configured stages.
///
/// The command does not enforce role ordering; `in → process* → out` is a
/// convention the paragraph author follows.
#[derive(Default)]
pub struct Command {
    stages: Vec<ConfiguredStage>,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage that has already been configured.
    pub fn push(&mut self, role: StageRole, name: impl Into<String>, stage: Box<dyn Stage>) {
        self.stages.push(ConfiguredStage {
            role,
            name: name.into(),
            stage,
        });
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[ConfiguredStage] {
        &self.stages
    }

    /// `(role, name)` of every stage, in execution order.
    pub fn describe(&self) -> Vec<(StageRole, &str)> {
        self.stages
            .iter()
            .map(|s| (s.role, s.name.as_str()))
            .collect()
    }

    /// Run every stage in order, feeding `Null` into the first one.
    ///
    /// Stops at the first failing stage.  An empty command yields `Null`.
    pub async fn execute(
        &self,
        props: &dyn PropertyLookup,
        ctx: &ExecutionContext,
    ) -> Result<Value, PipelineError> {
        let mut value = Value::Null;
        for configured in &self.stages {
            tracing::debug!(
                role = %configured.role,
                stage = %configured.name,
                "executing stage"
            );
            value = configured
                .stage
                .execute(value, props, ctx)
                .await
                .map_err(|source| PipelineError::Stage {
                    name: configured.name.clone(),
                    source,
                })?;
        }
        Ok(value)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.describe()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::{StageError, StageResult};

    struct Append(&'static str);

    #[async_trait::async_trait]
    impl Stage for Append {
        fn set_body(&mut self, _body: &str) {}

        async fn execute(
            &self,
            input: Value,
            _props: &dyn PropertyLookup,
            _ctx: &ExecutionContext,
        ) -> StageResult {
            let prior = input.as_str().unwrap_or_default();
            Ok(Value::String(format!("{prior}{}", self.0)))
        }
    }

    struct Fail;

    #[async_trait::async_trait]
    impl Stage for Fail {
        fn set_body(&mut self, _body: &str) {}

        async fn execute(
            &self,
            _input: Value,
            _props: &dyn PropertyLookup,
            _ctx: &ExecutionContext,
        ) -> StageResult {
            Err(StageError::Failed("intentional".into()))
        }
    }

    #[tokio::test]
    async fn outputs_thread_through_stages() {
        let mut cmd = Command::new();
        cmd.push(StageRole::Input, "a", Box::new(Append("a")));
        cmd.push(StageRole::Process, "b", Box::new(Append("b")));
        cmd.push(StageRole::Output, "c", Box::new(Append("c")));

        let out = cmd
            .execute(&HashMap::new(), &ExecutionContext::new())
            .await
            .unwrap();
        assert_eq!(out, Value::String("abc".into()));
    }

    #[tokio::test]
    async fn empty_command_yields_null() {
        let out = Command::new()
            .execute(&HashMap::new(), &ExecutionContext::new())
            .await
            .unwrap();
        assert_eq!(out, Value::Null);
    }

    #[tokio::test]
    async fn failing_stage_is_named() {
        let mut cmd = Command::new();
        cmd.push(StageRole::Input, "a", Box::new(Append("a")));
        cmd.push(StageRole::Output, "boom", Box::new(Fail));
        let err = cmd
            .execute(&HashMap::new(), &ExecutionContext::new())
            .await
            .unwrap_err();
        match err {
            PipelineError::Stage { name, source } => {
                assert_eq!(name, "boom");
                assert_eq!(source, StageError::Failed("intentional".into()));
            }
            other => panic!("expected Stage error, got: {other:?}"),
        }
    }

    #[test]
    fn roles_are_not_enforced() {
        let mut cmd = Command::new();
        cmd.push(StageRole::Output, "first", Box::new(Append("x")));
        cmd.push(StageRole::Input, "second", Box::new(Append("y")));
        assert_eq!(
            cmd.describe(),
            vec![(StageRole::Output, "first"), (StageRole::Input, "second")]
        );
    }
}
