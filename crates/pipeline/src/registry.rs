//! Stage registry: maps `(role, name)` to stage constructors.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use ze_domain::config::PipelineConfig;

use crate::error::PipelineError;
use crate::stage::{Stage, StageRole};
use crate::stages;

/// Zero-argument stage factory.  An `Err` is reported as
/// [`PipelineError::Construction`].
pub type StageConstructor = Arc<dyn Fn() -> Result<Box<dyn Stage>, String> + Send + Sync>;

/// A registry entry: symbolic name, role namespace and constructor.
#[derive(Clone)]
pub struct StageDescriptor {
    name: String,
    role: StageRole,
    constructor: StageConstructor,
}

impl StageDescriptor {
    /// The name is normalized to lowercase so lookups are case-insensitive.
    pub fn new<F>(role: StageRole, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Stage>, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into().to_ascii_lowercase(),
            role,
            constructor: Arc::new(constructor),
        }
    }

    /// Descriptor for a stage type that can be built with [`Default`].
    pub fn of<S: Stage + Default>(role: StageRole, name: impl Into<String>) -> Self {
        Self::new(role, name, || Ok(Box::new(S::default()) as Box<dyn Stage>))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> StageRole {
        self.role
    }

    /// Construct a fresh, unconfigured stage.
    pub fn instantiate(&self) -> Result<Box<dyn Stage>, PipelineError> {
        (self.constructor)().map_err(|reason| PipelineError::Construction {
            role: self.role,
            name: self.name.clone(),
            reason,
        })
    }
}

impl fmt::Debug for StageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageDescriptor")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Closed set of stages, partitioned into one namespace per [`StageRole`].
///
/// Build it once at startup, then share it read-only (usually behind an
/// `Arc`).  Lookups never mutate the registry.
///
/// ```rust,no_run
/// # use ze_pipeline::{StageRegistry, StageRole};
/// # use ze_domain::config::PipelineConfig;
/// let reg = StageRegistry::builtin(&PipelineConfig::default());
/// let html = reg.resolve(StageRole::Input, "html").unwrap();
/// let stage = html.instantiate().unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct StageRegistry {
    namespaces: BTreeMap<StageRole, HashMap<String, StageDescriptor>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in reader and writer.
    ///
    /// The process namespace exists but is empty.
    pub fn builtin(config: &PipelineConfig) -> Self {
        let mut reg = Self::new();
        for descriptor in stages::builtin_descriptors(config) {
            if let Err(e) = reg.register(descriptor) {
                tracing::warn!(error = %e, "built-in stage not registered");
                debug_assert!(false, "built-in stage clash: {e}");
            }
        }
        reg
    }

    /// Registry holding exactly `descriptors`.  Fails on the first name
    /// clash within a role.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = StageDescriptor>,
    ) -> Result<Self, PipelineError> {
        let mut reg = Self::new();
        for descriptor in descriptors {
            reg.register(descriptor)?;
        }
        Ok(reg)
    }

    /// Add a descriptor.  Names must be unique within a role.
    ///
    /// Returns `&mut Self` for method chaining.
    pub fn register(&mut self, descriptor: StageDescriptor) -> Result<&mut Self, PipelineError> {
        let namespace = self.namespaces.entry(descriptor.role).or_default();
        if namespace.contains_key(&descriptor.name) {
            return Err(PipelineError::DuplicateStage {
                role: descriptor.role,
                name: descriptor.name,
            });
        }
        tracing::trace!(role = %descriptor.role, stage = %descriptor.name, "registered stage");
        namespace.insert(descriptor.name.clone(), descriptor);
        Ok(self)
    }

    /// Look up `name` in the namespace of `role` only (case-insensitive).
    pub fn resolve(&self, role: StageRole, name: &str) -> Result<&StageDescriptor, PipelineError> {
        self.namespaces
            .get(&role)
            .and_then(|ns| ns.get(&name.to_ascii_lowercase()))
            .ok_or_else(|| PipelineError::UnknownStage {
                role,
                name: name.to_string(),
            })
    }

    /// Registered names for `role` (sorted).
    pub fn names(&self, role: StageRole) -> Vec<String> {
        let mut names: Vec<String> = self
            .namespaces
            .get(&role)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}
