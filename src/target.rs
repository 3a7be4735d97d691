//! The registered unit of work: a name, an optional description, dependency lists, and a body.

use std::fmt;
use std::sync::Arc;

use crate::error::TargetError;

/// What a target's body returns: nothing on success, a boxed [`TargetError`] on failure.
pub type TargetResult = Result<(), Box<dyn TargetError>>;

/// The callable a target runs when executed. Boxed so the registry can hold targets of
/// heterogeneous closures; `Send + Sync` so a wave of targets can run across worker threads.
pub type TargetBody = Box<dyn Fn() -> TargetResult + Send + Sync>;

/// A single registered build target.
pub struct Target {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) hard_dependencies: Vec<String>,
    pub(crate) soft_dependencies: Vec<String>,
    pub(crate) body: TargetBody,
}

impl Target {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn hard_dependencies(&self) -> &[String] {
        &self.hard_dependencies
    }

    pub fn soft_dependencies(&self) -> &[String] {
        &self.soft_dependencies
    }

    pub(crate) fn invoke(&self) -> TargetResult {
        (self.body)()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("hard_dependencies", &self.hard_dependencies)
            .field("soft_dependencies", &self.soft_dependencies)
            .finish_non_exhaustive()
    }
}

/// A reusable target shape: a fixed set of default dependencies plus a body that is
/// instantiated from a single string parameter each time the template is applied.
pub struct Template {
    pub(crate) default_dependencies: Vec<String>,
    pub(crate) body_factory: Arc<dyn Fn(&str) -> TargetBody + Send + Sync>,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("default_dependencies", &self.default_dependencies)
            .finish_non_exhaustive()
    }
}
