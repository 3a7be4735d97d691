//! The target registry: the single owner of every registered target and of the run-scoped
//! mutable state (`executed`, `errors`, the current wave's in-flight target) that worker
//! threads touch while a wave is running.

use std::collections::HashSet;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::error::{ConfigError, RegistryError};
use crate::target::{Target, TargetBody, Template};

/// The order a run executed its targets in, recorded for the running-order reporter.
#[derive(Debug, Clone)]
pub enum RunOrder {
    Serial(Vec<String>),
    Parallel(Vec<Vec<String>>),
}

#[derive(Debug, Default)]
pub(crate) struct RunState {
    pub executed: HashSet<String>,
    pub executed_times: Vec<(String, Duration)>,
    pub errors: Vec<(String, String)>,
    pub current_target: Option<String>,
}

/// Owns every registered target, the two hook maps, and the state a run accumulates.
///
/// Target names are matched case-insensitively (keys are lowercased) but the name supplied at
/// registration is kept as the canonical, displayed casing.
pub struct TargetRegistry {
    pub(crate) targets: IndexMap<String, Target>,
    /// Final-target activation flags, keyed by lowercase name. Always run at the end of a run.
    pub(crate) final_targets: IndexMap<String, bool>,
    /// Build-failure-target activation flags, keyed by lowercase name. Run only if the main
    /// build recorded at least one error.
    pub(crate) build_failure_targets: IndexMap<String, bool>,
    pub(crate) pending_description: Option<String>,
    pub(crate) current_order: Option<RunOrder>,
    pub(crate) state: Mutex<RunState>,
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self {
            targets: IndexMap::new(),
            final_targets: IndexMap::new(),
            build_failure_targets: IndexMap::new(),
            pending_description: None,
            current_order: None,
            state: Mutex::new(RunState::default()),
        }
    }

    /// Clears every registered target and all run-scoped state, returning the registry to the
    /// state `new()` produces.
    pub fn reset(&mut self) {
        self.targets.clear();
        self.final_targets.clear();
        self.build_failure_targets.clear();
        self.pending_description = None;
        self.current_order = None;
        *self.state.lock() = RunState::default();
    }

    /// Sets the description that the next `create_target`/`register_final`/
    /// `register_build_failure` call will attach. Only one description may be pending at a
    /// time; calling this twice without an intervening target creation is an error.
    pub fn set_description(&mut self, text: impl Into<String>) -> Result<(), ConfigError> {
        if self.pending_description.is_some() {
            return Err(ConfigError::DescriptionAlreadyPending);
        }
        self.pending_description = Some(text.into());
        Ok(())
    }

    /// Registers a new target. Consumes any pending description. Errors if a target with the
    /// same name (case-insensitively) already exists.
    pub fn create_target(&mut self, name: impl Into<String>, body: TargetBody) -> Result<(), RegistryError> {
        let name = name.into();
        let key = name.to_lowercase();
        if self.targets.contains_key(&key) {
            return Err(RegistryError::DuplicateTarget(name));
        }
        let description = self.pending_description.take();
        self.targets.insert(
            key,
            Target {
                name,
                description,
                hard_dependencies: Vec::new(),
                soft_dependencies: Vec::new(),
                body,
            },
        );
        Ok(())
    }

    /// Registers a target and marks it as a final (always-run) hook, starting deactivated.
    pub fn register_final(&mut self, name: impl Into<String>, body: TargetBody) -> Result<(), RegistryError> {
        let name = name.into();
        let key = name.to_lowercase();
        self.create_target(name, body)?;
        self.final_targets.insert(key, false);
        Ok(())
    }

    /// Registers a target and marks it as a build-failure hook, starting deactivated.
    pub fn register_build_failure(&mut self, name: impl Into<String>, body: TargetBody) -> Result<(), RegistryError> {
        let name = name.into();
        let key = name.to_lowercase();
        self.create_target(name, body)?;
        self.build_failure_targets.insert(key, false);
        Ok(())
    }

    /// Activates a previously registered final-target hook so it runs at the end of the run.
    pub fn activate_final(&mut self, name: &str) -> Result<(), RegistryError> {
        let key = name.to_lowercase();
        match self.final_targets.get_mut(&key) {
            Some(flag) => {
                *flag = true;
                Ok(())
            }
            None => Err(RegistryError::UnknownHook(name.to_string())),
        }
    }

    /// Activates a previously registered build-failure hook so it runs if the build fails.
    pub fn activate_build_failure(&mut self, name: &str) -> Result<(), RegistryError> {
        let key = name.to_lowercase();
        match self.build_failure_targets.get_mut(&key) {
            Some(flag) => {
                *flag = true;
                Ok(())
            }
            None => Err(RegistryError::UnknownHook(name.to_string())),
        }
    }

    /// Creates a reusable template: a set of default dependencies plus a body factory that
    /// takes a single string parameter each time the template is instantiated.
    pub fn create_template<F>(&self, default_dependencies: Vec<String>, body_factory: F) -> Template
    where
        F: Fn(&str) -> TargetBody + Send + Sync + 'static,
    {
        Template {
            default_dependencies,
            body_factory: std::sync::Arc::new(body_factory),
        }
    }

    /// Instantiates a template as a concrete target, wiring up its default dependencies as
    /// hard dependencies of the new target.
    pub fn instantiate_template(
        &mut self,
        template: &Template,
        name: impl Into<String>,
        parameter: &str,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let body = (template.body_factory)(parameter);
        self.create_target(name.clone(), body)?;
        let defaults = template.default_dependencies.clone();
        self.add_hard_dependencies(&name, defaults)
    }

    /// Looks up a target by name, case-insensitively.
    pub fn get_target(&self, name: &str) -> Result<&Target, RegistryError> {
        let key = name.to_lowercase();
        self.targets.get(&key).ok_or_else(|| RegistryError::UnknownTarget {
            name: name.to_string(),
            known: self.list_target_names(),
        })
    }

    /// Lists every registered target's canonical name, in registration order.
    pub fn list_target_names(&self) -> Vec<String> {
        self.targets.values().map(|t| t.name.clone()).collect()
    }

    pub(crate) fn record_executed(&self, name: &str, duration: Duration) {
        let mut state = self.state.lock();
        state.executed.insert(name.to_lowercase());
        state.executed_times.push((name.to_string(), duration));
    }

    pub(crate) fn record_error(&self, name: &str, message: String) {
        self.state.lock().errors.push((name.to_string(), message));
    }

    pub(crate) fn has_errors(&self) -> bool {
        !self.state.lock().errors.is_empty()
    }

    /// The `(target, message)` pairs recorded so far this run, in the order they occurred.
    pub fn errors(&self) -> Vec<(String, String)> {
        self.state.lock().errors.clone()
    }

    /// The set of targets (lowercase-keyed) that have executed so far this run.
    pub fn executed(&self) -> HashSet<String> {
        self.state.lock().executed.clone()
    }

    /// Per-target execution durations, in the order targets finished.
    pub fn executed_times(&self) -> Vec<(String, Duration)> {
        self.state.lock().executed_times.clone()
    }

    pub(crate) fn set_current_target(&self, name: Option<String>) {
        self.state.lock().current_target = name;
    }

    /// The target currently executing, if any. Meaningful only while a run is in progress.
    pub fn current_target(&self) -> Option<String> {
        self.state.lock().current_target.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_body() -> TargetBody {
        Box::new(|| Ok(()))
    }

    #[test]
    fn duplicate_target_registration_is_rejected() {
        let mut registry = TargetRegistry::new();
        registry.create_target("build", ok_body()).unwrap();
        let err = registry.create_target("Build", ok_body()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTarget(_)));
    }

    #[test]
    fn lookup_is_case_insensitive_and_preserves_canonical_casing() {
        let mut registry = TargetRegistry::new();
        registry.create_target("Build", ok_body()).unwrap();
        let target = registry.get_target("BUILD").unwrap();
        assert_eq!(target.name(), "Build");
    }

    #[test]
    fn pending_description_attaches_to_next_target_only() {
        let mut registry = TargetRegistry::new();
        registry.set_description("compiles the project").unwrap();
        registry.create_target("build", ok_body()).unwrap();
        registry.create_target("test", ok_body()).unwrap();
        assert_eq!(registry.get_target("build").unwrap().description(), Some("compiles the project"));
        assert_eq!(registry.get_target("test").unwrap().description(), None);
    }

    #[test]
    fn double_set_description_without_a_target_is_rejected() {
        let mut registry = TargetRegistry::new();
        registry.set_description("first").unwrap();
        let err = registry.set_description("second").unwrap_err();
        assert!(matches!(err, ConfigError::DescriptionAlreadyPending));
    }

    #[test]
    fn activating_an_unknown_hook_is_rejected() {
        let mut registry = TargetRegistry::new();
        let err = registry.activate_final("missing").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownHook(_)));
    }

    #[test]
    fn instantiated_template_hard_depends_on_its_defaults() {
        let mut registry = TargetRegistry::new();
        registry.create_target("compile", ok_body()).unwrap();
        let template = registry.create_template(vec!["compile".to_string()], |parameter: &str| {
            let parameter = parameter.to_string();
            Box::new(move || {
                let _ = &parameter;
                Ok(())
            }) as TargetBody
        });

        registry.instantiate_template(&template, "compileJava", "java").unwrap();

        let target = registry.get_target("compileJava").unwrap();
        assert_eq!(target.hard_dependencies(), &["compile".to_string()]);
    }
}
