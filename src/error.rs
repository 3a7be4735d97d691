//! Error families the core distinguishes: admission, configuration, and target-body errors.

use std::fmt;

/// Errors raised synchronously by the [`TargetRegistry`](crate::registry::TargetRegistry),
/// never placed into the run's accumulated `errors`.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("No target named `{name}` found in registry. Known targets: {}", known.join(", "))]
    UnknownTarget { name: String, known: Vec<String> },

    #[error("Target `{0}` is already registered")]
    DuplicateTarget(String),

    #[error(
        "Cyclic {kind} dependency: adding `{parent}` -> `{child}` would make `{child}` \
         transitively {kind}-depend on `{parent}`"
    )]
    CyclicDependency {
        parent: String,
        child: String,
        kind: &'static str,
    },

    #[error("Hook target `{0}` is not registered")]
    UnknownHook(String),
}

/// Configuration errors: authoring mistakes around the one-shot description slot.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("A description was already set and is pending attachment to a target")]
    DescriptionAlreadyPending,

    #[error("A description was set but no target was created to attach it to before the run started")]
    DescriptionWithoutTarget,
}

/// The top-level error an [`Executor`](crate::executor::Executor) run can fail with before any
/// target body ever executes. Target-body failures are never surfaced this way; they are
/// accumulated (see [`TargetRegistry::errors`](crate::registry::TargetRegistry::errors)).
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Trait every error a target body can return must implement.
///
/// A plain error only needs `std::error::Error`; `sub_messages` and `is_failed_tests` let a
/// target body opt into the two special shapes recognized at execution time (§7 of the design
/// spec): a structured multi-message build exception, and a "failed tests" exception whose
/// sub-messages are recorded without re-notifying the vendor error sink.
pub trait TargetError: std::error::Error + Send + Sync + 'static {
    /// Additional messages to record alongside the top-level message, in order.
    fn sub_messages(&self) -> Option<Vec<String>> {
        None
    }

    /// Whether this error originated from a recognized test-runner failure. Such errors are
    /// still recorded, but the vendor error sink is not notified a second time.
    fn is_failed_tests(&self) -> bool {
        false
    }
}

/// A ready-to-use error shape covering the three kinds §7 calls out: a single message, a
/// top-level message with sub-messages, and a failed-tests report.
#[derive(Debug)]
pub enum BuildException {
    Simple(String),
    Multi(String, Vec<String>),
    FailedTests(Vec<String>),
}

impl fmt::Display for BuildException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildException::Simple(msg) => write!(f, "{msg}"),
            BuildException::Multi(msg, _) => write!(f, "{msg}"),
            BuildException::FailedTests(msgs) => write!(f, "{} test(s) failed", msgs.len()),
        }
    }
}

impl std::error::Error for BuildException {}

impl TargetError for BuildException {
    fn sub_messages(&self) -> Option<Vec<String>> {
        match self {
            BuildException::Multi(_, subs) => Some(subs.clone()),
            BuildException::FailedTests(msgs) => Some(msgs.clone()),
            BuildException::Simple(_) => None,
        }
    }

    fn is_failed_tests(&self) -> bool {
        matches!(self, BuildException::FailedTests(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_exception_reports_sub_messages() {
        let err = BuildException::Multi("top".into(), vec!["a".into(), "b".into()]);
        assert_eq!(err.sub_messages(), Some(vec!["a".to_string(), "b".to_string()]));
        assert!(!err.is_failed_tests());
    }

    #[test]
    fn failed_tests_exception_is_flagged() {
        let err = BuildException::FailedTests(vec!["test_a".into()]);
        assert!(err.is_failed_tests());
        assert_eq!(err.sub_messages(), Some(vec!["test_a".to_string()]));
    }
}
