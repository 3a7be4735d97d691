//! Run configuration: the handful of ambient knobs a run reads from the environment, layered
//! under whatever the CLI surface explicitly overrides.

use std::env;

/// Ambient settings for a single [`Executor`](crate::executor::Executor) run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub parallel_jobs: usize,
    pub single_target: bool,
    pub list: bool,
    pub failure_exit_code: i32,
    pub print_stack_trace_on_error: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel_jobs: 1,
            single_target: false,
            list: false,
            failure_exit_code: 42,
            print_stack_trace_on_error: false,
        }
    }
}

impl RunConfig {
    /// Builds a config from well-known environment variables, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(jobs) = env_usize("WAVEBUILD_PARALLEL_JOBS") {
            config.parallel_jobs = jobs.max(1);
        }
        if let Some(flag) = env_bool("WAVEBUILD_SINGLE_TARGET") {
            config.single_target = flag;
        }
        if let Some(flag) = env_bool("WAVEBUILD_LIST") {
            config.list = flag;
        }
        if let Ok(raw) = env::var("WAVEBUILD_FAILURE_EXIT_CODE") {
            if let Ok(code) = raw.parse() {
                config.failure_exit_code = code;
            }
        }
        if let Some(flag) = env_bool("WAVEBUILD_PRINT_STACK_TRACE") {
            config.print_stack_trace_on_error = flag;
        }
        config
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_single_threaded_non_listing_run() {
        let config = RunConfig::default();
        assert_eq!(config.parallel_jobs, 1);
        assert!(!config.single_target);
        assert!(!config.list);
        assert_eq!(config.failure_exit_code, 42);
    }
}
