//! The run loop: resolves the effective build order for a target, runs it wave by wave with a
//! bounded worker pool, then always runs final targets (and, on failure, build-failure targets).

use std::time::Instant;

use itertools::Itertools;
use rayon::ThreadPoolBuilder;

use crate::config::RunConfig;
use crate::error::{ConfigError, ExecutorError, TargetError};
use crate::logging::BuildEventSink;
use crate::registry::{RunOrder, TargetRegistry};
use crate::reporters;
use crate::scheduler::determine_build_order;
use crate::target::Target;

/// Pseudo-target names recognized instead of a real target, to emit a DOT graph and exit.
pub const DOT_GRAPH_FLAGS: [&str; 2] = ["--dotGraph", "-dg"];
/// Pseudo-target names recognized instead of a real target, to list all targets and exit.
pub const LIST_TARGETS_FLAGS: [&str; 2] = ["--listTargets", "-lt"];

/// The outcome of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub exit_code: i32,
}

/// Drives a single run of the registry against a requested target.
pub struct Executor<'s> {
    config: RunConfig,
    sink: &'s dyn BuildEventSink,
}

impl<'s> Executor<'s> {
    pub fn new(config: RunConfig, sink: &'s dyn BuildEventSink) -> Self {
        Self { config, sink }
    }

    /// Runs `target_name` to completion: admits no new edges, computes the wave order, executes
    /// it (serially, or across a bounded worker pool when `parallel_jobs > 1`), then always runs
    /// activated final targets and, if any error was recorded, activated build-failure targets.
    pub fn run(&self, registry: &mut TargetRegistry, target_name: &str) -> Result<RunReport, ExecutorError> {
        if DOT_GRAPH_FLAGS.contains(&target_name) {
            self.sink.log(&reporters::dot_graph(registry));
            return Ok(RunReport { exit_code: 0 });
        }
        if LIST_TARGETS_FLAGS.contains(&target_name) || self.config.list {
            self.sink.log(&reporters::list_targets(registry));
            return Ok(RunReport { exit_code: 0 });
        }
        if registry.pending_description.is_some() {
            return Err(ExecutorError::Config(ConfigError::DescriptionWithoutTarget));
        }

        let start = Instant::now();
        self.sink.trace_header(&format!("Dependency graph for {target_name}"));
        self.sink.trace(&reporters::shortened_graph(registry, target_name)?);

        let waves = determine_build_order(registry, target_name)?;

        if self.config.single_target {
            let name = registry.get_target(target_name)?.name().to_string();
            registry.current_order = Some(RunOrder::Serial(vec![name.clone()]));
            self.sink.log(&reporters::running_order(registry));
            let registry_ref: &TargetRegistry = registry;
            if let Ok(target) = registry_ref.get_target(&name) {
                self.run_single_target(registry_ref, target);
            }
        } else if self.config.parallel_jobs > 1 {
            registry.current_order = Some(RunOrder::Parallel(waves.clone()));
            self.sink.log(&reporters::running_order(registry));
            self.run_waves_parallel(registry, &waves);
        } else {
            let flat: Vec<String> = waves.into_iter().flatten().collect();
            registry.current_order = Some(RunOrder::Serial(flat.clone()));
            self.sink.log(&reporters::running_order(registry));
            for name in &flat {
                if let Ok(target) = registry.get_target(name) {
                    self.run_single_target(registry, target);
                }
            }
        }

        let had_errors = registry.has_errors();
        if had_errors {
            self.run_build_failure_targets(registry);
        }
        self.run_final_targets(registry);
        self.sink.kill_all_created_processes();
        self.sink.close_all_open_tags();

        self.sink.log(&reporters::time_summary(registry, start.elapsed()));
        if had_errors {
            self.sink.trace_important("Build finished with errors:");
            self.sink.log(&reporters::error_summary(registry));
        }

        Ok(RunReport {
            exit_code: if had_errors { self.config.failure_exit_code } else { 0 },
        })
    }

    fn run_waves_parallel(&self, registry: &TargetRegistry, waves: &[Vec<String>]) {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.parallel_jobs)
            .build()
            .expect("failed to build the worker pool");

        for wave in waves {
            pool.scope(|scope| {
                for name in wave {
                    let name = name.clone();
                    scope.spawn(move |_| {
                        if let Ok(target) = registry.get_target(&name) {
                            self.run_single_target(registry, target);
                        }
                    });
                }
            });
        }
    }

    fn run_single_target(&self, registry: &TargetRegistry, target: &Target) {
        if registry.has_errors() {
            // Fail-fast: a wave already in flight finishes, but no further target body starts.
            return;
        }
        let dependency_list = target
            .hard_dependencies()
            .iter()
            .chain(target.soft_dependencies())
            .join(", ");
        self.execute_target(registry, target, &dependency_list);
    }

    fn run_final_targets(&self, registry: &TargetRegistry) {
        let keys: Vec<String> = registry
            .final_targets
            .iter()
            .filter(|&(_, &active)| active)
            .map(|(key, _)| key.clone())
            .collect();
        for key in keys {
            if let Ok(target) = registry.get_target(&key) {
                self.execute_target(registry, target, "");
            }
        }
    }

    fn run_build_failure_targets(&self, registry: &TargetRegistry) {
        let keys: Vec<String> = registry
            .build_failure_targets
            .iter()
            .filter(|&(_, &active)| active)
            .map(|(key, _)| key.clone())
            .collect();
        for key in keys {
            if let Ok(target) = registry.get_target(&key) {
                self.execute_target(registry, target, "");
            }
        }
    }

    fn execute_target(&self, registry: &TargetRegistry, target: &Target, dependency_list: &str) {
        registry.set_current_target(Some(target.name().to_string()));
        self.sink.trace_start_target(target.name(), target.description(), dependency_list);

        let start = Instant::now();
        let result = target.invoke();
        let elapsed = start.elapsed();

        registry.record_executed(target.name(), elapsed);
        self.sink.trace_end_target(target.name());
        registry.set_current_target(None);

        if let Err(err) = result {
            self.record_target_error(registry, target.name(), err.as_ref());
        }
    }

    fn record_target_error(&self, registry: &TargetRegistry, name: &str, err: &dyn TargetError) {
        registry.record_error(name, err.to_string());
        if let Some(subs) = err.sub_messages() {
            for sub in subs {
                registry.record_error(name, sub);
            }
        }
        self.sink.trace_error(&err.to_string());
        if self.config.print_stack_trace_on_error {
            self.sink.trace(&format!("{:?}", std::backtrace::Backtrace::force_capture()));
        }
        if !err.is_failed_tests() {
            self.sink.send_vendor_error(&err.to_string());
        }
    }
}
