//! The CLI surface: parses the small set of well-known flags this core recognizes. Anything
//! beyond these flags (per-target arguments, project properties) is out of scope here.

use clap::Parser;

use crate::config::RunConfig;

/// Runs a single registered target, or one of the two introspection modes.
#[derive(Debug, Parser)]
#[command(name = "wavebuild", about = "Run a registered build target")]
pub struct Cli {
    /// The target to run, or one of the well-known meta-target flags
    /// (`--listTargets`/`-lt`, `--dotGraph`/`-dg`) passed as a bare positional value.
    #[arg(allow_hyphen_values = true)]
    pub target: String,

    /// Number of worker threads to use for independent targets within a wave.
    #[arg(short = 'J', long = "parallel-jobs", default_value_t = 1)]
    pub parallel_jobs: usize,

    /// Run only the named target's own body, skipping its dependencies entirely.
    #[arg(long = "single-target")]
    pub single_target: bool,

    /// List every registered target and exit without running anything.
    #[arg(short = 'l', long = "list-targets", visible_alias = "lt")]
    pub list_targets: bool,

    /// Emit a DOT graph of every registered target and exit without running anything.
    #[arg(short = 'd', long = "dot-graph", visible_alias = "dg")]
    pub dot_graph: bool,

    /// Print a stack trace alongside any target-body error.
    #[arg(long = "print-stack-trace")]
    pub print_stack_trace: bool,
}

impl Cli {
    /// Resolves this parse into the effective target name (substituting the introspection
    /// pseudo-targets the executor recognizes) and a [`RunConfig`] layering CLI flags over
    /// whatever the environment already set.
    pub fn into_config_and_target(self) -> (String, RunConfig) {
        let mut config = RunConfig::from_env();
        config.parallel_jobs = config.parallel_jobs.max(self.parallel_jobs).max(1);
        config.single_target |= self.single_target;
        config.list |= self.list_targets;
        config.print_stack_trace_on_error |= self.print_stack_trace;

        let target = if self.dot_graph {
            crate::executor::DOT_GRAPH_FLAGS[0].to_string()
        } else if self.list_targets {
            crate::executor::LIST_TARGETS_FLAGS[0].to_string()
        } else {
            self.target
        };
        (target, config)
    }
}
