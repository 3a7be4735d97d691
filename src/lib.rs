//! A registry of named build targets linked by hard and soft dependency edges, with a leveling
//! scheduler that groups them into independent waves and a bounded-parallel executor that runs
//! those waves to completion.
//!
//! ```
//! use wavebuild::{RunConfig, TargetRegistry};
//!
//! let mut registry = TargetRegistry::new();
//! registry.create_target("build", Box::new(|| Ok(()))).unwrap();
//! registry.create_target("test", Box::new(|| Ok(()))).unwrap();
//! registry.add_hard_dependency_end("test", "build").unwrap();
//!
//! let waves = wavebuild::determine_build_order(&registry, "test").unwrap();
//! assert_eq!(waves, vec![vec!["build".to_string()], vec!["test".to_string()]]);
//! ```

mod admission;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod reporters;
mod registry;
mod scheduler;
mod target;
mod traversal;

pub use config::RunConfig;
pub use error::{BuildException, ConfigError, ExecutorError, RegistryError, TargetError};
pub use executor::{Executor, RunReport};
pub use registry::{RunOrder, TargetRegistry};
pub use scheduler::determine_build_order;
pub use target::{Target, TargetBody, TargetResult, Template};
pub use traversal::{visit_dependencies, EdgeKind};
