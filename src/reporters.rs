//! Text and DOT renderings of the registry and of a finished run: the dependency graph, the
//! target listing, the running order, the time summary, and the error summary.

use std::time::Duration;

use colored::Colorize;

use crate::error::RegistryError;
use crate::registry::{RunOrder, TargetRegistry};
use crate::traversal::{visit_dependencies, EdgeKind};

/// A one-line-per-edge rendering of the effective dependency graph reachable from `root`,
/// collapsing repeat references to an already-printed target to a single line with no further
/// expansion below it.
pub fn shortened_graph(registry: &TargetRegistry, root: &str) -> Result<String, RegistryError> {
    graph_text(registry, root, false)
}

/// As [`shortened_graph`], but expands every reference to a target in full, every time it is
/// reached, even if already printed once.
pub fn verbose_graph(registry: &TargetRegistry, root: &str) -> Result<String, RegistryError> {
    graph_text(registry, root, true)
}

fn graph_text(registry: &TargetRegistry, root: &str, verbose: bool) -> Result<String, RegistryError> {
    let mut lines = Vec::new();
    visit_dependencies(registry, root, |parent, name, edge_kind, depth, already_visited| {
        if already_visited && !verbose {
            return;
        }
        if parent.is_none() {
            lines.push(name.to_string());
            return;
        }
        let arrow = match edge_kind {
            Some(EdgeKind::Hard) => "<==",
            Some(EdgeKind::Soft) => "<=?",
            None => "<--",
        };
        let indent = "  ".repeat(depth);
        lines.push(format!("{indent}{arrow} {name}"));
    })?;
    Ok(lines.join("\n"))
}

/// Every registered target and its dependency edges as a `dot` source, suitable for piping to
/// `dot -Tpng`. Hard edges are solid, soft edges dotted.
pub fn dot_graph(registry: &TargetRegistry) -> String {
    let mut out = String::from("digraph G {\n  rankdir=TB;\n  node [shape=box];\n");
    for name in registry.list_target_names() {
        out.push_str(&format!("  \"{name}\";\n"));
    }
    for name in registry.list_target_names() {
        if let Ok(target) = registry.get_target(&name) {
            for dep in target.hard_dependencies() {
                out.push_str(&format!("  \"{name}\" -> \"{dep}\";\n"));
            }
            for dep in target.soft_dependencies() {
                out.push_str(&format!("  \"{name}\" -> \"{dep}\" [style=dotted];\n"));
            }
        }
    }
    out.push_str("}\n");
    out
}

/// One line per registered target, in registration order, with its description if it has one.
pub fn list_targets(registry: &TargetRegistry) -> String {
    registry
        .list_target_names()
        .into_iter()
        .map(|name| {
            let description = registry
                .get_target(&name)
                .ok()
                .and_then(|t| t.description().map(str::to_string));
            match description {
                Some(d) => format!("{name} - {d}"),
                None => name,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the order a run is about to execute in (or just executed in), as recorded on the
/// registry's `current_order`.
pub fn running_order(registry: &TargetRegistry) -> String {
    match &registry.current_order {
        None => String::new(),
        Some(RunOrder::Serial(names)) => names.join(", "),
        Some(RunOrder::Parallel(waves)) => waves
            .iter()
            .enumerate()
            .map(|(i, wave)| format!("Group - {}: {}", i + 1, wave.join(", ")))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Per-target execution durations plus the run's total wall time and overall status.
pub fn time_summary(registry: &TargetRegistry, total: Duration) -> String {
    let times = registry.executed_times();
    let width = times
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0)
        .max("Total".len());

    let mut out = String::new();
    for (name, duration) in &times {
        out.push_str(&format!("{name:<width$}   {:.3}s\n", duration.as_secs_f64(), width = width));
    }
    out.push_str(&format!("{:<width$}   {:.3}s\n", "Total", total.as_secs_f64(), width = width));
    out.push_str(&if registry.errors().is_empty() {
        "Status: Ok".to_string()
    } else {
        format!("Status: {}", "Failure".red())
    });
    out
}

/// One numbered line per recorded `(target, message)` error pair, in the order they occurred.
pub fn error_summary(registry: &TargetRegistry) -> String {
    registry
        .errors()
        .iter()
        .enumerate()
        .map(|(i, (target, message))| format!("{}. [{target}] {message}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetBody;

    fn ok_body() -> TargetBody {
        Box::new(|| Ok(()))
    }

    #[test]
    fn list_targets_includes_description_when_present() {
        let mut registry = TargetRegistry::new();
        registry.set_description("builds everything").unwrap();
        registry.create_target("build", ok_body()).unwrap();
        registry.create_target("clean", ok_body()).unwrap();
        let listing = list_targets(&registry);
        assert_eq!(listing, "build - builds everything\nclean");
    }

    #[test]
    fn shortened_graph_marks_hard_and_soft_edges_distinctly() {
        let mut registry = TargetRegistry::new();
        for name in ["a", "b", "x"] {
            registry.create_target(name, ok_body()).unwrap();
        }
        registry.add_hard_dependency_end("a", "b").unwrap();
        registry.add_hard_dependency_end("a", "x").unwrap();
        registry.add_soft_dependency_end("b", "x").unwrap();

        let text = shortened_graph(&registry, "a").unwrap();
        assert!(text.contains("<== b"));
        assert!(text.contains("<=? x") || text.contains("<== x"));
    }

    #[test]
    fn dot_graph_emits_one_node_per_target_and_one_edge_per_dependency() {
        let mut registry = TargetRegistry::new();
        for name in ["a", "b", "x"] {
            registry.create_target(name, ok_body()).unwrap();
        }
        registry.add_hard_dependency_end("a", "b").unwrap();
        registry.add_soft_dependency_end("a", "x").unwrap();

        let dot = dot_graph(&registry);

        assert_eq!(dot.matches('{').count(), 1);
        assert_eq!(dot.matches('}').count(), 1);
        for name in ["a", "b", "x"] {
            let node_line = format!("\"{name}\";");
            assert_eq!(
                dot.lines().filter(|line| line.trim() == node_line).count(),
                1,
                "exactly one node line for `{name}`"
            );
        }
        assert!(dot.contains("\"a\" -> \"b\";"));
        assert!(dot.contains("\"a\" -> \"x\" [style=dotted];"));
        assert_eq!(dot.lines().filter(|line| line.contains("->")).count(), 2);
    }
}
