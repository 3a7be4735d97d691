//! A single reusable walk over a target's effective dependency graph: the one place that knows
//! how hard and soft edges combine into "what actually needs to happen before this target".

use std::collections::HashSet;

use crate::error::RegistryError;
use crate::registry::TargetRegistry;

/// The kind of edge a traversal step crossed to reach a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Hard,
    Soft,
}

/// Walks the effective dependency graph reachable from `root`.
///
/// A hard edge is always followed. A soft edge is followed only when its target is already
/// reachable from `root` through hard edges alone — a "soft-activated" edge — otherwise it is
/// skipped entirely and never appears in the walk. A soft edge that names the same child as an
/// already-present hard edge from the same parent is skipped as redundant.
///
/// `visit` receives `(parent, name, edge_kind, depth, already_visited)` for every edge crossing
/// attempt, including repeat references to an already-visited node (with `already_visited =
/// true` and no further recursion below it) so a verbose caller can still render the reference.
/// The root itself is reported once with `parent = None`, `edge_kind = None`, `depth = 0`.
pub fn visit_dependencies<F>(registry: &TargetRegistry, root: &str, mut visit: F) -> Result<(), RegistryError>
where
    F: FnMut(Option<&str>, &str, Option<EdgeKind>, usize, bool),
{
    let root_target = registry.get_target(root)?;
    let root_name = root_target.name().to_string();
    let hard_reachable = hard_reachable_set(registry, &root_name)?;

    let mut visited = HashSet::new();
    visit(None, &root_name, None, 0, false);
    visited.insert(root_name.to_lowercase());
    visit_from(registry, &root_name, 1, &hard_reachable, &mut visited, &mut visit)?;
    Ok(())
}

/// Every target reachable from `root` by following hard edges only, including `root` itself.
/// Computed as a pre-pass because soft-edge activation depends on knowing this set in full.
pub(crate) fn hard_reachable_set(registry: &TargetRegistry, root: &str) -> Result<HashSet<String>, RegistryError> {
    let mut reachable = HashSet::new();
    reachable.insert(root.to_lowercase());
    let mut stack = vec![root.to_string()];
    while let Some(name) = stack.pop() {
        let target = registry.get_target(&name)?;
        for child in target.hard_dependencies() {
            if reachable.insert(child.to_lowercase()) {
                stack.push(child.clone());
            }
        }
    }
    Ok(reachable)
}

fn visit_from<F>(
    registry: &TargetRegistry,
    parent: &str,
    depth: usize,
    hard_reachable: &HashSet<String>,
    visited: &mut HashSet<String>,
    visit: &mut F,
) -> Result<(), RegistryError>
where
    F: FnMut(Option<&str>, &str, Option<EdgeKind>, usize, bool),
{
    let target = registry.get_target(parent)?;
    let hard_children = target.hard_dependencies().to_vec();
    let soft_children = target.soft_dependencies().to_vec();

    for child in &hard_children {
        visit_edge(registry, parent, child, EdgeKind::Hard, depth, hard_reachable, visited, visit)?;
    }
    for child in &soft_children {
        if !hard_reachable.contains(&child.to_lowercase()) {
            continue;
        }
        if hard_children.iter().any(|h| h.eq_ignore_ascii_case(child)) {
            continue;
        }
        visit_edge(registry, parent, child, EdgeKind::Soft, depth, hard_reachable, visited, visit)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn visit_edge<F>(
    registry: &TargetRegistry,
    parent: &str,
    child: &str,
    kind: EdgeKind,
    depth: usize,
    hard_reachable: &HashSet<String>,
    visited: &mut HashSet<String>,
    visit: &mut F,
) -> Result<(), RegistryError>
where
    F: FnMut(Option<&str>, &str, Option<EdgeKind>, usize, bool),
{
    let child_target = registry.get_target(child)?;
    let child_name = child_target.name().to_string();
    let already_visited = !visited.insert(child_name.to_lowercase());
    visit(Some(parent), &child_name, Some(kind), depth, already_visited);
    if !already_visited {
        visit_from(registry, &child_name, depth + 1, hard_reachable, visited, visit)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetBody;

    fn ok_body() -> TargetBody {
        Box::new(|| Ok(()))
    }

    #[test]
    fn soft_edge_outside_hard_closure_is_never_visited() {
        let mut registry = TargetRegistry::new();
        for name in ["a", "b", "x"] {
            registry.create_target(name, ok_body()).unwrap();
        }
        registry.add_hard_dependency_end("a", "b").unwrap();
        registry.add_soft_dependency_end("b", "x").unwrap();

        let mut seen = Vec::new();
        visit_dependencies(&registry, "a", |_, name, _, _, _| seen.push(name.to_string())).unwrap();
        assert!(!seen.iter().any(|n| n.eq_ignore_ascii_case("x")));
    }

    #[test]
    fn soft_edge_inside_hard_closure_is_activated() {
        let mut registry = TargetRegistry::new();
        for name in ["a", "b", "x"] {
            registry.create_target(name, ok_body()).unwrap();
        }
        registry.add_hard_dependency_end("a", "b").unwrap();
        registry.add_hard_dependency_end("a", "x").unwrap();
        registry.add_soft_dependency_end("b", "x").unwrap();

        let mut seen = Vec::new();
        visit_dependencies(&registry, "a", |_, name, _, _, _| seen.push(name.to_string())).unwrap();
        assert!(seen.iter().any(|n| n.eq_ignore_ascii_case("x")));
    }
}
