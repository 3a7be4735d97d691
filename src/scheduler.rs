//! Wave computation: groups a target's effective dependency graph into waves that can run
//! without waiting on one another, in the order they must execute.

use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::error::RegistryError;
use crate::registry::TargetRegistry;
use crate::traversal::visit_dependencies;

/// Computes the run's waves for `root`: each inner `Vec<String>` is a set of target names with
/// no dependency relationship between them, and the outer `Vec` is in execution order — the
/// first wave is the one with no outstanding dependencies (the leaves of the effective graph),
/// and the last wave always contains `root` itself.
pub fn determine_build_order(registry: &TargetRegistry, root: &str) -> Result<Vec<Vec<String>>, RegistryError> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index_of = std::collections::HashMap::new();

    visit_dependencies(registry, root, |parent, name, _edge_kind, _depth, _already_visited| {
        let child_idx = ensure_node(&mut graph, &mut index_of, name);
        if let Some(parent_name) = parent {
            let parent_idx = ensure_node(&mut graph, &mut index_of, parent_name);
            if graph.find_edge(parent_idx, child_idx).is_none() {
                graph.add_edge(parent_idx, child_idx, ());
            }
        }
    })?;

    Ok(peel_into_waves(&graph))
}

fn ensure_node(
    graph: &mut DiGraph<String, ()>,
    index_of: &mut std::collections::HashMap<String, NodeIndex>,
    name: &str,
) -> NodeIndex {
    let key = name.to_lowercase();
    if let Some(&idx) = index_of.get(&key) {
        return idx;
    }
    let idx = graph.add_node(name.to_string());
    index_of.insert(key, idx);
    idx
}

/// Repeatedly peels nodes with no remaining unpeeled outgoing (dependency) edge; each peeling
/// round is one wave. A node's round number is always exactly one greater than the latest round
/// among the nodes it depends on, since it cannot be peeled until all of them have been.
fn peel_into_waves(graph: &DiGraph<String, ()>) -> Vec<Vec<String>> {
    let mut remaining: HashSet<NodeIndex> = graph.node_indices().collect();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
        let mut peelable: Vec<NodeIndex> = remaining
            .iter()
            .copied()
            .filter(|&idx| {
                graph
                    .edges_directed(idx, Direction::Outgoing)
                    .all(|edge| !remaining.contains(&edge.target()))
            })
            .collect();

        // A non-empty effective graph with nothing peelable would mean a cycle survived both
        // admission-time rejection and the traversal's single-visit rule; neither permits one.
        debug_assert!(
            !peelable.is_empty(),
            "no peelable target in a non-empty remaining set; this indicates a cycle escaped admission"
        );
        if peelable.is_empty() {
            break;
        }

        peelable.sort_by(|&a, &b| graph[a].cmp(&graph[b]));
        let wave: Vec<String> = peelable.iter().map(|&idx| graph[idx].clone()).collect();
        for idx in &peelable {
            remaining.remove(idx);
        }
        waves.push(wave);
    }

    waves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetBody;

    fn ok_body() -> TargetBody {
        Box::new(|| Ok(()))
    }

    #[test]
    fn linear_chain_produces_one_wave_per_target_leaf_first() {
        let mut registry = TargetRegistry::new();
        for name in ["a", "b", "c"] {
            registry.create_target(name, ok_body()).unwrap();
        }
        registry.add_hard_dependency_end("a", "b").unwrap();
        registry.add_hard_dependency_end("b", "c").unwrap();

        let waves = determine_build_order(&registry, "a").unwrap();
        assert_eq!(waves, vec![vec!["c".to_string()], vec!["b".to_string()], vec!["a".to_string()]]);
    }

    #[test]
    fn diamond_groups_independent_targets_into_one_wave() {
        let mut registry = TargetRegistry::new();
        for name in ["a", "b1", "b2", "c"] {
            registry.create_target(name, ok_body()).unwrap();
        }
        registry.add_hard_dependency_end("a", "b1").unwrap();
        registry.add_hard_dependency_end("a", "b2").unwrap();
        registry.add_hard_dependency_end("b1", "c").unwrap();
        registry.add_hard_dependency_end("b2", "c").unwrap();

        let waves = determine_build_order(&registry, "a").unwrap();
        assert_eq!(waves.len(), 3);
        assert_eq!(waves[0], vec!["c".to_string()]);
        assert_eq!(waves[1], vec!["b1".to_string(), "b2".to_string()]);
        assert_eq!(waves[2], vec!["a".to_string()]);
    }

    #[test]
    fn activated_soft_edge_orders_targets_that_have_no_hard_relationship() {
        let mut registry = TargetRegistry::new();
        for name in ["a", "b", "x"] {
            registry.create_target(name, ok_body()).unwrap();
        }
        registry.add_hard_dependency_end("a", "b").unwrap();
        registry.add_hard_dependency_end("a", "x").unwrap();
        registry.add_soft_dependency_end("b", "x").unwrap();

        let waves = determine_build_order(&registry, "a").unwrap();
        assert_eq!(waves, vec![vec!["x".to_string()], vec!["b".to_string()], vec!["a".to_string()]]);
    }
}
