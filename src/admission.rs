//! Dependency admission: adding hard/soft edges, rejecting same-kind cycles at the moment an
//! edge is added rather than at traversal time.

use std::collections::HashMap;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::RegistryError;
use crate::registry::TargetRegistry;
use crate::traversal::EdgeKind;

impl TargetRegistry {
    /// Adds `child` to the end of `parent`'s hard dependency list.
    pub fn add_hard_dependency_end(&mut self, parent: &str, child: &str) -> Result<(), RegistryError> {
        self.add_hard_dependency(parent, child, true)
    }

    /// Adds `child` to the front of `parent`'s hard dependency list.
    pub fn add_hard_dependency_front(&mut self, parent: &str, child: &str) -> Result<(), RegistryError> {
        self.add_hard_dependency(parent, child, false)
    }

    fn add_hard_dependency(&mut self, parent: &str, child: &str, at_end: bool) -> Result<(), RegistryError> {
        self.get_target(parent)?;
        self.get_target(child)?;
        if self.would_cycle(EdgeKind::Hard, parent, child) {
            return Err(RegistryError::CyclicDependency {
                parent: parent.to_string(),
                child: child.to_string(),
                kind: "hard",
            });
        }
        let key = parent.to_lowercase();
        let target = self.targets.get_mut(&key).expect("parent existence checked above");
        if at_end {
            target.hard_dependencies.push(child.to_string());
        } else {
            target.hard_dependencies.insert(0, child.to_string());
        }
        Ok(())
    }

    /// Adds `child` to the end of `parent`'s soft dependency list.
    pub fn add_soft_dependency_end(&mut self, parent: &str, child: &str) -> Result<(), RegistryError> {
        self.get_target(parent)?;
        self.get_target(child)?;
        if self.would_cycle(EdgeKind::Soft, parent, child) {
            return Err(RegistryError::CyclicDependency {
                parent: parent.to_string(),
                child: child.to_string(),
                kind: "soft",
            });
        }
        let key = parent.to_lowercase();
        self.targets
            .get_mut(&key)
            .expect("parent existence checked above")
            .soft_dependencies
            .push(child.to_string());
        Ok(())
    }

    /// Adds each of `children` as a hard dependency of `parent`, in order.
    pub fn add_hard_dependencies<S: AsRef<str>>(
        &mut self,
        parent: &str,
        children: impl IntoIterator<Item = S>,
    ) -> Result<(), RegistryError> {
        for child in children {
            self.add_hard_dependency_end(parent, child.as_ref())?;
        }
        Ok(())
    }

    /// Adds each of `children` as a soft dependency of `parent`, in order.
    pub fn add_soft_dependencies<S: AsRef<str>>(
        &mut self,
        parent: &str,
        children: impl IntoIterator<Item = S>,
    ) -> Result<(), RegistryError> {
        for child in children {
            self.add_soft_dependency_end(parent, child.as_ref())?;
        }
        Ok(())
    }

    /// Whether adding a `kind` edge `parent -> child` would close a cycle among edges of that
    /// same kind. Hard and soft edges are checked independently: a soft edge back along a path
    /// of only hard edges is not itself a cycle within the soft graph.
    fn would_cycle(&self, kind: EdgeKind, parent: &str, child: &str) -> bool {
        if parent.eq_ignore_ascii_case(child) {
            return true;
        }
        let (graph, index) = self.build_kind_graph(kind);
        match (index.get(&child.to_lowercase()), index.get(&parent.to_lowercase())) {
            (Some(&child_idx), Some(&parent_idx)) => has_path_connecting(&graph, child_idx, parent_idx, None),
            _ => false,
        }
    }

    fn build_kind_graph(&self, kind: EdgeKind) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for key in self.targets.keys() {
            let idx = graph.add_node(key.clone());
            index.insert(key.clone(), idx);
        }
        for (key, target) in &self.targets {
            let deps: &[String] = match kind {
                EdgeKind::Hard => &target.hard_dependencies,
                EdgeKind::Soft => &target.soft_dependencies,
            };
            let from = index[key];
            for dep in deps {
                if let Some(&to) = index.get(&dep.to_lowercase()) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        (graph, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_body() -> crate::target::TargetBody {
        Box::new(|| Ok(()))
    }

    fn registry_with(names: &[&str]) -> TargetRegistry {
        let mut registry = TargetRegistry::new();
        for name in names {
            registry.create_target(*name, ok_body()).unwrap();
        }
        registry
    }

    #[test]
    fn direct_hard_cycle_is_rejected() {
        let mut registry = registry_with(&["a", "b"]);
        registry.add_hard_dependency_end("a", "b").unwrap();
        let err = registry.add_hard_dependency_end("b", "a").unwrap_err();
        assert!(matches!(err, RegistryError::CyclicDependency { kind: "hard", .. }));
    }

    #[test]
    fn indirect_hard_cycle_is_rejected() {
        let mut registry = registry_with(&["a", "b", "c"]);
        registry.add_hard_dependency_end("a", "b").unwrap();
        registry.add_hard_dependency_end("b", "c").unwrap();
        let err = registry.add_hard_dependency_end("c", "a").unwrap_err();
        assert!(matches!(err, RegistryError::CyclicDependency { kind: "hard", .. }));
    }

    #[test]
    fn self_dependency_is_rejected() {
        let mut registry = registry_with(&["a"]);
        let err = registry.add_hard_dependency_end("a", "a").unwrap_err();
        assert!(matches!(err, RegistryError::CyclicDependency { .. }));
    }

    #[test]
    fn hard_and_soft_cycle_checks_are_independent() {
        let mut registry = registry_with(&["a", "b"]);
        registry.add_hard_dependency_end("a", "b").unwrap();
        // A soft edge back along a path of purely hard edges is not a soft-graph cycle.
        registry.add_soft_dependency_end("b", "a").unwrap();
    }

    #[test]
    fn dependency_on_unknown_target_is_rejected() {
        let mut registry = registry_with(&["a"]);
        let err = registry.add_hard_dependency_end("a", "ghost").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTarget { .. }));
    }
}
