//! Backtracker: on a node failure, mark it `Failed`, prune its
//! descendants, then walk ancestors looking for the nearest one with an
//! untried candidate method. The walk is **unbounded** — see `DESIGN.md`'s
//! resolution of the open question about the source's iteration cap.

use crate::graph::{Graph, NodeId, NodeKind, NodeStatus, ROOT};
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacktrackOutcome {
    /// Re-enter this node; it has at least one untried method left.
    Retry(NodeId),
    /// The walk reached the root with no retry candidate anywhere.
    Exhausted,
}

/// Does `id` still have a method candidate it hasn't attempted? Only
/// Task/Goal/Multigoal nodes ever have methods; everything else (Action,
/// the verifiers, Root) returns `false` unconditionally.
fn has_remaining_methods(graph: &Graph, registry: &Registry, id: NodeId) -> bool {
    let Some(node) = graph.get(id) else {
        return false;
    };
    match &node.kind {
        NodeKind::Task { name, next_method, .. } => *next_method < registry.task_methods(name).len(),
        NodeKind::Goal { goal, next_method, .. } => {
            *next_method < registry.goal_methods(&goal.predicate).len()
        }
        NodeKind::Multigoal {
            multigoal,
            next_method,
            ..
        } => multigoal
            .tag
            .as_deref()
            .map(|tag| *next_method < registry.multigoal_methods(tag).len())
            .unwrap_or(false),
        NodeKind::Action { .. }
        | NodeKind::VerifyGoal { .. }
        | NodeKind::VerifyMultigoal { .. }
        | NodeKind::Root => false,
    }
}

/// Mark `failed` and every node above it (up to, but not including, a
/// retry candidate) as `Failed`, pruning descendants at each step, until a
/// Task/Goal/Multigoal ancestor with remaining methods is found or the walk
/// reaches the root.
pub fn mark_failed_and_backtrack(graph: &mut Graph, registry: &Registry, failed: NodeId) -> BacktrackOutcome {
    let mut cursor = failed;
    loop {
        if let Some(node) = graph.get_mut(cursor) {
            node.status = NodeStatus::Failed;
        }
        graph.remove_descendants(cursor);

        if has_remaining_methods(graph, registry, cursor) {
            if let Some(node) = graph.get_mut(cursor) {
                node.status = NodeStatus::Open;
            }
            tracing::debug!(node = cursor.0, "backtrack: retry candidate found");
            return BacktrackOutcome::Retry(cursor);
        }

        match graph.find_predecessor(cursor) {
            Some(parent) => cursor = parent,
            None => {
                if let Some(root) = graph.get_mut(ROOT) {
                    root.status = NodeStatus::NotApplicable;
                }
                tracing::debug!("backtrack: exhausted all ancestors");
                return BacktrackOutcome::Exhausted;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ChildSpec;

    #[test]
    fn retries_failed_node_with_remaining_methods() {
        let mut graph = Graph::new();
        let registry = Registry::builder()
            .register_task_method("t", std::sync::Arc::new(|_, _| None))
            .register_task_method("t", std::sync::Arc::new(|_, _| Some(vec![])))
            .build();
        let ids = graph.add_children(crate::graph::ROOT, vec![ChildSpec::task("t", vec![])], &registry);
        if let crate::graph::NodeKind::Task { next_method, .. } = &mut graph.get_mut(ids[0]).unwrap().kind {
            *next_method = 1;
        }
        let outcome = mark_failed_and_backtrack(&mut graph, &registry, ids[0]);
        assert_eq!(outcome, BacktrackOutcome::Retry(ids[0]));
        assert_eq!(graph.get(ids[0]).unwrap().status, NodeStatus::Open);
    }

    #[test]
    fn exhausts_to_root_when_nothing_left() {
        let mut graph = Graph::new();
        let registry = Registry::builder().build();
        let ids = graph.add_children(crate::graph::ROOT, vec![ChildSpec::action("a", vec![])], &registry);
        let outcome = mark_failed_and_backtrack(&mut graph, &registry, ids[0]);
        assert_eq!(outcome, BacktrackOutcome::Exhausted);
        assert_eq!(graph.get(ROOT).unwrap().status, NodeStatus::NotApplicable);
    }
}
