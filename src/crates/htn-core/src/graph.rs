//! The Solution Graph: an arena of nodes addressed by integer ids, with
//! parent/child edges expressed purely as ordered successor lists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::goal::{GoalSpec, MultigoalSpec};
use crate::registry::{ChildSpec, Registry};
use crate::state::{FactValue, State};

/// An arena-allocated node id. Ids are never reused even after
/// [`Graph::remove_descendants`] — this keeps `find_predecessor` and
/// `remove_descendants` simple reachability operations with no
/// generation-counter bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

pub const ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Open,
    Closed,
    Failed,
    /// Root only.
    NotApplicable,
}

/// The node's kind and payload as a single tagged sum; every operation
/// dispatches purely on this tag. Task/Goal/Multigoal variants carry
/// `next_method`, a cursor into the registry's ordered method list for
/// that name/predicate/tag, represented as "how many have been tried"
/// rather than a literal remaining-slice, since the registry (not the
/// node) owns the method list and is immutable for the refinement's
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Task {
        name: String,
        args: Vec<FactValue>,
        next_method: usize,
        selected_method: Option<usize>,
    },
    Action {
        name: String,
        args: Vec<FactValue>,
    },
    Goal {
        goal: GoalSpec,
        next_method: usize,
        selected_method: Option<usize>,
    },
    Multigoal {
        multigoal: MultigoalSpec,
        next_method: usize,
        selected_method: Option<usize>,
    },
    VerifyGoal {
        parent: NodeId,
    },
    VerifyMultigoal {
        parent: NodeId,
    },
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Root => "Root",
            NodeKind::Task { .. } => "Task",
            NodeKind::Action { .. } => "Action",
            NodeKind::Goal { .. } => "Goal",
            NodeKind::Multigoal { .. } => "Multigoal",
            NodeKind::VerifyGoal { .. } => "VerifyGoal",
            NodeKind::VerifyMultigoal { .. } => "VerifyMultigoal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub status: NodeStatus,
    pub successors: Vec<NodeId>,
    #[serde(skip)]
    pub saved_state: Option<State>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub duration: Option<i64>,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind) -> Self {
        Node {
            id,
            kind,
            status: NodeStatus::Open,
            successors: Vec::new(),
            saved_state: None,
            start_time: None,
            end_time: None,
            duration: None,
        }
    }
}

/// The solution graph itself: a rooted tree (invariant I1) stored as a
/// `HashMap` keyed by [`NodeId`] rather than a `Vec`, so
/// [`Graph::remove_descendants`] can drop entries outright instead of
/// tombstoning them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl Graph {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(ROOT, Node::new(ROOT, NodeKind::Root));
        Graph { nodes, next_id: 1 }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(id, kind));
        id
    }

    /// Classify each child as Task, Goal, Multigoal, or Action (already
    /// done by the caller via [`ChildSpec`]), allocate a contiguous id
    /// range, link them under `parent_id` in allocation order, and — if
    /// `parent_id` is itself a Goal or Multigoal node — append a trailing
    /// `VerifyGoal`/`VerifyMultigoal` sentinel referencing it.
    pub fn add_children(&mut self, parent_id: NodeId, children: Vec<ChildSpec>, registry: &Registry) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(children.len() + 1);
        for child in children {
            let kind = match child {
                ChildSpec::Task { name, args } => NodeKind::Task {
                    next_method: 0,
                    selected_method: None,
                    name,
                    args,
                },
                ChildSpec::Action { name, args } => NodeKind::Action { name, args },
                ChildSpec::Goal(goal) => NodeKind::Goal {
                    goal,
                    next_method: 0,
                    selected_method: None,
                },
                ChildSpec::Multigoal(multigoal) => NodeKind::Multigoal {
                    multigoal,
                    next_method: 0,
                    selected_method: None,
                },
            };
            let id = self.alloc(kind);
            ids.push(id);
        }

        let parent_kind_is_goal = matches!(
            self.nodes.get(&parent_id).map(|n| &n.kind),
            Some(NodeKind::Goal { .. })
        );
        let parent_kind_is_multigoal = matches!(
            self.nodes.get(&parent_id).map(|n| &n.kind),
            Some(NodeKind::Multigoal { .. })
        );
        if parent_kind_is_goal {
            ids.push(self.alloc(NodeKind::VerifyGoal { parent: parent_id }));
        } else if parent_kind_is_multigoal {
            ids.push(self.alloc(NodeKind::VerifyMultigoal { parent: parent_id }));
        }

        let _ = registry; // classification already happened in ChildSpec; unused here but kept as a parameter for symmetry with call sites that do need it.
        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            parent.successors.extend(ids.iter().copied());
        }
        ids
    }

    /// The first direct successor of `parent_id` whose status is `Open`.
    pub fn find_open_child(&self, parent_id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(&parent_id)?;
        parent
            .successors
            .iter()
            .copied()
            .find(|id| matches!(self.nodes.get(id).map(|n| n.status), Some(NodeStatus::Open)))
    }

    /// Linear scan for the unique parent of `id`. No parent pointer is
    /// cached on `Node` to shortcut this — successors are the only
    /// direction the graph stores.
    pub fn find_predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.successors.contains(&id))
            .map(|(pid, _)| *pid)
    }

    /// Transitively delete every node reachable from `id` via successor
    /// edges, excluding `id` itself. `id`'s own successor list is cleared,
    /// since everything it pointed to is now gone.
    pub fn remove_descendants(&mut self, id: NodeId) {
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(&id)
            .map(|n| n.successors.clone())
            .unwrap_or_default();
        let mut to_remove = Vec::new();
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                stack.extend(node.successors.iter().copied());
            }
            to_remove.push(next);
        }
        for nid in to_remove {
            self.nodes.remove(&nid);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.successors.clear();
        }
    }

    /// Preorder DFS over the tree rooted at `root`, collecting the
    /// `(name, args)` of every `Action` node in execution order.
    pub fn extract_actions(&self, root: NodeId) -> Vec<(String, Vec<FactValue>)> {
        let mut out = Vec::new();
        self.extract_actions_into(root, &mut out);
        out
    }

    fn extract_actions_into(&self, id: NodeId, out: &mut Vec<(String, Vec<FactValue>)>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if let NodeKind::Action { name, args } = &node.kind {
            out.push((name.clone(), args.clone()));
        }
        for &child in &node.successors {
            self.extract_actions_into(child, out);
        }
    }

    /// Sum of `duration` over every `Closed` Action node, in microseconds.
    /// `PlanRecord::planning_duration_ms` is this sum divided by 1000.
    pub fn closed_action_duration_micros(&self) -> i64 {
        self.nodes
            .values()
            .filter_map(|n| match &n.kind {
                NodeKind::Action { .. } if n.status == NodeStatus::Closed => n.duration,
                _ => None,
            })
            .sum()
    }

    /// Debug/visualization rendering of the graph as Graphviz `dot` — a
    /// read-only view, no influence on planning behavior.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph solution {\n");
        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort_by_key(|id| id.0);
        for id in ids {
            let node = &self.nodes[id];
            out.push_str(&format!(
                "  n{} [label=\"{}:{:?}\"];\n",
                id.0,
                node.kind.label(),
                node.status
            ));
            for succ in &node.successors {
                out.push_str(&format!("  n{} -> n{};\n", id.0, succ.0));
            }
        }
        out.push_str("}\n");
        out
    }
}
