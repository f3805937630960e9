//! Refinement Engine: the single-threaded, deterministic search loop over
//! the solution graph.

use std::sync::Arc;

use uuid::Uuid;

use crate::backtrack::{self, BacktrackOutcome};
use crate::error::{PlannerError, Result};
use crate::goal::{GoalSpec, MultigoalSpec};
use crate::graph::{Graph, NodeId, NodeKind, NodeStatus, ROOT};
use crate::outcome::{Outcome, OutcomeReporter, OutcomeSubscriber};
use crate::plan::{ActionRecord, ExecutionStatus, PlanOptions, PlanRecord};
use crate::registry::{ChildSpec, GoalMethodFn, MultigoalMethodFn, Registry, TaskMethodFn};
use crate::state::{FactValue, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Done,
}

/// An untyped `(name, args)` pair as it arrives from a caller that hasn't
/// resolved it against the registry yet (see [`ChildSpec::classify`]).
pub type InitialTask = (String, Vec<FactValue>);

/// The top-level planner entry point: `(Registry, InitialState,
/// InitialTaskList)` plus an options bundle, producing a Plan Record or an
/// error. Unlike [`Engine::new`] (which takes pre-classified [`ChildSpec`]s
/// for callers that already have them), this resolves each initial task
/// name against `registry` up front and returns [`PlannerError::UnknownName`]
/// synchronously if any name matches none of the registry's tables — the
/// one setup failure allowed to surface outside the backtracking loop,
/// since it indicates a misconfigured registry rather than a recoverable
/// planning failure.
pub fn run_refinement(
    plan_id: impl Into<String>,
    registry: Arc<Registry>,
    initial_state: State,
    initial_tasks: Vec<InitialTask>,
    options: PlanOptions,
) -> Result<PlanRecord> {
    let mut children = Vec::with_capacity(initial_tasks.len());
    for (name, args) in initial_tasks {
        let spec = ChildSpec::classify(&registry, &name, args)
            .ok_or_else(|| PlannerError::UnknownName(name.clone()))?;
        children.push(spec);
    }
    let mut engine = Engine::new(plan_id, registry, initial_state, children);
    Ok(engine.run(options))
}

/// Owns the state, graph, and blacklist exclusively for the lifetime of a
/// single refinement call — no other activity mutates them concurrently.
pub struct Engine {
    graph: Graph,
    registry: Arc<Registry>,
    state: State,
    frontier: NodeId,
    blacklist: Vec<(String, Vec<FactValue>)>,
    reporter: OutcomeReporter,
    iterations: u64,
    failure_reason: Option<String>,
    retry_pending: bool,
}

impl Engine {
    /// `initial_tasks` become the root node's children, already classified
    /// as [`ChildSpec`]s by the caller (use [`ChildSpec::classify`] against
    /// `registry` first if starting from untyped names).
    pub fn new(plan_id: impl Into<String>, registry: Arc<Registry>, initial_state: State, initial_tasks: Vec<ChildSpec>) -> Engine {
        let plan_id = plan_id.into();
        let mut graph = Graph::new();
        graph.add_children(ROOT, initial_tasks, &registry);
        Engine {
            graph,
            registry,
            state: initial_state,
            frontier: ROOT,
            blacklist: Vec::new(),
            reporter: OutcomeReporter::new(plan_id),
            iterations: 0,
            failure_reason: None,
            retry_pending: false,
        }
    }

    /// The blacklist is owned by the refinement call; callers add to it
    /// between `step` calls, e.g. in response to an outcome event.
    pub fn blacklist_mut(&mut self) -> &mut Vec<(String, Vec<FactValue>)> {
        &mut self.blacklist
    }

    pub fn subscribe(&self) -> OutcomeSubscriber {
        self.reporter.subscribe()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Drive the loop to quiescence and produce the Plan Record.
    pub fn run(&mut self, options: PlanOptions) -> PlanRecord {
        while let StepOutcome::Continue = self.step() {}
        self.finish(options)
    }

    /// A thin blocking wrapper for async hosts that want the CPU-bound loop
    /// off the executor's worker thread — the loop itself has no `.await`
    /// points, since handlers are expected to run synchronously.
    pub async fn run_blocking(mut self, options: PlanOptions) -> PlanRecord {
        tokio::task::spawn_blocking(move || {
            let record = self.run(options);
            record
        })
        .await
        .expect("refinement task panicked")
    }

    /// The execution status implied by the engine's current state: root
    /// still unvisited means `Planned`, root closed or marked not
    /// applicable means a terminal status, and otherwise it's either
    /// `Pending` (a failed branch was just backtracked past and the next
    /// `step` will resume at the retry point) or plain `Executing`.
    fn current_status(&self) -> ExecutionStatus {
        match self.graph.get(ROOT).map(|n| n.status) {
            Some(NodeStatus::NotApplicable) => ExecutionStatus::Failed,
            Some(NodeStatus::Closed) => ExecutionStatus::Completed,
            _ if self.iterations == 0 => ExecutionStatus::Planned,
            _ if self.retry_pending => ExecutionStatus::Pending,
            _ => ExecutionStatus::Executing,
        }
    }

    fn build_record(&self, options: PlanOptions, execution_status: ExecutionStatus) -> PlanRecord {
        let solution_plan: Vec<ActionRecord> = self
            .graph
            .extract_actions(ROOT)
            .into_iter()
            .map(|(action, args)| ActionRecord { action, args })
            .collect();
        let duration_us = self.graph.closed_action_duration_micros();
        PlanRecord {
            id: Uuid::new_v4().to_string(),
            name: options.name,
            persona_id: options.persona_id,
            domain_type: options.domain_type,
            execution_status,
            run_lazy: options.run_lazy,
            solution_plan,
            planning_duration_ms: duration_us / 1_000,
            failure_reason: self.failure_reason.clone(),
            iterations: self.iterations,
            final_state: self.state.deep_copy(),
            final_graph: self.graph.clone(),
        }
    }

    fn finish(&self, options: PlanOptions) -> PlanRecord {
        self.build_record(options, self.current_status())
    }

    /// A Plan Record reflecting the engine's state right now, usable
    /// between `step` calls by a host that wants to report progress —
    /// `run`/`run_blocking` only ever hand back the terminal record from
    /// [`Engine::finish`].
    pub fn snapshot(&self, options: &PlanOptions) -> PlanRecord {
        self.build_record(options.clone(), self.current_status())
    }

    /// One step of the refinement loop: dispatch the current frontier's
    /// leftmost open child, or backtrack if none remains.
    pub fn step(&mut self) -> StepOutcome {
        self.iterations += 1;

        let Some(open) = self.graph.find_open_child(self.frontier) else {
            if self.frontier == ROOT {
                return StepOutcome::Done;
            }
            self.frontier = self.graph.find_predecessor(self.frontier).unwrap_or(ROOT);
            return StepOutcome::Continue;
        };
        self.retry_pending = false;

        match self.graph.get(open).and_then(|n| n.saved_state.clone()) {
            Some(saved) => self.state = saved,
            None => {
                let snapshot = self.state.deep_copy();
                if let Some(node) = self.graph.get_mut(open) {
                    node.saved_state = Some(snapshot);
                }
            }
        }

        let kind = self.graph.get(open).expect("just looked up").kind.clone();
        tracing::trace!(node = open.0, kind = kind.label(), "dispatch");
        match kind {
            NodeKind::Task {
                name,
                args,
                next_method,
                ..
            } => self.dispatch_task(open, name, args, next_method),
            NodeKind::Action { name, args } => self.dispatch_action(open, name, args),
            NodeKind::Goal {
                goal, next_method, ..
            } => self.dispatch_goal(open, goal, next_method),
            NodeKind::Multigoal {
                multigoal,
                next_method,
                ..
            } => self.dispatch_multigoal(open, multigoal, next_method),
            NodeKind::VerifyGoal { parent } => self.dispatch_verify_goal(open, parent),
            NodeKind::VerifyMultigoal { parent } => self.dispatch_verify_multigoal(open, parent),
            NodeKind::Root => self.backtrack(open),
        }
        StepOutcome::Continue
    }

    fn dispatch_task(&mut self, id: NodeId, name: String, args: Vec<FactValue>, start_method: usize) {
        let methods: Vec<TaskMethodFn> = self.registry.task_methods(&name).to_vec();
        let mut idx = start_method;
        while idx < methods.len() {
            let method = methods[idx].clone();
            idx += 1;
            if let Some(children) = method(&self.state, &args) {
                self.close_and_expand(id, children, idx, Some(idx - 1));
                return;
            }
        }
        self.set_method_cursor(id, idx, None);
        self.backtrack(id);
    }

    fn dispatch_goal(&mut self, id: NodeId, goal: GoalSpec, start_method: usize) {
        if goal.is_satisfied(&self.state) {
            self.close_and_expand(id, vec![], start_method, None);
            return;
        }
        let methods: Vec<GoalMethodFn> = self.registry.goal_methods(&goal.predicate).to_vec();
        let mut idx = start_method;
        while idx < methods.len() {
            let method = methods[idx].clone();
            idx += 1;
            if let Some(children) = method(&self.state, &goal) {
                self.close_and_expand(id, children, idx, Some(idx - 1));
                return;
            }
        }
        self.set_method_cursor(id, idx, None);
        self.backtrack(id);
    }

    fn dispatch_multigoal(&mut self, id: NodeId, multigoal: MultigoalSpec, start_method: usize) {
        if multigoal.unsatisfied(&self.state).is_empty() {
            self.close_and_expand(id, vec![], start_method, None);
            return;
        }
        let Some(tag) = multigoal.tag.clone() else {
            self.backtrack(id);
            return;
        };
        let methods: Vec<MultigoalMethodFn> = self.registry.multigoal_methods(&tag).to_vec();
        let mut idx = start_method;
        while idx < methods.len() {
            let method = methods[idx].clone();
            idx += 1;
            if let Some(children) = method(&self.state, &multigoal) {
                self.close_and_expand(id, children, idx, Some(idx - 1));
                return;
            }
        }
        self.set_method_cursor(id, idx, None);
        self.backtrack(id);
    }

    fn dispatch_action(&mut self, id: NodeId, name: String, args: Vec<FactValue>) {
        if self.blacklist.iter().any(|(n, a)| n == &name && a == &args) {
            tracing::debug!(action = %name, "action blacklisted, backtracking");
            self.reporter.emit(
                name,
                args,
                self.state.current_time(),
                self.state.current_time(),
                Outcome::Failure("blacklisted".to_string()),
            );
            self.backtrack(id);
            return;
        }

        let Some(handler) = self.registry.action(&name).cloned() else {
            self.failure_reason = Some(format!("action '{name}' is not registered"));
            self.backtrack(id);
            return;
        };

        let start_time = self.state.current_time();
        match handler(&self.state, &args) {
            Ok((new_state, duration)) => {
                let end_time = start_time + duration;
                self.state = new_state;
                self.state.set_current_time(end_time);
                if let Some(node) = self.graph.get_mut(id) {
                    node.status = NodeStatus::Closed;
                    node.start_time = Some(start_time);
                    node.end_time = Some(end_time);
                    node.duration = Some(duration);
                }
                self.reporter.emit(name, args, start_time, end_time, Outcome::Success);
                // Frontier unchanged: siblings of this action are still to do.
            }
            Err(reason) => {
                self.reporter.emit(
                    name.clone(),
                    args.clone(),
                    start_time,
                    start_time,
                    Outcome::Failure(reason.clone()),
                );
                self.failure_reason = Some(format!("action '{name}' failed: {reason}"));
                self.backtrack(id);
            }
        }
    }

    fn dispatch_verify_goal(&mut self, id: NodeId, parent: NodeId) {
        let satisfied = match self.graph.get(parent).map(|n| &n.kind) {
            Some(NodeKind::Goal { goal, .. }) => goal.is_satisfied(&self.state),
            _ => false,
        };
        if satisfied {
            if let Some(node) = self.graph.get_mut(id) {
                node.status = NodeStatus::Closed;
            }
        } else {
            tracing::debug!(node = id.0, "verify goal failed, backtracking");
            self.backtrack(id);
        }
    }

    fn dispatch_verify_multigoal(&mut self, id: NodeId, parent: NodeId) {
        let satisfied = match self.graph.get(parent).map(|n| &n.kind) {
            Some(NodeKind::Multigoal { multigoal, .. }) => multigoal.is_satisfied(&self.state),
            _ => false,
        };
        if satisfied {
            if let Some(node) = self.graph.get_mut(id) {
                node.status = NodeStatus::Closed;
            }
        } else {
            tracing::debug!(node = id.0, "verify multigoal failed, backtracking");
            self.backtrack(id);
        }
    }

    /// Mark `id` `Closed`, record its method cursor, attach `children`, and
    /// advance the frontier into `id` so the next step searches its new
    /// successors.
    fn close_and_expand(&mut self, id: NodeId, children: Vec<ChildSpec>, next_method: usize, selected: Option<usize>) {
        self.set_method_cursor(id, next_method, selected);
        if let Some(node) = self.graph.get_mut(id) {
            node.status = NodeStatus::Closed;
        }
        self.graph.add_children(id, children, &self.registry);
        self.frontier = id;
    }

    fn set_method_cursor(&mut self, id: NodeId, next_method: usize, selected: Option<usize>) {
        if let Some(node) = self.graph.get_mut(id) {
            match &mut node.kind {
                NodeKind::Task {
                    next_method: n,
                    selected_method: s,
                    ..
                }
                | NodeKind::Goal {
                    next_method: n,
                    selected_method: s,
                    ..
                }
                | NodeKind::Multigoal {
                    next_method: n,
                    selected_method: s,
                    ..
                } => {
                    *n = next_method;
                    if selected.is_some() {
                        *s = selected;
                    }
                }
                _ => {}
            }
        }
    }

    fn backtrack(&mut self, failed_id: NodeId) {
        match backtrack::mark_failed_and_backtrack(&mut self.graph, &self.registry, failed_id) {
            BacktrackOutcome::Retry(node_id) => {
                self.frontier = self.graph.find_predecessor(node_id).unwrap_or(ROOT);
                self.retry_pending = true;
            }
            BacktrackOutcome::Exhausted => {
                self.failure_reason
                    .get_or_insert_with(|| "no applicable branch remained after exhausting the search".to_string());
                self.frontier = ROOT;
            }
        }
    }
}
