//! Domain Registry: a read-only bundle of task methods, goal methods,
//! multigoal methods, and action handlers, keyed by name.
//!
//! Order of candidate methods matters — it defines the branching order of
//! the search — so every table is a `Vec` consumed in registration order,
//! never sorted or deduplicated.

use std::collections::HashMap;
use std::sync::Arc;

use crate::goal::{GoalSpec, MultigoalSpec};
use crate::state::{FactValue, State};

/// `(ok, new_state, duration_micros)` on success, `(err, reason)` on
/// failure — the contract every registered action handler satisfies.
pub type ActionResult = std::result::Result<(State, i64), String>;

pub type TaskMethodFn = Arc<dyn Fn(&State, &[FactValue]) -> Option<Vec<ChildSpec>> + Send + Sync>;
pub type GoalMethodFn = Arc<dyn Fn(&State, &GoalSpec) -> Option<Vec<ChildSpec>> + Send + Sync>;
pub type MultigoalMethodFn =
    Arc<dyn Fn(&State, &MultigoalSpec) -> Option<Vec<ChildSpec>> + Send + Sync>;
pub type ActionHandler = Arc<dyn Fn(&State, &[FactValue]) -> ActionResult + Send + Sync>;

/// A child produced by a method, classified up front so [`crate::graph`]
/// never has to re-derive the node kind from a loosely-typed payload — the
/// classification happens once, here, at construction time by the domain
/// author's method — see [`ChildSpec`]'s constructors for the exact
/// resolution order when building from an untyped name.
#[derive(Debug, Clone)]
pub enum ChildSpec {
    Task { name: String, args: Vec<FactValue> },
    Action { name: String, args: Vec<FactValue> },
    Goal(GoalSpec),
    Multigoal(MultigoalSpec),
}

impl ChildSpec {
    pub fn task(name: impl Into<String>, args: Vec<FactValue>) -> Self {
        ChildSpec::Task {
            name: name.into(),
            args,
        }
    }

    pub fn action(name: impl Into<String>, args: Vec<FactValue>) -> Self {
        ChildSpec::Action {
            name: name.into(),
            args,
        }
    }

    pub fn goal(spec: GoalSpec) -> Self {
        ChildSpec::Goal(spec)
    }

    pub fn multigoal(spec: MultigoalSpec) -> Self {
        ChildSpec::Multigoal(spec)
    }

    /// Resolve an untyped `(name, args)` pair against the registry by
    /// checking, in order, whether it names a task method, an action, or a
    /// goal predicate. Returns `None` if `name` matches none of the
    /// registry's tables.
    pub fn classify(registry: &Registry, name: &str, args: Vec<FactValue>) -> Option<ChildSpec> {
        if registry.has_task_method(name) {
            Some(ChildSpec::task(name, args))
        } else if registry.has_action(name) {
            Some(ChildSpec::action(name, args))
        } else if registry.has_goal_method(name) {
            // args = [subject, value] in canonical form.
            let subject = args.first()?.clone();
            let value = args.get(1)?.clone();
            Some(ChildSpec::goal(GoalSpec::canonical(
                name,
                fact_value_as_string(&subject)?,
                value,
            )))
        } else {
            None
        }
    }
}

fn fact_value_as_string(v: &FactValue) -> Option<String> {
    match v {
        FactValue::Text(s) => Some(s.clone()),
        _ => None,
    }
}

/// The immutable, read-only table of domain content. Once built it is
/// never mutated; refinements only read from it, including concurrently
/// across independent refinement instances.
#[derive(Clone, Default)]
pub struct Registry {
    task_methods: HashMap<String, Vec<TaskMethodFn>>,
    goal_methods: HashMap<String, Vec<GoalMethodFn>>,
    multigoal_methods: HashMap<String, Vec<MultigoalMethodFn>>,
    actions: HashMap<String, ActionHandler>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn has_task_method(&self, name: &str) -> bool {
        self.task_methods.contains_key(name)
    }

    pub fn has_goal_method(&self, predicate: &str) -> bool {
        self.goal_methods.contains_key(predicate)
    }

    pub fn has_multigoal_method(&self, tag: &str) -> bool {
        self.multigoal_methods.contains_key(tag)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn task_methods(&self, name: &str) -> &[TaskMethodFn] {
        self.task_methods.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn goal_methods(&self, predicate: &str) -> &[GoalMethodFn] {
        self.goal_methods
            .get(predicate)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn multigoal_methods(&self, tag: &str) -> &[MultigoalMethodFn] {
        self.multigoal_methods
            .get(tag)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn action(&self, name: &str) -> Option<&ActionHandler> {
        self.actions.get(name)
    }
}

/// Builder for [`Registry`]: each `register_*` call appends to the
/// ordered table for that name.
#[derive(Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn register_task_method(
        mut self,
        name: impl Into<String>,
        method: TaskMethodFn,
    ) -> Self {
        self.registry
            .task_methods
            .entry(name.into())
            .or_default()
            .push(method);
        self
    }

    pub fn register_goal_method(
        mut self,
        predicate: impl Into<String>,
        method: GoalMethodFn,
    ) -> Self {
        self.registry
            .goal_methods
            .entry(predicate.into())
            .or_default()
            .push(method);
        self
    }

    pub fn register_multigoal_method(
        mut self,
        tag: impl Into<String>,
        method: MultigoalMethodFn,
    ) -> Self {
        self.registry
            .multigoal_methods
            .entry(tag.into())
            .or_default()
            .push(method);
        self
    }

    pub fn register_action(mut self, name: impl Into<String>, handler: ActionHandler) -> Self {
        self.registry.actions.insert(name.into(), handler);
        self
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}
