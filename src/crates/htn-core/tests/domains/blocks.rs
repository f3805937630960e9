//! A tiny three-block stacking domain.
//!
//! A block moves in three primitives — `grasp`, `move`, `release` — so a
//! single `pos` subgoal costs three actions, and a typical two-block
//! rearrangement runs six or seven actions end to end.

use std::sync::Arc;

use htn_core::goal::{GoalSpec, MultigoalSpec};
use htn_core::registry::{ActionHandler, ChildSpec, GoalMethodFn, MultigoalMethodFn, Registry};
use htn_core::state::{FactValue, State};

fn text(v: &FactValue) -> Option<&str> {
    match v {
        FactValue::Text(s) => Some(s.as_str()),
        _ => None,
    }
}

fn is_clear(state: &State, block: &str) -> bool {
    matches!(state.get("clear", block), Some(FactValue::Bool(true)))
}

fn hand_empty(state: &State) -> bool {
    matches!(state.get("holding", "hand"), Some(FactValue::Bool(false)))
}

fn pos_goal_method(state: &State, goal: &GoalSpec) -> Option<Vec<ChildSpec>> {
    let block = goal.subject.clone();
    let dest = text(&goal.value)?.to_string();
    if !is_clear(state, &block) || !hand_empty(state) {
        return None;
    }
    if dest != "table" && !is_clear(state, &dest) {
        return None;
    }
    Some(vec![
        ChildSpec::action("grasp", vec![FactValue::Text(block.clone())]),
        ChildSpec::action("move", vec![FactValue::Text(block.clone()), FactValue::Text(dest.clone())]),
        ChildSpec::action("release", vec![FactValue::Text(block), FactValue::Text(dest)]),
    ])
}

fn stack_goals_in_order(_state: &State, multigoal: &MultigoalSpec) -> Option<Vec<ChildSpec>> {
    Some(multigoal.goals.iter().cloned().map(ChildSpec::goal).collect())
}

fn stack_goals_reversed(_state: &State, multigoal: &MultigoalSpec) -> Option<Vec<ChildSpec>> {
    Some(multigoal.goals.iter().rev().cloned().map(ChildSpec::goal).collect())
}

fn grasp(state: &State, args: &[FactValue]) -> Result<(State, i64), String> {
    let block = text(&args[0]).ok_or("grasp: bad args")?;
    if !is_clear(state, block) || !hand_empty(state) {
        return Err(format!("cannot grasp {block}: not clear or hand full"));
    }
    let mut next = state.clone();
    next.set("holding", "hand", FactValue::Bool(true));
    next.set("grasped", "hand", FactValue::Text(block.to_string()));
    Ok((next, 500_000))
}

fn move_action(state: &State, args: &[FactValue]) -> Result<(State, i64), String> {
    let block = text(&args[0]).ok_or("move: bad args")?;
    let dest = text(&args[1]).ok_or("move: bad args")?;
    let grasped_ok = matches!(state.get("grasped", "hand"), Some(FactValue::Text(b)) if b == block);
    if !grasped_ok {
        return Err(format!("cannot move {block}: not held"));
    }
    if dest != "table" && !is_clear(state, dest) {
        return Err(format!("cannot move onto {dest}: not clear"));
    }
    Ok((state.clone(), 300_000))
}

fn release(state: &State, args: &[FactValue]) -> Result<(State, i64), String> {
    let block = text(&args[0]).ok_or("release: bad args")?;
    let dest = text(&args[1]).ok_or("release: bad args")?;
    let grasped_ok = matches!(state.get("grasped", "hand"), Some(FactValue::Text(b)) if b == block);
    if !grasped_ok {
        return Err(format!("cannot release {block}: not held"));
    }
    let mut next = state.clone();
    next.set("pos", block, FactValue::Text(dest.to_string()));
    next.set("clear", block, FactValue::Bool(true));
    if dest != "table" {
        next.set("clear", dest, FactValue::Bool(false));
    }
    next.set("holding", "hand", FactValue::Bool(false));
    next.set("grasped", "hand", FactValue::Text("none".to_string()));
    Ok((next, 500_000))
}

pub fn registry() -> Registry {
    let pos_method: GoalMethodFn = Arc::new(pos_goal_method);
    let order_method: MultigoalMethodFn = Arc::new(stack_goals_in_order);
    let reversed_method: MultigoalMethodFn = Arc::new(stack_goals_reversed);
    let grasp_handler: ActionHandler = Arc::new(grasp);
    let move_handler: ActionHandler = Arc::new(move_action);
    let release_handler: ActionHandler = Arc::new(release);

    Registry::builder()
        .register_goal_method("pos", pos_method)
        .register_multigoal_method("stack_goals", order_method)
        .register_multigoal_method("stack_goals", reversed_method)
        .register_action("grasp", grasp_handler)
        .register_action("move", move_handler)
        .register_action("release", release_handler)
        .build()
}

pub fn initial_state() -> State {
    let mut state = State::default();
    for block in ["a", "b", "c"] {
        state.set("pos", block, FactValue::Text("table".to_string()));
        state.set("clear", block, FactValue::Bool(true));
    }
    state.set("holding", "hand", FactValue::Bool(false));
    state.set("grasped", "hand", FactValue::Text("none".to_string()));
    state
}

pub fn stacking_goal() -> MultigoalSpec {
    MultigoalSpec::new(
        vec![
            GoalSpec::canonical("pos", "a", FactValue::Text("b".to_string())),
            GoalSpec::canonical("pos", "b", FactValue::Text("c".to_string())),
        ],
        Some("stack_goals".to_string()),
    )
}
