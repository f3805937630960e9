//! The fox/goose/corn river-crossing puzzle.
//!
//! A single `cross_river` task method proposes the textbook seven-crossing
//! solution; the `cross` action handler independently re-validates the
//! safety predicate on every move, so an unsafe domain method would still
//! be caught at execution time rather than silently accepted.

use std::sync::Arc;

use htn_core::registry::{ActionHandler, ChildSpec, Registry, TaskMethodFn};
use htn_core::state::{FactValue, State};

const ITEMS: [&str; 3] = ["fox", "geese", "corn"];

fn side_of(state: &State, item: &str) -> &'static str {
    if matches!(state.get("west", item), Some(FactValue::Bool(true))) {
        "west"
    } else {
        "east"
    }
}

fn unsafe_pair(a: &str, b: &str) -> bool {
    matches!((a, b), ("fox", "geese") | ("geese", "fox") | ("geese", "corn") | ("corn", "geese"))
}

fn side_is_safe(state: &State, side: &str, farmer_side: &str) -> bool {
    if side == farmer_side {
        return true;
    }
    let present: Vec<&str> = ITEMS.iter().copied().filter(|item| side_of(state, item) == side).collect();
    for i in 0..present.len() {
        for j in (i + 1)..present.len() {
            if unsafe_pair(present[i], present[j]) {
                return false;
            }
        }
    }
    true
}

fn text(v: &FactValue) -> Option<&str> {
    match v {
        FactValue::Text(s) => Some(s.as_str()),
        _ => None,
    }
}

fn cross(state: &State, args: &[FactValue]) -> Result<(State, i64), String> {
    let direction = text(&args[0]).ok_or("cross: bad args")?;
    let cargo = text(&args[1]).ok_or("cross: bad args")?;
    let origin = match direction {
        "east" => "west",
        "west" => "east",
        other => return Err(format!("unknown direction '{other}'")),
    };
    let boat = text(state.get("boat", "location").ok_or("boat location missing")?).ok_or("boat: bad value")?;
    if boat != origin {
        return Err(format!("boat is at {boat}, cannot depart from {origin}"));
    }
    if cargo != "none" && side_of(state, cargo) != origin {
        return Err(format!("{cargo} is not on the {origin} bank"));
    }

    let mut next = state.clone();
    next.set("boat", "location", FactValue::Text(direction.to_string()));
    if cargo != "none" {
        next.set("west", cargo, FactValue::Bool(direction == "west"));
    }

    if !side_is_safe(&next, "west", direction) || !side_is_safe(&next, "east", direction) {
        return Err("unsafe: a predator and prey are left unattended".to_string());
    }

    Ok((next, 2_000_000))
}

fn cross_river_method(_state: &State, _args: &[FactValue]) -> Option<Vec<ChildSpec>> {
    let action = |direction: &str, cargo: &str| ChildSpec::action("cross", vec![FactValue::Text(direction.to_string()), FactValue::Text(cargo.to_string())]);
    Some(vec![
        action("east", "geese"),
        action("west", "none"),
        action("east", "fox"),
        action("west", "geese"),
        action("east", "corn"),
        action("west", "none"),
        action("east", "geese"),
    ])
}

pub fn registry() -> Registry {
    let method: TaskMethodFn = Arc::new(cross_river_method);
    let handler: ActionHandler = Arc::new(cross);
    Registry::builder()
        .register_task_method("cross_river", method)
        .register_action("cross", handler)
        .build()
}

pub fn initial_state() -> State {
    let mut state = State::default();
    for item in ITEMS {
        state.set("west", item, FactValue::Bool(true));
    }
    state.set("boat", "location", FactValue::Text("west".to_string()));
    state
}

pub fn all_on_east(state: &State) -> bool {
    ITEMS.iter().all(|item| side_of(state, item) == "east")
        && matches!(state.get("boat", "location"), Some(FactValue::Text(s)) if s == "east")
}
