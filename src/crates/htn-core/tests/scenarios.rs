#[path = "domains/mod.rs"]
mod domains;

use std::sync::Arc;

use htn_core::engine::Engine;
use htn_core::plan::{ExecutionStatus, PlanOptions};
use htn_core::registry::{ActionHandler, ChildSpec, Registry, TaskMethodFn};
use htn_core::state::{FactValue, State};

#[test]
fn stacking_domain_completes_with_expected_final_state() {
    let registry = Arc::new(domains::blocks::registry());
    let state = domains::blocks::initial_state();
    let goal = domains::blocks::stacking_goal();
    let mut engine = Engine::new("plan1", registry, state, vec![ChildSpec::multigoal(goal)]);
    let record = engine.run(PlanOptions::default());

    assert_eq!(record.execution_status, ExecutionStatus::Completed);
    assert_eq!(record.solution_plan.len(), 6);
    assert_eq!(record.final_state.get("pos", "a"), Some(&FactValue::Text("b".into())));
    assert_eq!(record.final_state.get("pos", "b"), Some(&FactValue::Text("c".into())));
    assert_eq!(record.final_state.get("clear", "a"), Some(&FactValue::Bool(true)));
    assert_eq!(record.final_state.get("holding", "hand"), Some(&FactValue::Bool(false)));
}

#[test]
fn river_crossing_gets_everyone_across_safely() {
    let registry = Arc::new(domains::river::registry());
    let state = domains::river::initial_state();
    let mut engine = Engine::new("plan1", registry, state, vec![ChildSpec::task("cross_river", vec![])]);
    let record = engine.run(PlanOptions::default());

    assert_eq!(record.execution_status, ExecutionStatus::Completed);
    assert!(domains::river::all_on_east(&record.final_state));

    let directions: Vec<&str> = record
        .solution_plan
        .iter()
        .map(|a| match &a.args[0] {
            FactValue::Text(s) => s.as_str(),
            _ => panic!("expected direction arg"),
        })
        .collect();
    for pair in directions.windows(2) {
        assert_ne!(pair[0], pair[1], "crossings must alternate direction");
    }
}

#[test]
fn backtracking_drops_the_failed_methods_actions() {
    let doomed: ActionHandler = Arc::new(|_: &State, _: &[FactValue]| Err("always fails".to_string()));
    let safe: ActionHandler = Arc::new(|state: &State, _: &[FactValue]| {
        let mut next = state.clone();
        next.set("done", "task", FactValue::Bool(true));
        Ok((next, 1_000_000))
    });
    let method1: TaskMethodFn = Arc::new(|_, _| Some(vec![ChildSpec::action("doomed", vec![])]));
    let method2: TaskMethodFn = Arc::new(|_, _| Some(vec![ChildSpec::action("safe", vec![])]));

    let registry = Arc::new(
        Registry::builder()
            .register_task_method("t", method1)
            .register_task_method("t", method2)
            .register_action("doomed", doomed)
            .register_action("safe", safe)
            .build(),
    );
    let mut engine = Engine::new("plan1", registry, State::default(), vec![ChildSpec::task("t", vec![])]);
    let record = engine.run(PlanOptions::default());

    assert_eq!(record.execution_status, ExecutionStatus::Completed);
    assert_eq!(record.solution_plan.len(), 1);
    assert_eq!(record.solution_plan[0].action, "safe");
    assert_eq!(record.final_state.get("done", "task"), Some(&FactValue::Bool(true)));
}

#[test]
fn blacklisting_forces_an_alternative_method() {
    let pour: ActionHandler = Arc::new(|state: &State, _: &[FactValue]| Ok((state.clone(), 100_000)));
    let method1: TaskMethodFn = Arc::new(|_, _| Some(vec![ChildSpec::action("pour", vec![FactValue::Text("cup1".into())])]));
    let method2: TaskMethodFn = Arc::new(|_, _| Some(vec![ChildSpec::action("pour", vec![FactValue::Text("cup2".into())])]));
    let registry = Arc::new(
        Registry::builder()
            .register_task_method("serve", method1)
            .register_task_method("serve", method2)
            .register_action("pour", pour)
            .build(),
    );
    let mut engine = Engine::new("plan1", registry, State::default(), vec![ChildSpec::task("serve", vec![])]);
    engine.blacklist_mut().push(("pour".to_string(), vec![FactValue::Text("cup1".into())]));
    let record = engine.run(PlanOptions::default());

    assert_eq!(record.execution_status, ExecutionStatus::Completed);
    assert!(record
        .solution_plan
        .iter()
        .all(|a| a.args != vec![FactValue::Text("cup1".into())]));
}
