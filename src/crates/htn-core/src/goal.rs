//! Goal and multigoal payloads.
//!
//! Goal nodes accept two input shapes: legacy `(subject, predicate,
//! value)` and canonical `(predicate, [subject, value])`. Both
//! constructors below produce the same internal representation, which is
//! also the only form ever serialized.

use serde::{Deserialize, Serialize};

use crate::state::{FactValue, State};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub predicate: String,
    pub subject: String,
    pub value: FactValue,
}

impl GoalSpec {
    /// Legacy input shape: `(subject, predicate, value)`.
    pub fn legacy(subject: impl Into<String>, predicate: impl Into<String>, value: FactValue) -> Self {
        GoalSpec {
            predicate: predicate.into(),
            subject: subject.into(),
            value,
        }
    }

    /// Canonical input shape: `(predicate, [subject, value])`.
    pub fn canonical(predicate: impl Into<String>, subject: impl Into<String>, value: FactValue) -> Self {
        GoalSpec {
            predicate: predicate.into(),
            subject: subject.into(),
            value,
        }
    }

    /// Does this goal already hold in `state`?
    pub fn is_satisfied(&self, state: &State) -> bool {
        state.get(&self.predicate, &self.subject) == Some(&self.value)
    }
}

/// A named set of component goals. Closing a multigoal node computes the
/// subset of components not yet achieved; an empty subset closes the node
/// without consulting any method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultigoalSpec {
    pub goals: Vec<GoalSpec>,
    pub tag: Option<String>,
}

impl MultigoalSpec {
    pub fn new(goals: Vec<GoalSpec>, tag: Option<String>) -> Self {
        MultigoalSpec { goals, tag }
    }

    pub fn unsatisfied(&self, state: &State) -> Vec<GoalSpec> {
        self.goals
            .iter()
            .filter(|g| !g.is_satisfied(state))
            .cloned()
            .collect()
    }

    pub fn is_satisfied(&self, state: &State) -> bool {
        self.goals.iter().all(|g| g.is_satisfied(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_and_canonical_constructors_agree() {
        let legacy = GoalSpec::legacy("a", "pos", FactValue::Text("b".into()));
        let canonical = GoalSpec::canonical("pos", "a", FactValue::Text("b".into()));
        assert_eq!(legacy, canonical);
    }

    #[test]
    fn multigoal_unsatisfied_subset() {
        let mut state = State::default();
        state.set("pos", "a", FactValue::Text("b".into()));
        let mg = MultigoalSpec::new(
            vec![
                GoalSpec::canonical("pos", "a", FactValue::Text("b".into())),
                GoalSpec::canonical("pos", "b", FactValue::Text("c".into())),
            ],
            None,
        );
        let unsat = mg.unsatisfied(&state);
        assert_eq!(unsat.len(), 1);
        assert_eq!(unsat[0].subject, "b");
        assert!(!mg.is_satisfied(&state));
    }
}
