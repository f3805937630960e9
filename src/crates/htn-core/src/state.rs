//! Typed world state: facts keyed by `(predicate, subject)`, entity
//! capabilities, and the current time.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A subject identifier. A transparent newtype over `String` so call sites
/// read as domain vocabulary rather than raw strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        SubjectId(s.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(s: String) -> Self {
        SubjectId(s)
    }
}

/// The "small structured value" a fact maps to. `List` covers the
/// tuple-as-subject case (e.g. 2-D grid coordinates serialize as
/// `List([Number, Number])`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FactValue>),
}

impl From<bool> for FactValue {
    fn from(b: bool) -> Self {
        FactValue::Bool(b)
    }
}

impl From<&str> for FactValue {
    fn from(s: &str) -> Self {
        FactValue::Text(s.to_string())
    }
}

impl From<f64> for FactValue {
    fn from(n: f64) -> Self {
        FactValue::Number(n)
    }
}

/// Typed world state. Value-semantic from the planner's point of view: a
/// handler may return an updated `State` and the engine substitutes it into
/// the search frontier, but a `State` attached to a node's `saved_state`
/// snapshot is never mutated in place again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// `predicate -> subject -> value`.
    facts: HashMap<String, HashMap<String, FactValue>>,
    entity_capabilities: HashMap<String, HashSet<String>>,
    /// Microseconds since the Unix epoch.
    current_time: i64,
}

impl State {
    pub fn new(
        current_time: i64,
        entity_capabilities: HashMap<String, HashSet<String>>,
        facts: HashMap<String, HashMap<String, FactValue>>,
    ) -> Self {
        State {
            facts,
            entity_capabilities,
            current_time,
        }
    }

    pub fn current_time(&self) -> i64 {
        self.current_time
    }

    pub fn set_current_time(&mut self, micros: i64) {
        self.current_time = micros;
    }

    pub fn advance_time(&mut self, by_micros: i64) {
        self.current_time += by_micros;
    }

    /// `(predicate, subject) -> value`, or `None` on a missing key.
    pub fn get(&self, predicate: &str, subject: &str) -> Option<&FactValue> {
        self.facts.get(predicate).and_then(|m| m.get(subject))
    }

    /// Legacy lookup order, `(subject, predicate)`, mapping onto the same
    /// canonical storage.
    pub fn get_legacy(&self, subject: &str, predicate: &str) -> Option<&FactValue> {
        self.get(predicate, subject)
    }

    pub fn set(&mut self, predicate: &str, subject: &str, value: FactValue) {
        self.facts
            .entry(predicate.to_string())
            .or_default()
            .insert(subject.to_string(), value);
    }

    pub fn has_capability(&self, entity: &str, capability: &str) -> bool {
        self.entity_capabilities
            .get(entity)
            .map(|caps| caps.contains(capability))
            .unwrap_or(false)
    }

    pub fn capabilities_of(&self, entity: &str) -> Option<&HashSet<String>> {
        self.entity_capabilities.get(entity)
    }

    /// An independent copy, safe to stash as a node's `saved_state`. Unlike
    /// `Clone` on the underlying maps (which this in fact is, since `State`
    /// holds no shared/reference-counted storage), this exists as the
    /// named call site the engine uses before attaching a snapshot, so the
    /// "never mutate a snapshot" contract has a single, auditable call
    /// site rather than relying on every `clone()` call being correct by
    /// convention.
    pub fn deep_copy(&self) -> State {
        self.clone()
    }

    /// Recursively merge `other`'s fact sub-maps into `self`, replacing
    /// leaves where both define the same `(predicate, subject)`.
    pub fn update(&mut self, other: &State) {
        for (predicate, subjects) in &other.facts {
            let entry = self.facts.entry(predicate.clone()).or_default();
            for (subject, value) in subjects {
                entry.insert(subject.clone(), value.clone());
            }
        }
        for (entity, caps) in &other.entity_capabilities {
            self.entity_capabilities
                .entry(entity.clone())
                .or_default()
                .extend(caps.iter().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_round_trip_both_lookup_orders() {
        let mut s = State::default();
        s.set("pos", "a", FactValue::Text("table".into()));
        assert_eq!(s.get("pos", "a"), Some(&FactValue::Text("table".into())));
        assert_eq!(s.get_legacy("a", "pos"), Some(&FactValue::Text("table".into())));
        assert_eq!(s.get("pos", "missing"), None);
    }

    #[test]
    fn deep_copy_is_independent() {
        let mut s = State::default();
        s.set("clear", "a", FactValue::Bool(true));
        let snapshot = s.deep_copy();
        s.set("clear", "a", FactValue::Bool(false));
        assert_eq!(snapshot.get("clear", "a"), Some(&FactValue::Bool(true)));
        assert_eq!(s.get("clear", "a"), Some(&FactValue::Bool(false)));
    }

    #[test]
    fn update_merges_and_replaces_leaves() {
        let mut base = State::default();
        base.set("pos", "a", FactValue::Text("table".into()));
        base.set("pos", "b", FactValue::Text("table".into()));

        let mut patch = State::default();
        patch.set("pos", "a", FactValue::Text("b".into()));

        base.update(&patch);
        assert_eq!(base.get("pos", "a"), Some(&FactValue::Text("b".into())));
        assert_eq!(base.get("pos", "b"), Some(&FactValue::Text("table".into())));
    }

    #[test]
    fn entity_capability_lookup() {
        let mut caps = HashMap::new();
        caps.insert("hand".to_string(), HashSet::from(["grasp".to_string()]));
        let s = State::new(0, caps, HashMap::new());
        assert!(s.has_capability("hand", "grasp"));
        assert!(!s.has_capability("hand", "fly"));
        assert!(!s.has_capability("nobody", "grasp"));
    }
}
