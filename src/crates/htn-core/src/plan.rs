//! Plan Record: the externally visible result of a refinement.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::state::{FactValue, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Planned,
    Executing,
    Completed,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: String,
    pub args: Vec<FactValue>,
}

/// Caller-supplied identification threaded through unchanged — the planner
/// reads none of these fields, it only carries them for whatever external
/// persona/entity model the host maintains.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub name: Option<String>,
    pub persona_id: Option<String>,
    pub domain_type: Option<String>,
    pub run_lazy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: String,
    pub name: Option<String>,
    pub persona_id: Option<String>,
    pub domain_type: Option<String>,
    pub execution_status: ExecutionStatus,
    pub run_lazy: bool,
    pub solution_plan: Vec<ActionRecord>,
    /// Sum of closed actions' durations, in milliseconds.
    pub planning_duration_ms: i64,
    pub failure_reason: Option<String>,
    /// Exposed for diagnostics; the engine does not bound or compare against it.
    pub iterations: u64,
    #[serde(skip)]
    pub final_state: State,
    #[serde(skip)]
    pub final_graph: Graph,
}

impl PlanRecord {
    /// A host-friendly projection: `final_state` and `final_graph` under the
    /// names `planner_state_snapshot` and `solution_graph_data`, everything
    /// else passed through as-is.
    pub fn to_json_like(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "persona_id": self.persona_id,
            "domain_type": self.domain_type,
            "execution_status": self.execution_status,
            "run_lazy": self.run_lazy,
            "solution_plan": self.solution_plan,
            "planning_duration_ms": self.planning_duration_ms,
            "planner_state_snapshot": self.final_state,
            "solution_graph_data": self.final_graph,
        })
    }
}
