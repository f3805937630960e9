//! Lazy-refinement HTN planner.
//!
//! A deterministic, single-threaded search over a growing *solution
//! graph* whose nodes represent tasks, goals, multigoals, actions, and
//! verification markers. Domain content — the predicate/action/task
//! libraries for a particular world — is supplied by the caller through a
//! [`registry::Registry`]; this crate only implements the search.
//!
//! Temporal constraint bookkeeping lives in the standalone [`htn_stn`]
//! crate and is consulted only through explicit calls from domain methods,
//! never from inside the refinement loop itself.
//!
//! ```
//! use std::sync::Arc;
//! use htn_core::engine::Engine;
//! use htn_core::plan::{ExecutionStatus, PlanOptions};
//! use htn_core::registry::{ActionHandler, ChildSpec, Registry};
//! use htn_core::state::State;
//!
//! let handler: ActionHandler = Arc::new(|state: &State, _args| Ok((state.clone(), 1_000_000)));
//! let registry = Arc::new(Registry::builder().register_action("noop", handler).build());
//! let mut engine = Engine::new("demo", registry, State::default(), vec![ChildSpec::action("noop", vec![])]);
//! let record = engine.run(PlanOptions::default());
//! assert_eq!(record.execution_status, ExecutionStatus::Completed);
//! ```

pub mod backtrack;
pub mod engine;
pub mod error;
pub mod goal;
pub mod graph;
pub mod outcome;
pub mod plan;
pub mod registry;
pub mod state;
pub mod time;

pub use error::{PlannerError, Result};
