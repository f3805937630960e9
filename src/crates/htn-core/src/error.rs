//! Error types for the planner.
//!
//! All of these are *local* failures: the refinement loop never raises
//! through these variants, it folds them
//! into a backtrack or, at root exhaustion, into [`crate::plan::PlanRecord`]'s
//! failure reason. They exist so the code that constructs a failure has a
//! typed, matchable value to pass to the outcome reporter and the plan
//! record rather than a bare string.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Failures the planner can encounter. None of these propagate out of
/// [`crate::engine::Engine::run`] — they are recorded on the
/// [`crate::plan::PlanRecord`] or published via the outcome reporter.
#[derive(Debug, Error, Clone)]
pub enum PlannerError {
    /// An action handler returned `(err, reason)`.
    #[error("action '{action}' failed with args {args:?}: {reason}")]
    ActionFailed {
        action: String,
        args: Vec<String>,
        reason: String,
    },

    /// Backtracking exhausted every ancestor without finding a node with
    /// remaining candidate methods.
    #[error("no applicable branch remained after exhausting the search")]
    NoApplicableBranch,

    /// An ISO-8601 string was unparseable, out of range, or used an
    /// unsupported designator. The engine treats this the same as an
    /// action failure.
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    /// The initial task list, or a method's returned children, referenced a
    /// name absent from the [`crate::registry::Registry`]. This is a setup
    /// error and is the one variant that *can* surface synchronously from
    /// [`crate::engine::Engine::run`], since it indicates the caller
    /// misconfigured the registry rather than a recoverable planning
    /// failure.
    #[error("unknown name '{0}' is not registered as a task, goal, multigoal, or action")]
    UnknownName(String),

    /// An action handler's underlying collaborator (e.g. a data store)
    /// failed. Wrapped as an action failure rather than raised directly.
    #[error("infrastructure failure during action '{action}': {source}")]
    Infrastructure {
        action: String,
        source: std::sync::Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl From<htn_stn::StnError> for PlannerError {
    fn from(e: htn_stn::StnError) -> Self {
        PlannerError::MalformedMetadata(e.to_string())
    }
}
