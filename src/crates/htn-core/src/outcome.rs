//! Outcome Reporter: a write-only fan-out of action outcomes. The engine
//! publishes and forgets — a refinement with no subscribers simply drops
//! its events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::state::FactValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub plan_id: String,
    pub action: String,
    pub args: Vec<FactValue>,
    pub start_time: i64,
    pub end_time: i64,
    pub outcome: Outcome,
}

const CHANNEL_CAPACITY: usize = 256;

pub type OutcomeSubscriber = broadcast::Receiver<OutcomeEvent>;

pub struct OutcomeReporter {
    plan_id: String,
    sender: broadcast::Sender<OutcomeEvent>,
}

impl OutcomeReporter {
    pub fn new(plan_id: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        OutcomeReporter {
            plan_id: plan_id.into(),
            sender,
        }
    }

    pub fn subscribe(&self) -> OutcomeSubscriber {
        self.sender.subscribe()
    }

    /// Emitted in action-execution order, which coincides with the
    /// preorder DFS over Closed action nodes.
    pub fn emit(&self, action: String, args: Vec<FactValue>, start_time: i64, end_time: i64, outcome: Outcome) {
        let event = OutcomeEvent {
            plan_id: self.plan_id.clone(),
            action,
            args,
            start_time,
            end_time,
            outcome,
        };
        tracing::debug!(action = %event.action, outcome = ?event.outcome, "outcome event");
        // No subscribers is not an error; broadcast::Sender::send only
        // errors when the channel has zero receivers, which is routine here.
        let _ = self.sender.send(event);
    }
}
