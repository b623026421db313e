//! Result taxonomy for agent-facing operations
//!
//! Every interaction either succeeds with a message or fails with an
//! [`ActionError`]:
//! - `Hard`: malformed or unreachable request (unknown id, unsupported
//!   operator, target in another room). Retrying the same call cannot help.
//! - `Soft`: well-formed but currently infeasible (locked, closed, out of
//!   range). A different plan can succeed.
//!
//! The orchestrator turns outcomes into [`ResultRecord`]s and appends them to
//! a [`ResultBuffer`] it drains once per simulated step. The domain never
//! reads or clears the buffer itself.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Rich feedback carried by every failure and result record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFeedback {
    /// Message shown to the acting agent
    pub agent_message: String,
    /// Message for the operator console (more technical)
    pub console_message: String,
    /// Suggestion for re-planning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Machine-usable context, e.g. `{target, action, key}`
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
}

impl ActionFeedback {
    pub fn new(agent_message: impl Into<String>) -> Self {
        let agent_message = agent_message.into();
        Self {
            console_message: agent_message.clone(),
            agent_message,
            hint: None,
            context: Map::new(),
        }
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}

/// Failure of an agent-facing operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("{}", .0.agent_message)]
    Hard(ActionFeedback),
    #[error("{}", .0.agent_message)]
    Soft(ActionFeedback),
}

impl ActionError {
    pub fn hard(agent_message: impl Into<String>) -> Self {
        Self::Hard(ActionFeedback::new(agent_message))
    }

    pub fn soft(agent_message: impl Into<String>) -> Self {
        Self::Soft(ActionFeedback::new(agent_message))
    }

    pub fn with_console(mut self, console_message: impl Into<String>) -> Self {
        self.feedback_mut().console_message = console_message.into();
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.feedback_mut().hint = Some(hint.into());
        self
    }

    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.feedback_mut()
            .context
            .insert(key.to_string(), value.into());
        self
    }

    pub fn is_hard(&self) -> bool {
        matches!(self, Self::Hard(_))
    }

    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Soft(_))
    }

    pub fn feedback(&self) -> &ActionFeedback {
        match self {
            Self::Hard(feedback) | Self::Soft(feedback) => feedback,
        }
    }

    fn feedback_mut(&mut self) -> &mut ActionFeedback {
        match self {
            Self::Hard(feedback) | Self::Soft(feedback) => feedback,
        }
    }
}

/// Outcome of a state-changing interaction: a success message or a failure.
pub type InteractionResult = Result<String, ActionError>;

/// Category of a recorded result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Success,
    ActionNotPossible,
    FormalError,
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::ActionNotPossible => write!(f, "ACTION NOT POSSIBLE"),
            Self::FormalError => write!(f, "FORMAL ERROR"),
        }
    }
}

/// One entry in the result buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub kind: ResultKind,
    #[serde(flatten)]
    pub feedback: ActionFeedback,
}

impl ResultRecord {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::Success,
            feedback: ActionFeedback::new(message),
        }
    }

    pub fn from_error(error: &ActionError) -> Self {
        let kind = match error {
            ActionError::Hard(_) => ResultKind::FormalError,
            ActionError::Soft(_) => ResultKind::ActionNotPossible,
        };
        Self {
            kind,
            feedback: error.feedback().clone(),
        }
    }

    /// Convert an interaction outcome into a record.
    ///
    /// An empty success message falls back to `fallback`.
    pub fn from_outcome(outcome: &InteractionResult, fallback: &str) -> Self {
        match outcome {
            Ok(message) if message.is_empty() => Self::success(fallback),
            Ok(message) => Self::success(message.clone()),
            Err(error) => Self::from_error(error),
        }
    }

    /// Message for the agent, with the hint appended when present.
    pub fn agent_text(&self) -> String {
        let prefix = match self.kind {
            ResultKind::Success => return self.feedback.agent_message.clone(),
            kind => format!("[{}]", kind),
        };
        match &self.feedback.hint {
            Some(hint) => format!("{} {} Hint: {}", prefix, self.feedback.agent_message, hint),
            None => format!("{} {}", prefix, self.feedback.agent_message),
        }
    }
}

/// Ordered buffer of result records, drained by the orchestrator each step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultBuffer {
    records: Vec<ResultRecord>,
}

impl ResultBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_formal_errors(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.kind == ResultKind::FormalError)
    }

    /// Take every record, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<ResultRecord> {
        std::mem::take(&mut self.records)
    }

    /// Take only the formal errors, keeping the other records in order.
    pub fn drain_formal_errors(&mut self) -> Vec<ResultRecord> {
        let (errors, rest): (Vec<_>, Vec<_>) = self
            .records
            .drain(..)
            .partition(|r| r.kind == ResultKind::FormalError);
        self.records = rest;
        errors
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
