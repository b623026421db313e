//! Agent-facing tool calls
//!
//! Commands refer to objects by readable id (`chest_5`) and to operators by
//! their upper-case names (`OPEN`, `GO_THROUGH`). The session resolves both
//! before calling into the world.

use std::fmt;
use std::str::FromStr;

use roomsense_domain::{ActionError, ActionType};
use serde::{Deserialize, Serialize};

/// Pseudo object id standing for the floor of the current room.
pub const FLOOR: &str = "floor";

pub(crate) fn is_floor(id: &str) -> bool {
    id.trim().eq_ignore_ascii_case(FLOOR)
}

/// Operator names accepted from an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Open,
    Close,
    GoThrough,
    LookThrough,
    Lock,
    Unlock,
    Use,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Close => "CLOSE",
            Self::GoThrough => "GO_THROUGH",
            Self::LookThrough => "LOOK_THROUGH",
            Self::Lock => "LOCK",
            Self::Unlock => "UNLOCK",
            Self::Use => "USE",
        }
    }

    /// Walking through a connector is its `USE` action.
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Open => ActionType::Open,
            Self::Close => ActionType::Close,
            Self::GoThrough | Self::Use => ActionType::Use,
            Self::LookThrough => ActionType::LookThrough,
            Self::Lock => ActionType::Lock,
            Self::Unlock => ActionType::Unlock,
        }
    }

    /// Operators that are meaningless without an item in hand.
    pub fn needs_item(&self) -> bool {
        matches!(self, Self::Lock | Self::Unlock)
    }

    /// Operators that may be performed with an item.
    pub fn accepts_item(&self) -> bool {
        matches!(self, Self::Lock | Self::Unlock | Self::Use)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "CLOSE" => Ok(Self::Close),
            "GO_THROUGH" => Ok(Self::GoThrough),
            "LOOK_THROUGH" => Ok(Self::LookThrough),
            "LOCK" => Ok(Self::Lock),
            "UNLOCK" => Ok(Self::Unlock),
            "USE" => Ok(Self::Use),
            _ => Err(ActionError::hard(format!("unknown operator for this action: {}", s))
                .with_hint("Use one of OPEN, CLOSE, GO_THROUGH, LOOK_THROUGH, LOCK, UNLOCK, USE.")
                .with_context("operator", s)),
        }
    }
}

/// One tool call issued by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum AgentCommand {
    MoveToPosition {
        x: f64,
        y: f64,
    },
    /// Position given in the session's presentation format, e.g. `c4`.
    MoveToField {
        field: String,
    },
    MoveToObject {
        object_id: String,
    },
    /// `from_id` may be [`FLOOR`].
    TakeFrom {
        what_id: String,
        from_id: String,
    },
    /// `to_id` may be [`FLOOR`].
    DropTo {
        what_id: String,
        to_id: String,
    },
    InteractWithObject {
        object_id: String,
        operator: String,
    },
    InteractWithObjectUsingItem {
        object_id: String,
        using_id: String,
        operator: String,
    },
}

impl AgentCommand {
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::MoveToPosition { .. } => "move_to_position",
            Self::MoveToField { .. } => "move_to_field",
            Self::MoveToObject { .. } => "move_to_object",
            Self::TakeFrom { .. } => "take_from",
            Self::DropTo { .. } => "drop_to",
            Self::InteractWithObject { .. } => "interact_with_object",
            Self::InteractWithObjectUsingItem { .. } => "interact_with_object_using_item",
        }
    }

    pub fn move_to_object(object_id: impl Into<String>) -> Self {
        Self::MoveToObject {
            object_id: object_id.into(),
        }
    }

    pub fn take_from(what_id: impl Into<String>, from_id: impl Into<String>) -> Self {
        Self::TakeFrom {
            what_id: what_id.into(),
            from_id: from_id.into(),
        }
    }

    pub fn drop_to(what_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self::DropTo {
            what_id: what_id.into(),
            to_id: to_id.into(),
        }
    }

    pub fn interact(object_id: impl Into<String>, operator: Operator) -> Self {
        Self::InteractWithObject {
            object_id: object_id.into(),
            operator: operator.as_str().to_string(),
        }
    }

    pub fn interact_using(
        object_id: impl Into<String>,
        using_id: impl Into<String>,
        operator: Operator,
    ) -> Self {
        Self::InteractWithObjectUsingItem {
            object_id: object_id.into(),
            using_id: using_id.into(),
            operator: operator.as_str().to_string(),
        }
    }
}

/// Operator for `interact_with_object`, which carries no item.
pub(crate) fn plain_operator(raw: &str) -> Result<Operator, ActionError> {
    let operator: Operator = raw.parse()?;
    if operator.needs_item() {
        return Err(ActionError::hard(format!(
            "{} needs an item; use interact_with_object_using_item.",
            operator
        ))
        .with_context("operator", operator.as_str()));
    }
    Ok(operator)
}

/// Operator for `interact_with_object_using_item`.
pub(crate) fn item_operator(raw: &str) -> Result<Operator, ActionError> {
    let operator: Operator = raw.parse()?;
    if !operator.accepts_item() {
        return Err(ActionError::hard(format!(
            "{} cannot be performed with an item; use interact_with_object.",
            operator
        ))
        .with_context("operator", operator.as_str()));
    }
    Ok(operator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operators_parse_case_insensitively() {
        assert_eq!("open".parse::<Operator>().unwrap(), Operator::Open);
        assert_eq!(" Go_Through ".parse::<Operator>().unwrap(), Operator::GoThrough);
        assert_eq!(Operator::GoThrough.action_type(), ActionType::Use);
        assert_eq!(Operator::LookThrough.action_type(), ActionType::LookThrough);
    }

    #[test]
    fn unknown_operator_is_formal_error() {
        let err = "SMASH".parse::<Operator>().unwrap_err();
        assert!(err.is_hard());
        assert_eq!(err.to_string(), "unknown operator for this action: SMASH");
        assert_eq!(err.feedback().context_value("operator"), Some(&json!("SMASH")));
    }

    #[test]
    fn item_requirements_are_checked() {
        assert!(plain_operator("LOCK").unwrap_err().is_hard());
        assert_eq!(plain_operator("OPEN").unwrap(), Operator::Open);
        assert!(item_operator("OPEN").unwrap_err().is_hard());
        assert_eq!(item_operator("unlock").unwrap(), Operator::Unlock);
        assert_eq!(item_operator("USE").unwrap(), Operator::Use);
    }

    #[test]
    fn floor_is_case_insensitive() {
        assert!(is_floor("FLOOR"));
        assert!(is_floor(" floor "));
        assert!(!is_floor("floor_1"));
    }

    #[test]
    fn commands_deserialize_from_tool_calls() {
        let command: AgentCommand = serde_json::from_value(json!({
            "tool": "interact_with_object_using_item",
            "object_id": "chest_9",
            "using_id": "key_5",
            "operator": "UNLOCK"
        }))
        .unwrap();
        assert_eq!(command, AgentCommand::interact_using("chest_9", "key_5", Operator::Unlock));
        assert_eq!(command.tool_name(), "interact_with_object_using_item");

        let command: AgentCommand =
            serde_json::from_value(json!({ "tool": "move_to_position", "x": 1.0, "y": 2.5 }))
                .unwrap();
        assert_eq!(command, AgentCommand::MoveToPosition { x: 1.0, y: 2.5 });
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let result: Result<AgentCommand, _> =
            serde_json::from_value(json!({ "tool": "teleport", "to": "kitchen" }));
        assert!(result.is_err());
    }
}
