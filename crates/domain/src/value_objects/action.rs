use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::EntityId;

/// State-changing verbs an actor can attempt on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Open,
    Close,
    Unlock,
    Lock,
    Use,
    LookThrough,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Unlock => "unlock",
            Self::Lock => "lock",
            Self::Use => "use",
            Self::LookThrough => "look_through",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            "unlock" => Ok(Self::Unlock),
            "lock" => Ok(Self::Lock),
            "use" => Ok(Self::Use),
            "look_through" => Ok(Self::LookThrough),
            other => Err(DomainError::parse(format!("Unknown action type: {}", other))),
        }
    }
}

/// One attempted action, optionally naming the item used to perform it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTry {
    pub kind: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<EntityId>,
}

impl ActionTry {
    pub fn new(kind: ActionType) -> Self {
        Self { kind, item: None }
    }

    pub fn with_item(mut self, item: EntityId) -> Self {
        self.item = Some(item);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("OPEN".parse::<ActionType>().unwrap(), ActionType::Open);
        assert_eq!(
            "look_through".parse::<ActionType>().unwrap(),
            ActionType::LookThrough
        );
        assert!(matches!(
            "smash".parse::<ActionType>(),
            Err(DomainError::Parse(_))
        ));
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_value(ActionTry::new(ActionType::LookThrough)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "look_through" }));
    }

    #[test]
    fn with_item_sets_key() {
        let action = ActionTry::new(ActionType::Unlock).with_item(EntityId::from_raw(9));
        assert_eq!(action.item, Some(EntityId::from_raw(9)));
    }
}
