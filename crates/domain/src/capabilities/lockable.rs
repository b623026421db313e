use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{unsupported, InteractionContext};
use crate::ids::EntityId;
use crate::perception::PerceivedInfo;
use crate::results::{ActionError, InteractionResult};
use crate::value_objects::{ActionTry, ActionType};

/// A lock operated by one of a set of keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lockable {
    is_locked: bool,
    allowed_keys: BTreeSet<EntityId>,
}

impl Lockable {
    pub const ACTIONS: &'static [ActionType] = &[ActionType::Unlock, ActionType::Lock];

    pub fn new(initially_locked: bool) -> Self {
        Self {
            is_locked: initially_locked,
            allowed_keys: BTreeSet::new(),
        }
    }

    pub fn with_key(mut self, key: EntityId) -> Self {
        self.allowed_keys.insert(key);
        self
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    #[inline]
    pub fn allowed_keys(&self) -> &BTreeSet<EntityId> {
        &self.allowed_keys
    }

    pub fn allow_key(&mut self, key: EntityId) {
        self.allowed_keys.insert(key);
    }

    fn has_key(&self, action: &ActionTry) -> bool {
        action
            .item
            .is_some_and(|key| self.allowed_keys.contains(&key))
    }

    fn wrong_key(ctx: &InteractionContext<'_>, kind: ActionType) -> ActionError {
        let key = ctx.key_label.unwrap_or("unknown");
        let (agent_message, verb, hint) = match kind {
            ActionType::Lock => (
                "That key cannot lock this object.",
                "Lock",
                "Use one of the keys referenced in the observation.",
            ),
            _ => (
                "That key does not fit the lock.",
                "Unlock",
                "Choose a key listed as compatible with this lock.",
            ),
        };
        ActionError::soft(agent_message)
            .with_console(format!(
                "{} failed; key '{}' is not allowed on '{}'.",
                verb, key, ctx.owner_label
            ))
            .with_hint(hint)
            .with_context("target", ctx.owner_label)
            .with_context("key", key)
            .with_context("action", kind.as_str())
    }

    pub(crate) fn on_interact(
        &mut self,
        ctx: &InteractionContext<'_>,
        action: &ActionTry,
    ) -> InteractionResult {
        match action.kind {
            ActionType::Unlock => {
                if !self.is_locked {
                    return Ok("already unlocked".to_string());
                }
                if !self.has_key(action) {
                    return Err(Self::wrong_key(ctx, ActionType::Unlock));
                }
                self.is_locked = false;
                Ok("unlocked".to_string())
            }
            ActionType::Lock => {
                if self.is_locked {
                    return Ok("already locked".to_string());
                }
                if !self.has_key(action) {
                    return Err(Self::wrong_key(ctx, ActionType::Lock));
                }
                if ctx.is_open == Some(true) {
                    return Err(ActionError::soft("Close the object before locking it.")
                        .with_console(format!(
                            "Lock prevented because '{}' is still open.",
                            ctx.owner_label
                        ))
                        .with_hint("Close it first, then lock it.")
                        .with_context("target", ctx.owner_label)
                        .with_context("action", ActionType::Lock.as_str()));
                }
                self.is_locked = true;
                Ok("locked".to_string())
            }
            other => Err(unsupported("lockable", ctx, other)),
        }
    }

    pub(crate) fn on_perceive(&self, info: &mut PerceivedInfo) {
        info.insert(
            "lock_state",
            if self.is_locked { "locked" } else { "unlocked" },
        );
    }
}
