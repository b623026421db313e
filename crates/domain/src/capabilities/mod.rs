//! Capabilities: composable affordances attached to entities
//!
//! An entity stores at most one capability per [`CapabilityKind`]. Callers
//! check [`Capability::supports`] and then dispatch; capabilities validate
//! the current state before mutating, so a failed attempt leaves the owner
//! untouched.

mod lockable;
mod openable;
mod usable;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use lockable::Lockable;
pub use openable::Openable;
pub use usable::{Usable, UseEffect};

use crate::ids::EntityId;
use crate::perception::PerceivedInfo;
use crate::results::{ActionError, InteractionResult};
use crate::value_objects::{ActionTry, ActionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Openable,
    Lockable,
    Usable,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Openable => write!(f, "openable"),
            Self::Lockable => write!(f, "lockable"),
            Self::Usable => write!(f, "usable"),
        }
    }
}

/// What a capability needs to know about the attempt and its owner
///
/// `is_locked` and `is_open` carry the state of sibling capabilities on the
/// same owner, `None` when the owner has no such capability.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    pub actor: EntityId,
    pub actor_label: &'a str,
    pub owner: EntityId,
    pub owner_label: &'a str,
    /// Readable id of the item in `ActionTry::item`, if it resolved
    pub key_label: Option<&'a str>,
    pub is_locked: Option<bool>,
    pub is_open: Option<bool>,
}

#[derive(Debug, Clone)]
pub enum Capability {
    Openable(Openable),
    Lockable(Lockable),
    Usable(Usable),
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::Openable(_) => CapabilityKind::Openable,
            Self::Lockable(_) => CapabilityKind::Lockable,
            Self::Usable(_) => CapabilityKind::Usable,
        }
    }

    pub fn action_types(&self) -> &'static [ActionType] {
        match self {
            Self::Openable(_) => Openable::ACTIONS,
            Self::Lockable(_) => Lockable::ACTIONS,
            Self::Usable(_) => Usable::ACTIONS,
        }
    }

    pub fn supports(&self, action: ActionType) -> bool {
        self.action_types().contains(&action)
    }

    pub fn on_interact(
        &mut self,
        ctx: &InteractionContext<'_>,
        action: &ActionTry,
    ) -> InteractionResult {
        match self {
            Self::Openable(openable) => openable.on_interact(ctx, action),
            Self::Lockable(lockable) => lockable.on_interact(ctx, action),
            Self::Usable(usable) => usable.on_interact(ctx, action),
        }
    }

    /// Enrich the owner's perceived info with capability state.
    pub fn on_perceive(&self, info: &mut PerceivedInfo) {
        match self {
            Self::Openable(openable) => openable.on_perceive(info),
            Self::Lockable(lockable) => lockable.on_perceive(info),
            Self::Usable(usable) => usable.on_perceive(info),
        }
    }
}

impl From<Openable> for Capability {
    fn from(value: Openable) -> Self {
        Self::Openable(value)
    }
}

impl From<Lockable> for Capability {
    fn from(value: Lockable) -> Self {
        Self::Lockable(value)
    }
}

impl From<Usable> for Capability {
    fn from(value: Usable) -> Self {
        Self::Usable(value)
    }
}

/// Dispatch reached a capability that does not handle `action`.
fn unsupported(capability: &str, ctx: &InteractionContext<'_>, action: ActionType) -> ActionError {
    ActionError::hard(format!("You cannot {} that.", action))
        .with_console(format!(
            "{} capability on '{}' does not handle '{}'.",
            capability, ctx.owner_label, action
        ))
        .with_context("target", ctx.owner_label)
        .with_context("action", action.as_str())
}
