use std::fmt;
use std::sync::Arc;

use super::{unsupported, InteractionContext};
use crate::perception::PerceivedInfo;
use crate::results::{ActionError, InteractionResult};
use crate::value_objects::{ActionTry, ActionType};

/// Effect run on USE. `Ok(None)` means "nothing to report".
pub type UseEffect =
    Arc<dyn Fn(&InteractionContext<'_>, &ActionTry) -> Result<Option<String>, ActionError> + Send + Sync>;

/// Scripted behaviour triggered by USE: levers, buttons, switches
#[derive(Clone)]
pub struct Usable {
    effect: UseEffect,
    perception_tag: Option<String>,
}

impl Usable {
    pub const ACTIONS: &'static [ActionType] = &[ActionType::Use];

    pub fn new<F>(effect: F) -> Self
    where
        F: Fn(&InteractionContext<'_>, &ActionTry) -> Result<Option<String>, ActionError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            effect: Arc::new(effect),
            perception_tag: None,
        }
    }

    /// Usable whose effect reports nothing.
    pub fn inert() -> Self {
        Self::new(|_, _| Ok(None))
    }

    /// Tag listed under `capabilities` when the owner is perceived.
    pub fn with_perception_tag(mut self, tag: impl Into<String>) -> Self {
        self.perception_tag = Some(tag.into());
        self
    }

    #[inline]
    pub fn perception_tag(&self) -> Option<&str> {
        self.perception_tag.as_deref()
    }

    pub(crate) fn on_interact(
        &mut self,
        ctx: &InteractionContext<'_>,
        action: &ActionTry,
    ) -> InteractionResult {
        match action.kind {
            ActionType::Use => Ok((self.effect)(ctx, action)?.unwrap_or_else(|| "used".to_string())),
            other => Err(unsupported("usable", ctx, other)),
        }
    }

    pub(crate) fn on_perceive(&self, info: &mut PerceivedInfo) {
        let Some(tag) = &self.perception_tag else {
            return;
        };
        let mut tags = match info.get("capabilities") {
            Some(serde_json::Value::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        tags.push(serde_json::Value::from(tag.as_str()));
        info.insert("capabilities", tags);
    }
}

impl fmt::Debug for Usable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Usable")
            .field("perception_tag", &self.perception_tag)
            .finish_non_exhaustive()
    }
}
