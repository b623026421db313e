use serde::{Deserialize, Serialize};

use super::{unsupported, InteractionContext};
use crate::perception::PerceivedInfo;
use crate::results::{ActionError, InteractionResult};
use crate::value_objects::{ActionTry, ActionType};

/// Something with a lid or a leaf: chests, cabinets, doors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Openable {
    is_open: bool,
    /// How much of the inside shows while closed, 0..1
    visibility_when_closed: f64,
}

impl Openable {
    pub const ACTIONS: &'static [ActionType] = &[ActionType::Open, ActionType::Close];

    pub fn new(initially_open: bool, visibility_when_closed: f64) -> Self {
        Self {
            is_open: initially_open,
            visibility_when_closed,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    #[inline]
    pub fn visibility_when_closed(&self) -> f64 {
        self.visibility_when_closed
    }

    pub(crate) fn on_interact(
        &mut self,
        ctx: &InteractionContext<'_>,
        action: &ActionTry,
    ) -> InteractionResult {
        match action.kind {
            ActionType::Open => {
                if self.is_open {
                    return Ok("already open".to_string());
                }
                if ctx.is_locked == Some(true) {
                    return Err(ActionError::soft(
                        "The object is locked; unlock it before opening.",
                    )
                    .with_console(format!(
                        "Open blocked because '{}' is locked.",
                        ctx.owner_label
                    ))
                    .with_hint("Use the UNLOCK operator with the correct key first.")
                    .with_context("target", ctx.owner_label)
                    .with_context("action", ActionType::Open.as_str()));
                }
                self.is_open = true;
                Ok("opened".to_string())
            }
            ActionType::Close => {
                if !self.is_open {
                    return Ok("already closed".to_string());
                }
                if ctx.is_locked == Some(true) {
                    return Err(ActionError::soft(
                        "The object is locked and cannot be closed right now.",
                    )
                    .with_console(format!(
                        "Close blocked because '{}' is locked.",
                        ctx.owner_label
                    ))
                    .with_hint("Unlock it first.")
                    .with_context("target", ctx.owner_label)
                    .with_context("action", ActionType::Close.as_str()));
                }
                self.is_open = false;
                Ok("closed".to_string())
            }
            other => Err(unsupported("openable", ctx, other)),
        }
    }

    pub(crate) fn on_perceive(&self, info: &mut PerceivedInfo) {
        info.insert("state", if self.is_open { "open" } else { "closed" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::tests::context;

    #[test]
    fn open_on_open_object_is_a_no_op() {
        let mut openable = Openable::new(true, 0.0);
        let result = openable.on_interact(&context(), &ActionTry::new(ActionType::Open));
        assert_eq!(result, Ok("already open".to_string()));
        assert!(openable.is_open());
    }

    #[test]
    fn open_while_locked_is_soft_and_leaves_state() {
        let mut openable = Openable::new(false, 0.0);
        let ctx = InteractionContext {
            is_locked: Some(true),
            ..context()
        };
        let err = openable
            .on_interact(&ctx, &ActionTry::new(ActionType::Open))
            .unwrap_err();
        assert!(err.is_soft());
        assert_eq!(err.feedback().context["target"], "chest_3");
        assert_eq!(err.feedback().context["action"], "open");
        assert!(!openable.is_open());
    }

    #[test]
    fn close_mirrors_open() {
        let mut openable = Openable::new(true, 0.0);
        let close = ActionTry::new(ActionType::Close);
        assert_eq!(openable.on_interact(&context(), &close), Ok("closed".to_string()));
        assert_eq!(
            openable.on_interact(&context(), &close),
            Ok("already closed".to_string())
        );

        let mut stuck = Openable::new(true, 0.0);
        let ctx = InteractionContext {
            is_locked: Some(true),
            ..context()
        };
        assert!(stuck.on_interact(&ctx, &close).unwrap_err().is_soft());
        assert!(stuck.is_open());
    }

    #[test]
    fn unrelated_action_is_hard() {
        let mut openable = Openable::new(true, 0.0);
        let err = openable
            .on_interact(&context(), &ActionTry::new(ActionType::Use))
            .unwrap_err();
        assert!(err.is_hard());
    }

    #[test]
    fn perceive_reports_state() {
        let mut info = PerceivedInfo::new();
        Openable::new(false, 0.3).on_perceive(&mut info);
        assert_eq!(info.get("state"), Some(&serde_json::Value::from("closed")));
    }
}
