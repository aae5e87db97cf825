use serde::{Deserialize, Serialize};

/// A movement intent that keys are bound to.
///
/// The integrator and controller consume actions, never raw key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    /// Held modifier that multiplies movement speed.
    Sprint,
    /// Edge-triggered: reported once per press.
    Jump,
}

impl Action {
    /// Whether the action is a held state tracked in [`crate::InputFlags`].
    pub fn is_held(self) -> bool {
        !matches!(self, Action::Jump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_is_the_only_edge_action() {
        assert!(!Action::Jump.is_held());
        assert!(Action::MoveForward.is_held());
        assert!(Action::Sprint.is_held());
    }
}
