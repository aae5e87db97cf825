use crate::{Action, Key, KeyBindings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Held movement intent, read by the integrator once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

impl InputFlags {
    /// True when any of the four direction flags is set.
    pub fn any_movement(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    fn set(&mut self, action: Action, value: bool) {
        match action {
            Action::MoveForward => self.forward = value,
            Action::MoveBackward => self.backward = value,
            Action::StrafeLeft => self.left = value,
            Action::StrafeRight => self.right = value,
            Action::Sprint => self.sprint = value,
            Action::Jump => {}
        }
    }
}

/// Turns raw key-down / key-up events into [`InputFlags`] and jump edges.
///
/// A flag stays set while any key bound to its action is held, so releasing
/// `ShiftLeft` keeps sprinting if `ShiftRight` is still down.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    bindings: KeyBindings,
    held: BTreeSet<Key>,
    flags: InputFlags,
}

impl InputTracker {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: BTreeSet::new(),
            flags: InputFlags::default(),
        }
    }

    pub fn flags(&self) -> InputFlags {
        self.flags
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Record a key press. Returns `Some(Action::Jump)` on the press
    /// transition of a jump key; auto-repeat while held returns `None`.
    pub fn key_down(&mut self, key: Key) -> Option<Action> {
        let newly_pressed = self.held.insert(key);
        let action = self.bindings.action(key)?;
        if action.is_held() {
            self.flags.set(action, true);
            None
        } else if newly_pressed {
            Some(action)
        } else {
            None
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if !self.held.remove(&key) {
            return;
        }
        let Some(action) = self.bindings.action(key) else {
            return;
        };
        if action.is_held() {
            let still_held = self.bindings.keys_for(action).any(|k| self.held.contains(&k));
            self.flags.set(action, still_held);
        }
    }

    /// Key-down from a platform key-code string; unknown codes are ignored.
    pub fn on_key_down(&mut self, code: &str) -> Option<Action> {
        match Key::from_code(code) {
            Some(key) => self.key_down(key),
            None => {
                tracing::trace!("ignoring key down for unrecognized code {code:?}");
                None
            }
        }
    }

    /// Key-up from a platform key-code string; unknown codes are ignored.
    pub fn on_key_up(&mut self, code: &str) {
        match Key::from_code(code) {
            Some(key) => self.key_up(key),
            None => tracing::trace!("ignoring key up for unrecognized code {code:?}"),
        }
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.flags = InputFlags::default();
    }
}
