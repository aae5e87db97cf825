use crate::{Action, Key};
use std::collections::BTreeMap;

/// Key to action table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    map: BTreeMap<Key, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut b = Self::empty();
        b.bind(Key::KeyW, Action::MoveForward);
        b.bind(Key::ArrowUp, Action::MoveForward);
        b.bind(Key::KeyS, Action::MoveBackward);
        b.bind(Key::ArrowDown, Action::MoveBackward);
        b.bind(Key::KeyA, Action::StrafeLeft);
        b.bind(Key::ArrowLeft, Action::StrafeLeft);
        b.bind(Key::KeyD, Action::StrafeRight);
        b.bind(Key::ArrowRight, Action::StrafeRight);
        b.bind(Key::ShiftLeft, Action::Sprint);
        b.bind(Key::ShiftRight, Action::Sprint);
        b.bind(Key::Space, Action::Jump);
        b
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Bind a key, replacing any previous binding for it.
    pub fn bind(&mut self, key: Key, action: Action) -> Option<Action> {
        self.map.insert(key, action)
    }

    pub fn unbind(&mut self, key: Key) -> Option<Action> {
        self.map.remove(&key)
    }

    pub fn action(&self, key: Key) -> Option<Action> {
        self.map.get(&key).copied()
    }

    /// All keys bound to `action`, in key order.
    pub fn keys_for(&self, action: Action) -> impl Iterator<Item = Key> + '_ {
        self.map
            .iter()
            .filter(move |(_, a)| **a == action)
            .map(|(k, _)| *k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_wasd_and_arrows() {
        let b = KeyBindings::default();
        assert_eq!(b.action(Key::KeyW), Some(Action::MoveForward));
        assert_eq!(b.action(Key::ArrowUp), Some(Action::MoveForward));
        assert_eq!(b.action(Key::KeyA), Some(Action::StrafeLeft));
        assert_eq!(b.action(Key::ArrowRight), Some(Action::StrafeRight));
        assert_eq!(b.action(Key::Space), Some(Action::Jump));
    }

    #[test]
    fn both_shift_keys_sprint() {
        let b = KeyBindings::default();
        let keys: Vec<Key> = b.keys_for(Action::Sprint).collect();
        assert_eq!(keys, vec![Key::ShiftLeft, Key::ShiftRight]);
    }

    #[test]
    fn escape_is_unbound() {
        assert_eq!(KeyBindings::default().action(Key::Escape), None);
    }

    #[test]
    fn rebind_replaces() {
        let mut b = KeyBindings::default();
        assert_eq!(b.bind(Key::Space, Action::Sprint), Some(Action::Jump));
        assert_eq!(b.action(Key::Space), Some(Action::Sprint));
        assert_eq!(b.unbind(Key::Space), Some(Action::Sprint));
        assert_eq!(b.action(Key::Space), None);
    }
}
