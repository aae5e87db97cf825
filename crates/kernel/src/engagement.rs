use serde::{Deserialize, Serialize};

/// Pointer-lock gate. Physics only runs while engaged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Engagement {
    #[default]
    Disengaged,
    Engaged,
}

impl Engagement {
    pub fn is_engaged(self) -> bool {
        matches!(self, Engagement::Engaged)
    }

    /// Returns true if the state changed.
    pub fn engage(&mut self) -> bool {
        let changed = !self.is_engaged();
        *self = Engagement::Engaged;
        changed
    }

    /// Returns true if the state changed.
    pub fn disengage(&mut self) -> bool {
        let changed = self.is_engaged();
        *self = Engagement::Disengaged;
        changed
    }
}
