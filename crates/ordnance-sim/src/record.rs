//! Munition record: one tracked munition and its detonation modifiers.
//!
//! Stored in a [`crate::Tracker`], NOT as ECS components. The handle is weak:
//! the world owns the entity and may destroy it at any time.

use hecs::{Entity, World};

use ordnance_core::enums::MunitionClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MunitionRecord {
    pub handle: Entity,
    /// Whether the bonus amplification profile applies at detonation.
    pub applies_bonus_effect: bool,
    pub class: MunitionClass,
}

impl MunitionRecord {
    pub fn new(handle: Entity, applies_bonus_effect: bool, class: MunitionClass) -> Self {
        Self {
            handle,
            applies_bonus_effect,
            class,
        }
    }

    pub fn standard(handle: Entity) -> Self {
        Self::new(handle, false, MunitionClass::Standard)
    }

    pub fn limited(handle: Entity) -> Self {
        Self::new(handle, false, MunitionClass::SecondaryLimited)
    }

    pub fn with_bonus(mut self) -> Self {
        self.applies_bonus_effect = true;
        self
    }

    /// The entity was destroyed by someone else since it was registered.
    pub fn is_stale(&self, world: &World) -> bool {
        !world.contains(self.handle)
    }
}
