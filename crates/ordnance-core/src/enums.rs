//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Which collection of a tracker holds a munition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MunitionClass {
    /// Regular remote-detonatable charge. No capacity limit.
    #[default]
    Standard,
    /// Scarce secondary charge. Capacity tied to the owner's secondary stock.
    SecondaryLimited,
}

/// Team (faction) an entity fights for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamIndex {
    #[default]
    Neutral,
    Player,
    Monster,
    Void,
}

/// Color hint for floating damage numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageColor {
    #[default]
    Default,
    Weak,
    Item,
    Crit,
}

/// How blast damage decays with distance from the center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FalloffModel {
    /// Full damage across the whole radius.
    #[default]
    None,
    /// Linear decay to 0 at the edge.
    Linear,
    /// Full damage in the inner quarter of the radius, then quadratic decay.
    SweetSpot,
}

/// Whether a blast may hit the entity that caused it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackerFiltering {
    /// Hits the attacker only if it is on an enemy team (i.e. never, in practice).
    #[default]
    Default,
    /// Always includes the attacker.
    AlwaysHitSelf,
    /// Never includes the attacker, regardless of team.
    NeverHitSelf,
}

/// Extra damage tags that ride along with a blast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModdedDamageType {
    /// Knockback scales with the target's mass.
    ScaleForceToMass,
    /// Bonus damage against airborne targets.
    AirborneBonus,
    /// Marks airborne targets for a follow-up airshot.
    MarkForAirshot,
}

/// Named resource-stock slots on an actor's loadout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillSlot {
    Primary,
    #[default]
    Secondary,
    Utility,
    Special,
}

/// Sound cues emitted by the detonation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    DetonateSuccess,
    DetonateFail,
}

/// Visual effect variants for a detonation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Regular explosion.
    Explosion,
    /// Suppressed concussion blast (silent + stunning damage).
    ConcussionExplosion,
}
