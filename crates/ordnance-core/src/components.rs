//! ECS components for hecs entities.
//!
//! Components are plain data structs. A munition's behavior on detonation is
//! decided entirely by which of these descriptors it carries; game logic lives
//! in the simulation crate.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::ActorId;

/// Bit set of vanilla damage-type flags carried by a damage descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageFlags(pub u32);

impl DamageFlags {
    pub const GENERIC: DamageFlags = DamageFlags(0);
    pub const STUN_1S: DamageFlags = DamageFlags(1 << 0);
    pub const SILENT: DamageFlags = DamageFlags(1 << 1);
    pub const IGNITE: DamageFlags = DamageFlags(1 << 2);
    pub const SLOW: DamageFlags = DamageFlags(1 << 3);

    /// True if every bit of `other` is set in `self`.
    pub fn contains(self, other: DamageFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for DamageFlags {
    type Output = DamageFlags;

    fn bitor(self, rhs: DamageFlags) -> DamageFlags {
        DamageFlags(self.0 | rhs.0)
    }
}

/// Damage-carrying capability of a munition.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DamageInfo {
    /// Base damage before the blast coefficient.
    pub damage: f64,
    /// Base outward knockback force.
    pub force: f64,
    pub crit: bool,
    pub color: DamageColor,
    pub damage_type: DamageFlags,
}

/// Collision descriptor: who fired the munition.
/// `owner` is `None` when the firing actor no longer exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectileController {
    pub owner: Option<hecs::Entity>,
}

/// Area-effect tuning of a munition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImpactExplosion {
    /// Multiplier applied to `DamageInfo::damage` for the blast.
    pub blast_damage_coefficient: f64,
    /// Blast radius in meters.
    pub blast_radius: f64,
    /// Fixed knockback vector added on top of the outward force.
    pub bonus_blast_force: DVec3,
    pub blast_proc_coefficient: f64,
    /// Whether targets may reject the knockback.
    pub can_reject_force: bool,
    pub falloff: FalloffModel,
}

impl Default for ImpactExplosion {
    fn default() -> Self {
        Self {
            blast_damage_coefficient: 1.0,
            blast_radius: crate::constants::DEFAULT_BLAST_RADIUS,
            bonus_blast_force: DVec3::ZERO,
            blast_proc_coefficient: 1.0,
            can_reject_force: true,
            falloff: FalloffModel::None,
        }
    }
}

/// Self-impulse: a detonation near the owner launches the owner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlastJump {
    pub force: f64,
    /// Maximum owner distance for the impulse to apply.
    pub radius: f64,
}

/// Team/faction descriptor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TeamFilter {
    pub team: TeamIndex,
}

/// Extra damage tags copied verbatim into the blast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModdedDamageTypes {
    pub types: Vec<ModdedDamageType>,
}

impl ModdedDamageTypes {
    pub fn has(&self, kind: ModdedDamageType) -> bool {
        self.types.contains(&kind)
    }
}

/// Munition splits into a flak burst when detonated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlakPayload {
    pub count: u32,
    pub damage_coefficient: f64,
}

/// Marks an entity as a tracked munition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Munition;

/// Marks an entity as an actor and gives its network identity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
}

/// Current and maximum count of one resource-stock slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSlot {
    pub stock: u32,
    pub max_stock: u32,
}

impl StockSlot {
    pub fn full(max_stock: u32) -> Self {
        Self {
            stock: max_stock,
            max_stock,
        }
    }
}

/// Per-actor skill stocks, one per named slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    pub primary: StockSlot,
    pub secondary: StockSlot,
    pub utility: StockSlot,
    pub special: StockSlot,
}

impl Loadout {
    pub fn slot(&self, slot: SkillSlot) -> &StockSlot {
        match slot {
            SkillSlot::Primary => &self.primary,
            SkillSlot::Secondary => &self.secondary,
            SkillSlot::Utility => &self.utility,
            SkillSlot::Special => &self.special,
        }
    }

    pub fn slot_mut(&mut self, slot: SkillSlot) -> &mut StockSlot {
        match slot {
            SkillSlot::Primary => &mut self.primary,
            SkillSlot::Secondary => &mut self.secondary,
            SkillSlot::Utility => &mut self.utility,
            SkillSlot::Special => &mut self.special,
        }
    }
}

/// Hit points of a damageable entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn full(max: f64) -> Self {
        Self { current: max, max }
    }
}

/// Mass in kilograms. Entities without it are treated as `REFERENCE_MASS`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mass(pub f64);

/// Entity is currently off the ground.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Airborne;

/// Entity was marked by a blast for a follow-up airshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AirshotMark;

/// Entity ignores knockback from blasts whose force is rejectable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForceImmune;
