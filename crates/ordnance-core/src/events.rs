//! Events emitted by the simulation.
//!
//! Two families live here: [`ServerMessage`]s replicated to clients, and the
//! dispatch records handed to the area-effect, effect and audio collaborators.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::components::DamageFlags;
use crate::enums::*;
use crate::types::{ActorId, Position};

/// Messages pushed from the authoritative side to every client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// An actor's readiness flag changed.
    ReadinessChanged { actor: ActorId, ready: bool },
    /// Feedback sound at a world position.
    Sound(SoundRequest),
    /// Visual effect at a world position.
    Effect(EffectRequest),
    /// Give one unit of stock back to the actor's owning client.
    StockRefund { actor: ActorId, slot: SkillSlot },
}

/// A single area-effect dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct BlastAttack {
    pub attacker: hecs::Entity,
    pub inflictor: hecs::Entity,
    pub position: Position,
    pub radius: f64,
    pub base_damage: f64,
    pub base_force: f64,
    pub bonus_force: DVec3,
    pub crit: bool,
    pub color: DamageColor,
    pub damage_type: DamageFlags,
    pub modded_types: Vec<ModdedDamageType>,
    pub team: TeamIndex,
    pub attacker_filtering: AttackerFiltering,
    pub proc_coefficient: f64,
    pub falloff: FalloffModel,
    pub can_reject_force: bool,
}

/// Visual effect request. `scale` is the blast radius for explosions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectRequest {
    pub effect: EffectKind,
    pub origin: Position,
    pub scale: f64,
}

/// Sound request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundRequest {
    pub cue: SoundCue,
    pub position: Position,
}

/// Request to the projectile spawner for a flak burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmunitionRequest {
    pub owner: hecs::Entity,
    pub origin: Position,
    pub count: u32,
    /// Damage coefficient per fragment, already bonus-scaled.
    pub damage_coefficient: f64,
}
