//! Default area-effect resolver.
//!
//! Applies a dispatched `BlastAttack` to every damageable entity in range:
//! team and attacker filtering, distance falloff, knockback, and the modded
//! damage tags.

use glam::DVec3;
use hecs::{Entity, World};

use ordnance_core::components::*;
use ordnance_core::constants::{AIRBORNE_BONUS_MULT, CRIT_MULT, REFERENCE_MASS, SWEET_SPOT_FRACTION};
use ordnance_core::enums::{AttackerFiltering, FalloffModel, ModdedDamageType};
use ordnance_core::events::BlastAttack;
use ordnance_core::types::{Position, Velocity};

/// One entity affected by a blast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlastHit {
    pub target: Entity,
    pub damage: f64,
    /// Impulse applied (before dividing by mass).
    pub impulse: DVec3,
    /// Health reached zero from this hit.
    pub killed: bool,
}

/// Damage fraction at `distance` from the center.
pub fn falloff_factor(model: FalloffModel, distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 1.0;
    }
    match model {
        FalloffModel::None => 1.0,
        FalloffModel::Linear => (1.0 - distance / radius).clamp(0.0, 1.0),
        FalloffModel::SweetSpot => {
            let inner = radius * SWEET_SPOT_FRACTION;
            if distance <= inner {
                1.0
            } else {
                let t = ((distance - inner) / (radius - inner)).clamp(0.0, 1.0);
                1.0 - t * t
            }
        }
    }
}

fn excluded(attack: &BlastAttack, entity: Entity, team: Option<&TeamFilter>) -> bool {
    if entity == attack.attacker {
        return match attack.attacker_filtering {
            AttackerFiltering::NeverHitSelf => true,
            AttackerFiltering::AlwaysHitSelf => false,
            AttackerFiltering::Default => team.is_some_and(|t| t.team == attack.team),
        };
    }
    team.is_some_and(|t| t.team == attack.team)
}

/// Resolve one blast against the world.
pub fn run(world: &mut World, attack: &BlastAttack) -> Vec<BlastHit> {
    let center = attack.position.to_dvec3();
    let has = |kind| attack.modded_types.contains(&kind);
    let mut hits = Vec::new();
    let mut marked = Vec::new();

    for (entity, (pos, health, vel, team, mass, airborne, immune)) in world.query_mut::<(
        &Position,
        &mut Health,
        Option<&mut Velocity>,
        Option<&TeamFilter>,
        Option<&Mass>,
        Option<&Airborne>,
        Option<&ForceImmune>,
    )>() {
        if excluded(attack, entity, team) {
            continue;
        }
        let offset = pos.to_dvec3() - center;
        let distance = offset.length();
        if distance > attack.radius {
            continue;
        }

        let falloff = falloff_factor(attack.falloff, distance, attack.radius);
        let mut damage = attack.base_damage * falloff;
        if attack.crit {
            damage *= CRIT_MULT;
        }
        if airborne.is_some() && has(ModdedDamageType::AirborneBonus) {
            damage *= AIRBORNE_BONUS_MULT;
        }

        let mass = mass.map_or(REFERENCE_MASS, |m| m.0).max(f64::EPSILON);
        let direction = offset.try_normalize().unwrap_or(DVec3::Z);
        let mut impulse = direction * attack.base_force * falloff + attack.bonus_force;
        if attack.can_reject_force && immune.is_some() {
            impulse = DVec3::ZERO;
        }
        if has(ModdedDamageType::ScaleForceToMass) {
            impulse *= mass / REFERENCE_MASS;
        }
        if let Some(vel) = vel {
            vel.add(impulse / mass);
        }

        let was_alive = health.current > 0.0;
        health.current = (health.current - damage).max(0.0);

        if airborne.is_some() && has(ModdedDamageType::MarkForAirshot) {
            marked.push(entity);
        }
        hits.push(BlastHit {
            target: entity,
            damage,
            impulse,
            killed: was_alive && health.current <= 0.0,
        });
    }

    for entity in marked {
        let _ = world.insert_one(entity, AirshotMark);
    }
    hits
}
