//! Detonation of a single tracked munition.
//!
//! The outcome is decided by the capability components the munition carries.
//! Missing capabilities degrade the effect; they never abort the detonation.
//! The munition entity is always despawned.

use glam::DVec3;
use hecs::{Entity, World};
use tracing::debug;

use ordnance_core::components::*;
use ordnance_core::config::BonusProfile;
use ordnance_core::constants::REFERENCE_MASS;
use ordnance_core::enums::{AttackerFiltering, EffectKind};
use ordnance_core::events::{BlastAttack, EffectRequest, SubmunitionRequest};
use ordnance_core::types::{Position, Velocity};

use crate::dispatch::Dispatcher;
use crate::record::MunitionRecord;

/// Capability set of a munition, resolved once per detonation.
struct Capabilities {
    damage: Option<DamageInfo>,
    controller: Option<ProjectileController>,
    explosion: Option<ImpactExplosion>,
    blast_jump: Option<BlastJump>,
    team: Option<TeamFilter>,
    modded: Vec<ordnance_core::enums::ModdedDamageType>,
    flak: Option<FlakPayload>,
    position: Option<Position>,
}

impl Capabilities {
    fn resolve(world: &World, handle: Entity) -> Self {
        Self {
            damage: world.get::<&DamageInfo>(handle).ok().map(|c| *c),
            controller: world.get::<&ProjectileController>(handle).ok().map(|c| *c),
            explosion: world.get::<&ImpactExplosion>(handle).ok().map(|c| *c),
            blast_jump: world.get::<&BlastJump>(handle).ok().map(|c| *c),
            team: world.get::<&TeamFilter>(handle).ok().map(|c| *c),
            modded: world
                .get::<&ModdedDamageTypes>(handle)
                .map(|c| c.types.clone())
                .unwrap_or_default(),
            flak: world.get::<&FlakPayload>(handle).ok().map(|c| *c),
            position: world.get::<&Position>(handle).ok().map(|c| *c),
        }
    }
}

/// Multipliers in effect for one detonation.
#[derive(Debug, Clone, Copy)]
struct Scaling {
    damage: f64,
    force: f64,
    radius: f64,
    min_radius: Option<f64>,
}

impl Scaling {
    fn for_record(profile: &BonusProfile, record: &MunitionRecord) -> Self {
        if record.applies_bonus_effect {
            Self {
                damage: profile.damage_mult,
                force: profile.force_mult,
                radius: profile.radius_mult,
                min_radius: Some(profile.min_radius),
            }
        } else {
            Self {
                damage: 1.0,
                force: 1.0,
                radius: 1.0,
                min_radius: None,
            }
        }
    }

    fn blast_radius(&self, base: f64) -> f64 {
        match self.min_radius {
            Some(min) => (base * self.radius).max(min),
            None => base,
        }
    }
}

/// Stateless detonator. Holds only the bonus amplification profile.
#[derive(Debug, Clone, Default)]
pub struct DetonationEngine {
    profile: BonusProfile,
}

impl DetonationEngine {
    pub fn new(profile: BonusProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &BonusProfile {
        &self.profile
    }

    /// Detonate one munition. Returns true if a blast was dispatched.
    /// The entity is destroyed either way.
    pub fn detonate(
        &self,
        world: &mut World,
        record: &MunitionRecord,
        dispatcher: &mut impl Dispatcher,
    ) -> bool {
        let dispatched = self.apply_effects(world, record, dispatcher);
        if world.despawn(record.handle).is_err() {
            debug!(munition = ?record.handle, "munition already gone at detonation");
        }
        dispatched
    }

    fn apply_effects(
        &self,
        world: &mut World,
        record: &MunitionRecord,
        dispatcher: &mut impl Dispatcher,
    ) -> bool {
        let caps = Capabilities::resolve(world, record.handle);

        // Unarmed: never got a controller or blast tuning.
        let (Some(controller), Some(explosion)) = (caps.controller, caps.explosion) else {
            debug!(munition = ?record.handle, "munition unarmed, destroying without effect");
            return false;
        };

        let scaling = Scaling::for_record(&self.profile, record);

        // Self-impulse goes first so the owner is moving before the blast lands.
        if let (Some(jump), Some(owner), Some(origin)) =
            (caps.blast_jump, controller.owner, caps.position)
        {
            apply_blast_jump(world, owner, origin, jump, &scaling);
        }

        let (Some(damage), Some(team), Some(owner), Some(position)) =
            (caps.damage, caps.team, controller.owner, caps.position)
        else {
            debug!(munition = ?record.handle, "munition missing damage, team, owner or position");
            return false;
        };

        let attack = BlastAttack {
            attacker: owner,
            inflictor: owner,
            position,
            radius: scaling.blast_radius(explosion.blast_radius),
            base_damage: damage.damage * explosion.blast_damage_coefficient * scaling.damage,
            base_force: damage.force * scaling.force,
            bonus_force: explosion.bonus_blast_force * scaling.force,
            crit: damage.crit,
            color: damage.color,
            damage_type: damage.damage_type,
            modded_types: caps.modded,
            team: team.team,
            attacker_filtering: AttackerFiltering::NeverHitSelf,
            proc_coefficient: explosion.blast_proc_coefficient,
            falloff: explosion.falloff,
            can_reject_force: explosion.can_reject_force,
        };

        let effect = if damage
            .damage_type
            .contains(DamageFlags::SILENT | DamageFlags::STUN_1S)
        {
            EffectKind::ConcussionExplosion
        } else {
            EffectKind::Explosion
        };
        dispatcher.spawn_effect(EffectRequest {
            effect,
            origin: position,
            scale: attack.radius,
        });

        if let Some(flak) = caps.flak {
            dispatcher.spawn_submunitions(SubmunitionRequest {
                owner,
                origin: position,
                count: flak.count,
                damage_coefficient: flak.damage_coefficient * scaling.damage,
            });
        }

        debug!(
            munition = ?record.handle,
            radius = attack.radius,
            damage = attack.base_damage,
            bonus = record.applies_bonus_effect,
            "blast dispatched"
        );
        dispatcher.fire_blast(attack);
        true
    }
}

/// Push the owner away from the detonation point if it is within reach.
fn apply_blast_jump(
    world: &mut World,
    owner: Entity,
    origin: Position,
    jump: BlastJump,
    scaling: &Scaling,
) {
    let force = jump.force * scaling.force;
    let reach = jump.radius * scaling.radius;

    let Ok((pos, vel, mass)) =
        world.query_one_mut::<(&Position, &mut Velocity, Option<&Mass>)>(owner)
    else {
        return;
    };

    let offset = pos.to_dvec3() - origin.to_dvec3();
    if offset.length() > reach {
        return;
    }
    let direction = offset.try_normalize().unwrap_or(DVec3::Z);
    let mass = mass.map_or(REFERENCE_MASS, |m| m.0).max(f64::EPSILON);
    vel.add(direction * force / mass);
}
