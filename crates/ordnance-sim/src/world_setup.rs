//! Entity spawn factories for setting up the simulation world.
//!
//! Creates actors, munitions, and target dummies with appropriate
//! component bundles.

use hecs::{Entity, EntityBuilder, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use ordnance_core::components::*;
use ordnance_core::constants::*;
use ordnance_core::enums::{ModdedDamageType, TeamIndex};
use ordnance_core::types::{ActorId, Position, Velocity};

/// Everything a spawner decides about a munition before it goes live.
#[derive(Debug, Clone)]
pub struct MunitionSpec {
    pub position: Position,
    pub damage: DamageInfo,
    pub explosion: ImpactExplosion,
    pub blast_jump: Option<BlastJump>,
    pub modded: Vec<ModdedDamageType>,
    pub flak: Option<FlakPayload>,
}

impl MunitionSpec {
    /// Primary rocket: can blast-jump its owner, scales knockback to mass.
    pub fn rocket(position: Position) -> Self {
        Self {
            position,
            damage: DamageInfo {
                damage: 30.0,
                force: 800.0,
                ..Default::default()
            },
            explosion: ImpactExplosion::default(),
            blast_jump: Some(BlastJump {
                force: DEFAULT_BLAST_JUMP_FORCE,
                radius: DEFAULT_BLAST_JUMP_RADIUS,
            }),
            modded: vec![
                ModdedDamageType::ScaleForceToMass,
                ModdedDamageType::AirborneBonus,
            ],
            flak: None,
        }
    }

    /// Secondary charge: bigger, slower blast, no self-impulse.
    pub fn charge(position: Position) -> Self {
        Self {
            position,
            damage: DamageInfo {
                damage: 50.0,
                force: 1500.0,
                ..Default::default()
            },
            explosion: ImpactExplosion {
                blast_radius: 12.0,
                ..Default::default()
            },
            blast_jump: None,
            modded: Vec::new(),
            flak: None,
        }
    }

    /// Concussion variant: silent stunning blast, marks airborne targets.
    pub fn concussion(position: Position) -> Self {
        let mut spec = Self::rocket(position);
        spec.damage.damage_type = DamageFlags::SILENT | DamageFlags::STUN_1S;
        spec.modded.push(ModdedDamageType::MarkForAirshot);
        spec
    }
}

/// Spawn an actor with a full loadout.
pub fn spawn_actor(
    world: &mut World,
    id: ActorId,
    position: Position,
    team: TeamIndex,
    secondary_stock: u32,
) -> Entity {
    world.spawn((
        Actor { id },
        position,
        Velocity::default(),
        Health::full(DEFAULT_ACTOR_HEALTH),
        TeamFilter { team },
        default_loadout(secondary_stock),
    ))
}

/// Loadout with every slot full. Secondary holds `secondary_stock`.
pub fn default_loadout(secondary_stock: u32) -> Loadout {
    Loadout {
        primary: StockSlot::full(4),
        secondary: StockSlot::full(secondary_stock),
        utility: StockSlot::full(1),
        special: StockSlot::full(1),
    }
}

/// Spawn a live munition owned by `owner`.
pub fn spawn_munition(world: &mut World, owner: Entity, team: TeamIndex, spec: &MunitionSpec) -> Entity {
    let mut builder = EntityBuilder::new();
    builder.add(Munition);
    builder.add(spec.position);
    builder.add(Velocity::default());
    builder.add(spec.damage);
    builder.add(ProjectileController { owner: Some(owner) });
    builder.add(spec.explosion);
    builder.add(TeamFilter { team });
    if let Some(jump) = spec.blast_jump {
        builder.add(jump);
    }
    if !spec.modded.is_empty() {
        builder.add(ModdedDamageTypes {
            types: spec.modded.clone(),
        });
    }
    if let Some(flak) = spec.flak {
        builder.add(flak);
    }
    world.spawn(builder.build())
}

/// Scatter damageable target dummies around `center`.
pub fn spawn_target_dummies(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    count: usize,
    center: Position,
    spread: f64,
    team: TeamIndex,
) -> Vec<Entity> {
    (0..count)
        .map(|_| {
            let offset_x = rng.gen_range(-spread..=spread);
            let offset_y = rng.gen_range(-spread..=spread);
            let position = Position::new(center.x + offset_x, center.y + offset_y, center.z);
            let mut builder = EntityBuilder::new();
            builder.add(position);
            builder.add(Velocity::default());
            builder.add(Health::full(DEFAULT_ACTOR_HEALTH));
            builder.add(TeamFilter { team });
            builder.add(Mass(rng.gen_range(50.0..400.0)));
            if rng.gen_bool(0.25) {
                builder.add(Airborne);
            }
            world.spawn(builder.build())
        })
        .collect()
}
