//! Cleanup system: removes destroyed entities.

use hecs::{Entity, World};

use ordnance_core::components::{Actor, Health};
use ordnance_core::types::ActorId;

/// Despawn non-actor entities whose health reached zero.
/// Dead actors are returned instead: their trackers must be torn down first.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) -> Vec<ActorId> {
    despawn_buffer.clear();
    let mut dead_actors = Vec::new();

    for (entity, (health, actor)) in world.query_mut::<(&Health, Option<&Actor>)>() {
        if health.current > 0.0 {
            continue;
        }
        match actor {
            Some(actor) => dead_actors.push(actor.id),
            None => despawn_buffer.push(entity),
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    dead_actors.sort();
    dead_actors
}
