//! Simulation engine — the authoritative side of ORDNANCE.
//!
//! `SimulationEngine` owns the hecs ECS world and one [`Tracker`] per actor,
//! processes client requests, resolves detonations, and produces the
//! [`ServerMessage`]s to replicate each tick. Completely headless, enabling
//! deterministic testing.

use std::collections::{BTreeMap, HashMap, VecDeque};

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ordnance_core::commands::ClientMessage;
use ordnance_core::components::{Loadout, TeamFilter};
use ordnance_core::config::OrdnanceConfig;
use ordnance_core::enums::{MunitionClass, TeamIndex};
use ordnance_core::events::{BlastAttack, ServerMessage, SubmunitionRequest};
use ordnance_core::types::{ActorId, Position, SimTime};

use crate::detonation::DetonationEngine;
use crate::dispatch::DispatchBuffer;
use crate::error::{Result, SimError};
use crate::record::MunitionRecord;
use crate::replication::ServerBridge;
use crate::stock::StockAccess;
use crate::systems;
use crate::tracker::Tracker;
use crate::world_setup::{self, MunitionSpec};

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub ordnance: OrdnanceConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ordnance: OrdnanceConfig::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    rng: ChaCha8Rng,
    config: OrdnanceConfig,
    detonator: DetonationEngine,
    actors: HashMap<ActorId, Entity>,
    /// Ordered so per-tick maintenance is deterministic.
    trackers: BTreeMap<ActorId, Tracker>,
    next_actor_id: u32,
    command_queue: VecDeque<ClientMessage>,
    dispatch: DispatchBuffer,
    bridge: ServerBridge,
    last_blasts: Vec<BlastAttack>,
    submunitions: Vec<SubmunitionRequest>,
    despawn_buffer: Vec<Entity>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        let ordnance = config.ordnance;
        Self {
            world: World::new(),
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            detonator: DetonationEngine::new(ordnance.bonus),
            bridge: ServerBridge::new(ordnance.stock.refund_slot),
            config: ordnance,
            actors: HashMap::new(),
            trackers: BTreeMap::new(),
            next_actor_id: 1,
            command_queue: VecDeque::new(),
            dispatch: DispatchBuffer::new(),
            last_blasts: Vec::new(),
            submunitions: Vec::new(),
            despawn_buffer: Vec::new(),
        }
    }

    /// Spawn an actor with a full default loadout and an empty tracker.
    pub fn spawn_actor(&mut self, position: Position, team: TeamIndex) -> ActorId {
        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;
        let entity = world_setup::spawn_actor(
            &mut self.world,
            id,
            position,
            team,
            self.config.stock.default_secondary_stock,
        );
        self.actors.insert(id, entity);
        self.trackers.insert(id, Tracker::new(id));
        info!(actor = %id, ?team, "actor spawned");
        id
    }

    /// Remove an actor. Its SecondaryLimited munitions are force-detonated
    /// first; the resulting blasts resolve on the next tick.
    pub fn despawn_actor(&mut self, actor: ActorId) -> Result<()> {
        let entity = self
            .actors
            .remove(&actor)
            .ok_or(SimError::UnknownActor(actor))?;
        if let Some(tracker) = self.trackers.remove(&actor) {
            let last_published =
                tracker.on_actor_destroyed(&mut self.world, &self.detonator, &mut self.dispatch);
            self.bridge.retire_actor(actor, last_published);
        }
        let _ = self.world.despawn(entity);
        info!(%actor, "actor despawned");
        Ok(())
    }

    /// Hand an existing munition entity to the actor's tracker.
    pub fn register_munition(
        &mut self,
        actor: ActorId,
        handle: Entity,
        applies_bonus_effect: bool,
        class: MunitionClass,
    ) -> Result<()> {
        let entity = self.actor_entity(actor)?;
        if !self.world.contains(handle) {
            return Err(SimError::MunitionNotAlive(handle));
        }
        let stock_limit = self.stock_limit(entity);
        let tracker = self
            .trackers
            .get_mut(&actor)
            .ok_or(SimError::UnknownActor(actor))?;
        tracker.register(
            &mut self.world,
            &self.detonator,
            &mut self.dispatch,
            MunitionRecord::new(handle, applies_bonus_effect, class),
            stock_limit,
        )?;
        Ok(())
    }

    /// Spawn a munition for `actor` on the actor's team and register it.
    pub fn spawn_munition(
        &mut self,
        actor: ActorId,
        spec: &MunitionSpec,
        applies_bonus_effect: bool,
        class: MunitionClass,
    ) -> Result<Entity> {
        let owner = self.actor_entity(actor)?;
        let team = self
            .world
            .get::<&TeamFilter>(owner)
            .map(|t| t.team)
            .unwrap_or_default();
        let handle = world_setup::spawn_munition(&mut self.world, owner, team, spec);
        self.register_munition(actor, handle, applies_bonus_effect, class)?;
        Ok(handle)
    }

    /// Scatter target dummies using the engine's seeded RNG.
    pub fn spawn_targets(
        &mut self,
        count: usize,
        center: Position,
        spread: f64,
        team: TeamIndex,
    ) -> Vec<Entity> {
        world_setup::spawn_target_dummies(&mut self.world, &mut self.rng, count, center, spread, team)
    }

    /// Local (server-side) detonate for an actor. No sound or refund.
    pub fn detonate_all(&mut self, actor: ActorId) -> Result<bool> {
        let tracker = self
            .trackers
            .get_mut(&actor)
            .ok_or(SimError::UnknownActor(actor))?;
        let success = tracker.detonate_all(&mut self.world, &self.detonator, &mut self.dispatch);
        self.bridge.publish_readiness(tracker);
        Ok(success)
    }

    /// Queue a client request for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: ClientMessage) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple requests.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = ClientMessage>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the messages to replicate.
    pub fn tick(&mut self) -> Vec<ServerMessage> {
        self.process_commands();
        self.run_systems();
        let dt = self.dt();
        self.time.advance_by(dt);
        self.bridge.take_outbox()
    }

    /// Readiness as the server last computed it.
    pub fn is_ready(&self, actor: ActorId) -> bool {
        self.trackers.get(&actor).is_some_and(Tracker::is_ready)
    }

    /// Current readiness of every actor, for seeding a newly connected client.
    pub fn readiness_snapshot(&self) -> Vec<(ActorId, bool)> {
        self.trackers
            .values()
            .map(|tracker| (tracker.actor(), tracker.is_ready()))
            .collect()
    }

    pub fn tracker(&self, actor: ActorId) -> Option<&Tracker> {
        self.trackers.get(&actor)
    }

    pub fn actor_entity(&self, actor: ActorId) -> Result<Entity> {
        self.actors
            .get(&actor)
            .copied()
            .ok_or(SimError::UnknownActor(actor))
    }

    pub fn actor_position(&self, actor: ActorId) -> Option<Position> {
        let entity = self.actors.get(&actor)?;
        self.world.get::<&Position>(*entity).ok().map(|p| *p)
    }

    /// Copy of the actor's server-side loadout, for seeding its client session.
    pub fn actor_loadout(&self, actor: ActorId) -> Option<Loadout> {
        let entity = self.actors.get(&actor)?;
        self.world.get::<&Loadout>(*entity).ok().map(|l| *l)
    }

    /// Blasts resolved during the most recent tick.
    pub fn last_blasts(&self) -> &[BlastAttack] {
        &self.last_blasts
    }

    /// Submunition requests accumulated since the last call.
    pub fn take_submunition_requests(&mut self) -> Vec<SubmunitionRequest> {
        std::mem::take(&mut self.submunitions)
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &OrdnanceConfig {
        &self.config
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for outside code that destroys munitions.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// A zero tick rate runs at 1 Hz.
    fn dt(&self) -> f64 {
        1.0 / f64::from(self.config.tick_rate.0.max(1))
    }

    /// Capacity for SecondaryLimited munitions, read from the actor's loadout.
    fn stock_limit(&self, entity: Entity) -> u32 {
        self.world
            .get::<&Loadout>(entity)
            .map(|l| l.stock(self.config.stock.capacity_slot).max_stock)
            .unwrap_or(0)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: ClientMessage) {
        match command {
            ClientMessage::RequestDetonate { actor } => {
                let Some(position) = self.actor_position(actor) else {
                    warn!(%actor, "detonate request for unknown actor");
                    return;
                };
                let Some(tracker) = self.trackers.get_mut(&actor) else {
                    warn!(%actor, "detonate request for actor without tracker");
                    return;
                };
                self.bridge.serve_detonate(
                    &mut self.world,
                    tracker,
                    &self.detonator,
                    &mut self.dispatch,
                    position,
                );
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        // 1. Area-effect resolution for everything detonated since last tick
        self.last_blasts = std::mem::take(&mut self.dispatch.blasts);
        for attack in &self.last_blasts {
            let hits = systems::blast::run(&mut self.world, attack);
            debug!(radius = attack.radius, hits = hits.len(), "blast resolved");
        }
        // 2. Movement integration
        let dt = self.dt();
        systems::movement::run(&mut self.world, dt);
        // 3. Cleanup; dead actors are torn down through their trackers
        let dead = systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
        for actor in dead {
            let _ = self.despawn_actor(actor);
        }
        // 4. Tracker maintenance and readiness replication
        for tracker in self.trackers.values_mut() {
            tracker.tick(&self.world);
            self.bridge.publish_readiness(tracker);
        }
        // 5. Feedback and submunition hand-off
        self.bridge.forward_feedback(&mut self.dispatch);
        self.submunitions.append(&mut self.dispatch.submunitions);
    }
}
