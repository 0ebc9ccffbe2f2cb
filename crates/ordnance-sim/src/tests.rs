//! Tests for the simulation engine, detonation flow, and client replication.

use ordnance_core::commands::ClientMessage;
use ordnance_core::components::{FlakPayload, Health, Loadout, StockSlot, TeamFilter};
use ordnance_core::config::{OrdnanceConfig, TickRate};
use ordnance_core::enums::*;
use ordnance_core::events::ServerMessage;
use ordnance_core::types::{ActorId, Position, Velocity};

use crate::engine::{SimConfig, SimulationEngine};
use crate::error::{SimError, TrackerError};
use crate::replication::ServerEndpoint;
use crate::world_setup::MunitionSpec;

fn engine() -> SimulationEngine {
    SimulationEngine::new(SimConfig::default())
}

fn readiness(messages: &[ServerMessage], actor: ActorId) -> Vec<bool> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::ReadinessChanged { actor: a, ready } if *a == actor => Some(*ready),
            _ => None,
        })
        .collect()
}

fn has_refund(messages: &[ServerMessage]) -> bool {
    messages
        .iter()
        .any(|m| matches!(m, ServerMessage::StockRefund { .. }))
}

// ---- Remote detonate ----

#[test]
fn test_empty_detonate_refunds_stock() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let mut server = ServerEndpoint::new();
    let mut loadout = engine.actor_loadout(actor).unwrap();
    // The skill spent its charge on the way to requesting detonation.
    loadout.secondary = StockSlot {
        stock: 0,
        max_stock: 1,
    };
    let mut session = server
        .connect(actor, loadout, &engine.readiness_snapshot())
        .unwrap();

    session.request_detonate().unwrap();
    engine.queue_commands(server.drain_requests());
    let messages = engine.tick();
    server.broadcast(&messages);
    session.poll();

    assert!(engine.last_blasts().is_empty());
    assert!(has_refund(&messages));
    assert_eq!(session.loadout().secondary.stock, 1);
    let feedback = session.take_feedback();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0].cue, SoundCue::DetonateFail);
}

#[test]
fn test_refund_does_not_exceed_max_stock() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let mut server = ServerEndpoint::new();
    let mut session = server
        .connect(actor, engine.actor_loadout(actor).unwrap(), &[])
        .unwrap();

    session.request_detonate().unwrap();
    engine.queue_commands(server.drain_requests());
    server.broadcast(&engine.tick());
    session.poll();

    assert_eq!(session.loadout().secondary, StockSlot::full(1));
}

#[test]
fn test_single_standard_munition_detonates_once() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let spec = MunitionSpec::charge(Position::new(20.0, 0.0, 0.0));
    let m = engine
        .spawn_munition(actor, &spec, false, MunitionClass::Standard)
        .unwrap();
    let first = engine.tick();
    assert_eq!(readiness(&first, actor), vec![true]);

    engine.queue_command(ClientMessage::RequestDetonate { actor });
    let messages = engine.tick();

    assert_eq!(engine.last_blasts().len(), 1);
    assert_eq!(engine.last_blasts()[0].radius, spec.explosion.blast_radius);
    assert!(!engine.world().contains(m));
    assert!(!has_refund(&messages));
    assert_eq!(readiness(&messages, actor), vec![false]);
    assert!(messages.iter().any(|m| matches!(
        m,
        ServerMessage::Sound(s) if s.cue == SoundCue::DetonateSuccess
    )));
    assert!(messages.iter().any(|m| matches!(
        m,
        ServerMessage::Effect(e) if e.effect == EffectKind::Explosion
    )));
}

#[test]
fn test_bonus_radius_respects_floor() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let spec = MunitionSpec::rocket(Position::new(20.0, 0.0, 0.0));
    engine
        .spawn_munition(actor, &spec, true, MunitionClass::Standard)
        .unwrap();
    engine.tick();
    engine.detonate_all(actor).unwrap();
    engine.tick();

    let profile = engine.config().bonus;
    let expected = (spec.explosion.blast_radius * profile.radius_mult).max(profile.min_radius);
    assert_eq!(engine.last_blasts()[0].radius, expected);
}

#[test]
fn test_unknown_actor_request_is_ignored() {
    let mut engine = engine();
    engine.queue_command(ClientMessage::RequestDetonate { actor: ActorId(99) });
    let messages = engine.tick();
    assert!(messages.is_empty());
}

// ---- Capacity and lifecycle ----

#[test]
fn test_capacity_one_force_detonates_oldest() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let a = engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::new(10.0, 0.0, 0.0)),
            false,
            MunitionClass::SecondaryLimited,
        )
        .unwrap();
    let b = engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::new(30.0, 0.0, 0.0)),
            false,
            MunitionClass::SecondaryLimited,
        )
        .unwrap();

    assert!(!engine.world().contains(a));
    assert!(engine.world().contains(b));
    engine.tick();
    assert_eq!(engine.last_blasts().len(), 1);
    assert_eq!(engine.last_blasts()[0].position.x, 10.0);
    let tracker = engine.tracker(actor).unwrap();
    assert_eq!(tracker.limited().len(), 1);
    assert_eq!(tracker.limited()[0].handle, b);
}

#[test]
fn test_readiness_replicated_on_edges_only() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::new(50.0, 0.0, 0.0)),
            false,
            MunitionClass::Standard,
        )
        .unwrap();

    assert_eq!(readiness(&engine.tick(), actor), vec![true]);
    for _ in 0..10 {
        assert!(readiness(&engine.tick(), actor).is_empty());
    }
    assert!(engine.is_ready(actor));
}

#[test]
fn test_stale_munition_purged() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let m = engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::new(50.0, 0.0, 0.0)),
            false,
            MunitionClass::SecondaryLimited,
        )
        .unwrap();
    engine.tick();

    engine.world_mut().despawn(m).unwrap();
    let messages = engine.tick();
    assert_eq!(readiness(&messages, actor), vec![false]);
    assert!(engine.tracker(actor).unwrap().is_empty());

    // Nothing left to detonate.
    engine.queue_command(ClientMessage::RequestDetonate { actor });
    assert!(has_refund(&engine.tick()));
}

#[test]
fn test_actor_death_detonates_limited_munitions() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let standard = engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::new(40.0, 0.0, 0.0)),
            false,
            MunitionClass::Standard,
        )
        .unwrap();
    let limited = engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::new(60.0, 0.0, 0.0)),
            false,
            MunitionClass::SecondaryLimited,
        )
        .unwrap();
    engine.tick();

    let entity = engine.actor_entity(actor).unwrap();
    engine.world_mut().get::<&mut Health>(entity).unwrap().current = 0.0;
    let messages = engine.tick();

    assert!(!engine.world().contains(entity));
    assert!(!engine.world().contains(limited));
    assert!(engine.world().contains(standard));
    assert!(engine.tracker(actor).is_none());
    assert_eq!(readiness(&messages, actor), vec![false]);

    engine.tick();
    assert_eq!(engine.last_blasts().len(), 1);
    assert_eq!(engine.last_blasts()[0].position.x, 60.0);
}

#[test]
fn test_late_observer_sees_current_readiness() {
    let mut engine = engine();
    let owner = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let mut server = ServerEndpoint::new();
    engine
        .spawn_munition(
            owner,
            &MunitionSpec::charge(Position::new(50.0, 0.0, 0.0)),
            false,
            MunitionClass::SecondaryLimited,
        )
        .unwrap();
    server.broadcast(&engine.tick());

    let observer = engine.spawn_actor(Position::new(0.0, 80.0, 0.0), TeamIndex::Player);
    let mut session = server
        .connect(
            observer,
            engine.actor_loadout(observer).unwrap(),
            &engine.readiness_snapshot(),
        )
        .unwrap();
    for _ in 0..5 {
        server.broadcast(&engine.tick());
    }
    session.poll();

    assert!(engine.is_ready(owner));
    assert!(session.is_ready(owner));
    assert!(!session.is_ready(observer));
}

// ---- Capacity resolution ----

fn set_secondary_max(engine: &mut SimulationEngine, actor: ActorId, max_stock: u32) {
    let entity = engine.actor_entity(actor).unwrap();
    engine
        .world_mut()
        .get::<&mut Loadout>(entity)
        .unwrap()
        .secondary = StockSlot::full(max_stock);
}

fn place_limited(engine: &mut SimulationEngine, actor: ActorId, x: f64) -> hecs::Entity {
    engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::new(x, 0.0, 0.0)),
            false,
            MunitionClass::SecondaryLimited,
        )
        .unwrap()
}

#[test]
fn test_destroyed_record_does_not_hold_a_slot() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    set_secondary_max(&mut engine, actor, 2);
    let a = place_limited(&mut engine, actor, 10.0);
    let b = place_limited(&mut engine, actor, 20.0);

    // Destroyed by someone else before the next tick's purge.
    engine.world_mut().despawn(b).unwrap();
    let c = place_limited(&mut engine, actor, 30.0);

    assert!(engine.world().contains(a), "only one live charge was tracked");
    let handles: Vec<_> = engine
        .tracker(actor)
        .unwrap()
        .limited()
        .iter()
        .map(|r| r.handle)
        .collect();
    assert_eq!(handles, vec![a, c]);
    engine.tick();
    assert!(engine.last_blasts().is_empty());
}

#[test]
fn test_lowered_max_stock_evicts_down_to_new_capacity() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    set_secondary_max(&mut engine, actor, 3);
    let placed: Vec<_> = [10.0, 20.0, 30.0]
        .into_iter()
        .map(|x| place_limited(&mut engine, actor, x))
        .collect();
    assert_eq!(engine.tracker(actor).unwrap().capacity(), 3);

    set_secondary_max(&mut engine, actor, 1);
    let d = place_limited(&mut engine, actor, 40.0);

    for m in &placed {
        assert!(!engine.world().contains(*m));
    }
    let tracker = engine.tracker(actor).unwrap();
    assert_eq!(tracker.capacity(), 1);
    assert_eq!(tracker.limited().len(), 1);
    assert_eq!(tracker.limited()[0].handle, d);

    engine.tick();
    let xs: Vec<f64> = engine.last_blasts().iter().map(|b| b.position.x).collect();
    assert_eq!(xs, vec![10.0, 20.0, 30.0], "oldest first");
}

#[test]
fn test_despawn_unknown_actor_errors() {
    let mut engine = engine();
    assert_eq!(
        engine.despawn_actor(ActorId(5)),
        Err(SimError::UnknownActor(ActorId(5)))
    );
}

#[test]
fn test_register_rejects_bad_input() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let m = engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::default()),
            false,
            MunitionClass::Standard,
        )
        .unwrap();

    assert_eq!(
        engine.register_munition(ActorId(9), m, false, MunitionClass::Standard),
        Err(SimError::UnknownActor(ActorId(9)))
    );
    assert_eq!(
        engine.register_munition(actor, m, false, MunitionClass::Standard),
        Err(SimError::Tracker(TrackerError::DuplicateMunition(m)))
    );

    engine.world_mut().despawn(m).unwrap();
    assert_eq!(
        engine.register_munition(actor, m, false, MunitionClass::Standard),
        Err(SimError::MunitionNotAlive(m))
    );
}

// ---- Blast resolution ----

#[test]
fn test_blast_damages_and_pushes_enemies() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::new(-100.0, 0.0, 0.0), TeamIndex::Player);
    let enemy = engine.world_mut().spawn((
        Position::new(3.0, 0.0, 0.0),
        Velocity::default(),
        Health::full(200.0),
        TeamFilter {
            team: TeamIndex::Monster,
        },
    ));
    engine
        .spawn_munition(
            actor,
            &MunitionSpec::charge(Position::default()),
            false,
            MunitionClass::Standard,
        )
        .unwrap();
    engine.tick();
    engine.detonate_all(actor).unwrap();
    engine.tick();

    let health = engine.world().get::<&Health>(enemy).unwrap().current;
    assert!(health < 200.0);
    let vel = *engine.world().get::<&Velocity>(enemy).unwrap();
    assert!(vel.x > 0.0, "knockback points away from the blast");
}

#[test]
fn test_flak_payload_requests_submunitions() {
    let mut engine = engine();
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let mut spec = MunitionSpec::charge(Position::new(25.0, 0.0, 0.0));
    spec.flak = Some(FlakPayload {
        count: 6,
        damage_coefficient: 0.5,
    });
    engine
        .spawn_munition(actor, &spec, false, MunitionClass::Standard)
        .unwrap();
    engine.tick();
    engine.detonate_all(actor).unwrap();
    engine.tick();

    let requests = engine.take_submunition_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].count, 6);
    assert_eq!(requests[0].origin, Position::new(25.0, 0.0, 0.0));
    assert!(engine.take_submunition_requests().is_empty());
}

// ---- Time and config ----

#[test]
fn test_tick_rate_from_config() {
    let mut engine = SimulationEngine::new(SimConfig {
        ordnance: OrdnanceConfig {
            tick_rate: TickRate(10),
            ..Default::default()
        },
        ..Default::default()
    });
    for _ in 0..10 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 10);
    assert!((engine.time().elapsed_secs - 1.0).abs() < 1e-9);
}

#[test]
fn test_zero_tick_rate_keeps_time_finite() {
    let mut engine = SimulationEngine::new(SimConfig {
        ordnance: OrdnanceConfig {
            tick_rate: TickRate(0),
            ..Default::default()
        },
        ..Default::default()
    });
    engine.tick();
    assert_eq!(engine.time().tick, 1);
    assert_eq!(engine.time().elapsed_secs, 1.0);
}

// ---- Determinism ----

fn scripted_run(seed: u64) -> (String, Vec<Position>) {
    let mut engine = SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    });
    let actor = engine.spawn_actor(Position::default(), TeamIndex::Player);
    let targets = engine.spawn_targets(8, Position::new(20.0, 0.0, 0.0), 6.0, TeamIndex::Monster);
    let placed = targets
        .iter()
        .map(|t| *engine.world().get::<&Position>(*t).unwrap())
        .collect();
    let mut log = Vec::new();

    for round in 0..5 {
        let x = 15.0 + round as f64 * 2.0;
        engine
            .spawn_munition(
                actor,
                &MunitionSpec::concussion(Position::new(x, 0.0, 0.0)),
                round % 2 == 0,
                MunitionClass::SecondaryLimited,
            )
            .unwrap();
        log.extend(engine.tick());
        engine.queue_command(ClientMessage::RequestDetonate { actor });
        for _ in 0..3 {
            log.extend(engine.tick());
        }
    }

    let survivors: Vec<(f64, f64, f64)> = targets
        .into_iter()
        .filter_map(|t| {
            let pos = *engine.world().get::<&Position>(t).ok()?;
            Some((pos.x, pos.y, engine.world().get::<&Health>(t).ok()?.current))
        })
        .collect();
    let record = serde_json::json!({ "messages": log, "survivors": survivors });
    (record.to_string(), placed)
}

#[test]
fn test_determinism_same_seed() {
    assert_eq!(scripted_run(12345), scripted_run(12345));
}

#[test]
fn test_determinism_different_seeds() {
    let (_, a) = scripted_run(111);
    let (_, b) = scripted_run(222);
    assert_ne!(a, b, "different seeds place targets differently");
}
