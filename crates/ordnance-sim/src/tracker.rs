//! Per-actor munition tracker.
//!
//! Owns the actor's live munition records, computes the readiness flag, and
//! runs bulk detonation. Stored in `SimulationEngine`'s tracker map, NOT as an
//! ECS component, so it can borrow the world mutably while detonating.

use std::collections::VecDeque;

use hecs::{Entity, World};
use tracing::debug;

use ordnance_core::enums::MunitionClass;
use ordnance_core::types::ActorId;

use crate::detonation::DetonationEngine;
use crate::dispatch::Dispatcher;
use crate::error::TrackerError;
use crate::eviction;
use crate::record::MunitionRecord;

#[derive(Debug, Clone)]
pub struct Tracker {
    actor: ActorId,
    standard: Vec<MunitionRecord>,
    /// Oldest first; front is evicted first.
    limited: VecDeque<MunitionRecord>,
    /// Authoritative readiness as of the last recompute.
    ready: bool,
    /// Last value handed to replication.
    published: bool,
    /// Capacity resolved at the most recent SecondaryLimited admission.
    capacity: usize,
}

impl Tracker {
    pub fn new(actor: ActorId) -> Self {
        Self {
            actor,
            standard: Vec::new(),
            limited: VecDeque::new(),
            ready: false,
            published: false,
            capacity: eviction::resolve_capacity(0),
        }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Readiness as of the last `tick` or `detonate_all`.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn standard(&self) -> &[MunitionRecord] {
        &self.standard
    }

    pub fn limited(&self) -> &VecDeque<MunitionRecord> {
        &self.limited
    }

    pub fn len(&self) -> usize {
        self.standard.len() + self.limited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, handle: Entity) -> bool {
        self.standard.iter().any(|r| r.handle == handle)
            || self.limited.iter().any(|r| r.handle == handle)
    }

    /// Admit a munition. SecondaryLimited records go through eviction using
    /// `stock_limit` (the owner's current max stock) as capacity; evicted
    /// records are detonated immediately. Readiness is not recomputed here.
    pub fn register(
        &mut self,
        world: &mut World,
        detonator: &DetonationEngine,
        dispatcher: &mut impl Dispatcher,
        record: MunitionRecord,
        stock_limit: u32,
    ) -> Result<(), TrackerError> {
        if self.contains(record.handle) {
            return Err(TrackerError::DuplicateMunition(record.handle));
        }

        match record.class {
            MunitionClass::Standard => self.standard.push(record),
            MunitionClass::SecondaryLimited => {
                // Destroyed records must not hold a slot.
                self.purge_stale(world);
                self.capacity = eviction::resolve_capacity(stock_limit);
                let actor = self.actor;
                eviction::admit(&mut self.limited, record, self.capacity, |oldest| {
                    debug!(%actor, munition = ?oldest.handle, "capacity reached, evicting oldest");
                    detonator.detonate(world, &oldest, dispatcher);
                });
            }
        }
        debug!(actor = %self.actor, munition = ?record.handle, class = ?record.class, "munition registered");
        Ok(())
    }

    /// Per-tick maintenance: purge stale records and recompute readiness.
    pub fn tick(&mut self, world: &World) {
        self.purge_stale(world);
        self.recompute_readiness();
    }

    /// Detonate every tracked munition, Standard first, then SecondaryLimited,
    /// each in insertion order. Both collections are empty afterwards.
    /// Returns whether at least one munition produced a blast.
    pub fn detonate_all(
        &mut self,
        world: &mut World,
        detonator: &DetonationEngine,
        dispatcher: &mut impl Dispatcher,
    ) -> bool {
        self.purge_stale(world);

        let mut any = false;
        for record in self.standard.drain(..).chain(self.limited.drain(..)) {
            any |= detonator.detonate(world, &record, dispatcher);
        }

        self.recompute_readiness();
        debug!(actor = %self.actor, success = any, "detonate all");
        any
    }

    /// Owner is going away: SecondaryLimited munitions are live hazards and
    /// must go off. Standard munitions are abandoned to the world.
    ///
    /// Returns the readiness clients last saw for this actor.
    pub fn on_actor_destroyed(
        mut self,
        world: &mut World,
        detonator: &DetonationEngine,
        dispatcher: &mut impl Dispatcher,
    ) -> bool {
        self.purge_stale(world);
        for record in self.limited.drain(..) {
            detonator.detonate(world, &record, dispatcher);
        }
        self.published
    }

    /// Readiness edge not yet replicated, if any.
    pub fn take_readiness_change(&mut self) -> Option<bool> {
        if self.ready == self.published {
            return None;
        }
        self.published = self.ready;
        Some(self.ready)
    }

    fn purge_stale(&mut self, world: &World) -> usize {
        let before = self.len();
        self.standard.retain(|r| !r.is_stale(world));
        self.limited.retain(|r| !r.is_stale(world));
        let purged = before - self.len();
        if purged > 0 {
            debug!(actor = %self.actor, purged, "purged stale munitions");
        }
        purged
    }

    fn recompute_readiness(&mut self) {
        self.ready = !self.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchBuffer;
    use ordnance_core::components::*;
    use ordnance_core::enums::TeamIndex;
    use ordnance_core::types::{Position, Velocity};

    struct Fixture {
        world: World,
        owner: Entity,
        tracker: Tracker,
        detonator: DetonationEngine,
        out: DispatchBuffer,
    }

    impl Fixture {
        fn new() -> Self {
            let mut world = World::new();
            let owner = world.spawn((Position::new(500.0, 0.0, 0.0), Velocity::default()));
            Self {
                world,
                owner,
                tracker: Tracker::new(ActorId(1)),
                detonator: DetonationEngine::default(),
                out: DispatchBuffer::new(),
            }
        }

        fn armed(&mut self) -> Entity {
            self.world.spawn((
                Munition,
                Position::default(),
                DamageInfo {
                    damage: 12.0,
                    ..Default::default()
                },
                ProjectileController {
                    owner: Some(self.owner),
                },
                ImpactExplosion::default(),
                TeamFilter {
                    team: TeamIndex::Player,
                },
            ))
        }

        fn register(&mut self, record: MunitionRecord, stock_limit: u32) {
            self.tracker
                .register(&mut self.world, &self.detonator, &mut self.out, record, stock_limit)
                .unwrap();
        }
    }

    #[test]
    fn register_does_not_flip_readiness_until_tick() {
        let mut f = Fixture::new();
        let m = f.armed();
        f.register(MunitionRecord::standard(m), 1);
        assert!(!f.tracker.is_ready());
        f.tracker.tick(&f.world);
        assert!(f.tracker.is_ready());
    }

    #[test]
    fn duplicate_handle_rejected() {
        let mut f = Fixture::new();
        let m = f.armed();
        f.register(MunitionRecord::standard(m), 1);
        let err = f
            .tracker
            .register(&mut f.world, &f.detonator, &mut f.out, MunitionRecord::limited(m), 1)
            .unwrap_err();
        assert_eq!(err, TrackerError::DuplicateMunition(m));
        assert_eq!(f.tracker.len(), 1);
    }

    #[test]
    fn capacity_one_evicts_first_limited() {
        let mut f = Fixture::new();
        let a = f.armed();
        let b = f.armed();
        f.register(MunitionRecord::limited(a), 1);
        f.register(MunitionRecord::limited(b), 1);

        assert!(!f.world.contains(a), "A must be force-detonated");
        assert_eq!(f.out.blasts.len(), 1);
        assert_eq!(f.tracker.limited(), &VecDeque::from(vec![MunitionRecord::limited(b)]));
        assert_eq!(f.tracker.capacity(), 1);
    }

    #[test]
    fn standard_not_subject_to_capacity() {
        let mut f = Fixture::new();
        for _ in 0..5 {
            let m = f.armed();
            f.register(MunitionRecord::standard(m), 1);
        }
        assert_eq!(f.tracker.standard().len(), 5);
        assert!(f.out.blasts.is_empty());
    }

    #[test]
    fn detonate_all_on_empty_is_false() {
        let mut f = Fixture::new();
        assert!(!f.tracker.detonate_all(&mut f.world, &f.detonator, &mut f.out));
        assert!(!f.tracker.is_ready());
        assert_eq!(f.tracker.take_readiness_change(), None);
    }

    #[test]
    fn detonate_all_clears_and_orders_standard_first() {
        let mut f = Fixture::new();
        let l = f.armed();
        let s1 = f.armed();
        let s2 = f.armed();
        f.world.insert_one(l, Position::new(3.0, 0.0, 0.0)).unwrap();
        f.world.insert_one(s1, Position::new(1.0, 0.0, 0.0)).unwrap();
        f.world.insert_one(s2, Position::new(2.0, 0.0, 0.0)).unwrap();
        f.register(MunitionRecord::limited(l), 2);
        f.register(MunitionRecord::standard(s1), 2);
        f.register(MunitionRecord::standard(s2), 2);
        f.tracker.tick(&f.world);

        assert!(f.tracker.detonate_all(&mut f.world, &f.detonator, &mut f.out));
        let xs: Vec<f64> = f.out.blasts.iter().map(|b| b.position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert!(f.tracker.is_empty());
        assert!(!f.tracker.is_ready());
    }

    #[test]
    fn unarmed_records_still_cleared() {
        let mut f = Fixture::new();
        let dud = f.world.spawn((Munition,));
        f.register(MunitionRecord::standard(dud), 1);
        assert!(!f.tracker.detonate_all(&mut f.world, &f.detonator, &mut f.out));
        assert!(f.tracker.is_empty());
        assert!(!f.world.contains(dud));
    }

    #[test]
    fn stale_handles_purged_on_tick() {
        let mut f = Fixture::new();
        let m = f.armed();
        f.register(MunitionRecord::standard(m), 1);
        f.tracker.tick(&f.world);
        assert!(f.tracker.is_ready());

        f.world.despawn(m).unwrap();
        f.tracker.tick(&f.world);
        assert!(f.tracker.is_empty());
        assert!(!f.tracker.is_ready());
    }

    #[test]
    fn stale_handles_not_counted_in_detonate_all() {
        let mut f = Fixture::new();
        let m = f.armed();
        f.register(MunitionRecord::limited(m), 1);
        f.world.despawn(m).unwrap();
        assert!(!f.tracker.detonate_all(&mut f.world, &f.detonator, &mut f.out));
        assert!(f.out.blasts.is_empty());
    }

    #[test]
    fn readiness_change_is_edge_triggered() {
        let mut f = Fixture::new();
        let m = f.armed();
        f.register(MunitionRecord::standard(m), 1);
        f.tracker.tick(&f.world);
        assert_eq!(f.tracker.take_readiness_change(), Some(true));
        f.tracker.tick(&f.world);
        assert_eq!(f.tracker.take_readiness_change(), None);

        f.tracker.detonate_all(&mut f.world, &f.detonator, &mut f.out);
        assert_eq!(f.tracker.take_readiness_change(), Some(false));
        assert_eq!(f.tracker.take_readiness_change(), None);
    }

    #[test]
    fn actor_destroyed_detonates_only_limited() {
        let mut f = Fixture::new();
        let s = f.armed();
        let l = f.armed();
        f.register(MunitionRecord::standard(s), 1);
        f.register(MunitionRecord::limited(l), 1);

        let tracker = std::mem::replace(&mut f.tracker, Tracker::new(ActorId(2)));
        tracker.on_actor_destroyed(&mut f.world, &f.detonator, &mut f.out);
        assert!(!f.world.contains(l));
        assert!(f.world.contains(s), "standard munitions are abandoned, not detonated");
        assert_eq!(f.out.blasts.len(), 1);
    }
}
