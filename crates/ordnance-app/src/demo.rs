//! Scripted demo client.
//!
//! Plays one actor through a full round: place charges, wait for the
//! replicated readiness flag, detonate, then detonate again with nothing
//! placed and collect the stock refund.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

use ordnance_core::enums::{MunitionClass, SkillSlot, SoundCue, TeamIndex};
use ordnance_core::types::Position;
use ordnance_sim::replication::ClientSession;
use ordnance_sim::stock::StockAccess;
use ordnance_sim::world_setup::MunitionSpec;

use crate::game_loop::LoopHandle;
use crate::state::AppError;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// What the demo client observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemoOutcome {
    pub successful_detonations: usize,
    pub failed_detonations: usize,
    pub secondary_stock: u32,
}

pub fn run_demo(handle: &LoopHandle, timeout: Duration) -> Result<DemoOutcome, AppError> {
    let mut session = handle.join(Position::default(), TeamIndex::Player)?;
    let actor = session.actor();
    info!(%actor, "demo client joined");

    // The secondary skill spends a charge to place a stock-limited munition.
    session.loadout_mut().deduct_stock(SkillSlot::Secondary);
    handle.place_munition(
        actor,
        MunitionSpec::charge(Position::new(12.0, 0.0, 0.0)),
        false,
        MunitionClass::SecondaryLimited,
    )?;
    handle.place_munition(
        actor,
        MunitionSpec::rocket(Position::new(20.0, 0.0, 0.0)),
        true,
        MunitionClass::Standard,
    )?;
    wait_until(&mut session, timeout, "readiness", |s| s.is_ready(actor))?;

    let mut outcome = DemoOutcome::default();
    session.request_detonate()?;
    let first = wait_for_feedback(&mut session, timeout)?;
    outcome.record(first);

    // Nothing left: the server answers with a fail cue and a refund.
    session.request_detonate()?;
    let second = wait_for_feedback(&mut session, timeout)?;
    outcome.record(second);
    wait_until(&mut session, timeout, "refund", |s| {
        s.loadout().stock(SkillSlot::Secondary).stock > 0
    })?;
    outcome.secondary_stock = session.loadout().stock(SkillSlot::Secondary).stock;

    info!(?outcome, "demo finished");
    Ok(outcome)
}

impl DemoOutcome {
    fn record(&mut self, cue: SoundCue) {
        match cue {
            SoundCue::DetonateSuccess => self.successful_detonations += 1,
            SoundCue::DetonateFail => self.failed_detonations += 1,
        }
    }
}

fn wait_for_feedback(session: &mut ClientSession, timeout: Duration) -> Result<SoundCue, AppError> {
    let deadline = Instant::now() + timeout;
    loop {
        session.poll();
        if let Some(sound) = session.take_feedback().into_iter().next() {
            return Ok(sound.cue);
        }
        if Instant::now() >= deadline {
            return Err(AppError::Timeout("detonate feedback"));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn wait_until(
    session: &mut ClientSession,
    timeout: Duration,
    what: &'static str,
    mut done: impl FnMut(&ClientSession) -> bool,
) -> Result<(), AppError> {
    let deadline = Instant::now() + timeout;
    loop {
        session.poll();
        if done(session) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(AppError::Timeout(what));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
