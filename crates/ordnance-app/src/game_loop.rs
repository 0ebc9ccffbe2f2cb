//! Game loop thread — runs the simulation engine at the configured tick rate
//! and replicates every tick's messages to connected clients.
//!
//! The engine and the server endpoint are created inside this thread because
//! it's cleaner for ownership. Loop commands arrive via `mpsc` channel; client
//! requests arrive through the endpoint's own inbound channel.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use ordnance_core::config::TickRate;
use ordnance_core::enums::{MunitionClass, TeamIndex};
use ordnance_core::types::{ActorId, Position};
use ordnance_sim::engine::{SimConfig, SimulationEngine};
use ordnance_sim::replication::{ClientSession, ServerEndpoint};
use ordnance_sim::world_setup::MunitionSpec;

use crate::state::{AppError, GameLoopCommand, TickReport};

/// Nominal duration of one tick.
pub fn tick_duration(rate: TickRate) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(rate.0.max(1)))
}

/// Caller's side of a running game loop.
pub struct LoopHandle {
    command_tx: mpsc::Sender<GameLoopCommand>,
    latest_report: Arc<Mutex<Option<TickReport>>>,
    thread: JoinHandle<()>,
}

impl LoopHandle {
    /// Spawn an actor and get a client session controlling it.
    pub fn join(&self, position: Position, team: TeamIndex) -> Result<ClientSession, AppError> {
        let (reply, response) = mpsc::channel();
        self.send(GameLoopCommand::Join {
            position,
            team,
            reply,
        })?;
        let session = response.recv().map_err(|_| AppError::LoopStopped)??;
        Ok(session)
    }

    pub fn place_munition(
        &self,
        actor: ActorId,
        spec: MunitionSpec,
        applies_bonus_effect: bool,
        class: MunitionClass,
    ) -> Result<(), AppError> {
        self.send(GameLoopCommand::PlaceMunition {
            actor,
            spec,
            applies_bonus_effect,
            class,
        })
    }

    /// Latest tick report, for synchronous polling.
    pub fn latest_report(&self) -> Option<TickReport> {
        self.latest_report.lock().ok().and_then(|lock| lock.clone())
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn shutdown(self) {
        let _ = self.command_tx.send(GameLoopCommand::Shutdown);
        if self.thread.join().is_err() {
            warn!("game loop thread panicked");
        }
    }

    fn send(&self, command: GameLoopCommand) -> Result<(), AppError> {
        self.command_tx
            .send(command)
            .map_err(|_| AppError::LoopStopped)
    }
}

/// Spawns the game loop in a new thread.
pub fn spawn_game_loop(config: SimConfig) -> Result<LoopHandle, AppError> {
    let (command_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();
    let latest_report = Arc::new(Mutex::new(None));
    let shared = Arc::clone(&latest_report);

    let thread = std::thread::Builder::new()
        .name("ordnance-game-loop".into())
        .spawn(move || {
            run_game_loop(config, cmd_rx, &shared);
        })?;

    Ok(LoopHandle {
        command_tx,
        latest_report,
        thread,
    })
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    config: SimConfig,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_report: &Mutex<Option<TickReport>>,
) {
    let tick = tick_duration(config.ordnance.tick_rate);
    let mut engine = SimulationEngine::new(config);
    let mut endpoint = ServerEndpoint::new();
    let mut next_tick_time = Instant::now();
    info!(tick_ms = tick.as_millis() as u64, "game loop started");

    loop {
        // 1. Drain all pending loop commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    info!(tick = engine.time().tick, "game loop stopped");
                    return;
                }
                Ok(command) => handle_command(&mut engine, &mut endpoint, command),
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Client requests, in arrival order
        engine.queue_commands(endpoint.drain_requests());

        // 3. Advance one tick
        let messages = engine.tick();

        // 4. Replicate to every connected client
        endpoint.broadcast(&messages);

        let submunitions = engine.take_submunition_requests();
        if !submunitions.is_empty() {
            debug!(count = submunitions.len(), "submunition requests handed off");
        }

        // 5. Store latest report for synchronous polling
        if let Ok(mut lock) = latest_report.lock() {
            *lock = Some(TickReport {
                time: engine.time(),
                messages,
            });
        }

        // 6. Sleep until next tick
        next_tick_time += tick;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick * 2 {
            // Too far behind — reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }
}

fn handle_command(engine: &mut SimulationEngine, endpoint: &mut ServerEndpoint, command: GameLoopCommand) {
    match command {
        GameLoopCommand::Join {
            position,
            team,
            reply,
        } => {
            let actor = engine.spawn_actor(position, team);
            let loadout = engine.actor_loadout(actor).unwrap_or_default();
            let readiness = engine.readiness_snapshot();
            let _ = reply.send(endpoint.connect(actor, loadout, &readiness));
        }
        GameLoopCommand::PlaceMunition {
            actor,
            spec,
            applies_bonus_effect,
            class,
        } => {
            if let Err(err) = engine.spawn_munition(actor, &spec, applies_bonus_effect, class) {
                warn!(%actor, %err, "munition placement rejected");
            }
        }
        GameLoopCommand::Shutdown => {}
    }
}
