//! Types shared between the game loop thread and its callers.

use std::sync::mpsc;

use serde::Serialize;
use thiserror::Error;

use ordnance_core::config::ConfigError;
use ordnance_core::enums::{MunitionClass, TeamIndex};
use ordnance_core::events::ServerMessage;
use ordnance_core::types::{ActorId, Position, SimTime};
use ordnance_sim::error::SimError;
use ordnance_sim::replication::ClientSession;
use ordnance_sim::world_setup::MunitionSpec;

/// Commands sent from callers to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// Spawn an actor and open a client session for it.
    Join {
        position: Position,
        team: TeamIndex,
        reply: mpsc::Sender<Result<ClientSession, SimError>>,
    },
    /// Place a munition on behalf of an actor's skill.
    PlaceMunition {
        actor: ActorId,
        spec: MunitionSpec,
        applies_bonus_effect: bool,
        class: MunitionClass,
    },
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// What the most recent tick replicated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub time: SimTime,
    pub messages: Vec<ServerMessage>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("failed to start game loop thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("game loop stopped")]
    LoopStopped,

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
