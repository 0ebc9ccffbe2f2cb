use thiserror::Error;

use ordnance_core::types::ActorId;

/// Errors raised by a single tracker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("munition {0:?} is already tracked")]
    DuplicateMunition(hecs::Entity),
}

/// Errors raised by the engine API and the client session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("actor {0} already has a client session")]
    DuplicateSession(ActorId),

    #[error("munition {0:?} does not exist")]
    MunitionNotAlive(hecs::Entity),

    #[error("server link closed")]
    Disconnected,

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

pub type Result<T> = std::result::Result<T, SimError>;
