//! Munition tracking and detonation engine for ORDNANCE.
//!
//! Owns the hecs ECS world, keeps one [`Tracker`] per actor, resolves
//! detonations into area-effect dispatches, and replicates readiness and
//! refund notifications to clients.

pub mod detonation;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod eviction;
pub mod record;
pub mod replication;
pub mod stock;
pub mod systems;
pub mod tracker;
pub mod world_setup;

pub use detonation::DetonationEngine;
pub use engine::{SimConfig, SimulationEngine};
pub use ordnance_core as core;
pub use record::MunitionRecord;
pub use tracker::Tracker;

#[cfg(test)]
mod tests;
