//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are plain functions over `&mut World`. They do not own state;
//! per-actor tracker state lives in the engine.

pub mod blast;
pub mod cleanup;
pub mod movement;
