//! Simulation constants and tuning defaults.
//!
//! Every value here is the compile-time default behind a field of
//! [`crate::config::OrdnanceConfig`]; a TOML file may override them at startup.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 50;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Detonation bonus profile ---

/// Radius multiplier for munitions that carry the bonus effect.
pub const BONUS_RADIUS_MULT: f64 = 1.5;

/// Force multiplier for munitions that carry the bonus effect.
pub const BONUS_FORCE_MULT: f64 = 1.25;

/// Damage multiplier for munitions that carry the bonus effect.
pub const BONUS_DAMAGE_MULT: f64 = 1.2;

/// Floor for the bonus-scaled blast radius (meters).
pub const MIN_BONUS_RADIUS: f64 = 10.0;

// --- Munitions ---

/// Blast radius used when a munition does not specify one (meters).
pub const DEFAULT_BLAST_RADIUS: f64 = 8.0;

/// Default self-impulse force for blast-jump capable munitions.
pub const DEFAULT_BLAST_JUMP_FORCE: f64 = 2000.0;

/// Default self-impulse reach (meters).
pub const DEFAULT_BLAST_JUMP_RADIUS: f64 = 8.0;

// --- Area-effect resolution ---

/// Mass assumed for entities without a `Mass` component (kg).
pub const REFERENCE_MASS: f64 = 100.0;

/// Damage multiplier against airborne targets for `AirborneBonus` blasts.
pub const AIRBORNE_BONUS_MULT: f64 = 1.3;

/// Damage multiplier for critical blasts.
pub const CRIT_MULT: f64 = 2.0;

/// Fraction of the radius that takes full damage under `FalloffModel::SweetSpot`.
pub const SWEET_SPOT_FRACTION: f64 = 0.25;

// --- Actors ---

/// Default maximum stock of the secondary slot (also the default munition capacity).
pub const DEFAULT_SECONDARY_STOCK: u32 = 1;

/// Default hit points for spawned actors and target dummies.
pub const DEFAULT_ACTOR_HEALTH: f64 = 110.0;
