//! Runtime configuration loaded from TOML.
//!
//! [`OrdnanceConfig`] mirrors the tuning constants in [`crate::constants`].
//! Missing keys fall back to those compile-time defaults, so a minimal TOML
//! can override just the values you care about:
//!
//! ```toml
//! [bonus]
//! radius_mult = 2.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::enums::SkillSlot;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {value} ({reason})")]
    Invalid {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Amplification applied to munitions registered with the bonus flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusProfile {
    pub radius_mult: f64,
    pub force_mult: f64,
    pub damage_mult: f64,
    /// Lower bound on the bonus-scaled radius.
    pub min_radius: f64,
}

impl Default for BonusProfile {
    fn default() -> Self {
        Self {
            radius_mult: BONUS_RADIUS_MULT,
            force_mult: BONUS_FORCE_MULT,
            damage_mult: BONUS_DAMAGE_MULT,
            min_radius: MIN_BONUS_RADIUS,
        }
    }
}

/// Which loadout slots the tracker reads and refunds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    /// Slot whose `max_stock` bounds the SecondaryLimited collection.
    pub capacity_slot: SkillSlot,
    /// Slot refunded when a detonate request finds nothing to detonate.
    pub refund_slot: SkillSlot,
    /// Secondary stock given to newly spawned actors.
    pub default_secondary_stock: u32,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            capacity_slot: SkillSlot::Secondary,
            refund_slot: SkillSlot::Secondary,
            default_secondary_stock: DEFAULT_SECONDARY_STOCK,
        }
    }
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdnanceConfig {
    pub bonus: BonusProfile,
    pub stock: StockConfig,
    pub tick_rate: TickRate,
}

/// Fixed simulation rate in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickRate(pub u32);

impl Default for TickRate {
    fn default() -> Self {
        Self(TICK_RATE)
    }
}

impl OrdnanceConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: OrdnanceConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let multipliers = [
            ("bonus.radius_mult", self.bonus.radius_mult),
            ("bonus.force_mult", self.bonus.force_mult),
            ("bonus.damage_mult", self.bonus.damage_mult),
            ("bonus.min_radius", self.bonus.min_radius),
        ];
        for (field, value) in multipliers {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    value,
                    reason: "must be finite and non-negative",
                });
            }
        }
        if self.tick_rate.0 == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_rate",
                value: 0.0,
                reason: "must be at least 1 Hz",
            });
        }
        Ok(())
    }
}
