//! Navigator configuration with validation.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_LOOKAHEAD, DEFAULT_RECALC_INTERVAL_TICKS, MAX_LOOKAHEAD};

/// How aggressively the cost model favours speed boosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteOptimization {
    #[default]
    Relaxed,
    Efficient,
}

/// Tunables for the navigation facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Number of upcoming navigable waypoints composed into one path.
    #[serde(default = "NavigatorConfig::default_lookahead")]
    pub lookahead: usize,
    /// Ticks between periodic recomputes while a trial is active.
    #[serde(default = "NavigatorConfig::default_recalc_interval_ticks")]
    pub recalc_interval_ticks: u32,
    #[serde(default)]
    pub route_optimization: RouteOptimization,
}

impl NavigatorConfig {
    const fn default_lookahead() -> usize {
        DEFAULT_LOOKAHEAD
    }

    const fn default_recalc_interval_ticks() -> u32 {
        DEFAULT_RECALC_INTERVAL_TICKS
    }

    /// Parse and validate a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the JSON is malformed or a field is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate navigator configuration bounds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LOOKAHEAD).contains(&self.lookahead) {
            return Err(ConfigError::RangeViolation {
                field: "lookahead",
                min: 1,
                max: MAX_LOOKAHEAD as u64,
                value: self.lookahead as u64,
            });
        }
        if self.recalc_interval_ticks == 0 {
            return Err(ConfigError::MinViolation {
                field: "recalc_interval_ticks",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            lookahead: Self::default_lookahead(),
            recalc_interval_ticks: Self::default_recalc_interval_ticks(),
            route_optimization: RouteOptimization::default(),
        }
    }
}

/// Errors raised when navigator configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be within [{min}, {max}] (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("navigator config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
