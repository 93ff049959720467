//! Game-specific error types.
//!
//! Nothing in the gameplay core is fatal: systems that hit one of these
//! conditions log it and skip the operation.  The types exist so helpers can
//! return a reason instead of a bare `Option`.

use crate::config::GameplayConfig;
use crate::constants::MAX_TIER;
use std::fmt;

/// Top-level error enum for the gameplay core.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// A tier outside `1..=MAX_TIER` was requested.
    InvalidTier {
        /// The rejected raw value.
        value: u8,
    },

    /// A piece was referenced after it had already left the world.
    /// Usually a queued merge pair whose other half was consumed first.
    PieceNotFound {
        /// Human-readable description of where the lookup occurred.
        context: &'static str,
    },

    /// A configuration value is outside its usable range.
    InvalidConfig {
        /// Name of the field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// The configuration file could not be parsed.
    ConfigParse {
        /// Parser message.
        message: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidTier { value } => {
                write!(f, "tier {} is outside 1..={}", value, MAX_TIER)
            }
            GameError::PieceNotFound { context } => {
                write!(f, "piece no longer exists during '{}'", context)
            }
            GameError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(f, "config '{}' = {} is outside {}", name, value, expected),
            GameError::ConfigParse { message } => write!(f, "parse error: {}", message),
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

fn require_positive(name: &'static str, value: f32) -> GameResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::InvalidConfig {
            name,
            value,
            expected: "(0.0, ∞)",
        })
    }
}

fn require_non_negative(name: &'static str, value: f32) -> GameResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::InvalidConfig {
            name,
            value,
            expected: "[0.0, ∞)",
        })
    }
}

/// Check every field of a loaded configuration.
///
/// Geometry and timing values must be positive; delays and jitters may be zero.
pub fn validate_config(config: &GameplayConfig) -> GameResult<()> {
    require_positive("arena_width", config.arena_width)?;
    require_positive("arena_height", config.arena_height)?;
    require_positive("wall_thickness", config.wall_thickness)?;
    require_positive("entrance_duration", config.entrance_duration)?;
    require_positive("base_drop_speed", config.base_drop_speed)?;
    require_positive("danger_band_height", config.danger_band_height)?;
    require_positive("danger_dwell_timeout", config.danger_dwell_timeout)?;
    require_positive("gc_interval", config.gc_interval)?;
    require_positive("combo_window", config.combo_window)?;

    require_non_negative("spawn_pad", config.spawn_pad)?;
    require_non_negative("next_spawn_delay", config.next_spawn_delay)?;
    require_non_negative("merge_jitter", config.merge_jitter)?;
    require_non_negative("merge_collision_delay", config.merge_collision_delay)?;
    require_non_negative("void_spawn_protection", config.void_spawn_protection)?;
    require_non_negative("void_grace_delay", config.void_grace_delay)?;
    require_non_negative("low_gravity_bounce_speed", config.low_gravity_bounce_speed)?;
    require_non_negative("low_gravity_jitter", config.low_gravity_jitter)?;
    require_non_negative("danger_grace_period", config.danger_grace_period)?;
    require_non_negative("gc_margin", config.gc_margin)?;

    if config.min_solver_iterations == 0
        || config.min_solver_iterations > config.max_solver_iterations
    {
        return Err(GameError::InvalidConfig {
            name: "min_solver_iterations",
            value: config.min_solver_iterations as f32,
            expected: "[1, max_solver_iterations]",
        });
    }
    if config.default_solver_precision > 100 {
        return Err(GameError::InvalidConfig {
            name: "default_solver_precision",
            value: config.default_solver_precision as f32,
            expected: "[0, 100]",
        });
    }
    if !(0.0..=1.0).contains(&config.void_rebound_damping) {
        return Err(GameError::InvalidConfig {
            name: "void_rebound_damping",
            value: config.void_rebound_damping,
            expected: "[0.0, 1.0]",
        });
    }
    Ok(())
}
