//! Runtime gameplay configuration loaded from `assets/gameplay.toml`.
//!
//! [`GameplayConfig`] is a Bevy [`Resource`] that mirrors the tunable constants
//! in [`crate::constants`].  At startup, [`load_gameplay_config`] reads
//! `assets/gameplay.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameplayConfig>` to any system parameter list and read values
//! with `config.danger_dwell_timeout`, `config.merge_launch_speed`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameplayConfig::default()`.

use crate::constants::*;
use crate::error::validate_config;
use bevy::prelude::*;
use serde::Deserialize;

/// Path of the optional override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/gameplay.toml";

/// Runtime-tunable gameplay configuration.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    // ── Arena ─────────────────────────────────────────────────────────────────
    pub arena_width: f32,
    pub arena_height: f32,
    pub wall_thickness: f32,

    // ── Solver ────────────────────────────────────────────────────────────────
    pub min_solver_iterations: usize,
    pub max_solver_iterations: usize,
    pub default_solver_precision: u8,

    // ── Spawn & drag ──────────────────────────────────────────────────────────
    pub spawn_pad: f32,
    pub entrance_duration: f32,
    pub spawn_offscreen_height: f32,
    pub preview_baseline_height: f32,
    pub next_spawn_delay: f32,
    pub base_drop_speed: f32,
    pub low_gravity_drop_multiplier: f32,
    pub settle_speed: f32,

    // ── Merging ───────────────────────────────────────────────────────────────
    pub merge_launch_speed: f32,
    pub merge_low_gravity_launch_multiplier: f32,
    pub merge_jitter: f32,
    pub merge_collision_delay: f32,

    // ── Void pieces ───────────────────────────────────────────────────────────
    pub void_spawn_protection: f32,
    pub void_grace_delay: f32,
    pub void_rebound_damping: f32,
    pub void_rebound_cap: f32,

    // ── Low-gravity bounce ────────────────────────────────────────────────────
    pub low_gravity_bounce_speed: f32,
    pub low_gravity_jitter: f32,

    // ── Danger zone ───────────────────────────────────────────────────────────
    pub danger_band_height: f32,
    pub danger_grace_period: f32,
    pub danger_dwell_timeout: f32,

    // ── Garbage collection ────────────────────────────────────────────────────
    pub gc_interval: f32,
    pub gc_margin: f32,

    // ── Scoring ───────────────────────────────────────────────────────────────
    pub combo_window: f32,
    pub max_combo: u32,

    // ── Rendering ─────────────────────────────────────────────────────────────
    pub hud_font_size: f32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            // Arena
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            // Solver
            min_solver_iterations: MIN_SOLVER_ITERATIONS,
            max_solver_iterations: MAX_SOLVER_ITERATIONS,
            default_solver_precision: DEFAULT_SOLVER_PRECISION,
            // Spawn & drag
            spawn_pad: SPAWN_PAD,
            entrance_duration: ENTRANCE_DURATION,
            spawn_offscreen_height: SPAWN_OFFSCREEN_HEIGHT,
            preview_baseline_height: PREVIEW_BASELINE_HEIGHT,
            next_spawn_delay: NEXT_SPAWN_DELAY,
            base_drop_speed: BASE_DROP_SPEED,
            low_gravity_drop_multiplier: LOW_GRAVITY_DROP_MULTIPLIER,
            settle_speed: SETTLE_SPEED,
            // Merging
            merge_launch_speed: MERGE_LAUNCH_SPEED,
            merge_low_gravity_launch_multiplier: MERGE_LOW_GRAVITY_LAUNCH_MULTIPLIER,
            merge_jitter: MERGE_JITTER,
            merge_collision_delay: MERGE_COLLISION_DELAY,
            // Void pieces
            void_spawn_protection: VOID_SPAWN_PROTECTION,
            void_grace_delay: VOID_GRACE_DELAY,
            void_rebound_damping: VOID_REBOUND_DAMPING,
            void_rebound_cap: VOID_REBOUND_CAP,
            // Low-gravity bounce
            low_gravity_bounce_speed: LOW_GRAVITY_BOUNCE_SPEED,
            low_gravity_jitter: LOW_GRAVITY_JITTER,
            // Danger zone
            danger_band_height: DANGER_BAND_HEIGHT,
            danger_grace_period: DANGER_GRACE_PERIOD,
            danger_dwell_timeout: DANGER_DWELL_TIMEOUT,
            // Garbage collection
            gc_interval: GC_INTERVAL,
            gc_margin: GC_MARGIN,
            // Scoring
            combo_window: COMBO_WINDOW,
            max_combo: MAX_COMBO,
            // Rendering
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

/// Startup system: attempt to load [`CONFIG_PATH`] and overwrite the
/// `GameplayConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse errors and values that
/// fail [`validate_config`] are logged but do not abort the game.  A missing
/// file is silently ignored (defaults are already in place).
pub fn load_gameplay_config(mut config: ResMut<GameplayConfig>) {
    let Ok(contents) = std::fs::read_to_string(CONFIG_PATH) else {
        info!("No {CONFIG_PATH} found; using compiled defaults");
        return;
    };
    match parse_config(&contents) {
        Ok(loaded) => {
            *config = loaded;
            info!("Loaded gameplay config from {CONFIG_PATH}");
        }
        Err(e) => warn!("Ignoring {CONFIG_PATH}: {e}; using defaults"),
    }
}

/// Parse and validate a TOML override document.
pub fn parse_config(contents: &str) -> crate::error::GameResult<GameplayConfig> {
    let loaded = toml::from_str::<GameplayConfig>(contents).map_err(|e| {
        crate::error::GameError::ConfigParse {
            message: e.to_string(),
        }
    })?;
    validate_config(&loaded)?;
    Ok(loaded)
}
