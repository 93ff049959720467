//! Physics world adapter: world-level constants pushed into Rapier.
//!
//! Gameplay code never touches Rapier's configuration directly.  It writes
//! intent into two resources and the adapter systems forward them to the
//! engine only when they change:
//!
//! | Resource           | Rapier target                                  |
//! |--------------------|------------------------------------------------|
//! | [`WorldPhysics`]   | `RapierConfiguration::gravity`, `TimestepMode` |
//! | [`SolverPrecision`]| `IntegrationParameters::num_solver_iterations` |
//!
//! Keeping the intent in plain resources lets headless tests assert on world
//! constants without running the physics pipeline.

use crate::config::GameplayConfig;
use crate::constants::{BASE_GRAVITY, BASE_TIME_SCALE, SOLVER_PRECISION_CURVE};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// World-level constants currently requested by the active flask.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldPhysics {
    pub gravity: Vec2,
    pub time_scale: f32,
}

impl Default for WorldPhysics {
    fn default() -> Self {
        Self::baseline()
    }
}

impl WorldPhysics {
    /// Gravity and time scale before any flask modifier.
    pub fn baseline() -> Self {
        Self {
            gravity: Vec2::new(0.0, -BASE_GRAVITY),
            time_scale: BASE_TIME_SCALE,
        }
    }

    /// Gravity strength relative to the baseline (1.0 = normal).
    pub fn gravity_ratio(&self) -> f32 {
        self.gravity.length() / BASE_GRAVITY
    }
}

/// Solver precision knob: a 0–100 slider and the iteration count it maps to.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverPrecision {
    slider: u8,
    iterations: usize,
}

impl SolverPrecision {
    pub fn from_slider(slider: u8, config: &GameplayConfig) -> Self {
        let slider = slider.min(100);
        Self {
            slider,
            iterations: iterations_for_slider(
                slider,
                config.min_solver_iterations,
                config.max_solver_iterations,
            ),
        }
    }

    #[inline]
    pub fn slider(&self) -> u8 {
        self.slider
    }

    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

impl Default for SolverPrecision {
    fn default() -> Self {
        let config = GameplayConfig::default();
        Self::from_slider(config.default_solver_precision, &config)
    }
}

/// Map a 0–100 slider through a logarithmic curve onto `[min, max]` iterations.
///
/// `iterations = min + (max - min) · ln(1 + k·s) / ln(1 + 100·k)`
///
/// The curve climbs quickly at the low end, where each extra iteration visibly
/// reduces interpenetration, and flattens near the top where it mostly costs
/// frame time.
pub fn iterations_for_slider(slider: u8, min: usize, max: usize) -> usize {
    let s = f32::from(slider.min(100));
    let k = SOLVER_PRECISION_CURVE;
    let t = (k * s).ln_1p() / (k * 100.0).ln_1p();
    let span = max.saturating_sub(min) as f32;
    (min + (span * t).round() as usize).clamp(min, max.max(min))
}

// ── Adapter systems ───────────────────────────────────────────────────────────

/// Startup: seed the precision knob from the loaded config.
pub fn configure_solver_precision(
    config: Res<GameplayConfig>,
    mut precision: ResMut<SolverPrecision>,
) {
    *precision = SolverPrecision::from_slider(config.default_solver_precision, &config);
}

/// Push gravity and time scale into Rapier when [`WorldPhysics`] changes.
pub fn sync_world_physics_system(
    world: Res<WorldPhysics>,
    mut configs: Query<&mut RapierConfiguration>,
    timestep: Option<ResMut<TimestepMode>>,
) {
    if !world.is_changed() {
        return;
    }
    for mut cfg in configs.iter_mut() {
        cfg.gravity = world.gravity;
    }
    if let Some(mut mode) = timestep {
        match &mut *mode {
            TimestepMode::Variable { time_scale, .. }
            | TimestepMode::Interpolated { time_scale, .. } => *time_scale = world.time_scale,
            TimestepMode::Fixed { .. } => {}
        }
    }
}

/// Push the solver iteration count into Rapier when [`SolverPrecision`] changes.
pub fn sync_solver_precision_system(
    precision: Res<SolverPrecision>,
    mut simulations: Query<&mut RapierContextSimulation>,
) {
    if !precision.is_changed() {
        return;
    }
    for mut simulation in simulations.iter_mut() {
        if let Ok(iterations) = precision.iterations().try_into() {
            simulation.integration_parameters.num_solver_iterations = iterations;
        }
    }
}
