//! Debug/telemetry surface: frame rate, solver precision, held piece, piece counts.
//!
//! Instead of a global engine handle, systems that need to inspect or tune the
//! simulation take a [`DebugControl`] parameter.  It lives exactly as long as
//! the app does.

use crate::config::GameplayConfig;
use crate::physics::SolverPrecision;
use crate::piece::PieceRegistry;
use crate::spawn::SpawnController;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Exponentially smoothed frames per second.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameRate {
    pub fps: f32,
}

impl FrameRate {
    const SMOOTHING: f32 = 0.1;

    pub fn sample(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let instant = 1.0 / dt;
        self.fps = if self.fps == 0.0 {
            instant
        } else {
            self.fps + (instant - self.fps) * Self::SMOOTHING
        };
    }
}

/// Read-only snapshot handed to the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugSnapshot {
    pub fps: f32,
    pub precision: u8,
    pub solver_iterations: usize,
    pub held: Option<Entity>,
    pub live_pieces: usize,
    pub spawned_total: u64,
}

/// Request a new solver precision slider value (0–100).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetSolverPrecision(pub u8);

#[derive(SystemParam)]
pub struct DebugControl<'w> {
    frame_rate: Res<'w, FrameRate>,
    precision: ResMut<'w, SolverPrecision>,
    config: Res<'w, GameplayConfig>,
    controller: Res<'w, SpawnController>,
    registry: Res<'w, PieceRegistry>,
}

impl DebugControl<'_> {
    pub fn snapshot(&self) -> DebugSnapshot {
        DebugSnapshot {
            fps: self.frame_rate.fps,
            precision: self.precision.slider(),
            solver_iterations: self.precision.iterations(),
            held: self.controller.held,
            live_pieces: self.registry.live_count(),
            spawned_total: self.registry.spawned_total(),
        }
    }

    /// Map `slider` through the log curve and store the iteration count.
    pub fn set_precision(&mut self, slider: u8) -> usize {
        let next = SolverPrecision::from_slider(slider, &self.config);
        if *self.precision != next {
            *self.precision = next;
        }
        next.iterations()
    }
}

pub fn frame_rate_system(time: Res<Time>, mut frame_rate: ResMut<FrameRate>) {
    frame_rate.sample(time.delta_secs());
}

pub fn solver_precision_command_system(
    mut requests: MessageReader<SetSolverPrecision>,
    mut control: DebugControl,
) {
    for SetSolverPrecision(slider) in requests.read() {
        let iterations = control.set_precision(*slider);
        info!("Solver precision {slider} -> {iterations} iterations");
    }
}
