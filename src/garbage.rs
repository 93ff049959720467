//! Out-of-bounds sweep: pieces flung far outside the container are reclaimed.
//!
//! Runs on its own repeating [`Timer`] driven by frame time, so the sweep
//! rate does not depend on the physics step rate.

use crate::arena::ArenaBounds;
use crate::config::GameplayConfig;
use crate::piece::{Piece, PieceCommands};
use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct GarbageCollector {
    pub timer: Timer,
    pub collected: u64,
}

impl GarbageCollector {
    pub fn new(interval: f32) -> Self {
        Self {
            timer: Timer::from_seconds(interval, TimerMode::Repeating),
            collected: 0,
        }
    }
}

impl Default for GarbageCollector {
    fn default() -> Self {
        Self::new(GameplayConfig::default().gc_interval)
    }
}

/// Startup: apply the configured sweep interval.
pub fn configure_garbage_collector(
    config: Res<GameplayConfig>,
    mut gc: ResMut<GarbageCollector>,
) {
    *gc = GarbageCollector::new(config.gc_interval);
}

pub fn garbage_collection_system(
    time: Res<Time>,
    config: Res<GameplayConfig>,
    arena: Res<ArenaBounds>,
    mut gc: ResMut<GarbageCollector>,
    mut pieces: PieceCommands,
    query: Query<(Entity, &Transform), With<Piece>>,
) {
    gc.timer.tick(time.delta());
    if !gc.timer.just_finished() {
        return;
    }
    for (entity, transform) in query.iter() {
        if !arena.is_far_outside(transform.translation.truncate(), config.gc_margin) {
            continue;
        }
        if pieces.remove(entity) {
            gc.collected += 1;
            debug!(
                "Reclaimed {entity:?} at ({:.0}, {:.0})",
                transform.translation.x, transform.translation.y
            );
        }
    }
}
