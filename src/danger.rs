//! Danger-zone monitor: sustained occupancy of the top band ends the game.
//!
//! Per piece: held → ignored; dropped within the grace period → ignored;
//! otherwise the piece's [`DangerDwell`] clock starts when its centre enters
//! the band and resets the moment it leaves.  Dwell time never accumulates
//! across separate visits.

use crate::arena::ArenaBounds;
use crate::config::GameplayConfig;
use crate::menu::GameState;
use crate::piece::{DangerDwell, Piece, PieceRegistry, PieceRole};
use crate::simulation::GameClock;
use bevy::prelude::*;

/// Presentation state of the band plus the one-shot trigger latch.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct DangerZone {
    /// Minimum remaining dwell time across pieces currently in the band.
    pub severity: Option<f32>,
    triggered: bool,
}

impl DangerZone {
    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }
}

/// One-shot game-over signal.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct GameOver {
    pub at: f32,
}

#[allow(clippy::too_many_arguments)]
pub fn danger_zone_system(
    clock: Res<GameClock>,
    config: Res<GameplayConfig>,
    arena: Res<ArenaBounds>,
    registry: Res<PieceRegistry>,
    mut zone: ResMut<DangerZone>,
    mut game_over: MessageWriter<GameOver>,
    mut next_state: ResMut<NextState<GameState>>,
    mut query: Query<(Entity, &Piece, &PieceRole, &Transform, &mut DangerDwell)>,
) {
    if zone.triggered {
        return;
    }
    let now = clock.now();
    let mut severity: Option<f32> = None;
    let mut expired = false;

    for (entity, piece, role, transform, mut dwell) in query.iter_mut() {
        let Some(dropped_at) = piece.dropped_at else {
            continue;
        };
        if role.is_merging() || !registry.contains(entity) {
            continue;
        }
        if now - dropped_at < config.danger_grace_period {
            continue;
        }

        if !arena.in_danger_band(transform.translation.y) {
            if dwell.entered_at.is_some() {
                dwell.entered_at = None;
            }
            continue;
        }
        let entered_at = *dwell.entered_at.get_or_insert(now);
        let remaining = config.danger_dwell_timeout - (now - entered_at);
        severity = Some(severity.map_or(remaining, |s| s.min(remaining)));
        if remaining < 0.0 {
            expired = true;
        }
    }

    zone.severity = severity.map(|s| s.max(0.0));
    if expired {
        zone.triggered = true;
        game_over.write(GameOver { at: now });
        next_state.set(GameState::GameOver);
        info!("Game over: a piece stayed in the danger zone for {:.1}s", config.danger_dwell_timeout);
    }
}
