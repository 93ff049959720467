//! Score and combo bookkeeping fed by [`NewTierReached`].

use crate::config::GameplayConfig;
use crate::merge::NewTierReached;
use crate::simulation::GameClock;
use crate::tier::{score_value, Tier};
use bevy::prelude::*;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ScoreBoard {
    pub score: u64,
    /// Current combo multiplier (0 when no combo is running).
    pub combo: u32,
    pub merges: u32,
    pub best_tier: Tier,
    last_merge_at: Option<f32>,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            merges: 0,
            best_tier: Tier::MIN,
            last_merge_at: None,
        }
    }
}

impl ScoreBoard {
    /// Record one merge into `tier` at `now`.  Returns the points awarded.
    pub fn record(&mut self, tier: Tier, now: f32, window: f32, max_combo: u32) -> u64 {
        let chained = self
            .last_merge_at
            .is_some_and(|last| now - last <= window);
        self.combo = if chained {
            (self.combo + 1).min(max_combo.max(1))
        } else {
            1
        };
        self.last_merge_at = Some(now);
        self.merges += 1;
        self.best_tier = self.best_tier.max(tier);

        let points = u64::from(score_value(tier)) * u64::from(self.combo);
        self.score += points;
        points
    }

    /// Drop the combo once the window has passed without a merge.
    pub fn expire_combo(&mut self, now: f32, window: f32) {
        if let Some(last) = self.last_merge_at {
            if now - last > window {
                self.combo = 0;
                self.last_merge_at = None;
            }
        }
    }
}

pub fn scoring_system(
    clock: Res<GameClock>,
    config: Res<GameplayConfig>,
    mut merges: MessageReader<NewTierReached>,
    mut board: ResMut<ScoreBoard>,
) {
    let now = clock.now();
    for merge in merges.read() {
        board.record(merge.tier, now, config.combo_window, config.max_combo);
    }
    board.expire_combo(now, config.combo_window);
}
