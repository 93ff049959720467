//! Merge queue: serialized resolution of same-tier contacts.
//!
//! Collision classification only *queues* pairs.  [`drain_merge_queue_system`]
//! pops them FIFO after every physics step and resolves one pair at a time.
//! Before touching a pair it re-checks that both pieces are still registered
//! and not already merging, so when A–B and B–C arrive in the same step B is
//! consumed by exactly one merge and the second pair is dropped.

use crate::config::GameplayConfig;
use crate::error::{GameError, GameResult};
use crate::flask::{default_profile, ActiveFlask};
use crate::piece::{
    protected_collision_groups, CollisionRestore, Piece, PieceCommands, PieceRole, PieceSpawn,
};
use crate::powerup::PowerUpEarned;
use crate::simulation::GameClock;
use crate::tier::Tier;
use bevy::prelude::*;
use rand::Rng;
use std::collections::VecDeque;

/// Tier thresholds that award a power-up charge, with the level awarded.
pub const POWER_UP_MILESTONES: [(u8, u8); 3] = [(5, 1), (6, 2), (7, 3)];

/// Power-up level earned by reaching `tier`, if any.
pub fn milestone_level(tier: Tier) -> Option<u8> {
    POWER_UP_MILESTONES
        .iter()
        .find(|(t, _)| *t == tier.get())
        .map(|(_, level)| *level)
}

/// Pending same-tier pairs.
#[derive(Resource, Debug, Default)]
pub struct MergeQueue {
    pending: VecDeque<(Entity, Entity)>,
    draining: bool,
}

impl MergeQueue {
    pub fn push(&mut self, a: Entity, b: Entity) {
        self.pending.push_back((a, b));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Claim the drain.  Returns `false` if a drain is already in progress.
    fn begin_drain(&mut self) -> bool {
        if self.draining {
            return false;
        }
        self.draining = true;
        true
    }

    fn end_drain(&mut self) {
        self.draining = false;
    }

    fn pop(&mut self) -> Option<(Entity, Entity)> {
        self.pending.pop_front()
    }
}

/// A merge produced a piece of `tier`.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct NewTierReached {
    pub tier: Tier,
    pub position: Vec2,
}

/// Where and what a resolved merge creates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergePlan {
    pub tier: Tier,
    pub position: Vec2,
    pub scale: f32,
}

/// Midpoint, capped next tier, and inherited size scale of a pair.
pub fn plan_merge(a: &Piece, pos_a: Vec2, b: &Piece, pos_b: Vec2) -> MergePlan {
    let scale = if a.is_scaled() {
        a.scale
    } else if b.is_scaled() {
        b.scale
    } else {
        1.0
    };
    MergePlan {
        tier: a.tier.max(b.tier).next(),
        position: (pos_a + pos_b) * 0.5,
        scale,
    }
}

/// Resolve every queued pair, oldest first.
#[allow(clippy::too_many_arguments)]
pub fn drain_merge_queue_system(
    clock: Res<GameClock>,
    config: Res<GameplayConfig>,
    flask: Res<ActiveFlask>,
    mut queue: ResMut<MergeQueue>,
    mut pieces: PieceCommands,
    mut bodies: Query<(&Piece, &mut PieceRole, &Transform)>,
    mut tiers: MessageWriter<NewTierReached>,
    mut earned: MessageWriter<PowerUpEarned>,
) {
    if !queue.begin_drain() {
        return;
    }
    let mut rng = rand::thread_rng();
    while let Some((a, b)) = queue.pop() {
        let plan = match claim_pair(&pieces, &mut bodies, a, b) {
            Ok(plan) => plan,
            Err(e) => {
                debug!("Dropping merge pair {a:?}/{b:?}: {e}");
                continue;
            }
        };

        pieces.remove(a);
        pieces.remove(b);

        let launch = if flask.flask().reduces_gravity() {
            config.merge_launch_speed * config.merge_low_gravity_launch_multiplier
        } else {
            config.merge_launch_speed
        };
        let jitter = if config.merge_jitter > 0.0 {
            rng.gen_range(-config.merge_jitter..=config.merge_jitter)
        } else {
            0.0
        };
        let now = clock.now();
        let spawn = PieceSpawn::new(plan.tier, plan.position, now)
            .scaled(plan.scale)
            .with_velocity(Vec2::new(jitter, launch))
            .with_profile(default_profile(plan.tier, flask.flask()));
        let Some(merged) = pieces.spawn(spawn) else {
            continue;
        };
        pieces.commands.entity(merged).insert((
            protected_collision_groups(),
            CollisionRestore {
                at: now + config.merge_collision_delay,
            },
        ));

        debug!(
            "Merged {a:?} + {b:?} into tier {} at ({:.0}, {:.0})",
            plan.tier.get(),
            plan.position.x,
            plan.position.y
        );
        if let Some(level) = milestone_level(plan.tier) {
            earned.write(PowerUpEarned { level });
        }
        tiers.write(NewTierReached {
            tier: plan.tier,
            position: plan.position,
        });
    }
    queue.end_drain();
}

/// Re-validate a queued pair and flag both sides as merging.
fn claim_pair(
    pieces: &PieceCommands,
    bodies: &mut Query<(&Piece, &mut PieceRole, &Transform)>,
    a: Entity,
    b: Entity,
) -> GameResult<MergePlan> {
    if a == b || !pieces.contains(a) || !pieces.contains(b) {
        return Err(GameError::PieceNotFound {
            context: "queued merge pair",
        });
    }
    let Ok([(piece_a, mut role_a, t_a), (piece_b, mut role_b, t_b)]) = bodies.get_many_mut([a, b])
    else {
        return Err(GameError::PieceNotFound {
            context: "merge body lookup",
        });
    };
    if !matches!(*role_a, PieceRole::Plain | PieceRole::Boosted(_))
        || !matches!(*role_b, PieceRole::Plain | PieceRole::Boosted(_))
        || piece_a.tier != piece_b.tier
    {
        return Err(GameError::PieceNotFound {
            context: "merge pair no longer eligible",
        });
    }

    // Read positions before either side is removed.
    let plan = plan_merge(
        piece_a,
        t_a.translation.truncate(),
        piece_b,
        t_b.translation.truncate(),
    );
    *role_a = PieceRole::Merging;
    *role_b = PieceRole::Merging;
    Ok(plan)
}
