//! Collision classification and the void-piece rules.
//!
//! Every `CollisionEvent::Started` from Rapier is classified, in order:
//!
//! 1. **Wall** (piece + boundary): a void piece touching the floor is removed;
//!    on a side wall its horizontal velocity is zeroed and laser variants are
//!    pinned back onto their descent.  Other pieces are left to the solver.
//! 2. **Ignore**: either side is not a live piece, or is still held, or is
//!    already merging.
//! 3. **Void**: exactly one side is an active void piece and the other is a
//!    plain-or-boosted piece outside its spawn protection.  The victim is
//!    removed and the budget drops by one.
//! 4. **Merge**: same tier below the cap, neither side a void piece.  The
//!    pair is queued for [`crate::merge::drain_merge_queue_system`].
//! 5. **Low-gravity bounce**: when the rule is registered, both pieces get an
//!    outward kick along the centre line plus a little jitter.
//!
//! Nothing here mutates the world synchronously beyond velocities and the
//! idempotent removal path.

use crate::arena::Boundary;
use crate::config::GameplayConfig;
use crate::flask::{CollisionListeners, SpecialCollisionRule};
use crate::merge::MergeQueue;
use crate::piece::{Piece, PieceCommands, PieceRole, VoidStrength};
use crate::simulation::GameClock;
use crate::tier::can_merge;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::Rng;

type PieceBody = (
    &'static Piece,
    &'static mut PieceRole,
    &'static Transform,
    &'static mut Velocity,
);

/// Classify this step's contact starts.
#[allow(clippy::too_many_arguments)]
pub fn classify_collisions_system(
    mut events: MessageReader<CollisionEvent>,
    clock: Res<GameClock>,
    config: Res<GameplayConfig>,
    listeners: Res<CollisionListeners>,
    mut queue: ResMut<MergeQueue>,
    mut pieces: PieceCommands,
    boundaries: Query<&Boundary>,
    mut bodies: Query<PieceBody>,
) {
    let now = clock.now();
    let bounce = listeners.contains(SpecialCollisionRule::LowGravityBounce);
    let mut rng = rand::thread_rng();

    for event in events.read() {
        let CollisionEvent::Started(e1, e2, _) = *event else {
            continue;
        };

        // Wall contacts.
        match (boundaries.get(e1).ok(), boundaries.get(e2).ok()) {
            (Some(wall), None) => {
                wall_contact(&mut pieces, &mut bodies, e2, *wall);
                continue;
            }
            (None, Some(wall)) => {
                wall_contact(&mut pieces, &mut bodies, e1, *wall);
                continue;
            }
            (Some(_), Some(_)) => continue,
            (None, None) => {}
        }

        if !pieces.contains(e1) || !pieces.contains(e2) {
            continue;
        }
        let Ok([(p1, mut r1, t1, mut v1), (p2, mut r2, t2, mut v2)]) =
            bodies.get_many_mut([e1, e2])
        else {
            continue;
        };
        if !p1.is_dropped() || !p2.is_dropped() || r1.is_merging() || r2.is_merging() {
            continue;
        }

        // Void interaction.
        let void_side = match (r1.active_void().is_some(), r2.active_void().is_some()) {
            (true, false) => Some(true),
            (false, true) => Some(false),
            _ => None,
        };
        if let Some(first_is_void) = void_side {
            let (void_role, void_vel, victim, victim_piece, victim_role) = if first_is_void {
                (&mut r1, &mut v1, e2, p2, &*r2)
            } else {
                (&mut r2, &mut v2, e1, p1, &*r1)
            };
            if victim_role.is_void() || now - victim_piece.spawned_at < config.void_spawn_protection
            {
                continue;
            }
            let PieceRole::Void(charge) = &mut **void_role else {
                continue;
            };
            if !pieces.remove(victim) {
                continue;
            }
            let exhausted = charge.record_kill(now);
            match charge.strength {
                VoidStrength::Basic => {
                    void_vel.linvel.x *= config.void_rebound_damping;
                    void_vel.linvel.y = void_vel.linvel.y.max(-config.void_rebound_cap);
                }
                VoidStrength::Super | VoidStrength::Ultra => {
                    void_vel.linvel = Vec2::new(0.0, -charge.descent_speed);
                }
            }
            debug!(
                "Void piece deleted {victim:?}; {} left{}",
                charge.remaining,
                if exhausted { " (exhausted)" } else { "" }
            );
            continue;
        }
        if r1.is_void() || r2.is_void() {
            continue;
        }

        // Normal merge.
        if can_merge(p1.tier, p2.tier) {
            queue.push(e1, e2);
            continue;
        }

        // Low-gravity bounce.
        if bounce {
            let normal = (t1.translation.truncate() - t2.translation.truncate()).normalize_or_zero();
            let jitter = |rng: &mut rand::rngs::ThreadRng| {
                if config.low_gravity_jitter > 0.0 {
                    Vec2::new(
                        rng.gen_range(-config.low_gravity_jitter..=config.low_gravity_jitter),
                        rng.gen_range(-config.low_gravity_jitter..=config.low_gravity_jitter),
                    )
                } else {
                    Vec2::ZERO
                }
            };
            v1.linvel += normal * config.low_gravity_bounce_speed + jitter(&mut rng);
            v2.linvel -= normal * config.low_gravity_bounce_speed - jitter(&mut rng);
        }
    }
}

fn wall_contact(
    pieces: &mut PieceCommands,
    bodies: &mut Query<PieceBody>,
    entity: Entity,
    wall: Boundary,
) {
    if !pieces.contains(entity) {
        return;
    }
    let Ok((piece, role, _, mut velocity)) = bodies.get_mut(entity) else {
        return;
    };
    let PieceRole::Void(charge) = *role else {
        return;
    };
    if !piece.is_dropped() {
        return;
    }
    match wall {
        Boundary::Floor => {
            pieces.remove(entity);
            debug!("Void piece {entity:?} reached the floor");
        }
        Boundary::Left | Boundary::Right => {
            velocity.linvel.x = 0.0;
            if charge.is_laser() {
                velocity.linvel.y = -charge.descent_speed;
            }
        }
    }
}

/// Per-tick void upkeep: hold laser descents and retire exhausted voids.
pub fn void_upkeep_system(
    clock: Res<GameClock>,
    config: Res<GameplayConfig>,
    mut pieces: PieceCommands,
    mut query: Query<(Entity, &PieceRole, &mut Velocity)>,
) {
    let now = clock.now();
    for (entity, role, mut velocity) in query.iter_mut() {
        let PieceRole::Void(charge) = role else {
            continue;
        };
        if charge.is_laser() {
            velocity.linvel = Vec2::new(0.0, -charge.descent_speed);
        }
        if let Some(at) = charge.exhausted_at {
            if now - at >= config.void_grace_delay && pieces.remove(entity) {
                debug!("Retired exhausted void piece {entity:?}");
            }
        }
    }
}
