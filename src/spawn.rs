//! Spawn and drag controller: the "next piece" held above the container.
//!
//! ```text
//! Idle ──(respawn deadline)──▶ Previewing ──(entrance done)──▶ Dragging
//!  ▲                                                              │
//!  └────────────────────────(Release)─────────────────────────────┘
//! ```
//!
//! Drag and release requests arrive as [`DragCommand`] messages and are only
//! honoured in `Dragging`.  Anything received while the entrance animation
//! runs (or while idle) is dropped.

use crate::arena::ArenaBounds;
use crate::config::GameplayConfig;
use crate::flask::{default_profile, ActiveFlask};
use crate::physics::WorldPhysics;
use crate::piece::{
    live_collision_groups, Piece, PieceCommands, PieceProfile, PieceRole, PieceSpawn,
    PieceVisual, TierPreview,
};
use crate::powerup::{apply_power_up, PowerUpConsumed, PowerUpInventory};
use crate::simulation::GameClock;
use crate::tier::{roll_spawn_tier, Tier};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnPhase {
    /// No held piece; the next one appears once the clock reaches `respawn_at`.
    Idle { respawn_at: f32 },
    /// Held piece sliding from `from_y` to `to_y`.
    Previewing { started_at: f32, from_y: f32, to_y: f32 },
    /// Held piece follows the pointer horizontally.
    Dragging,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SpawnController {
    pub phase: SpawnPhase,
    pub held: Option<Entity>,
    /// Tier the next spawn will use (shown in the HUD).
    pub next_tier: Tier,
    /// Number of pieces released this session.
    pub drops: u32,
}

impl Default for SpawnController {
    fn default() -> Self {
        Self {
            phase: SpawnPhase::Idle { respawn_at: 0.0 },
            held: None,
            next_tier: Tier::MIN,
            drops: 0,
        }
    }
}

impl SpawnController {
    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, SpawnPhase::Dragging)
    }

    /// Stop spawning until [`SpawnController::default`] is restored.
    pub fn halt(&mut self) {
        self.phase = SpawnPhase::Idle {
            respawn_at: f32::INFINITY,
        };
    }
}

/// Pointer intent in world x coordinates.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum DragCommand {
    Begin { x: f32 },
    Move { x: f32 },
    Release { x: f32 },
}

impl DragCommand {
    pub fn x(&self) -> f32 {
        match *self {
            DragCommand::Begin { x } | DragCommand::Move { x } | DragCommand::Release { x } => x,
        }
    }
}

#[inline]
fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Initial downward drop speed for the current world constants.
pub fn drop_speed(
    config: &GameplayConfig,
    world: &WorldPhysics,
    reduces_gravity: bool,
    force_multiplier: f32,
) -> f32 {
    let mut speed = config.base_drop_speed
        * world.gravity_ratio().sqrt()
        * world.time_scale
        * force_multiplier;
    if reduces_gravity {
        speed *= config.low_gravity_drop_multiplier;
    }
    speed
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Create the next held piece once the respawn deadline passes.
pub fn respawn_system(
    clock: Res<GameClock>,
    config: Res<GameplayConfig>,
    arena: Res<ArenaBounds>,
    flask: Res<ActiveFlask>,
    mut controller: ResMut<SpawnController>,
    mut pieces: PieceCommands,
) {
    let SpawnPhase::Idle { respawn_at } = controller.phase else {
        return;
    };
    let now = clock.now();
    if controller.held.is_some() || now < respawn_at {
        return;
    }

    let flask = flask.flask();
    let tier = controller.next_tier;
    let scale = flask.size_scale;
    let radius = crate::tier::radius_for(tier, scale);
    let from_y = arena.spawn_centre_y(radius);
    let spawn = PieceSpawn::new(tier, Vec2::new(0.0, from_y), now)
        .held()
        .scaled(scale)
        .with_profile(default_profile(tier, flask));

    // Not ready yet: stay idle and retry next frame.
    let Some(entity) = pieces.spawn(spawn) else {
        return;
    };
    controller.held = Some(entity);
    controller.next_tier = roll_spawn_tier(&mut rand::thread_rng());
    controller.phase = SpawnPhase::Previewing {
        started_at: now,
        from_y,
        to_y: arena.preview_centre_y(radius),
    };
    debug!("Spawned held tier {} piece {entity:?}", tier.get());
}

/// Slide the held piece down to its preview height.
pub fn entrance_animation_system(
    clock: Res<GameClock>,
    config: Res<GameplayConfig>,
    mut controller: ResMut<SpawnController>,
    mut transforms: Query<&mut Transform, With<Piece>>,
) {
    let SpawnPhase::Previewing {
        started_at,
        from_y,
        to_y,
    } = controller.phase
    else {
        return;
    };
    let Some(held) = controller.held else {
        controller.phase = SpawnPhase::Idle {
            respawn_at: clock.now(),
        };
        return;
    };
    let Ok(mut transform) = transforms.get_mut(held) else {
        controller.held = None;
        controller.phase = SpawnPhase::Idle {
            respawn_at: clock.now(),
        };
        return;
    };

    let t = ((clock.now() - started_at) / config.entrance_duration).clamp(0.0, 1.0);
    transform.translation.y = from_y + (to_y - from_y) * ease_out_cubic(t);
    if t >= 1.0 {
        controller.phase = SpawnPhase::Dragging;
    }
}

/// Everything a release touches besides the held piece itself.
#[derive(SystemParam)]
pub struct ReleaseContext<'w> {
    clock: Res<'w, GameClock>,
    config: Res<'w, GameplayConfig>,
    world: Res<'w, WorldPhysics>,
    flask: Res<'w, ActiveFlask>,
    inventory: ResMut<'w, PowerUpInventory>,
    consumed: MessageWriter<'w, PowerUpConsumed>,
}

/// Apply drag and release requests to the held piece.
#[allow(clippy::type_complexity)]
pub fn drag_system(
    mut commands: Commands,
    mut requests: MessageReader<DragCommand>,
    arena: Res<ArenaBounds>,
    mut controller: ResMut<SpawnController>,
    mut ctx: ReleaseContext,
    mut query: Query<(
        &mut Piece,
        &mut PieceRole,
        &mut PieceProfile,
        &mut PieceVisual,
        &mut Transform,
        &mut Velocity,
        &mut RigidBody,
        &mut CollisionGroups,
        &mut Collider,
        &mut ExternalForce,
        Has<TierPreview>,
    )>,
) {
    for request in requests.read() {
        if !controller.is_dragging() {
            continue;
        }
        let Some(held) = controller.held else {
            continue;
        };
        let Ok((
            mut piece,
            mut role,
            mut profile,
            mut visual,
            mut transform,
            mut velocity,
            mut body,
            mut groups,
            mut collider,
            mut force,
            previewed,
        )) = query.get_mut(held)
        else {
            controller.held = None;
            controller.phase = SpawnPhase::Idle {
                respawn_at: ctx.clock.now(),
            };
            continue;
        };

        let radius = piece.radius();
        transform.translation.x = arena.clamp_drag_x(request.x(), radius, ctx.config.spawn_pad);
        if !matches!(request, DragCommand::Release { .. }) {
            continue;
        }

        // Release: the held piece becomes live.
        let now = ctx.clock.now();
        let flask = ctx.flask.flask();
        commands.entity(held).try_remove::<TierPreview>();
        // A kept preview bump still carries the original tier's material.
        if previewed {
            profile.0 = default_profile(piece.tier, flask);
        }
        piece.dropped_at = Some(now);
        *body = RigidBody::Dynamic;
        *groups = live_collision_groups();
        *collider = Collider::ball(radius);

        let power_up = ctx.inventory.active();
        let force_multiplier = power_up.map_or(1.0, |p| p.effect.force_multiplier);
        velocity.linvel = Vec2::new(
            0.0,
            -drop_speed(
                &ctx.config,
                &ctx.world,
                flask.reduces_gravity(),
                force_multiplier,
            ),
        );
        velocity.angvel = 0.0;

        if let Some(power_up) = power_up {
            let applied = apply_power_up(power_up, &piece, profile.0, now);
            *role = applied.role;
            profile.0 = applied.profile;
            *visual = applied.visual;
            force.force = Vec2::new(0.0, -applied.constant_force);
            if applied.sensor {
                commands
                    .entity(held)
                    .insert((Sensor, GravityScale(0.0)));
                if let PieceRole::Void(charge) = *role {
                    velocity.linvel = Vec2::new(0.0, -charge.descent_speed);
                }
            }
            ctx.inventory.consume(power_up.id);
            ctx.consumed.write(PowerUpConsumed { id: power_up.id });
            info!("{} applied to a tier {} piece", power_up.name, piece.tier.get());
        }

        controller.drops += 1;
        controller.held = None;
        controller.phase = SpawnPhase::Idle {
            respawn_at: now + ctx.config.next_spawn_delay,
        };
        debug!(
            "Released {held:?} at x = {:.1} with vy = {:.1}",
            transform.translation.x, velocity.linvel.y
        );
    }
}
