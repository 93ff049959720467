//! Piece components, the live-piece registry, and the spawn/remove helpers.
//!
//! A piece is a circular Rapier body tagged with a [`Piece`] (tier, scale,
//! spawn and drop timestamps) and a [`PieceRole`] saying which physical
//! profile currently applies.  All creation and removal goes through
//! [`PieceCommands`] so the [`PieceRegistry`] always knows which ids are live.
//!
//! ## Collision groups
//!
//! | Layer           | Group   | Collides with          |
//! |-----------------|---------|------------------------|
//! | Live piece      | GROUP_1 | GROUP_1, GROUP_2       |
//! | Boundary        | GROUP_2 | GROUP_1                |
//! | Held piece      | GROUP_3 | nothing                |
//! | Fresh merge     | GROUP_1 | GROUP_2 only (briefly) |

use crate::powerup::PowerUpId;
use crate::simulation::GameClock;
use crate::tier::{radius_for, tier_profile, PhysicalProfile, Tier};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;
use std::collections::HashSet;

pub const PIECE_GROUP: Group = Group::GROUP_1;
pub const BOUNDARY_GROUP: Group = Group::GROUP_2;
pub const HELD_GROUP: Group = Group::GROUP_3;

/// Groups of a dropped piece with full collision interaction.
pub fn live_collision_groups() -> CollisionGroups {
    CollisionGroups::new(PIECE_GROUP, PIECE_GROUP | BOUNDARY_GROUP)
}

/// Groups of a held piece: it touches nothing until released.
pub fn held_collision_groups() -> CollisionGroups {
    CollisionGroups::new(HELD_GROUP, Group::NONE)
}

/// Groups of a freshly merged piece: walls only, until [`CollisionRestore`] fires.
pub fn protected_collision_groups() -> CollisionGroups {
    CollisionGroups::new(PIECE_GROUP, BOUNDARY_GROUP)
}

// ── Components ────────────────────────────────────────────────────────────────

/// Core per-piece state.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    pub tier: Tier,
    /// Size-modifier scale applied on top of the tier radius (1.0 = unscaled).
    pub scale: f32,
    pub spawned_at: f32,
    /// `None` while the piece is held above the container.
    pub dropped_at: Option<f32>,
}

impl Piece {
    #[inline]
    pub fn is_dropped(&self) -> bool {
        self.dropped_at.is_some()
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        radius_for(self.tier, self.scale)
    }

    #[inline]
    pub fn is_scaled(&self) -> bool {
        (self.scale - 1.0).abs() > f32::EPSILON
    }
}

/// Which gameplay role, and therefore which physical profile, a piece has.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum PieceRole {
    /// Tier defaults under the active flask.
    Plain,
    /// Deletes other pieces on contact until its budget runs out.
    Void(VoidCharge),
    /// Carries a timed GRAVITY power-up override.
    Boosted(ActiveBoost),
    /// Consumed by a merge in progress; excluded from every further rule.
    Merging,
}

impl PieceRole {
    #[inline]
    pub fn is_merging(&self) -> bool {
        matches!(self, PieceRole::Merging)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, PieceRole::Void(_))
    }

    /// The void charge, if this piece is a void piece that can still delete.
    pub fn active_void(&self) -> Option<&VoidCharge> {
        match self {
            PieceRole::Void(charge) if charge.is_active() => Some(charge),
            _ => None,
        }
    }
}

/// Strength tier of a void piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoidStrength {
    /// Solid body that rebounds after each kill.
    Basic,
    /// Sensor that descends in a straight line.
    Super,
    /// Like `Super`, with a bigger budget.
    Ultra,
}

/// Deletion budget and trajectory of a void piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoidCharge {
    pub source: PowerUpId,
    pub strength: VoidStrength,
    pub remaining: u32,
    /// Constant descent speed (u/s) held by sensor variants.
    pub descent_speed: f32,
    /// Clock time at which the budget reached zero.
    pub exhausted_at: Option<f32>,
}

impl VoidCharge {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    /// `Super` and `Ultra` pieces hold a straight "laser" descent.
    #[inline]
    pub fn is_laser(&self) -> bool {
        matches!(self.strength, VoidStrength::Super | VoidStrength::Ultra)
    }

    /// Spend one unit of budget.  Returns `true` when this kill exhausted it.
    pub fn record_kill(&mut self, now: f32) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.exhausted_at = Some(now);
            return true;
        }
        false
    }
}

/// A timed GRAVITY power-up applied at release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveBoost {
    pub source: PowerUpId,
    pub activated_at: f32,
    pub duration: f32,
    /// Snapshot of the override profile in force while boosted.
    pub profile: PhysicalProfile,
    /// Extra downward force (u·mass/s²) applied while boosted.
    pub constant_force: f32,
}

impl ActiveBoost {
    #[inline]
    pub fn is_expired(&self, now: f32) -> bool {
        now - self.activated_at > self.duration
    }
}

/// Physical profile currently applied to the collider.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PieceProfile(pub PhysicalProfile);

/// Visual override: optional stroke colour (linear RGB) and glow strength.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct PieceVisual {
    pub stroke: Option<[f32; 3]>,
    pub glow: f32,
}

/// Marks a held piece whose tier is temporarily raised for a power-up preview.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TierPreview {
    pub original: Tier,
    pub source: PowerUpId,
}

/// Danger-zone dwell clock: when the piece last entered the band.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct DangerDwell {
    pub entered_at: Option<f32>,
}

/// Full collision interaction resumes at this clock time.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CollisionRestore {
    pub at: f32,
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Set of live piece ids plus lifetime counters.
///
/// Removal is reflected here immediately, before the despawn command is
/// applied, so later reads in the same frame never see a removed piece.
#[derive(Resource, Debug, Default)]
pub struct PieceRegistry {
    ready: bool,
    live: HashSet<Entity>,
    spawned_total: u64,
    removed_total: u64,
}

impl PieceRegistry {
    /// Called once the container exists; creation before this is refused.
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.live.contains(&entity)
    }

    #[inline]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live.iter().copied()
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn removed_total(&self) -> u64 {
        self.removed_total
    }

    fn track(&mut self, entity: Entity) {
        self.live.insert(entity);
        self.spawned_total += 1;
    }

    fn forget(&mut self, entity: Entity) -> bool {
        let was_live = self.live.remove(&entity);
        if was_live {
            self.removed_total += 1;
        }
        was_live
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Everything needed to create one piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceSpawn {
    pub tier: Tier,
    pub position: Vec2,
    pub scale: f32,
    pub held: bool,
    pub now: f32,
    pub velocity: Vec2,
    pub profile: PhysicalProfile,
}

impl PieceSpawn {
    /// A dropped, unscaled piece at rest with tier-default physics.
    pub fn new(tier: Tier, position: Vec2, now: f32) -> Self {
        Self {
            tier,
            position,
            scale: 1.0,
            held: false,
            now,
            velocity: Vec2::ZERO,
            profile: tier_profile(tier),
        }
    }

    pub fn held(mut self) -> Self {
        self.held = true;
        self
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_profile(mut self, profile: PhysicalProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Rapier material components for a profile.
pub fn profile_components(
    profile: &PhysicalProfile,
) -> (Friction, Restitution, ColliderMassProperties, Damping) {
    (
        Friction::coefficient(profile.friction),
        Restitution::coefficient(profile.restitution),
        ColliderMassProperties::Density(profile.density),
        Damping {
            linear_damping: profile.air_friction,
            angular_damping: 0.0,
        },
    )
}

/// Component bundle for a new piece.
pub fn piece_bundle(spawn: &PieceSpawn) -> impl Bundle {
    let radius = radius_for(spawn.tier, spawn.scale);
    let (body, groups) = if spawn.held {
        (RigidBody::Fixed, held_collision_groups())
    } else {
        (RigidBody::Dynamic, live_collision_groups())
    };
    (
        (
            Piece {
                tier: spawn.tier,
                scale: spawn.scale,
                spawned_at: spawn.now,
                dropped_at: (!spawn.held).then_some(spawn.now),
            },
            PieceRole::Plain,
            PieceProfile(spawn.profile),
            PieceVisual::default(),
            DangerDwell::default(),
            Transform::from_translation(spawn.position.extend(0.1)),
            Visibility::default(),
        ),
        (
            body,
            Collider::ball(radius),
            profile_components(&spawn.profile),
            Velocity {
                linvel: spawn.velocity,
                angvel: 0.0,
            },
            ExternalForce::default(),
            groups,
            ActiveEvents::COLLISION_EVENTS,
            Sleeping::disabled(),
        ),
    )
}

/// Spawn/remove access to pieces that keeps the registry consistent.
#[derive(SystemParam)]
pub struct PieceCommands<'w, 's> {
    pub commands: Commands<'w, 's>,
    registry: ResMut<'w, PieceRegistry>,
}

impl PieceCommands<'_, '_> {
    /// Create a piece.  Returns `None` while the container is not ready yet;
    /// callers treat that as "try again later".
    pub fn spawn(&mut self, spawn: PieceSpawn) -> Option<Entity> {
        if !self.registry.is_ready() {
            return None;
        }
        let entity = self.commands.spawn(piece_bundle(&spawn)).id();
        self.registry.track(entity);
        Some(entity)
    }

    /// Remove a piece.  Safe to call any number of times: only the first call
    /// for a live piece does anything and returns `true`.
    ///
    /// Despawning drops the piece's mesh and material handles, which releases
    /// the per-piece assets generated for it.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.registry.forget(entity) {
            return false;
        }
        if let Ok(mut entity_commands) = self.commands.get_entity(entity) {
            entity_commands.try_despawn();
        }
        true
    }

    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.registry.contains(entity)
    }

    pub fn registry(&self) -> &PieceRegistry {
        &self.registry
    }
}

/// Spawn a piece directly into a [`World`] (scenario scripts and tests).
pub fn spawn_piece_in_world(world: &mut World, spawn: PieceSpawn) -> Option<Entity> {
    if !world.resource::<PieceRegistry>().is_ready() {
        return None;
    }
    let entity = world.spawn(piece_bundle(&spawn)).id();
    world.resource_mut::<PieceRegistry>().track(entity);
    Some(entity)
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Push a changed [`PieceProfile`] into the Rapier material components.
pub fn sync_profile_system(
    mut query: Query<
        (
            &PieceProfile,
            &mut Friction,
            &mut Restitution,
            &mut ColliderMassProperties,
            &mut Damping,
        ),
        Changed<PieceProfile>,
    >,
) {
    for (profile, mut friction, mut restitution, mut mass, mut damping) in query.iter_mut() {
        let (f, r, m, d) = profile_components(&profile.0);
        *friction = f;
        *restitution = r;
        *mass = m;
        *damping = d;
    }
}

/// Switch settled pieces to their static friction coefficient and moving
/// pieces back to the dynamic one.
pub fn settling_friction_system(
    config: Res<crate::config::GameplayConfig>,
    mut query: Query<(&Piece, &PieceProfile, &Velocity, &mut Friction)>,
) {
    for (piece, profile, velocity, mut friction) in query.iter_mut() {
        if !piece.is_dropped() {
            continue;
        }
        let wanted = if velocity.linvel.length() < config.settle_speed {
            profile.0.static_friction
        } else {
            profile.0.friction
        };
        if friction.coefficient != wanted {
            friction.coefficient = wanted;
        }
    }
}

/// Re-enable full collisions on freshly merged pieces once their delay passes.
pub fn restore_collisions_system(
    mut commands: Commands,
    clock: Res<GameClock>,
    mut query: Query<(Entity, &CollisionRestore, &mut CollisionGroups)>,
) {
    for (entity, restore, mut groups) in query.iter_mut() {
        if clock.now() < restore.at {
            continue;
        }
        *groups = live_collision_groups();
        commands.entity(entity).try_remove::<CollisionRestore>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_world() -> World {
        let mut world = World::new();
        let mut registry = PieceRegistry::default();
        registry.mark_ready();
        world.insert_resource(registry);
        world
    }

    #[test]
    fn spawn_refused_before_ready() {
        let mut world = World::new();
        world.insert_resource(PieceRegistry::default());
        let spawn = PieceSpawn::new(Tier::MIN, Vec2::ZERO, 0.0);
        assert!(spawn_piece_in_world(&mut world, spawn).is_none());
        assert_eq!(world.resource::<PieceRegistry>().live_count(), 0);
    }

    #[test]
    fn held_spawn_is_fixed_and_collisionless() {
        let mut world = ready_world();
        let spawn = PieceSpawn::new(Tier::clamped(3), Vec2::new(0.0, 500.0), 1.0).held();
        let e = spawn_piece_in_world(&mut world, spawn).unwrap();

        let piece = world.get::<Piece>(e).unwrap();
        assert!(!piece.is_dropped());
        assert_eq!(*world.get::<RigidBody>(e).unwrap(), RigidBody::Fixed);
        assert_eq!(
            world.get::<CollisionGroups>(e).unwrap().filters,
            Group::NONE
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let mut world = ready_world();
        let e = spawn_piece_in_world(&mut world, PieceSpawn::new(Tier::MIN, Vec2::ZERO, 0.0))
            .unwrap();

        let mut state: bevy::ecs::system::SystemState<PieceCommands> =
            bevy::ecs::system::SystemState::new(&mut world);
        {
            let mut pieces = state.get_mut(&mut world);
            assert!(pieces.remove(e));
            assert!(!pieces.contains(e));
            assert!(!pieces.remove(e));
        }
        state.apply(&mut world);
        assert!(world.get_entity(e).is_err());

        {
            let mut pieces = state.get_mut(&mut world);
            assert!(!pieces.remove(e));
        }
        state.apply(&mut world);

        let registry = world.resource::<PieceRegistry>();
        assert_eq!(registry.removed_total(), 1);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn void_charge_exhausts_exactly_once() {
        let mut charge = VoidCharge {
            source: PowerUpId::VoidBall,
            strength: VoidStrength::Basic,
            remaining: 2,
            descent_speed: 0.0,
            exhausted_at: None,
        };
        assert!(!charge.record_kill(1.0));
        assert_eq!(charge.remaining, 1);
        assert!(charge.record_kill(2.0));
        assert_eq!(charge.exhausted_at, Some(2.0));
        assert!(!charge.record_kill(3.0));
        assert_eq!(charge.remaining, 0);
        assert_eq!(charge.exhausted_at, Some(2.0));
    }

    #[test]
    fn merging_role_has_no_active_void() {
        assert!(PieceRole::Merging.active_void().is_none());
        assert!(PieceRole::Merging.is_merging());
        assert!(!PieceRole::Plain.is_void());
    }
}
