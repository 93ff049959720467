//! The container: static walls, floor, and the geometry queries built on them.
//!
//! ```text
//!        preview baseline ──────────  (top + preview_baseline_height)
//!   top ┌──────────────────────────┐
//!       │░░░░░░░ danger band ░░░░░░│
//!       │                          │  danger_line = top - danger_band_height
//!  left │                          │ right
//!       │                          │
//! floor └──────────────────────────┘
//! ```

use crate::config::GameplayConfig;
use crate::piece::{PieceRegistry, BOUNDARY_GROUP, PIECE_GROUP};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Which static boundary a collider is.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    Left,
    Right,
    Floor,
}

/// Container geometry in world units (origin at the container centre).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
    pub danger_band_height: f32,
    pub preview_baseline_height: f32,
    pub spawn_offscreen_height: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self::from_config(&GameplayConfig::default())
    }
}

impl ArenaBounds {
    pub fn from_config(config: &GameplayConfig) -> Self {
        Self {
            width: config.arena_width,
            height: config.arena_height,
            wall_thickness: config.wall_thickness,
            danger_band_height: config.danger_band_height,
            preview_baseline_height: config.preview_baseline_height,
            spawn_offscreen_height: config.spawn_offscreen_height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        -self.width * 0.5
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.width * 0.5
    }

    #[inline]
    pub fn floor(&self) -> f32 {
        -self.height * 0.5
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.height * 0.5
    }

    /// Lower edge of the danger band.
    #[inline]
    pub fn danger_line(&self) -> f32 {
        self.top() - self.danger_band_height
    }

    /// Whether a piece centre lies inside the danger band.  Positions above the
    /// container top do not count.
    pub fn in_danger_band(&self, y: f32) -> bool {
        y >= self.danger_line() && y <= self.top()
    }

    /// Resting centre height of a held piece: bottom edge on the baseline.
    pub fn preview_centre_y(&self, radius: f32) -> f32 {
        self.top() + self.preview_baseline_height + radius
    }

    /// Off-screen centre height where a new piece first appears.
    pub fn spawn_centre_y(&self, radius: f32) -> f32 {
        self.preview_centre_y(radius) + self.spawn_offscreen_height
    }

    /// Clamp a drag position to `[left + r + pad, right - r - pad]`.
    ///
    /// A piece too wide for the container is centred.
    pub fn clamp_drag_x(&self, x: f32, radius: f32, pad: f32) -> f32 {
        let lo = self.left() + radius + pad;
        let hi = self.right() - radius - pad;
        if lo > hi {
            return 0.0;
        }
        x.clamp(lo, hi)
    }

    /// Whether `position` is more than `margin` outside the container on any side.
    pub fn is_far_outside(&self, position: Vec2, margin: f32) -> bool {
        position.x < self.left() - margin
            || position.x > self.right() + margin
            || position.y < self.floor() - margin
            || position.y > self.top() + margin
    }
}

fn wall_bundle(boundary: Boundary, centre: Vec2, half_extents: Vec2) -> impl Bundle {
    (
        boundary,
        Transform::from_translation(centre.extend(0.0)),
        Visibility::default(),
        RigidBody::Fixed,
        Collider::cuboid(half_extents.x, half_extents.y),
        CollisionGroups::new(BOUNDARY_GROUP, PIECE_GROUP),
        Friction::coefficient(0.4),
        Restitution::coefficient(0.1),
    )
}

/// Startup: build the container from the loaded config and open the registry.
///
/// Must run after [`crate::config::load_gameplay_config`].
pub fn setup_arena(
    mut commands: Commands,
    config: Res<GameplayConfig>,
    mut registry: ResMut<PieceRegistry>,
) {
    let arena = ArenaBounds::from_config(&config);
    let t = arena.wall_thickness;
    let half_t = t * 0.5;
    // Side walls reach one wall thickness above the rim.
    let side_half_height = arena.height * 0.5 + t;

    commands.spawn(wall_bundle(
        Boundary::Left,
        Vec2::new(arena.left() - half_t, t * 0.5),
        Vec2::new(half_t, side_half_height),
    ));
    commands.spawn(wall_bundle(
        Boundary::Right,
        Vec2::new(arena.right() + half_t, t * 0.5),
        Vec2::new(half_t, side_half_height),
    ));
    commands.spawn(wall_bundle(
        Boundary::Floor,
        Vec2::new(0.0, arena.floor() - half_t),
        Vec2::new(arena.width * 0.5 + t, half_t),
    ));

    commands.insert_resource(arena);
    registry.mark_ready();
    info!(
        "Container ready: {:.0} x {:.0}, danger line at y = {:.0}",
        arena.width,
        arena.height,
        arena.danger_line()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_clamp_respects_radius_and_pad() {
        let arena = ArenaBounds::default();
        let r = 40.0;
        assert_eq!(
            arena.clamp_drag_x(-10_000.0, r, 4.0),
            arena.left() + r + 4.0
        );
        assert_eq!(arena.clamp_drag_x(10_000.0, r, 4.0), arena.right() - r - 4.0);
        assert_eq!(arena.clamp_drag_x(12.0, r, 4.0), 12.0);
        assert_eq!(arena.clamp_drag_x(50.0, arena.width, 4.0), 0.0);
    }

    #[test]
    fn preview_baseline_aligns_bottom_edges() {
        let arena = ArenaBounds::default();
        for r in [17.0, 50.0, 150.0] {
            let bottom = arena.preview_centre_y(r) - r;
            assert!((bottom - (arena.top() + arena.preview_baseline_height)).abs() < 1e-4);
            assert!(arena.spawn_centre_y(r) > arena.preview_centre_y(r));
        }
    }

    #[test]
    fn danger_band_excludes_positions_above_the_rim() {
        let arena = ArenaBounds::default();
        assert!(arena.in_danger_band(arena.top() - 1.0));
        assert!(!arena.in_danger_band(arena.top() + 1.0));
        assert!(!arena.in_danger_band(arena.danger_line() - 1.0));
    }

    #[test]
    fn far_outside_uses_margin_on_every_side() {
        let arena = ArenaBounds::default();
        assert!(!arena.is_far_outside(Vec2::new(arena.right() + 10.0, 0.0), 400.0));
        assert!(arena.is_far_outside(Vec2::new(arena.right() + 401.0, 0.0), 400.0));
        assert!(arena.is_far_outside(Vec2::new(0.0, arena.floor() - 401.0), 400.0));
        assert!(arena.is_far_outside(Vec2::new(0.0, arena.top() + 401.0), 400.0));
    }
}
