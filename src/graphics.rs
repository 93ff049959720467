use crate::arena::ArenaBounds;
use crate::config::GameplayConfig;
use crate::tier::{radius_for, Tier};
use bevy::prelude::*;

/// Logical window size the camera framing is tuned for.
pub const WINDOW_WIDTH: u32 = 720;
pub const WINDOW_HEIGHT: u32 = 1000;

/// Setup camera for 2D rendering
///
/// The view is zoomed out so the container, the preview baseline and the
/// largest held piece all fit, and centred between the floor and that piece.
pub fn setup_camera(mut commands: Commands, config: Res<GameplayConfig>) {
    let arena = ArenaBounds::from_config(&config);
    let margin = arena.wall_thickness * 2.0;
    let top = arena.preview_centre_y(radius_for(Tier::MAX, 1.0)) + margin;
    let bottom = arena.floor() - margin;
    let width = arena.width + margin * 2.0;

    let scale = ((top - bottom) / WINDOW_HEIGHT as f32)
        .max(width / WINDOW_WIDTH as f32)
        .max(1.0);
    commands.spawn((
        Camera2d,
        Transform::from_translation(Vec3::new(0.0, (top + bottom) * 0.5, 0.0))
            .with_scale(Vec3::new(scale, scale, 1.0)),
    ));
    info!("Camera spawned (scale {scale:.2})");
}
