use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use flask_merge::arena::setup_arena;
use flask_merge::config::{self, GameplayConfig};
use flask_merge::graphics::{self, WINDOW_HEIGHT, WINDOW_WIDTH};
use flask_merge::input::{self, PointerState};
use flask_merge::menu::GameOverPlugin;
use flask_merge::piece_rendering;
use flask_merge::rendering;
use flask_merge::simulation::GameplayPlugin;
use flask_merge::spawn::drag_system;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Flask Merge".into(),
                resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.06, 0.05, 0.09)))
        // Insert GameplayConfig with compiled defaults; load_gameplay_config will
        // overwrite it from assets/gameplay.toml (if present) in the Startup schedule.
        .insert_resource(GameplayConfig::default())
        // pixels_per_meter(1.0) keeps world units identical to pixels, so radii,
        // drop speeds and gravity in the config are all in the same unit.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins((GameplayPlugin, GameOverPlugin))
        .init_resource::<PointerState>()
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the final values.
                config::load_gameplay_config,
                graphics::setup_camera.after(config::load_gameplay_config),
                rendering::setup_hud.after(config::load_gameplay_config),
                rendering::setup_danger_band.after(setup_arena),
            ),
        )
        .add_systems(
            Update,
            (input::pointer_input_system, input::keyboard_input_system).before(drag_system),
        )
        .add_systems(
            Update,
            (
                rendering::attach_wall_sprite_system,
                piece_rendering::attach_piece_mesh_system,
                piece_rendering::sync_piece_mesh_system
                    .after(piece_rendering::attach_piece_mesh_system),
                rendering::danger_band_system,
                rendering::hud_display_system,
                rendering::debug_display_system,
            ),
        )
        .run();
}
