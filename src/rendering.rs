//! Board and HUD rendering: container walls, danger band, score HUD and the
//! debug readout.
//!
//! ## Layer Model
//!
//! | Layer        | Technology | Notes                                     |
//! |--------------|------------|-------------------------------------------|
//! | Walls        | `Sprite`   | Attached to each [`Boundary`] on spawn    |
//! | Danger band  | `Mesh2d`   | Alpha follows [`DangerZone::severity`]    |
//! | Pieces       | `Mesh2d`   | See [`crate::piece_rendering`]            |
//! | Score HUD    | Bevy UI    | Top-left, always visible                  |
//! | Debug text   | Bevy UI    | Top-right, fps and solver iterations      |
//!
//! ## System Responsibilities
//!
//! | System                        | Schedule | Purpose                          |
//! |-------------------------------|----------|----------------------------------|
//! | `setup_danger_band`           | Startup  | Spawn the band mesh              |
//! | `setup_hud`                   | Startup  | Spawn HUD and debug text nodes   |
//! | `attach_wall_sprite_system`   | Update   | Give new walls a sprite          |
//! | `danger_band_system`          | Update   | Brighten band with severity      |
//! | `hud_display_system`          | Update   | Refresh score/next/flask/power-up|
//! | `debug_display_system`        | Update   | Refresh fps and iterations       |

use crate::arena::{ArenaBounds, Boundary};
use crate::config::GameplayConfig;
use crate::danger::DangerZone;
use crate::debug::DebugControl;
use crate::flask::ActiveFlask;
use crate::powerup::{PowerUpId, PowerUpInventory};
use crate::scoring::ScoreBoard;
use crate::spawn::SpawnController;
use bevy::prelude::*;
use bevy_rapier2d::prelude::Collider;

// ── Component markers ─────────────────────────────────────────────────────────

/// Marker for the danger band mesh.
#[derive(Component)]
pub struct DangerBand {
    material: Handle<ColorMaterial>,
}

/// Marker for the score HUD text.
#[derive(Component)]
pub struct HudText;

/// Marker for the debug readout text.
#[derive(Component)]
pub struct DebugText;

fn wall_color() -> Color {
    Color::srgb(0.32, 0.30, 0.42)
}

fn band_color(alpha: f32) -> Color {
    Color::srgba(0.95, 0.18, 0.20, alpha)
}

const BAND_IDLE_ALPHA: f32 = 0.08;
const BAND_ALERT_ALPHA: f32 = 0.55;

// ── Startup ───────────────────────────────────────────────────────────────────

/// Spawn the translucent danger band across the top of the container.
///
/// Must run after [`crate::arena::setup_arena`] so the loaded geometry is used.
pub fn setup_danger_band(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    config: Res<GameplayConfig>,
) {
    let arena = ArenaBounds::from_config(&config);
    let material = materials.add(ColorMaterial::from_color(band_color(BAND_IDLE_ALPHA)));
    let centre_y = arena.top() - arena.danger_band_height * 0.5;
    commands.spawn((
        Mesh2d(meshes.add(Rectangle::new(arena.width, arena.danger_band_height))),
        MeshMaterial2d(material.clone()),
        Transform::from_translation(Vec3::new(0.0, centre_y, -0.5)),
        DangerBand { material },
    ));
}

/// Spawn the top-left HUD and the top-right debug readout.
pub fn setup_hud(mut commands: Commands, config: Res<GameplayConfig>) {
    commands.spawn((
        Text::new("Score: 0"),
        TextFont {
            font_size: config.hud_font_size,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.88, 0.45)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        HudText,
    ));
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: config.hud_font_size * 0.75,
            ..default()
        },
        TextColor(Color::srgb(0.0, 1.0, 1.0)),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        DebugText,
    ));
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Give every newly spawned wall a sprite matching its collider.
pub fn attach_wall_sprite_system(
    mut commands: Commands,
    query: Query<(Entity, &Collider), Added<Boundary>>,
) {
    for (entity, collider) in query.iter() {
        let Some(cuboid) = collider.as_cuboid() else {
            continue;
        };
        let half = cuboid.half_extents();
        commands.entity(entity).insert(Sprite {
            color: wall_color(),
            custom_size: Some(half * 2.0),
            ..default()
        });
    }
}

/// Brighten the band as the most endangered piece runs out of time.
pub fn danger_band_system(
    zone: Res<DangerZone>,
    config: Res<GameplayConfig>,
    bands: Query<&DangerBand>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    if !zone.is_changed() {
        return;
    }
    let alpha = match zone.severity {
        Some(remaining) => {
            let urgency = 1.0 - (remaining / config.danger_dwell_timeout).clamp(0.0, 1.0);
            BAND_IDLE_ALPHA + (BAND_ALERT_ALPHA - BAND_IDLE_ALPHA) * urgency
        }
        None => BAND_IDLE_ALPHA,
    };
    for band in bands.iter() {
        if let Some(material) = materials.get_mut(&band.material) {
            material.color = band_color(alpha);
        }
    }
}

pub fn hud_display_system(
    board: Res<ScoreBoard>,
    controller: Res<SpawnController>,
    flask: Res<ActiveFlask>,
    inventory: Res<PowerUpInventory>,
    mut query: Query<&mut Text, With<HudText>>,
) {
    if !(board.is_changed()
        || controller.is_changed()
        || flask.is_changed()
        || inventory.is_changed())
    {
        return;
    }
    let combo = if board.combo > 1 {
        format!("  x{}", board.combo)
    } else {
        String::new()
    };
    let selected = inventory
        .selected()
        .map_or("none", |id| id.power_up().name);
    let charges: Vec<String> = PowerUpId::ALL
        .iter()
        .enumerate()
        .map(|(i, id)| format!("{}:{}", i + 1, inventory.charges(*id)))
        .collect();
    for mut text in query.iter_mut() {
        *text = Text::new(format!(
            "Score: {}{combo}\nNext: tier {}\nFlask: {}\nPower-up: {selected}  [{}]",
            board.score,
            controller.next_tier.get(),
            flask.flask().name,
            charges.join(" ")
        ));
    }
}

pub fn debug_display_system(control: DebugControl, mut query: Query<&mut Text, With<DebugText>>) {
    let snapshot = control.snapshot();
    for mut text in query.iter_mut() {
        *text = Text::new(format!(
            "{:.0} fps\nprecision {} ({} iterations)\npieces {} live / {} spawned\nheld {}",
            snapshot.fps,
            snapshot.precision,
            snapshot.solver_iterations,
            snapshot.live_pieces,
            snapshot.spawned_total,
            snapshot.held.map_or("-".to_string(), |e| format!("{e:?}"))
        ));
    }
}
