//! Gameplay plugin: clock, resources, messages and the per-frame system order.
//!
//! ## Frame order
//!
//! | Schedule    | Systems (in order)                                              |
//! |-------------|-----------------------------------------------------------------|
//! | `Update`    | clock tick, drag/release, entrance slide, respawn, selection,   |
//! |             | preview, flask switch, precision commands, Rapier sync          |
//! | `PostUpdate`| (after Rapier writeback) classify contacts, drain merges, grant |
//! |             | earned power-ups, restore collisions, void upkeep, expiry,      |
//! |             | settling friction, danger zone, GC, scoring                     |
//!
//! Every contact of one physics step is classified before any merge resolves.
//! Gameplay systems run only in [`GameState::Playing`].  The plugin does not
//! add Rapier itself, so headless tests can drive it by injecting
//! [`CollisionEvent`] messages.

use crate::arena::{setup_arena, ArenaBounds};
use crate::collision::{classify_collisions_system, void_upkeep_system};
use crate::config::{load_gameplay_config, GameplayConfig};
use crate::danger::{danger_zone_system, DangerZone, GameOver};
use crate::debug::{frame_rate_system, solver_precision_command_system, FrameRate, SetSolverPrecision};
use crate::flask::{flask_switch_system, ActiveFlask, CollisionListeners, SelectFlask};
use crate::garbage::{configure_garbage_collector, garbage_collection_system, GarbageCollector};
use crate::menu::GameState;
use crate::merge::{drain_merge_queue_system, MergeQueue, NewTierReached};
use crate::physics::{
    configure_solver_precision, sync_solver_precision_system, sync_world_physics_system,
    SolverPrecision, WorldPhysics,
};
use crate::piece::{
    restore_collisions_system, settling_friction_system, sync_profile_system, PieceCommands,
    PieceRegistry,
};
use crate::powerup::{
    earn_power_up_system, power_up_expiry_system, power_up_preview_system,
    select_power_up_system, PowerUpConsumed, PowerUpEarned, PowerUpInventory, SelectPowerUp,
};
use crate::scoring::{scoring_system, ScoreBoard};
use crate::spawn::{
    drag_system, entrance_animation_system, respawn_system, DragCommand, SpawnController,
};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Seconds of playing time.  Every piece timestamp is on this clock.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct GameClock {
    elapsed: f32,
}

impl GameClock {
    #[inline]
    pub fn now(&self) -> f32 {
        self.elapsed
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }
}

pub fn tick_clock_system(time: Res<Time>, mut clock: ResMut<GameClock>) {
    clock.advance(time.delta_secs());
}

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_message::<CollisionEvent>()
            .add_message::<DragCommand>()
            .add_message::<SelectFlask>()
            .add_message::<SelectPowerUp>()
            .add_message::<SetSolverPrecision>()
            .add_message::<PowerUpConsumed>()
            .add_message::<PowerUpEarned>()
            .add_message::<NewTierReached>()
            .add_message::<GameOver>()
            .init_resource::<GameplayConfig>()
            .init_resource::<GameClock>()
            .init_resource::<PieceRegistry>()
            .init_resource::<ArenaBounds>()
            .init_resource::<WorldPhysics>()
            .init_resource::<SolverPrecision>()
            .init_resource::<SpawnController>()
            .init_resource::<MergeQueue>()
            .init_resource::<PowerUpInventory>()
            .init_resource::<ActiveFlask>()
            .init_resource::<CollisionListeners>()
            .init_resource::<DangerZone>()
            .init_resource::<GarbageCollector>()
            .init_resource::<ScoreBoard>()
            .init_resource::<FrameRate>()
            .add_systems(
                Startup,
                (
                    configure_solver_precision,
                    configure_garbage_collector,
                    setup_arena,
                )
                    .after(load_gameplay_config),
            )
            .add_systems(
                Update,
                (
                    tick_clock_system,
                    drag_system,
                    entrance_animation_system,
                    respawn_system,
                    select_power_up_system,
                    power_up_preview_system,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    frame_rate_system,
                    flask_switch_system,
                    solver_precision_command_system,
                    sync_profile_system,
                    sync_world_physics_system,
                    sync_solver_precision_system,
                )
                    .chain()
                    .after(power_up_preview_system),
            )
            .add_systems(
                PostUpdate,
                (
                    classify_collisions_system,
                    drain_merge_queue_system,
                    earn_power_up_system,
                    restore_collisions_system,
                    void_upkeep_system,
                    power_up_expiry_system,
                    settling_friction_system,
                    danger_zone_system,
                    garbage_collection_system,
                    scoring_system,
                )
                    .chain()
                    .after(PhysicsSet::Writeback)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(OnEnter(GameState::GameOver), freeze_session)
            .add_systems(OnExit(GameState::GameOver), reset_session);
    }
}

// ── Session lifecycle ─────────────────────────────────────────────────────────

/// Entering game over: stop timers and pending work, keep the board visible.
pub fn freeze_session(
    mut queue: ResMut<MergeQueue>,
    mut gc: ResMut<GarbageCollector>,
    mut controller: ResMut<SpawnController>,
) {
    queue.clear();
    gc.timer.pause();
    controller.halt();
}

/// Leaving game over: tear the session down and start a fresh one.
///
/// Listeners and timers stop first, then every piece goes through the
/// idempotent removal path, then the per-session resources are reset.
#[allow(clippy::too_many_arguments)]
pub fn reset_session(
    config: Res<GameplayConfig>,
    flask: Res<ActiveFlask>,
    mut listeners: ResMut<CollisionListeners>,
    mut gc: ResMut<GarbageCollector>,
    mut pieces: PieceCommands,
    mut clock: ResMut<GameClock>,
    mut queue: ResMut<MergeQueue>,
    mut controller: ResMut<SpawnController>,
    mut board: ResMut<ScoreBoard>,
    mut inventory: ResMut<PowerUpInventory>,
    mut zone: ResMut<DangerZone>,
) {
    listeners.clear();
    gc.timer.pause();

    let live: Vec<Entity> = pieces.registry().live().collect();
    let removed = live.into_iter().filter(|e| pieces.remove(*e)).count();

    queue.clear();
    *clock = GameClock::default();
    *controller = SpawnController::default();
    *board = ScoreBoard::default();
    *inventory = PowerUpInventory::default();
    *zone = DangerZone::default();
    *gc = GarbageCollector::new(config.gc_interval);
    if let Some(rule) = flask.flask().special {
        listeners.register(rule);
    }
    info!("Session reset: {removed} pieces cleared");
}
