//! Headless gameplay scenarios driven through [`GameplayPlugin`].
//!
//! Rapier is not added: contacts are injected as `CollisionEvent` messages
//! and nothing integrates velocities, so positions stay exactly where the
//! test puts them.  Time advances by a fixed step per `app.update()`.
//!
//! Covered scenarios:
//! 1. Two same-tier pieces merge into one next-tier piece at their midpoint.
//! 2. A–B and B–C reported in the same step: B merges exactly once.
//! 3. A queued max-tier pair resolves to a capped max-tier piece.
//! 4. Freshly merged pieces regain full collisions after the delay.
//! 5. A void piece with budget 2 deletes two pieces, then is retired.
//! 6. Spawn protection shields brand-new pieces from void deletion.
//! 7. Laser voids hold their descent and vanish on the floor.
//! 8. Spawn → entrance → drop of a tier-1 piece at the centre.
//! 9. A GRAVITY power-up applied on release reverts exactly on expiry.
//! 10. Danger-zone dwell resets on exit; a continuous overstay ends the game once.
//! 11. The garbage collector reclaims pieces far outside the container.
//! 12. Low-gravity flask: one bounce listener, pieces pushed apart.
//! 13. Side walls stop a void piece sideways; laser voids stay on their descent.
//! 14. Pieces already claimed by a merge are out of a void piece's reach.
//! 15. A release during the entrance slide leaves the piece held.
//! 16. Deselecting a previewed power-up restores tier, collider and height.
//! 17. A kept preview bump drops with the boosted tier's material and reverts to it.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use flask_merge::arena::{ArenaBounds, Boundary};
use flask_merge::danger::GameOver;
use flask_merge::flask::{CollisionListeners, FlaskId, SelectFlask, SpecialCollisionRule};
use flask_merge::menu::GameState;
use flask_merge::merge::MergeQueue;
use flask_merge::physics::WorldPhysics;
use flask_merge::piece::{
    live_collision_groups, protected_collision_groups, spawn_piece_in_world, CollisionRestore,
    Piece, PieceProfile, PieceRegistry, PieceRole, PieceSpawn, PieceVisual, TierPreview,
    VoidCharge, VoidStrength,
};
use flask_merge::powerup::{PowerUpId, PowerUpInventory, SelectPowerUp};
use flask_merge::scoring::ScoreBoard;
use flask_merge::simulation::{GameClock, GameplayPlugin};
use flask_merge::spawn::{DragCommand, SpawnController, SpawnPhase};
use flask_merge::tier::{radius_for, score_value, tier_profile, Tier};
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

#[derive(Resource, Default)]
struct GameOverCount(u32);

fn count_game_over(mut reader: MessageReader<GameOver>, mut count: ResMut<GameOverCount>) {
    count.0 += reader.read().count() as u32;
}

/// Headless app with the spawner halted, stepped once so the container exists.
fn board(step_ms: u64) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, GameplayPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
        step_ms,
    )));
    app.init_resource::<GameOverCount>();
    app.add_systems(Last, count_game_over);
    app.world_mut().resource_mut::<SpawnController>().halt();
    app.update();
    app
}

/// A dropped piece whose spawn and drop lie well in the past.
fn piece(app: &mut App, tier: u8, position: Vec2) -> Entity {
    let spawn = PieceSpawn::new(Tier::clamped(tier), position, -10.0);
    spawn_piece_in_world(app.world_mut(), spawn).expect("registry is ready")
}

fn make_void(app: &mut App, entity: Entity, strength: VoidStrength, budget: u32, descent: f32) {
    let charge = VoidCharge {
        source: PowerUpId::VoidBall,
        strength,
        remaining: budget,
        descent_speed: descent,
        exhausted_at: None,
    };
    *app.world_mut().get_mut::<PieceRole>(entity).unwrap() = PieceRole::Void(charge);
}

fn collide(app: &mut App, a: Entity, b: Entity) {
    app.world_mut().write_message(CollisionEvent::Started(
        a,
        b,
        CollisionEventFlags::empty(),
    ));
}

fn pieces(app: &mut App) -> Vec<(Entity, Piece, Vec2)> {
    let world = app.world_mut();
    let mut query = world.query::<(Entity, &Piece, &Transform)>();
    query
        .iter(world)
        .map(|(e, p, t)| (e, *p, t.translation.truncate()))
        .collect()
}

fn is_gone(app: &App, entity: Entity) -> bool {
    !app.world().resource::<PieceRegistry>().contains(entity)
        && app.world().get_entity(entity).is_err()
}

fn void_charge(app: &App, entity: Entity) -> VoidCharge {
    match app.world().get::<PieceRole>(entity) {
        Some(PieceRole::Void(charge)) => *charge,
        other => panic!("expected a void piece, got {other:?}"),
    }
}

fn wall(app: &mut App, side: Boundary) -> Entity {
    let world = app.world_mut();
    let mut walls = world.query::<(Entity, &Boundary)>();
    walls
        .iter(world)
        .find(|(_, b)| **b == side)
        .map(|(e, _)| e)
        .expect("arena spawns every wall")
}

/// Live spawner whose first held piece has `tier`, stepped into `Dragging`.
fn holding(step_ms: u64, tier: u8) -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, GameplayPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
        step_ms,
    )));
    app.world_mut().resource_mut::<SpawnController>().next_tier = Tier::clamped(tier);
    app.update();
    let held = app
        .world()
        .resource::<SpawnController>()
        .held
        .expect("first frame spawns a held piece");
    while app.world().resource::<SpawnController>().phase != SpawnPhase::Dragging {
        app.update();
    }
    (app, held)
}

fn ball_radius(app: &App, entity: Entity) -> f32 {
    app.world()
        .get::<Collider>(entity)
        .and_then(|c| c.as_ball().map(|b| b.radius()))
        .expect("pieces have ball colliders")
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

// ── Merging ───────────────────────────────────────────────────────────────────

#[test]
fn same_tier_pair_merges_at_midpoint() {
    let mut app = board(16);
    let a = piece(&mut app, 4, Vec2::new(-30.0, -300.0));
    let b = piece(&mut app, 4, Vec2::new(50.0, -260.0));

    collide(&mut app, a, b);
    app.update();

    assert!(is_gone(&app, a) && is_gone(&app, b), "parents must be removed");
    let remaining = pieces(&mut app);
    assert_eq!(remaining.len(), 1, "exactly one merged piece");
    let (merged, merged_piece, position) = remaining[0];
    assert_eq!(merged_piece.tier.get(), 5);
    assert_eq!(position, Vec2::new(10.0, -280.0));
    assert!(app.world().resource::<PieceRegistry>().contains(merged));
    assert_eq!(
        app.world().resource::<ScoreBoard>().score,
        u64::from(score_value(Tier::clamped(5)))
    );
}

#[test]
fn shared_piece_merges_exactly_once() {
    let mut app = board(16);
    let a = piece(&mut app, 2, Vec2::new(-40.0, -300.0));
    let b = piece(&mut app, 2, Vec2::new(0.0, -300.0));
    let c = piece(&mut app, 2, Vec2::new(40.0, -300.0));

    collide(&mut app, a, b);
    collide(&mut app, b, c);
    app.update();

    assert!(is_gone(&app, a));
    assert!(is_gone(&app, b));
    assert!(!is_gone(&app, c), "C waits for a later step");

    let all = pieces(&mut app);
    assert_eq!(all.len(), 2);
    assert_eq!(all.iter().filter(|(_, p, _)| p.tier.get() == 3).count(), 1);
    let (_, c_piece, _) = all.iter().find(|(e, _, _)| *e == c).copied().unwrap();
    assert_eq!(c_piece.tier.get(), 2);
    assert!(app.world().resource::<MergeQueue>().is_empty());
}

#[test]
fn max_tier_pair_stays_capped() {
    let mut app = board(16);
    let a = piece(&mut app, 12, Vec2::new(-100.0, -200.0));
    let b = piece(&mut app, 12, Vec2::new(100.0, -200.0));

    // Classification never queues max-tier pairs.
    collide(&mut app, a, b);
    app.update();
    assert!(!is_gone(&app, a) && !is_gone(&app, b));

    app.world_mut().resource_mut::<MergeQueue>().push(a, b);
    app.update();

    let all = pieces(&mut app);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].1.tier, Tier::MAX);
}

#[test]
fn merged_piece_regains_collisions_after_delay() {
    let mut app = board(16);
    let a = piece(&mut app, 1, Vec2::new(-10.0, -300.0));
    let b = piece(&mut app, 1, Vec2::new(10.0, -300.0));
    collide(&mut app, a, b);
    app.update();

    let merged = pieces(&mut app)[0].0;
    assert_eq!(
        *app.world().get::<CollisionGroups>(merged).unwrap(),
        protected_collision_groups()
    );
    assert!(app.world().get::<CollisionRestore>(merged).is_some());

    run(&mut app, 6);
    assert_eq!(
        *app.world().get::<CollisionGroups>(merged).unwrap(),
        live_collision_groups()
    );
    assert!(app.world().get::<CollisionRestore>(merged).is_none());
}

// ── Void pieces ───────────────────────────────────────────────────────────────

#[test]
fn void_budget_of_two_deletes_two_then_retires() {
    let mut app = board(16);
    let void = piece(&mut app, 3, Vec2::new(0.0, -100.0));
    make_void(&mut app, void, VoidStrength::Basic, 2, 0.0);
    let first = piece(&mut app, 1, Vec2::new(0.0, -150.0));
    let second = piece(&mut app, 3, Vec2::new(0.0, -250.0));

    collide(&mut app, void, first);
    app.update();
    assert!(is_gone(&app, first));
    assert_eq!(void_charge(&app, void).remaining, 1);

    collide(&mut app, second, void);
    app.update();
    assert!(is_gone(&app, second));
    let charge = void_charge(&app, void);
    assert_eq!(charge.remaining, 0);
    assert!(charge.exhausted_at.is_some());
    assert!(!is_gone(&app, void), "void lingers for its grace delay");

    // 0.3 s grace at 16 ms per frame.
    run(&mut app, 25);
    assert!(is_gone(&app, void));
}

#[test]
fn fresh_pieces_are_protected_from_voids() {
    let mut app = board(16);
    let void = piece(&mut app, 2, Vec2::new(0.0, -100.0));
    make_void(&mut app, void, VoidStrength::Basic, 2, 0.0);
    let now = app.world().resource::<GameClock>().now();
    let fresh = spawn_piece_in_world(
        app.world_mut(),
        PieceSpawn::new(Tier::clamped(5), Vec2::new(0.0, -200.0), now),
    )
    .unwrap();

    collide(&mut app, void, fresh);
    app.update();
    assert!(!is_gone(&app, fresh));
    assert_eq!(void_charge(&app, void).remaining, 2);
}

#[test]
fn laser_void_holds_descent_and_dies_on_the_floor() {
    let mut app = board(16);
    let void = piece(&mut app, 2, Vec2::new(0.0, 0.0));
    make_void(&mut app, void, VoidStrength::Ultra, 7, 650.0);
    app.world_mut().get_mut::<Velocity>(void).unwrap().linvel = Vec2::new(80.0, 30.0);

    app.update();
    assert_eq!(
        app.world().get::<Velocity>(void).unwrap().linvel,
        Vec2::new(0.0, -650.0)
    );

    let floor = wall(&mut app, Boundary::Floor);
    collide(&mut app, floor, void);
    app.update();
    assert!(is_gone(&app, void));
}

#[test]
fn side_walls_stop_voids_sideways() {
    let mut app = board(16);
    let left = wall(&mut app, Boundary::Left);
    let right = wall(&mut app, Boundary::Right);

    let basic = piece(&mut app, 2, Vec2::new(-250.0, 0.0));
    make_void(&mut app, basic, VoidStrength::Basic, 2, 0.0);
    app.world_mut().get_mut::<Velocity>(basic).unwrap().linvel = Vec2::new(-80.0, -30.0);

    let laser = piece(&mut app, 2, Vec2::new(250.0, 0.0));
    make_void(&mut app, laser, VoidStrength::Super, 4, 420.0);
    app.world_mut().get_mut::<Velocity>(laser).unwrap().linvel = Vec2::new(60.0, 15.0);

    collide(&mut app, left, basic);
    collide(&mut app, laser, right);
    app.update();

    assert_eq!(
        app.world().get::<Velocity>(basic).unwrap().linvel,
        Vec2::new(0.0, -30.0),
        "basic voids keep their vertical motion"
    );
    assert_eq!(
        app.world().get::<Velocity>(laser).unwrap().linvel,
        Vec2::new(0.0, -420.0)
    );
    assert!(!is_gone(&app, basic) && !is_gone(&app, laser));
    assert_eq!(void_charge(&app, basic).remaining, 2);
    assert_eq!(void_charge(&app, laser).remaining, 4);
}

#[test]
fn merging_pieces_are_not_void_victims() {
    let mut app = board(16);
    let void = piece(&mut app, 2, Vec2::new(0.0, -100.0));
    make_void(&mut app, void, VoidStrength::Basic, 2, 0.0);
    let claimed = piece(&mut app, 4, Vec2::new(0.0, -150.0));
    *app.world_mut().get_mut::<PieceRole>(claimed).unwrap() = PieceRole::Merging;

    collide(&mut app, void, claimed);
    app.update();

    assert!(!is_gone(&app, claimed));
    assert_eq!(void_charge(&app, void).remaining, 2);
    assert_eq!(void_charge(&app, void).exhausted_at, None);
}

// ── Spawn & drop ──────────────────────────────────────────────────────────────

#[test]
fn spawned_piece_drops_at_centre_and_keeps_its_tier() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, GameplayPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app.world_mut().resource_mut::<SpawnController>().next_tier = Tier::MIN;
    app.update();

    let held = app
        .world()
        .resource::<SpawnController>()
        .held
        .expect("first frame spawns a held piece");
    assert!(!app.world().get::<Piece>(held).unwrap().is_dropped());

    // Drag requests during the entrance slide are ignored.
    app.world_mut()
        .write_message(DragCommand::Move { x: 120.0 });
    app.update();
    assert_eq!(app.world().get::<Transform>(held).unwrap().translation.x, 0.0);

    run(&mut app, 20);
    assert_eq!(
        app.world().resource::<SpawnController>().phase,
        SpawnPhase::Dragging
    );

    app.world_mut()
        .write_message(DragCommand::Release { x: 0.0 });
    app.update();

    let piece = *app.world().get::<Piece>(held).unwrap();
    assert!(piece.is_dropped());
    assert_eq!(piece.tier, Tier::MIN);
    assert_eq!(*app.world().get::<RigidBody>(held).unwrap(), RigidBody::Dynamic);
    assert_eq!(
        *app.world().get::<CollisionGroups>(held).unwrap(),
        live_collision_groups()
    );
    assert!(app.world().get::<Velocity>(held).unwrap().linvel.y < 0.0);

    let controller = app.world().resource::<SpawnController>();
    assert_eq!(controller.held, None);
    assert!(matches!(controller.phase, SpawnPhase::Idle { .. }));
}

#[test]
fn gravity_power_up_reverts_to_exact_tier_defaults() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, GameplayPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app.world_mut().resource_mut::<SpawnController>().next_tier = Tier::clamped(4);
    app.update();
    let held = app.world().resource::<SpawnController>().held.unwrap();
    run(&mut app, 4);

    app.world_mut()
        .write_message(SelectPowerUp(Some(PowerUpId::Heavy)));
    app.update();
    app.world_mut()
        .write_message(DragCommand::Release { x: 0.0 });
    app.update();

    assert!(matches!(
        app.world().get::<PieceRole>(held),
        Some(PieceRole::Boosted(_))
    ));
    assert_eq!(app.world().get::<PieceProfile>(held).unwrap().0.density, 3.0);
    assert_eq!(
        app.world()
            .resource::<PowerUpInventory>()
            .charges(PowerUpId::Heavy),
        0
    );

    // Heavy lasts 5 s.
    run(&mut app, 60);
    assert_eq!(app.world().get::<PieceRole>(held), Some(&PieceRole::Plain));
    assert_eq!(
        app.world().get::<PieceProfile>(held).unwrap().0,
        tier_profile(Tier::clamped(4))
    );
    assert_eq!(
        *app.world().get::<PieceVisual>(held).unwrap(),
        PieceVisual::default()
    );
    assert_eq!(
        app.world().get::<ExternalForce>(held).unwrap().force,
        Vec2::ZERO
    );
}

#[test]
fn release_during_entrance_is_ignored() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, GameplayPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app.update();
    let held = app.world().resource::<SpawnController>().held.unwrap();
    assert!(matches!(
        app.world().resource::<SpawnController>().phase,
        SpawnPhase::Previewing { .. }
    ));

    app.world_mut()
        .write_message(DragCommand::Release { x: 0.0 });
    app.update();

    assert!(!app.world().get::<Piece>(held).unwrap().is_dropped());
    assert_eq!(*app.world().get::<RigidBody>(held).unwrap(), RigidBody::Fixed);
    let controller = app.world().resource::<SpawnController>();
    assert_eq!(controller.held, Some(held));
    assert_eq!(controller.drops, 0);
}

#[test]
fn deselecting_preview_restores_the_held_piece() {
    let (mut app, held) = holding(16, 4);
    app.world_mut()
        .resource_mut::<PowerUpInventory>()
        .grant_level(2);
    let r4 = radius_for(Tier::clamped(4), 1.0);
    let r5 = radius_for(Tier::clamped(5), 1.0);

    app.world_mut()
        .write_message(SelectPowerUp(Some(PowerUpId::SuperHeavy)));
    app.update();

    let arena = *app.world().resource::<ArenaBounds>();
    assert_eq!(app.world().get::<Piece>(held).unwrap().tier.get(), 5);
    assert!(app.world().get::<TierPreview>(held).is_some());
    assert_eq!(ball_radius(&app, held), r5);
    assert_eq!(
        app.world().get::<Transform>(held).unwrap().translation.y,
        arena.preview_centre_y(r5)
    );
    assert!(app.world().get::<PieceVisual>(held).unwrap().stroke.is_some());

    app.world_mut().write_message(SelectPowerUp(None));
    app.update();

    assert_eq!(app.world().get::<Piece>(held).unwrap().tier.get(), 4);
    assert!(app.world().get::<TierPreview>(held).is_none());
    assert_eq!(ball_radius(&app, held), r4);
    assert_eq!(
        app.world().get::<Transform>(held).unwrap().translation.y,
        arena.preview_centre_y(r4)
    );
    assert_eq!(
        *app.world().get::<PieceVisual>(held).unwrap(),
        PieceVisual::default()
    );
    assert_eq!(
        app.world().get::<PieceProfile>(held).unwrap().0,
        tier_profile(Tier::clamped(4))
    );
    assert!(!app.world().get::<Piece>(held).unwrap().is_dropped());
}

#[test]
fn kept_preview_bump_uses_boosted_tier_material() {
    let (mut app, held) = holding(100, 4);
    app.world_mut()
        .resource_mut::<PowerUpInventory>()
        .grant_level(2);
    app.world_mut()
        .write_message(SelectPowerUp(Some(PowerUpId::SuperHeavy)));
    app.update();
    app.world_mut()
        .write_message(DragCommand::Release { x: 0.0 });
    app.update();

    let tier5 = tier_profile(Tier::clamped(5));
    assert_eq!(app.world().get::<Piece>(held).unwrap().tier.get(), 5);
    let boosted = app.world().get::<PieceProfile>(held).unwrap().0;
    assert_eq!(boosted.density, 6.0);
    assert_eq!(boosted.friction, tier5.friction);
    assert_eq!(boosted.air_friction, tier5.air_friction);
    assert_eq!(
        boosted.static_friction,
        tier5.static_friction.max(tier5.friction)
    );
    match app.world().get::<PieceRole>(held) {
        Some(PieceRole::Boosted(boost)) => assert_eq!(boost.profile, boosted),
        other => panic!("expected a boosted piece, got {other:?}"),
    }

    // Super Heavy lasts 7 s.
    run(&mut app, 80);
    assert_eq!(app.world().get::<PieceRole>(held), Some(&PieceRole::Plain));
    assert_eq!(app.world().get::<Piece>(held).unwrap().tier.get(), 5);
    assert_eq!(app.world().get::<PieceProfile>(held).unwrap().0, tier5);
}

// ── Danger zone ───────────────────────────────────────────────────────────────

#[test]
fn danger_dwell_resets_between_visits_and_fires_once() {
    let mut app = board(100);
    let in_band = Vec2::new(0.0, 360.0);
    let p = piece(&mut app, 3, in_band);

    // First visit: 2 s.
    run(&mut app, 20);
    app.world_mut().get_mut::<Transform>(p).unwrap().translation.y = 0.0;
    app.update();
    app.world_mut().get_mut::<Transform>(p).unwrap().translation.y = in_band.y;

    // Second visit: another 2 s.  4 s in the band overall, but never 3 s at once.
    run(&mut app, 20);
    assert_eq!(app.world().resource::<GameOverCount>().0, 0);
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::Playing
    );

    run(&mut app, 15);
    assert_eq!(app.world().resource::<GameOverCount>().0, 1);
    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::GameOver
    );

    run(&mut app, 10);
    assert_eq!(app.world().resource::<GameOverCount>().0, 1, "fires exactly once");
}

// ── Garbage collection ────────────────────────────────────────────────────────

#[test]
fn garbage_collector_reclaims_far_pieces() {
    let mut app = board(100);
    let far = piece(&mut app, 2, Vec2::new(2_000.0, 0.0));
    let near = piece(&mut app, 2, Vec2::new(0.0, -300.0));

    // 2 s sweep interval.
    run(&mut app, 25);
    assert!(is_gone(&app, far));
    assert!(!is_gone(&app, near));
}

// ── Flasks ────────────────────────────────────────────────────────────────────

#[test]
fn low_gravity_listener_is_never_duplicated() {
    let mut app = board(16);
    app.world_mut().write_message(SelectFlask(FlaskId::LowGravity));
    app.update();
    app.world_mut().write_message(SelectFlask(FlaskId::LowGravity));
    app.update();
    app.world_mut().write_message(SelectFlask(FlaskId::Bouncy));
    app.update();
    app.world_mut().write_message(SelectFlask(FlaskId::LowGravity));
    app.update();

    let listeners = app.world().resource::<CollisionListeners>();
    assert_eq!(listeners.len(), 1);
    assert!(listeners.contains(SpecialCollisionRule::LowGravityBounce));
    let gravity = app.world().resource::<WorldPhysics>().gravity;
    assert!((gravity.y - WorldPhysics::baseline().gravity.y * 0.25).abs() < 1e-3);

    let a = piece(&mut app, 1, Vec2::new(-10.0, -300.0));
    let b = piece(&mut app, 2, Vec2::new(10.0, -300.0));
    collide(&mut app, a, b);
    app.update();
    assert!(app.world().get::<Velocity>(a).unwrap().linvel.x < 0.0);
    assert!(app.world().get::<Velocity>(b).unwrap().linvel.x > 0.0);
}

#[test]
fn flask_switch_reapplies_material_to_plain_pieces() {
    let mut app = board(16);
    let p = piece(&mut app, 3, Vec2::new(0.0, -300.0));
    app.world_mut().write_message(SelectFlask(FlaskId::Sticky));
    app.update();
    assert_eq!(app.world().get::<PieceProfile>(p).unwrap().0.friction, 0.9);

    app.world_mut().write_message(SelectFlask(FlaskId::Standard));
    app.update();
    assert_eq!(
        app.world().get::<PieceProfile>(p).unwrap().0,
        tier_profile(Tier::clamped(3))
    );
}
