//! Centralised physics and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameplayConfig`] mirrors the runtime-tunable subset and
//! uses these values as its defaults.
//!
//! ## Coordinate system
//!
//! World units are pixels (`pixels_per_meter(1.0)`).  The origin sits at the
//! centre of the container; `+y` points up, so the floor is at
//! `-ARENA_HEIGHT / 2` and the danger band hangs below `+ARENA_HEIGHT / 2`.

// ── Tiers ─────────────────────────────────────────────────────────────────────

/// Highest tier a piece can reach.  Merging two max-tier pieces stays capped.
pub const MAX_TIER: u8 = 12;

/// Highest tier the spawner will hand the player as a "next piece".
pub const MAX_SPAWN_TIER: u8 = 5;

// ── Arena ─────────────────────────────────────────────────────────────────────

/// Inner width of the container (u).
pub const ARENA_WIDTH: f32 = 600.0;

/// Inner height of the container (u), floor to top edge of the danger band.
pub const ARENA_HEIGHT: f32 = 820.0;

/// Thickness of the two side walls and the floor (u).
pub const WALL_THICKNESS: f32 = 40.0;

// ── World physics ─────────────────────────────────────────────────────────────

/// Baseline downward gravity (u/s²) before any flask modifier is applied.
///
/// Rapier's default of 9.81 is tuned for metres; at one pixel per metre pieces
/// would float, so the baseline is scaled up to feel like a falling fruit.
pub const BASE_GRAVITY: f32 = 980.0;

/// Baseline physics time scale.
pub const BASE_TIME_SCALE: f32 = 1.0;

/// Lower bound of the solver iteration count mapped from the precision slider.
pub const MIN_SOLVER_ITERATIONS: usize = 2;

/// Upper bound of the solver iteration count mapped from the precision slider.
///
/// Above ~32 the per-step cost grows faster than the visible reduction in
/// interpenetration of deep stacks.
pub const MAX_SOLVER_ITERATIONS: usize = 32;

/// Initial precision slider position (0–100).
pub const DEFAULT_SOLVER_PRECISION: u8 = 40;

/// Curvature of the slider → iteration log curve.  Larger values spend more of
/// the slider travel on the low-iteration end.
pub const SOLVER_PRECISION_CURVE: f32 = 0.08;

// ── Spawn & drag ──────────────────────────────────────────────────────────────

/// Horizontal padding kept between a held piece and the side walls (u).
pub const SPAWN_PAD: f32 = 4.0;

/// Duration of the eased entrance slide (seconds).
pub const ENTRANCE_DURATION: f32 = 0.2;

/// Height above its preview position at which a new piece first appears (u).
pub const SPAWN_OFFSCREEN_HEIGHT: f32 = 120.0;

/// Height of the shared preview baseline above the container top (u).
///
/// Every held piece rests with its bottom edge on this line regardless of tier.
pub const PREVIEW_BASELINE_HEIGHT: f32 = 20.0;

/// Delay between a release and the next spawn (seconds).
pub const NEXT_SPAWN_DELAY: f32 = 0.45;

/// Initial downward speed given to a released piece at baseline gravity (u/s).
pub const BASE_DROP_SPEED: f32 = 180.0;

/// Extra drop-speed factor under a low-gravity flask so drops stay responsive.
pub const LOW_GRAVITY_DROP_MULTIPLIER: f32 = 6.0;

/// Below this speed (u/s) a dropped piece uses its static friction coefficient.
pub const SETTLE_SPEED: f32 = 12.0;

// ── Merging ───────────────────────────────────────────────────────────────────

/// Upward launch speed given to a freshly merged piece (u/s).
pub const MERGE_LAUNCH_SPEED: f32 = 90.0;

/// Launch multiplier when the active flask reduces gravity.
pub const MERGE_LOW_GRAVITY_LAUNCH_MULTIPLIER: f32 = 2.5;

/// Half-range of the random horizontal jitter on a merged piece (u/s).
pub const MERGE_JITTER: f32 = 25.0;

/// Seconds a merged piece ignores other pieces before full collisions resume.
pub const MERGE_COLLISION_DELAY: f32 = 0.05;

// ── Void pieces ───────────────────────────────────────────────────────────────

/// Seconds after creation during which a piece cannot be deleted by a void piece.
pub const VOID_SPAWN_PROTECTION: f32 = 0.15;

/// Seconds an exhausted void piece lingers before it is removed.
pub const VOID_GRACE_DELAY: f32 = 0.3;

/// Horizontal velocity factor applied to a basic void piece after a kill.
pub const VOID_REBOUND_DAMPING: f32 = 0.5;

/// Maximum rebound speed (u/s) of a basic void piece after a kill.
pub const VOID_REBOUND_CAP: f32 = 160.0;

// ── Low-gravity bounce ────────────────────────────────────────────────────────

/// Outward speed kick (u/s) given to each piece of a colliding pair.
pub const LOW_GRAVITY_BOUNCE_SPEED: f32 = 45.0;

/// Half-range of the random jitter added to the bounce kick (u/s).
pub const LOW_GRAVITY_JITTER: f32 = 12.0;

// ── Danger zone ───────────────────────────────────────────────────────────────

/// Height of the danger band measured down from the container top (u).
pub const DANGER_BAND_HEIGHT: f32 = 90.0;

/// Seconds after a drop during which a piece is ignored by the monitor.
pub const DANGER_GRACE_PERIOD: f32 = 1.5;

/// Continuous seconds a piece may stay in the band before the game ends.
pub const DANGER_DWELL_TIMEOUT: f32 = 3.0;

// ── Garbage collection ────────────────────────────────────────────────────────

/// Seconds between out-of-bounds sweeps.
pub const GC_INTERVAL: f32 = 2.0;

/// Distance outside the container (any side) beyond which a piece is reclaimed.
pub const GC_MARGIN: f32 = 400.0;

// ── Scoring ───────────────────────────────────────────────────────────────────

/// Seconds after a merge during which the next merge extends the combo.
pub const COMBO_WINDOW: f32 = 1.2;

/// Combo multiplier ceiling.
pub const MAX_COMBO: u32 = 8;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Font size of the HUD text.
pub const HUD_FONT_SIZE: f32 = 18.0;

/// Width of the glow ring drawn around power-up pieces (u).
pub const GLOW_RING_WIDTH: f32 = 4.0;
