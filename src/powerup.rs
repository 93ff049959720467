//! Power-up catalog, the player's inventory, and the timed effect systems.
//!
//! Two groups exist:
//!
//! - **GRAVITY** power-ups override the dropped piece's physical profile for a
//!   fixed duration.  [`power_up_expiry_system`] polls every tick and reverts
//!   the piece to its tier defaults once the duration has elapsed.
//! - **VOID** power-ups turn the dropped piece into a void piece with a
//!   deletion budget (see [`crate::collision`]).
//!
//! Power-ups are applied only at release time.  While a piece is still held,
//! selecting a power-up previews it (stroke, glow and possibly a tier bump)
//! without touching physics.  The preview revert and the expiry revert share
//! [`revert_piece`].

use crate::arena::ArenaBounds;
use crate::config::GameplayConfig;
use crate::flask::{default_profile, ActiveFlask, Flask};
use crate::piece::{
    ActiveBoost, Piece, PieceProfile, PieceRole, PieceVisual, TierPreview, VoidCharge,
    VoidStrength,
};
use crate::simulation::GameClock;
use crate::spawn::{SpawnController, SpawnPhase};
use crate::tier::{PhysicalProfile, Tier};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::f32::consts::PI;

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpId {
    Heavy,
    SuperHeavy,
    UltraHeavy,
    VoidBall,
    SuperVoid,
    UltraVoid,
}

impl PowerUpId {
    pub const ALL: [PowerUpId; 6] = [
        PowerUpId::Heavy,
        PowerUpId::SuperHeavy,
        PowerUpId::UltraHeavy,
        PowerUpId::VoidBall,
        PowerUpId::SuperVoid,
        PowerUpId::UltraVoid,
    ];

    pub fn power_up(self) -> &'static PowerUp {
        &POWER_UPS[self as usize]
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpGroup {
    Gravity,
    Void,
}

/// Physical overrides; `None` keeps the piece's current value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProfileOverride {
    pub density: Option<f32>,
    pub friction: Option<f32>,
    pub restitution: Option<f32>,
    pub air_friction: Option<f32>,
}

impl ProfileOverride {
    pub fn apply(&self, base: PhysicalProfile) -> PhysicalProfile {
        PhysicalProfile {
            density: self.density.unwrap_or(base.density),
            friction: self.friction.unwrap_or(base.friction),
            air_friction: self.air_friction.unwrap_or(base.air_friction),
            restitution: self.restitution.unwrap_or(base.restitution),
            static_friction: base
                .static_friction
                .max(self.friction.unwrap_or(base.friction)),
        }
    }
}

/// Effect parameters.  Fields irrelevant to a group are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    /// GRAVITY: seconds the override lasts.
    pub duration: f32,
    /// Multiplier on the initial drop speed.
    pub force_multiplier: f32,
    /// GRAVITY: extra downward acceleration (u/s²) while active.
    pub constant_acceleration: f32,
    /// VOID: pieces the void piece may delete.
    pub deletion_budget: u32,
    /// VOID: constant descent speed of sensor variants (u/s).
    pub initial_speed: f32,
    /// Tiers added to the held piece while previewing.
    pub preview_boost: u8,
}

/// Immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUp {
    pub id: PowerUpId,
    pub name: &'static str,
    pub group: PowerUpGroup,
    /// Rarity level 1..=3.
    pub level: u8,
    pub physics: ProfileOverride,
    pub visual: PieceVisual,
    pub effect: EffectParams,
}

const NO_EFFECT: EffectParams = EffectParams {
    duration: 0.0,
    force_multiplier: 1.0,
    constant_acceleration: 0.0,
    deletion_budget: 0,
    initial_speed: 0.0,
    preview_boost: 0,
};

const fn heavy(id: PowerUpId, name: &'static str, level: u8, density: f32) -> PowerUp {
    PowerUp {
        id,
        name,
        group: PowerUpGroup::Gravity,
        level,
        physics: ProfileOverride {
            density: Some(density),
            friction: None,
            restitution: Some(0.05),
            air_friction: None,
        },
        visual: PieceVisual {
            stroke: Some([0.95, 0.65, 0.15]),
            glow: 0.4 * level as f32,
        },
        effect: NO_EFFECT,
    }
}

const fn void(id: PowerUpId, name: &'static str, level: u8, budget: u32) -> PowerUp {
    PowerUp {
        id,
        name,
        group: PowerUpGroup::Void,
        level,
        physics: ProfileOverride {
            density: Some(2.0),
            friction: Some(0.0),
            restitution: Some(0.3),
            air_friction: Some(0.0),
        },
        visual: PieceVisual {
            stroke: Some([0.55, 0.2, 0.85]),
            glow: 0.5 * level as f32,
        },
        effect: EffectParams {
            deletion_budget: budget,
            ..NO_EFFECT
        },
    }
}

static POWER_UPS: [PowerUp; 6] = [
    PowerUp {
        effect: EffectParams {
            duration: 5.0,
            force_multiplier: 1.5,
            ..NO_EFFECT
        },
        ..heavy(PowerUpId::Heavy, "Heavy", 1, 3.0)
    },
    PowerUp {
        effect: EffectParams {
            duration: 7.0,
            force_multiplier: 2.0,
            constant_acceleration: 600.0,
            preview_boost: 1,
            ..NO_EFFECT
        },
        ..heavy(PowerUpId::SuperHeavy, "Super Heavy", 2, 6.0)
    },
    PowerUp {
        effect: EffectParams {
            duration: 9.0,
            force_multiplier: 2.5,
            constant_acceleration: 1_200.0,
            preview_boost: 2,
            ..NO_EFFECT
        },
        ..heavy(PowerUpId::UltraHeavy, "Ultra Heavy", 3, 10.0)
    },
    void(PowerUpId::VoidBall, "Void", 1, 2),
    PowerUp {
        effect: EffectParams {
            deletion_budget: 4,
            initial_speed: 420.0,
            ..NO_EFFECT
        },
        ..void(PowerUpId::SuperVoid, "Super Void", 2, 4)
    },
    PowerUp {
        effect: EffectParams {
            deletion_budget: 7,
            initial_speed: 650.0,
            ..NO_EFFECT
        },
        ..void(PowerUpId::UltraVoid, "Ultra Void", 3, 7)
    },
];

impl PowerUp {
    pub fn void_strength(&self) -> VoidStrength {
        match self.level {
            0 | 1 => VoidStrength::Basic,
            2 => VoidStrength::Super,
            _ => VoidStrength::Ultra,
        }
    }
}

// ── Application ───────────────────────────────────────────────────────────────

/// Everything a release-time application changes on the piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpApplication {
    pub role: PieceRole,
    pub profile: PhysicalProfile,
    pub visual: PieceVisual,
    /// Downward force to hold while the role lasts.
    pub constant_force: f32,
    /// Sensor variants pass through pieces and ignore gravity.
    pub sensor: bool,
}

/// Compute the effect of `power_up` on a piece that is being released.
pub fn apply_power_up(
    power_up: &PowerUp,
    piece: &Piece,
    base: PhysicalProfile,
    now: f32,
) -> PowerUpApplication {
    let profile = power_up.physics.apply(base);
    match power_up.group {
        PowerUpGroup::Gravity => {
            let radius = piece.radius();
            let mass = profile.density * PI * radius * radius;
            let constant_force = power_up.effect.constant_acceleration * mass;
            PowerUpApplication {
                role: PieceRole::Boosted(ActiveBoost {
                    source: power_up.id,
                    activated_at: now,
                    duration: power_up.effect.duration,
                    profile,
                    constant_force,
                }),
                profile,
                visual: power_up.visual,
                constant_force,
                sensor: false,
            }
        }
        PowerUpGroup::Void => {
            let strength = power_up.void_strength();
            let charge = VoidCharge {
                source: power_up.id,
                strength,
                remaining: power_up.effect.deletion_budget,
                descent_speed: power_up.effect.initial_speed,
                exhausted_at: None,
            };
            PowerUpApplication {
                role: PieceRole::Void(charge),
                profile,
                visual: power_up.visual,
                constant_force: 0.0,
                sensor: charge.is_laser(),
            }
        }
    }
}

/// Return a piece to its plain tier defaults under `flask`.
///
/// `restore_tier` undoes a preview tier bump.  The piece's independent size
/// scale is left untouched.  Returns `true` when the radius changed and the
/// caller must rebuild the collider.
pub fn revert_piece(
    piece: &mut Piece,
    role: &mut PieceRole,
    profile: &mut PieceProfile,
    visual: &mut PieceVisual,
    restore_tier: Option<Tier>,
    flask: &Flask,
) -> bool {
    let old_radius = piece.radius();
    if let Some(tier) = restore_tier {
        piece.tier = tier;
    }
    *role = PieceRole::Plain;
    profile.0 = default_profile(piece.tier, flask);
    *visual = PieceVisual::default();
    (piece.radius() - old_radius).abs() > f32::EPSILON
}

// ── Inventory ─────────────────────────────────────────────────────────────────

/// Remaining charges per power-up plus the player's selection.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct PowerUpInventory {
    charges: [u32; 6],
    selected: Option<PowerUpId>,
}

impl Default for PowerUpInventory {
    fn default() -> Self {
        let mut inventory = Self {
            charges: [0; 6],
            selected: None,
        };
        inventory.grant_level(1);
        inventory
    }
}

impl PowerUpInventory {
    pub fn charges(&self, id: PowerUpId) -> u32 {
        self.charges[id.index()]
    }

    pub fn selected(&self) -> Option<PowerUpId> {
        self.selected
    }

    /// Select a power-up.  Selecting one without charges clears the selection.
    pub fn select(&mut self, id: Option<PowerUpId>) {
        self.selected = id.filter(|id| self.charges(*id) > 0);
    }

    /// The power-up that will apply at the next release, if any.
    pub fn active(&self) -> Option<&'static PowerUp> {
        self.selected
            .filter(|id| self.charges(*id) > 0)
            .map(PowerUpId::power_up)
    }

    /// Spend one charge.  Clears the selection when it runs out.
    pub fn consume(&mut self, id: PowerUpId) -> bool {
        let slot = &mut self.charges[id.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        if *slot == 0 && self.selected == Some(id) {
            self.selected = None;
        }
        true
    }

    /// One extra charge of every power-up at `level`.
    pub fn grant_level(&mut self, level: u8) {
        for id in PowerUpId::ALL {
            if id.power_up().level == level {
                self.charges[id.index()] += 1;
            }
        }
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// A charge was spent on a release.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpConsumed {
    pub id: PowerUpId,
}

/// A merge crossed a milestone tier; one charge per power-up of `level`.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUpEarned {
    pub level: u8,
}

/// Player selection change (`None` deselects).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectPowerUp(pub Option<PowerUpId>);

// ── Systems ───────────────────────────────────────────────────────────────────

pub fn select_power_up_system(
    mut requests: MessageReader<SelectPowerUp>,
    mut inventory: ResMut<PowerUpInventory>,
) {
    for SelectPowerUp(id) in requests.read() {
        inventory.select(*id);
        debug!("Power-up selection: {:?}", inventory.selected());
    }
}

pub fn earn_power_up_system(
    mut earned: MessageReader<PowerUpEarned>,
    mut inventory: ResMut<PowerUpInventory>,
) {
    for PowerUpEarned { level } in earned.read() {
        inventory.grant_level(*level);
        info!("Power-up earned: level {level}");
    }
}

/// Revert expired GRAVITY boosts to the tier defaults.
pub fn power_up_expiry_system(
    clock: Res<GameClock>,
    flask: Res<ActiveFlask>,
    mut query: Query<(
        &mut Piece,
        &mut PieceRole,
        &mut PieceProfile,
        &mut PieceVisual,
        &mut ExternalForce,
    )>,
) {
    let now = clock.now();
    for (mut piece, mut role, mut profile, mut visual, mut force) in query.iter_mut() {
        let PieceRole::Boosted(boost) = *role else {
            continue;
        };
        if !piece.is_dropped() || !boost.is_expired(now) {
            continue;
        }
        revert_piece(
            &mut piece,
            &mut role,
            &mut profile,
            &mut visual,
            None,
            flask.flask(),
        );
        force.force = Vec2::ZERO;
        debug!("{:?} expired on a tier {} piece", boost.source, piece.tier);
    }
}

/// Keep the held piece's preview in step with the current selection.
#[allow(clippy::type_complexity)]
pub fn power_up_preview_system(
    mut commands: Commands,
    controller: Res<SpawnController>,
    inventory: Res<PowerUpInventory>,
    flask: Res<ActiveFlask>,
    arena: Res<ArenaBounds>,
    config: Res<GameplayConfig>,
    mut query: Query<(
        &mut Piece,
        &mut PieceRole,
        &mut PieceProfile,
        &mut PieceVisual,
        &mut Collider,
        &mut Transform,
        Option<&TierPreview>,
    )>,
) {
    if !matches!(controller.phase, SpawnPhase::Dragging) {
        return;
    }
    let Some(held) = controller.held else {
        return;
    };
    let Ok((mut piece, mut role, mut profile, mut visual, mut collider, mut transform, preview)) =
        query.get_mut(held)
    else {
        return;
    };

    let wanted = inventory.active();
    let current = preview.map(|p| p.source);
    if wanted.map(|p| p.id) == current {
        return;
    }

    let mut original = piece.tier;
    if let Some(preview) = preview {
        original = preview.original;
        revert_piece(
            &mut piece,
            &mut role,
            &mut profile,
            &mut visual,
            Some(preview.original),
            flask.flask(),
        );
        commands.entity(held).remove::<TierPreview>();
    }
    if let Some(power_up) = wanted {
        piece.tier = original.boosted(power_up.effect.preview_boost);
        *visual = power_up.visual;
        commands.entity(held).insert(TierPreview {
            original,
            source: power_up.id,
        });
    }

    let radius = piece.radius();
    *collider = Collider::ball(radius);
    transform.translation.x = arena.clamp_drag_x(transform.translation.x, radius, config.spawn_pad);
    transform.translation.y = arena.preview_centre_y(radius);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flask::FlaskId;
    use crate::tier::tier_profile;

    fn dropped(tier: u8) -> Piece {
        Piece {
            tier: Tier::clamped(tier),
            scale: 1.0,
            spawned_at: 0.0,
            dropped_at: Some(0.0),
        }
    }

    #[test]
    fn catalog_is_indexed_by_id() {
        for id in PowerUpId::ALL {
            assert_eq!(id.power_up().id, id);
        }
    }

    #[test]
    fn void_budgets_match_levels() {
        assert_eq!(PowerUpId::VoidBall.power_up().effect.deletion_budget, 2);
        assert_eq!(
            PowerUpId::SuperVoid.power_up().void_strength(),
            VoidStrength::Super
        );
        assert_eq!(
            PowerUpId::UltraVoid.power_up().void_strength(),
            VoidStrength::Ultra
        );
    }

    #[test]
    fn inventory_starts_with_level_one_charges() {
        let inv = PowerUpInventory::default();
        assert_eq!(inv.charges(PowerUpId::Heavy), 1);
        assert_eq!(inv.charges(PowerUpId::VoidBall), 1);
        assert_eq!(inv.charges(PowerUpId::SuperHeavy), 0);
        assert!(inv.active().is_none());
    }

    #[test]
    fn consuming_last_charge_clears_selection() {
        let mut inv = PowerUpInventory::default();
        inv.select(Some(PowerUpId::Heavy));
        assert_eq!(inv.active().map(|p| p.id), Some(PowerUpId::Heavy));
        assert!(inv.consume(PowerUpId::Heavy));
        assert!(inv.active().is_none());
        assert!(!inv.consume(PowerUpId::Heavy));

        inv.select(Some(PowerUpId::SuperVoid));
        assert_eq!(inv.selected(), None);
        inv.grant_level(2);
        inv.select(Some(PowerUpId::SuperVoid));
        assert_eq!(inv.selected(), Some(PowerUpId::SuperVoid));
    }

    #[test]
    fn gravity_application_then_revert_restores_defaults_exactly() {
        let flask = FlaskId::Standard.flask();
        let mut piece = dropped(4);
        let base = default_profile(piece.tier, flask);
        let applied = apply_power_up(PowerUpId::UltraHeavy.power_up(), &piece, base, 1.0);

        assert!(matches!(applied.role, PieceRole::Boosted(_)));
        assert_ne!(applied.profile, base);
        assert!(applied.constant_force > 0.0);

        let mut role = applied.role;
        let mut profile = PieceProfile(applied.profile);
        let mut visual = applied.visual;
        let resized = revert_piece(&mut piece, &mut role, &mut profile, &mut visual, None, flask);

        assert!(!resized);
        assert_eq!(role, PieceRole::Plain);
        assert_eq!(profile.0, tier_profile(piece.tier));
        assert_eq!(visual, PieceVisual::default());
    }

    #[test]
    fn laser_voids_are_sensors() {
        let piece = dropped(2);
        let base = tier_profile(piece.tier);
        let basic = apply_power_up(PowerUpId::VoidBall.power_up(), &piece, base, 0.0);
        let ultra = apply_power_up(PowerUpId::UltraVoid.power_up(), &piece, base, 0.0);
        assert!(!basic.sensor);
        assert!(ultra.sensor);
        match ultra.role {
            PieceRole::Void(charge) => {
                assert_eq!(charge.remaining, 7);
                assert_eq!(charge.descent_speed, 650.0);
            }
            other => panic!("expected a void role, got {other:?}"),
        }
    }

    #[test]
    fn preview_revert_restores_tier_and_radius() {
        let flask = FlaskId::Tiny.flask();
        let mut piece = Piece {
            scale: 0.8,
            ..dropped(3)
        };
        piece.tier = Tier::clamped(5);
        let mut role = PieceRole::Plain;
        let mut profile = PieceProfile(tier_profile(piece.tier));
        let mut visual = PowerUpId::SuperHeavy.power_up().visual;

        let resized = revert_piece(
            &mut piece,
            &mut role,
            &mut profile,
            &mut visual,
            Some(Tier::clamped(3)),
            flask,
        );
        assert!(resized);
        assert_eq!(piece.tier.get(), 3);
        assert_eq!(piece.scale, 0.8);
        assert_eq!(profile.0, default_profile(Tier::clamped(3), flask));
    }
}
