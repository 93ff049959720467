//! Flask (environment) modifiers: world-level physics presets.
//!
//! Exactly one flask is active.  Switching flask:
//!
//! 1. resets [`WorldPhysics`] to the baseline,
//! 2. deregisters the previous flask's special collision rule (if any),
//! 3. applies the new flask's gravity / time-scale overrides,
//! 4. registers the new flask's special collision rule (if any),
//! 5. re-applies the global friction / restitution to every plain piece.
//!
//! Rules live in [`CollisionListeners`], a set, so a rule can never be
//! registered twice and its effect never compounds.

use crate::physics::WorldPhysics;
use crate::piece::{Piece, PieceProfile, PieceRole};
use crate::tier::{tier_profile, PhysicalProfile, Tier};
use bevy::prelude::*;
use serde::Deserialize;

/// Identifier of a flask in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum FlaskId {
    #[default]
    Standard,
    LowGravity,
    HeavyGravity,
    SlowMotion,
    Bouncy,
    Sticky,
    Tiny,
}

impl FlaskId {
    pub const ALL: [FlaskId; 7] = [
        FlaskId::Standard,
        FlaskId::LowGravity,
        FlaskId::HeavyGravity,
        FlaskId::SlowMotion,
        FlaskId::Bouncy,
        FlaskId::Sticky,
        FlaskId::Tiny,
    ];

    /// Catalog entry for this id.
    pub fn flask(self) -> &'static Flask {
        &FLASKS[self as usize]
    }

    /// The id after this one, wrapping (keyboard cycling).
    pub fn cycled(self) -> FlaskId {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }
}

/// Extra collision behaviour a flask can install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialCollisionRule {
    /// Outward impulse plus jitter on every piece–piece contact.
    LowGravityBounce,
}

/// Immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flask {
    pub id: FlaskId,
    pub name: &'static str,
    pub description: &'static str,
    pub gravity_scale: f32,
    pub time_scale: f32,
    /// Global friction override for plain pieces.
    pub friction: Option<f32>,
    /// Global restitution override for plain pieces.
    pub restitution: Option<f32>,
    /// Size modifier for pieces spawned under this flask.
    pub size_scale: f32,
    pub special: Option<SpecialCollisionRule>,
}

const fn preset(id: FlaskId, name: &'static str, description: &'static str) -> Flask {
    Flask {
        id,
        name,
        description,
        gravity_scale: 1.0,
        time_scale: 1.0,
        friction: None,
        restitution: None,
        size_scale: 1.0,
        special: None,
    }
}

static FLASKS: [Flask; 7] = [
    preset(FlaskId::Standard, "Standard", "Ordinary gravity and materials"),
    Flask {
        gravity_scale: 0.25,
        special: Some(SpecialCollisionRule::LowGravityBounce),
        ..preset(FlaskId::LowGravity, "Low Gravity", "Floaty drops; contacts kick pieces apart")
    },
    Flask {
        gravity_scale: 1.8,
        ..preset(FlaskId::HeavyGravity, "Heavy Gravity", "Pieces slam down and pack tightly")
    },
    Flask {
        time_scale: 0.5,
        ..preset(FlaskId::SlowMotion, "Slow Motion", "The whole world runs at half speed")
    },
    Flask {
        restitution: Some(0.7),
        ..preset(FlaskId::Bouncy, "Bouncy", "Every piece is made of rubber")
    },
    Flask {
        friction: Some(0.9),
        ..preset(FlaskId::Sticky, "Sticky", "Pieces grip and refuse to roll")
    },
    Flask {
        size_scale: 0.8,
        ..preset(FlaskId::Tiny, "Tiny", "New pieces are shrunk by a fifth")
    },
];

impl Flask {
    #[inline]
    pub fn reduces_gravity(&self) -> bool {
        self.gravity_scale < 1.0
    }
}

/// Default physical profile of a tier under a flask.
///
/// With no global overrides this is exactly the tier profile.
pub fn default_profile(tier: Tier, flask: &Flask) -> PhysicalProfile {
    let mut profile = tier_profile(tier);
    if let Some(friction) = flask.friction {
        profile.friction = friction;
        profile.static_friction = profile.static_friction.max(friction);
    }
    if let Some(restitution) = flask.restitution {
        profile.restitution = restitution;
    }
    profile
}

// ── Resources & messages ──────────────────────────────────────────────────────

/// The flask currently in force.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveFlask {
    current: FlaskId,
}

impl ActiveFlask {
    #[inline]
    pub fn id(&self) -> FlaskId {
        self.current
    }

    #[inline]
    pub fn flask(&self) -> &'static Flask {
        self.current.flask()
    }
}

/// Special collision rules currently registered.
#[derive(Resource, Debug, Clone, Default)]
pub struct CollisionListeners {
    rules: Vec<SpecialCollisionRule>,
}

impl CollisionListeners {
    /// Register a rule.  Returns `false` if it was already registered.
    pub fn register(&mut self, rule: SpecialCollisionRule) -> bool {
        if self.rules.contains(&rule) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Deregister a rule.  Returns `false` if it was not registered.
    pub fn deregister(&mut self, rule: SpecialCollisionRule) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| *r != rule);
        self.rules.len() != before
    }

    #[inline]
    pub fn contains(&self, rule: SpecialCollisionRule) -> bool {
        self.rules.contains(&rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }
}

/// Request to switch the active flask.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectFlask(pub FlaskId);

// ── Switching ─────────────────────────────────────────────────────────────────

/// Make `id` the active flask, rewriting world constants and listeners.
pub fn switch_flask(
    active: &mut ActiveFlask,
    listeners: &mut CollisionListeners,
    world: &mut WorldPhysics,
    id: FlaskId,
) {
    *world = WorldPhysics::baseline();
    if let Some(rule) = active.flask().special {
        listeners.deregister(rule);
    }

    active.current = id;
    let flask = id.flask();
    world.gravity *= flask.gravity_scale;
    world.time_scale *= flask.time_scale;
    if let Some(rule) = flask.special {
        listeners.register(rule);
    }
}

/// Apply the latest [`SelectFlask`] request of this frame.
pub fn flask_switch_system(
    mut requests: MessageReader<SelectFlask>,
    mut active: ResMut<ActiveFlask>,
    mut listeners: ResMut<CollisionListeners>,
    mut world: ResMut<WorldPhysics>,
    mut pieces: Query<(&Piece, &PieceRole, &mut PieceProfile)>,
) {
    let Some(SelectFlask(id)) = requests.read().last().copied() else {
        return;
    };
    if id == active.id() {
        return;
    }

    switch_flask(&mut active, &mut listeners, &mut world, id);
    let flask = active.flask();
    for (piece, role, mut profile) in pieces.iter_mut() {
        if !matches!(role, PieceRole::Plain) {
            continue;
        }
        let wanted = default_profile(piece.tier, flask);
        if profile.0 != wanted {
            profile.0 = wanted;
        }
    }
    info!(
        "Flask switched to {} (gravity {:.0}, time scale {:.2})",
        flask.name,
        world.gravity.length(),
        world.time_scale
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_indexed_by_id() {
        for id in FlaskId::ALL {
            assert_eq!(id.flask().id, id);
        }
    }

    #[test]
    fn cycling_visits_every_flask() {
        let mut id = FlaskId::Standard;
        for _ in 0..FlaskId::ALL.len() {
            id = id.cycled();
        }
        assert_eq!(id, FlaskId::Standard);
    }

    #[test]
    fn standard_profile_matches_tier_defaults() {
        for t in 1..=12 {
            let tier = Tier::clamped(t);
            assert_eq!(
                default_profile(tier, FlaskId::Standard.flask()),
                tier_profile(tier)
            );
        }
    }

    #[test]
    fn switching_resets_world_before_applying() {
        let mut active = ActiveFlask::default();
        let mut listeners = CollisionListeners::default();
        let mut world = WorldPhysics::baseline();

        switch_flask(&mut active, &mut listeners, &mut world, FlaskId::HeavyGravity);
        switch_flask(&mut active, &mut listeners, &mut world, FlaskId::SlowMotion);

        assert_eq!(world.gravity, WorldPhysics::baseline().gravity);
        assert!((world.time_scale - 0.5).abs() < 1e-6);
    }

    #[test]
    fn low_gravity_rule_never_stacks() {
        let mut active = ActiveFlask::default();
        let mut listeners = CollisionListeners::default();
        let mut world = WorldPhysics::baseline();

        switch_flask(&mut active, &mut listeners, &mut world, FlaskId::LowGravity);
        switch_flask(&mut active, &mut listeners, &mut world, FlaskId::LowGravity);
        assert_eq!(listeners.len(), 1);

        switch_flask(&mut active, &mut listeners, &mut world, FlaskId::Bouncy);
        assert!(listeners.is_empty());

        switch_flask(&mut active, &mut listeners, &mut world, FlaskId::LowGravity);
        assert!(listeners.contains(SpecialCollisionRule::LowGravityBounce));
        assert_eq!(listeners.len(), 1);
        assert!(active.flask().reduces_gravity());
    }
}
