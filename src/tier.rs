//! Tier table: the per-tier radius, physical profile and score value.
//!
//! Every piece carries a [`Tier`].  Two pieces of the same tier merge into one
//! piece of the next tier; the chain tops out at [`MAX_TIER`] and a max-tier
//! merge stays at the cap.
//!
//! | Tier | Radius | Density | Friction | Restitution | Points |
//! |------|--------|---------|----------|-------------|--------|
//! | 1    | 17     | 1.00    | 0.30     | 0.20        | 1      |
//! | 6    | 62     | 0.75    | 0.40     | 0.15        | 21     |
//! | 12   | 150    | 0.45    | 0.52     | 0.09        | 78     |

use crate::constants::{MAX_SPAWN_TIER, MAX_TIER};
use crate::error::{GameError, GameResult};
use rand::Rng;
use serde::Deserialize;

/// Integer rank of a piece, always within `1..=MAX_TIER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub struct Tier(u8);

impl Tier {
    pub const MIN: Tier = Tier(1);
    pub const MAX: Tier = Tier(MAX_TIER);

    /// Build a tier, clamping out-of-range input into `1..=MAX_TIER`.
    pub fn clamped(value: u8) -> Self {
        Tier(value.clamp(1, MAX_TIER))
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// The tier produced by merging two pieces of this tier (saturates at the cap).
    #[inline]
    pub fn next(self) -> Self {
        Tier((self.0 + 1).min(MAX_TIER))
    }

    #[inline]
    pub fn is_max(self) -> bool {
        self.0 >= MAX_TIER
    }

    /// Raise this tier by `levels`, saturating at the cap.
    pub fn boosted(self, levels: u8) -> Self {
        Tier(self.0.saturating_add(levels).min(MAX_TIER))
    }

    fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Tier {
    type Error = GameError;

    fn try_from(value: u8) -> GameResult<Self> {
        if (1..=MAX_TIER).contains(&value) {
            Ok(Tier(value))
        } else {
            Err(GameError::InvalidTier { value })
        }
    }
}

/// Physical properties handed to the collider of a piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalProfile {
    pub density: f32,
    /// Coulomb coefficient used while the piece is moving.
    pub friction: f32,
    /// Linear damping applied by the solver every step.
    pub air_friction: f32,
    pub restitution: f32,
    /// Coulomb coefficient used once the piece has settled.
    pub static_friction: f32,
}

// ── Tables ────────────────────────────────────────────────────────────────────

const BASE_RADII: [f32; MAX_TIER as usize] = [
    17.0, 24.0, 31.0, 40.0, 50.0, 62.0, 74.0, 86.0, 100.0, 114.0, 130.0, 150.0,
];

const SCORE_VALUES: [u32; MAX_TIER as usize] = [1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 66, 78];

/// Relative odds of each spawnable tier (index 0 = tier 1).
const SPAWN_WEIGHTS: [u32; MAX_SPAWN_TIER as usize] = [35, 28, 20, 11, 6];

/// Visual and collider radius of a tier at scale 1.0.
#[inline]
pub fn base_radius(tier: Tier) -> f32 {
    BASE_RADII[tier.index()]
}

/// Radius of a tier at the given size-modifier scale.
#[inline]
pub fn radius_for(tier: Tier, scale: f32) -> f32 {
    base_radius(tier) * scale
}

/// Points awarded when a merge produces this tier.
#[inline]
pub fn score_value(tier: Tier) -> u32 {
    SCORE_VALUES[tier.index()]
}

/// Tier-default physical profile.
///
/// Bigger pieces are lighter per unit area (so the stack does not crush small
/// pieces through the floor), slightly grippier and slightly less bouncy.
pub fn tier_profile(tier: Tier) -> PhysicalProfile {
    let t = tier.index() as f32;
    PhysicalProfile {
        density: 1.0 - t * 0.05,
        friction: 0.30 + t * 0.02,
        air_friction: 0.01,
        restitution: 0.20 - t * 0.01,
        static_friction: 0.50 + t * 0.02,
    }
}

/// Roll the tier for the next spawned piece.
pub fn roll_spawn_tier(rng: &mut impl Rng) -> Tier {
    let total: u32 = SPAWN_WEIGHTS.iter().sum();
    let mut pick = rng.gen_range(0..total);
    for (i, weight) in SPAWN_WEIGHTS.iter().enumerate() {
        if pick < *weight {
            return Tier::clamped(i as u8 + 1);
        }
        pick -= weight;
    }
    Tier::MIN
}

/// Tier pairs that may merge: same tier, both below the cap.
#[inline]
pub fn can_merge(a: Tier, b: Tier) -> bool {
    a == b && !a.is_max()
}

/// Tier produced by merging two pieces, or `None` when the tiers differ.
#[inline]
pub fn merged_tier(a: Tier, b: Tier) -> Option<Tier> {
    (a == b).then(|| a.next())
}
