//! Flask Merge game core.
//!
//! Circular pieces of tiers 1–12 drop into a container, collide under Rapier,
//! and merge pairwise into the next tier.  Power-ups, flask environments, a
//! danger zone and an out-of-bounds sweep are layered on top.  The gameplay
//! core lives in [`simulation::GameplayPlugin`]; rendering and input are thin
//! layers added by the binary.

pub mod arena;
pub mod collision;
pub mod config;
pub mod constants;
pub mod danger;
pub mod debug;
pub mod error;
pub mod flask;
pub mod garbage;
pub mod graphics;
pub mod input;
pub mod menu;
pub mod merge;
pub mod physics;
pub mod piece;
pub mod piece_rendering;
pub mod powerup;
pub mod rendering;
pub mod scoring;
pub mod simulation;
pub mod spawn;
pub mod tier;
