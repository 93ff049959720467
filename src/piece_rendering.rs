//! Mesh2d rendering for pieces: a filled disc coloured by tier plus an
//! optional glow ring for power-up visuals.
//!
//! Meshes are attached on [`Added<Piece>`] and rebuilt only when the tier,
//! scale or [`PieceVisual`] changes (preview bumps, merges never change an
//! existing piece).  Despawning a piece drops its mesh and material handles
//! together with the ring child.

use crate::constants::GLOW_RING_WIDTH;
use crate::piece::{Piece, PieceVisual};
use crate::tier::Tier;
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};

/// Rim segments used for every disc and ring.
const SEGMENTS: usize = 48;

/// Render-side bookkeeping of a piece.
#[derive(Component, Debug, Clone)]
pub struct PieceGraphics {
    tier: Tier,
    radius: f32,
    material: Handle<ColorMaterial>,
    ring: Option<Entity>,
}

/// Fill colour per tier, small/cool to large/warm.
pub fn tier_color(tier: Tier) -> Color {
    const PALETTE: [(f32, f32, f32); 12] = [
        (0.36, 0.62, 0.95),
        (0.30, 0.80, 0.85),
        (0.35, 0.85, 0.55),
        (0.62, 0.88, 0.32),
        (0.92, 0.88, 0.30),
        (0.98, 0.72, 0.28),
        (0.97, 0.52, 0.26),
        (0.94, 0.34, 0.30),
        (0.90, 0.30, 0.55),
        (0.78, 0.34, 0.85),
        (0.58, 0.40, 0.92),
        (0.98, 0.96, 0.90),
    ];
    let (r, g, b) = PALETTE[usize::from(tier.get() - 1)];
    Color::srgb(r, g, b)
}

pub fn attach_piece_mesh_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    query: Query<(Entity, &Piece, &PieceVisual), Added<Piece>>,
) {
    for (entity, piece, visual) in query.iter() {
        let radius = piece.radius();
        let material = materials.add(ColorMaterial::from_color(tier_color(piece.tier)));
        let ring = spawn_ring(&mut commands, &mut meshes, &mut materials, entity, radius, visual);
        commands.entity(entity).insert((
            Mesh2d(meshes.add(disc_mesh(radius, SEGMENTS))),
            MeshMaterial2d(material.clone()),
            PieceGraphics {
                tier: piece.tier,
                radius,
                material,
                ring,
            },
        ));
    }
}

/// Rebuild the disc and ring of pieces whose tier, scale or visual changed.
#[allow(clippy::type_complexity)]
pub fn sync_piece_mesh_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<
        (Entity, &Piece, &PieceVisual, &mut PieceGraphics, &mut Mesh2d),
        Or<(Changed<Piece>, Changed<PieceVisual>)>,
    >,
) {
    for (entity, piece, visual, mut graphics, mut mesh) in query.iter_mut() {
        let radius = piece.radius();
        let resized = (radius - graphics.radius).abs() > f32::EPSILON;
        if resized {
            mesh.0 = meshes.add(disc_mesh(radius, SEGMENTS));
            graphics.radius = radius;
        }
        if graphics.tier != piece.tier {
            if let Some(material) = materials.get_mut(&graphics.material) {
                material.color = tier_color(piece.tier);
            }
            graphics.tier = piece.tier;
        }

        if let Some(ring) = graphics.ring.take() {
            if let Ok(mut ring_commands) = commands.get_entity(ring) {
                ring_commands.try_despawn();
            }
        }
        graphics.ring = spawn_ring(&mut commands, &mut meshes, &mut materials, entity, radius, visual);
    }
}

fn spawn_ring(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    parent: Entity,
    radius: f32,
    visual: &PieceVisual,
) -> Option<Entity> {
    let [r, g, b] = visual.stroke?;
    let width = GLOW_RING_WIDTH * (1.0 + visual.glow);
    let alpha = (0.55 + 0.3 * visual.glow).min(1.0);
    let ring = commands
        .spawn((
            Mesh2d(meshes.add(ring_mesh(radius + width * 0.5, width, SEGMENTS))),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(Color::srgba(r, g, b, alpha)))),
            Transform::from_translation(Vec3::new(0.0, 0.0, 0.05)),
            ChildOf(parent),
        ))
        .id();
    Some(ring)
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// Triangle-fan disc centred on the origin.
pub fn disc_mesh(radius: f32, segments: usize) -> Mesh {
    let n = segments.max(3);
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);
    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let (sin, cos) = angle.sin_cos();
        positions.push([radius * cos, radius * sin, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([0.5 + 0.5 * cos, 0.5 + 0.5 * sin]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        let v1 = i + 1;
        let v2 = (i + 1) % n as u32 + 1;
        indices.extend_from_slice(&[0, v1, v2]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Annulus of `width` centred on `radius`.
pub fn ring_mesh(radius: f32, width: f32, segments: usize) -> Mesh {
    let n = segments.max(3);
    let inner = (radius - width * 0.5).max(0.0);
    let outer = radius + width * 0.5;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n * 2);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n * 2);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n * 2);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let (sin, cos) = angle.sin_cos();
        let u = i as f32 / n as f32;
        positions.push([inner * cos, inner * sin, 0.0]);
        positions.push([outer * cos, outer * sin, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([u, 0.0]);
        uvs.push([u, 1.0]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 6);
    for i in 0..n as u32 {
        let a = 2 * i;
        let b = 2 * ((i + 1) % n as u32);
        indices.extend_from_slice(&[a, a + 1, b + 1, a, b + 1, b]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
