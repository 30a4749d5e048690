use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, SQRT_2};

use crate::AssetError;
use crate::mesh::MeshData;
use crate::triangulate::{Cap, CapVertex, fill, orient_contours};
use crate::typeface::Typeface;

/// Extruded text settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextParams {
    /// Glyph em size in scene units.
    pub size: f32,
    /// Extrusion depth along +Z.
    pub depth: f32,
    /// Points per outline curve.
    pub curve_segments: u32,
    /// Subdivisions of the extruded side walls.
    pub steps: u32,
    pub bevel_enabled: bool,
    /// How far the bevel extends past the front and back faces.
    pub bevel_thickness: f32,
    /// How far the bevel extends outward from the outline.
    pub bevel_size: f32,
    /// Outline offset where the bevel starts.
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
            steps: 1,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 4,
        }
    }
}

/// One cross-section of the extrusion: outline pushed outward by `inset`
/// along the bevel vectors, placed at height `z`.
#[derive(Debug, Clone, Copy)]
struct Layer {
    inset: f32,
    z: f32,
}

impl TextParams {
    /// Cross-sections from back to front: back bevel, side wall, front bevel.
    fn layers(&self) -> Vec<Layer> {
        let steps = self.steps.max(1);
        let (thickness, size, offset, segments) = if self.bevel_enabled {
            (
                self.bevel_thickness,
                self.bevel_size,
                self.bevel_offset,
                self.bevel_segments,
            )
        } else {
            (0.0, 0.0, 0.0, 0)
        };
        let bevel = |b: u32| {
            let t = b as f32 / segments as f32 * FRAC_PI_2;
            (thickness * t.cos(), size * t.sin() + offset)
        };

        let mut layers = Vec::new();
        for b in 0..segments {
            let (z, inset) = bevel(b);
            layers.push(Layer { inset, z: -z });
        }
        for s in 0..=steps {
            layers.push(Layer {
                inset: size + offset,
                z: self.depth * s as f32 / steps as f32,
            });
        }
        for b in (0..segments).rev() {
            let (z, inset) = bevel(b);
            layers.push(Layer {
                inset,
                z: self.depth + z,
            });
        }
        layers
    }
}

/// Build a centred, extruded text mesh.
///
/// The mesh is named `text:<text>`; text with no drawable glyphs yields an
/// empty mesh.
pub fn text_mesh(face: &Typeface, text: &str, params: &TextParams) -> Result<MeshData, AssetError> {
    let contours = orient_contours(face.layout(text, params.size, params.curve_segments)?);
    let cap = fill(&contours)?;
    let layers = params.layers();

    let mut mesh = MeshData::new(format!("text:{text}"));
    extrude(&mut mesh, &contours, &cap, &layers);
    mesh.center();
    mesh.validate()?;
    tracing::debug!(
        contours = contours.len(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "built text mesh for {text:?}"
    );
    Ok(mesh)
}

fn extrude(mesh: &mut MeshData, contours: &[Vec<Vec2>], cap: &Cap, layers: &[Layer]) {
    let (Some(back), Some(front)) = (layers.first(), layers.last()) else {
        return;
    };
    let verts: Vec<Vec2> = contours.concat();
    let moves: Vec<Vec2> = contours.iter().flat_map(|c| bevel_vectors(c)).collect();
    let at = |layer: &Layer, i: usize| {
        let p = verts[i] + moves[i] * layer.inset;
        Vec3::new(p.x, p.y, layer.z)
    };
    let cap_at = |layer: &Layer, v: &CapVertex| {
        let p = v.position + moves[v.from].lerp(moves[v.to], v.t) * layer.inset;
        Vec3::new(p.x, p.y, layer.z)
    };

    // Caps
    let base = mesh.vertex_count() as u32;
    for v in &cap.vertices {
        mesh.push_vertex(cap_at(back, v), Vec3::NEG_Z);
    }
    for t in &cap.triangles {
        mesh.push_triangle(base + t[0], base + t[2], base + t[1]);
    }
    let base = mesh.vertex_count() as u32;
    for v in &cap.vertices {
        mesh.push_vertex(cap_at(front, v), Vec3::Z);
    }
    for t in &cap.triangles {
        mesh.push_triangle(base + t[0], base + t[1], base + t[2]);
    }

    // Side walls, one flat-shaded quad per edge per layer gap.
    let mut start = 0;
    for contour in contours {
        let n = contour.len();
        for pair in layers.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            for k in 0..n {
                let i = start + k;
                let j = start + (k + 1) % n;
                let (a0, b0, b1, a1) = (at(lo, i), at(lo, j), at(hi, j), at(hi, i));
                let edge = verts[j] - verts[i];
                let normal = (b1 - a0)
                    .cross(a1 - b0)
                    .try_normalize()
                    .unwrap_or_else(|| Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero());
                let v0 = mesh.push_vertex(a0, normal);
                let v1 = mesh.push_vertex(b0, normal);
                let v2 = mesh.push_vertex(b1, normal);
                let v3 = mesh.push_vertex(a1, normal);
                mesh.push_triangle(v0, v1, v2);
                mesh.push_triangle(v0, v2, v3);
            }
        }
        start += n;
    }
}

/// Per-vertex outward offset directions for a ring.
///
/// Offsetting every vertex by `dir * d` moves each edge outward by `d`
/// (right-hand side of travel, which is outward for counter-clockwise
/// solids and into the hole for clockwise holes). Sharp corners are capped
/// at `sqrt(2) * d`.
fn bevel_vectors(ring: &[Vec2]) -> Vec<Vec2> {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            let e1 = (cur - prev).normalize_or_zero();
            let e2 = (next - cur).normalize_or_zero();
            let n1 = Vec2::new(e1.y, -e1.x);
            let n2 = Vec2::new(e2.y, -e2.x);
            let denom = 1.0 + n1.dot(n2);
            let v = if denom < 1e-6 { n1 } else { (n1 + n2) / denom };
            if v.length_squared() > 2.0 {
                v.normalize() * SQRT_2
            } else {
                v
            }
        })
        .collect()
}
