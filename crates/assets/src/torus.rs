use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::mesh::MeshData;

/// Torus dimensions and tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorusParams {
    /// Distance from the torus centre to the tube centre.
    pub radius: f32,
    /// Tube radius.
    pub tube: f32,
    /// Segments around the tube cross-section.
    pub radial_segments: u32,
    /// Segments along the ring.
    pub tubular_segments: u32,
    /// Central angle swept by the ring, in radians.
    pub arc: f32,
}

impl Default for TorusParams {
    fn default() -> Self {
        Self {
            radius: 0.3,
            tube: 0.2,
            radial_segments: 20,
            tubular_segments: 45,
            arc: TAU,
        }
    }
}

/// Build a torus lying in the XY plane, centred on the origin.
///
/// Vertices form a `(radial + 1) x (tubular + 1)` grid so seams carry
/// duplicate vertices; normals point away from the tube centre line.
pub fn torus(params: &TorusParams) -> MeshData {
    let radial = params.radial_segments.max(1);
    let tubular = params.tubular_segments.max(1);
    let mut mesh = MeshData::new(format!(
        "torus({}, {}, {radial}, {tubular})",
        params.radius, params.tube
    ));

    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * params.arc;
            let ring = params.radius + params.tube * v.cos();
            let position = Vec3::new(ring * u.cos(), ring * u.sin(), params.tube * v.sin());
            let centre = Vec3::new(params.radius * u.cos(), params.radius * u.sin(), 0.0);
            mesh.push_vertex(position, (position - centre).normalize_or_zero());
        }
    }

    let stride = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            mesh.push_triangle(a, b, d);
            mesh.push_triangle(b, c, d);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_torus_counts() {
        let mesh = torus(&TorusParams::default());
        assert_eq!(mesh.vertex_count(), 21 * 46);
        assert_eq!(mesh.index_count(), 20 * 45 * 6);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn vertices_lie_on_tube_surface() {
        let params = TorusParams::default();
        let mesh = torus(&params);
        for p in &mesh.positions {
            let p = Vec3::from_array(*p);
            let ring_dist = (p.x * p.x + p.y * p.y).sqrt() - params.radius;
            let tube_dist = (ring_dist * ring_dist + p.z * p.z).sqrt();
            assert!((tube_dist - params.tube).abs() < 1e-5);
        }
    }

    #[test]
    fn normals_are_unit_and_outward() {
        let mesh = torus(&TorusParams::default());
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let n = Vec3::from_array(*n);
            assert!((n.length() - 1.0).abs() < 1e-5);
            let p = Vec3::from_array(*p);
            let centre = Vec3::new(p.x, p.y, 0.0).normalize() * 0.3;
            assert!(n.dot(p - centre) > 0.0);
        }
    }

    #[test]
    fn bounds_match_outer_radius() {
        let mesh = torus(&TorusParams::default());
        let (lo, hi) = mesh.bounding_box().unwrap();
        assert!((hi.x - 0.5).abs() < 1e-5);
        // 45 ring segments never land exactly on u = pi.
        assert!(lo.x > -0.5 - 1e-5 && lo.x < -0.49);
        assert!((hi.z - 0.2).abs() < 1e-5);
    }

    #[test]
    fn zero_segments_are_clamped() {
        let mesh = torus(&TorusParams {
            radial_segments: 0,
            tubular_segments: 0,
            ..TorusParams::default()
        });
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
    }
}
