//! Cap triangulation for extruded text.
//!
//! Contours are cleaned and re-wound by nesting depth (solids
//! counter-clockwise, holes clockwise) so bevel offsets point away from the
//! filled area, then filled in one pass with lyon's tessellator under the
//! non-zero rule.

use glam::{DVec2, Vec2};
use lyon_path::math::point;
use lyon_path::{EndpointId, Path};
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers, VertexSource,
};

use crate::mesh::GeometryError;

/// A cap vertex and where it sits on the input contours.
///
/// `from` and `to` index the concatenation of the contours handed to
/// [`fill`]. Vertices lyon inserts on an edge lie `t` of the way from `from`
/// to `to`; original contour points have `from == to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapVertex {
    pub position: Vec2,
    pub from: usize,
    pub to: usize,
    pub t: f32,
}

/// A filled outline. Triangles wind counter-clockwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cap {
    pub vertices: Vec<CapVertex>,
    pub triangles: Vec<[u32; 3]>,
}

/// Positive for counter-clockwise rings.
pub fn signed_area(points: &[Vec2]) -> f32 {
    signed_area_d(points) as f32
}

// f64: glyph edges at text sizes around 0.5 are short enough for f32
// cross products to lose the sign.
fn signed_area_d(points: &[Vec2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].as_dvec2().perp_dot(points[(i + 1) % n].as_dvec2()))
        .sum::<f64>()
        * 0.5
}

fn point_in_ring(p: DVec2, ring: &[Vec2]) -> bool {
    let mut inside = false;
    let n = ring.len();
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i].as_dvec2(), ring[j].as_dvec2());
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Drop repeated points, including a closing point equal to the first.
fn clean(contour: Vec<Vec2>) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(contour.len());
    for p in contour {
        if out.last().is_none_or(|q| q.distance_squared(p) > f32::EPSILON * 1e-4) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].distance_squared(out[out.len() - 1]) <= f32::EPSILON * 1e-4 {
        out.pop();
    }
    out
}

/// Clean raw contours and wind them by nesting.
///
/// A contour inside an even number of larger contours is a solid and winds
/// counter-clockwise; one inside an odd number is a hole and winds
/// clockwise. Input winding does not matter. Contours with fewer than three
/// distinct points or no area are dropped.
pub fn orient_contours(contours: Vec<Vec<Vec2>>) -> Vec<Vec<Vec2>> {
    let mut rings: Vec<Vec<Vec2>> = contours
        .into_iter()
        .map(clean)
        .filter(|c| c.len() >= 3 && signed_area_d(c) != 0.0)
        .collect();
    let areas: Vec<f64> = rings.iter().map(|r| signed_area_d(r).abs()).collect();
    let depths: Vec<usize> = (0..rings.len())
        .map(|i| {
            let p = rings[i][0].as_dvec2();
            (0..rings.len())
                .filter(|&j| j != i && areas[j] > areas[i] && point_in_ring(p, &rings[j]))
                .count()
        })
        .collect();

    for (ring, depth) in rings.iter_mut().zip(depths) {
        let solid = depth % 2 == 0;
        if (signed_area_d(ring) > 0.0) != solid {
            ring.reverse();
        }
    }
    rings
}

/// Fill oriented contours.
///
/// Expects the winding produced by [`orient_contours`]: under the non-zero
/// rule clockwise holes cancel their counter-clockwise solid.
pub fn fill(contours: &[Vec<Vec2>]) -> Result<Cap, GeometryError> {
    let mut builder = Path::builder();
    let mut endpoints: Vec<usize> = Vec::new();
    let mut record = |id: EndpointId, index: usize| {
        let slot = id.to_usize();
        if endpoints.len() <= slot {
            endpoints.resize(slot + 1, 0);
        }
        endpoints[slot] = index;
    };

    let mut index = 0;
    for contour in contours {
        let Some((first, rest)) = contour.split_first() else {
            continue;
        };
        record(builder.begin(point(first.x, first.y)), index);
        index += 1;
        for p in rest {
            record(builder.line_to(point(p.x, p.y)), index);
            index += 1;
        }
        builder.end(true);
    }
    let path = builder.build();

    let lookup = |id: EndpointId| endpoints.get(id.to_usize()).copied().unwrap_or(0);
    let mut buffers: VertexBuffers<CapVertex, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                let p = vertex.position();
                let (from, to, t) = match vertex.sources().next() {
                    Some(VertexSource::Endpoint { id }) => (lookup(id), lookup(id), 0.0),
                    Some(VertexSource::Edge { from, to, t }) => (lookup(from), lookup(to), t),
                    _ => (0, 0, 0.0),
                };
                CapVertex {
                    position: Vec2::new(p.x, p.y),
                    from,
                    to,
                    t,
                }
            }),
        )
        .map_err(|e| GeometryError::Tessellation(format!("{e:?}")))?;

    let vertices = buffers.vertices;
    let triangles = buffers
        .indices
        .chunks_exact(3)
        .map(|t| {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| vertices[i as usize].position);
            if (b - a).perp_dot(c - a) < 0.0 {
                [t[0], t[2], t[1]]
            } else {
                [t[0], t[1], t[2]]
            }
        })
        .collect();
    Ok(Cap {
        vertices,
        triangles,
    })
}
