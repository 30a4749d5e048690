use donutfield_common::Transform;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::PI;

/// Placement of one repeated instance.
///
/// Position components lie in `[-spread/2, spread/2)`, both rotations in
/// `[0, pi)`, and the uniform scale in `[0, 1)`. Rotation about Z is
/// always zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementSample {
    pub position: Vec3,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub uniform_scale: f32,
}

impl PlacementSample {
    pub fn transform(&self) -> Transform {
        Transform::from_euler_xyz(
            self.position,
            self.rotation_x,
            self.rotation_y,
            0.0,
            self.uniform_scale,
        )
    }
}

/// Draws independent uniform placements inside a cube centred on the origin.
///
/// Output is a pure function of the random source: a seeded `StdRng`
/// reproduces the same field, `rand::rng()` gives a new one every run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstancePlacer {
    position_spread: f32,
}

impl InstancePlacer {
    pub fn new(position_spread: f32) -> Self {
        Self { position_spread }
    }

    /// Edge length of the cube positions are drawn from.
    pub fn position_spread(&self) -> f32 {
        self.position_spread
    }

    /// Draw one sample. Consumes six values in the order
    /// x, y, z, rotation_x, rotation_y, scale.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PlacementSample {
        let mut coord = || (rng.random::<f32>() - 0.5) * self.position_spread;
        let position = Vec3::new(coord(), coord(), coord());
        PlacementSample {
            position,
            rotation_x: rng.random::<f32>() * PI,
            rotation_y: rng.random::<f32>() * PI,
            uniform_scale: rng.random::<f32>(),
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<PlacementSample> {
        (0..count).map(|_| self.sample(rng)).collect()
    }
}
