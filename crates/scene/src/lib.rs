//! Scene: flat node graph, random instance placement, scene configuration.
//!
//! # Invariants
//! - Every [`PlacementSample`] position component lies in
//!   `[-spread/2, spread/2)`, rotations in `[0, pi)`, scale in `[0, 1)`.
//! - Placement is a pure function of the random source handed in.
//! - Scene mutations go through [`Scene`] operations; renderers only read.

mod config;
mod graph;
mod placement;
mod populate;

pub use config::{CameraConfig, ConfigError, SceneConfig};
pub use graph::{Scene, SceneNode};
pub use placement::{InstancePlacer, PlacementSample};
pub use populate::{DONUT_GROUP, TEXT_GROUP, FieldSeed, populate_donuts};
