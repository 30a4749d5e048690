use donutfield_assets::AssetId;
use donutfield_common::NodeId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

use crate::graph::{Scene, SceneNode};
use crate::placement::InstancePlacer;

/// Group label of the donut field nodes.
pub const DONUT_GROUP: &str = "donuts";
/// Group label of the text node.
pub const TEXT_GROUP: &str = "text";

/// Seed behind one donut field.
///
/// A configured seed is used as-is. Without one a seed is drawn from the
/// thread RNG, so every run differs but the field can still be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSeed {
    pub value: u64,
    pub fixed: bool,
}

impl FieldSeed {
    pub fn resolve(configured: Option<u64>) -> Self {
        match configured {
            Some(value) => Self { value, fixed: true },
            None => Self {
                value: rand::random(),
                fixed: false,
            },
        }
    }

    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.value)
    }
}

/// Replace the donut field with `count` fresh instances of `mesh`/`material`.
///
/// Any previous donut nodes are removed first; other groups are untouched.
pub fn populate_donuts(
    scene: &mut Scene,
    placer: &InstancePlacer,
    seed: FieldSeed,
    count: usize,
    mesh: AssetId,
    material: AssetId,
) -> Vec<NodeId> {
    let _span = tracing::info_span!("populate_donuts", count, seed = seed.value).entered();
    let start = Instant::now();

    let removed = scene.remove_group(DONUT_GROUP);
    let mut rng = seed.rng();
    let ids: Vec<NodeId> = placer
        .generate(&mut rng, count)
        .iter()
        .map(|sample| {
            scene.add(SceneNode {
                mesh,
                material,
                transform: sample.transform(),
                group: DONUT_GROUP.into(),
            })
        })
        .collect();

    tracing::info!(
        placed = ids.len(),
        removed,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "donuts placed"
    );
    ids
}
