use donutfield_assets::AssetId;
use donutfield_common::{NodeId, Transform};
use glam::Mat4;
use std::collections::BTreeMap;

/// A mesh instance in the scene: shared geometry and material plus its own
/// transform. `group` labels nodes that are managed together (e.g. every
/// donut in the field).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub mesh: AssetId,
    pub material: AssetId,
    pub transform: Transform,
    pub group: String,
}

/// Flat scene graph.
///
/// Nodes are stored in a BTreeMap so draw batches come out in a stable
/// order within a run.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, node);
        id
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        self.nodes.remove(&id)
    }

    /// Remove every node in `group`. Returns how many were removed.
    pub fn remove_group(&mut self, group: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|_, node| node.group != group);
        before - self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, SceneNode> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn group_len(&self, group: &str) -> usize {
        self.nodes.values().filter(|n| n.group == group).count()
    }

    /// Model matrices grouped by `(mesh, material)`, one instanced draw each.
    pub fn batches(&self) -> BTreeMap<(AssetId, AssetId), Vec<Mat4>> {
        let mut batches: BTreeMap<(AssetId, AssetId), Vec<Mat4>> = BTreeMap::new();
        for node in self.nodes.values() {
            batches
                .entry((node.mesh, node.material))
                .or_default()
                .push(node.transform.matrix());
        }
        batches
    }
}
