//! Asset pipeline: content-addressed registry, procedural geometry, fonts, textures.
//!
//! Assets are identified by content-addressed hashes. The renderer consumes
//! assets by handle, never by raw file paths.
//!
//! # Invariants
//! - Registering identical content twice yields the same [`AssetId`].
//! - Every [`MeshData`] in the store has matching position/normal counts and
//!   in-range indices.
//! - Loading happens off the main thread; results arrive through
//!   [`AssetLoader::poll`] in completion order.

mod loader;
mod mesh;
mod text;
mod texture;
mod torus;
mod triangulate;
mod typeface;

pub use loader::{AssetKind, AssetLoader, LoadEvent, LoadedAsset};
pub use mesh::{GeometryError, MeshData};
pub use text::{TextParams, text_mesh};
pub use texture::TextureImage;
pub use torus::{TorusParams, torus};
pub use triangulate::{Cap, CapVertex, fill, orient_contours, signed_area};
pub use typeface::{BoundingBox, Glyph, PathCommand, Typeface};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Content-addressed asset ID computed from the asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

/// How a material colours its surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shading {
    /// View-space normal mapped to RGB.
    #[default]
    Normal,
    /// Matcap lookup by view-space normal; falls back to `Normal` until a
    /// texture is attached.
    Matcap,
}

/// Appearance shared by any number of mesh nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shading: Shading,
    pub matcap: Option<AssetId>,
}

impl Material {
    pub fn new(name: impl Into<String>, shading: Shading) -> Self {
        Self {
            name: name.into(),
            shading,
            matcap: None,
        }
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset not found: {0:?}")]
    NotFound(AssetId),
    #[error("typeface error: {0}")]
    Typeface(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Content-addressed registry of meshes, materials, and textures.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    meshes: BTreeMap<AssetId, MeshData>,
    materials: BTreeMap<AssetId, Material>,
    textures: BTreeMap<AssetId, TextureImage>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh and return its asset ID. Rejects malformed geometry.
    pub fn register_mesh(&mut self, mesh: MeshData) -> Result<AssetId, AssetError> {
        mesh.validate()?;
        let id = mesh_hash(&mesh);
        tracing::debug!(
            name = %mesh.name,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "registered mesh {:#018x}",
            id.0
        );
        self.meshes.insert(id, mesh);
        Ok(id)
    }

    /// Register a material. Materials are keyed by name so they stay
    /// addressable while their texture binding changes.
    pub fn register_material(&mut self, material: Material) -> AssetId {
        let id = hash_parts(&[b"material", material.name.as_bytes()]);
        self.materials.insert(id, material);
        id
    }

    /// Register a decoded texture and return its asset ID.
    pub fn register_texture(&mut self, texture: TextureImage) -> AssetId {
        let id = hash_parts(&[
            b"texture",
            &texture.width.to_le_bytes(),
            &texture.height.to_le_bytes(),
            &texture.pixels,
        ]);
        self.textures.insert(id, texture);
        id
    }

    /// Point a material at a matcap texture.
    pub fn attach_matcap(&mut self, material: AssetId, texture: AssetId) -> Result<(), AssetError> {
        if !self.textures.contains_key(&texture) {
            return Err(AssetError::NotFound(texture));
        }
        let m = self
            .materials
            .get_mut(&material)
            .ok_or(AssetError::NotFound(material))?;
        m.matcap = Some(texture);
        Ok(())
    }

    pub fn mesh(&self, id: AssetId) -> Option<&MeshData> {
        self.meshes.get(&id)
    }

    pub fn material(&self, id: AssetId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn material_mut(&mut self, id: AssetId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    pub fn texture(&self, id: AssetId) -> Option<&TextureImage> {
        self.textures.get(&id)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (AssetId, &MeshData)> {
        self.meshes.iter().map(|(id, m)| (*id, m))
    }

    pub fn materials(&self) -> impl Iterator<Item = (AssetId, &Material)> {
        self.materials.iter().map(|(id, m)| (*id, m))
    }

    pub fn textures(&self) -> impl Iterator<Item = (AssetId, &TextureImage)> {
        self.textures.iter().map(|(id, t)| (*id, t))
    }

    /// Number of registered assets of all kinds.
    pub fn len(&self) -> usize {
        self.meshes.len() + self.materials.len() + self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn mesh_hash(mesh: &MeshData) -> AssetId {
    let mut hasher = Sha256::new();
    hasher.update(b"mesh");
    hasher.update(mesh.name.as_bytes());
    for p in &mesh.positions {
        for c in p {
            hasher.update(c.to_le_bytes());
        }
    }
    for i in &mesh.indices {
        hasher.update(i.to_le_bytes());
    }
    finish(hasher)
}

fn hash_parts(parts: &[&[u8]]) -> AssetId {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    finish(hasher)
}

fn finish(hasher: Sha256) -> AssetId {
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    AssetId(u64::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_torus_mesh() {
        let mut store = AssetStore::new();
        let id = store.register_mesh(torus(&TorusParams::default())).unwrap();
        assert!(store.mesh(id).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn content_addressed_dedup() {
        let mut store = AssetStore::new();
        let id1 = store.register_mesh(torus(&TorusParams::default())).unwrap();
        let id2 = store.register_mesh(torus(&TorusParams::default())).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);

        let thinner = TorusParams {
            tube: 0.1,
            ..TorusParams::default()
        };
        let id3 = store.register_mesh(torus(&thinner)).unwrap();
        assert_ne!(id1, id3);
    }

    #[test]
    fn malformed_mesh_is_rejected() {
        let mut store = AssetStore::new();
        let mut mesh = MeshData::new("broken");
        mesh.positions.push([0.0; 3]);
        mesh.normals.push([0.0, 0.0, 1.0]);
        mesh.indices.extend([0, 1, 2]);
        assert!(matches!(
            store.register_mesh(mesh),
            Err(AssetError::Geometry(GeometryError::IndexOutOfRange { .. }))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn attach_matcap_to_material() {
        let mut store = AssetStore::new();
        let mat = store.register_material(Material::new("shared", Shading::Matcap));
        let tex = store.register_texture(TextureImage::solid("white", [255; 4]));
        store.attach_matcap(mat, tex).unwrap();
        assert_eq!(store.material(mat).unwrap().matcap, Some(tex));
    }

    #[test]
    fn attach_unknown_texture_fails() {
        let mut store = AssetStore::new();
        let mat = store.register_material(Material::new("shared", Shading::Normal));
        let err = store.attach_matcap(mat, AssetId(7)).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(AssetId(7))));
    }

    #[test]
    fn material_id_is_stable_across_edits() {
        let mut store = AssetStore::new();
        let a = store.register_material(Material::new("shared", Shading::Normal));
        store.material_mut(a).unwrap().shading = Shading::Matcap;
        let b = store.register_material(Material::new("shared", Shading::Matcap));
        assert_eq!(a, b);
    }

    #[test]
    fn shading_parses_lowercase() {
        let s: Shading = serde_json::from_str("\"matcap\"").unwrap();
        assert_eq!(s, Shading::Matcap);
    }
}
