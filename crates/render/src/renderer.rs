use glam::Vec3;
use std::fmt::Write;

use donutfield_scene::Scene;

use crate::viewport::ViewportState;

/// Camera and output configuration for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub viewport: ViewportState,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
            viewport: ViewportState {
                width: 800,
                height: 600,
                pixel_ratio: 1.0,
            },
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads the scene and a view and produces output. It never
/// mutates the scene.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Renders the scene as a human-readable summary for logs and tests.
#[derive(Debug)]
pub struct DebugTextRenderer {
    /// List at most this many nodes; the rest are counted.
    pub max_nodes: usize,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self { max_nodes: 16 }
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let vp = view.viewport;
        let (buffer_w, buffer_h) = vp.drawing_buffer_size();
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({} nodes) ===", scene.len());
        let _ = writeln!(
            out,
            "Viewport: {}x{} @{:.2} -> {}x{} aspect={:.3}",
            vp.width,
            vp.height,
            vp.pixel_ratio,
            buffer_w,
            buffer_h,
            vp.aspect()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z, view.fov_degrees
        );
        for ((mesh, material), instances) in scene.batches() {
            let _ = writeln!(
                out,
                "Batch mesh={:016x} material={:016x}: {} instances",
                mesh.0,
                material.0,
                instances.len()
            );
        }

        for (id, node) in scene.nodes().iter().take(self.max_nodes) {
            let p = node.transform.position;
            let _ = writeln!(
                out,
                "  [{}] {} pos=({:.2}, {:.2}, {:.2}) scale={:.2}",
                id.short(),
                node.group,
                p.x,
                p.y,
                p.z,
                node.transform.scale.x
            );
        }
        if scene.len() > self.max_nodes {
            let _ = writeln!(out, "  ... {} more", scene.len() - self.max_nodes);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donutfield_assets::AssetId;
    use donutfield_common::Transform;
    use donutfield_scene::SceneNode;

    fn donut(x: f32) -> SceneNode {
        SceneNode {
            mesh: AssetId(1),
            material: AssetId(2),
            transform: Transform {
                position: Vec3::new(x, 0.0, 0.0),
                ..Transform::default()
            },
            group: "donuts".into(),
        }
    }

    #[test]
    fn empty_scene() {
        let output = DebugTextRenderer::new().render(&Scene::new(), &RenderView::default());
        assert!(output.contains("0 nodes"));
        assert!(output.contains("800x600"));
        assert!(output.contains("aspect=1.333"));
    }

    #[test]
    fn lists_batches_and_nodes() {
        let mut scene = Scene::new();
        scene.add(donut(1.0));
        scene.add(donut(2.0));

        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("2 nodes"));
        assert!(output.contains("2 instances"));
        assert!(output.contains("donuts pos="));
    }

    #[test]
    fn truncates_long_listings() {
        let mut scene = Scene::new();
        for i in 0..5 {
            scene.add(donut(i as f32));
        }
        let renderer = DebugTextRenderer { max_nodes: 2 };
        let output = renderer.render(&scene, &RenderView::default());
        assert_eq!(output.matches(" pos=").count(), 2);
        assert!(output.contains("... 3 more"));
    }

    #[test]
    fn reports_drawing_buffer() {
        let view = RenderView {
            viewport: ViewportState {
                width: 400,
                height: 200,
                pixel_ratio: 2.0,
            },
            ..RenderView::default()
        };
        let output = DebugTextRenderer::new().render(&Scene::new(), &view);
        assert!(output.contains("400x200 @2.00 -> 800x400 aspect=2.000"));
    }
}
