use egui::Context as EguiContext;
use std::time::Instant;

use donutfield_assets::{
    AssetError, AssetId, AssetLoader, AssetStore, LoadEvent, LoadedAsset, Material, Typeface,
    text_mesh, torus,
};
use donutfield_common::{NodeId, Transform};
use donutfield_input::{Action, FullscreenBackend, FullscreenToggle, PointerTracker};
use donutfield_render::{
    DebugTextRenderer, FrameLoop, FrameScheduler, FrameTick, RenderView, Renderer,
    ViewportAdapter, ViewportError, ViewportState,
};
use donutfield_render_wgpu::{OrbitCamera, RenderStats};
use donutfield_scene::{
    DONUT_GROUP, FieldSeed, InstancePlacer, Scene, SceneConfig, SceneNode, TEXT_GROUP,
    populate_donuts,
};

/// Logical window size before the first resize arrives.
const INITIAL_VIEWPORT: ViewportState = ViewportState {
    width: 1280,
    height: 720,
    pixel_ratio: 1.0,
};

/// Everything the viewer owns, independent of the window and GPU.
pub struct AppContext {
    pub config: SceneConfig,
    pub scene: Scene,
    pub assets: AssetStore,
    pub camera: OrbitCamera,
    pub viewport: ViewportState,
    pub fullscreen: FullscreenToggle,
    pub pointer: PointerTracker,
    pub frames: FrameLoop,
    pub show_overlay: bool,
    pub last_stats: RenderStats,
    loader: AssetLoader,
    adapter: ViewportAdapter,
    placer: InstancePlacer,
    seed: FieldSeed,
    donut_mesh: AssetId,
    material: AssetId,
    text_node: Option<NodeId>,
    last_tick: Option<FrameTick>,
}

impl AppContext {
    /// Build the scene and start loading the font and matcap in the
    /// background. The donut field is placed immediately.
    pub fn new(config: SceneConfig) -> Result<Self, AssetError> {
        let mut assets = AssetStore::new();
        let donut_mesh = assets.register_mesh(torus(&config.torus))?;
        let material = assets.register_material(Material::new("scene", config.shading));

        let mut loader = AssetLoader::new();
        loader.load_font(&config.font_path);
        loader.load_texture(&config.matcap_path);

        let seed = FieldSeed::resolve(config.seed);
        tracing::info!(seed = seed.value, fixed = seed.fixed, "donut field seed");

        let mut ctx = Self {
            scene: Scene::new(),
            assets,
            camera: OrbitCamera::from_config(&config.camera, INITIAL_VIEWPORT.aspect()),
            viewport: INITIAL_VIEWPORT,
            fullscreen: FullscreenToggle::new(),
            pointer: PointerTracker::new(),
            frames: FrameLoop::new(),
            show_overlay: false,
            last_stats: RenderStats::default(),
            loader,
            adapter: ViewportAdapter::new(config.pixel_ratio_cap),
            placer: InstancePlacer::new(config.position_spread),
            seed,
            donut_mesh,
            material,
            text_node: None,
            last_tick: None,
            config,
        };
        ctx.populate();
        Ok(ctx)
    }

    fn populate(&mut self) {
        populate_donuts(
            &mut self.scene,
            &self.placer,
            self.seed,
            self.config.donut_count,
            self.donut_mesh,
            self.material,
        );
    }

    /// Re-place the donut field with a fresh random seed.
    pub fn regenerate(&mut self) {
        self.seed = FieldSeed::resolve(None);
        tracing::info!(seed = self.seed.value, "regenerating donut field");
        self.populate();
    }

    pub fn seed(&self) -> FieldSeed {
        self.seed
    }

    pub fn material(&self) -> AssetId {
        self.material
    }

    pub fn text_node(&self) -> Option<NodeId> {
        self.text_node
    }

    /// Loads still outstanding.
    pub fn pending_loads(&self) -> usize {
        self.loader.in_flight()
    }

    /// Apply every asset load that finished since the last call.
    pub fn poll_assets(&mut self) {
        for event in self.loader.poll() {
            self.handle_load_event(event);
        }
    }

    pub fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Loaded {
                path,
                asset: LoadedAsset::Font(face),
            } => {
                tracing::info!("font {} loaded from {}", face.family_name, path.display());
                if let Err(e) = self.attach_text(&face) {
                    tracing::warn!("failed to build text mesh: {e}");
                }
            }
            LoadEvent::Loaded {
                path,
                asset: LoadedAsset::Texture(image),
            } => {
                tracing::info!(
                    "matcap loaded from {} ({}x{})",
                    path.display(),
                    image.width,
                    image.height
                );
                let texture = self.assets.register_texture(image);
                if let Err(e) = self.assets.attach_matcap(self.material, texture) {
                    tracing::warn!("failed to attach matcap: {e}");
                }
            }
            LoadEvent::Failed { path, kind, error } => {
                tracing::warn!("{kind} load failed for {}: {error}", path.display());
            }
        }
    }

    fn attach_text(&mut self, face: &Typeface) -> Result<(), AssetError> {
        let mesh = text_mesh(face, &self.config.text, &self.config.text_params)?;
        let mesh = self.assets.register_mesh(mesh)?;
        if let Some(previous) = self.text_node.take() {
            self.scene.remove(previous);
        }
        self.text_node = Some(self.scene.add(SceneNode {
            mesh,
            material: self.material,
            transform: Transform::default(),
            group: TEXT_GROUP.into(),
        }));
        Ok(())
    }

    /// Recompute the viewport for a new physical window size.
    ///
    /// A zero-height window (minimised) keeps the previous viewport and
    /// returns `None`.
    pub fn resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
    ) -> Option<ViewportState> {
        match self
            .adapter
            .from_physical(physical_width, physical_height, scale_factor)
        {
            Ok(viewport) => {
                tracing::debug!(
                    width = viewport.width,
                    height = viewport.height,
                    pixel_ratio = viewport.pixel_ratio,
                    "viewport resized"
                );
                self.viewport = viewport;
                self.camera.set_aspect(viewport.aspect());
                Some(viewport)
            }
            Err(ViewportError::ZeroHeight | ViewportError::ZeroWidth) => {
                tracing::debug!("skipping zero-area resize");
                None
            }
            Err(e) => {
                tracing::warn!("ignoring resize: {e}");
                None
            }
        }
    }

    pub fn apply(&mut self, action: Action, window: &mut impl FullscreenBackend) {
        let height = self.viewport.height as f32;
        match action {
            Action::Orbit(delta) => self.camera.rotate(delta, height),
            Action::Pan(delta) => self.camera.pan(delta, height),
            Action::Zoom(lines) => self.camera.zoom(lines),
            Action::ToggleFullscreen => {
                self.fullscreen.toggle(window);
            }
            Action::Regenerate => self.regenerate(),
            Action::ToggleOverlay => self.show_overlay = !self.show_overlay,
        }
    }

    /// Per-frame update: drain finished loads, advance the camera, and ask
    /// for the next frame.
    pub fn frame(&mut self, now: Instant, scheduler: &impl FrameScheduler) -> FrameTick {
        self.poll_assets();
        self.camera.update();
        let tick = self.frames.tick(now, scheduler);
        self.last_tick = Some(tick);
        tick
    }

    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.camera.position,
            target: self.camera.target,
            fov_degrees: self.camera.fov_y.to_degrees(),
            viewport: self.viewport,
        }
    }

    pub fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        let mut regenerate = false;
        egui::Window::new("donutfield")
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Donuts: {}  Text: {}",
                    self.scene.group_len(DONUT_GROUP),
                    if self.text_node.is_some() { "yes" } else { "pending" }
                ));
                ui.label(format!(
                    "Seed: {}{}",
                    self.seed.value,
                    if self.seed.fixed { " (fixed)" } else { "" }
                ));
                let (buffer_w, buffer_h) = self.viewport.drawing_buffer_size();
                ui.label(format!(
                    "Viewport: {}x{} @{:.2} ({}x{})",
                    self.viewport.width,
                    self.viewport.height,
                    self.viewport.pixel_ratio,
                    buffer_w,
                    buffer_h
                ));
                ui.label(format!("Fullscreen: {:?}", self.fullscreen.state()));
                if let Some(tick) = self.last_tick {
                    ui.label(format!(
                        "Frame {}  {:.1} ms",
                        tick.index,
                        tick.delta.as_secs_f64() * 1000.0
                    ));
                }
                ui.label(format!(
                    "Draws: {}  Instances: {}  Waiting: {}",
                    self.last_stats.draw_calls, self.last_stats.instances, self.last_stats.skipped
                ));
                ui.separator();
                if ui.button("Regenerate (R)").clicked() {
                    regenerate = true;
                }
                ui.collapsing("Scene", |ui| {
                    let dump = DebugTextRenderer::new().render(&self.scene, &self.render_view());
                    ui.monospace(dump);
                });
                ui.separator();
                ui.small("F1: Overlay | F11 / double-click: Fullscreen | LMB: Orbit | RMB: Pan | Wheel: Zoom");
            });
        if regenerate {
            self.regenerate();
        }
    }
}

/// Surface size for a viewport.
///
/// When the pixel ratio is not capped the window's own physical size is
/// used, so rounding through logical pixels never leaves the surface a
/// pixel off the window.
pub fn surface_size(physical: (u32, u32), scale_factor: f64, viewport: &ViewportState) -> (u32, u32) {
    if viewport.pixel_ratio as f64 >= scale_factor {
        (physical.0.max(1), physical.1.max(1))
    } else {
        viewport.drawing_buffer_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donutfield_assets::{AssetKind, Shading, TextureImage};
    use donutfield_input::FullscreenState;
    use donutfield_render::ManualScheduler;
    use glam::Vec2;
    use std::path::PathBuf;

    const FACE: &str = r#"{
        "familyName": "Fixture",
        "resolution": 1000,
        "underlineThickness": 50,
        "boundingBox": { "xMin": 0, "xMax": 1000, "yMin": -200, "yMax": 800 },
        "glyphs": {
            "H": { "ha": 700, "o": "m 0 0 l 600 0 l 600 700 l 0 700 l 0 0" },
            "i": { "ha": 300, "o": "m 0 0 l 200 0 l 200 500 l 0 500 l 0 0" }
        }
    }"#;

    #[derive(Default)]
    struct FakeWindow {
        requests: usize,
        exits: usize,
    }

    impl FullscreenBackend for FakeWindow {
        fn request_fullscreen(&mut self) {
            self.requests += 1;
        }

        fn exit_fullscreen(&mut self) {
            self.exits += 1;
        }
    }

    fn context(dir: &tempfile::TempDir) -> AppContext {
        let config = SceneConfig {
            donut_count: 25,
            seed: Some(7),
            text: "Hi".into(),
            font_path: dir.path().join("missing-font.json"),
            matcap_path: dir.path().join("missing-matcap.png"),
            ..SceneConfig::default()
        };
        AppContext::new(config).unwrap()
    }

    fn font_loaded() -> LoadEvent {
        LoadEvent::Loaded {
            path: PathBuf::from("fixture.json"),
            asset: LoadedAsset::Font(Typeface::from_json(FACE).unwrap()),
        }
    }

    #[test]
    fn places_configured_field_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        assert_eq!(ctx.scene.group_len(DONUT_GROUP), 25);
        assert_eq!(ctx.seed(), FieldSeed { value: 7, fixed: true });
        assert!(ctx.text_node().is_none());
    }

    #[test]
    fn font_completion_attaches_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.handle_load_event(font_loaded());
        let id = ctx.text_node().unwrap();
        let node = ctx.scene.get(id).unwrap();
        assert_eq!(node.group, TEXT_GROUP);
        assert_eq!(node.material, ctx.material());
        assert!(ctx.assets.mesh(node.mesh).unwrap().triangle_count() > 0);

        // A second font replaces the text instead of stacking it.
        ctx.handle_load_event(font_loaded());
        assert_eq!(ctx.scene.group_len(TEXT_GROUP), 1);
    }

    #[test]
    fn failed_load_attaches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        let before = ctx.scene.len();
        ctx.handle_load_event(LoadEvent::Failed {
            path: PathBuf::from("missing.json"),
            kind: AssetKind::Font,
            error: AssetError::Typeface("gone".into()),
        });
        assert_eq!(ctx.scene.len(), before);
        assert!(ctx.text_node().is_none());
    }

    #[test]
    fn missing_files_fail_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        let deadline = Instant::now() + std::time::Duration::from_secs(10);
        while ctx.pending_loads() > 0 && Instant::now() < deadline {
            ctx.poll_assets();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert_eq!(ctx.pending_loads(), 0);
        assert_eq!(ctx.scene.len(), 25);
        assert!(ctx.assets.material(ctx.material()).unwrap().matcap.is_none());
    }

    #[test]
    fn texture_completion_sets_matcap() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.handle_load_event(LoadEvent::Loaded {
            path: PathBuf::from("8.png"),
            asset: LoadedAsset::Texture(TextureImage::solid("matcap", [10, 20, 30, 255])),
        });
        let material = ctx.assets.material(ctx.material()).unwrap();
        assert!(material.matcap.is_some());
        assert_eq!(material.shading, Shading::Normal);
    }

    #[test]
    fn resize_updates_viewport_and_camera() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        let viewport = ctx.resize(1600, 800, 1.0).unwrap();
        assert_eq!(viewport.aspect(), 2.0);
        assert_eq!(ctx.camera.aspect, 2.0);

        let capped = ctx.resize(3000, 1500, 3.0).unwrap();
        assert_eq!(capped.pixel_ratio, 2.0);
        assert_eq!((capped.width, capped.height), (1000, 500));
    }

    #[test]
    fn minimised_window_keeps_previous_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.resize(800, 600, 1.0);
        assert!(ctx.resize(0, 0, 1.0).is_none());
        assert_eq!((ctx.viewport.width, ctx.viewport.height), (800, 600));
        assert!((ctx.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn sliver_window_still_resizes() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.resize(800, 600, 1.0);

        let narrow = ctx.resize(1, 600, 3.0).unwrap();
        assert_eq!((narrow.width, narrow.height), (1, 200));
        assert!(ctx.camera.projection_matrix().is_finite());

        let short = ctx.resize(3, 1, 3.0).unwrap();
        assert_eq!((short.width, short.height), (1, 1));
        assert_eq!(ctx.viewport, short);
    }

    #[test]
    fn regenerate_replaces_field_with_new_seed() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        ctx.handle_load_event(font_loaded());
        let mut window = FakeWindow::default();
        ctx.apply(Action::Regenerate, &mut window);
        assert!(!ctx.seed().fixed);
        assert_eq!(ctx.scene.group_len(DONUT_GROUP), 25);
        assert_eq!(ctx.scene.group_len(TEXT_GROUP), 1);
    }

    #[test]
    fn fullscreen_and_overlay_actions() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        let mut window = FakeWindow::default();
        ctx.apply(Action::ToggleFullscreen, &mut window);
        assert_eq!(ctx.fullscreen.state(), FullscreenState::Fullscreen);
        ctx.apply(Action::ToggleFullscreen, &mut window);
        assert_eq!((window.requests, window.exits), (1, 1));

        ctx.apply(Action::ToggleOverlay, &mut window);
        assert!(ctx.show_overlay);
    }

    #[test]
    fn orbit_action_moves_camera_over_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir);
        let start = ctx.camera.position;
        ctx.apply(Action::Orbit(Vec2::new(50.0, 0.0)), &mut FakeWindow::default());
        let scheduler = ManualScheduler::new();
        let t0 = Instant::now();
        for i in 0..10 {
            ctx.frame(t0 + std::time::Duration::from_millis(16 * i), &scheduler);
        }
        assert_ne!(ctx.camera.position, start);
        assert_eq!(ctx.frames.frames(), 10);
        assert_eq!(scheduler.requests(), 10);
    }

    #[test]
    fn render_view_reflects_camera_and_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let view = ctx.render_view();
        assert!((view.fov_degrees - 45.0).abs() < 1e-4);
        assert_eq!(view.viewport, INITIAL_VIEWPORT);
        let dump = DebugTextRenderer::new().render(&ctx.scene, &view);
        assert!(dump.contains("25 nodes"));
    }

    #[test]
    fn surface_matches_window_unless_capped() {
        let uncapped = ViewportAdapter::default().from_physical(1001, 601, 1.5).unwrap();
        assert_eq!(surface_size((1001, 601), 1.5, &uncapped), (1001, 601));

        let capped = ViewportAdapter::default().from_physical(3000, 1500, 3.0).unwrap();
        assert_eq!(surface_size((3000, 1500), 3.0, &capped), (2000, 1000));
    }
}
