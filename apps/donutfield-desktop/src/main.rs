mod context;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use context::{AppContext, surface_size};
use donutfield_assets::Shading;
use donutfield_input::{Action, FullscreenBackend, Key, PointerButton};
use donutfield_render::FrameScheduler;
use donutfield_render_wgpu::WgpuRenderer;
use donutfield_scene::SceneConfig;

/// Wheel pixels that count as one line on touchpads.
const PIXELS_PER_LINE: f32 = 50.0;

#[derive(Parser)]
#[command(name = "donutfield-desktop", about = "3D text in a field of donuts")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of donuts
    #[arg(long)]
    count: Option<usize>,

    /// Edge length of the cube donuts are scattered in
    #[arg(long)]
    spread: Option<f32>,

    /// Seed for donut placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Text to extrude
    #[arg(long)]
    text: Option<String>,

    /// Typeface JSON font
    #[arg(long)]
    font: Option<PathBuf>,

    /// Matcap texture
    #[arg(long)]
    matcap: Option<PathBuf>,

    #[arg(long, value_enum)]
    shading: Option<ShadingArg>,

    /// Upper bound on the device pixel ratio
    #[arg(long)]
    pixel_ratio_cap: Option<f32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ShadingArg {
    Normal,
    Matcap,
}

impl From<ShadingArg> for Shading {
    fn from(arg: ShadingArg) -> Self {
        match arg {
            ShadingArg::Normal => Shading::Normal,
            ShadingArg::Matcap => Shading::Matcap,
        }
    }
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(count) = self.count {
            config.donut_count = count;
        }
        if let Some(spread) = self.spread {
            config.position_spread = spread;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(text) = &self.text {
            config.text = text.clone();
        }
        if let Some(font) = &self.font {
            config.font_path = font.clone();
        }
        if let Some(matcap) = &self.matcap {
            config.matcap_path = matcap.clone();
        }
        if let Some(shading) = self.shading {
            config.shading = shading.into();
        }
        if let Some(cap) = self.pixel_ratio_cap {
            config.pixel_ratio_cap = cap;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Borrowed window as the platform side of fullscreen and frame requests.
struct WindowHandle<'a>(&'a Window);

impl FullscreenBackend for WindowHandle<'_> {
    fn request_fullscreen(&mut self) {
        self.0
            .set_fullscreen(Some(Fullscreen::Borderless(self.0.current_monitor())));
    }

    fn exit_fullscreen(&mut self) {
        self.0.set_fullscreen(None);
    }
}

impl FrameScheduler for WindowHandle<'_> {
    fn request_next_frame(&self) {
        self.0.request_redraw();
    }
}

/// Window and GPU resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, ctx: &mut AppContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("donutfield")
            .with_inner_size(LogicalSize::new(ctx.viewport.width, ctx.viewport.height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("donutfield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let physical = window.inner_size();
        let scale_factor = window.scale_factor();
        ctx.resize(physical.width, physical.height, scale_factor);
        let (width, height) = surface_size((physical.width, physical.height), scale_factor, &ctx.viewport);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            width,
            height,
            ctx.config.clear_rgb(),
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale_factor as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend ({}x{} {:?})",
            adapter.get_info().backend.to_str(),
            width,
            height,
            surface_format
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, ctx: &mut AppContext, physical: PhysicalSize<u32>) {
        let scale_factor = self.window.scale_factor();
        if ctx.resize(physical.width, physical.height, scale_factor).is_none() {
            return;
        }
        let (width, height) = surface_size((physical.width, physical.height), scale_factor, &ctx.viewport);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }
}

struct GpuApp {
    ctx: AppContext,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn apply(&mut self, action: Action) {
        if let Some(gpu) = &self.gpu {
            self.ctx.apply(action, &mut WindowHandle(&gpu.window));
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        self.ctx.frame(Instant::now(), &WindowHandle(&gpu.window));
        self.ctx.fullscreen.sync(gpu.window.fullscreen().is_some());
        gpu.renderer.sync(&gpu.device, &gpu.queue, &self.ctx.assets);

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.ctx.last_stats = gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.ctx.camera,
            &self.ctx.scene,
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |egui_ctx| {
            self.ctx.draw_ui(egui_ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        // egui lays out in logical points; the surface may be rendered below
        // the native scale when the pixel ratio is capped.
        let pixels_per_point = gpu.config.width as f32 / self.ctx.viewport.width.max(1) as f32;
        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, &mut self.ctx) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise window and GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(&mut self.ctx, new_size);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(gpu) = &mut self.gpu {
                    let size = gpu.window.inner_size();
                    gpu.resize(&mut self.ctx, size);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let Some(gpu) = &self.gpu else {
                    return;
                };
                let logical = position.to_logical::<f32>(gpu.window.scale_factor());
                if let Some(action) = self.ctx.pointer.moved(Vec2::new(logical.x, logical.y)) {
                    self.apply(action);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.ctx.pointer.left();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                match state {
                    ElementState::Pressed => {
                        if let Some(action) = self.ctx.pointer.press(button, Instant::now()) {
                            self.apply(action);
                        }
                    }
                    ElementState::Released => self.ctx.pointer.release(button),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                if let Some(action) = self.ctx.pointer.scroll(lines) {
                    self.apply(action);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let key = match code {
                    KeyCode::F1 => Key::F1,
                    KeyCode::F11 => Key::F11,
                    KeyCode::KeyR => Key::R,
                    _ => return,
                };
                self.apply(Action::for_key(key));
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("donutfield-desktop starting");

    let config = cli.scene_config()?;
    let ctx = AppContext::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = GpuApp::new(ctx);
    event_loop.run_app(&mut app)?;

    Ok(())
}
