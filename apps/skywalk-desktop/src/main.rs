use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use skywalk_common::{Config, Viewport};
use skywalk_input::Key;
use skywalk_kernel::{
    FirstPersonController, FrameClock, FrameLoop, FrameTick, SystemClock, Timestep,
};
use skywalk_render::FrameView;
use skywalk_render_wgpu::{PointerLockCamera, WgpuRenderer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "skywalk-desktop", about = "First-person skybox viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the simulation at a fixed step (seconds) instead of once per frame
    #[arg(long)]
    fixed_step: Option<f32>,
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::KeyW,
        KeyCode::KeyA => Key::KeyA,
        KeyCode::KeyS => Key::KeyS,
        KeyCode::KeyD => Key::KeyD,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

/// Simulation and presentation state, independent of the GPU.
struct AppState {
    config: Config,
    controller: FirstPersonController,
    camera: PointerLockCamera,
    frame_loop: FrameLoop,
    clock: SystemClock,
    last_tick: FrameTick,
    show_debug: bool,
}

impl AppState {
    fn new(config: Config, timestep: Timestep) -> Self {
        let viewport = Viewport::new(config.window.width, config.window.height);
        let camera = PointerLockCamera::new(&config.camera, viewport)
            .with_position(Vec3::new(0.0, config.movement.ground_height, 0.0));
        Self {
            controller: FirstPersonController::new(config.movement),
            camera,
            frame_loop: FrameLoop::new(timestep),
            clock: SystemClock::new(),
            last_tick: FrameTick::default(),
            show_debug: false,
            config,
        }
    }

    /// Advance the simulation by the wall time since the last frame.
    fn update(&mut self) {
        let elapsed = self.clock.tick();
        self.last_tick = self.frame_loop.advance(elapsed, |dt| {
            self.controller.update(&mut self.camera, dt);
        });
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if pressed && code == KeyCode::F1 {
            self.show_debug = !self.show_debug;
            return;
        }
        let Some(key) = map_key(code) else {
            return;
        };
        if pressed {
            self.controller.press(key);
        } else {
            self.controller.release(key);
        }
    }

    fn frame_view(&self) -> FrameView {
        FrameView::capture(
            self.last_tick.frame,
            &self.controller,
            self.camera.position,
            self.camera.yaw,
            self.camera.pitch,
        )
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.controller.is_engaged() {
            egui::Area::new(egui::Id::new("engage_prompt"))
                .interactable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.heading("Click to look around");
                            ui.label("WASD / arrows: move   Shift: sprint   Space: jump");
                            ui.label("Esc: release mouse   F1: debug overlay");
                        });
                    });
                });
        }

        if !self.show_debug {
            return;
        }

        let view = self.frame_view();
        egui::Window::new("debug")
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(8.0, 8.0))
            .resizable(false)
            .collapsible(false)
            .title_bar(false)
            .show(ctx, |ui| {
                let p = view.position;
                let v = view.velocity;
                ui.label(format!("Frame: {}  Steps: {}", view.frame, self.last_tick.steps));
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!("Velocity: ({:.2}, {:.2}, {:.2})", v.x, v.y, v.z));
                ui.label(format!("Lateral speed: {:.2}", view.lateral_speed()));
                ui.label(format!(
                    "Yaw: {:.1}°  Pitch: {:.1}°",
                    view.yaw.to_degrees(),
                    view.pitch.to_degrees()
                ));
                ui.label(if view.grounded { "Grounded" } else { "Airborne" });
                if self.last_tick.dropped > 0.0 {
                    ui.label(format!("Dropped: {:.3}s", self.last_tick.dropped));
                }
            });
    }
}

/// Everything that exists only once a window and device are up.
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
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext, config: &Config) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.window.title.clone())
            .with_inner_size(PhysicalSize::new(config.window.width, config.window.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("skywalk_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            surface_config.width,
            surface_config.height,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config: surface_config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Lock the cursor for mouse-look, falling back to confining it where
    /// the platform cannot lock.
    fn grab_cursor(&self) -> bool {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                true
            }
            Err(e) => {
                tracing::warn!("pointer lock unavailable: {e}");
                false
            }
        }
    }

    fn release_cursor(&self) {
        if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("failed to release cursor: {e}");
        }
        self.window.set_cursor_visible(true);
    }

    fn render(&mut self, egui_ctx: &EguiContext, state: &AppState) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
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

        self.renderer
            .render(&self.device, &self.queue, &view, &state.camera);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn engage(&mut self) {
        if self.state.controller.is_engaged() {
            return;
        }
        if let Some(gpu) = &self.gpu {
            if gpu.grab_cursor() {
                self.state.controller.engage();
            }
        }
    }

    fn disengage(&mut self) {
        if self.state.controller.disengage() {
            if let Some(gpu) = &self.gpu {
                gpu.release_cursor();
            }
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, &self.state.config) {
            Ok(gpu) => {
                self.state.camera.set_viewport(gpu.viewport());
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                self.state.frame_loop.token().cancel();
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
            // While looking around the HUD is passive; input belongs to the viewer.
            if response.consumed && !self.state.controller.is_engaged() {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.frame_loop.token().cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.state.camera.set_viewport(gpu.viewport());
                }
            }
            WindowEvent::Focused(false) => {
                // Key-up events are lost while unfocused.
                self.state.controller.release_all();
                self.disengage();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if pressed && code == KeyCode::Escape {
                    self.disengage();
                }
                self.state.handle_key(code, pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                self.engage();
            }
            WindowEvent::RedrawRequested => {
                if self.state.frame_loop.is_cancelled() {
                    return;
                }
                self.state.update();
                if let Some(gpu) = &mut self.gpu {
                    gpu.render(&self.egui_ctx, &self.state);
                    gpu.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.controller.is_engaged() {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.frame_loop.is_cancelled() {
            event_loop.exit();
            return;
        }
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    let timestep = match cli.fixed_step {
        Some(step) if step > 0.0 => Timestep::Fixed {
            step,
            max_substeps: 8,
        },
        Some(step) => anyhow::bail!("--fixed-step must be positive, got {step}"),
        None => Timestep::Variable {
            max_dt: config.movement.max_step,
        },
    };

    tracing::info!(?timestep, "skywalk-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(config, timestep));
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_map_to_input_keys() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::KeyW));
        assert_eq!(map_key(KeyCode::ShiftRight), Some(Key::ShiftRight));
        assert_eq!(map_key(KeyCode::Space), Some(Key::Space));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn mapped_keys_match_platform_codes() {
        for code in [KeyCode::KeyA, KeyCode::ArrowLeft, KeyCode::Escape] {
            let key = map_key(code).expect("mapped");
            assert_eq!(key.code(), format!("{code:?}"));
        }
    }

    #[test]
    fn app_state_starts_paused_at_ground_height() {
        let mut state = AppState::new(Config::default(), Timestep::default());
        assert_eq!(state.camera.position.y, 2.0);
        state.handle_key(KeyCode::KeyW, true);
        state.update();
        assert_eq!(state.camera.position, Vec3::new(0.0, 2.0, 0.0));
        assert!(state.frame_view().flags.forward);
    }

    #[test]
    fn f1_toggles_debug_overlay() {
        let mut state = AppState::new(Config::default(), Timestep::default());
        state.handle_key(KeyCode::F1, true);
        assert!(state.show_debug);
        state.handle_key(KeyCode::F1, false);
        assert!(state.show_debug);
    }
}
