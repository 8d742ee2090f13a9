use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

use crate::config::{Configuration, ViewState};
use crate::driver::{Pipeline, TickOutcome};
use crate::kernels::{FilterKind, UpscalerKind};
use crate::source::{FrameSource, TestPatternSource, TimingStandard};

/// Run the display pipeline against the built-in test-pattern source.
///
/// # Errors
/// Returns an error if the rendering backend fails to initialize or the
/// event loop cannot be created.
pub fn run(cfg: Configuration) -> Result<()> {
    info!(
        upscaler = %cfg.upscaler,
        filter = %cfg.filter,
        standard = %cfg.timing_standard,
        "starting display pipeline"
    );
    let event_loop = EventLoop::new()?;
    let mut app = App::new(cfg);
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct Gpu {
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    _adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

struct App {
    cfg: Configuration,
    view: ViewState,
    source: TestPatternSource,

    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    pipeline: Option<Pipeline>,
}

impl App {
    fn new(cfg: Configuration) -> Self {
        let view = cfg.initial_view_state();
        let source = TestPatternSource::new(cfg.timing_standard);
        Self {
            cfg,
            view,
            source,
            window: None,
            gpu: None,
            pipeline: None,
        }
    }

    fn load_background(&self) -> Option<image::RgbaImage> {
        let path = self.cfg.background_image.as_ref()?;
        match image::open(path) {
            Ok(img) => Some(img.to_rgba8()),
            Err(err) => {
                warn!(%err, path = %path.display(), "background image unreadable, using fallback");
                None
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // ----- window -----
        let attrs = WindowAttributes::default().with_title("retro-frame");
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));
        if self.view.fullscreen {
            window.set_fullscreen(Some(Fullscreen::Borderless(window.current_monitor())));
        }
        self.window = Some(window.clone());

        // ----- GPU init -----
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let gpu_init = async move {
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .context("no compatible GPU adapter found")?;

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    ..Default::default()
                })
                .await?;

            let caps = surface.get_capabilities(&adapter);
            let format = caps
                .formats
                .iter()
                .copied()
                .find(|f| !f.is_srgb())
                .unwrap_or(caps.formats[0]);
            let PhysicalSize { width, height } = window.inner_size();
            let config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: width.max(1),
                height: height.max(1),
                present_mode: wgpu::PresentMode::AutoVsync,
                alpha_mode: caps.alpha_modes[0],
                view_formats: vec![],
                desired_maximum_frame_latency: 1,
            };
            surface.configure(&device, &config);

            Ok::<Gpu, anyhow::Error>(Gpu {
                _instance: instance,
                surface,
                _adapter: adapter,
                device,
                queue,
                config,
            })
        };
        let gpu = pollster::block_on(gpu_init).expect("GPU init");

        let pipeline = Pipeline::new(
            gpu.device.clone(),
            gpu.queue.clone(),
            gpu.config.format,
            self.load_background(),
            self.cfg.timing_standard,
            (gpu.config.width, gpu.config.height),
        )
        .expect("pipeline init");

        self.gpu = Some(gpu);
        self.pipeline = Some(pipeline);
    }

    fn window_event(&mut self, _el: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(win) = &self.window else { return };
        if win.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => std::process::exit(0),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Released {
                    use winit::keyboard::PhysicalKey;
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.on_key(code);
                    }
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width > 0 && height > 0 {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.config.width = width;
                        gpu.config.height = height;
                        gpu.surface.configure(&gpu.device, &gpu.config);
                    }
                    if let Some(pipeline) = &mut self.pipeline {
                        pipeline.mark_resized(width, height);
                    }
                }
            }
            WindowEvent::RedrawRequested => self.draw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _el: &ActiveEventLoop) {
        if let Some(win) = &self.window {
            win.request_redraw();
        }
    }
}

impl App {
    fn draw(&mut self) {
        let (Some(gpu), Some(pipeline)) = (&self.gpu, &mut self.pipeline) else {
            return;
        };
        self.source.refresh();
        match pipeline.tick(&self.source, &gpu.surface, &self.view) {
            Ok(TickOutcome::Rendered) | Ok(TickOutcome::SkippedNoSurface) => {}
            Ok(TickOutcome::SkippedNoFrame) => {
                // Source warming up; next tick will have a frame.
            }
            Err(err) => warn!(%err, "tick failed"),
        }
    }

    fn on_key(&mut self, code: winit::keyboard::KeyCode) {
        use winit::keyboard::KeyCode;
        let Some(pipeline) = &mut self.pipeline else {
            return;
        };
        match code {
            KeyCode::Escape | KeyCode::KeyQ => std::process::exit(0),
            KeyCode::KeyU => {
                self.view.upscaler = next_of(UpscalerKind::ALL, self.view.upscaler);
                info!(upscaler = %self.view.upscaler, "selected upscaler");
            }
            KeyCode::KeyF => {
                self.view.filter = next_of(FilterKind::ALL, self.view.filter);
                info!(filter = %self.view.filter, "selected filter");
            }
            KeyCode::KeyA => self.view.keep_aspect_ratio = !self.view.keep_aspect_ratio,
            KeyCode::KeyD => self.view.show_emulated_display = !self.view.show_emulated_display,
            KeyCode::Space => {
                let halted = !self.source.is_halted();
                self.source.set_halted(halted);
                info!(halted, "machine halt toggled");
            }
            KeyCode::KeyT => {
                let standard = match self.source.timing_standard() {
                    TimingStandard::Pal => TimingStandard::Ntsc,
                    TimingStandard::Ntsc => TimingStandard::Pal,
                };
                self.source.set_timing_standard(standard);
                info!(%standard, "timing standard toggled");
            }
            KeyCode::Enter | KeyCode::F11 => {
                self.view.fullscreen = !self.view.fullscreen;
                if let Some(win) = &self.window {
                    let mode = self
                        .view
                        .fullscreen
                        .then(|| Fullscreen::Borderless(win.current_monitor()));
                    win.set_fullscreen(mode);
                }
            }
            KeyCode::KeyZ => log_transition(pipeline.animation_mut().zoom()),
            KeyCode::KeyR => log_transition(pipeline.animation_mut().rotate()),
            KeyCode::KeyI => log_transition(pipeline.animation_mut().fade_in()),
            KeyCode::KeyS => pipeline.animation_mut().snap_to_front(),
            _ => {}
        }
    }
}

fn next_of<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let idx = all.iter().position(|k| *k == current).unwrap_or(0);
    all[(idx + 1) % all.len()]
}

fn log_transition(result: Result<(), crate::error::Error>) {
    if let Err(err) = result {
        warn!(%err, "transition rejected");
    }
}
