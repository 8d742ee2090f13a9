//! Per-frame pipeline driver.
//!
//! One `tick` per vertical sync: gate on the frame pacer, refresh
//! size-dependent state, upload the latest raw frame, advance transitions,
//! then encode upscale -> filter -> scene and present. Every failure is
//! contained within its tick; the pacer token is always free again at the
//! tick boundary unless a frame is genuinely in flight.

use tracing::{debug, trace};

use crate::animation::AnimationState;
use crate::config::ViewState;
use crate::error::Error;
use crate::geometry::{Transforms, VisibleRegion};
use crate::kernels::KernelStage;
use crate::pacer::FramePacer;
use crate::scene::{SceneComposer, plan_scene};
use crate::source::{FrameSource, TimingStandard};
use crate::textures::TextureStage;

/// How a tick ended. Skips are expected degraded outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Work was submitted and the drawable presented.
    Rendered,
    /// No drawable available; nothing was composed or encoded.
    SkippedNoSurface,
    /// The frame source had no frame; nothing was submitted.
    SkippedNoFrame,
}

pub struct Pipeline {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: TextureStage,
    kernels: KernelStage,
    composer: SceneComposer,
    animation: AnimationState,
    pacer: FramePacer,
    transforms: Transforms,
    region: VisibleRegion,
    standard: TimingStandard,
    drawable_size: (u32, u32),
    size_dirty: bool,
    frames: u64,
}

impl Pipeline {
    /// Build the full pipeline. Kernel construction validates the mandatory
    /// bypass kernels before the first tick can run.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        background: Option<image::RgbaImage>,
        standard: TimingStandard,
        drawable_size: (u32, u32),
    ) -> Result<Self, Error> {
        let textures = TextureStage::new(&device, &queue, background);
        let kernels = KernelStage::new(&device)?;
        let region = VisibleRegion::for_standard(standard);
        let composer = SceneComposer::new(&device, surface_format, &textures, &region);
        let mut animation = AnimationState::powered_on();
        animation.zoom()?;
        let transforms = Transforms::build(drawable_size.0, drawable_size.1, &animation.pose());
        Ok(Self {
            device,
            queue,
            textures,
            kernels,
            composer,
            animation,
            pacer: FramePacer::new(),
            transforms,
            region,
            standard,
            drawable_size,
            size_dirty: true,
            frames: 0,
        })
    }

    /// Note a drawable-size change; resources are refreshed lazily on the
    /// next tick.
    pub fn mark_resized(&mut self, width: u32, height: u32) {
        if (width, height) != self.drawable_size {
            self.drawable_size = (width, height);
            self.size_dirty = true;
        }
    }

    pub fn animation_mut(&mut self) -> &mut AnimationState {
        &mut self.animation
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// Frames presented since startup.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one tick against the given source, surface and host snapshot.
    ///
    /// # Errors
    /// Per-tick errors only; the caller logs them and carries on. The pacer
    /// token is released on every non-rendering path.
    pub fn tick(
        &mut self,
        source: &dyn FrameSource,
        surface: &wgpu::Surface<'_>,
        view: &ViewState,
    ) -> Result<TickOutcome, Error> {
        // Block until the previous frame's present has completed. The wait
        // loop drives device.poll so the completion callback can fire even
        // when nothing else polls this device.
        while !self.pacer.try_acquire() {
            let _ = self.device.poll(wgpu::PollType::Wait);
        }

        match self.tick_acquired(source, surface, view) {
            Ok(TickOutcome::Rendered) => Ok(TickOutcome::Rendered),
            Ok(skipped) => {
                // Nothing was submitted, so no completion callback will ever
                // release the token. Free it here.
                self.pacer.release();
                Ok(skipped)
            }
            Err(Error::SurfaceUnavailable) => {
                // Expected transient condition, skipped silently.
                self.pacer.release();
                Ok(TickOutcome::SkippedNoSurface)
            }
            Err(err) => {
                // Fallback release so a failed tick cannot wedge the gate.
                self.pacer.release();
                Err(err)
            }
        }
    }

    fn tick_acquired(
        &mut self,
        source: &dyn FrameSource,
        surface: &wgpu::Surface<'_>,
        view: &ViewState,
    ) -> Result<TickOutcome, Error> {
        let Ok(frame) = surface.get_current_texture() else {
            trace!("no drawable this tick");
            return Err(Error::SurfaceUnavailable);
        };

        // Refresh size-dependent resources.
        if self.size_dirty {
            let (w, h) = self.drawable_size;
            self.textures.ensure_capacity(&self.device, w, h);
            self.transforms = Transforms::build(w, h, &self.animation.pose());
            self.size_dirty = false;
        }

        // Recompute the visible region only on a timing-standard change.
        let standard = source.timing_standard();
        if standard != self.standard {
            debug!(%standard, "timing standard changed");
            self.standard = standard;
            self.region = VisibleRegion::for_standard(standard);
            self.composer.rebuild_vertices(&self.queue, &self.region);
        }

        // Missing frame: nothing to show, release without submitting.
        if let Err(err) = self.textures.update_input(&self.queue, source.current_frame()) {
            trace!(%err, "skipping tick");
            return Ok(TickOutcome::SkippedNoFrame);
        }

        let animating = !self.animation.is_settled();
        if animating {
            self.animation.tick();
            let (w, h) = self.drawable_size;
            self.transforms = Transforms::build(w, h, &self.animation.pose());
        }

        let plan = plan_scene(view, source.is_halted(), animating, self.animation.alpha());
        self.composer
            .update_uniforms(&self.queue, &self.transforms, plan.alpha);

        self.kernels.select_upscaler(view.upscaler);
        self.kernels.select_filter(view.filter);

        let depth = self
            .textures
            .depth_view()
            .ok_or_else(|| Error::Resource("depth buffer not allocated".into()))?
            .clone();
        let drawable_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tick"),
            });
        self.kernels.encode_post_process(
            &self.device,
            &mut encoder,
            self.textures.input_view(),
            self.textures.upscaled_view(),
            self.textures.filtered_view(),
        );
        self.composer.encode(&mut encoder, &drawable_view, &depth, &plan);

        self.queue.submit([encoder.finish()]);

        // The completion callback may run on any thread; the pacer clone
        // makes the release safe from wherever it lands.
        let pacer = self.pacer.clone();
        self.queue.on_submitted_work_done(move || pacer.release());

        frame.present();
        self.frames += 1;
        Ok(TickOutcome::Rendered)
    }
}
