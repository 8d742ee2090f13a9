//! GPU-resident image storage for the pipeline.
//!
//! Five textures stay live across frames: the raw input (written once per
//! tick), the upscaled and filtered intermediates (always exactly 2x the
//! input's linear dimensions), the background plane image, and the depth
//! buffer. Only the depth buffer depends on the drawable size and is the
//! only one ever reallocated after startup.

use image::RgbaImage;
use tracing::debug;

use crate::error::Error;
use crate::geometry::{TEXTURE_SIZE, UPSCALED_SIZE};
use crate::source::{BYTES_PER_PIXEL, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH};

/// Tracks the allocated drawable-dependent size and counts reallocations.
/// Pure bookkeeping, separated out so idempotence is testable without a GPU.
#[derive(Debug, Default)]
pub struct CapacityTracker {
    allocated: Option<(u32, u32)>,
    reallocs: u64,
}

impl CapacityTracker {
    /// Record a capacity request. Returns true when a reallocation is needed
    /// (and counts it); identical repeat requests are no-ops.
    pub fn request(&mut self, width: u32, height: u32) -> bool {
        if self.allocated == Some((width, height)) {
            return false;
        }
        self.allocated = Some((width, height));
        self.reallocs += 1;
        true
    }

    pub fn reallocations(&self) -> u64 {
        self.reallocs
    }

    pub fn allocated(&self) -> Option<(u32, u32)> {
        self.allocated
    }
}

/// The five live textures plus the shared sampler.
pub struct TextureStage {
    input: wgpu::Texture,
    input_view: wgpu::TextureView,
    upscaled_view: wgpu::TextureView,
    filtered: wgpu::Texture,
    filtered_view: wgpu::TextureView,
    background_view: wgpu::TextureView,
    depth_view: Option<wgpu::TextureView>,
    sampler: wgpu::Sampler,
    capacity: CapacityTracker,
}

impl TextureStage {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, background: Option<RgbaImage>) -> Self {
        let input = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("input"),
            size: square(TEXTURE_SIZE),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let upscaled = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("upscaled"),
            size: square(UPSCALED_SIZE),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::STORAGE_BINDING,
            view_formats: &[],
        });
        let filtered = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("filtered"),
            size: square(UPSCALED_SIZE),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let bg = background.unwrap_or_else(default_background);
        let background_tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("background"),
            size: wgpu::Extent3d {
                width: bg.width(),
                height: bg.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            background_tex.as_image_copy(),
            bg.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * bg.width()),
                rows_per_image: Some(bg.height()),
            },
            wgpu::Extent3d {
                width: bg.width(),
                height: bg.height(),
                depth_or_array_layers: 1,
            },
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            input_view: input.create_view(&wgpu::TextureViewDescriptor::default()),
            input,
            upscaled_view: upscaled.create_view(&wgpu::TextureViewDescriptor::default()),
            filtered_view: filtered.create_view(&wgpu::TextureViewDescriptor::default()),
            filtered,
            background_view: background_tex.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: None,
            sampler,
            capacity: CapacityTracker::default(),
        }
    }

    /// Make the drawable-size-dependent resources match `width` x `height`.
    /// Idempotent: a repeat request with the current size does nothing.
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if !self.capacity.request(width, height) {
            return;
        }
        debug!(width, height, "reallocating depth buffer");
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        self.depth_view = Some(depth.create_view(&wgpu::TextureViewDescriptor::default()));
    }

    /// Copy one raw frame snapshot into the input texture at fixed stride.
    ///
    /// # Errors
    /// [`Error::Resource`] when no frame is available (source not attached or
    /// not producing yet). The caller treats this as a soft skip.
    pub fn update_input(&self, queue: &wgpu::Queue, frame: Option<&[u8]>) -> Result<(), Error> {
        let frame = frame.ok_or_else(|| Error::Resource("no raw frame available".into()))?;
        if frame.len() != FRAME_BYTES {
            return Err(Error::Resource(format!(
                "raw frame has {} bytes, expected {FRAME_BYTES}",
                frame.len()
            )));
        }
        queue.write_texture(
            self.input.as_image_copy(),
            frame,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some((FRAME_WIDTH * BYTES_PER_PIXEL) as u32),
                rows_per_image: Some(FRAME_HEIGHT as u32),
            },
            wgpu::Extent3d {
                width: FRAME_WIDTH as u32,
                height: FRAME_HEIGHT as u32,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    pub fn input_view(&self) -> &wgpu::TextureView {
        &self.input_view
    }

    pub fn upscaled_view(&self) -> &wgpu::TextureView {
        &self.upscaled_view
    }

    pub fn filtered_view(&self) -> &wgpu::TextureView {
        &self.filtered_view
    }

    pub fn background_view(&self) -> &wgpu::TextureView {
        &self.background_view
    }

    /// Depth attachment view; present after the first `ensure_capacity`.
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth_view.as_ref()
    }

    pub fn input_texture(&self) -> &wgpu::Texture {
        &self.input
    }

    pub fn filtered_texture(&self) -> &wgpu::Texture {
        &self.filtered
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn reallocations(&self) -> u64 {
        self.capacity.reallocations()
    }
}

/// Fallback background: a dim vertical gradient.
fn default_background() -> RgbaImage {
    RgbaImage::from_fn(256, 256, |_, y| {
        let shade = 40 + (y / 4) as u8;
        image::Rgba([shade / 2, shade / 2, shade, 255])
    })
}

fn square(side: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: side,
        height: side,
        depth_or_array_layers: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::CapacityTracker;

    #[test]
    fn repeat_request_with_same_size_does_not_reallocate() {
        let mut tracker = CapacityTracker::default();
        assert!(tracker.request(800, 600));
        assert_eq!(tracker.reallocations(), 1);
        assert!(!tracker.request(800, 600));
        assert_eq!(tracker.reallocations(), 1);
    }

    #[test]
    fn size_change_reallocates_once_per_change() {
        let mut tracker = CapacityTracker::default();
        tracker.request(800, 600);
        assert!(tracker.request(1024, 768));
        assert_eq!(tracker.reallocations(), 2);
        assert_eq!(tracker.allocated(), Some((1024, 768)));
    }
}
