//! Image-transform kernels: two ordered compute stages.
//!
//! The upscaler doubles the input texture's linear dimensions; the filter
//! applies a cosmetic post-process at the upscaled size. Exactly one kernel
//! per stage is active at a time, and a bypass kernel always exists as the
//! fallback for a selector with nothing registered, so resolution can never
//! fail at runtime.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::de::{self, Deserializer};

use crate::error::Error;
use crate::geometry::UPSCALED_SIZE;

const WORKGROUP: u32 = 8;

/// First-stage selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UpscalerKind {
    /// Plain pixel doubling.
    Bypass,
    /// Edge-preserving 2x (EPX).
    Epx,
    /// Pattern-matching 2x (xBR-style).
    Xbr,
}

impl UpscalerKind {
    pub const ALL: &'static [Self] = &[Self::Bypass, Self::Epx, Self::Xbr];
    const NAMES: &'static [&'static str] = &["bypass", "epx", "xbr"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::Epx => "epx",
            Self::Xbr => "xbr",
        }
    }
}

impl fmt::Display for UpscalerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UpscalerKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        for kind in Self::ALL {
            if raw == kind.as_str() {
                return Ok(*kind);
            }
        }
        Err(de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// Second-stage selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterKind {
    Bypass,
    Smooth,
    Blur,
    Saturation,
    Grayscale,
    Sepia,
    /// Scanline/CRT emulation.
    Crt,
}

impl FilterKind {
    pub const ALL: &'static [Self] = &[
        Self::Bypass,
        Self::Smooth,
        Self::Blur,
        Self::Saturation,
        Self::Grayscale,
        Self::Sepia,
        Self::Crt,
    ];
    const NAMES: &'static [&'static str] = &[
        "bypass",
        "smooth",
        "blur",
        "saturation",
        "grayscale",
        "sepia",
        "crt",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bypass => "bypass",
            Self::Smooth => "smooth",
            Self::Blur => "blur",
            Self::Saturation => "saturation",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Crt => "crt",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        for kind in Self::ALL {
            if raw == kind.as_str() {
                return Ok(*kind);
            }
        }
        Err(de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// Selector-to-kernel mapping with a mandatory bypass fallback.
///
/// The bypass kernel is an owned field, not a map entry: a set without one
/// cannot be constructed, which is what makes [`KernelSet::resolve`]
/// infallible.
#[derive(Debug)]
pub struct KernelSet<S, T> {
    bypass: T,
    kernels: BTreeMap<S, T>,
}

impl<S: Ord + Copy, T> KernelSet<S, T> {
    pub fn new(bypass: T) -> Self {
        Self {
            bypass,
            kernels: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, kind: S, kernel: T) {
        self.kernels.insert(kind, kernel);
    }

    /// Resolve a selector to its kernel, falling back to bypass when nothing
    /// is registered under it. Never fails.
    pub fn resolve(&self, kind: S) -> &T {
        self.kernels.get(&kind).unwrap_or(&self.bypass)
    }

    pub fn bypass(&self) -> &T {
        &self.bypass
    }
}

/// One compute pass over a 2D image.
pub struct ComputeKernel {
    label: &'static str,
    pipeline: wgpu::ComputePipeline,
    bind_layout: wgpu::BindGroupLayout,
}

impl ComputeKernel {
    fn new(
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        bind_layout: &wgpu::BindGroupLayout,
        entry_point: &'static str,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(entry_point),
            bind_group_layouts: &[bind_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(entry_point),
            layout: Some(&pipeline_layout),
            module,
            entry_point: Some(entry_point),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });
        Self {
            label: entry_point,
            pipeline,
            bind_layout: bind_layout.clone(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Append this kernel as a compute pass to the in-progress encoder.
    /// Nothing executes until the command buffer is submitted.
    pub fn dispatch(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        source: &wgpu::TextureView,
        target: &wgpu::TextureView,
        target_size: (u32, u32),
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout: &self.bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(target),
                },
            ],
        });
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(self.label),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(
            target_size.0.div_ceil(WORKGROUP),
            target_size.1.div_ceil(WORKGROUP),
            1,
        );
    }
}

/// Both kernel stages plus the active selector for each.
pub struct KernelStage {
    upscalers: KernelSet<UpscalerKind, ComputeKernel>,
    filters: KernelSet<FilterKind, ComputeKernel>,
    selected_upscaler: UpscalerKind,
    selected_filter: FilterKind,
}

impl KernelStage {
    /// Build every kernel up front. The bypass kernels are compiled first so
    /// a broken fallback shader fails startup, not some later tick.
    pub fn new(device: &wgpu::Device) -> Result<Self, Error> {
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kernel_bind_layout"),
            entries: &[
                // @binding(0) source image
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // @binding(1) target image
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let upscale_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("upscale"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("render/shaders/upscale.wgsl").into(),
            ),
        });
        let filter_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("filter"),
            source: wgpu::ShaderSource::Wgsl(include_str!("render/shaders/filter.wgsl").into()),
        });

        let mut upscalers = KernelSet::new(ComputeKernel::new(
            device,
            &upscale_module,
            &bind_layout,
            "upscale_bypass",
        ));
        upscalers.register(
            UpscalerKind::Epx,
            ComputeKernel::new(device, &upscale_module, &bind_layout, "upscale_epx"),
        );
        upscalers.register(
            UpscalerKind::Xbr,
            ComputeKernel::new(device, &upscale_module, &bind_layout, "upscale_xbr"),
        );

        let mut filters = KernelSet::new(ComputeKernel::new(
            device,
            &filter_module,
            &bind_layout,
            "filter_bypass",
        ));
        for (kind, entry) in [
            (FilterKind::Smooth, "filter_smooth"),
            (FilterKind::Blur, "filter_blur"),
            (FilterKind::Saturation, "filter_saturation"),
            (FilterKind::Grayscale, "filter_grayscale"),
            (FilterKind::Sepia, "filter_sepia"),
            (FilterKind::Crt, "filter_crt"),
        ] {
            filters.register(kind, ComputeKernel::new(device, &filter_module, &bind_layout, entry));
        }

        Ok(Self {
            upscalers,
            filters,
            selected_upscaler: UpscalerKind::Bypass,
            selected_filter: FilterKind::Bypass,
        })
    }

    pub fn select_upscaler(&mut self, kind: UpscalerKind) {
        self.selected_upscaler = kind;
    }

    pub fn select_filter(&mut self, kind: FilterKind) {
        self.selected_filter = kind;
    }

    pub fn active_upscaler(&self) -> &ComputeKernel {
        self.upscalers.resolve(self.selected_upscaler)
    }

    pub fn active_filter(&self) -> &ComputeKernel {
        self.filters.resolve(self.selected_filter)
    }

    /// Encode both post-processing stages in order: the upscaler consumes the
    /// raw input texture, the filter consumes the upscaler's output. The
    /// filter never reads the raw input directly.
    pub fn encode_post_process(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        upscaled: &wgpu::TextureView,
        filtered: &wgpu::TextureView,
    ) {
        let size = (UPSCALED_SIZE, UPSCALED_SIZE);
        self.active_upscaler()
            .dispatch(device, encoder, input, upscaled, size);
        self.active_filter()
            .dispatch(device, encoder, upscaled, filtered, size);
    }
}
