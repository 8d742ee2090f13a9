//! Scene planning and command encoding.
//!
//! Planning is pure: [`plan_scene`] turns the tick's view-state snapshot into
//! an ordered list of draws. Encoding walks that plan and records one render
//! pass against the next drawable.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::config::ViewState;
use crate::geometry::{Transforms, VisibleRegion};
use crate::textures::TextureStage;

/// Opacity forced onto the display for frames where the emulator is halted.
/// Frame-local: stored animation state is never written through this.
pub const HALTED_ALPHA: f32 = 0.5;

/// How the frame is presented this tick. Recomputed from the snapshot every
/// tick, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    /// Full-screen quad, aspect ratio ignored.
    Flat2D,
    /// Cuboid (optionally mid-transition) over a background plane.
    Animated3D,
}

impl PresentationMode {
    /// Flat 2D only when fullscreen with aspect preservation off.
    pub fn select(view: &ViewState) -> Self {
        if view.fullscreen && !view.keep_aspect_ratio {
            Self::Flat2D
        } else {
            Self::Animated3D
        }
    }
}

/// What a single draw samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawSurface {
    Background,
    Display,
}

/// One draw call: which texture, and which vertices of the shared buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub surface: DrawSurface,
    pub vertices: Range<u32>,
}

/// One frame's presentation decisions, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePlan {
    pub mode: PresentationMode,
    pub alpha: f32,
    pub draws: Vec<Draw>,
}

// Shared vertex buffer layout.
const BACKGROUND_QUAD: Range<u32> = 0..6;
const CUBOID_FRONT: Range<u32> = 6..12;
const CUBOID_ALL: Range<u32> = 6..30;
const FLAT_QUAD: Range<u32> = 30..36;
const VERTEX_COUNT: usize = 36;

/// Decide this tick's draws from the host snapshot and emulator state.
///
/// In 3D mode the background plane is drawn when not fullscreen and either a
/// transition is in motion or the emulated display is hidden; it always comes
/// before the cuboid so the cuboid composites on top. A settled cuboid draws
/// its front face only; a moving one draws all faces.
pub fn plan_scene(
    view: &ViewState,
    halted: bool,
    animating: bool,
    stored_alpha: f32,
) -> ScenePlan {
    let mode = PresentationMode::select(view);
    match mode {
        PresentationMode::Flat2D => ScenePlan {
            mode,
            alpha: 1.0,
            draws: vec![Draw {
                surface: DrawSurface::Display,
                vertices: FLAT_QUAD,
            }],
        },
        PresentationMode::Animated3D => {
            let draw_background =
                !view.fullscreen && (animating || !view.show_emulated_display);
            let alpha = if halted { HALTED_ALPHA } else { stored_alpha };
            let mut draws = Vec::with_capacity(2);
            if draw_background {
                draws.push(Draw {
                    surface: DrawSurface::Background,
                    vertices: BACKGROUND_QUAD,
                });
            }
            if view.show_emulated_display {
                draws.push(Draw {
                    surface: DrawSurface::Display,
                    vertices: if animating { CUBOID_ALL } else { CUBOID_FRONT },
                });
            }
            ScenePlan { mode, alpha, draws }
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    pos: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    mvp: [[f32; 4]; 4],
    alpha: f32,
    _pad: [f32; 3],
}

fn quad(corners: [[f32; 3]; 4], uv_min: (f32, f32), uv_max: (f32, f32)) -> [Vertex; 6] {
    // corners: bottom-left, bottom-right, top-right, top-left
    let [bl, br, tr, tl] = corners;
    let v = |pos: [f32; 3], u: f32, vv: f32| Vertex { pos, uv: [u, vv] };
    [
        v(bl, uv_min.0, uv_max.1),
        v(br, uv_max.0, uv_max.1),
        v(tr, uv_max.0, uv_min.1),
        v(bl, uv_min.0, uv_max.1),
        v(tr, uv_max.0, uv_min.1),
        v(tl, uv_min.0, uv_min.1),
    ]
}

/// Rebuild the shared vertex data for a visible region. Layout:
/// background quad, cuboid faces (front first), flat 2D quad.
fn build_vertices(region: &VisibleRegion) -> Vec<Vertex> {
    let (hx, hy, hz) = (0.64_f32, 0.4_f32, 0.64_f32);
    let uv_min = (region.x, region.y);
    let uv_max = (region.max_x(), region.max_y());

    let mut verts = Vec::with_capacity(VERTEX_COUNT);
    // Background plane: unit quad, full texture.
    verts.extend(quad(
        [
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0],
        ],
        (0.0, 0.0),
        (1.0, 1.0),
    ));
    // Cuboid: front, right, back, left.
    verts.extend(quad(
        [[-hx, -hy, hz], [hx, -hy, hz], [hx, hy, hz], [-hx, hy, hz]],
        uv_min,
        uv_max,
    ));
    verts.extend(quad(
        [[hx, -hy, hz], [hx, -hy, -hz], [hx, hy, -hz], [hx, hy, hz]],
        uv_min,
        uv_max,
    ));
    verts.extend(quad(
        [[hx, -hy, -hz], [-hx, -hy, -hz], [-hx, hy, -hz], [hx, hy, -hz]],
        uv_min,
        uv_max,
    ));
    verts.extend(quad(
        [[-hx, -hy, -hz], [-hx, -hy, hz], [-hx, hy, hz], [-hx, hy, -hz]],
        uv_min,
        uv_max,
    ));
    // Flat 2D quad in clip space.
    verts.extend(quad(
        [
            [-1.0, -1.0, 0.0],
            [1.0, -1.0, 0.0],
            [1.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0],
        ],
        uv_min,
        uv_max,
    ));
    debug_assert_eq!(verts.len(), VERTEX_COUNT);
    verts
}

/// GPU side of the scene: pipeline, vertex buffer, per-path uniforms and bind
/// groups.
pub struct SceneComposer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    background_uniforms: wgpu::Buffer,
    cuboid_uniforms: wgpu::Buffer,
    flat_uniforms: wgpu::Buffer,
    background_bind: wgpu::BindGroup,
    cuboid_bind: wgpu::BindGroup,
    flat_bind: wgpu::BindGroup,
}

impl SceneComposer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        textures: &TextureStage,
        region: &VisibleRegion,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene"),
            source: wgpu::ShaderSource::Wgsl(include_str!("render/shaders/scene.wgsl").into()),
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let uniform = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<Uniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let background_uniforms = uniform("bg_uniforms");
        let cuboid_uniforms = uniform("cuboid_uniforms");
        let flat_uniforms = uniform("flat_uniforms");

        let bind = |label: &str, view: &wgpu::TextureView, uniforms: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(textures.sampler()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: uniforms.as_entire_binding(),
                    },
                ],
            })
        };
        let background_bind = bind(
            "bg_bind",
            textures.background_view(),
            &background_uniforms,
        );
        let cuboid_bind = bind("cuboid_bind", textures.filtered_view(), &cuboid_uniforms);
        let flat_bind = bind("flat_bind", textures.filtered_view(), &flat_uniforms);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_vertices"),
            contents: bytemuck::cast_slice(&build_vertices(region)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2],
        };

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_layout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            vertex_buffer,
            background_uniforms,
            cuboid_uniforms,
            flat_uniforms,
            background_bind,
            cuboid_bind,
            flat_bind,
        }
    }

    /// Overwrite the vertex buffer after a timing-standard change.
    pub fn rebuild_vertices(&self, queue: &wgpu::Queue, region: &VisibleRegion) {
        queue.write_buffer(
            &self.vertex_buffer,
            0,
            bytemuck::cast_slice(&build_vertices(region)),
        );
    }

    /// Push this tick's matrices and display opacity.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, transforms: &Transforms, alpha: f32) {
        let write = |buffer: &wgpu::Buffer, mvp: Mat4, alpha: f32| {
            let data = Uniforms {
                mvp: mvp.to_cols_array_2d(),
                alpha,
                _pad: [0.0; 3],
            };
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&data));
        };
        write(&self.background_uniforms, transforms.background, 1.0);
        write(&self.cuboid_uniforms, transforms.cuboid, alpha);
        write(&self.flat_uniforms, transforms.flat_2d, 1.0);
    }

    /// Record one render pass executing the plan: color cleared to opaque
    /// black, depth cleared to the far plane and discarded afterwards (depth
    /// is never read across frames).
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        drawable: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        plan: &ScenePlan,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: drawable,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        for draw in &plan.draws {
            let bind = match (draw.surface, plan.mode) {
                (DrawSurface::Background, _) => &self.background_bind,
                (DrawSurface::Display, PresentationMode::Flat2D) => &self.flat_bind,
                (DrawSurface::Display, PresentationMode::Animated3D) => &self.cuboid_bind,
            };
            pass.set_bind_group(0, bind, &[]);
            pass.draw(draw.vertices.clone(), 0..1);
        }
    }
}
