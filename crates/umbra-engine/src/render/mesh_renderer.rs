use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};

use super::frame::FramePlan;
use super::mesh::{DrawMesh, MeshData, MeshVertex};

/// Draws [`FramePlan`]s.
///
/// The pipeline is built lazily and rebuilt when the target formats change.
/// Vertex and index buffers are uploaded once per distinct `Rc<MeshData>`
/// and dropped once no one else holds the mesh. Per-draw transforms live in
/// one uniform buffer addressed with dynamic offsets.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_formats: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    uniform_ubo: Option<wgpu::Buffer>,
    uniform_capacity: usize,
    uniform_stride: u64,
    bind_group: Option<wgpu::BindGroup>,

    meshes: Vec<MeshBuffers>,

    warned_bad_transform: bool,
}

struct MeshBuffers {
    mesh: Rc<MeshData>,
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `plan` into `target` as a single render pass.
    ///
    /// The pass always runs so clears happen even without draws. Draws whose
    /// transform is not 4×4 are skipped (one-time warning).
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, plan: &FramePlan) {
        self.ensure_pipeline(ctx);
        self.meshes.retain(|m| Rc::strong_count(&m.mesh) > 1);

        let mut draws: Vec<(&DrawMesh, DrawUniform)> = Vec::with_capacity(plan.draws.len());
        for draw in &plan.draws {
            if draw.mesh.is_empty() {
                continue;
            }
            match DrawUniform::new(draw) {
                Some(u) => draws.push((draw, u)),
                None => {
                    if !self.warned_bad_transform {
                        log::warn!(
                            "MeshRenderer: skipping draw with {}x{} transform; 4x4 required",
                            draw.transform.dim(),
                            draw.transform.dim()
                        );
                        self.warned_bad_transform = true;
                    }
                }
            }
        }

        // Mutating setup before the immutable borrows below.
        for (draw, _) in &draws {
            self.ensure_mesh(ctx, &draw.mesh);
        }
        self.ensure_uniforms(ctx, draws.len());
        self.write_uniforms(ctx, &draws);

        let color_load = if plan.clear.color {
            wgpu::LoadOp::Clear(plan.clear_color.into())
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if plan.clear.depth {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("umbra mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if draws.is_empty() {
            return;
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        if let Some((x, y, w, h)) = clamp_viewport(plan, ctx.size) {
            rpass.set_viewport(x, y, w, h, 0.0, 1.0);
        }
        rpass.set_pipeline(pipeline);

        for (i, (draw, _)) in draws.iter().enumerate() {
            let Some(buffers) = self.meshes.iter().find(|m| Rc::ptr_eq(&m.mesh, &draw.mesh)) else {
                continue;
            };
            let offset = (i as u64 * self.uniform_stride) as u32;
            rpass.set_bind_group(0, bind_group, &[offset]);
            rpass.set_vertex_buffer(0, buffers.vbo.slice(..));
            rpass.set_index_buffer(buffers.ibo.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..buffers.index_count, 0, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let formats = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_formats == Some(formats) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("umbra mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("umbra mesh bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(DrawUniform::SIZE),
                },
                count: None,
            }],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("umbra mesh pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("umbra mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            // Winding depends on the caller's handedness; draw both faces.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::debug!("MeshRenderer: pipeline built for {:?}", formats);

        self.pipeline_formats = Some(formats);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.uniform_ubo = None;
        self.uniform_capacity = 0;
    }

    fn ensure_mesh(&mut self, ctx: &RenderCtx<'_>, mesh: &Rc<MeshData>) {
        if self.meshes.iter().any(|m| Rc::ptr_eq(&m.mesh, mesh)) {
            return;
        }

        let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("umbra mesh vbo"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // create_buffer_init pads odd u16 counts to the copy alignment.
        let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("umbra mesh ibo"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.meshes.push(MeshBuffers {
            mesh: mesh.clone(),
            vbo,
            ibo,
            index_count: mesh.indices().len() as u32,
        });
    }

    fn ensure_uniforms(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.uniform_capacity && self.uniform_ubo.is_some() && self.bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let align = u64::from(ctx.device.limits().min_uniform_buffer_offset_alignment).max(1);
        let stride = DrawUniform::SIZE.div_ceil(align) * align;
        let capacity = required.next_power_of_two().max(16);

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("umbra mesh draw ubo"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("umbra mesh bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: wgpu::BufferSize::new(DrawUniform::SIZE),
                }),
            }],
        });

        self.uniform_ubo = Some(ubo);
        self.bind_group = Some(bind_group);
        self.uniform_capacity = capacity;
        self.uniform_stride = stride;
    }

    fn write_uniforms(&self, ctx: &RenderCtx<'_>, draws: &[(&DrawMesh, DrawUniform)]) {
        if draws.is_empty() {
            return;
        }
        let Some(ubo) = self.uniform_ubo.as_ref() else { return };

        let stride = self.uniform_stride as usize;
        let mut bytes = vec![0u8; stride * draws.len()];
        for (i, (_, u)) in draws.iter().enumerate() {
            let start = i * stride;
            bytes[start..start + DrawUniform::SIZE as usize].copy_from_slice(bytemuck::bytes_of(u));
        }
        ctx.queue.write_buffer(ubo, 0, &bytes);
    }
}

/// Viewport from `plan` clamped to the target, as wgpu wants it.
fn clamp_viewport(plan: &FramePlan, (tw, th): (u32, u32)) -> Option<(f32, f32, f32, f32)> {
    let vp = plan.viewport?;
    let x = vp.x.min(tw);
    let y = vp.y.min(th);
    let w = vp.width.min(tw - x);
    let h = vp.height.min(th - y);
    if w == 0 || h == 0 {
        return None;
    }
    Some((x as f32, y as f32, w as f32, h as f32))
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DrawUniform {
    transform: [f32; 16],
    tint: [f32; 4],
}

impl DrawUniform {
    const SIZE: u64 = std::mem::size_of::<DrawUniform>() as u64;

    fn new(draw: &DrawMesh) -> Option<Self> {
        Some(Self {
            transform: draw.transform.to_array4()?,
            tint: draw.tint.to_array(),
        })
    }
}
