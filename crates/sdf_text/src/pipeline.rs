//! wgpu pipeline that draws a [`TextBatch`] with the SDF text shader.

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use sdf_font::{GpuAtlasTexture, GpuTextureStore, TextureHandle};
use wgpu::util::DeviceExt;

use crate::batch::TextBatch;
use crate::quad::{GlyphQuad, GlyphVertex};
use crate::uniforms::{TextUniforms, ViewportUniforms};

const INITIAL_QUADS: u64 = 256;
const INITIAL_RUNS: u64 = 16;

/// Draws text batches onto an existing colour target.
///
/// Bind groups: group 0 holds the viewport (binding 0) and the per-run
/// [`TextUniforms`] at a dynamic offset (binding 1); group 1 holds the atlas
/// texture (binding 0) and sampler (binding 1).
///
/// Atlas bind groups are cached per [`TextureHandle`] and built from the
/// [`GpuTextureStore`] the first time a run references a handle, so an atlas
/// reloaded by the text renderer is picked up without extra calls.
pub struct SdfTextPipeline {
    device: Arc<wgpu::Device>,
    pipeline: wgpu::RenderPipeline,
    viewport_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_stride: u64,
    max_runs: u64,
    uniform_layout: wgpu::BindGroupLayout,
    uniform_bind_group: wgpu::BindGroup,
    atlas_layout: wgpu::BindGroupLayout,
    atlas_bind_groups: HashMap<TextureHandle, wgpu::BindGroup>,
    vertex_buffer: wgpu::Buffer,
    max_quads: u64,
}

impl SdfTextPipeline {
    pub fn new(device: Arc<wgpu::Device>, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("SDF Text Viewport Buffer"),
            contents: bytemuck::bytes_of(&ViewportUniforms::new(width, height)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = align_to(std::mem::size_of::<TextUniforms>() as u64, alignment);
        let uniform_buffer = create_uniform_buffer(&device, uniform_stride * INITIAL_RUNS);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SDF Text Uniform Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<ViewportUniforms>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(std::mem::size_of::<TextUniforms>() as u64),
                    },
                    count: None,
                },
            ],
        });
        let uniform_bind_group =
            create_uniform_bind_group(&device, &uniform_layout, &viewport_buffer, &uniform_buffer);

        let atlas_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SDF Atlas Bind Group Layout"),
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
            ],
        });

        let shader = device.create_shader_module(wgpu::include_wgsl!("../shaders/sdf_text.wgsl"));
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("SDF Text Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &atlas_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("SDF Text Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GlyphVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            // position
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            // uv
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 8,
                            shader_location: 1,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = create_vertex_buffer(&device, INITIAL_QUADS);

        Self {
            device,
            pipeline,
            viewport_buffer,
            uniform_buffer,
            uniform_stride,
            max_runs: INITIAL_RUNS,
            uniform_layout,
            uniform_bind_group,
            atlas_layout,
            atlas_bind_groups: HashMap::new(),
            vertex_buffer,
            max_quads: INITIAL_QUADS,
        }
    }

    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        queue.write_buffer(
            &self.viewport_buffer,
            0,
            bytemuck::bytes_of(&ViewportUniforms::new(width, height)),
        );
    }

    fn atlas_bind_group(&self, atlas: &GpuAtlasTexture) -> wgpu::BindGroup {
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SDF Atlas Bind Group"),
            layout: &self.atlas_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
        })
    }

    /// Drops bind groups of released atlases and builds missing ones for the
    /// runs of `batch`.
    fn sync_atlases(&mut self, store: &GpuTextureStore, batch: &TextBatch) {
        self.atlas_bind_groups.retain(|handle, _| store.get(*handle).is_some());
        for run in batch.runs() {
            if self.atlas_bind_groups.contains_key(&run.texture) {
                continue;
            }
            if let Some(atlas) = store.get(run.texture) {
                log::debug!("binding atlas texture {}", run.texture.id());
                let bind_group = self.atlas_bind_group(atlas);
                self.atlas_bind_groups.insert(run.texture, bind_group);
            }
        }
    }

    /// Uploads every vertex of `batch` once, then issues one six-vertex draw
    /// per glyph.  Runs whose atlas `store` no longer holds are skipped.
    /// Returns the number of draws recorded.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        queue: &wgpu::Queue,
        store: &GpuTextureStore,
        batch: &TextBatch,
    ) -> usize {
        self.sync_atlases(store, batch);
        if batch.is_empty() {
            return 0;
        }

        let quads = batch.len() as u64;
        if quads > self.max_quads {
            self.vertex_buffer = create_vertex_buffer(&self.device, quads);
            self.max_quads = quads;
        }
        queue.write_buffer(&self.vertex_buffer, 0, batch.as_bytes());

        let runs = batch.runs().len() as u64;
        if runs > self.max_runs {
            self.uniform_buffer = create_uniform_buffer(&self.device, self.uniform_stride * runs);
            self.uniform_bind_group = create_uniform_bind_group(
                &self.device,
                &self.uniform_layout,
                &self.viewport_buffer,
                &self.uniform_buffer,
            );
            self.max_runs = runs;
        }
        for (i, run) in batch.runs().iter().enumerate() {
            queue.write_buffer(
                &self.uniform_buffer,
                i as u64 * self.uniform_stride,
                bytemuck::bytes_of(&run.uniforms),
            );
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("SDF Text Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        let mut draws = 0;
        for (i, run) in batch.runs().iter().enumerate() {
            let Some(atlas_bg) = self.atlas_bind_groups.get(&run.texture) else {
                log::warn!("atlas texture {} is not in the store, skipping {} glyphs", run.texture.id(), run.quads.len());
                continue;
            };
            let offset = (i as u64 * self.uniform_stride) as wgpu::DynamicOffset;
            rpass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
            rpass.set_bind_group(1, atlas_bg, &[]);
            for quad in run.quads.clone() {
                let first = quad as u32 * GlyphQuad::VERTEX_COUNT;
                rpass.draw(first..first + GlyphQuad::VERTEX_COUNT, 0..1);
                draws += 1;
            }
        }
        draws
    }
}

fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

fn create_vertex_buffer(device: &wgpu::Device, quads: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("SDF Text Vertex Buffer"),
        size: std::mem::size_of::<GlyphQuad>() as u64 * quads,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("SDF Text Run Uniforms"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    viewport: &wgpu::Buffer,
    uniforms: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("SDF Text Uniform Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: uniforms,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<TextUniforms>() as u64),
                }),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::TextRenderer;
    use crate::style::TextSpan;
    use glam::{IVec2, Vec2};
    use sdf_core::context::EngineContext;
    use sdf_font::{
        AtlasSettings, FontAtlas, GlyphBitmap, GlyphRasterizer, RasterError, RasterGlyph, TextureStore,
    };

    struct Squares;

    impl GlyphRasterizer for Squares {
        fn rasterize(&mut self, code: u8) -> Result<RasterGlyph, RasterError> {
            let side = if code == b' ' { 0 } else { 8 };
            Ok(RasterGlyph {
                bitmap: GlyphBitmap::from_fn(side, side, |_, _| 255),
                bearing: IVec2::new(0, side as i32),
                advance: 10 * 64,
            })
        }
    }

    #[test]
    fn align_rounds_up() {
        assert_eq!(align_to(80, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    fn target(ctx: &EngineContext, format: wgpu::TextureFormat) -> wgpu::TextureView {
        let target = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test target"),
            size: wgpu::Extent3d {
                width: 128,
                height: 32,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        target.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn squares_settings() -> AtlasSettings {
        AtlasSettings::default().with_spread(2).with_atlas_size(256, 256)
    }

    #[test]
    fn draws_one_call_per_glyph() {
        let Ok(ctx) = EngineContext::new_blocking() else {
            eprintln!("no GPU adapter available, skipping");
            return;
        };

        let mut store = GpuTextureStore::new(ctx.device.clone(), ctx.queue.clone());
        let atlas = FontAtlas::build(&mut Squares, squares_settings(), &mut store).unwrap();
        let mut renderer = TextRenderer::new(atlas);

        let mut batch = TextBatch::new();
        renderer
            .render(&mut store, &mut batch, &TextSpan::new("SDF text", Vec2::new(4.0, 16.0)))
            .unwrap();
        assert_eq!(batch.len(), 7);

        let format = wgpu::TextureFormat::Rgba8Unorm;
        let view = target(&ctx, format);
        let mut pipeline = SdfTextPipeline::new(ctx.device.clone(), format, 128, 32);
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        assert_eq!(pipeline.render(&mut encoder, &view, &ctx.queue, &store, &batch), 7);
        assert_eq!(pipeline.atlas_bind_groups.len(), 1);
        ctx.queue.submit(Some(encoder.finish()));

        renderer.release(&mut store);
        assert_eq!(store.live(), 0);

        // The batch still names the released texture.
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        assert_eq!(pipeline.render(&mut encoder, &view, &ctx.queue, &store, &batch), 0);
        assert!(pipeline.atlas_bind_groups.is_empty());
        ctx.queue.submit(Some(encoder.finish()));
    }

    #[test]
    fn reloaded_atlas_is_drawn_and_stale_binding_dropped() {
        let Ok(ctx) = EngineContext::new_blocking() else {
            eprintln!("no GPU adapter available, skipping");
            return;
        };

        let mut store = GpuTextureStore::new(ctx.device.clone(), ctx.queue.clone());
        let atlas = FontAtlas::build(&mut Squares, squares_settings(), &mut store).unwrap();
        let first = atlas.texture().unwrap();
        let mut renderer = TextRenderer::new(atlas).with_loader(|store: &mut dyn TextureStore| {
            FontAtlas::build(&mut Squares, squares_settings(), store)
        });

        let format = wgpu::TextureFormat::Rgba8Unorm;
        let view = target(&ctx, format);
        let mut pipeline = SdfTextPipeline::new(ctx.device.clone(), format, 128, 32);
        let span = TextSpan::new("reload", Vec2::new(4.0, 16.0));

        let mut batch = TextBatch::new();
        renderer.render(&mut store, &mut batch, &span).unwrap();
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        assert_eq!(pipeline.render(&mut encoder, &view, &ctx.queue, &store, &batch), 6);
        ctx.queue.submit(Some(encoder.finish()));

        renderer.replace_atlas(FontAtlas::empty(squares_settings()), &mut store);
        let mut batch = TextBatch::new();
        let report = renderer.render(&mut store, &mut batch, &span).unwrap();
        assert!(report.reloaded);
        let reloaded = batch.runs()[0].texture;
        assert_ne!(reloaded, first);
        assert_eq!(store.live(), 1);

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        assert_eq!(pipeline.render(&mut encoder, &view, &ctx.queue, &store, &batch), 6);
        ctx.queue.submit(Some(encoder.finish()));
        assert_eq!(pipeline.atlas_bind_groups.len(), 1);
        assert!(pipeline.atlas_bind_groups.contains_key(&reloaded));

        renderer.release(&mut store);
    }
}
