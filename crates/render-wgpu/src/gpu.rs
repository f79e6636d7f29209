use std::collections::HashMap;
use std::num::NonZeroU64;

use flyscene_assets::{AssetId, TextureData};
use flyscene_render::{FlyCamera, RenderError, Renderer};
use flyscene_scene::{DrawItem, Material, Scene, Side};
use wgpu::util::DeviceExt;

use crate::mesh::{GpuMesh, Vertex};
use crate::shaders;
use crate::texture::{self, GpuTexture};
use crate::uniforms::{self, FrameUniforms, ObjectUniforms};

const OBJECT_SIZE: u64 = std::mem::size_of::<ObjectUniforms>() as u64;
const INITIAL_OBJECTS: u64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    lit: bool,
    blend: bool,
    depth_write: bool,
    cull: Option<wgpu::Face>,
}

impl PipelineKey {
    fn for_material(material: &Material) -> Self {
        match material {
            Material::Shader(m) => Self {
                lit: true,
                blend: m.transparent,
                depth_write: m.depth_write,
                cull: cull_for(m.side),
            },
            Material::Standard(m) => Self {
                lit: false,
                blend: false,
                depth_write: true,
                cull: cull_for(m.side),
            },
        }
    }
}

fn cull_for(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
        Side::Double => None,
    }
}

fn map_surface_error(err: wgpu::SurfaceError) -> RenderError {
    match err {
        wgpu::SurfaceError::Lost => RenderError::SurfaceLost,
        wgpu::SurfaceError::Outdated => RenderError::SurfaceOutdated,
        wgpu::SurfaceError::Timeout => RenderError::Timeout,
        wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
        other => RenderError::Backend(other.to_string()),
    }
}

struct Frame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// wgpu-based scene renderer that owns its surface.
///
/// `draw` renders into a freshly acquired surface texture and holds it until
/// `present`, so callers can paint an overlay into the same frame first.
pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: u64,
    object_capacity: u64,

    texture_layout: wgpu::BindGroupLayout,
    white: GpuTexture,
    meshes: HashMap<String, GpuMesh>,
    textures: HashMap<AssetId, GpuTexture>,

    depth: wgpu::TextureView,
    current: Option<Frame>,
}

impl WgpuRenderer {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| RenderError::Backend("no compatible GPU adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("flyscene_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| RenderError::Backend("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(OBJECT_SIZE),
                },
                count: None,
            }],
        });
        let texture_layout = texture::bind_group_layout(&device);

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniforms"),
            contents: bytemuck::bytes_of(&FrameUniforms::from_camera(&FlyCamera::default())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let object_stride = uniforms::align_to(
            OBJECT_SIZE,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let (object_buffer, object_bind_group) =
            create_object_buffer(&device, &object_layout, object_stride, INITIAL_OBJECTS);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let white = GpuTexture::upload(
            &device,
            &queue,
            &texture_layout,
            &TextureData::solid("white", [255; 4]),
        );
        let depth = texture::create_depth_texture(&device, config.width, config.height);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?format,
            "GPU initialized"
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            shader,
            pipeline_layout,
            pipelines: HashMap::new(),
            frame_buffer,
            frame_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_stride,
            object_capacity: INITIAL_OBJECTS,
            texture_layout,
            white,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            depth,
            current: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Reapply the surface configuration at the current size.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Paint into the frame produced by the last `draw`, if it is still held.
    pub fn overlay(&mut self, paint: impl FnOnce(&wgpu::Device, &wgpu::Queue, &wgpu::TextureView)) {
        if let Some(frame) = &self.current {
            paint(&self.device, &self.queue, &frame.view);
        }
    }

    pub fn present(&mut self) {
        if let Some(frame) = self.current.take() {
            frame.output.present();
        }
    }

    fn pipeline(&mut self, key: PipelineKey) -> &wgpu::RenderPipeline {
        let Self {
            device,
            shader,
            pipeline_layout,
            config,
            pipelines,
            ..
        } = self;
        pipelines.entry(key).or_insert_with(|| {
            tracing::debug!(?key, "creating pipeline");
            create_pipeline(device, shader, pipeline_layout, config.format, key)
        })
    }

    fn ensure_object_capacity(&mut self, count: u64) {
        if count <= self.object_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buffer, bind_group) =
            create_object_buffer(&self.device, &self.object_layout, self.object_stride, capacity);
        self.object_buffer = buffer;
        self.object_bind_group = bind_group;
        self.object_capacity = capacity;
        tracing::debug!(capacity, "grew object uniform buffer");
    }

    /// Upload any geometry and textures the draw list needs.
    fn prepare(&mut self, scene: &Scene, items: &[DrawItem]) {
        for item in items {
            let Some(geometry) = scene.node(item.node).and_then(|n| n.geometry.as_ref()) else {
                continue;
            };
            let key = geometry.cache_key();
            if !self.meshes.contains_key(&key) {
                let mesh = GpuMesh::upload(&self.device, &geometry.tessellate());
                self.meshes.insert(key, mesh);
            }

            let Some(material) = scene.material(item.material) else {
                continue;
            };
            if let Some(data) = material.texture() {
                if !self.textures.contains_key(&data.id) {
                    let gpu =
                        GpuTexture::upload(&self.device, &self.queue, &self.texture_layout, data);
                    self.textures.insert(data.id, gpu);
                }
            }
            self.pipeline(PipelineKey::for_material(material));
        }
    }

    fn write_objects(&self, scene: &Scene, items: &[DrawItem]) {
        if items.is_empty() {
            return;
        }
        let stride = self.object_stride as usize;
        let mut bytes = vec![0u8; stride * items.len()];
        for (i, item) in items.iter().enumerate() {
            let Some(material) = scene.material(item.material) else {
                continue;
            };
            let block = ObjectUniforms::new(material, item.world);
            bytes[i * stride..i * stride + OBJECT_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&block));
        }
        self.queue.write_buffer(&self.object_buffer, 0, &bytes);
    }
}

impl Renderer for WgpuRenderer {
    fn draw(&mut self, scene: &Scene, camera: &FlyCamera) -> Result<(), RenderError> {
        if let Some(stale) = self.current.take() {
            stale.output.present();
        }

        let output = self
            .surface
            .get_current_texture()
            .map_err(map_surface_error)?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let items = uniforms::draw_order(scene, camera);
        self.ensure_object_capacity(items.len() as u64);
        self.prepare(scene, &items);

        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_camera(camera)),
        );
        self.write_objects(scene, &items);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let bg = scene.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(bg.r),
                            g: f64::from(bg.g),
                            b: f64::from(bg.b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (i, item) in items.iter().enumerate() {
                let (Some(node), Some(material)) =
                    (scene.node(item.node), scene.material(item.material))
                else {
                    continue;
                };
                let Some(mesh) = node
                    .geometry
                    .as_ref()
                    .and_then(|g| self.meshes.get(&g.cache_key()))
                else {
                    continue;
                };
                let Some(pipeline) = self.pipelines.get(&PipelineKey::for_material(material))
                else {
                    continue;
                };
                let texture = material
                    .texture()
                    .and_then(|t| self.textures.get(&t.id))
                    .unwrap_or(&self.white);

                let offset = (i as u64 * self.object_stride) as u32;
                pass.set_pipeline(pipeline);
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                pass.set_bind_group(2, &texture.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));

        self.current = Some(Frame { output, view });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth =
            texture::create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    fn output_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

fn create_object_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("object_uniforms"),
        size: stride * capacity,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(OBJECT_SIZE),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let blend = if key.blend {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState::REPLACE
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(if key.lit { "lit_pipeline" } else { "standard_pipeline" }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(if key.lit { "fs_lit" } else { "fs_standard" }),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: key.cull,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: texture::DEPTH_FORMAT,
            depth_write_enabled: key.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}
