//! wgpu implementation of [`GraphicsBackend`].
//!
//! One [`Gpu`] (surface, device, queue, surface configuration) exists per
//! surface epoch. Programs are render pipelines; buffers carry their own uniform
//! buffer and bind group so every draw in a frame keeps its own transform.

mod config;
mod surface;

pub use config::WgpuConfig;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::backend::{
    BufferHandle, FrameError, GraphicsBackend, ProgramHandle, ResourceError, ShaderError,
    SurfaceContext, SurfaceError, SurfaceErrorAction, SurfaceHandle, Uniforms, Vertex,
};
use crate::coords::Color;

/// Per-epoch wgpu objects.
struct Gpu {
    handle: SurfaceHandle,

    /// Surface lifetime is tied to the window through the `Arc`.
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,

    device: wgpu::Device,
    queue: wgpu::Queue,

    config: wgpu::SurfaceConfiguration,

    /// Shared by every program: binding 0 is the per-draw `Uniforms` block.
    uniform_layout: wgpu::BindGroupLayout,
}

impl Gpu {
    async fn new(window: Arc<Window>, handle: SurfaceHandle, init: &WgpuConfig) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kinesis device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone().using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kinesis uniforms bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<Uniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        log::info!(
            "surface {:?} acquired: {}x{} {:?} via {:?}",
            handle,
            size.width,
            size.height,
            format,
            adapter.get_info().backend,
        );

        Ok(Self {
            handle,
            window,
            surface,
            device,
            queue,
            config,
            uniform_layout,
        })
    }
}

struct GpuBuffer {
    vertices: wgpu::Buffer,
    /// Capacity of `vertices` in vertex records.
    capacity: usize,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Represents the frame between `begin_frame` and `present`.
struct GpuFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// wgpu-backed [`GraphicsBackend`] bound to winit windows.
pub struct WgpuBackend {
    config: WgpuConfig,
    next_id: u32,

    gpu: Option<Gpu>,
    programs: HashMap<ProgramHandle, wgpu::RenderPipeline>,
    buffers: HashMap<BufferHandle, GpuBuffer>,
    frame: Option<GpuFrame>,
}

impl WgpuBackend {
    pub fn new(config: WgpuConfig) -> Self {
        Self {
            config,
            next_id: 1,
            gpu: None,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            frame: None,
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    fn write_vertices(gpu: &Gpu, label: &str, vertices: &[Vertex]) -> wgpu::Buffer {
        gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        })
    }
}

impl Default for WgpuBackend {
    fn default() -> Self {
        Self::new(WgpuConfig::default())
    }
}

impl GraphicsBackend for WgpuBackend {
    type Window = Arc<Window>;

    fn acquire_surface(&mut self, window: Arc<Window>) -> Result<SurfaceContext, SurfaceError> {
        if self.gpu.is_some() {
            return Err(SurfaceError::new("a surface is already bound"));
        }

        let handle = SurfaceHandle::new(self.next_id());
        let gpu = pollster::block_on(Gpu::new(window, handle, &self.config))
            .map_err(|e| SurfaceError::new(format!("{e:#}")))?;

        let ctx = SurfaceContext::new(handle, gpu.config.width, gpu.config.height);
        self.gpu = Some(gpu);
        Ok(ctx)
    }

    fn release_surface(&mut self, surface: SurfaceContext) {
        let Some(gpu) = self.gpu.take() else {
            log::warn!("release_surface({:?}) without a bound surface", surface.handle());
            return;
        };
        debug_assert_eq!(gpu.handle, surface.handle(), "released a foreign surface");

        // Dropping an unpresented frame discards it.
        self.frame = None;

        if !self.programs.is_empty() || !self.buffers.is_empty() {
            log::warn!(
                "surface released with {} program(s) and {} buffer(s) still alive",
                self.programs.len(),
                self.buffers.len(),
            );
            self.programs.clear();
            self.buffers.clear();
        }

        log::info!("surface {:?} released", gpu.handle);
    }

    fn resize_surface(&mut self, surface: &mut SurfaceContext, width: u32, height: u32) {
        surface.set_size(width, height);
        let Some(gpu) = self.gpu.as_mut() else { return };
        if !surface::apply_resize(&gpu.surface, &gpu.device, &mut gpu.config, width, height) {
            log::debug!("zero-sized resize; surface configuration deferred");
        }
    }

    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        let Some(gpu) = self.gpu.as_ref() else {
            return Err(ShaderError::new("no active surface"));
        };

        // Compile and link errors surface through the validation scope instead of
        // the device's uncaptured-error handler.
        let error_scope = gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vs = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kinesis vertex shader"),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fs = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kinesis fragment shader"),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kinesis pipeline layout"),
            bind_group_layouts: &[&gpu.uniform_layout],
            immediate_size: 0,
        });

        let pipeline = gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kinesis pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(error_scope.pop()) {
            return Err(ShaderError::new(err.to_string()));
        }

        let handle = ProgramHandle::new(self.next_id());
        self.programs.insert(handle, pipeline);
        Ok(handle)
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program).is_none() {
            log::warn!("destroy_program: unknown {program:?}");
        }
    }

    fn create_buffer(&mut self, vertices: &[Vertex]) -> Result<BufferHandle, ResourceError> {
        let Some(gpu) = self.gpu.as_ref() else {
            return Err(ResourceError::NoSurface);
        };
        if vertices.is_empty() {
            return Err(ResourceError::Buffer("empty vertex data".to_string()));
        }

        let vbo = Self::write_vertices(gpu, "kinesis vbo", vertices);

        let ubo = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kinesis ubo"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kinesis uniforms bind group"),
            layout: &gpu.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        let handle = BufferHandle::new(self.next_id());
        self.buffers.insert(
            handle,
            GpuBuffer {
                vertices: vbo,
                capacity: vertices.len(),
                uniforms: ubo,
                bind_group,
            },
        );
        Ok(handle)
    }

    fn update_buffer(
        &mut self,
        buffer: BufferHandle,
        vertices: &[Vertex],
    ) -> Result<(), ResourceError> {
        let Some(gpu) = self.gpu.as_ref() else {
            return Err(ResourceError::NoSurface);
        };
        let Some(entry) = self.buffers.get_mut(&buffer) else {
            return Err(ResourceError::Buffer(format!("unknown {buffer:?}")));
        };

        if vertices.len() > entry.capacity {
            entry.vertices = Self::write_vertices(gpu, "kinesis vbo (grown)", vertices);
            entry.capacity = vertices.len();
        } else {
            gpu.queue.write_buffer(&entry.vertices, 0, bytemuck::cast_slice(vertices));
        }
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        match self.buffers.remove(&buffer) {
            Some(entry) => {
                entry.vertices.destroy();
                entry.uniforms.destroy();
            }
            None => log::warn!("destroy_buffer: unknown {buffer:?}"),
        }
    }

    fn begin_frame(&mut self, surface: &SurfaceContext, clear: Color) -> Result<(), FrameError> {
        let Some(gpu) = self.gpu.as_ref() else {
            return Err(FrameError::new(SurfaceErrorAction::Fatal, "no active surface"));
        };
        if surface.is_zero_sized() {
            return Err(FrameError::new(SurfaceErrorAction::SkipFrame, "surface has zero size"));
        }
        if self.frame.take().is_some() {
            log::warn!("begin_frame: previous frame was never presented; discarding it");
        }

        let surface_texture = gpu.surface.get_current_texture().map_err(|err| {
            surface::map_surface_error(&gpu.surface, &gpu.device, &gpu.config, err)
        })?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kinesis frame encoder"),
            });

        // Clear pass; dropped before the encoder is reused by draws.
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kinesis clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.frame = Some(GpuFrame {
            surface_texture,
            view,
            encoder,
        });
        Ok(())
    }

    fn draw(
        &mut self,
        program: ProgramHandle,
        buffer: BufferHandle,
        uniforms: &Uniforms,
        vertex_count: u32,
    ) {
        let Some(gpu) = self.gpu.as_ref() else { return };
        let Some(frame) = self.frame.as_mut() else {
            log::error!("draw outside begin_frame/present");
            return;
        };
        let (Some(pipeline), Some(entry)) = (self.programs.get(&program), self.buffers.get(&buffer))
        else {
            log::error!("draw with unknown {program:?} / {buffer:?}");
            return;
        };

        gpu.queue.write_buffer(&entry.uniforms, 0, bytemuck::bytes_of(uniforms));

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kinesis draw"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &entry.bind_group, &[]);
        rpass.set_vertex_buffer(0, entry.vertices.slice(..));
        rpass.draw(0..vertex_count, 0..1);
    }

    fn present(&mut self, surface: &SurfaceContext) {
        let Some(gpu) = self.gpu.as_ref() else { return };
        debug_assert_eq!(gpu.handle, surface.handle(), "presented a foreign surface");
        let Some(frame) = self.frame.take() else {
            log::error!("present without begin_frame");
            return;
        };

        gpu.window.pre_present_notify();
        gpu.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }
}
