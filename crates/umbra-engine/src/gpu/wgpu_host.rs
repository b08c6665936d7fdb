use crate::frame::FrameParams;
use crate::render::RenderError;

use super::{ComputeHost, FrameFence, KernelBindings, KernelSource, WorkgroupCount, kernel};

const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// 2D image usable as kernel source, kernel destination and composite input.
///
/// Only the view is kept; it holds the texture alive.
pub struct WgpuImage {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl WgpuImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

pub struct WgpuKernel {
    pipeline: wgpu::ComputePipeline,
}

/// [`ComputeHost`] backed by a wgpu device.
///
/// Commands are recorded into one encoder per frame, created lazily on first use
/// and handed to the queue by [`submit`](ComputeHost::submit). Composites target
/// whatever view was last given to [`set_output`](Self::set_output).
pub struct WgpuHost {
    device: wgpu::Device,
    queue: wgpu::Queue,
    limits: wgpu::Limits,

    compute_bgl: wgpu::BindGroupLayout,
    params_ubo: wgpu::Buffer,

    blit_bgl: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
    blit_format: Option<wgpu::TextureFormat>,
    blit_pipeline: Option<wgpu::RenderPipeline>,

    output: Option<(wgpu::TextureView, wgpu::TextureFormat)>,
    encoder: Option<wgpu::CommandEncoder>,
    warned_no_output: bool,
}

impl WgpuHost {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let compute_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("umbra raymarch bgl"),
            entries: &[
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
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: IMAGE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FrameParams>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let params_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("umbra frame params ubo"),
            size: std::mem::size_of::<FrameParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let blit_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("umbra blit bgl"),
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

        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("umbra blit sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device: device.clone(),
            queue: queue.clone(),
            limits: device.limits(),
            compute_bgl,
            params_ubo,
            blit_bgl,
            blit_sampler,
            blit_format: None,
            blit_pipeline: None,
            output: None,
            encoder: None,
            warned_no_output: false,
        }
    }

    /// Sets the view composites are drawn into (typically the acquired surface view).
    pub fn set_output(&mut self, view: &wgpu::TextureView, format: wgpu::TextureFormat) {
        self.output = Some((view.clone(), format));
    }

    /// Drops the output view so the surface texture can be presented.
    pub fn clear_output(&mut self) {
        self.output = None;
    }

    /// Records a clear of `image` to a solid color.
    pub fn clear_image(&mut self, image: &WgpuImage, color: wgpu::Color) {
        let encoder = self.encoder();
        let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("umbra image clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &image.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
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

    // ── private helpers ────────────────────────────────────────────────────

    fn encoder(&mut self) -> &mut wgpu::CommandEncoder {
        self.encoder.get_or_insert_with(|| {
            self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("umbra frame encoder"),
            })
        })
    }

    fn ensure_blit_pipeline(&mut self, format: wgpu::TextureFormat) {
        if self.blit_format == Some(format) && self.blit_pipeline.is_some() {
            return;
        }

        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("umbra blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("umbra blit pipeline layout"),
            bind_group_layouts: &[&self.blit_bgl],
            immediate_size: 0,
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("umbra blit pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
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

        self.blit_format = Some(format);
        self.blit_pipeline = Some(pipeline);
    }
}

impl ComputeHost for WgpuHost {
    type Buffer = wgpu::Buffer;
    type Image = WgpuImage;
    type Kernel = WgpuKernel;

    fn create_kernel(&mut self, source: &KernelSource) -> Result<WgpuKernel, RenderError> {
        kernel::validate_kernel(source)?;

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.label()),
            source: wgpu::ShaderSource::Wgsl(source.source().into()),
        });

        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("umbra raymarch pipeline layout"),
            bind_group_layouts: &[&self.compute_bgl],
            immediate_size: 0,
        });

        let pipeline = self.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("umbra raymarch pipeline"),
            layout: Some(&layout),
            module: &module,
            entry_point: Some(source.entry_point()),
            compilation_options: Default::default(),
            cache: None,
        });

        log::debug!("kernel `{}` ready", source.label());
        Ok(WgpuKernel { pipeline })
    }

    fn create_buffer(&mut self, label: &'static str, size: u64) -> Result<wgpu::Buffer, RenderError> {
        let max = self
            .limits
            .max_buffer_size
            .min(self.limits.max_storage_buffer_binding_size as u64);
        if size == 0 || size > max {
            return Err(RenderError::AllocationFailure { what: label, bytes: size });
        }

        Ok(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    fn write_buffer(&mut self, buffer: &wgpu::Buffer, data: &[u8]) {
        self.queue.write_buffer(buffer, 0, data);
    }

    fn release_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn create_image(
        &mut self,
        label: &'static str,
        width: u32,
        height: u32,
    ) -> Result<WgpuImage, RenderError> {
        let max = self.limits.max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::InvalidResolution { width, height });
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: IMAGE_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(WgpuImage { view, width, height })
    }

    fn dispatch(
        &mut self,
        kernel: &WgpuKernel,
        bindings: &KernelBindings<'_, Self>,
        groups: WorkgroupCount,
    ) {
        self.queue
            .write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(bindings.params));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("umbra raymarch bind group"),
            layout: &self.compute_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&bindings.source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&bindings.destination.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: bindings.shapes.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.params_ubo.as_entire_binding(),
                },
            ],
        });

        let mut cpass = self.encoder().begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("umbra raymarch pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&kernel.pipeline);
        cpass.set_bind_group(0, &bind_group, &[]);
        cpass.dispatch_workgroups(groups.x, groups.y, groups.z);
    }

    fn composite(&mut self, image: &WgpuImage) {
        let Some((view, format)) = self.output.clone() else {
            if !self.warned_no_output {
                log::warn!("composite requested without an output view; skipping");
                self.warned_no_output = true;
            }
            return;
        };

        self.ensure_blit_pipeline(format);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("umbra blit bind group"),
            layout: &self.blit_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&image.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.blit_sampler),
                },
            ],
        });

        let Some(pipeline) = self.blit_pipeline.clone() else { return };

        let mut rpass = self.encoder().begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("umbra composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    fn submit(&mut self) -> FrameFence {
        let commands = self.encoder.take().map(|e| e.finish());
        self.queue.submit(commands);

        let fence = FrameFence::new();
        let signal = fence.clone();
        self.queue.on_submitted_work_done(move || signal.signal());
        fence
    }

    fn poll(&mut self, wait: bool) {
        let mode = if wait {
            wgpu::PollType::wait_indefinitely()
        } else {
            wgpu::PollType::Poll
        };
        if let Err(e) = self.device.poll(mode) {
            log::warn!("device poll failed: {e}");
        }
    }
}
