use std::collections::HashMap;

use anyhow::Context;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::coords::{Rect, Size};
use crate::error::{RenderError, Result};
use crate::paint::Color;
use crate::shader::{FRAGMENT_ENTRY, PRESENT_BLIT_WGSL, VERTEX_ENTRY};

use super::surface::{self, SurfaceErrorAction};
use super::{
    validate_blit_viewport, validate_image_request, BlitTarget, BufferHandle, GpuInit, GraphicsDevice, HandleAllocator,
    ImageHandle, PipelineConfig, PipelineHandle, PixelFormat,
};

/// Usage flags for every device image.
///
/// Blits sample through a render pass, so canvases need `TEXTURE_BINDING`
/// even when they are not samplable from user pipelines.
const IMAGE_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::TEXTURE_BINDING
    .union(wgpu::TextureUsages::RENDER_ATTACHMENT)
    .union(wgpu::TextureUsages::COPY_DST)
    .union(wgpu::TextureUsages::COPY_SRC);

struct GpuImage {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: Size,
    format: wgpu::TextureFormat,
    samplable: bool,
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    index: bool,
}

struct GpuPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    target: ImageHandle,
    vertex_buffers: Vec<BufferHandle>,
    index_buffer: Option<BufferHandle>,
    vertex_count: u32,
}

/// Cached image-to-image copy pipeline for one target format.
struct Blitter {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
}

/// Screen image and encoder for the frame between `begin_frame` and `end_frame`.
struct ActiveFrame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// [`GraphicsDevice`] backed by wgpu and bound to a window surface.
///
/// Work issued inside a frame is recorded into the frame's encoder and
/// submitted by `end_frame`; work issued outside a frame is submitted
/// immediately. Released resources are dropped, not destroyed, so commands
/// already recorded against them stay valid until submission.
pub struct WgpuDevice<'w> {
    /// Surface lifetime is tied to the window via `'w`.
    surface: wgpu::Surface<'w>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    handles: HandleAllocator,
    images: HashMap<ImageHandle, GpuImage>,
    buffers: HashMap<BufferHandle, GpuBuffer>,
    pipelines: HashMap<PipelineHandle, GpuPipeline>,

    linear_sampler: wgpu::Sampler,
    nearest_sampler: wgpu::Sampler,
    blit_shader: wgpu::ShaderModule,
    blitters: HashMap<wgpu::TextureFormat, Blitter>,

    frame: Option<ActiveFrame>,
    last_surface_error: Option<SurfaceErrorAction>,
}

impl<'w> WgpuDevice<'w> {
    /// Creates a device bound to `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu; see
    /// [`WgpuDevice::new_blocking`].
    pub async fn new(window: &'w Window, init: GpuInit) -> anyhow::Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            power_preference,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("blitter device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, prefer_srgb)
            .context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        log::info!(
            "wgpu device ready: {} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            format,
            size.width,
            size.height
        );

        let linear_sampler = create_sampler(&device, wgpu::FilterMode::Linear);
        let nearest_sampler = create_sampler(&device, wgpu::FilterMode::Nearest);
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blitter present blit shader"),
            source: wgpu::ShaderSource::Wgsl(PRESENT_BLIT_WGSL.into()),
        });

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
            handles: HandleAllocator::default(),
            images: HashMap::new(),
            buffers: HashMap::new(),
            pipelines: HashMap::new(),
            linear_sampler,
            nearest_sampler,
            blit_shader,
            blitters: HashMap::new(),
            frame: None,
            last_surface_error: None,
        })
    }

    /// Blocks the calling thread on [`WgpuDevice::new`].
    pub fn new_blocking(window: &'w Window, init: GpuInit) -> anyhow::Result<Self> {
        pollster::block_on(Self::new(window, init))
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn screen_size(&self) -> Size {
        Size::new(self.config.width, self.config.height)
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Outcome of the last failed `begin_frame`, cleared on read.
    pub fn take_surface_error(&mut self) -> Option<SurfaceErrorAction> {
        self.last_surface_error.take()
    }

    fn ensure_blitter(&mut self, format: wgpu::TextureFormat) {
        if self.blitters.contains_key(&format) {
            return;
        }

        let layout = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blitter blit bgl"),
            entries: &sampler_layout_entries(0),
        });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blitter blit pipeline layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blitter blit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.blit_shader,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.blit_shader,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("created blit pipeline for {format:?}");
        self.blitters.insert(format, Blitter { pipeline, layout });
    }
}

impl GraphicsDevice for WgpuDevice<'_> {
    fn allocate_image(
        &mut self,
        size: Size,
        format: PixelFormat,
        initial_data: Option<&[u8]>,
        samplable: bool,
    ) -> Result<ImageHandle> {
        let max = self.device.limits().max_texture_dimension_2d;
        validate_image_request(size, format, initial_data, max)?;

        let extent = wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        };
        let (texture, view) = scoped(&self.device, "image", || {
            let texture = self.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("blitter image"),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: format.to_wgpu(),
                usage: IMAGE_USAGE,
                view_formats: &[],
            });

            if let Some(pixels) = initial_data {
                self.queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    pixels,
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(size.width * format.bytes_per_pixel()),
                        rows_per_image: Some(size.height),
                    },
                    extent,
                );
            }

            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view)
        })?;
        let handle = ImageHandle::from_raw(self.handles.next());
        self.images.insert(
            handle,
            GpuImage {
                texture,
                view,
                size,
                format: format.to_wgpu(),
                samplable,
            },
        );
        log::debug!("allocated image #{} {}x{}", handle.id(), size.width, size.height);
        Ok(handle)
    }

    fn release_image(&mut self, image: ImageHandle) {
        match self.images.remove(&image) {
            Some(img) => {
                log::debug!("released image #{} ({:?})", image.id(), img.texture.size());
            }
            None => log::warn!("release of unknown image #{}", image.id()),
        }
    }

    fn clear_image(&mut self, image: ImageHandle, color: Color) -> Result<()> {
        let img = lookup_image(&self.images, image)?;
        let load = wgpu::LoadOp::Clear(clear_value(color, img.format));
        record(&mut self.frame, &self.device, &self.queue, "blitter clear", |encoder, _| {
            let _pass = color_pass(encoder, &img.view, load, "blitter clear");
        });
        Ok(())
    }

    fn allocate_buffer(&mut self, bytes: &[u8], as_index: bool) -> Result<BufferHandle> {
        if bytes.is_empty() {
            return Err(RenderError::device("buffer", "zero-length buffer"));
        }
        let usage = if as_index {
            wgpu::BufferUsages::INDEX
        } else {
            wgpu::BufferUsages::VERTEX
        };
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(if as_index { "blitter ibo" } else { "blitter vbo" }),
            contents: bytes,
            usage,
        });

        let handle = BufferHandle::from_raw(self.handles.next());
        self.buffers.insert(handle, GpuBuffer { buffer, index: as_index });
        Ok(handle)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_none() {
            log::warn!("release of unknown buffer #{}", buffer.id());
        }
    }

    fn compile_pipeline(&mut self, config: &PipelineConfig<'_>) -> Result<PipelineHandle> {
        let target = lookup_image(&self.images, config.target)?;

        for vb in &config.vertex_buffers {
            let buf = self.buffers.get(&vb.buffer).ok_or_else(|| vb.buffer.unknown())?;
            if buf.index {
                return Err(RenderError::device("pipeline", "index buffer bound as vertex buffer"));
            }
        }
        if let Some(ib) = config.index_buffer {
            let buf = self.buffers.get(&ib).ok_or_else(|| ib.unknown())?;
            if !buf.index {
                return Err(RenderError::device("pipeline", "vertex buffer bound as index buffer"));
            }
        }

        let mut layout_entries = Vec::with_capacity(config.samplers.len() * 2);
        let mut views = Vec::with_capacity(config.samplers.len());
        for s in &config.samplers {
            let img = lookup_image(&self.images, s.image)?;
            if !img.samplable {
                return Err(RenderError::device(
                    "pipeline",
                    format!("sampler {:?} binds a non-samplable image", s.name),
                ));
            }
            if s.image == config.target {
                return Err(RenderError::device(
                    "pipeline",
                    format!("sampler {:?} reads the pipeline's own target", s.name),
                ));
            }
            layout_entries.extend(sampler_layout_entries(s.binding * 2));
            views.push((s.binding * 2, &img.view, s.filtered));
        }

        let linear_sampler = &self.linear_sampler;
        let nearest_sampler = &self.nearest_sampler;
        let device = &self.device;
        let (pipeline, bind_group) = scoped(device, "pipeline", || {
            let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(config.label),
                source: wgpu::ShaderSource::Wgsl(config.shaders.vertex.as_str().into()),
            });
            let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(config.label),
                source: wgpu::ShaderSource::Wgsl(config.shaders.fragment.as_str().into()),
            });

            let attributes: Vec<Vec<wgpu::VertexAttribute>> = config
                .vertex_buffers
                .iter()
                .map(|vb| vb.format.wgpu_attributes(vb.first_location))
                .collect();
            let buffer_layouts: Vec<wgpu::VertexBufferLayout<'_>> = config
                .vertex_buffers
                .iter()
                .zip(&attributes)
                .map(|(vb, attrs)| wgpu::VertexBufferLayout {
                    array_stride: vb.format.stride(),
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: attrs,
                })
                .collect();

            let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(config.label),
                entries: &layout_entries,
            });

            let bind_entries: Vec<wgpu::BindGroupEntry<'_>> = views
                .iter()
                .flat_map(|&(slot, view, filtered)| {
                    let sampler = if filtered { linear_sampler } else { nearest_sampler };
                    [
                        wgpu::BindGroupEntry {
                            binding: slot,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: slot + 1,
                            resource: wgpu::BindingResource::Sampler(sampler),
                        },
                    ]
                })
                .collect();
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(config.label),
                layout: &bgl,
                entries: &bind_entries,
            });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(config.label),
                bind_group_layouts: &[&bgl],
                immediate_size: 0,
            });

            let blend = if config.alpha_blend {
                wgpu::BlendState::ALPHA_BLENDING
            } else {
                wgpu::BlendState::REPLACE
            };

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(config.label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &buffer_layouts,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: target.format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: triangle_list(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });
            (pipeline, bind_group)
        })?;

        let handle = PipelineHandle::from_raw(self.handles.next());
        self.pipelines.insert(
            handle,
            GpuPipeline {
                pipeline,
                bind_group,
                target: config.target,
                vertex_buffers: config.vertex_buffers.iter().map(|vb| vb.buffer).collect(),
                index_buffer: config.index_buffer,
                vertex_count: config.vertex_count,
            },
        );
        Ok(handle)
    }

    fn execute_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        let entry = self.pipelines.get(&pipeline).ok_or_else(|| pipeline.unknown())?;
        let target = self.images.get(&entry.target).ok_or_else(|| entry.target.unknown())?;

        let vertex_buffers = entry
            .vertex_buffers
            .iter()
            .map(|h| self.buffers.get(h).map(|b| &b.buffer).ok_or_else(|| h.unknown()))
            .collect::<Result<Vec<_>>>()?;
        let index_buffer = entry
            .index_buffer
            .map(|h| self.buffers.get(&h).map(|b| &b.buffer).ok_or_else(|| h.unknown()))
            .transpose()?;

        record(&mut self.frame, &self.device, &self.queue, "blitter draw", |encoder, _| {
            let mut pass = color_pass(encoder, &target.view, wgpu::LoadOp::Load, "blitter draw");
            pass.set_pipeline(&entry.pipeline);
            pass.set_bind_group(0, &entry.bind_group, &[]);
            for (slot, buffer) in vertex_buffers.iter().enumerate() {
                pass.set_vertex_buffer(slot as u32, buffer.slice(..));
            }
            match index_buffer {
                Some(ib) => {
                    pass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..entry.vertex_count, 0, 0..1);
                }
                None => pass.draw(0..entry.vertex_count, 0..1),
            }
        });
        Ok(())
    }

    fn release_pipeline(&mut self, pipeline: PipelineHandle) {
        if self.pipelines.remove(&pipeline).is_none() {
            log::warn!("release of unknown pipeline #{}", pipeline.id());
        }
    }

    fn blit_image(
        &mut self,
        src: ImageHandle,
        dst: BlitTarget,
        viewport: Rect,
        filtered: bool,
    ) -> Result<()> {
        lookup_image(&self.images, src)?;
        let (dst_format, dst_size) = match dst {
            BlitTarget::Image(h) => {
                let img = lookup_image(&self.images, h)?;
                (img.format, img.size)
            }
            BlitTarget::Screen => {
                if self.frame.is_none() {
                    return Err(RenderError::Frame("blit to screen outside a frame".to_string()));
                }
                (self.config.format, self.screen_size())
            }
        };

        if !validate_blit_viewport(viewport, dst_size)? {
            log::trace!("blit viewport {viewport:?} has no area; skipped");
            return Ok(());
        }
        let (x, y, w, h) = (viewport.x(), viewport.y(), viewport.width(), viewport.height());

        self.ensure_blitter(dst_format);
        let Some(blitter) = self.blitters.get(&dst_format) else {
            return Err(RenderError::device("pipeline", "blit pipeline unavailable"));
        };
        let src_view = &lookup_image(&self.images, src)?.view;
        let dst_view = match dst {
            BlitTarget::Image(h) => Some(&lookup_image(&self.images, h)?.view),
            BlitTarget::Screen => None,
        };

        let sampler = if filtered { &self.linear_sampler } else { &self.nearest_sampler };
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blitter blit bind group"),
            layout: &blitter.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(src_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        record(&mut self.frame, &self.device, &self.queue, "blitter blit", |encoder, screen| {
            let Some(view) = dst_view.or(screen) else { return };
            let mut pass = color_pass(encoder, view, wgpu::LoadOp::Load, "blitter blit");
            pass.set_viewport(x, y, w, h, 0.0, 1.0);
            pass.set_pipeline(&blitter.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        });
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.frame.is_some() {
            return Err(RenderError::Frame("a frame is already open".to_string()));
        }
        self.last_surface_error = None;

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let action = surface::map_surface_error(&self.surface, &self.device, &self.config, &err);
                self.last_surface_error = Some(action);
                return Err(RenderError::Frame(format!("surface unavailable ({action:?}): {err}")));
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("blitter frame encoder"),
            });

        self.frame = Some(ActiveFrame {
            surface_texture,
            view,
            encoder,
        });
        Ok(())
    }

    fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            log::warn!("end_frame without an open frame");
            return;
        };
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);
        frame.surface_texture.present();
    }

    fn resize_screen(&mut self, size: Size) {
        surface::apply_resize(&self.surface, &self.device, &mut self.config, size);
    }
}

/// Runs `f` against the open frame's encoder, or a one-off encoder that is
/// submitted right away. The second argument is the screen view when a frame
/// is open.
fn record<F>(
    frame: &mut Option<ActiveFrame>,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    f: F,
) where
    F: FnOnce(&mut wgpu::CommandEncoder, Option<&wgpu::TextureView>),
{
    match frame {
        Some(frame) => f(&mut frame.encoder, Some(&frame.view)),
        None => {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(label),
            });
            f(&mut encoder, None);
            queue.submit(std::iter::once(encoder.finish()));
        }
    }
}

fn color_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
    label: &str,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}

fn lookup_image(images: &HashMap<ImageHandle, GpuImage>, handle: ImageHandle) -> Result<&GpuImage> {
    images.get(&handle).ok_or_else(|| handle.unknown())
}

fn triangle_list() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// Texture at `slot`, filtering sampler at `slot + 1`.
fn sampler_layout_entries(slot: u32) -> [wgpu::BindGroupLayoutEntry; 2] {
    [
        wgpu::BindGroupLayoutEntry {
            binding: slot,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: slot + 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ]
}

fn create_sampler(device: &wgpu::Device, filter: wgpu::FilterMode) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(match filter {
            wgpu::FilterMode::Linear => "blitter linear sampler",
            wgpu::FilterMode::Nearest => "blitter nearest sampler",
        }),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

/// Runs `f` inside out-of-memory and validation error scopes and reports
/// whatever wgpu captured as a `DeviceResource` error for `what`.
fn scoped<T>(device: &wgpu::Device, what: &'static str, f: impl FnOnce() -> T) -> Result<T> {
    let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let validation = pollster::block_on(validation.pop());
    let out_of_memory = pollster::block_on(out_of_memory.pop());
    match validation.or(out_of_memory) {
        Some(err) => {
            log::error!("wgpu rejected {what}: {err}");
            Err(RenderError::device(what, err.to_string()))
        }
        None => Ok(value),
    }
}

/// Clear value for an image of `format`.
///
/// Clear values are linear; on sRGB images the stored bytes then match the
/// color's sRGB-encoded channels.
fn clear_value(color: Color, format: wgpu::TextureFormat) -> wgpu::Color {
    if format.is_srgb() {
        color.to_linear().to_wgpu()
    } else {
        color.to_wgpu()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_device() -> Option<wgpu::Device> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .ok()?;
        let (device, _queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()?;
        Some(device)
    }

    #[test]
    fn srgb_clear_is_linearized() {
        let gray = Color::named("gray").unwrap();
        let c = clear_value(gray, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert!((c.r - 0.5149).abs() < 1e-3, "r = {}", c.r);
        assert_eq!(c.r, c.g);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn linear_clear_is_unchanged() {
        let gray = Color::named("gray").unwrap();
        let c = clear_value(gray, wgpu::TextureFormat::Rgba8Unorm);
        assert!((c.r - 190.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn broken_shader_is_a_device_error() {
        // Needs an adapter; machines without one have nothing to check.
        let Some(device) = test_device() else { return };
        let result = scoped(&device, "pipeline", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("broken"),
                source: wgpu::ShaderSource::Wgsl("fn vs_main( {".into()),
            })
        });
        assert!(matches!(result, Err(RenderError::DeviceResource { what: "pipeline", .. })));
    }

    #[test]
    fn clean_work_passes_through_scope() {
        let Some(device) = test_device() else { return };
        let result = scoped(&device, "image", || 7);
        assert_eq!(result.unwrap(), 7);
    }

    #[test]
    fn every_image_can_be_blitted_and_drawn_into() {
        assert!(IMAGE_USAGE.contains(wgpu::TextureUsages::TEXTURE_BINDING));
        assert!(IMAGE_USAGE.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
    }
}
