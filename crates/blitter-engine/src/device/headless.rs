use std::collections::HashMap;

use crate::coords::{Rect, Size};
use crate::error::{RenderError, Result};
use crate::paint::Color;

use super::{
    validate_blit_viewport, validate_image_request, BlitTarget, BufferHandle, GraphicsDevice, HandleAllocator,
    ImageHandle, PipelineConfig, PipelineHandle, PixelFormat,
};

/// One call observed by a [`HeadlessDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    AllocateImage {
        image: ImageHandle,
        size: Size,
        format: PixelFormat,
        initialized: bool,
        samplable: bool,
    },
    ReleaseImage(ImageHandle),
    ClearImage {
        image: ImageHandle,
        color: Color,
    },
    AllocateBuffer {
        buffer: BufferHandle,
        bytes: Vec<u8>,
        index: bool,
    },
    ReleaseBuffer(BufferHandle),
    CompilePipeline {
        pipeline: PipelineHandle,
        target: ImageHandle,
        vertex_format: String,
        vertex_count: u32,
        sampled: Vec<ImageHandle>,
    },
    ExecutePipeline(PipelineHandle),
    ReleasePipeline(PipelineHandle),
    Blit {
        src: ImageHandle,
        dst: BlitTarget,
        viewport: Rect,
        filtered: bool,
    },
    BeginFrame,
    EndFrame,
    ResizeScreen(Size),
}

#[derive(Debug, Clone, Copy)]
struct ImageInfo {
    size: Size,
    samplable: bool,
}

#[derive(Debug, Clone, Copy)]
struct BufferInfo {
    index: bool,
}

/// In-memory [`GraphicsDevice`].
///
/// Validates every call the way a real backend would (unknown handles,
/// oversized images, sampling non-samplable images, blitting to the screen
/// outside a frame) without touching a GPU. Every successful call is appended
/// to [`calls`](Self::calls). Allocation failures can be injected to exercise
/// rollback paths.
#[derive(Debug)]
pub struct HeadlessDevice {
    handles: HandleAllocator,
    images: HashMap<ImageHandle, ImageInfo>,
    buffers: HashMap<BufferHandle, BufferInfo>,
    pipelines: HashMap<PipelineHandle, ImageHandle>,
    calls: Vec<DeviceCall>,
    frame_open: bool,
    screen: Size,
    max_image_dimension: u32,
    image_budget: Option<usize>,
    buffer_budget: Option<usize>,
    fail_pipelines: bool,
}

impl HeadlessDevice {
    pub fn new(screen: Size) -> Self {
        Self {
            handles: HandleAllocator::default(),
            images: HashMap::new(),
            buffers: HashMap::new(),
            pipelines: HashMap::new(),
            calls: Vec::new(),
            frame_open: false,
            screen,
            max_image_dimension: wgpu::Limits::default().max_texture_dimension_2d,
            image_budget: None,
            buffer_budget: None,
            fail_pipelines: false,
        }
    }

    pub fn with_max_image_dimension(mut self, max: u32) -> Self {
        self.max_image_dimension = max;
        self
    }

    /// Lets `n` more image allocations succeed; later ones fail. `None` removes the limit.
    pub fn fail_images_after(&mut self, n: Option<usize>) {
        self.image_budget = n;
    }

    /// Lets `n` more buffer allocations succeed; later ones fail. `None` removes the limit.
    pub fn fail_buffers_after(&mut self, n: Option<usize>) {
        self.buffer_budget = n;
    }

    pub fn fail_pipeline_compilation(&mut self, fail: bool) {
        self.fail_pipelines = fail;
    }

    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn live_images(&self) -> usize {
        self.images.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_pipelines(&self) -> usize {
        self.pipelines.len()
    }

    pub fn image_size(&self, image: ImageHandle) -> Option<Size> {
        self.images.get(&image).map(|i| i.size)
    }

    pub fn is_frame_open(&self) -> bool {
        self.frame_open
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    fn take_budget(budget: &mut Option<usize>, what: &'static str) -> Result<()> {
        match budget {
            Some(0) => Err(RenderError::device(what, "injected allocation failure")),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn image(&self, image: ImageHandle) -> Result<ImageInfo> {
        self.images.get(&image).copied().ok_or_else(|| image.unknown())
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn allocate_image(
        &mut self,
        size: Size,
        format: PixelFormat,
        initial_data: Option<&[u8]>,
        samplable: bool,
    ) -> Result<ImageHandle> {
        validate_image_request(size, format, initial_data, self.max_image_dimension)?;
        Self::take_budget(&mut self.image_budget, "image")?;

        let image = ImageHandle::from_raw(self.handles.next());
        self.images.insert(image, ImageInfo { size, samplable });
        self.calls.push(DeviceCall::AllocateImage {
            image,
            size,
            format,
            initialized: initial_data.is_some(),
            samplable,
        });
        Ok(image)
    }

    fn release_image(&mut self, image: ImageHandle) {
        if self.images.remove(&image).is_none() {
            log::warn!("release of unknown image #{}", image.id());
            return;
        }
        self.calls.push(DeviceCall::ReleaseImage(image));
    }

    fn clear_image(&mut self, image: ImageHandle, color: Color) -> Result<()> {
        self.image(image)?;
        self.calls.push(DeviceCall::ClearImage { image, color });
        Ok(())
    }

    fn allocate_buffer(&mut self, bytes: &[u8], as_index: bool) -> Result<BufferHandle> {
        if bytes.is_empty() {
            return Err(RenderError::device("buffer", "zero-length buffer"));
        }
        Self::take_budget(&mut self.buffer_budget, "buffer")?;

        let buffer = BufferHandle::from_raw(self.handles.next());
        self.buffers.insert(buffer, BufferInfo { index: as_index });
        self.calls.push(DeviceCall::AllocateBuffer {
            buffer,
            bytes: bytes.to_vec(),
            index: as_index,
        });
        Ok(buffer)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(&buffer).is_none() {
            log::warn!("release of unknown buffer #{}", buffer.id());
            return;
        }
        self.calls.push(DeviceCall::ReleaseBuffer(buffer));
    }

    fn compile_pipeline(&mut self, config: &PipelineConfig<'_>) -> Result<PipelineHandle> {
        self.image(config.target)?;

        for vb in &config.vertex_buffers {
            let info = self.buffers.get(&vb.buffer).ok_or_else(|| vb.buffer.unknown())?;
            if info.index {
                return Err(RenderError::device("pipeline", "index buffer bound as vertex buffer"));
            }
        }
        if let Some(ib) = config.index_buffer {
            let info = self.buffers.get(&ib).ok_or_else(|| ib.unknown())?;
            if !info.index {
                return Err(RenderError::device("pipeline", "vertex buffer bound as index buffer"));
            }
        }
        for s in &config.samplers {
            if !self.image(s.image)?.samplable {
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
        }
        if self.fail_pipelines {
            return Err(RenderError::device("pipeline", "injected compilation failure"));
        }

        let pipeline = PipelineHandle::from_raw(self.handles.next());
        self.pipelines.insert(pipeline, config.target);
        self.calls.push(DeviceCall::CompilePipeline {
            pipeline,
            target: config.target,
            vertex_format: config
                .vertex_buffers
                .iter()
                .map(|vb| vb.format.to_string())
                .collect::<Vec<_>>()
                .join(" | "),
            vertex_count: config.vertex_count,
            sampled: config.samplers.iter().map(|s| s.image).collect(),
        });
        Ok(pipeline)
    }

    fn execute_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        let target = *self.pipelines.get(&pipeline).ok_or_else(|| pipeline.unknown())?;
        self.image(target)?;
        self.calls.push(DeviceCall::ExecutePipeline(pipeline));
        Ok(())
    }

    fn release_pipeline(&mut self, pipeline: PipelineHandle) {
        if self.pipelines.remove(&pipeline).is_none() {
            log::warn!("release of unknown pipeline #{}", pipeline.id());
            return;
        }
        self.calls.push(DeviceCall::ReleasePipeline(pipeline));
    }

    fn blit_image(
        &mut self,
        src: ImageHandle,
        dst: BlitTarget,
        viewport: Rect,
        filtered: bool,
    ) -> Result<()> {
        self.image(src)?;
        let dst_size = match dst {
            BlitTarget::Image(image) => self.image(image)?.size,
            BlitTarget::Screen if !self.frame_open => {
                return Err(RenderError::Frame("blit to screen outside a frame".to_string()));
            }
            BlitTarget::Screen => self.screen,
        };
        validate_blit_viewport(viewport, dst_size)?;
        self.calls.push(DeviceCall::Blit { src, dst, viewport, filtered });
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<()> {
        if self.frame_open {
            return Err(RenderError::Frame("a frame is already open".to_string()));
        }
        self.frame_open = true;
        self.calls.push(DeviceCall::BeginFrame);
        Ok(())
    }

    fn end_frame(&mut self) {
        if !self.frame_open {
            log::warn!("end_frame without an open frame");
            return;
        }
        self.frame_open = false;
        self.calls.push(DeviceCall::EndFrame);
    }

    fn resize_screen(&mut self, size: Size) {
        self.screen = size;
        self.calls.push(DeviceCall::ResizeScreen(size));
    }
}
