//! Graphics device abstraction.
//!
//! The blitting layer never talks to wgpu directly; it drives a
//! [`GraphicsDevice`]. Two backends ship:
//! - [`WgpuDevice`]: wgpu instance/adapter/device/queue bound to a window surface
//! - [`HeadlessDevice`]: in-memory, records calls and tracks live resources

mod gpu;
mod handle;
mod headless;
mod init;
mod pipeline;
mod surface;

pub use gpu::WgpuDevice;
pub use handle::{BufferHandle, ImageHandle, PipelineHandle};
pub use headless::{DeviceCall, HeadlessDevice};
pub use init::GpuInit;
pub use pipeline::{
    PipelineConfig, SamplerBinding, ScalarKind, VertexAttribute, VertexBinding, VertexFormat,
};
pub use surface::SurfaceErrorAction;

pub(crate) use handle::HandleAllocator;

use crate::coords::{Rect, Size};
use crate::error::{RenderError, Result};
use crate::paint::Color;

/// Pixel layout of device images. Both variants are 4 × 8-bit channels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba8Unorm,
    /// Non-linear (sRGB-encoded) color; the default for textures and canvases.
    #[default]
    Rgba8UnormSrgb,
}

impl PixelFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> u32 {
        4
    }

    pub(crate) fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            PixelFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }
}

/// Destination of [`GraphicsDevice::blit_image`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlitTarget {
    Image(ImageHandle),
    /// The window's current frame. Only valid between `begin_frame` and `end_frame`.
    Screen,
}

/// GPU capability consumed by textures and render surfaces.
///
/// Operations issued outside a frame execute immediately; operations inside a
/// frame may be deferred until [`GraphicsDevice::end_frame`]. Releasing an
/// unknown handle is logged and otherwise ignored.
pub trait GraphicsDevice {
    /// Allocates an image, optionally filled from tightly packed pixels.
    ///
    /// `samplable` images may be bound as sampler resources of a pipeline.
    fn allocate_image(
        &mut self,
        size: Size,
        format: PixelFormat,
        initial_data: Option<&[u8]>,
        samplable: bool,
    ) -> Result<ImageHandle>;

    fn release_image(&mut self, image: ImageHandle);

    /// Fills the whole image with `color`.
    fn clear_image(&mut self, image: ImageHandle, color: Color) -> Result<()>;

    fn allocate_buffer(&mut self, bytes: &[u8], as_index: bool) -> Result<BufferHandle>;

    fn release_buffer(&mut self, buffer: BufferHandle);

    fn compile_pipeline(&mut self, config: &PipelineConfig<'_>) -> Result<PipelineHandle>;

    /// Runs the pipeline once against its bound target.
    fn execute_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()>;

    fn release_pipeline(&mut self, pipeline: PipelineHandle);

    /// Copies all of `src` into `viewport` of `dst`, stretching as needed.
    ///
    /// The viewport must lie inside `dst`; one that sticks out fails with
    /// `ViewportOutOfBounds`. A viewport with no area copies nothing.
    fn blit_image(
        &mut self,
        src: ImageHandle,
        dst: BlitTarget,
        viewport: Rect,
        filtered: bool,
    ) -> Result<()>;

    /// Opens a frame. Opening a second frame before ending the first is an error.
    fn begin_frame(&mut self) -> Result<()>;

    /// Closes the open frame and presents it.
    fn end_frame(&mut self);

    /// Informs the backend that the window's drawable size changed.
    fn resize_screen(&mut self, size: Size) {
        let _ = size;
    }
}

impl<D: GraphicsDevice + ?Sized> GraphicsDevice for &mut D {
    fn allocate_image(
        &mut self,
        size: Size,
        format: PixelFormat,
        initial_data: Option<&[u8]>,
        samplable: bool,
    ) -> Result<ImageHandle> {
        (**self).allocate_image(size, format, initial_data, samplable)
    }

    fn release_image(&mut self, image: ImageHandle) {
        (**self).release_image(image)
    }

    fn clear_image(&mut self, image: ImageHandle, color: Color) -> Result<()> {
        (**self).clear_image(image, color)
    }

    fn allocate_buffer(&mut self, bytes: &[u8], as_index: bool) -> Result<BufferHandle> {
        (**self).allocate_buffer(bytes, as_index)
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        (**self).release_buffer(buffer)
    }

    fn compile_pipeline(&mut self, config: &PipelineConfig<'_>) -> Result<PipelineHandle> {
        (**self).compile_pipeline(config)
    }

    fn execute_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        (**self).execute_pipeline(pipeline)
    }

    fn release_pipeline(&mut self, pipeline: PipelineHandle) {
        (**self).release_pipeline(pipeline)
    }

    fn blit_image(
        &mut self,
        src: ImageHandle,
        dst: BlitTarget,
        viewport: Rect,
        filtered: bool,
    ) -> Result<()> {
        (**self).blit_image(src, dst, viewport, filtered)
    }

    fn begin_frame(&mut self) -> Result<()> {
        (**self).begin_frame()
    }

    fn end_frame(&mut self) {
        (**self).end_frame()
    }

    fn resize_screen(&mut self, size: Size) {
        (**self).resize_screen(size)
    }
}

/// Checks an image request against a device's dimension limit.
pub(crate) fn validate_image_request(
    size: Size,
    format: PixelFormat,
    initial_data: Option<&[u8]>,
    max_dimension: u32,
) -> Result<()> {
    if size.is_empty() {
        return Err(RenderError::InvalidGeometry {
            what: "image size",
            width: size.width as f32,
            height: size.height as f32,
        });
    }

    if size.width > max_dimension || size.height > max_dimension {
        return Err(RenderError::device(
            "image",
            format!(
                "{}x{} exceeds the device limit of {max_dimension}",
                size.width, size.height
            ),
        ));
    }

    if let Some(data) = initial_data {
        let expected =
            size.width as usize * size.height as usize * format.bytes_per_pixel() as usize;
        if data.len() != expected {
            return Err(RenderError::device(
                "image",
                format!("initial data is {} bytes, expected {expected}", data.len()),
            ));
        }
    }

    Ok(())
}

/// Checks that a blit viewport lies inside `(0, 0, target)`.
///
/// `Ok(false)` means the viewport has no area and the blit is a no-op.
pub(crate) fn validate_blit_viewport(viewport: Rect, target: Size) -> Result<bool> {
    if viewport.is_empty() {
        return Ok(false);
    }
    let (tw, th) = target.to_f32();
    let inside = viewport.x() >= 0.0
        && viewport.y() >= 0.0
        && viewport.x() + viewport.width() <= tw
        && viewport.y() + viewport.height() <= th;
    if inside {
        Ok(true)
    } else {
        Err(RenderError::ViewportOutOfBounds { viewport, target })
    }
}
