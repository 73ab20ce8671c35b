use std::path::Path;

use crate::coords::{Rect, Size};
use crate::device::{GraphicsDevice, ImageHandle, PixelFormat};
use crate::error::Result;

/// A samplable GPU image with a known pixel size.
///
/// A texture has exactly one owner and must be handed back with
/// [`Texture::release`]; dropping it leaks the device image.
#[derive(Debug, PartialEq, Eq)]
pub struct Texture {
    size: Size,
    image: ImageHandle,
}

impl Texture {
    /// 4 channels, 8 bits each, sRGB-encoded.
    pub const FORMAT: PixelFormat = PixelFormat::Rgba8UnormSrgb;

    /// Allocates a texture, optionally filled from tightly packed RGBA8 rows.
    ///
    /// A zero size fails with `InvalidGeometry`; a pixel buffer whose length is
    /// not `width * height * 4`, or a size over the device limit, fails with
    /// `DeviceResource`.
    pub fn create<D>(device: &mut D, size: Size, pixels: Option<&[u8]>) -> Result<Self>
    where
        D: GraphicsDevice + ?Sized,
    {
        let image = device.allocate_image(size, Self::FORMAT, pixels, true)?;
        log::debug!("texture #{} created ({}x{})", image.id(), size.width, size.height);
        Ok(Self { size, image })
    }

    pub fn from_image<D>(device: &mut D, image: &image::RgbaImage) -> Result<Self>
    where
        D: GraphicsDevice + ?Sized,
    {
        let (width, height) = image.dimensions();
        Self::create(device, Size::new(width, height), Some(image.as_raw()))
    }

    /// Converts to RGBA8 first when the image uses another layout.
    pub fn from_dynamic_image<D>(device: &mut D, image: &image::DynamicImage) -> Result<Self>
    where
        D: GraphicsDevice + ?Sized,
    {
        match image.as_rgba8() {
            Some(rgba) => Self::from_image(device, rgba),
            None => Self::from_image(device, &image.to_rgba8()),
        }
    }

    /// Decodes an image file (format guessed from its contents) and uploads it.
    pub fn load<D>(device: &mut D, path: impl AsRef<Path>) -> Result<Self>
    where
        D: GraphicsDevice + ?Sized,
    {
        let path = path.as_ref();
        let decoded = image::ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(image::ImageError::IoError)?
            .decode()?;
        log::debug!("decoded {} ({}x{})", path.display(), decoded.width(), decoded.height());
        Self::from_dynamic_image(device, &decoded)
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    /// `(0, 0, width, height)`.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.size)
    }

    #[inline]
    pub fn handle(&self) -> ImageHandle {
        self.image
    }

    pub fn release<D>(self, device: &mut D)
    where
        D: GraphicsDevice + ?Sized,
    {
        log::debug!("texture #{} released", self.image.id());
        device.release_image(self.image);
    }
}
