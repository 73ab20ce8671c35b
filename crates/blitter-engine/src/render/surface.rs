use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::coords::{
    centered_viewport, fit_within_preserving_aspect, normalize_point, normalize_rect,
    rotate_scale_rect, Rect, Size,
};
use crate::device::{BlitTarget, GraphicsDevice, ImageHandle};
use crate::error::{RenderError, Result};
use crate::paint::Color;
use crate::shader::{ShaderLoader, ShaderPair, BLIT_TEXTURE};

use super::frame::Frame;
use super::pipeline::{EphemeralPipeline, QuadVertex, SpriteJob};
use super::registry::{SurfaceClaim, SurfaceRegistry};
use super::texture::Texture;

/// Construction parameters for a [`RenderSurface`].
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Window size in physical pixels; also the initial canvas size.
    pub size: Size,

    /// Keep the canvas at its initial size across resizes and letterbox it
    /// into the window. When unset the canvas follows the window.
    pub preserve_aspect: bool,

    pub clear_color: Color,

    /// Fill for the window area outside the letterboxed canvas.
    pub letterbox_color: Color,

    /// Linear filtering when sampling sprite textures; nearest otherwise.
    pub smooth_sampling: bool,

    /// Reject draws whose source or destination rect has no area instead of
    /// drawing nothing.
    pub strict_geometry: bool,

    /// Directory holding `blit_texture/blit_texture.{vert,frag}.wgsl`.
    /// `None` uses the embedded shaders.
    pub shader_dir: Option<PathBuf>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            size: Size::new(800, 600),
            preserve_aspect: true,
            clear_color: Color::BLACK,
            letterbox_color: Color::BLACK,
            smooth_sampling: true,
            strict_geometry: false,
            shader_dir: None,
        }
    }
}

/// Where and how to draw one sprite.
///
/// `src` defaults to the whole texture, `dst` to the whole target and
/// `target` to the canvas. `angle` is in degrees, counter-clockwise.
#[derive(Debug, Clone, Copy)]
pub struct DrawParams<'a> {
    pub src: Option<Rect>,
    pub dst: Option<Rect>,
    pub target: Option<&'a Texture>,
    pub angle: f32,
    pub scale: f32,
}

impl Default for DrawParams<'_> {
    fn default() -> Self {
        Self {
            src: None,
            dst: None,
            target: None,
            angle: 0.0,
            scale: 1.0,
        }
    }
}

impl<'a> DrawParams<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src(mut self, rect: impl Into<Rect>) -> Self {
        self.src = Some(rect.into());
        self
    }

    pub fn dst(mut self, rect: impl Into<Rect>) -> Self {
        self.dst = Some(rect.into());
        self
    }

    pub fn target(mut self, texture: &'a Texture) -> Self {
        self.target = Some(texture);
        self
    }

    pub fn angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Offscreen canvas plus presentation buffer bound to one device.
///
/// Draws land on the canvas (or on a texture given as target). [`present`]
/// letterboxes the canvas into the presentation image and copies that to the
/// screen. At most one surface is alive per [`SurfaceRegistry`].
///
/// [`present`]: RenderSurface::present
pub struct RenderSurface<D: GraphicsDevice> {
    device: D,
    window_size: Size,
    /// Canvas size; the reference for aspect-preserving presentation.
    base_size: Size,
    canvas: ImageHandle,
    presentation: ImageHandle,
    preserve_aspect: bool,
    clear_color: Color,
    letterbox_color: Color,
    smooth_sampling: bool,
    strict_geometry: bool,
    shaders: Arc<ShaderPair>,
    _claim: SurfaceClaim,
}

impl<D: GraphicsDevice> RenderSurface<D> {
    /// Creates the surface on the process-wide registry.
    pub fn new(device: D, config: SurfaceConfig) -> Result<Self> {
        Self::with_registry(device, config, SurfaceRegistry::global())
    }

    /// Creates the surface on `registry`.
    ///
    /// Fails with `AlreadyInitialized` while another surface holds the
    /// registry. On any failure, images allocated so far are released and the
    /// registry slot is freed again.
    pub fn with_registry(
        mut device: D,
        config: SurfaceConfig,
        registry: Arc<SurfaceRegistry>,
    ) -> Result<Self> {
        let claim = registry.claim()?;

        let shaders = match &config.shader_dir {
            Some(dir) => ShaderLoader::new(dir).load_dir(BLIT_TEXTURE)?,
            None => Arc::new(ShaderPair::builtin_blit_texture()),
        };

        let size = config.size;
        let canvas = device.allocate_image(size, Texture::FORMAT, None, false)?;
        let presentation = match device.allocate_image(size, Texture::FORMAT, None, false) {
            Ok(image) => image,
            Err(e) => {
                device.release_image(canvas);
                return Err(e);
            }
        };

        log::info!(
            "render surface ready: {}x{}, preserve_aspect={}, shaders={}",
            size.width,
            size.height,
            config.preserve_aspect,
            shaders.name
        );

        Ok(Self {
            device,
            window_size: size,
            base_size: size,
            canvas,
            presentation,
            preserve_aspect: config.preserve_aspect,
            clear_color: config.clear_color,
            letterbox_color: config.letterbox_color,
            smooth_sampling: config.smooth_sampling,
            strict_geometry: config.strict_geometry,
            shaders,
            _claim: claim,
        })
    }

    /// Sets the clear color when given, then fills the canvas with it.
    pub fn clear(&mut self, color: Option<Color>) -> Result<()> {
        if let Some(color) = color {
            self.clear_color = color;
        }
        self.device.clear_image(self.canvas, self.clear_color)
    }

    /// Draws `params.src` of `texture` into `params.dst` of the target,
    /// rotated by `params.angle` around the destination center and scaled by
    /// `params.scale`.
    pub fn draw(&mut self, texture: &Texture, params: DrawParams<'_>) -> Result<()> {
        let (target, target_size) = match params.target {
            Some(t) => (t.handle(), t.size()),
            None => (self.canvas, self.base_size),
        };
        let src = params.src.unwrap_or_else(|| texture.rect());
        let dst = params.dst.unwrap_or_else(|| Rect::from_size(target_size));

        if self.strict_geometry {
            check_area("source rect", src)?;
            check_area("destination rect", dst)?;
        }

        let dst_quad = rotate_scale_rect(dst, params.scale, params.angle)
            .map(|p| normalize_point(p, target_size, true));
        let src_quad = normalize_rect(src, texture.size(), false);
        let vertices = QuadVertex::quad(&dst_quad, &src_quad, Color::WHITE);

        log::trace!(
            "draw texture #{} {src:?} -> image #{} {dst:?} angle={} scale={}",
            texture.handle().id(),
            target.id(),
            params.angle,
            params.scale
        );

        EphemeralPipeline::run_once(
            &mut self.device,
            SpriteJob {
                shaders: &self.shaders,
                target,
                texture: texture.handle(),
                vertices: &vertices,
                filtered: self.smooth_sampling,
            },
        )
    }

    /// Window area the canvas is shown in.
    pub fn viewport(&self) -> Rect {
        if self.preserve_aspect {
            let fitted = fit_within_preserving_aspect(self.window_size, self.base_size);
            centered_viewport(self.window_size, fitted)
        } else {
            Rect::from_size(self.window_size)
        }
    }

    /// Letterboxes the canvas into the presentation image and copies that to
    /// the screen. Only valid inside a frame.
    pub fn present(&mut self) -> Result<()> {
        let viewport = self.viewport();
        self.device.clear_image(self.presentation, self.letterbox_color)?;
        self.device
            .blit_image(self.canvas, BlitTarget::Image(self.presentation), viewport, true)?;
        self.device.blit_image(
            self.presentation,
            BlitTarget::Screen,
            Rect::from_size(self.window_size),
            false,
        )
    }

    /// Follows a window resize.
    ///
    /// The presentation image is always reallocated. The canvas is
    /// reallocated, and the base size replaced, only when aspect preservation
    /// is off. Replacement images are allocated before the old ones are
    /// released, so on error the surface is unchanged. A zero size
    /// (minimized window) is rejected.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let size = Size::new(width, height);
        if size.is_empty() {
            return Err(RenderError::InvalidGeometry {
                what: "window size",
                width: width as f32,
                height: height as f32,
            });
        }

        let canvas = if self.preserve_aspect {
            None
        } else {
            Some(self.device.allocate_image(size, Texture::FORMAT, None, false)?)
        };
        let presentation = match self.device.allocate_image(size, Texture::FORMAT, None, false) {
            Ok(image) => image,
            Err(e) => {
                if let Some(canvas) = canvas {
                    self.device.release_image(canvas);
                }
                return Err(e);
            }
        };

        self.device.resize_screen(size);
        self.window_size = size;

        self.device.release_image(self.presentation);
        self.presentation = presentation;

        if let Some(canvas) = canvas {
            self.device.release_image(self.canvas);
            self.canvas = canvas;
            self.base_size = size;
        }

        log::debug!(
            "surface resized to {width}x{height} (canvas {}x{})",
            self.base_size.width,
            self.base_size.height
        );
        Ok(())
    }

    /// Opens a frame; it ends when the returned guard is dropped.
    pub fn new_frame(&mut self) -> Result<Frame<'_, D>> {
        Frame::begin(self)
    }

    pub fn create_texture(&mut self, size: Size, pixels: Option<&[u8]>) -> Result<Texture> {
        Texture::create(&mut self.device, size, pixels)
    }

    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Result<Texture> {
        Texture::load(&mut self.device, path)
    }

    pub fn release_texture(&mut self, texture: Texture) {
        texture.release(&mut self.device);
    }

    /// Window size.
    pub fn size(&self) -> Size {
        self.window_size
    }

    pub fn canvas_size(&self) -> Size {
        self.base_size
    }

    pub fn canvas(&self) -> ImageHandle {
        self.canvas
    }

    pub fn presentation(&self) -> ImageHandle {
        self.presentation
    }

    pub fn preserve_aspect(&self) -> bool {
        self.preserve_aspect
    }

    /// Takes effect for the next present; the canvas keeps its size until the
    /// next resize.
    pub fn set_preserve_aspect(&mut self, preserve: bool) {
        self.preserve_aspect = preserve;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_letterbox_color(&mut self, color: Color) {
        self.letterbox_color = color;
    }

    pub fn set_smooth_sampling(&mut self, smooth: bool) {
        self.smooth_sampling = smooth;
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: GraphicsDevice> Drop for RenderSurface<D> {
    fn drop(&mut self) {
        self.device.release_image(self.presentation);
        self.device.release_image(self.canvas);
        log::debug!("render surface released");
    }
}

fn check_area(what: &'static str, rect: Rect) -> Result<()> {
    if rect.is_empty() {
        return Err(RenderError::InvalidGeometry {
            what,
            width: rect.width(),
            height: rect.height(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::coords::{triangle_signed_area, Vec2};
    use crate::device::{DeviceCall, HeadlessDevice, PixelFormat};

    fn config(width: u32, height: u32) -> SurfaceConfig {
        SurfaceConfig {
            size: Size::new(width, height),
            ..Default::default()
        }
    }

    fn surface(
        device: &mut HeadlessDevice,
        config: SurfaceConfig,
    ) -> RenderSurface<&mut HeadlessDevice> {
        RenderSurface::with_registry(device, config, SurfaceRegistry::new()).unwrap()
    }

    fn drawn_vertices(calls: &[DeviceCall]) -> Vec<QuadVertex> {
        calls
            .iter()
            .find_map(|c| match c {
                DeviceCall::AllocateBuffer { bytes, index: false, .. } => {
                    Some(bytemuck::pod_collect_to_vec(bytes.as_slice()))
                }
                _ => None,
            })
            .unwrap_or_default()
    }

    #[test]
    fn allocates_canvas_and_presentation_at_window_size() {
        let mut device = HeadlessDevice::new(Size::new(640, 480));
        let s = surface(&mut device, config(640, 480));
        assert_ne!(s.canvas(), s.presentation());
        assert_eq!(s.device().image_size(s.canvas()), Some(Size::new(640, 480)));
        assert_eq!(s.device().image_size(s.presentation()), Some(Size::new(640, 480)));
        assert!(s.device().calls().iter().all(|c| matches!(
            c,
            DeviceCall::AllocateImage {
                samplable: false,
                format: PixelFormat::Rgba8UnormSrgb,
                ..
            }
        )));
    }

    #[test]
    fn second_surface_on_same_registry_is_rejected() {
        let registry = SurfaceRegistry::new();
        let mut a = HeadlessDevice::new(Size::new(10, 10));
        let mut b = HeadlessDevice::new(Size::new(10, 10));

        let first = RenderSurface::with_registry(&mut a, config(10, 10), Arc::clone(&registry))
            .unwrap();
        let err = RenderSurface::with_registry(&mut b, config(10, 10), Arc::clone(&registry))
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::AlreadyInitialized));
        assert_eq!(b.live_images(), 0);

        drop(first);
        assert!(RenderSurface::with_registry(&mut b, config(10, 10), registry).is_ok());
    }

    #[test]
    fn failed_construction_rolls_back() {
        let registry = SurfaceRegistry::new();
        let mut device = HeadlessDevice::new(Size::new(10, 10));
        device.fail_images_after(Some(1));

        let err = RenderSurface::with_registry(&mut device, config(10, 10), Arc::clone(&registry))
            .err();
        assert!(matches!(err, Some(RenderError::DeviceResource { .. })));
        assert_eq!(device.live_images(), 0);
        assert!(!registry.is_claimed());
    }

    #[test]
    fn missing_shader_dir_fails_before_allocating() {
        let registry = SurfaceRegistry::new();
        let mut device = HeadlessDevice::new(Size::new(10, 10));
        let cfg = SurfaceConfig {
            shader_dir: Some(PathBuf::from("no/such/shader/dir")),
            ..config(10, 10)
        };

        let err = RenderSurface::with_registry(&mut device, cfg, Arc::clone(&registry)).err();
        assert!(matches!(err, Some(RenderError::ShaderNotFound { .. })));
        assert_eq!(device.live_images(), 0);
        assert!(!registry.is_claimed());
    }

    #[test]
    fn drop_releases_images() {
        let mut device = HeadlessDevice::new(Size::new(10, 10));
        drop(surface(&mut device, config(10, 10)));
        assert_eq!(device.live_images(), 0);
    }

    #[test]
    fn resize_with_preserved_aspect_keeps_canvas() {
        let mut device = HeadlessDevice::new(Size::new(800, 400));
        let mut s = surface(&mut device, config(800, 400));
        let canvas = s.canvas();
        let presentation = s.presentation();

        s.resize(1000, 400).unwrap();

        assert_eq!(s.canvas(), canvas);
        assert_ne!(s.presentation(), presentation);
        assert_eq!(s.canvas_size(), Size::new(800, 400));
        assert_eq!(s.size(), Size::new(1000, 400));
        assert_eq!(s.device().image_size(s.presentation()), Some(Size::new(1000, 400)));
        assert_eq!(s.device().screen_size(), Size::new(1000, 400));
        assert_eq!(s.device().live_images(), 2);
    }

    #[test]
    fn resize_without_preserved_aspect_replaces_both() {
        let mut device = HeadlessDevice::new(Size::new(800, 400));
        let cfg = SurfaceConfig {
            preserve_aspect: false,
            ..config(800, 400)
        };
        let mut s = surface(&mut device, cfg);
        let canvas = s.canvas();
        let presentation = s.presentation();

        s.resize(300, 200).unwrap();

        assert_ne!(s.canvas(), canvas);
        assert_ne!(s.presentation(), presentation);
        assert_eq!(s.canvas_size(), Size::new(300, 200));
        assert_eq!(s.viewport(), Rect::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(s.device().live_images(), 2);
    }

    #[test]
    fn failed_resize_leaves_surface_intact() {
        let mut device = HeadlessDevice::new(Size::new(800, 400));
        let cfg = SurfaceConfig {
            preserve_aspect: false,
            ..config(800, 400)
        };
        let mut s = surface(&mut device, cfg);
        let (canvas, presentation) = (s.canvas(), s.presentation());
        s.device_mut().fail_images_after(Some(1));

        assert!(s.resize(300, 200).is_err());
        assert_eq!((s.canvas(), s.presentation()), (canvas, presentation));
        assert_eq!(s.size(), Size::new(800, 400));
        assert_eq!(s.device().live_images(), 2);
    }

    #[test]
    fn zero_resize_is_rejected() {
        let mut device = HeadlessDevice::new(Size::new(800, 400));
        let mut s = surface(&mut device, config(800, 400));
        assert!(matches!(
            s.resize(0, 0),
            Err(RenderError::InvalidGeometry { what: "window size", .. })
        ));
        assert_eq!(s.size(), Size::new(800, 400));
    }

    #[test]
    fn letterboxed_viewport_is_centered() {
        let mut device = HeadlessDevice::new(Size::new(800, 400));
        let mut s = surface(&mut device, config(800, 400));
        s.resize(1000, 400).unwrap();
        assert_eq!(s.viewport(), Rect::new(100.0, 0.0, 800.0, 400.0));

        s.resize(800, 1000).unwrap();
        assert_eq!(s.viewport(), Rect::new(0.0, 300.0, 800.0, 400.0));
    }

    #[test]
    fn clear_remembers_color() {
        let mut device = HeadlessDevice::new(Size::new(10, 10));
        let mut s = surface(&mut device, config(10, 10));
        let red = Color::new(1.0, 0.0, 0.0, 1.0);

        s.clear(Some(red)).unwrap();
        s.clear(None).unwrap();

        let canvas = s.canvas();
        let clears: Vec<_> = s
            .device()
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::ClearImage { image, color } => Some((*image, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(clears, vec![(canvas, red), (canvas, red)]);
    }

    #[test]
    fn full_texture_to_full_canvas() {
        let mut device = HeadlessDevice::new(Size::new(100, 50));
        let mut s = surface(&mut device, config(100, 50));
        let tex = s.create_texture(Size::new(10, 10), None).unwrap();
        s.device_mut().take_calls();

        s.draw(&tex, DrawParams::new()).unwrap();

        let v = drawn_vertices(s.device().calls());
        assert_eq!(v.len(), 4);
        // bottom-left, bottom-right, top-right, top-left
        let expected_pos = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
        let expected_uv = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        for i in 0..4 {
            assert_eq!(v[i].pos, expected_pos[i], "pos {i}");
            assert_eq!(v[i].uv, expected_uv[i], "uv {i}");
            assert_eq!(v[i].tint, [1.0; 4]);
        }
        assert_eq!(s.device().live_buffers(), 0);
        assert_eq!(s.device().live_pipelines(), 0);
    }

    #[test]
    fn sub_rect_draw() {
        let mut device = HeadlessDevice::new(Size::new(200, 100));
        let mut s = surface(&mut device, config(200, 100));
        let tex = s.create_texture(Size::new(20, 10), None).unwrap();
        s.device_mut().take_calls();

        let params = DrawParams::new()
            .src([10.0, 0.0, 10.0, 10.0])
            .dst([0.0, 0.0, 100.0, 50.0]);
        s.draw(&tex, params).unwrap();

        let v = drawn_vertices(s.device().calls());
        assert_eq!(v[3].pos, [-1.0, 1.0]);
        assert_eq!(v[1].pos, [0.0, 0.0]);
        assert_eq!(v[3].uv, [0.5, 0.0]);
        assert_eq!(v[1].uv, [1.0, 1.0]);
    }

    #[test]
    fn rotated_draws_keep_both_triangles_on_one_winding() {
        let mut device = HeadlessDevice::new(Size::new(300, 200));
        let mut s = surface(&mut device, config(300, 200));
        let tex = s.create_texture(Size::new(16, 16), None).unwrap();

        for angle in [0.0, 45.0, 90.0, 180.0, 271.0] {
            s.device_mut().take_calls();
            let params = DrawParams::new().dst([50.0, 40.0, 80.0, 60.0]).angle(angle);
            s.draw(&tex, params).unwrap();

            let p: Vec<Vec2> = drawn_vertices(s.device().calls())
                .iter()
                .map(|v| Vec2::new(v.pos[0], v.pos[1]))
                .collect();
            let first = triangle_signed_area(p[0], p[1], p[2]);
            let second = triangle_signed_area(p[2], p[3], p[0]);
            assert!(first * second > 0.0, "angle {angle}: {first} vs {second}");
        }
    }

    #[test]
    fn degenerate_draw_is_tolerated() {
        let mut device = HeadlessDevice::new(Size::new(100, 100));
        let mut s = surface(&mut device, config(100, 100));
        let tex = s.create_texture(Size::new(4, 4), None).unwrap();

        s.draw(&tex, DrawParams::new().dst([10.0, 10.0, 0.0, 0.0])).unwrap();
        s.draw(&tex, DrawParams::new().scale(0.0)).unwrap();
        assert_eq!(s.device().live_buffers(), 0);
    }

    #[test]
    fn zero_destination_draws_nothing() {
        let mut device = HeadlessDevice::new(Size::new(100, 100));
        let mut s = surface(&mut device, config(100, 100));
        let tex = s.create_texture(Size::new(4, 4), None).unwrap();

        s.draw(&tex, DrawParams::new().dst([0.0, 0.0, 0.0, 0.0])).unwrap();

        let v = drawn_vertices(s.device().calls());
        assert_eq!(v.len(), 4);
        assert!(v.iter().all(|v| v.pos == [-1.0, 1.0]));
        assert_eq!(s.device().live_buffers(), 0);
        assert_eq!(s.device().live_pipelines(), 0);
    }

    #[test]
    fn strict_geometry_rejects_degenerate_draw() {
        let mut device = HeadlessDevice::new(Size::new(100, 100));
        let cfg = SurfaceConfig {
            strict_geometry: true,
            ..config(100, 100)
        };
        let mut s = surface(&mut device, cfg);
        let tex = s.create_texture(Size::new(4, 4), None).unwrap();
        s.device_mut().take_calls();

        let err = s
            .draw(&tex, DrawParams::new().src([0.0, 0.0, -4.0, 4.0]))
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidGeometry { what: "source rect", .. }));
        assert!(s.device().calls().is_empty());
    }

    #[test]
    fn draw_into_texture_target() {
        let mut device = HeadlessDevice::new(Size::new(100, 100));
        let mut s = surface(&mut device, config(100, 100));
        let sprite = s.create_texture(Size::new(4, 4), None).unwrap();
        let sheet = s.create_texture(Size::new(40, 20), None).unwrap();
        s.device_mut().take_calls();

        s.draw(&sprite, DrawParams::new().target(&sheet).dst([0.0, 0.0, 20.0, 20.0]))
            .unwrap();

        let target = s.device().calls().iter().find_map(|c| match c {
            DeviceCall::CompilePipeline { target, sampled, .. } => Some((*target, sampled.clone())),
            _ => None,
        });
        assert_eq!(target, Some((sheet.handle(), vec![sprite.handle()])));
        let v = drawn_vertices(s.device().calls());
        assert_eq!(v[1].pos, [0.0, -1.0]);
    }

    #[test]
    fn present_letterboxes_then_copies_to_screen() {
        let mut device = HeadlessDevice::new(Size::new(800, 400));
        let cfg = SurfaceConfig {
            letterbox_color: Color::WHITE,
            ..config(800, 400)
        };
        let mut s = surface(&mut device, cfg);
        s.resize(1000, 400).unwrap();
        let (canvas, presentation) = (s.canvas(), s.presentation());
        s.device_mut().take_calls();

        {
            let mut frame = s.new_frame().unwrap();
            frame.present().unwrap();
        }

        assert_eq!(
            s.device().calls(),
            &[
                DeviceCall::BeginFrame,
                DeviceCall::ClearImage {
                    image: presentation,
                    color: Color::WHITE,
                },
                DeviceCall::Blit {
                    src: canvas,
                    dst: BlitTarget::Image(presentation),
                    viewport: Rect::new(100.0, 0.0, 800.0, 400.0),
                    filtered: true,
                },
                DeviceCall::Blit {
                    src: presentation,
                    dst: BlitTarget::Screen,
                    viewport: Rect::new(0.0, 0.0, 1000.0, 400.0),
                    filtered: false,
                },
                DeviceCall::EndFrame,
            ]
        );
    }

    #[test]
    fn present_outside_frame_fails() {
        let mut device = HeadlessDevice::new(Size::new(10, 10));
        let mut s = surface(&mut device, config(10, 10));
        assert!(matches!(s.present(), Err(RenderError::Frame(_))));
    }
}
