//! Swapchain helpers for [`super::WgpuDevice`].

use crate::coords::Size;

/// What to do after the surface refused to hand out a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame should succeed.
    Reconfigured,
    /// Transient; skip this frame.
    SkipFrame,
    /// Unrecoverable (out of memory).
    Fatal,
}

pub(super) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = caps.formats.first().copied()?;

    if prefer_srgb {
        if let Some(srgb) = caps.formats.iter().copied().find(|f| f.is_srgb()) {
            return Some(srgb);
        }
    }

    Some(first)
}

pub(super) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Applies a new drawable size. Zero-sized surfaces (minimized windows) cannot
/// be configured, so only the stored size changes until a real size arrives.
pub(super) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    new_size: Size,
) {
    if new_size.is_empty() {
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(super) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    err: &wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if config.width > 0 && config.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}
