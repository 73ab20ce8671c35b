/// Parameters for creating a [`super::WgpuDevice`].
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain format when the surface offers one.
    ///
    /// Canvas images are sRGB, so an sRGB screen keeps the final blit a plain copy.
    pub prefer_srgb: bool,

    /// Swap behavior. FIFO is available everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Requested alpha mode; ignored when the surface does not support it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,

    pub required_features: wgpu::Features,

    /// Limits requested from the adapter. `max_texture_dimension_2d` also bounds
    /// image allocation.
    pub required_limits: wgpu::Limits,

    /// Hint for how many frames may be queued ahead of presentation.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
