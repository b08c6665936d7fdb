/// Which family of surface formats to pick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceFormatPreference {
    /// `*Srgb` formats; the blit output is gamma-encoded by the hardware.
    Srgb,
    /// Plain `*Unorm` formats; destination texels reach the screen unchanged.
    Unorm,
}

/// Initialization parameters for the GPU layer.
///
/// Add configuration flags only when a concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Raymarch output is already display-encoded, so `Unorm` is the default.
    pub format_preference: SurfaceFormatPreference,

    /// Present mode (swap behavior).
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    ///
    /// The raymarch kernel only needs `rgba8unorm` storage textures, which are core.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Desired maximum frame latency for the surface.
    ///
    /// Also the natural `frames_in_flight` for the scene buffer ring.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            format_preference: SurfaceFormatPreference::Unorm,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
