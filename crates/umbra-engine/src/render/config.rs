use crate::gpu::KernelSource;

/// Orchestrator configuration.
///
/// Keep this structure minimal; per-shape authoring lives on `ShapeDescriptor`.
#[derive(Debug, Clone)]
pub struct RaymarchConfig {
    /// Kernel to dispatch. `None` turns every frame into a source pass-through.
    pub kernel: Option<KernelSource>,

    /// Scene buffer slots kept alive for work the device has not finished yet.
    ///
    /// Should match the surface's frame latency. Values below 1 are treated as 1.
    pub frames_in_flight: usize,
}

impl Default for RaymarchConfig {
    fn default() -> Self {
        Self {
            kernel: Some(KernelSource::Builtin),
            frames_in_flight: 2,
        }
    }
}
