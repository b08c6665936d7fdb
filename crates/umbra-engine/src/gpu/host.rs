use crate::frame::FrameParams;
use crate::render::RenderError;

use super::{FrameFence, KernelSource, WorkgroupCount};

/// Resources bound to the kernel for one dispatch.
///
/// Slot numbers are fixed by the kernel's binding contract:
/// - `0` source image (sampled)
/// - `1` destination image (storage, write-only)
/// - `2` `shapes` storage buffer
/// - `3` `params` uniform
pub struct KernelBindings<'a, H: ComputeHost + ?Sized> {
    pub source: &'a H::Image,
    pub destination: &'a H::Image,
    pub shapes: &'a H::Buffer,
    pub params: &'a FrameParams,
}

/// GPU API surface the orchestrator drives.
///
/// Everything recorded between two [`submit`](Self::submit) calls executes as a
/// unit on the device. Work may complete several frames after it was recorded,
/// so resources referenced by recorded work must stay alive until the returned
/// fence signals.
pub trait ComputeHost {
    type Buffer;
    type Image;
    type Kernel;

    fn create_kernel(&mut self, source: &KernelSource) -> Result<Self::Kernel, RenderError>;

    /// Allocates a storage buffer of exactly `size` bytes.
    fn create_buffer(&mut self, label: &'static str, size: u64) -> Result<Self::Buffer, RenderError>;

    /// Queues a write visible to every dispatch recorded after it.
    fn write_buffer(&mut self, buffer: &Self::Buffer, data: &[u8]);

    /// Releases a buffer. Callers guarantee no pending work still reads it.
    fn release_buffer(&mut self, buffer: Self::Buffer);

    /// Allocates an image usable as both a storage target and a sampled source.
    fn create_image(
        &mut self,
        label: &'static str,
        width: u32,
        height: u32,
    ) -> Result<Self::Image, RenderError>;

    fn dispatch(
        &mut self,
        kernel: &Self::Kernel,
        bindings: &KernelBindings<'_, Self>,
        groups: WorkgroupCount,
    );

    /// Records a copy of `image` into the host's current output.
    fn composite(&mut self, image: &Self::Image);

    /// Submits everything recorded since the last submit.
    fn submit(&mut self) -> FrameFence;

    /// Drives completion callbacks. With `wait`, blocks until submitted work is done.
    fn poll(&mut self, wait: bool);
}
