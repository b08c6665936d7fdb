//! GPU resource layer for the raymarch kernel.
//!
//! `ComputeHost` is the seam between the orchestrator and a GPU API. `WgpuHost`
//! implements it on wgpu; tests use a recording mock. `SceneBuffer` owns the
//! `shapes` storage buffers and keeps them alive until the device is done with them.

mod fence;
mod host;
mod kernel;
mod scene_buffer;
mod wgpu_host;

#[cfg(test)]
pub(crate) mod mock;

pub use fence::FrameFence;
pub use host::{ComputeHost, KernelBindings};
pub use kernel::{KernelSource, RAYMARCH_ENTRY, RAYMARCH_WGSL, TILE_SIZE, WorkgroupCount, validate_kernel};
pub use scene_buffer::SceneBuffer;
pub use wgpu_host::{WgpuHost, WgpuImage, WgpuKernel};
