//! Per-frame inputs to the kernel: camera, light and the `params` uniform.

mod camera;
mod light;
mod params;

pub use camera::Camera;
pub use light::{Light, LightKind};
pub use params::FrameParams;
