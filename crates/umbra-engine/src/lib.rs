//! Umbra engine crate.
//!
//! Raymarches signed-distance-field scenes over a camera image with a WGSL
//! compute kernel. `scene` compiles the shape graph into GPU records, `gpu`
//! owns kernel and buffer lifetimes, `render` runs the per-frame dispatch.
//! `device`, `window` and `core` host it in a winit window.

pub mod core;
pub mod device;
pub mod frame;
pub mod gpu;
pub mod logging;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;
