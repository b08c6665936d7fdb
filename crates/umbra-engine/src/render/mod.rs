//! Per-frame raymarch dispatch.
//!
//! `DispatchOrchestrator` ties the pieces together each frame:
//! - compiles the scene graph into shape records,
//! - uploads them into the ring-buffered scene buffer,
//! - binds camera/light/shape parameters and dispatches the kernel,
//! - composites the result (or the untouched source on failure).
//!
//! Convention:
//! - The kernel writes every destination pixel; misses copy the source pixel.
//! - A failed frame is never fatal. It is reported as `FrameOutcome::PassedThrough`.

mod config;
mod error;
mod orchestrator;

pub use config::RaymarchConfig;
pub use error::RenderError;
pub use orchestrator::{DispatchOrchestrator, FrameInputs, FrameOutcome, FrameStats};
