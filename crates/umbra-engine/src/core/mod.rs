//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and applications
//! such as the studio, so user code never touches runtime internals.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
