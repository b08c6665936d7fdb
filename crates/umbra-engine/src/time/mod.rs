//! Frame timing.
//!
//! One `FrameClock` per render loop; call `tick()` once per presented frame.
//! Scene animation reads `FrameTime::elapsed`, not wall-clock time.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
