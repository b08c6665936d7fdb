use thiserror::Error;

/// Reason a frame could not be raymarched.
///
/// None of these escape [`DispatchOrchestrator::render_frame`](super::DispatchOrchestrator):
/// the frame degrades to a source pass-through and the error is reported in the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no raymarch kernel is configured")]
    MissingKernel,

    #[error("kernel `{label}` failed to compile: {message}")]
    KernelCompilation { label: String, message: String },

    #[error("failed to allocate {what} ({bytes} bytes)")]
    AllocationFailure { what: &'static str, bytes: u64 },

    #[error("invalid output resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("scene buffer slot is still referenced by in-flight GPU work")]
    BufferInFlight,
}
