use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Completion flag for one submission.
///
/// Clones share state. The host signals it from its completion callback; the
/// scene buffer checks it before touching a slot again.
#[derive(Debug, Clone, Default)]
pub struct FrameFence(Arc<AtomicBool>);

impl FrameFence {
    /// A fence that has not signalled yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fence for work that is already complete (nothing was submitted).
    pub fn signalled() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_signalled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_signal() {
        let fence = FrameFence::new();
        let observer = fence.clone();
        assert!(!observer.is_signalled());
        fence.signal();
        assert!(observer.is_signalled());
    }

    #[test]
    fn signalled_starts_complete() {
        assert!(FrameFence::signalled().is_signalled());
    }
}
