use winit::window::Window;

use crate::device::Gpu;
use crate::time::FrameTime;

use super::app::AppControl;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the surface texture, lets `draw` record and submit into it, then presents.
    ///
    /// `draw` receives the surface view, its format and its size in physical pixels.
    /// Surface errors skip the frame; only fatal ones return `Exit`.
    pub fn present<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&wgpu::TextureView, wgpu::TextureFormat, (u32, u32)),
    {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        let frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return if self.gpu.handle_surface_error(err).is_fatal() {
                    AppControl::Exit
                } else {
                    AppControl::Continue
                };
            }
        };

        draw(&frame.view, self.gpu.surface_format(), (size.width, size.height));

        self.window.pre_present_notify();
        frame.present();
        AppControl::Continue
    }
}
