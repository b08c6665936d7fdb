/// One acquired surface texture.
///
/// Holding it prevents acquisition of the next frame, so present promptly.
/// Commands are recorded by the compute host, not here.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl GpuFrame {
    pub fn present(self) {
        drop(self.view);
        self.surface_texture.present();
    }
}
