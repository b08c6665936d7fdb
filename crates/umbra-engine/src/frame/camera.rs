use glam::{Mat4, Vec3};

/// Camera matrices consumed by the kernel to build primary rays.
///
/// Right-handed, looking down -Z in view space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub camera_to_world: Mat4,
    pub projection: Mat4,
}

impl Camera {
    pub fn new(camera_to_world: Mat4, projection: Mat4) -> Self {
        Self { camera_to_world, projection }
    }

    /// Perspective camera at `eye` looking at `target`.
    ///
    /// `fov_y` is in radians; `aspect` is width / height.
    pub fn look_at(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let world_to_camera = Mat4::look_at_rh(eye, target, up);
        Self {
            camera_to_world: world_to_camera.inverse(),
            projection: Mat4::perspective_rh(fov_y, aspect.max(f32::EPSILON), near, far),
        }
    }

    #[inline]
    pub fn inverse_projection(&self) -> Mat4 {
        self.projection.inverse()
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.camera_to_world.w_axis.truncate()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(
            Vec3::new(0.0, 1.5, 6.0),
            Vec3::ZERO,
            Vec3::Y,
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            100.0,
        )
    }
}
