use bytemuck::{Pod, Zeroable};

use super::{Camera, Light};

/// Per-frame uniform block (`params`, binding 3).
///
/// Layout matches WGSL uniform rules (160 bytes):
///
///  offset   0  camera_to_world            mat4x4<f32>
///  offset  64  camera_inverse_projection  mat4x4<f32>
///  offset 128  light                      vec3<f32>
///  offset 140  position_light             u32
///  offset 144  num_shapes                 i32
///  offset 148  padding to 16-byte struct alignment
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameParams {
    pub camera_to_world: [[f32; 4]; 4],
    pub camera_inverse_projection: [[f32; 4]; 4],
    /// Light forward vector when directional, light position otherwise.
    pub light: [f32; 3],
    /// `1` when `light` is a position.
    pub position_light: u32,
    pub num_shapes: i32,
    pub _pad: [u32; 3],
}

const _: () = assert!(std::mem::size_of::<FrameParams>() == 160);

impl FrameParams {
    /// Builds the uniform block for one frame.
    ///
    /// A missing light binds [`Light::default`].
    pub fn bind(camera: &Camera, light: Option<&Light>, num_shapes: usize) -> Self {
        let light = light.copied().unwrap_or_default();
        let (vector, position_light) = if light.is_positional() {
            (light.position, 1)
        } else {
            (light.forward, 0)
        };

        Self {
            camera_to_world: camera.camera_to_world.to_cols_array_2d(),
            camera_inverse_projection: camera.inverse_projection().to_cols_array_2d(),
            light: vector.to_array(),
            position_light,
            num_shapes: i32::try_from(num_shapes).unwrap_or(i32::MAX),
            _pad: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;

    fn camera() -> Camera {
        Camera::new(
            Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)),
            Mat4::perspective_rh(1.0, 1.0, 0.1, 10.0),
        )
    }

    #[test]
    fn uniform_offsets() {
        assert_eq!(std::mem::offset_of!(FrameParams, camera_inverse_projection), 64);
        assert_eq!(std::mem::offset_of!(FrameParams, light), 128);
        assert_eq!(std::mem::offset_of!(FrameParams, position_light), 140);
        assert_eq!(std::mem::offset_of!(FrameParams, num_shapes), 144);
    }

    #[test]
    fn directional_binds_forward() {
        let light = Light::directional(Vec3::new(0.0, 0.0, -2.0));
        let p = FrameParams::bind(&camera(), Some(&light), 4);
        assert_eq!(p.light, [0.0, 0.0, -1.0]);
        assert_eq!(p.position_light, 0);
        assert_eq!(p.num_shapes, 4);
    }

    #[test]
    fn point_and_spot_bind_position() {
        let pos = Vec3::new(1.0, 4.0, 2.0);
        for light in [Light::point(pos), Light::spot(pos, Vec3::NEG_Y)] {
            let p = FrameParams::bind(&camera(), Some(&light), 0);
            assert_eq!(p.light, pos.to_array());
            assert_eq!(p.position_light, 1);
        }
    }

    #[test]
    fn missing_light_is_straight_down() {
        let p = FrameParams::bind(&camera(), None, 1);
        assert_eq!(p.light, [0.0, -1.0, 0.0]);
        assert_eq!(p.position_light, 0);
    }

    #[test]
    fn matrices_are_column_major() {
        let cam = camera();
        let p = FrameParams::bind(&cam, None, 0);
        assert_eq!(p.camera_to_world[3], [0.0, 0.0, 5.0, 1.0]);
        assert_eq!(p.camera_inverse_projection, cam.projection.inverse().to_cols_array_2d());
    }
}
