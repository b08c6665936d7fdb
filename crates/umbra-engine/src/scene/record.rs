use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::ShapeDescriptor;

/// Byte stride of one record in the `shapes` storage buffer.
pub const SHAPE_RECORD_STRIDE: usize = 52;

/// Factor applied to `blend_strength`; the kernel expects a blend radius.
pub const BLEND_AMPLIFICATION: f32 = 3.0;

/// Serialized shape, indexed positionally by the kernel.
///
/// Layout (52 bytes, 4-byte aligned, no padding):
///
///  offset  0  position        [f32; 3]
///  offset 12  scale           [f32; 3]
///  offset 24  colour          [f32; 3]
///  offset 36  shape_type      i32
///  offset 40  operation       i32
///  offset 44  blend_strength  f32
///  offset 48  num_children    i32
///
/// The WGSL `Shape` struct in `shaders/raymarch.wgsl` mirrors this field for field.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShapeRecord {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub colour: [f32; 3],
    pub shape_type: i32,
    pub operation: i32,
    pub blend_strength: f32,
    pub num_children: i32,
}

const _: () = assert!(std::mem::size_of::<ShapeRecord>() == SHAPE_RECORD_STRIDE);

impl ShapeRecord {
    /// Record for a parentless descriptor. `num_children` is patched by the compiler.
    pub(crate) fn top_level(desc: &ShapeDescriptor) -> Self {
        Self::encode(desc, desc.position, desc.scale)
    }

    /// Record for a descriptor attached to `parent`.
    ///
    /// Scale composes componentwise with the parent's; position is offset by the
    /// parent's position in the parent's scaled frame.
    pub(crate) fn child_of(parent: &ShapeDescriptor, desc: &ShapeDescriptor) -> Self {
        let scale = desc.scale * parent.scale;
        let position = parent.position + desc.position * parent.scale;
        Self::encode(desc, position, scale)
    }

    fn encode(desc: &ShapeDescriptor, position: Vec3, scale: Vec3) -> Self {
        Self {
            position: position.to_array(),
            scale: scale.to_array(),
            colour: desc.color.to_array(),
            shape_type: desc.kind.ordinal(),
            operation: desc.operation.ordinal(),
            blend_strength: desc.blend_strength.clamp(0.0, 1.0) * BLEND_AMPLIFICATION,
            num_children: 0,
        }
    }
}
