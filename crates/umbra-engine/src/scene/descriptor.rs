use glam::Vec3;

/// Primitive surface evaluated by the raymarch kernel.
///
/// The discriminant is written verbatim into [`ShapeRecord::shape_type`](super::ShapeRecord).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(i32)]
pub enum ShapeKind {
    #[default]
    Sphere = 0,
    Cube = 1,
    Torus = 2,
}

impl ShapeKind {
    #[inline]
    pub const fn ordinal(self) -> i32 {
        self as i32
    }
}

/// Boolean-style combination of a shape with the geometry accumulated before it.
///
/// The ordinal doubles as the global precedence of top-level groups: every
/// `None` group is emitted before any `Blend` group, and so on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[repr(i32)]
pub enum Operation {
    #[default]
    None = 0,
    Blend = 1,
    Cut = 2,
    Mask = 3,
}

impl Operation {
    #[inline]
    pub const fn ordinal(self) -> i32 {
        self as i32
    }
}

/// Linear RGB color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Authoring data for one primitive instance.
///
/// `position` and `scale` are expressed in the owning node's local space; the
/// parent link lives in the scene graph, not here. Descriptors are read-only to
/// the compiler: per-group child counts are derived into the output records.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    pub operation: Operation,
    pub position: Vec3,
    pub scale: Vec3,
    pub color: Rgb,
    /// Blend radius in `[0, 1]`. Amplified when serialized.
    pub blend_strength: f32,
}

impl ShapeDescriptor {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            operation: Operation::None,
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Rgb::WHITE,
            blend_strength: 0.0,
        }
    }

    pub fn sphere() -> Self {
        Self::new(ShapeKind::Sphere)
    }

    pub fn cube() -> Self {
        Self::new(ShapeKind::Cube)
    }

    pub fn torus() -> Self {
        Self::new(ShapeKind::Torus)
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn colored(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Sets the blend strength, clamped to `[0, 1]`.
    pub fn with_blend(mut self, strength: f32) -> Self {
        self.blend_strength = strength.clamp(0.0, 1.0);
        self
    }
}

impl Default for ShapeDescriptor {
    fn default() -> Self {
        Self::sphere()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_order_follows_ordinal() {
        let mut ops = [Operation::Mask, Operation::None, Operation::Cut, Operation::Blend];
        ops.sort();
        assert_eq!(ops, [Operation::None, Operation::Blend, Operation::Cut, Operation::Mask]);
        assert_eq!(Operation::Mask.ordinal(), 3);
    }

    #[test]
    fn kind_ordinals_are_stable() {
        assert_eq!(ShapeKind::Sphere.ordinal(), 0);
        assert_eq!(ShapeKind::Cube.ordinal(), 1);
        assert_eq!(ShapeKind::Torus.ordinal(), 2);
    }

    #[test]
    fn blend_is_clamped() {
        assert_eq!(ShapeDescriptor::sphere().with_blend(4.0).blend_strength, 1.0);
        assert_eq!(ShapeDescriptor::sphere().with_blend(-1.0).blend_strength, 0.0);
    }
}
