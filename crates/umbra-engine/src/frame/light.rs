use glam::Vec3;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum LightKind {
    #[default]
    Directional,
    Point,
    Spot,
}

/// Scene light injected into each frame.
///
/// Directional lights only use `forward`; positional kinds only use `position`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    /// Direction the light travels.
    pub forward: Vec3,
}

impl Light {
    pub fn directional(forward: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            position: Vec3::ZERO,
            forward: forward.normalize_or(Vec3::NEG_Y),
        }
    }

    pub fn point(position: Vec3) -> Self {
        Self { kind: LightKind::Point, position, forward: Vec3::NEG_Y }
    }

    pub fn spot(position: Vec3, forward: Vec3) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            forward: forward.normalize_or(Vec3::NEG_Y),
        }
    }

    #[inline]
    pub fn is_positional(&self) -> bool {
        self.kind != LightKind::Directional
    }
}

/// Straight-down directional light, used when the frame supplies none.
impl Default for Light {
    fn default() -> Self {
        Self::directional(Vec3::NEG_Y)
    }
}
