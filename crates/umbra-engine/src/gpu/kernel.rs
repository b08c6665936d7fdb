use std::borrow::Cow;

use crate::render::RenderError;

/// Edge length of the kernel's square workgroup tile.
pub const TILE_SIZE: u32 = 8;

/// WGSL source of the built-in raymarch kernel.
pub const RAYMARCH_WGSL: &str = include_str!("shaders/raymarch.wgsl");

/// Entry point of [`RAYMARCH_WGSL`].
pub const RAYMARCH_ENTRY: &str = "raymarch";

/// Number of workgroups for one dispatch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WorkgroupCount {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl WorkgroupCount {
    /// Enough 8×8 tiles to cover a `width`×`height` image. Partial edge tiles round up.
    pub fn for_resolution(width: u32, height: u32) -> Self {
        Self {
            x: width.div_ceil(TILE_SIZE),
            y: height.div_ceil(TILE_SIZE),
            z: 1,
        }
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }
}

/// Where the raymarch kernel comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelSource {
    /// The kernel bundled with the engine.
    Builtin,
    /// A user-supplied kernel honouring the same binding contract.
    Wgsl {
        label: String,
        source: Cow<'static, str>,
        entry_point: String,
    },
}

impl KernelSource {
    pub fn label(&self) -> &str {
        match self {
            KernelSource::Builtin => "umbra raymarch",
            KernelSource::Wgsl { label, .. } => label,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            KernelSource::Builtin => RAYMARCH_WGSL,
            KernelSource::Wgsl { source, .. } => source,
        }
    }

    pub fn entry_point(&self) -> &str {
        match self {
            KernelSource::Builtin => RAYMARCH_ENTRY,
            KernelSource::Wgsl { entry_point, .. } => entry_point,
        }
    }
}

/// Parses and validates a kernel before any pipeline is created.
///
/// Checks that the named entry point exists, is a compute stage, and uses the
/// tile size the dispatch math assumes.
pub fn validate_kernel(kernel: &KernelSource) -> Result<(), RenderError> {
    let source = kernel.source();
    let fail = |message: String| RenderError::KernelCompilation {
        label: kernel.label().to_string(),
        message,
    };

    let module = naga::front::wgsl::parse_str(source).map_err(|e| fail(e.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| fail(e.emit_to_string(source)))?;

    let entry = module
        .entry_points
        .iter()
        .find(|ep| ep.name == kernel.entry_point())
        .ok_or_else(|| fail(format!("entry point `{}` not found", kernel.entry_point())))?;

    if entry.stage != naga::ShaderStage::Compute {
        return Err(fail(format!(
            "entry point `{}` is not a compute shader",
            entry.name
        )));
    }

    if entry.workgroup_size != [TILE_SIZE, TILE_SIZE, 1] {
        return Err(fail(format!(
            "entry point `{}` has workgroup size {:?}, expected [{TILE_SIZE}, {TILE_SIZE}, 1]",
            entry.name, entry.workgroup_size
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wgsl(source: &'static str, entry_point: &str) -> KernelSource {
        KernelSource::Wgsl {
            label: "test".into(),
            source: Cow::Borrowed(source),
            entry_point: entry_point.into(),
        }
    }

    #[test]
    fn workgroups_round_up() {
        assert_eq!(
            WorkgroupCount::for_resolution(1920, 1080),
            WorkgroupCount { x: 240, y: 135, z: 1 }
        );
        assert_eq!(
            WorkgroupCount::for_resolution(1921, 1),
            WorkgroupCount { x: 241, y: 1, z: 1 }
        );
        assert_eq!(WorkgroupCount::for_resolution(8, 8).total(), 1);
    }

    #[test]
    fn builtin_kernel_validates() {
        assert_eq!(validate_kernel(&KernelSource::Builtin), Ok(()));
    }

    #[test]
    fn syntax_error_is_reported() {
        let err = validate_kernel(&wgsl("fn broken( {", "main")).unwrap_err();
        assert!(matches!(err, RenderError::KernelCompilation { .. }));
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let src = "@compute @workgroup_size(8, 8, 1) fn other() {}";
        let err = validate_kernel(&wgsl(src, "main")).unwrap_err();
        match err {
            RenderError::KernelCompilation { message, .. } => assert!(message.contains("main")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_tile_size_is_reported() {
        let src = "@compute @workgroup_size(16, 16, 1) fn main() {}";
        assert!(validate_kernel(&wgsl(src, "main")).is_err());
    }

    #[test]
    fn conforming_custom_kernel_validates() {
        let src = "@compute @workgroup_size(8, 8, 1) fn main() {}";
        assert_eq!(validate_kernel(&wgsl(src, "main")), Ok(()));
    }
}
