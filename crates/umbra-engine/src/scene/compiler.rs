use super::{GroupKey, SceneGraphReader, ShapeRecord};

/// Flattens a scene graph into the positional record stream read by the kernel.
///
/// Output shape:
/// - one group per top-level descriptor, groups ordered by the parent's operation
///   (stable with respect to discovery order)
/// - each group is its parent record followed by its direct children in
///   declaration order; the parent's `num_children` holds the child count
/// - descriptors attached below a child are never visited
///
/// Records are rebuilt from scratch on every call. The record and key buffers
/// are reused between calls.
#[derive(Debug, Default)]
pub struct SceneCompiler {
    records: Vec<ShapeRecord>,
    keys: Vec<GroupKey>,
    groups: usize,
}

impl SceneCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles the scene exposed by `scene` and returns the ordered records.
    pub fn compile<R: SceneGraphReader>(&mut self, scene: &R) -> &[ShapeRecord] {
        self.records.clear();
        self.keys.clear();

        let roots: Vec<R::NodeId> = scene
            .list_top_level()
            .filter(|&id| scene.descriptor(id).is_some())
            .collect();

        self.keys.extend(roots.iter().enumerate().filter_map(|(order, &id)| {
            scene
                .descriptor(id)
                .map(|desc| GroupKey::new(desc.operation, order as u32))
        }));

        // Keys carry the discovery index, so an unstable sort still preserves ties.
        self.keys.sort_unstable();

        for key in &self.keys {
            let root = roots[key.order as usize];
            let Some(parent) = scene.descriptor(root) else { continue };

            let header = self.records.len();
            self.records.push(ShapeRecord::top_level(parent));

            let mut num_children = 0i32;
            for child in scene.children_of(root) {
                let Some(desc) = scene.descriptor(child) else { continue };
                self.records.push(ShapeRecord::child_of(parent, desc));
                num_children += 1;
            }
            self.records[header].num_children = num_children;
        }

        self.groups = self.keys.len();
        log::trace!(
            "compiled scene: {} records in {} groups",
            self.records.len(),
            self.groups
        );

        &self.records
    }

    /// Records produced by the last [`compile`](Self::compile).
    #[inline]
    pub fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    /// Serialized form of [`records`](Self::records), ready for upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Number of top-level groups in the last compilation.
    #[inline]
    pub fn groups(&self) -> usize {
        self.groups
    }
}
