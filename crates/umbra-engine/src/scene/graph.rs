use super::ShapeDescriptor;

/// Read-only traversal of whatever owns the shape descriptors.
///
/// The compiler only ever asks for parentless nodes and their direct children,
/// so deeper attachments are never visited.
pub trait SceneGraphReader {
    type NodeId: Copy;

    /// Parentless nodes, in discovery order.
    fn list_top_level(&self) -> impl Iterator<Item = Self::NodeId> + '_;

    /// Direct children of `node`, in declaration order.
    fn children_of(&self, node: Self::NodeId) -> impl Iterator<Item = Self::NodeId> + '_;

    /// Descriptor attached to `node`, or `None` for nodes that carry no shape.
    fn descriptor(&self, node: Self::NodeId) -> Option<&ShapeDescriptor>;
}

/// Generational handle into a [`SceneGraph`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShapeId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Node {
    descriptor: ShapeDescriptor,
    parent: Option<ShapeId>,
    children: Vec<ShapeId>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed scene graph of shape descriptors.
///
/// Any depth can be authored; only one level of parenting reaches the GPU.
#[derive(Debug, Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<ShapeId>,
    len: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a parentless shape.
    pub fn add(&mut self, descriptor: ShapeDescriptor) -> ShapeId {
        let id = self.insert(descriptor, None);
        self.roots.push(id);
        id
    }

    /// Attaches a shape under `parent`. Returns `None` if `parent` is stale.
    pub fn add_child(&mut self, parent: ShapeId, descriptor: ShapeDescriptor) -> Option<ShapeId> {
        self.node(parent)?;
        let id = self.insert(descriptor, Some(parent));
        self.node_mut(parent)?.children.push(id);
        Some(id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&ShapeDescriptor> {
        self.node(id).map(|n| &n.descriptor)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut ShapeDescriptor> {
        self.node_mut(id).map(|n| &mut n.descriptor)
    }

    pub fn parent_of(&self, id: ShapeId) -> Option<ShapeId> {
        self.node(id)?.parent
    }

    /// Removes `id` and everything attached below it.
    ///
    /// Returns the descriptor that was stored at `id`.
    pub fn remove(&mut self, id: ShapeId) -> Option<ShapeDescriptor> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(p) => {
                if let Some(p) = self.node_mut(p) {
                    p.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }
        self.release(id)
    }

    fn insert(&mut self, descriptor: ShapeDescriptor, parent: Option<ShapeId>) -> ShapeId {
        let node = Node { descriptor, parent, children: Vec::new() };
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return ShapeId { index, generation: slot.generation };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, node: Some(node) });
        ShapeId { index, generation: 0 }
    }

    fn release(&mut self, id: ShapeId) -> Option<ShapeDescriptor> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;

        for child in node.children {
            self.release(child);
        }
        Some(node.descriptor)
    }

    fn node(&self, id: ShapeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: ShapeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }
}

impl SceneGraphReader for SceneGraph {
    type NodeId = ShapeId;

    fn list_top_level(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.roots.iter().copied()
    }

    fn children_of(&self, node: ShapeId) -> impl Iterator<Item = ShapeId> + '_ {
        self.node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
    }

    fn descriptor(&self, node: ShapeId) -> Option<&ShapeDescriptor> {
        self.get(node)
    }
}
