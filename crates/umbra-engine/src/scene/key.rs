use core::cmp::Ordering;

use super::Operation;

/// Sort key for top-level groups.
///
/// Ordering rules:
/// 1) `operation`: ascending ordinal (None, Blend, Cut, Mask)
/// 2) `order`: ascending discovery index, so equal operations keep their relative order
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GroupKey {
    pub operation: Operation,
    /// Discovery index of the group's parent.
    pub order: u32,
}

impl GroupKey {
    #[inline]
    pub const fn new(operation: Operation, order: u32) -> Self {
        Self { operation, order }
    }
}

impl Ord for GroupKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.operation
            .cmp(&other.operation)
            .then(self.order.cmp(&other.order))
    }
}

impl PartialOrd for GroupKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
