use crate::reference::Ref;
use crate::types::{Level, NodeId};
use crate::utils::{hash3, MyHash};

/// Traversal mark for positive edges (also used as the generic "visited" bit).
pub(crate) const P_MARK: u8 = 0b01;
/// Traversal mark for negative edges.
pub(crate) const N_MARK: u8 = 0b10;

/// A decision node.
///
/// The `high` edge is never complemented and `low != high`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Node {
    pub level: Level,
    pub low: Ref,
    pub high: Ref,
    /// Next node in the same unique-table bucket.
    pub(crate) next: NodeId,
    /// Number of activations.
    pub(crate) refs: u32,
    pub(crate) marks: u8,
}

impl Node {
    pub(crate) fn new(level: Level, low: Ref, high: Ref) -> Self {
        debug_assert!(!high.is_negated(), "then-edge must be regular");
        debug_assert_ne!(low, high, "redundant node");
        Self {
            level,
            low,
            high,
            next: NodeId::TERMINAL,
            refs: 0,
            marks: 0,
        }
    }

    pub fn is_garbage(&self) -> bool {
        self.refs == 0
    }

    pub fn refs(&self) -> u32 {
        self.refs
    }

    pub(crate) fn signature_hash(level: Level, low: Ref, high: Ref) -> u64 {
        hash3(level.index() as u64, low.raw() as u64, high.raw() as u64)
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        Node::signature_hash(self.level, self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_garbage() {
        let node = Node::new(Level::new(0), Ref::ZERO, Ref::ONE);
        assert!(node.is_garbage());
        assert_eq!(node.refs(), 0);
        assert_eq!(node.marks, 0);
        assert!(node.next.is_terminal());
    }

    #[test]
    fn test_hash_matches_signature() {
        let node = Node::new(Level::new(3), Ref::ZERO, Ref::ONE);
        assert_eq!(node.hash(), Node::signature_hash(Level::new(3), Ref::ZERO, Ref::ONE));
        let other = Node::new(Level::new(4), Ref::ZERO, Ref::ONE);
        assert_ne!(node.hash(), other.hash());
    }
}
