//! Unique table.
//!
//! A bucket array of chain heads. Chains are threaded through the `next`
//! field of the nodes themselves, so the table owns no per-node memory. The
//! table doubles when the number of resident nodes exceeds
//! `size * load_limit`, and may be halved after a collection.

use log::debug;

use crate::error::{BddError, BddResult};
use crate::node::Node;
use crate::reference::Ref;
use crate::store::NodeStore;
use crate::types::{Level, NodeId};

pub struct UniqueTable {
    buckets: Vec<NodeId>,
    load_limit: f64,
    next_limit: usize,
}

fn alloc_buckets(size: usize) -> BddResult<Vec<NodeId>> {
    assert!(size.is_power_of_two(), "Table size must be a power of two, got {}", size);
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(size).map_err(|_| BddError::Overflow)?;
    buckets.resize(size, NodeId::TERMINAL);
    Ok(buckets)
}

impl UniqueTable {
    pub fn new(size: usize, load_limit: f64) -> BddResult<Self> {
        let mut table = Self {
            buckets: alloc_buckets(size)?,
            load_limit,
            next_limit: 0,
        };
        table.update_limit();
        Ok(table)
    }

    /// Number of buckets.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_limit(&self) -> f64 {
        self.load_limit
    }

    pub fn set_load_limit(&mut self, load_limit: f64) {
        self.load_limit = load_limit;
        self.update_limit();
    }

    fn update_limit(&mut self) {
        self.next_limit = (self.buckets.len() as f64 * self.load_limit) as usize;
    }

    fn index(&self, level: Level, low: Ref, high: Ref) -> usize {
        (Node::signature_hash(level, low, high) as usize) & (self.buckets.len() - 1)
    }

    /// Looks up the node with the given signature.
    pub fn find(&self, store: &NodeStore, level: Level, low: Ref, high: Ref) -> Option<NodeId> {
        let mut id = self.buckets[self.index(level, low, high)];
        while !id.is_terminal() {
            let node = store.node(id);
            if node.level == level && node.low == low && node.high == high {
                return Some(id);
            }
            id = node.next;
        }
        None
    }

    /// Links a freshly allocated node into its bucket.
    pub fn insert(&mut self, store: &mut NodeStore, id: NodeId) {
        let node = store.node_mut(id);
        let b = self.index(node.level, node.low, node.high);
        node.next = self.buckets[b];
        self.buckets[b] = id;
    }

    /// Whether `node_count` resident nodes call for a bigger table.
    pub fn needs_grow(&self, node_count: usize) -> bool {
        node_count > self.next_limit
    }

    /// Rehashes every chain into a table of `new_size` buckets.
    pub fn resize(&mut self, store: &mut NodeStore, new_size: usize) -> BddResult<()> {
        debug!("unique table resize: {} -> {}", self.size(), new_size);

        let old = std::mem::replace(&mut self.buckets, alloc_buckets(new_size)?);
        for head in old {
            let mut id = head;
            while !id.is_terminal() {
                let next = store.node(id).next;
                self.insert(store, id);
                id = next;
            }
        }
        self.update_limit();
        Ok(())
    }

    /// Size the table should shrink to for `node_count` nodes, if smaller.
    pub fn shrink_target(&self, node_count: usize, min_size: usize) -> Option<usize> {
        let wanted = ((node_count * 2) as f64 / self.load_limit) as usize;
        let mut size = self.size();
        while size > min_size && size / 2 >= wanted {
            size /= 2;
        }
        (size < self.size()).then_some(size)
    }

    /// Unlinks every node without activations. Returns the number unlinked.
    pub fn sweep(&mut self, store: &mut NodeStore) -> usize {
        let mut removed = 0;
        for b in 0..self.buckets.len() {
            let mut prev: Option<NodeId> = None;
            let mut id = self.buckets[b];
            while !id.is_terminal() {
                let node = store.node(id);
                let next = node.next;
                if node.is_garbage() {
                    match prev {
                        None => self.buckets[b] = next,
                        Some(p) => store.node_mut(p).next = next,
                    }
                    removed += 1;
                } else {
                    prev = Some(id);
                }
                id = next;
            }
        }
        removed
    }

    /// Number of nodes reachable through the chains.
    pub fn count_linked(&self, store: &NodeStore) -> usize {
        let mut count = 0;
        for &head in &self.buckets {
            let mut id = head;
            while !id.is_terminal() {
                count += 1;
                id = store.node(id).next;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::reference::ManagerId;

    fn add(store: &mut NodeStore, table: &mut UniqueTable, level: u32, low: Ref, high: Ref) -> NodeId {
        let id = store.alloc(Node::new(Level::new(level), low, high)).unwrap();
        table.insert(store, id);
        id
    }

    #[test]
    fn test_find_after_insert() {
        let mut store = NodeStore::new(usize::MAX);
        let mut table = UniqueTable::new(8, 2.0).unwrap();
        let a = add(&mut store, &mut table, 0, Ref::ZERO, Ref::ONE);
        let b = add(&mut store, &mut table, 1, Ref::ZERO, Ref::ONE);
        assert_eq!(table.find(&store, Level::new(0), Ref::ZERO, Ref::ONE), Some(a));
        assert_eq!(table.find(&store, Level::new(1), Ref::ZERO, Ref::ONE), Some(b));
        assert_eq!(table.find(&store, Level::new(2), Ref::ZERO, Ref::ONE), None);
        assert_eq!(table.count_linked(&store), 2);
    }

    #[test]
    fn test_resize_keeps_all_nodes() {
        let mut store = NodeStore::new(usize::MAX);
        let mut table = UniqueTable::new(4, 2.0).unwrap();
        let ids: Vec<_> = (0..100).map(|i| add(&mut store, &mut table, i, Ref::ZERO, Ref::ONE)).collect();
        assert!(table.needs_grow(store.node_count()));
        table.resize(&mut store, 128).unwrap();
        assert_eq!(table.size(), 128);
        assert!(!table.needs_grow(store.node_count()));
        for (i, &id) in ids.iter().enumerate() {
            assert_eq!(table.find(&store, Level::new(i as u32), Ref::ZERO, Ref::ONE), Some(id));
        }
        assert_eq!(table.count_linked(&store), 100);
    }

    #[test]
    fn test_sweep_unlinks_garbage() {
        let mut store = NodeStore::new(usize::MAX);
        let mut table = UniqueTable::new(2, 2.0).unwrap();
        let owner = ManagerId::fresh();
        let a = add(&mut store, &mut table, 1, Ref::ZERO, Ref::ONE);
        let b = add(&mut store, &mut table, 0, Ref::ZERO, Ref::new(owner, a, false));
        add(&mut store, &mut table, 2, Ref::ZERO, Ref::ONE);
        store.node_mut(b).refs = 1;

        let removed = table.sweep(&mut store);
        assert_eq!(removed, 2);
        assert_eq!(table.count_linked(&store), 1);
        assert_eq!(table.find(&store, Level::new(0), Ref::ZERO, Ref::new(owner, a, false)), Some(b));
        assert_eq!(table.find(&store, Level::new(2), Ref::ZERO, Ref::ONE), None);
    }

    #[test]
    fn test_shrink_target() {
        let table = UniqueTable::new(1024, 2.0).unwrap();
        assert_eq!(table.shrink_target(2000, 16), None);
        assert_eq!(table.shrink_target(10, 16), Some(16));
        assert_eq!(table.shrink_target(100, 16), Some(128));
    }
}
