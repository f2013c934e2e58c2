//! Reference tracking and garbage collection.
//!
//! Every node carries an activation counter. Activating an edge increments
//! the counter of its node; when the counter leaves zero the node stops being
//! garbage and its children are activated in turn. Deactivation mirrors this
//! and only descends when a counter drops back to zero, so a shared sub-DAG is
//! counted once per parent node, not once per path.
//!
//! Both walks use an explicit stack, so deep diagrams cannot overflow the
//! native stack here.

use log::{info, warn};

use crate::bdd::Bdd;
use crate::cache::ComputeCache;
use crate::error::BddResult;
use crate::reference::Ref;

impl Bdd {
    /// Pins `f` (and everything below it) across collections.
    pub fn activate(&self, f: Ref) -> BddResult<()> {
        let f = self.check(f)?;
        let mut store = self.store.borrow_mut();
        let mut stack = vec![f];
        while let Some(e) = stack.pop() {
            if e.is_terminal() {
                continue;
            }
            let node = store.node_mut(e.id());
            // A saturated counter is never decremented again.
            if node.refs == u32::MAX {
                continue;
            }
            node.refs += 1;
            if node.refs == 1 {
                stack.push(node.low);
                stack.push(node.high);
                store.dec_garbage();
            }
        }
        Ok(())
    }

    /// Releases one activation of `f`.
    ///
    /// May trigger a collection when enough garbage has accumulated.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if a node on the way has no activation left.
    pub fn deactivate(&self, f: Ref) -> BddResult<()> {
        let f = self.check(f)?;
        {
            let mut store = self.store.borrow_mut();
            let mut stack = vec![f];
            while let Some(e) = stack.pop() {
                if e.is_terminal() {
                    continue;
                }
                let node = store.node_mut(e.id());
                debug_assert!(node.refs > 0, "deactivating unreferenced node {}", e.id());
                if node.refs == 0 || node.refs == u32::MAX {
                    continue;
                }
                node.refs -= 1;
                if node.refs == 0 {
                    stack.push(node.low);
                    stack.push(node.high);
                    store.inc_garbage();
                }
            }
        }

        if self.gc_due() {
            self.collect_garbage(false);
        }
        Ok(())
    }

    fn gc_due(&self) -> bool {
        let config = self.config.borrow();
        let store = self.store.borrow();
        store.node_count() > config.gc_node_limit
            && store.garbage_count() as f64 > store.node_count() as f64 * config.gc_threshold
    }

    /// Reclaims every node without activations.
    ///
    /// Compute-table entries that mention a reclaimed node are dropped first.
    /// With `shrink`, the unique table is halved while it is oversized for
    /// the surviving nodes.
    pub fn collect_garbage(&self, shrink: bool) {
        let name = self.config.borrow().name.clone();
        {
            let store = self.store.borrow();
            info!(
                "[{}] gc #{}: begin (nodes = {}, garbage = {}, free = {})",
                name,
                self.gc_count.get() + 1,
                store.node_count(),
                store.garbage_count(),
                store.free_count()
            );
        }

        // Purge the compute tables while the dying nodes are still readable.
        let swept = {
            let store = self.store.borrow();
            let is_dead = |e: Ref| !e.is_terminal() && store.node(e.id()).is_garbage();
            let mut tables = self.tables.borrow_mut();
            tables.registered().into_iter().map(|t| t.sweep(&is_dead)).sum::<usize>()
        };

        let mut store = self.store.borrow_mut();
        let mut unique = self.unique.borrow_mut();
        let unlinked = unique.sweep(&mut store);
        let reclaimed = store.reclaim();
        debug_assert_eq!(unlinked, reclaimed.freed);
        self.gc_count.set(self.gc_count.get() + 1);

        if shrink {
            let min_size = self.config.borrow().init_size.max(1).next_power_of_two();
            if let Some(size) = unique.shrink_target(store.node_count(), min_size) {
                // On failure the current table stays in place.
                if let Err(e) = unique.resize(&mut store, size) {
                    warn!("[{}] unique table could not shrink to {}: {}", name, size, e);
                }
            }
        }

        info!(
            "[{}] gc #{}: end (freed = {}, released chunks = {}, swept entries = {}, nodes = {}, free = {}, table = {})",
            name,
            self.gc_count.get(),
            reclaimed.freed,
            reclaimed.released_chunks,
            swept,
            store.node_count(),
            store.free_count(),
            unique.size()
        );
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::bdd::BddConfig;

    #[test]
    fn test_fresh_nodes_are_garbage() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1).unwrap();
        let y = bdd.mk_var(2).unwrap();
        let f = bdd.apply_and(x, y).unwrap();
        assert_eq!(bdd.node_count(), 3);
        assert_eq!(bdd.garbage_count(), 3);

        bdd.activate(f).unwrap();
        // `f` and its child `y` are live, the standalone `x` node is not.
        assert_eq!(bdd.garbage_count(), 1);

        bdd.deactivate(f).unwrap();
        assert_eq!(bdd.garbage_count(), 3);
    }

    #[test]
    fn test_shared_children_counted_once() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1).unwrap();
        let y = bdd.mk_var(2).unwrap();
        let f = bdd.apply_and(x, y).unwrap();
        let g = bdd.apply_or(x, y).unwrap();
        bdd.activate(f).unwrap();
        bdd.activate(g).unwrap();
        bdd.activate(f).unwrap();

        bdd.deactivate(f).unwrap();
        bdd.deactivate(g).unwrap();
        bdd.collect_garbage(false);
        // `f` still holds one activation, and so does `y` below it.
        assert_eq!(bdd.node_count(), 2);
        assert_eq!(bdd.high_node(f).unwrap(), y);

        bdd.deactivate(f).unwrap();
        bdd.collect_garbage(false);
        assert_eq!(bdd.node_count(), 0);
        assert_eq!(bdd.gc_count(), 2);
    }

    #[test]
    fn test_collect_keeps_active_roots() {
        let bdd = Bdd::default();
        let vars: Vec<_> = (0..8).map(|i| bdd.mk_var(i).unwrap()).collect();
        let keep = bdd.apply_and_many(vars.iter().copied()).unwrap();
        bdd.apply_xor_many(vars.iter().copied()).unwrap();
        bdd.activate(keep).unwrap();
        let before = bdd.node_count();
        bdd.collect_garbage(true);
        println!("{:?}", bdd);
        assert!(bdd.node_count() < before);
        assert_eq!(bdd.garbage_count(), 0);
        assert_eq!(bdd.size(keep).unwrap(), 8);
        bdd.check_invariants().unwrap();

        // Literal nodes not below `keep` are gone; rebuilding them is fine.
        let vars: Vec<_> = (0..8).map(|i| bdd.mk_var(i).unwrap()).collect();
        let again = bdd.apply_xor_many(vars.iter().copied()).unwrap();
        assert_eq!(bdd.size(again).unwrap(), 8);
        bdd.check_invariants().unwrap();
    }

    #[test]
    fn test_automatic_collection() {
        let bdd = Bdd::new(BddConfig::default().with_gc_node_limit(16).with_gc_threshold(0.5));
        let vars: Vec<_> = (0..12).map(|i| bdd.mk_var(i).unwrap()).collect();
        let f = bdd.apply_xor_many(vars.iter().copied()).unwrap();
        bdd.activate(f).unwrap();
        assert_eq!(bdd.gc_count(), 0);
        bdd.deactivate(f).unwrap();
        assert_eq!(bdd.gc_count(), 1);
        assert_eq!(bdd.node_count(), 0);
    }

    #[test]
    fn test_collection_releases_chunks() {
        let bdd = Bdd::default();
        let vars: Vec<_> = (0..2000).map(|i| bdd.mk_var(i).unwrap()).collect();
        assert_eq!(bdd.chunk_count(), 2);
        bdd.activate(vars[0]).unwrap();
        bdd.collect_garbage(true);
        assert_eq!(bdd.chunk_count(), 1);
        assert_eq!(bdd.node_count(), 1);
        assert_eq!(bdd.table_size(), bdd.config().init_size);
        assert_eq!(bdd.mk_var(0).unwrap(), vars[0]);
    }
}
