//! Compute tables for operation memoization.
//!
//! Every recursive operator owns one [`ComputeTable`], keyed by a fixed
//! number of input edges. The tables are best-effort: a collision evicts the
//! older entry, so a miss never means "not computed before", only "not known".
//!
//! All tables of a manager are listed in [`Tables`]. The garbage collector
//! walks that list to drop every entry mentioning a node that is about to be
//! reclaimed.

mod compute;

pub use compute::ComputeTable;

use crate::isop::Cover;
use crate::reference::Ref;

/// Value stored in a compute table.
pub trait CacheValue: Clone {
    /// The edge held by the value.
    fn edge(&self) -> Ref;
}

impl CacheValue for Ref {
    fn edge(&self) -> Ref {
        *self
    }
}

impl CacheValue for (Ref, Cover) {
    fn edge(&self) -> Ref {
        self.0
    }
}

pub type CompTbl1 = ComputeTable<1>;
pub type CompTbl2 = ComputeTable<2>;
pub type CompTbl3 = ComputeTable<3>;
pub type IsopTbl = ComputeTable<2, (Ref, Cover)>;

/// Type-erased view of a compute table.
pub trait ComputeCache {
    fn name(&self) -> &'static str;
    fn capacity(&self) -> usize;
    fn used(&self) -> usize;
    fn hits(&self) -> usize;
    fn misses(&self) -> usize;

    /// Drops every entry whose key or value mentions a dead edge.
    fn sweep(&mut self, is_dead: &dyn Fn(Ref) -> bool) -> usize;

    /// Drops every entry.
    fn clear(&mut self);

    fn set_load_limit(&mut self, load_limit: f64);
    fn set_max_size(&mut self, max_size: usize);
}

/// Snapshot of one table's statistics.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CacheStats {
    pub name: &'static str,
    pub capacity: usize,
    pub used: usize,
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    fn of(table: &dyn ComputeCache) -> Self {
        Self {
            name: table.name(),
            capacity: table.capacity(),
            used: table.used(),
            hits: table.hits(),
            misses: table.misses(),
        }
    }
}

/// All compute tables of a manager.
pub(crate) struct Tables {
    pub and: CompTbl2,
    pub xor: CompTbl2,
    pub intersect: CompTbl2,
    pub ite: CompTbl3,
    pub constrain: CompTbl2,
    pub cube_div: CompTbl1,
    pub xor_moment: CompTbl1,
    pub compose: CompTbl1,
    pub smooth: CompTbl1,
    pub and_exist: CompTbl2,
    pub sym: CompTbl1,
    pub sym_pair: CompTbl2,
    pub min_sup: CompTbl2,
    pub isop: IsopTbl,
}

impl Tables {
    pub fn new(init_size: usize, load_limit: f64, max_size: usize) -> Self {
        Self {
            and: ComputeTable::new("and", init_size, load_limit, max_size),
            xor: ComputeTable::new("xor", init_size, load_limit, max_size),
            intersect: ComputeTable::new("intersect", init_size, load_limit, max_size),
            ite: ComputeTable::new("ite", init_size, load_limit, max_size),
            constrain: ComputeTable::new("constrain", init_size, load_limit, max_size),
            cube_div: ComputeTable::new("cube_div", init_size, load_limit, max_size),
            xor_moment: ComputeTable::new("xor_moment", init_size, load_limit, max_size),
            compose: ComputeTable::new("compose", init_size, load_limit, max_size),
            smooth: ComputeTable::new("smooth", init_size, load_limit, max_size),
            and_exist: ComputeTable::new("and_exist", init_size, load_limit, max_size),
            sym: ComputeTable::new("sym", init_size, load_limit, max_size),
            sym_pair: ComputeTable::new("sym_pair", init_size, load_limit, max_size),
            min_sup: ComputeTable::new("min_sup", init_size, load_limit, max_size),
            isop: ComputeTable::new("isop", init_size, load_limit, max_size),
        }
    }

    /// Every table, for sweeping and reconfiguration.
    pub fn registered(&mut self) -> [&mut dyn ComputeCache; 14] {
        [
            &mut self.and,
            &mut self.xor,
            &mut self.intersect,
            &mut self.ite,
            &mut self.constrain,
            &mut self.cube_div,
            &mut self.xor_moment,
            &mut self.compose,
            &mut self.smooth,
            &mut self.and_exist,
            &mut self.sym,
            &mut self.sym_pair,
            &mut self.min_sup,
            &mut self.isop,
        ]
    }

    pub fn stats(&mut self) -> Vec<CacheStats> {
        self.registered().into_iter().map(|t| CacheStats::of(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::reference::ManagerId;
    use crate::types::NodeId;

    #[test]
    fn test_registry_sweeps_all_tables() {
        let mut tables = Tables::new(16, 0.8, 64);
        let a = Ref::new(ManagerId::SHARED, NodeId::new(1), false);
        let b = Ref::new(ManagerId::SHARED, NodeId::new(2), false);
        tables.and.put([a, b], a);
        tables.ite.put([a, b, Ref::ONE], b);
        tables.isop.put([a, b], (b, Cover::default()));
        tables.smooth.put([b], Ref::ONE);

        let removed: usize = tables.registered().into_iter().map(|t| t.sweep(&|r: Ref| r == a)).sum();
        assert_eq!(removed, 3);
        assert_eq!(tables.smooth.get(&[b]), Some(Ref::ONE));

        for t in tables.registered() {
            t.clear();
        }
        assert!(tables.stats().iter().all(|s| s.used == 0));
        assert_eq!(tables.stats().len(), 14);
    }
}
