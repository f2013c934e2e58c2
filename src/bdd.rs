//! The BDD manager.
//!
//! [`Bdd`] owns the variable table, the node store, the unique table and all
//! compute tables of one diagram universe. Functions are handled through
//! [`Ref`] edges; every edge returned by a manager is tagged with its
//! [`ManagerId`], and passing it to another manager yields
//! [`BddError::ForeignManager`].
//!
//! ## Canonical form
//!
//! Nodes are reduced and ordered, with complement edges: the then-edge of a
//! stored node is never complemented, and a node never has two equal
//! children. [`Bdd::mk_node`] is the only place where nodes are created and
//! enforces both rules, so two edges of one manager are equal iff they denote
//! the same function.
//!
//! ## Memory
//!
//! A new node starts without activations and counts as garbage. Clients pin
//! the functions they keep with [`Bdd::activate`] and release them with
//! [`Bdd::deactivate`]; unreferenced nodes stay resident (and keep serving
//! cache hits) until [`Bdd::collect_garbage`] runs, either explicitly or
//! automatically after a deactivation once enough garbage has piled up.
//!
//! All methods take `&self`: the internal state lives in `RefCell`s, and no
//! borrow is held across a recursive call.

use std::cell::{Cell, RefCell};
use std::fmt::Debug;

use log::warn;

use crate::cache::{CacheStats, ComputeCache, Tables};
use crate::error::{BddError, BddResult};
use crate::node::Node;
use crate::reference::{ManagerId, Ref};
use crate::store::NodeStore;
use crate::table::UniqueTable;
use crate::types::{Level, Lit, VarId};
use crate::vars::VarTable;

/// Manager configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BddConfig {
    /// Prefix of every log record of the manager.
    pub name: String,
    /// Fraction of garbage nodes that triggers an automatic collection.
    pub gc_threshold: f64,
    /// No automatic collection below this many resident nodes.
    pub gc_node_limit: usize,
    /// Unique-table load (nodes per bucket) before doubling.
    pub nt_load_limit: f64,
    /// Compute-table load before doubling.
    pub rt_load_limit: f64,
    pub rt_init_size: usize,
    pub rt_max_size: usize,
    /// Hard cap on resident nodes.
    pub node_limit: usize,
    /// Initial (and minimal) unique-table size.
    pub init_size: usize,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            name: "bdd".to_string(),
            gc_threshold: 0.10,
            gc_node_limit: 64 * 1024,
            nt_load_limit: 2.0,
            rt_load_limit: 0.8,
            rt_init_size: 1 << 10,
            rt_max_size: 1 << 20,
            node_limit: 1 << 26,
            init_size: 1 << 10,
        }
    }
}

impl BddConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_gc_threshold(mut self, threshold: f64) -> Self {
        self.gc_threshold = threshold;
        self
    }

    pub fn with_gc_node_limit(mut self, limit: usize) -> Self {
        self.gc_node_limit = limit;
        self
    }

    pub fn with_nt_load_limit(mut self, limit: f64) -> Self {
        self.nt_load_limit = limit;
        self
    }

    pub fn with_rt_load_limit(mut self, limit: f64) -> Self {
        self.rt_load_limit = limit;
        self
    }

    pub fn with_rt_init_size(mut self, size: usize) -> Self {
        self.rt_init_size = size;
        self
    }

    pub fn with_rt_max_size(mut self, size: usize) -> Self {
        self.rt_max_size = size;
        self
    }

    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = limit;
        self
    }

    pub fn with_init_size(mut self, size: usize) -> Self {
        self.init_size = size;
        self
    }
}

pub struct Bdd {
    id: ManagerId,
    pub(crate) config: RefCell<BddConfig>,
    pub(crate) vars: RefCell<VarTable>,
    pub(crate) store: RefCell<NodeStore>,
    pub(crate) unique: RefCell<UniqueTable>,
    pub(crate) tables: RefCell<Tables>,
    pub(crate) gc_count: Cell<usize>,
}

impl Bdd {
    /// Creates a manager.
    ///
    /// # Panics
    ///
    /// Panics if the initial unique table cannot be allocated. Use
    /// [`Bdd::try_new`] to get [`BddError::Overflow`] instead.
    pub fn new(config: BddConfig) -> Self {
        match Self::try_new(config) {
            Ok(bdd) => bdd,
            Err(e) => panic!("Could not allocate the unique table: {}", e),
        }
    }

    /// Creates a manager, reporting a failed initial allocation.
    pub fn try_new(config: BddConfig) -> BddResult<Self> {
        let init_size = config.init_size.max(1).checked_next_power_of_two().ok_or(BddError::Overflow)?;
        let unique = UniqueTable::new(init_size, config.nt_load_limit)?;
        let tables = Tables::new(config.rt_init_size, config.rt_load_limit, config.rt_max_size);
        Ok(Self {
            id: ManagerId::fresh(),
            vars: RefCell::new(VarTable::new()),
            store: RefCell::new(NodeStore::new(config.node_limit)),
            unique: RefCell::new(unique),
            tables: RefCell::new(tables),
            gc_count: Cell::new(0),
            config: RefCell::new(config),
        })
    }

    pub fn id(&self) -> ManagerId {
        self.id
    }

    pub fn name(&self) -> String {
        self.config.borrow().name.clone()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> BddConfig {
        self.config.borrow().clone()
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new(BddConfig::default())
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("name", &self.config.borrow().name)
            .field("vars", &self.var_count())
            .field("nodes", &self.node_count())
            .field("garbage", &self.garbage_count())
            .field("free", &self.free_count())
            .field("table_size", &self.table_size())
            .field("gc_count", &self.gc_count())
            .finish()
    }
}

// Configuration setters.
impl Bdd {
    pub fn set_name(&self, name: impl Into<String>) {
        self.config.borrow_mut().name = name.into();
    }

    pub fn set_gc_threshold(&self, threshold: f64) {
        self.config.borrow_mut().gc_threshold = threshold;
    }

    pub fn set_gc_node_limit(&self, limit: usize) {
        self.config.borrow_mut().gc_node_limit = limit;
    }

    pub fn set_nt_load_limit(&self, limit: f64) {
        self.config.borrow_mut().nt_load_limit = limit;
        self.unique.borrow_mut().set_load_limit(limit);
    }

    pub fn set_rt_load_limit(&self, limit: f64) {
        self.config.borrow_mut().rt_load_limit = limit;
        for table in self.tables.borrow_mut().registered() {
            table.set_load_limit(limit);
        }
    }

    pub fn set_rt_max_size(&self, size: usize) {
        self.config.borrow_mut().rt_max_size = size;
        for table in self.tables.borrow_mut().registered() {
            table.set_max_size(size);
        }
    }

    pub fn set_node_limit(&self, limit: usize) {
        self.config.borrow_mut().node_limit = limit;
        self.store.borrow_mut().set_node_limit(limit);
    }
}

// Counters.
impl Bdd {
    /// Number of resident nodes, live or garbage.
    pub fn node_count(&self) -> usize {
        self.store.borrow().node_count()
    }

    /// Number of resident nodes without activations.
    pub fn garbage_count(&self) -> usize {
        self.store.borrow().garbage_count()
    }

    /// Number of reusable slots.
    pub fn free_count(&self) -> usize {
        self.store.borrow().free_count()
    }

    /// Number of completed collections.
    pub fn gc_count(&self) -> usize {
        self.gc_count.get()
    }

    pub fn chunk_count(&self) -> usize {
        self.store.borrow().chunk_count()
    }

    /// Bytes held by node chunks and the unique table.
    pub fn used_mem(&self) -> usize {
        self.store.borrow().used_mem() + self.table_size() * std::mem::size_of::<u32>()
    }

    /// Number of unique-table buckets.
    pub fn table_size(&self) -> usize {
        self.unique.borrow().size()
    }

    pub fn cache_stats(&self) -> Vec<CacheStats> {
        self.tables.borrow_mut().stats()
    }

    /// Drops every compute-table entry.
    pub fn clear_caches(&self) {
        for table in self.tables.borrow_mut().registered() {
            table.clear();
        }
    }
}

// Variables.
impl Bdd {
    pub fn var_count(&self) -> usize {
        self.vars.borrow().len()
    }

    /// Declares `var` (appending it to the order if new) and returns its level.
    pub fn declare_var(&self, var: impl Into<VarId>) -> BddResult<Level> {
        self.vars.borrow_mut().declare(var.into())
    }

    /// Level of a declared variable.
    ///
    /// # Panics
    ///
    /// Panics if `var` was never declared.
    pub fn level_of(&self, var: impl Into<VarId>) -> Level {
        self.vars.borrow().level_of(var.into())
    }

    pub(crate) fn find_level(&self, var: VarId) -> Option<Level> {
        self.vars.borrow().find(var)
    }

    /// Variable at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level` is out of range.
    pub fn var_at(&self, level: Level) -> VarId {
        self.vars.borrow().id_of(level)
    }

    /// Declared variables in order.
    pub fn vars(&self) -> Vec<VarId> {
        self.vars.borrow().ids().collect()
    }
}

// Edge inspection.
impl Bdd {
    pub fn zero(&self) -> Ref {
        Ref::ZERO
    }

    pub fn one(&self) -> Ref {
        Ref::ONE
    }

    pub fn is_zero(&self, f: Ref) -> bool {
        f.is_zero()
    }

    pub fn is_one(&self, f: Ref) -> bool {
        f.is_one()
    }

    pub fn is_terminal(&self, f: Ref) -> bool {
        f.is_terminal()
    }

    /// Rejects edges that were not created by this manager.
    pub(crate) fn check(&self, f: Ref) -> BddResult<Ref> {
        if f.owner() == self.id || f.owner() == ManagerId::SHARED {
            Ok(f)
        } else {
            Err(BddError::ForeignManager)
        }
    }

    /// Level of the top node of `f`, [`Level::TERMINAL`] for constants.
    pub(crate) fn level(&self, f: Ref) -> Level {
        if f.is_terminal() {
            Level::TERMINAL
        } else {
            self.store.borrow().node(f.id()).level
        }
    }

    /// Level and both children of `f`, with the polarity of `f` applied.
    pub(crate) fn parts(&self, f: Ref) -> (Level, Ref, Ref) {
        if f.is_terminal() {
            return (Level::TERMINAL, f, f);
        }
        let store = self.store.borrow();
        let node = store.node(f.id());
        (node.level, node.low.negate_if(f.is_negated()), node.high.negate_if(f.is_negated()))
    }

    /// Cofactors of `f` with respect to the variable at `level`.
    ///
    /// `level` must not be below the top level of `f`.
    pub(crate) fn split(&self, f: Ref, level: Level) -> (Ref, Ref) {
        let (top, low, high) = self.parts(f);
        if top == level {
            (low, high)
        } else {
            debug_assert!(top > level, "splitting {} at {} above its top {}", f, level, top);
            (f, f)
        }
    }

    /// Top variable of `f`, `None` for constants.
    pub fn top_var(&self, f: Ref) -> BddResult<Option<VarId>> {
        let f = self.check(f)?;
        let level = self.level(f);
        Ok((!level.is_terminal()).then(|| self.var_at(level)))
    }

    /// Level of the top variable of `f`, [`Level::TERMINAL`] for constants.
    pub fn level_of_ref(&self, f: Ref) -> BddResult<Level> {
        Ok(self.level(self.check(f)?))
    }

    /// Negative cofactor of `f` with respect to its top variable.
    pub fn low_node(&self, f: Ref) -> BddResult<Ref> {
        let (_, low, _) = self.parts(self.check(f)?);
        Ok(low)
    }

    /// Positive cofactor of `f` with respect to its top variable.
    pub fn high_node(&self, f: Ref) -> BddResult<Ref> {
        let (_, _, high) = self.parts(self.check(f)?);
        Ok(high)
    }

    /// Top variable with both cofactors, `None` for constants.
    pub fn root_decomp(&self, f: Ref) -> BddResult<Option<(VarId, Ref, Ref)>> {
        let f = self.check(f)?;
        if f.is_terminal() {
            return Ok(None);
        }
        let (level, low, high) = self.parts(f);
        Ok(Some((self.var_at(level), low, high)))
    }
}

// Node construction.
impl Bdd {
    /// Finds or creates the node `(level, low, high)`.
    ///
    /// Both children must lie strictly below `level`. This is the single
    /// point where nodes enter the unique table.
    pub(crate) fn mk_node(&self, level: Level, low: Ref, high: Ref) -> BddResult<Ref> {
        if low == high {
            return Ok(low);
        }

        // The stored then-edge is always regular.
        let negated = high.is_negated();
        let low = low.negate_if(negated);
        let high = high.negate_if(negated);
        debug_assert!(level < self.level(low) && level < self.level(high), "unordered node at {}", level);

        let mut store = self.store.borrow_mut();
        let mut unique = self.unique.borrow_mut();

        if let Some(id) = unique.find(&store, level, low, high) {
            return Ok(Ref::new(self.id, id, negated));
        }

        let id = store.alloc(Node::new(level, low, high))?;
        unique.insert(&mut store, id);

        if unique.needs_grow(store.node_count()) {
            let new_size = unique.size() * 2;
            // A failed resize leaves the old (overloaded, but intact) table.
            if unique.resize(&mut store, new_size).is_err() {
                warn!("[{}] unique table could not grow to {}", self.config.borrow().name, new_size);
            }
        }

        Ok(Ref::new(self.id, id, negated))
    }

    /// Positive literal of `var`, declaring the variable if new.
    pub fn mk_var(&self, var: impl Into<VarId>) -> BddResult<Ref> {
        let level = self.declare_var(var)?;
        self.mk_node(level, Ref::ZERO, Ref::ONE)
    }

    pub fn mk_literal(&self, lit: Lit) -> BddResult<Ref> {
        Ok(self.mk_var(lit.var())?.negate_if(lit.is_negated()))
    }

    /// Conjunction of literals.
    pub fn mk_cube(&self, lits: impl IntoIterator<Item = Lit>) -> BddResult<Ref> {
        let Some(mut lits) = self.sorted_lits(lits)? else {
            return Ok(Ref::ZERO);
        };
        lits.reverse();
        let mut current = Ref::ONE;
        for (level, negated) in lits {
            current = if negated {
                self.mk_node(level, current, Ref::ZERO)?
            } else {
                self.mk_node(level, Ref::ZERO, current)?
            };
        }
        Ok(current)
    }

    /// Disjunction of literals.
    pub fn mk_clause(&self, lits: impl IntoIterator<Item = Lit>) -> BddResult<Ref> {
        let Some(mut lits) = self.sorted_lits(lits)? else {
            return Ok(Ref::ONE);
        };
        lits.reverse();
        let mut current = Ref::ZERO;
        for (level, negated) in lits {
            current = if negated {
                self.mk_node(level, Ref::ONE, current)?
            } else {
                self.mk_node(level, current, Ref::ONE)?
            };
        }
        Ok(current)
    }

    /// Declares the variables of `lits` and sorts them by level.
    ///
    /// Returns `None` if some variable occurs with both polarities.
    fn sorted_lits(&self, lits: impl IntoIterator<Item = Lit>) -> BddResult<Option<Vec<(Level, bool)>>> {
        let mut sorted = Vec::new();
        for lit in lits {
            sorted.push((self.declare_var(lit.var())?, lit.is_negated()));
        }
        sorted.sort();
        sorted.dedup();
        if sorted.windows(2).any(|w| w[0].0 == w[1].0) {
            return Ok(None);
        }
        Ok(Some(sorted))
    }

    /// `ite(var, high, low)`, with children of any shape.
    pub fn make_bdd(&self, var: impl Into<VarId>, low: Ref, high: Ref) -> BddResult<Ref> {
        let x = self.mk_var(var)?;
        self.apply_ite(x, high, low)
    }

    /// Builds a function from its truth table.
    ///
    /// `values.len()` must be `2^vars.len()`; `vars[0]` is the most
    /// significant bit of the row index.
    ///
    /// # Panics
    ///
    /// Panics if the table has the wrong length.
    pub fn from_truth_table(&self, values: &[bool], vars: &[VarId]) -> BddResult<Ref> {
        assert_eq!(
            values.len(),
            1usize << vars.len(),
            "truth table of {} variables must have {} rows",
            vars.len(),
            1usize << vars.len()
        );
        let literals = vars.iter().map(|&v| self.mk_var(v)).collect::<BddResult<Vec<_>>>()?;
        self.truth_table_step(values, &literals)
    }

    fn truth_table_step(&self, values: &[bool], literals: &[Ref]) -> BddResult<Ref> {
        match literals.split_first() {
            None => Ok(Ref::constant(values[0])),
            Some((&x, rest)) => {
                let half = values.len() / 2;
                let low = self.truth_table_step(&values[..half], rest)?;
                let high = self.truth_table_step(&values[half..], rest)?;
                self.ite_step(x, high, low)
            }
        }
    }
}
