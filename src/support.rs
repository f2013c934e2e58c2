//! Support sets, cube recognition, symmetry and minimal supports.

use crate::bdd::Bdd;
use crate::cache::ComputeCache;
use crate::error::BddResult;
use crate::node::{N_MARK, P_MARK};
use crate::reference::Ref;
use crate::types::{Level, VarId};

/// Literal polarities seen for one support variable in `scc`.
const SEEN_NEG: u8 = 1;
const SEEN_POS: u8 = 2;

impl Bdd {
    /// Variables `f` depends on, sorted by id.
    pub fn support(&self, f: Ref) -> BddResult<Vec<VarId>> {
        self.support_many(&[f])
    }

    /// Union of the supports of `fs`, sorted by id.
    pub fn support_many(&self, fs: &[Ref]) -> BddResult<Vec<VarId>> {
        for &f in fs {
            self.check(f)?;
        }
        let levels = self.support_levels(fs);
        let mut ids: Vec<VarId> = levels.into_iter().map(|level| self.var_at(level)).collect();
        ids.sort();
        Ok(ids)
    }

    pub fn support_size(&self, f: Ref) -> BddResult<usize> {
        Ok(self.support_levels(&[self.check(f)?]).len())
    }

    /// Positive cube of the support of `f`.
    pub fn support_cube(&self, f: Ref) -> BddResult<Ref> {
        let vars = self.support(f)?;
        self.mk_cube(vars.into_iter().map(|v| v.pos()))
    }

    /// Levels below `fs`, sorted top-down.
    pub(crate) fn support_levels(&self, fs: &[Ref]) -> Vec<Level> {
        let mut levels = Vec::new();
        {
            let mut store = self.store.borrow_mut();
            let mut stack: Vec<Ref> = fs.to_vec();
            while let Some(e) = stack.pop() {
                if e.is_terminal() {
                    continue;
                }
                let node = store.node_mut(e.id());
                if node.marks & P_MARK != 0 {
                    continue;
                }
                node.marks |= P_MARK;
                levels.push(node.level);
                stack.push(node.low);
                stack.push(node.high);
            }
        }
        self.clear_node_marks(fs);
        levels.sort();
        levels.dedup();
        levels
    }

    /// Resets the traversal marks of every node below `roots`.
    pub(crate) fn clear_node_marks(&self, roots: &[Ref]) {
        let mut store = self.store.borrow_mut();
        let mut stack: Vec<Ref> = roots.to_vec();
        while let Some(e) = stack.pop() {
            if e.is_terminal() {
                continue;
            }
            let node = store.node_mut(e.id());
            if node.marks == 0 {
                continue;
            }
            node.marks = 0;
            stack.push(node.low);
            stack.push(node.high);
        }
    }

    /// Is `f` a conjunction of literals? The constant one is the empty cube.
    pub fn is_cube(&self, f: Ref) -> BddResult<bool> {
        self.cube_walk(self.check(f)?, false)
    }

    /// Is `f` a conjunction of positive literals?
    pub fn is_positive_cube(&self, f: Ref) -> BddResult<bool> {
        self.cube_walk(self.check(f)?, true)
    }

    fn cube_walk(&self, f: Ref, positive_only: bool) -> BddResult<bool> {
        let mut e = f;
        while !e.is_terminal() {
            let (_, low, high) = self.parts(e);
            e = if low.is_zero() {
                high
            } else if high.is_zero() && !positive_only {
                low
            } else {
                return Ok(false);
            };
        }
        Ok(e.is_one())
    }

    /// Smallest cube containing `f`.
    ///
    /// A variable occurs in the result iff every satisfying assignment of `f`
    /// gives it the same value. The result for the constant zero is zero.
    pub fn scc(&self, f: Ref) -> BddResult<Ref> {
        let f = self.check(f)?;
        if f.is_terminal() {
            return Ok(f);
        }
        let support = self.support_levels(&[f]);
        let mut seen = vec![0u8; support.len()];
        self.scc_step(f, &support, 0, &mut seen);
        self.clear_node_marks(&[f]);

        let mut lits = Vec::new();
        for (&level, &mark) in support.iter().zip(&seen) {
            let var = self.var_at(level);
            match mark {
                SEEN_NEG => lits.push(var.neg()),
                SEEN_POS => lits.push(var.pos()),
                _ => {}
            }
        }
        self.mk_cube(lits)
    }

    /// Records, for every support variable, which values the satisfying paths
    /// through `e` give it. `pos` is the first support index not yet passed.
    fn scc_step(&self, e: Ref, support: &[Level], mut pos: usize, seen: &mut [u8]) {
        let top = self.level(e);
        // Variables skipped on this path are free.
        while pos < support.len() && support[pos] < top {
            seen[pos] = SEEN_NEG | SEEN_POS;
            pos += 1;
        }
        if e.is_terminal() {
            return;
        }

        let mark = if e.is_negated() { N_MARK } else { P_MARK };
        {
            let mut store = self.store.borrow_mut();
            let node = store.node_mut(e.id());
            if node.marks & mark != 0 {
                return;
            }
            node.marks |= mark;
        }

        let (_, e0, e1) = self.parts(e);
        if !e0.is_zero() {
            seen[pos] |= SEEN_NEG;
            self.scc_step(e0, support, pos + 1, seen);
        }
        if !e1.is_zero() {
            seen[pos] |= SEEN_POS;
            self.scc_step(e1, support, pos + 1, seen);
        }
    }

    /// Checks whether `f` is symmetric in `x` and `y`.
    ///
    /// Positive symmetry is `f|x=0,y=1 == f|x=1,y=0`; with `negative`, the
    /// check is `f|x=0,y=0 == f|x=1,y=1`. A variable is trivially positively
    /// symmetric with itself; `negative` then asks whether `f` ignores it.
    pub fn check_symmetry(&self, f: Ref, x: VarId, y: VarId, negative: bool) -> BddResult<bool> {
        let f = self.check(f)?.regular();
        let lx = self.find_level(x);
        let ly = self.find_level(y);
        let (lx, ly) = match (lx, ly) {
            (None, None) => return Ok(true),
            // f ignores one of them, so both checks reduce to ignoring the other.
            (None, Some(l)) | (Some(l), None) => return Ok(!self.support_levels(&[f]).contains(&l)),
            (Some(lx), Some(ly)) if lx == ly => {
                return Ok(!negative || !self.support_levels(&[f]).contains(&lx));
            }
            (Some(lx), Some(ly)) => (lx.min(ly), lx.max(ly)),
        };

        let res = self.sym_step(f, lx, ly, negative);
        {
            let mut tables = self.tables.borrow_mut();
            tables.sym.clear();
            tables.sym_pair.clear();
        }
        Ok(res)
    }

    fn sym_step(&self, f: Ref, lx: Level, ly: Level, negative: bool) -> bool {
        let level = self.level(f);
        if level > ly {
            return true;
        }
        let (sa, sb) = if negative { (false, true) } else { (true, false) };
        if level > lx {
            return self.sym_pair_step(f, f, ly, sa, sb);
        }

        if let Some(res) = self.tables.borrow_mut().sym.get(&[f]) {
            return res.is_one();
        }
        let (_, f0, f1) = self.parts(f);
        let res = if level == lx {
            self.sym_pair_step(f0, f1, ly, sa, sb)
        } else {
            self.sym_step(f0.regular(), lx, ly, negative) && self.sym_step(f1.regular(), lx, ly, negative)
        };
        self.tables.borrow_mut().sym.put([f], Ref::constant(res));
        res
    }

    /// `a|y=sa == b|y=sb`.
    fn sym_pair_step(&self, a: Ref, b: Ref, ly: Level, sa: bool, sb: bool) -> bool {
        let (a, b) = if a.is_negated() { (-a, -b) } else { (a, b) };
        let top = self.level(a).min(self.level(b));
        if top > ly {
            return a == b;
        }
        if top == ly {
            let (a0, a1) = self.split(a, ly);
            let (b0, b1) = self.split(b, ly);
            let ay = if sa { a1 } else { a0 };
            let by = if sb { b1 } else { b0 };
            return ay == by;
        }

        let key = [a, b];
        if let Some(res) = self.tables.borrow_mut().sym_pair.get(&key) {
            return res.is_one();
        }
        let (a0, a1) = self.split(a, top);
        let (b0, b1) = self.split(b, top);
        let res = self.sym_pair_step(a0, b0, ly, sa, sb) && self.sym_pair_step(a1, b1, ly, sa, sb);
        self.tables.borrow_mut().sym_pair.put(key, Ref::constant(res));
        res
    }

    /// Supports admitted by the interval `[l, u]`.
    ///
    /// The result is a positive-unate function: a positive cube `S` implies it
    /// iff some function depending only on the variables of `S` lies between
    /// `l` and `u`. An empty interval yields zero.
    pub fn minimal_support(&self, l: Ref, u: Ref) -> BddResult<Ref> {
        let l = self.check(l)?;
        let u = self.check(u)?;
        self.min_sup_step(l, u)
    }

    fn min_sup_step(&self, l: Ref, u: Ref) -> BddResult<Ref> {
        if l.is_zero() || u.is_one() {
            return Ok(Ref::ONE);
        }
        if l.is_one() && u.is_zero() {
            return Ok(Ref::ZERO);
        }

        let key = [l, u];
        if let Some(res) = self.tables.borrow_mut().min_sup.get(&key) {
            return Ok(res);
        }

        let top = self.level(l).min(self.level(u));
        let (l0, l1) = self.split(l, top);
        let (u0, u1) = self.split(u, top);
        // Without the top variable, one function must serve both cofactors.
        let lq = self.or_step(l0, l1)?;
        let uq = self.and_step(u0, u1)?;
        let without = self.min_sup_step(lq, uq)?;
        let r0 = self.min_sup_step(l0, u0)?;
        let r1 = self.min_sup_step(l1, u1)?;
        let with = self.and_step(r0, r1)?;
        let res = self.mk_node(top, without, with)?;

        self.tables.borrow_mut().min_sup.put(key, res);
        Ok(res)
    }
}
