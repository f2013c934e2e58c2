//! The ITE engine and the binary connectives.
//!
//! ```text
//! ITE(f, g, h) = (f ∧ g) ∨ (¬f ∧ h)
//! ```
//!
//! AND and XOR have their own recursions (and tables), OR is AND under De
//! Morgan, and ITE falls back to them whenever one operand is trivial. Every
//! recursion has the same shape: terminal rules, operand normalization,
//! compute-table lookup, split on the top level, recurse, [`Bdd::mk_node`].

use log::debug;

use crate::bdd::Bdd;
use crate::error::BddResult;
use crate::reference::Ref;

impl Bdd {
    /// If-then-else.
    ///
    /// # Examples
    ///
    /// ```
    /// use cbdd::bdd::Bdd;
    ///
    /// let bdd = Bdd::default();
    /// let x = bdd.mk_var(1).unwrap();
    /// let y = bdd.mk_var(2).unwrap();
    /// let z = bdd.mk_var(3).unwrap();
    /// let f = bdd.apply_ite(x, y, z).unwrap();
    /// let x_and_y = bdd.apply_and(x, y).unwrap();
    /// let not_x_and_z = bdd.apply_and(-x, z).unwrap();
    /// assert_eq!(f, bdd.apply_or(x_and_y, not_x_and_z).unwrap());
    /// ```
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> BddResult<Ref> {
        debug!("apply_ite(f = {}, g = {}, h = {})", f, g, h);
        self.ite_step(self.check(f)?, self.check(g)?, self.check(h)?)
    }

    pub fn apply_and(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        self.and_step(self.check(f)?, self.check(g)?)
    }

    pub fn apply_or(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        self.or_step(self.check(f)?, self.check(g)?)
    }

    pub fn apply_xor(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        self.xor_step(self.check(f)?, self.check(g)?)
    }

    /// Equivalence (XNOR).
    pub fn apply_eq(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        Ok(-self.apply_xor(f, g)?)
    }

    /// Implication `f → g`.
    pub fn apply_imply(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        self.apply_or(-f, g)
    }

    /// Negation. Never allocates.
    pub fn apply_not(&self, f: Ref) -> BddResult<Ref> {
        Ok(-self.check(f)?)
    }

    /// Conjunction of all operands (`1` for none).
    pub fn apply_and_many(&self, fs: impl IntoIterator<Item = Ref>) -> BddResult<Ref> {
        let mut acc = Ref::ONE;
        for f in fs {
            acc = self.apply_and(acc, f)?;
            if acc.is_zero() {
                break;
            }
        }
        Ok(acc)
    }

    /// Disjunction of all operands (`0` for none).
    pub fn apply_or_many(&self, fs: impl IntoIterator<Item = Ref>) -> BddResult<Ref> {
        let mut acc = Ref::ZERO;
        for f in fs {
            acc = self.apply_or(acc, f)?;
            if acc.is_one() {
                break;
            }
        }
        Ok(acc)
    }

    /// Parity of all operands (`0` for none).
    pub fn apply_xor_many(&self, fs: impl IntoIterator<Item = Ref>) -> BddResult<Ref> {
        let mut acc = Ref::ZERO;
        for f in fs {
            acc = self.apply_xor(acc, f)?;
        }
        Ok(acc)
    }

    /// Whether `f ∧ g` is satisfiable, without building it.
    pub fn check_intersect(&self, f: Ref, g: Ref) -> BddResult<bool> {
        self.intersect_step(self.check(f)?, self.check(g)?)
    }

    pub(crate) fn ite_step(&self, f: Ref, g: Ref, h: Ref) -> BddResult<Ref> {
        // Terminal rules, in priority order.
        if f.is_one() {
            return Ok(g);
        }
        if f.is_zero() {
            return Ok(h);
        }
        if g == h {
            return Ok(g);
        }
        if g == -h {
            // ite(f, ~h, h) = f ⊕ h
            return self.xor_step(f, h);
        }
        if g.is_one() || f == g {
            return self.or_step(f, h);
        }
        if g.is_zero() || f == -g {
            return self.and_step(-f, h);
        }
        if h.is_one() || f == -h {
            return self.or_step(-f, g);
        }
        if h.is_zero() || f == h {
            return self.and_step(f, g);
        }

        // Canonical operand order: g < h, g regular.
        let (mut f, mut g, mut h) = (f, g, h);
        if g > h {
            std::mem::swap(&mut g, &mut h);
            f = -f;
        }
        let negated = g.is_negated();
        if negated {
            g = -g;
            h = -h;
        }

        let (f_level, f0, f1) = self.parts(f);
        let g_level = self.level(g);
        let h_level = self.level(h);

        // `f` is a single literal above both branches.
        if f_level < g_level && f_level < h_level {
            if f0.is_zero() && f1.is_one() {
                return Ok(self.mk_node(f_level, h, g)?.negate_if(negated));
            }
            if f0.is_one() && f1.is_zero() {
                return Ok(self.mk_node(f_level, g, h)?.negate_if(negated));
            }
        }

        let key = [f, g, h];
        if let Some(res) = self.tables.borrow_mut().ite.get(&key) {
            return Ok(res.negate_if(negated));
        }

        let top = f_level.min(g_level).min(h_level);
        let (f0, f1) = self.split(f, top);
        let (g0, g1) = self.split(g, top);
        let (h0, h1) = self.split(h, top);
        let r0 = self.ite_step(f0, g0, h0)?;
        let r1 = self.ite_step(f1, g1, h1)?;
        let res = self.mk_node(top, r0, r1)?;

        self.tables.borrow_mut().ite.put(key, res);
        Ok(res.negate_if(negated))
    }

    pub(crate) fn and_step(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        if f.is_zero() || g.is_zero() || f == -g {
            return Ok(Ref::ZERO);
        }
        if f.is_one() || f == g {
            return Ok(g);
        }
        if g.is_one() {
            return Ok(f);
        }

        // Commutative: order the operands.
        let (f, g) = if f < g { (f, g) } else { (g, f) };

        let key = [f, g];
        if let Some(res) = self.tables.borrow_mut().and.get(&key) {
            return Ok(res);
        }

        let top = self.level(f).min(self.level(g));
        let (f0, f1) = self.split(f, top);
        let (g0, g1) = self.split(g, top);
        let r0 = self.and_step(f0, g0)?;
        let r1 = self.and_step(f1, g1)?;
        let res = self.mk_node(top, r0, r1)?;

        self.tables.borrow_mut().and.put(key, res);
        Ok(res)
    }

    pub(crate) fn or_step(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        Ok(-self.and_step(-f, -g)?)
    }

    pub(crate) fn xor_step(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        if f.is_zero() {
            return Ok(g);
        }
        if g.is_zero() {
            return Ok(f);
        }
        if f.is_one() {
            return Ok(-g);
        }
        if g.is_one() {
            return Ok(-f);
        }
        if f == g {
            return Ok(Ref::ZERO);
        }
        if f == -g {
            return Ok(Ref::ONE);
        }

        // Polarities factor out of XOR.
        let negated = f.is_negated() ^ g.is_negated();
        let (f, g) = (f.regular(), g.regular());
        let (f, g) = if f < g { (f, g) } else { (g, f) };

        let key = [f, g];
        if let Some(res) = self.tables.borrow_mut().xor.get(&key) {
            return Ok(res.negate_if(negated));
        }

        let top = self.level(f).min(self.level(g));
        let (f0, f1) = self.split(f, top);
        let (g0, g1) = self.split(g, top);
        let r0 = self.xor_step(f0, g0)?;
        let r1 = self.xor_step(f1, g1)?;
        let res = self.mk_node(top, r0, r1)?;

        self.tables.borrow_mut().xor.put(key, res);
        Ok(res.negate_if(negated))
    }

    fn intersect_step(&self, f: Ref, g: Ref) -> BddResult<bool> {
        if f.is_zero() || g.is_zero() || f == -g {
            return Ok(false);
        }
        if f.is_one() || g.is_one() || f == g {
            return Ok(true);
        }

        let (f, g) = if f < g { (f, g) } else { (g, f) };
        let key = [f, g];
        if let Some(res) = self.tables.borrow_mut().intersect.get(&key) {
            return Ok(res.is_one());
        }

        let top = self.level(f).min(self.level(g));
        let (f0, f1) = self.split(f, top);
        let (g0, g1) = self.split(g, top);
        let res = self.intersect_step(f0, g0)? || self.intersect_step(f1, g1)?;

        self.tables.borrow_mut().intersect.put(key, Ref::constant(res));
        Ok(res)
    }
}
