//! Quantification (smoothing).
//!
//! The set of quantified variables is passed as a cube; only the variables
//! of the cube matter, not their polarities. The variables are marked on the
//! variable table for the duration of the call.

use crate::bdd::Bdd;
use crate::cache::ComputeCache;
use crate::error::BddResult;
use crate::reference::Ref;
use crate::types::VarId;

const QUANTIFIED: u8 = 1;

impl Bdd {
    /// `∃ vars. f`, with `vars` given as a cube.
    pub fn exists(&self, f: Ref, vars: Ref) -> BddResult<Ref> {
        let f = self.check(f)?;
        self.mark_var_set(self.check(vars)?);
        self.finish_smoothing(self.smooth_step(f))
    }

    /// `∀ vars. f`, with `vars` given as a cube.
    pub fn forall(&self, f: Ref, vars: Ref) -> BddResult<Ref> {
        Ok(-self.exists(-f, vars)?)
    }

    /// `∃ vars. f ∧ g`, without building `f ∧ g` first.
    pub fn and_exists(&self, f: Ref, g: Ref, vars: Ref) -> BddResult<Ref> {
        let f = self.check(f)?;
        let g = self.check(g)?;
        self.mark_var_set(self.check(vars)?);
        self.finish_smoothing(self.and_exist_step(f, g))
    }

    pub fn exists_vars(&self, f: Ref, vars: &[VarId]) -> BddResult<Ref> {
        let cube = self.mk_cube(vars.iter().map(|v| v.pos()))?;
        self.exists(f, cube)
    }

    pub fn forall_vars(&self, f: Ref, vars: &[VarId]) -> BddResult<Ref> {
        let cube = self.mk_cube(vars.iter().map(|v| v.pos()))?;
        self.forall(f, cube)
    }

    pub fn and_exists_vars(&self, f: Ref, g: Ref, vars: &[VarId]) -> BddResult<Ref> {
        let cube = self.mk_cube(vars.iter().map(|v| v.pos()))?;
        self.and_exists(f, g, cube)
    }

    /// Marks every variable on the non-zero path of `cube`.
    fn mark_var_set(&self, cube: Ref) {
        let mut vars = self.vars.borrow_mut();
        vars.clear_marks();
        let mut e = cube;
        while !e.is_terminal() {
            let (level, low, high) = self.parts(e);
            vars.set_mark(level, QUANTIFIED);
            e = if low.is_zero() { high } else { low };
        }
    }

    fn finish_smoothing(&self, res: BddResult<Ref>) -> BddResult<Ref> {
        {
            let mut tables = self.tables.borrow_mut();
            tables.smooth.clear();
            tables.and_exist.clear();
        }
        self.vars.borrow_mut().clear_marks();
        res
    }

    fn is_quantified(&self, level: crate::types::Level) -> bool {
        self.vars.borrow().mark(level) & QUANTIFIED != 0
    }

    fn smooth_step(&self, f: Ref) -> BddResult<Ref> {
        if f.is_terminal() {
            return Ok(f);
        }
        let level = self.level(f);
        if self.vars.borrow().beyond_marks(level) {
            return Ok(f);
        }

        if let Some(res) = self.tables.borrow_mut().smooth.get(&[f]) {
            return Ok(res);
        }

        let (_, f0, f1) = self.parts(f);
        let res = if self.is_quantified(level) {
            let tmp = self.or_step(f0, f1)?;
            self.smooth_step(tmp)?
        } else {
            let r0 = self.smooth_step(f0)?;
            let r1 = self.smooth_step(f1)?;
            self.mk_node(level, r0, r1)?
        };

        self.tables.borrow_mut().smooth.put([f], res);
        Ok(res)
    }

    fn and_exist_step(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        if f.is_zero() || g.is_zero() || f == -g {
            return Ok(Ref::ZERO);
        }
        if f.is_one() && g.is_one() {
            return Ok(Ref::ONE);
        }
        if f.is_one() || f == g {
            return self.smooth_step(g);
        }
        if g.is_one() {
            return self.smooth_step(f);
        }

        let (f, g) = if f < g { (f, g) } else { (g, f) };
        let f_level = self.level(f);
        let g_level = self.level(g);
        let top = f_level.min(g_level);
        if self.vars.borrow().beyond_marks(top) {
            return self.and_step(f, g);
        }

        let key = [f, g];
        if let Some(res) = self.tables.borrow_mut().and_exist.get(&key) {
            return Ok(res);
        }

        let (f0, f1) = self.split(f, top);
        let (g0, g1) = self.split(g, top);
        let res = if self.is_quantified(top) {
            if f_level > top {
                let tmp = self.or_step(g0, g1)?;
                self.and_exist_step(f, tmp)?
            } else if g_level > top {
                let tmp = self.or_step(f0, f1)?;
                self.and_exist_step(tmp, g)?
            } else {
                let r0 = self.and_exist_step(f0, g0)?;
                if r0.is_one() {
                    Ref::ONE
                } else {
                    let r1 = self.and_exist_step(f1, g1)?;
                    self.or_step(r0, r1)?
                }
            }
        } else {
            let r0 = self.and_exist_step(f0, g0)?;
            let r1 = self.and_exist_step(f1, g1)?;
            self.mk_node(top, r0, r1)?
        };

        self.tables.borrow_mut().and_exist.put(key, res);
        Ok(res)
    }
}
