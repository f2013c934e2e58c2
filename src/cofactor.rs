//! Cofactors: by a literal, by a cube, by an arbitrary care set.

use crate::bdd::Bdd;
use crate::cache::ComputeCache;
use crate::error::{BddError, BddResult};
use crate::reference::Ref;
use crate::types::{Level, Lit, VarId};

/// Variable mark: the cube holds the positive literal.
const POS: u8 = 1;
/// Variable mark: the cube holds the negative literal.
const NEG: u8 = 2;

impl Bdd {
    /// Restriction of `f` by a single literal.
    pub fn cofactor_literal(&self, f: Ref, lit: Lit) -> BddResult<Ref> {
        let f = self.check(f)?;
        let Some(level) = self.find_level(lit.var()) else {
            // `f` cannot depend on an undeclared variable.
            return Ok(f);
        };
        self.vars.borrow_mut().clear_marks();
        self.vars.borrow_mut().set_mark(level, if lit.is_negated() { NEG } else { POS });
        self.cube_division(f)
    }

    /// Restriction of `f` by a cube.
    ///
    /// # Panics
    ///
    /// Panics if `cube` is not a cube.
    pub fn cofactor_cube(&self, f: Ref, cube: Ref) -> BddResult<Ref> {
        let f = self.check(f)?;
        let cube = self.check(cube)?;
        if cube.is_zero() {
            return Err(BddError::EmptyConstraint);
        }
        assert!(self.is_cube(cube)?, "{} is not a cube", cube);
        self.mark_cube(cube);
        self.cube_division(f)
    }

    /// Generalized cofactor (constrain) of `f` by the care set `c`.
    ///
    /// The result agrees with `f` wherever `c` holds. Constraining by the
    /// constant zero is an error, since its care set is empty.
    pub fn constrain(&self, f: Ref, c: Ref) -> BddResult<Ref> {
        let f = self.check(f)?;
        let c = self.check(c)?;
        if c.is_zero() {
            return Err(BddError::EmptyConstraint);
        }
        if self.is_cube(c)? {
            self.mark_cube(c);
            return self.cube_division(f);
        }
        self.constrain_step(f, c)
    }

    /// Moment of the Davio expansion: `f|x=0 ⊕ f|x=1`.
    pub fn xor_moment(&self, f: Ref, var: VarId) -> BddResult<Ref> {
        let f = self.check(f)?;
        let Some(level) = self.find_level(var) else {
            return Ok(Ref::ZERO);
        };
        let res = self.xor_moment_step(f, level);
        self.tables.borrow_mut().xor_moment.clear();
        res
    }

    /// Marks the literals of `cube` on the variable table.
    fn mark_cube(&self, cube: Ref) {
        let mut vars = self.vars.borrow_mut();
        vars.clear_marks();
        let mut e = cube;
        while !e.is_terminal() {
            let (level, low, high) = self.parts(e);
            if low.is_zero() {
                vars.set_mark(level, POS);
                e = high;
            } else {
                vars.set_mark(level, NEG);
                e = low;
            }
        }
    }

    /// Runs the cube division for the marked cube and resets the scratch state.
    fn cube_division(&self, f: Ref) -> BddResult<Ref> {
        let res = self.cube_div_step(f);
        self.tables.borrow_mut().cube_div.clear();
        self.vars.borrow_mut().clear_marks();
        res
    }

    fn cube_div_step(&self, f: Ref) -> BddResult<Ref> {
        if f.is_terminal() {
            return Ok(f);
        }
        let level = self.level(f);
        if self.vars.borrow().beyond_marks(level) {
            return Ok(f);
        }

        // (~f) / c == ~(f / c)
        let negated = f.is_negated();
        let f = f.regular();

        if let Some(res) = self.tables.borrow_mut().cube_div.get(&[f]) {
            return Ok(res.negate_if(negated));
        }

        let (_, f0, f1) = self.parts(f);
        let mark = self.vars.borrow().mark(level);
        let res = match mark {
            POS => self.cube_div_step(f1)?,
            NEG => self.cube_div_step(f0)?,
            _ => {
                let r0 = self.cube_div_step(f0)?;
                let r1 = self.cube_div_step(f1)?;
                self.mk_node(level, r0, r1)?
            }
        };

        self.tables.borrow_mut().cube_div.put([f], res);
        Ok(res.negate_if(negated))
    }

    fn constrain_step(&self, f: Ref, c: Ref) -> BddResult<Ref> {
        debug_assert!(!c.is_zero());
        if f.is_terminal() || c.is_one() {
            return Ok(f);
        }
        if f == c {
            return Ok(Ref::ONE);
        }
        if f == -c {
            return Ok(Ref::ZERO);
        }

        let negated = f.is_negated();
        let f = f.regular();

        let key = [f, c];
        if let Some(res) = self.tables.borrow_mut().constrain.get(&key) {
            return Ok(res.negate_if(negated));
        }

        let f_level = self.level(f);
        let c_level = self.level(c);
        let res = if f_level < c_level {
            let (_, f0, f1) = self.parts(f);
            let r0 = self.constrain_step(f0, c)?;
            let r1 = self.constrain_step(f1, c)?;
            self.mk_node(f_level, r0, r1)?
        } else {
            let (f0, f1) = self.split(f, c_level);
            let (_, c0, c1) = self.parts(c);
            if c0.is_zero() {
                self.constrain_step(f1, c1)?
            } else if c1.is_zero() {
                self.constrain_step(f0, c0)?
            } else {
                let r0 = self.constrain_step(f0, c0)?;
                let r1 = self.constrain_step(f1, c1)?;
                self.mk_node(c_level, r0, r1)?
            }
        };

        self.tables.borrow_mut().constrain.put(key, res);
        Ok(res.negate_if(negated))
    }

    fn xor_moment_step(&self, f: Ref, level: Level) -> BddResult<Ref> {
        if f.is_terminal() {
            return Ok(Ref::ZERO);
        }
        let f_level = self.level(f);
        if f_level > level {
            return Ok(Ref::ZERO);
        }

        // The moment of ~f equals the moment of f.
        let f = f.regular();
        if let Some(res) = self.tables.borrow_mut().xor_moment.get(&[f]) {
            return Ok(res);
        }

        let (_, f0, f1) = self.parts(f);
        let res = if f_level == level {
            self.xor_step(f0, f1)?
        } else {
            let r0 = self.xor_moment_step(f0, level)?;
            let r1 = self.xor_moment_step(f1, level)?;
            self.mk_node(f_level, r0, r1)?
        };

        self.tables.borrow_mut().xor_moment.put([f], res);
        Ok(res)
    }
}
