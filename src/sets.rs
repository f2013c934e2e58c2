//! Variable sets and literal sets encoded as cubes.
//!
//! A literal set is a cube: the conjunction of its literals. A variable set
//! is read from a cube with the polarities ignored and is always built as a
//! positive cube. The empty set is the constant one. The constant zero and
//! any function that is not a cube are rejected with [`BddError::NotACube`].

use crate::bdd::Bdd;
use crate::error::{BddError, BddResult};
use crate::reference::Ref;
use crate::types::{Level, Lit};

impl Bdd {
    /// Literals of the cube `f`, top-down.
    pub fn cube_literals(&self, f: Ref) -> BddResult<Vec<Lit>> {
        let lits = self.cube_levels(self.check(f)?)?;
        Ok(lits.into_iter().map(|(level, negated)| Lit::new(self.var_at(level), negated)).collect())
    }

    /// Variables occurring in both `f` and `g`.
    pub fn vscap(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        let (a, b) = self.var_sets(f, g)?;
        let common: Vec<(Level, bool)> = a.into_iter().filter(|l| b.binary_search(l).is_ok()).map(|l| (l, false)).collect();
        self.mk_level_cube(&common)
    }

    /// Variables of `f` that do not occur in `g`.
    pub fn vsdiff(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        let (a, b) = self.var_sets(f, g)?;
        let rest: Vec<(Level, bool)> = a.into_iter().filter(|l| b.binary_search(l).is_err()).map(|l| (l, false)).collect();
        self.mk_level_cube(&rest)
    }

    /// Whether `f` and `g` share a variable.
    pub fn vsintersect(&self, f: Ref, g: Ref) -> BddResult<bool> {
        let (a, b) = self.var_sets(f, g)?;
        Ok(a.iter().any(|l| b.binary_search(l).is_ok()))
    }

    /// Literals occurring in both `f` and `g`. `x` and `~x` are different
    /// elements.
    pub fn lscap(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        let (a, b) = self.lit_sets(f, g)?;
        let common: Vec<(Level, bool)> = a.into_iter().filter(|l| b.binary_search(l).is_ok()).collect();
        self.mk_level_cube(&common)
    }

    /// Literals of `f` that do not occur in `g`.
    pub fn lsdiff(&self, f: Ref, g: Ref) -> BddResult<Ref> {
        let (a, b) = self.lit_sets(f, g)?;
        let rest: Vec<(Level, bool)> = a.into_iter().filter(|l| b.binary_search(l).is_err()).collect();
        self.mk_level_cube(&rest)
    }

    /// Whether `f` and `g` share a literal.
    pub fn lsintersect(&self, f: Ref, g: Ref) -> BddResult<bool> {
        let (a, b) = self.lit_sets(f, g)?;
        Ok(a.iter().any(|l| b.binary_search(l).is_ok()))
    }

    fn var_sets(&self, f: Ref, g: Ref) -> BddResult<(Vec<Level>, Vec<Level>)> {
        let (a, b) = self.lit_sets(f, g)?;
        Ok((a.into_iter().map(|(l, _)| l).collect(), b.into_iter().map(|(l, _)| l).collect()))
    }

    fn lit_sets(&self, f: Ref, g: Ref) -> BddResult<(Vec<(Level, bool)>, Vec<(Level, bool)>)> {
        let f = self.check(f)?;
        let g = self.check(g)?;
        Ok((self.cube_levels(f)?, self.cube_levels(g)?))
    }

    /// `(level, negated)` pairs of a cube, sorted by level.
    fn cube_levels(&self, f: Ref) -> BddResult<Vec<(Level, bool)>> {
        let mut lits = Vec::new();
        let mut e = f;
        while !e.is_terminal() {
            let (level, low, high) = self.parts(e);
            if low.is_zero() {
                lits.push((level, false));
                e = high;
            } else if high.is_zero() {
                lits.push((level, true));
                e = low;
            } else {
                return Err(BddError::NotACube);
            }
        }
        if e.is_zero() {
            return Err(BddError::NotACube);
        }
        Ok(lits)
    }

    /// Cube of `(level, negated)` pairs sorted by level.
    fn mk_level_cube(&self, lits: &[(Level, bool)]) -> BddResult<Ref> {
        let mut current = Ref::ONE;
        for &(level, negated) in lits.iter().rev() {
            current = if negated {
                self.mk_node(level, current, Ref::ZERO)?
            } else {
                self.mk_node(level, Ref::ZERO, current)?
            };
        }
        Ok(current)
    }
}
