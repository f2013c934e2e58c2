//! Irredundant sums of products.
//!
//! [`Bdd::isop`] implements the Minato–Morreale recursion: for an interval
//! `[l, u]` it returns a function `r` with `l ≤ r ≤ u` together with a cover
//! of `r` in which no cube and no literal can be dropped.

use std::fmt::{Display, Formatter};

use crate::bdd::Bdd;
use crate::error::BddResult;
use crate::reference::Ref;
use crate::types::Lit;

/// A sum of products: a disjunction of cubes, each a conjunction of literals.
///
/// The empty cover is the constant zero; a cover holding the empty cube is
/// the constant one.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct Cover {
    cubes: Vec<Vec<Lit>>,
}

impl Cover {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cover `1`.
    pub fn tautology() -> Self {
        Self { cubes: vec![Vec::new()] }
    }

    pub fn cubes(&self) -> &[Vec<Lit>] {
        &self.cubes
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    pub fn literal_count(&self) -> usize {
        self.cubes.iter().map(|c| c.len()).sum()
    }

    pub fn push(&mut self, cube: Vec<Lit>) {
        self.cubes.push(cube);
    }
}

impl From<Vec<Vec<Lit>>> for Cover {
    fn from(cubes: Vec<Vec<Lit>>) -> Self {
        Self { cubes }
    }
}

impl Display for Cover {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.cubes.is_empty() {
            return write!(f, "0");
        }
        for (i, cube) in self.cubes.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            if cube.is_empty() {
                write!(f, "1")?;
            }
            for (j, lit) in cube.iter().enumerate() {
                if j > 0 {
                    write!(f, " & ")?;
                }
                write!(f, "{}", lit)?;
            }
        }
        Ok(())
    }
}

impl Bdd {
    /// Irredundant sum of products for the interval `[l, u]`.
    ///
    /// # Panics
    ///
    /// Panics if `l` does not imply `u`.
    pub fn isop(&self, l: Ref, u: Ref) -> BddResult<(Ref, Cover)> {
        let l = self.check(l)?;
        let u = self.check(u)?;
        let outside = self.and_step(l, -u)?;
        assert!(outside.is_zero(), "isop: lower bound does not imply upper bound");
        self.isop_step(l, u)
    }

    /// Irredundant sum of products of `f`.
    pub fn isop_of(&self, f: Ref) -> BddResult<(Ref, Cover)> {
        self.isop(f, f)
    }

    /// Prime and irredundant cover for the interval `[l, u]`.
    ///
    /// Starts from the ISOP cover, widens every cube to a prime implicant of
    /// `u` (dropping literals in order while the cube stays inside `u`), then
    /// drops every cube whose part of `l` the remaining cubes already cover.
    ///
    /// # Panics
    ///
    /// Panics if `l` does not imply `u`.
    pub fn prime_cover(&self, l: Ref, u: Ref) -> BddResult<Cover> {
        let (_, cover) = self.isop(l, u)?;

        let mut cubes: Vec<Vec<Lit>> = Vec::with_capacity(cover.len());
        for mut cube in cover.cubes {
            let mut i = 0;
            while i < cube.len() {
                let mut wider = cube.clone();
                wider.remove(i);
                let c = self.mk_cube(wider.iter().copied())?;
                if self.and_step(c, -u)?.is_zero() {
                    cube = wider;
                } else {
                    i += 1;
                }
            }
            if !cubes.contains(&cube) {
                cubes.push(cube);
            }
        }

        let mut i = 0;
        while i < cubes.len() {
            let mut rest = Ref::ZERO;
            for (j, cube) in cubes.iter().enumerate() {
                if j != i {
                    let c = self.mk_cube(cube.iter().copied())?;
                    rest = self.or_step(rest, c)?;
                }
            }
            let c = self.mk_cube(cubes[i].iter().copied())?;
            let own = self.and_step(l, c)?;
            if self.and_step(own, -rest)?.is_zero() {
                cubes.remove(i);
            } else {
                i += 1;
            }
        }
        Ok(Cover::from(cubes))
    }

    /// Disjunction of the cubes of `cover`.
    pub fn mk_cover(&self, cover: &Cover) -> BddResult<Ref> {
        let mut res = Ref::ZERO;
        for cube in cover.cubes() {
            let c = self.mk_cube(cube.iter().copied())?;
            res = self.or_step(res, c)?;
        }
        Ok(res)
    }

    fn isop_step(&self, l: Ref, u: Ref) -> BddResult<(Ref, Cover)> {
        if l.is_zero() {
            return Ok((Ref::ZERO, Cover::new()));
        }
        if u.is_one() {
            return Ok((Ref::ONE, Cover::tautology()));
        }

        let key = [l, u];
        if let Some(res) = self.tables.borrow_mut().isop.get(&key) {
            return Ok(res);
        }

        let top = self.level(l).min(self.level(u));
        let var = self.var_at(top);
        let (l0, l1) = self.split(l, top);
        let (u0, u1) = self.split(u, top);

        // Minterms that need the negative literal, then the positive one.
        let lt0 = self.and_step(l0, -u1)?;
        let (r0, c0) = self.isop_step(lt0, u0)?;
        let lt1 = self.and_step(l1, -u0)?;
        let (r1, c1) = self.isop_step(lt1, u1)?;

        // What is left is covered without the top variable.
        let rest0 = self.and_step(l0, -r0)?;
        let rest1 = self.and_step(l1, -r1)?;
        let ls = self.or_step(rest0, rest1)?;
        let us = self.and_step(u0, u1)?;
        let (rs, cs) = self.isop_step(ls, us)?;

        let low = self.or_step(rs, r0)?;
        let high = self.or_step(rs, r1)?;
        let res = self.mk_node(top, low, high)?;

        let mut cover = Cover::new();
        for (part, lit) in [(c0, var.neg()), (c1, var.pos())] {
            for mut cube in part.cubes {
                cube.insert(0, lit);
                cover.push(cube);
            }
        }
        cover.cubes.extend(cs.cubes);

        self.tables.borrow_mut().isop.put(key, (res, cover.clone()));
        Ok((res, cover))
    }
}
