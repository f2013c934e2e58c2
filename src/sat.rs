use std::collections::HashMap;

use crate::bdd::Bdd;
use crate::error::BddResult;
use crate::reference::Ref;
use crate::types::{Lit, VarId};

impl Bdd {
    /// Value of `f` under `assignment`.
    pub fn eval(&self, f: Ref, assignment: impl Fn(VarId) -> bool) -> BddResult<bool> {
        let mut current = self.check(f)?;
        while !current.is_terminal() {
            let (level, low, high) = self.parts(current);
            current = if assignment(self.var_at(level)) { high } else { low };
        }
        Ok(current.is_one())
    }

    /// Returns one satisfying assignment of `f`, if any exists.
    ///
    /// The assignment lists the literals of one path to the constant one, top
    /// variable first; variables off the path are free. Returns `None` for the
    /// constant zero.
    pub fn one_sat(&self, f: Ref) -> BddResult<Option<Vec<Lit>>> {
        let f = self.check(f)?;
        if f.is_zero() {
            return Ok(None);
        }

        let mut path = Vec::new();
        let mut current = f;

        // Walk down, always picking a satisfiable branch.
        while !current.is_one() {
            let (level, low, high) = self.parts(current);
            let var = self.var_at(level);
            if !high.is_zero() {
                path.push(var.pos());
                current = high;
            } else {
                path.push(var.neg());
                current = low;
            }
        }

        Ok(Some(path))
    }

    /// The path of [`Bdd::one_sat`] as a cube; zero for the constant zero.
    pub fn one_path(&self, f: Ref) -> BddResult<Ref> {
        match self.one_sat(f)? {
            Some(lits) => self.mk_cube(lits),
            None => Ok(Ref::ZERO),
        }
    }

    /// Number of literals on a shortest path from `f` to the constant one.
    pub fn shortest_one_path_len(&self, f: Ref) -> BddResult<Option<usize>> {
        let f = self.check(f)?;
        let mut memo = HashMap::new();
        Ok(self.shortest_len_step(f, &mut memo))
    }

    /// A shortest path from `f` to the constant one, as a cube.
    ///
    /// This is a largest cube implying `f`. Zero for the constant zero.
    pub fn shortest_one_path(&self, f: Ref) -> BddResult<Ref> {
        let f = self.check(f)?;
        let mut memo = HashMap::new();
        if self.shortest_len_step(f, &mut memo).is_none() {
            return Ok(Ref::ZERO);
        }

        let mut lits = Vec::new();
        let mut current = f;
        while !current.is_one() {
            let (level, low, high) = self.parts(current);
            let var = self.var_at(level);
            let len_low = self.shortest_len_step(low, &mut memo);
            let len_high = self.shortest_len_step(high, &mut memo);
            let take_high = match (len_low, len_high) {
                (Some(l), Some(h)) => h <= l,
                (None, Some(_)) => true,
                _ => false,
            };
            if take_high {
                lits.push(var.pos());
                current = high;
            } else {
                lits.push(var.neg());
                current = low;
            }
        }
        self.mk_cube(lits)
    }

    fn shortest_len_step(&self, f: Ref, memo: &mut HashMap<Ref, Option<usize>>) -> Option<usize> {
        if f.is_zero() {
            return None;
        }
        if f.is_one() {
            return Some(0);
        }
        if let Some(&len) = memo.get(&f) {
            return len;
        }
        let (_, low, high) = self.parts(f);
        let len_low = self.shortest_len_step(low, memo);
        let len_high = self.shortest_len_step(high, memo);
        let len = match (len_low, len_high) {
            (Some(l), Some(h)) => Some(l.min(h) + 1),
            (Some(l), None) => Some(l + 1),
            (None, Some(h)) => Some(h + 1),
            (None, None) => None,
        };
        memo.insert(f, len);
        len
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_eval() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(0).unwrap();
        let y = bdd.mk_var(1).unwrap();
        let f = bdd.apply_xor(x, y).unwrap();
        for a in [false, true] {
            for b in [false, true] {
                let value = bdd.eval(f, |v| if v == VarId::new(0) { a } else { b }).unwrap();
                assert_eq!(value, a ^ b);
                assert_eq!(bdd.eval(-f, |v| if v == VarId::new(0) { a } else { b }).unwrap(), !(a ^ b));
            }
        }
        assert!(bdd.eval(bdd.one(), |_| false).unwrap());
        assert!(!bdd.eval(bdd.zero(), |_| true).unwrap());
    }

    #[test]
    fn test_one_sat() {
        let bdd = Bdd::default();
        let (x1, x2, x3) = (VarId::new(1), VarId::new(2), VarId::new(3));
        let f = bdd.mk_cube([x1.pos(), x2.neg(), x3.neg()]).unwrap();
        println!("f = {} of size {}", f, bdd.size(f).unwrap());
        let model = bdd.one_sat(f).unwrap();
        println!("model = {:?}", model);
        assert_eq!(model, Some(vec![x1.pos(), x2.neg(), x3.neg()]));

        let g = bdd.apply_and(f, -bdd.one_path(f).unwrap()).unwrap();
        assert_eq!(bdd.one_sat(g).unwrap(), None);
        assert_eq!(bdd.one_path(g).unwrap(), bdd.zero());
        assert_eq!(bdd.one_sat(bdd.one()).unwrap(), Some(vec![]));
    }

    #[test]
    fn test_one_sat_many() {
        let bdd = Bdd::default();
        let vars = [VarId::new(1), VarId::new(2), VarId::new(3)];
        for mask in 0..8u32 {
            let cube: Vec<Lit> = vars
                .iter()
                .enumerate()
                .map(|(i, v)| Lit::new(*v, mask & (1 << i) != 0))
                .collect();
            let f = bdd.mk_cube(cube.iter().copied()).unwrap();
            let model = bdd.one_sat(f).unwrap();
            println!("cube = {:?}, model = {:?}", cube, model);
            assert_eq!(model, Some(cube));
            let path = bdd.one_path(f).unwrap();
            assert_eq!(path, f);
        }
    }

    #[test]
    fn test_one_path_implies_function() {
        let bdd = Bdd::default();
        let v: Vec<_> = (0..5).map(|i| bdd.mk_var(i).unwrap()).collect();
        let f = bdd
            .apply_or(bdd.apply_xor_many(v[..3].iter().copied()).unwrap(), bdd.apply_and(v[3], -v[4]).unwrap())
            .unwrap();
        let path = bdd.one_path(f).unwrap();
        assert!(bdd.is_cube(path).unwrap());
        assert_eq!(bdd.apply_imply(path, f).unwrap(), bdd.one());
    }

    #[test]
    fn test_shortest_one_path() {
        let bdd = Bdd::default();
        let v: Vec<_> = (0..4).map(|i| bdd.mk_var(i).unwrap()).collect();
        // x0 x1 x2 + x3: the shortest path is x3 alone, below ~x0.
        let f = bdd.apply_or(bdd.apply_and_many(v[..3].iter().copied()).unwrap(), v[3]).unwrap();
        assert_eq!(bdd.shortest_one_path_len(f).unwrap(), Some(2));
        let path = bdd.shortest_one_path(f).unwrap();
        println!("path = {}", bdd.to_bracket_string(path));
        assert!(bdd.is_cube(path).unwrap());
        assert_eq!(bdd.size(path).unwrap(), 2);
        assert_eq!(bdd.apply_imply(path, f).unwrap(), bdd.one());

        assert_eq!(bdd.shortest_one_path_len(bdd.zero()).unwrap(), None);
        assert_eq!(bdd.shortest_one_path_len(bdd.one()).unwrap(), Some(0));
        assert_eq!(bdd.shortest_one_path(bdd.zero()).unwrap(), bdd.zero());
        assert_eq!(bdd.shortest_one_path(bdd.one()).unwrap(), bdd.one());
        assert_eq!(bdd.shortest_one_path_len(-v[2]).unwrap(), Some(1));
    }
}
