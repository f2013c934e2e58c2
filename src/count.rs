use std::collections::HashMap;

use num_bigint::{BigInt, BigUint};

use crate::bdd::Bdd;
use crate::error::BddResult;
use crate::node::P_MARK;
use crate::reference::Ref;
use crate::types::{Level, NodeId, VarId};

impl Bdd {
    /// Number of decision nodes of `f`, terminals excluded.
    pub fn size(&self, f: Ref) -> BddResult<usize> {
        self.size_many(&[f])
    }

    /// Number of decision nodes shared by `fs`.
    pub fn size_many(&self, fs: &[Ref]) -> BddResult<usize> {
        for &f in fs {
            self.check(f)?;
        }
        let mut count = 0;
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
                count += 1;
                stack.push(node.low);
                stack.push(node.high);
            }
        }
        self.clear_node_marks(fs);
        Ok(count)
    }

    /// Number of satisfying assignments of `f` over `num_vars` variables.
    ///
    /// `num_vars` must cover the support of `f`.
    pub fn minterm_count(&self, f: Ref, num_vars: usize) -> BddResult<BigUint> {
        let f = self.check(f)?;
        let max = BigUint::from(1u32) << num_vars;
        let mut cache = HashMap::new();
        Ok(self.minterm_count_step(f, &max, &mut cache))
    }

    fn minterm_count_step(&self, f: Ref, max: &BigUint, cache: &mut HashMap<NodeId, BigUint>) -> BigUint {
        if f.is_zero() {
            return BigUint::ZERO;
        } else if f.is_one() {
            return max.clone();
        }

        let count = match cache.get(&f.id()) {
            Some(count) => count.clone(),
            None => {
                let (_, low, high) = self.parts(f.regular());
                let count_low = self.minterm_count_step(low, max, cache);
                let count_high = self.minterm_count_step(high, max, cache);
                // Each branch covers half of the assignments.
                let count: BigUint = (count_low + count_high) >> 1;
                cache.insert(f.id(), count.clone());
                count
            }
        };
        if f.is_negated() {
            max - count
        } else {
            count
        }
    }

    /// Zeroth Walsh coefficient: `2^n - 2 |f|`.
    pub fn walsh0(&self, f: Ref, num_vars: usize) -> BddResult<BigInt> {
        let f = self.check(f)?;
        let max = BigInt::from(1u32) << num_vars;
        Ok(self.walsh0_step(f, &max, &mut HashMap::new()))
    }

    /// First-order Walsh coefficient of `f` for `var`: the sum of
    /// `(-1)^(f(x) ⊕ x[var])` over all `2^n` assignments.
    ///
    /// `num_vars` must cover the support of `f`. It is `0` for a variable `f`
    /// does not depend on.
    pub fn walsh1(&self, f: Ref, var: VarId, num_vars: usize) -> BddResult<BigInt> {
        let f = self.check(f)?;
        let Some(level) = self.find_level(var) else {
            return Ok(BigInt::ZERO);
        };
        let max = BigInt::from(1u32) << num_vars;
        let mut w0 = HashMap::new();
        let mut w1 = HashMap::new();
        Ok(self.walsh1_step(f, level, &max, &mut w0, &mut w1))
    }

    /// `Σ (-1)^f`, every node weighted as if it spanned `max` assignments.
    fn walsh0_step(&self, f: Ref, max: &BigInt, cache: &mut HashMap<NodeId, BigInt>) -> BigInt {
        if f.is_zero() {
            return max.clone();
        } else if f.is_one() {
            return -max.clone();
        }

        let w = match cache.get(&f.id()) {
            Some(w) => w.clone(),
            None => {
                let (_, low, high) = self.parts(f.regular());
                let w: BigInt = (self.walsh0_step(low, max, cache) + self.walsh0_step(high, max, cache)) >> 1;
                cache.insert(f.id(), w.clone());
                w
            }
        };
        if f.is_negated() {
            -w
        } else {
            w
        }
    }

    fn walsh1_step(
        &self,
        f: Ref,
        level: Level,
        max: &BigInt,
        w0: &mut HashMap<NodeId, BigInt>,
        w1: &mut HashMap<NodeId, BigInt>,
    ) -> BigInt {
        // Below the variable nothing depends on it.
        if f.is_terminal() || self.level(f) > level {
            return BigInt::ZERO;
        }

        let w = match w1.get(&f.id()) {
            Some(w) => w.clone(),
            None => {
                let (top, low, high) = self.parts(f.regular());
                let w: BigInt = if top < level {
                    (self.walsh1_step(low, level, max, w0, w1) + self.walsh1_step(high, level, max, w0, w1)) >> 1
                } else {
                    (self.walsh0_step(low, max, w0) - self.walsh0_step(high, max, w0)) >> 1
                };
                w1.insert(f.id(), w.clone());
                w
            }
        };
        if f.is_negated() {
            -w
        } else {
            w
        }
    }
}
