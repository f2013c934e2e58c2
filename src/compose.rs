//! Variable substitution.
//!
//! All substitutions of one call are applied simultaneously: the substituted
//! functions are registered on the variable table, and a single traversal
//! rebuilds `f` bottom-up with `ite(g_x, r1, r0)` at every node whose variable
//! is substituted. The traversal stops below the deepest substituted level.

use crate::bdd::Bdd;
use crate::cache::ComputeCache;
use crate::error::BddResult;
use crate::reference::Ref;
use crate::types::VarId;

const SUBST: u8 = 1;

impl Bdd {
    /// `f[var := g]`.
    pub fn compose(&self, f: Ref, var: VarId, g: Ref) -> BddResult<Ref> {
        self.compose_many(f, &[(var, g)])
    }

    /// Simultaneous substitution `f[x1 := g1, x2 := g2, ...]`.
    ///
    /// Variables that were never declared are skipped, since `f` cannot
    /// depend on them. When a variable is listed twice, the last entry wins.
    pub fn compose_many(&self, f: Ref, substitution: &[(VarId, Ref)]) -> BddResult<Ref> {
        let f = self.check(f)?;
        for &(_, g) in substitution {
            self.check(g)?;
        }

        {
            let mut vars = self.vars.borrow_mut();
            vars.clear_marks();
            for &(var, g) in substitution {
                let Some(level) = vars.find(var) else {
                    continue;
                };
                vars.set_mark(level, SUBST);
                vars.get_mut(level).subst = Some(g);
            }
        }

        let res = self.compose_step(f);
        self.tables.borrow_mut().compose.clear();
        self.vars.borrow_mut().clear_marks();
        res
    }

    /// Renames variables: `f[x1 := y1, ...]`, with `y` given as variables.
    pub fn substitute(&self, f: Ref, renaming: &[(VarId, VarId)]) -> BddResult<Ref> {
        let mut substitution = Vec::with_capacity(renaming.len());
        for &(from, to) in renaming {
            substitution.push((from, self.mk_var(to)?));
        }
        self.compose_many(f, &substitution)
    }

    fn compose_step(&self, f: Ref) -> BddResult<Ref> {
        if f.is_terminal() {
            return Ok(f);
        }
        let level = self.level(f);
        if self.vars.borrow().beyond_marks(level) {
            return Ok(f);
        }

        let negated = f.is_negated();
        let f = f.regular();

        if let Some(res) = self.tables.borrow_mut().compose.get(&[f]) {
            return Ok(res.negate_if(negated));
        }

        let (_, f0, f1) = self.parts(f);
        let r0 = self.compose_step(f0)?;
        let r1 = self.compose_step(f1)?;

        let subst = {
            let vars = self.vars.borrow();
            let var = vars.get(level);
            if var.mark & SUBST != 0 {
                var.subst
            } else {
                None
            }
        };
        let test = match subst {
            Some(g) => g,
            None => self.mk_node(level, Ref::ZERO, Ref::ONE)?,
        };
        let res = self.ite_step(test, r1, r0)?;

        self.tables.borrow_mut().compose.put([f], res);
        Ok(res.negate_if(negated))
    }
}
