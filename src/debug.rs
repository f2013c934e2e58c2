//! Debug utilities for inspecting diagram structure.
//!
//! These are primarily useful in tests and during development.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::bdd::Bdd;
use crate::error::BddResult;
use crate::reference::Ref;
use crate::types::{Level, VarId};

/// Detailed information about one edge.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub edge: Ref,
    /// Top variable, `None` for constants.
    pub variable: Option<VarId>,
    pub level: Level,
    /// Children with the polarity of `edge` applied.
    pub low: Ref,
    pub high: Ref,
    /// Number of activations of the underlying node.
    pub refs: u32,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variable {
            None => write!(f, "{}", self.edge),
            Some(var) => write!(
                f,
                "{}(var={}, level={}, low={}, high={}, refs={})",
                self.edge, var, self.level, self.low, self.high, self.refs
            ),
        }
    }
}

impl Bdd {
    pub fn node_info(&self, f: Ref) -> BddResult<NodeInfo> {
        let f = self.check(f)?;
        let (level, low, high) = self.parts(f);
        let (variable, refs) = if f.is_terminal() {
            (None, 0)
        } else {
            (Some(self.var_at(level)), self.store.borrow().node(f.id()).refs())
        };
        Ok(NodeInfo {
            edge: f,
            variable,
            level,
            low,
            high,
            refs,
        })
    }

    /// Every decision node below `f`, top level first.
    pub fn debug_tree(&self, f: Ref) -> BddResult<Vec<NodeInfo>> {
        let f = self.check(f)?;
        let mut nodes = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![f];
        while let Some(e) = stack.pop() {
            if e.is_terminal() || !visited.insert(e) {
                continue;
            }
            let info = self.node_info(e)?;
            stack.push(info.low);
            stack.push(info.high);
            nodes.push(info);
        }
        nodes.sort_by_key(|n| (n.level, n.edge));
        Ok(nodes)
    }

    /// Nested rendering of `f`: `x3[low, high]`, constants as `0` and `1`.
    ///
    /// Shared subgraphs are printed once per path, so this is meant for small
    /// functions. An edge of another manager renders as `<foreign>`.
    pub fn to_bracket_string(&self, f: Ref) -> String {
        let Ok(f) = self.check(f) else {
            return String::from("<foreign>");
        };
        let mut out = String::new();
        self.bracket_step(f, &mut out);
        out
    }

    fn bracket_step(&self, f: Ref, out: &mut String) {
        if f.is_terminal() {
            out.push(if f.is_one() { '1' } else { '0' });
            return;
        }
        let (level, low, high) = self.parts(f);
        let _ = write!(out, "{}[", self.var_at(level));
        self.bracket_step(low, out);
        out.push_str(", ");
        self.bracket_step(high, out);
        out.push(']');
    }

    /// Resident nodes holding at least one activation, as regular edges.
    pub fn live_nodes(&self) -> Vec<Ref> {
        let store = self.store.borrow();
        let mut live: Vec<(Level, Ref)> = store
            .iter()
            .filter(|(_, node)| !node.is_garbage())
            .map(|(id, node)| (node.level, Ref::new(self.id(), id, false)))
            .collect();
        live.sort();
        live.into_iter().map(|(_, r)| r).collect()
    }

    /// Current variable order.
    pub fn debug_ordering(&self) -> String {
        let mut result = String::from("Ordering: [");
        for (i, var) in self.vars().into_iter().enumerate() {
            if i > 0 {
                result.push_str(", ");
            }
            let _ = write!(result, "{}@L{}", var, i);
        }
        result.push(']');
        result
    }

    /// Assignments of `vars` on which `f` disagrees with `expected`.
    ///
    /// Each failure is reported as `(assignment, expected, actual)`.
    pub fn verify_truth_table(
        &self,
        f: Ref,
        vars: &[VarId],
        expected: impl Fn(&[bool]) -> bool,
    ) -> BddResult<Vec<(Vec<bool>, bool, bool)>> {
        let mut failures = Vec::new();
        let n = vars.len();
        for bits in 0..(1u64 << n) {
            let assignment: Vec<bool> = (0..n).map(|i| (bits >> i) & 1 == 1).collect();
            let values: HashMap<VarId, bool> = vars.iter().copied().zip(assignment.iter().copied()).collect();
            let actual = self.eval(f, |v| values.get(&v).copied().unwrap_or(false))?;
            let want = expected(&assignment);
            if actual != want {
                failures.push((assignment, want, actual));
            }
        }
        Ok(failures)
    }

    /// Checks the structural invariants of the whole manager.
    ///
    /// Verifies, for every resident node: a regular then-edge, distinct
    /// children, children resident and strictly below, a unique signature,
    /// reachability through its unique-table bucket and cleared traversal
    /// marks. Also checks the node and garbage counters.
    pub fn check_invariants(&self) -> Result<(), String> {
        let store = self.store.borrow();
        let unique = self.unique.borrow();

        let mut signatures = HashSet::new();
        let mut nodes = 0;
        let mut garbage = 0;
        for (id, node) in store.iter() {
            nodes += 1;
            if node.is_garbage() {
                garbage += 1;
            }
            if node.high.is_negated() {
                return Err(format!("node {} has a complemented then-edge", id));
            }
            if node.low == node.high {
                return Err(format!("node {} is redundant", id));
            }
            if node.marks != 0 {
                return Err(format!("node {} keeps traversal marks {:#b}", id, node.marks));
            }
            for child in [node.low, node.high] {
                if child.is_terminal() {
                    continue;
                }
                if !store.contains(child.id()) {
                    return Err(format!("node {} points to vacant slot {}", id, child.id()));
                }
                let child_level = store.node(child.id()).level;
                if child_level <= node.level {
                    return Err(format!("node {} at {} has child {} at {}", id, node.level, child, child_level));
                }
            }
            if !signatures.insert((node.level, node.low, node.high)) {
                return Err(format!("node {} duplicates ({}, {}, {})", id, node.level, node.low, node.high));
            }
            if unique.find(&store, node.level, node.low, node.high) != Some(id) {
                return Err(format!("node {} is not reachable through the unique table", id));
            }
        }

        if nodes != store.node_count() {
            return Err(format!("{} resident nodes, counter says {}", nodes, store.node_count()));
        }
        if garbage != store.garbage_count() {
            return Err(format!("{} garbage nodes, counter says {}", garbage, store.garbage_count()));
        }
        let linked = unique.count_linked(&store);
        if linked != nodes {
            return Err(format!("{} nodes linked in the unique table, {} resident", linked, nodes));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_node_info() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1).unwrap();
        let info = bdd.node_info(x).unwrap();
        println!("{}", info);
        assert_eq!(info.variable, Some(VarId::new(1)));
        assert_eq!(info.level, Level::new(0));
        assert_eq!(info.low, bdd.zero());
        assert_eq!(info.high, bdd.one());

        let info = bdd.node_info(-x).unwrap();
        assert_eq!(info.low, bdd.one());
        assert_eq!(info.to_string(), format!("{}(var=x1, level=L0, low=1, high=0, refs=0)", -x));

        let info = bdd.node_info(bdd.one()).unwrap();
        assert_eq!(info.variable, None);
        assert_eq!(info.to_string(), "1");
    }

    #[test]
    fn test_debug_tree() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1).unwrap();
        let y = bdd.mk_var(2).unwrap();
        let f = bdd.apply_and(x, y).unwrap();
        let tree = bdd.debug_tree(f).unwrap();
        for node in &tree {
            println!("  {}", node);
        }
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].edge, f);
        assert_eq!(tree[1].edge, y);
    }

    #[test]
    fn test_bracket_string() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(0).unwrap();
        let y = bdd.mk_var(1).unwrap();
        assert_eq!(bdd.to_bracket_string(bdd.one()), "1");
        assert_eq!(bdd.to_bracket_string(x), "x0[0, 1]");
        assert_eq!(bdd.to_bracket_string(-x), "x0[1, 0]");
        let f = bdd.apply_or(x, -y).unwrap();
        assert_eq!(bdd.to_bracket_string(f), "x0[x1[1, 0], 1]");
        assert_eq!(bdd.debug_ordering(), "Ordering: [x0@L0, x1@L1]");
    }

    #[test]
    fn test_bracket_string_of_foreign_edge() {
        let a = Bdd::default();
        let b = Bdd::default();
        let x = a.mk_var(0).unwrap();
        let y = a.mk_var(1).unwrap();
        let f = a.apply_and(x, y).unwrap();
        b.mk_var(0).unwrap();
        assert_eq!(b.to_bracket_string(f), "<foreign>");
        assert_eq!(b.to_bracket_string(a.one()), "1");
        assert_eq!(a.to_bracket_string(f), "x0[0, x1[0, 1]]");
    }

    #[test]
    fn test_verify_truth_table() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(1).unwrap();
        let y = bdd.mk_var(2).unwrap();
        let f = bdd.apply_and(x, y).unwrap();
        let vars = [VarId::new(1), VarId::new(2)];
        let failures = bdd.verify_truth_table(f, &vars, |a| a[0] && a[1]).unwrap();
        assert!(failures.is_empty(), "Truth table verification failed: {:?}", failures);
        let failures = bdd.verify_truth_table(f, &vars, |a| a[0] || a[1]).unwrap();
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_live_nodes_and_invariants() {
        let bdd = Bdd::default();
        let x = bdd.mk_var(0).unwrap();
        let y = bdd.mk_var(1).unwrap();
        let f = bdd.apply_xor(x, y).unwrap();
        assert!(bdd.live_nodes().is_empty());
        bdd.activate(f).unwrap();
        let live = bdd.live_nodes();
        assert_eq!(live.len(), 2);
        assert_eq!(live[0], f.regular());
        assert_eq!(live[1], y);
        bdd.check_invariants().unwrap();
    }
}
