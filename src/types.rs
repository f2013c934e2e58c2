//! Type-safe wrappers for variable identifiers, levels and node indices.
//!
//! Variable identifiers are chosen by the client and are stable; levels are
//! positions in the manager's variable order and are assigned on declaration.
//! Keeping them apart at the type level prevents mixing the two in recursive
//! algorithms, which always work on levels.

use std::fmt;
use std::ops::Neg;

/// A client-assigned variable identifier.
///
/// Any `u32` is a valid identifier, including `0`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(u32);

impl VarId {
    pub const fn new(id: u32) -> Self {
        VarId(id)
    }

    /// Returns the raw identifier.
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Positive literal of this variable.
    pub fn pos(self) -> Lit {
        Lit::new(self, false)
    }

    /// Negative literal of this variable.
    pub fn neg(self) -> Lit {
        Lit::new(self, true)
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<u32> for VarId {
    fn from(id: u32) -> Self {
        VarId(id)
    }
}

impl From<VarId> for u32 {
    fn from(var: VarId) -> Self {
        var.0
    }
}

/// A position in the variable order.
///
/// # Invariants
///
/// - Level 0 is the topmost level (closest to the root)
/// - Levels increase downward toward the terminals
/// - [`Level::TERMINAL`] is below every variable level
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Level(u32);

impl Level {
    /// Pseudo-level of the constant functions.
    pub const TERMINAL: Level = Level(u32::MAX);

    pub const fn new(index: u32) -> Self {
        Level(index)
    }

    /// Returns the raw level index.
    pub const fn index(self) -> u32 {
        self.0
    }

    pub const fn is_terminal(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_terminal() {
            write!(f, "L⊥")
        } else {
            write!(f, "L{}", self.0)
        }
    }
}

/// Index of a node slot in the node store.
///
/// Index `0` is reserved for the (non-materialized) terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const TERMINAL: NodeId = NodeId(0);

    /// Largest index that still fits into a packed edge.
    pub const MAX: u32 = (u32::MAX >> 1) - 1;

    pub const fn new(raw: u32) -> Self {
        NodeId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_terminal(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A literal: a variable together with a polarity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit {
    var: VarId,
    negated: bool,
}

impl Lit {
    pub const fn new(var: VarId, negated: bool) -> Self {
        Lit { var, negated }
    }

    pub const fn var(self) -> VarId {
        self.var
    }

    pub const fn is_negated(self) -> bool {
        self.negated
    }

    pub const fn is_positive(self) -> bool {
        !self.negated
    }
}

impl Neg for Lit {
    type Output = Lit;

    fn neg(self) -> Self::Output {
        Lit::new(self.var, !self.negated)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~{}", self.var)
        } else {
            write!(f, "{}", self.var)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_id() {
        let v = VarId::new(0);
        assert_eq!(v.id(), 0);
        assert_eq!(format!("{}", VarId::new(7)), "x7");
        assert_eq!(u32::from(VarId::from(42)), 42);
    }

    #[test]
    fn test_level_ordering() {
        let l0 = Level::new(0);
        let l5 = Level::new(5);
        assert!(l0 < l5);
        assert!(l5 < Level::TERMINAL);
        assert!(Level::TERMINAL.is_terminal());
        assert!(!l5.is_terminal());
        assert_eq!(format!("{}", l5), "L5");
    }

    #[test]
    fn test_node_id() {
        assert!(NodeId::TERMINAL.is_terminal());
        let id = NodeId::new(12);
        assert!(!id.is_terminal());
        assert_eq!(id.index(), 12);
        assert_eq!(format!("{}", id), "@12");
    }

    #[test]
    fn test_lit() {
        let x = VarId::new(3);
        let p = x.pos();
        let n = x.neg();
        assert!(p.is_positive());
        assert!(n.is_negated());
        assert_eq!(-p, n);
        assert_eq!(-(-p), p);
        assert_eq!(n.var(), x);
        assert_eq!(format!("{} {}", p, n), "x3 ~x3");
    }
}
