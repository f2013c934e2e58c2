//! Edge handles.
//!
//! A [`Ref`] packs a node index and a complement bit into one `u32`:
//!
//! ```text
//! raw = (node << 1) | negated
//! ```
//!
//! Node index `0` is the terminal, so `raw == 0` is the constant one and
//! `raw == 1` is the constant zero. Every non-constant edge also carries the
//! [`ManagerId`] of the manager that created it, which lets operators reject
//! edges coming from a different manager.

use std::fmt::{Display, Formatter};
use std::ops::Neg;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::types::NodeId;

/// Identity of a manager instance.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ManagerId(u32);

impl ManagerId {
    /// Tag of the constants, accepted by every manager.
    pub const SHARED: ManagerId = ManagerId(0);

    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        ManagerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// An edge: a node (or the terminal) with a polarity.
///
/// Equality is equality of the packed representation. Thanks to canonicity,
/// two edges of the same manager are equal iff they denote the same function.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref {
    raw: u32,
    owner: ManagerId,
}

impl Ref {
    pub const ONE: Ref = Ref {
        raw: 0,
        owner: ManagerId::SHARED,
    };
    pub const ZERO: Ref = Ref {
        raw: 1,
        owner: ManagerId::SHARED,
    };

    pub(crate) const fn new(owner: ManagerId, id: NodeId, negated: bool) -> Self {
        Self {
            raw: (id.raw() << 1) | negated as u32,
            owner,
        }
    }

    /// Constant edge for the given truth value.
    pub const fn constant(value: bool) -> Self {
        if value {
            Self::ONE
        } else {
            Self::ZERO
        }
    }

    /// Index of the referenced node.
    pub const fn id(self) -> NodeId {
        NodeId::new(self.raw >> 1)
    }

    pub const fn owner(self) -> ManagerId {
        self.owner
    }

    /// Internal packed representation.
    pub const fn raw(self) -> u32 {
        self.raw
    }

    pub const fn is_negated(self) -> bool {
        self.raw & 1 != 0
    }

    pub const fn is_terminal(self) -> bool {
        self.raw >> 1 == 0
    }

    pub const fn is_one(self) -> bool {
        self.raw == 0
    }

    pub const fn is_zero(self) -> bool {
        self.raw == 1
    }

    /// The same edge with the complement bit cleared.
    pub const fn regular(self) -> Self {
        Self {
            raw: self.raw & !1,
            owner: self.owner,
        }
    }

    /// Complements the edge iff `negate` is set.
    pub const fn negate_if(self, negate: bool) -> Self {
        Self {
            raw: self.raw ^ negate as u32,
            owner: self.owner,
        }
    }

    pub const fn negate(self) -> Self {
        self.negate_if(true)
    }
}

impl Neg for Ref {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_one() {
            write!(f, "1")
        } else if self.is_zero() {
            write!(f, "0")
        } else {
            write!(f, "{}{}", if self.is_negated() { "~" } else { "" }, self.id())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(Ref::ONE.is_one());
        assert!(Ref::ZERO.is_zero());
        assert!(Ref::ONE.is_terminal());
        assert!(Ref::ZERO.is_terminal());
        assert_eq!(-Ref::ONE, Ref::ZERO);
        assert_eq!(-Ref::ZERO, Ref::ONE);
        assert_eq!(Ref::constant(true), Ref::ONE);
        assert_eq!(Ref::constant(false), Ref::ZERO);
        assert_eq!(Ref::ONE.owner(), ManagerId::SHARED);
    }

    #[test]
    fn test_packing() {
        let owner = ManagerId::fresh();
        let r = Ref::new(owner, NodeId::new(5), false);
        assert_eq!(r.id(), NodeId::new(5));
        assert_eq!(r.raw(), 10);
        assert!(!r.is_negated());
        assert!(!r.is_terminal());

        let n = -r;
        assert_eq!(n.raw(), 11);
        assert!(n.is_negated());
        assert_eq!(n.id(), r.id());
        assert_eq!(n.regular(), r);
        assert_eq!(n.owner(), owner);
    }

    #[test]
    fn test_negation_is_involutive() {
        let owner = ManagerId::fresh();
        for i in 1..50 {
            for neg in [false, true] {
                let r = Ref::new(owner, NodeId::new(i), neg);
                assert_eq!(-(-r), r);
                assert_ne!(-r, r);
                assert_eq!(r.negate_if(false), r);
                assert_eq!(r.negate_if(true), -r);
            }
        }
    }

    #[test]
    fn test_ordering() {
        let owner = ManagerId::fresh();
        let a = Ref::new(owner, NodeId::new(2), false);
        let b = Ref::new(owner, NodeId::new(2), true);
        let c = Ref::new(owner, NodeId::new(3), false);
        assert!(Ref::ONE < Ref::ZERO);
        assert!(Ref::ZERO < a);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_fresh_managers_differ() {
        let m1 = ManagerId::fresh();
        let m2 = ManagerId::fresh();
        assert_ne!(m1, m2);
        assert_ne!(m1, ManagerId::SHARED);
    }

    #[test]
    fn test_display() {
        let owner = ManagerId::fresh();
        let r = Ref::new(owner, NodeId::new(7), false);
        assert_eq!(format!("{}", r), "@7");
        assert_eq!(format!("{}", -r), "~@7");
        assert_eq!(format!("{}", Ref::ONE), "1");
        assert_eq!(format!("{}", Ref::ZERO), "0");
    }
}
